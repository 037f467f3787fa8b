use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::ai_provider::{AIConfig, AIProvider};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip)]
    pub data_dir: PathBuf,
    pub default_provider: String,
    pub providers: HashMap<String, ProviderConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub default_model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Config {
    pub fn new(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("aura")
        });

        std::fs::create_dir_all(&data_dir).context("Failed to create data directory")?;

        let config_path = data_dir.join("config.json");

        if config_path.exists() {
            let config_str =
                std::fs::read_to_string(&config_path).context("Failed to read config.json")?;
            match serde_json::from_str::<Config>(&config_str) {
                Ok(mut config) => {
                    config.data_dir = data_dir;
                    // Fall back to the environment when the stored key is empty.
                    if let Some(openai) = config.providers.get_mut("openai") {
                        if openai.api_key.as_ref().map_or(true, |key| key.is_empty()) {
                            openai.api_key = std::env::var("OPENAI_API_KEY").ok();
                        }
                    }
                    return Ok(config);
                }
                Err(e) => {
                    eprintln!("Failed to parse existing config.json: {}", e);
                    eprintln!("Recreating default configuration...");
                }
            }
        }

        let config = Self::default_config(data_dir);

        let json_str =
            serde_json::to_string_pretty(&config).context("Failed to serialize default config")?;
        std::fs::write(&config_path, json_str).context("Failed to write default config.json")?;

        Ok(config)
    }

    fn default_config(data_dir: PathBuf) -> Self {
        let mut providers = HashMap::new();

        providers.insert(
            "ollama".to_string(),
            ProviderConfig {
                default_model: "qwen2.5".to_string(),
                host: Some("http://localhost:11434".to_string()),
                api_key: None,
            },
        );

        providers.insert(
            "openai".to_string(),
            ProviderConfig {
                default_model: "gpt-4o-mini".to_string(),
                host: None,
                api_key: std::env::var("OPENAI_API_KEY").ok(),
            },
        );

        Config {
            data_dir,
            default_provider: "ollama".to_string(),
            providers,
        }
    }

    pub fn get_provider(&self, provider_name: &str) -> Option<&ProviderConfig> {
        self.providers.get(provider_name)
    }

    pub fn get_ai_config(
        &self,
        provider: Option<String>,
        model: Option<String>,
    ) -> Result<AIConfig> {
        let provider_name = provider.as_deref().unwrap_or(&self.default_provider);
        let provider_config = self
            .get_provider(provider_name)
            .ok_or_else(|| anyhow::anyhow!("Unknown provider: {}", provider_name))?;

        let ai_provider: AIProvider = provider_name.parse()?;
        let model_name = model.unwrap_or_else(|| provider_config.default_model.clone());

        Ok(AIConfig {
            provider: ai_provider,
            model: model_name,
            api_key: provider_config.api_key.clone(),
            base_url: provider_config.host.clone(),
            max_tokens: Some(1024),
            temperature: Some(0.7),
        })
    }

    /// Directory holding the key-value store files.
    pub fn store_dir(&self) -> PathBuf {
        self.data_dir.join("store")
    }
}
