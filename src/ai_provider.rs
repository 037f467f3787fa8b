use anyhow::Result as AnyResult;
use serde::{Deserialize, Serialize};

use crate::error::{AuraError, Result};
use crate::message::{Message, Sender};
use crate::mood::MoodEntry;
use crate::streak::StreakRecord;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AIProvider {
    OpenAI,
    Ollama,
}

impl std::fmt::Display for AIProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AIProvider::OpenAI => write!(f, "openai"),
            AIProvider::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for AIProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> AnyResult<Self> {
        match s.to_lowercase().as_str() {
            "openai" | "gpt" => Ok(AIProvider::OpenAI),
            "ollama" => Ok(AIProvider::Ollama),
            _ => Err(anyhow::anyhow!("Unknown AI provider: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AIConfig {
    pub provider: AIProvider,
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub title: String,
    pub artist: String,
}

/// The generative-AI boundary: conversation replies plus the meditation and
/// playlist fetches. Every method may fail; callers recover per the error
/// taxonomy (fixed inline error message for replies, inline notice for the
/// flows).
pub trait AiTransport {
    fn get_reply(
        &self,
        history: &[Message],
        mood_log: &[MoodEntry],
        scenario: Option<&str>,
        streak: &StreakRecord,
    ) -> impl std::future::Future<Output = Result<String>> + Send;

    fn get_meditation_script(
        &self,
        topic: &str,
    ) -> impl std::future::Future<Output = Result<String>> + Send;

    fn get_playlist(
        &self,
        theme: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Song>>> + Send;
}

const SYSTEM_PROMPT: &str = "\
You are Aura, a warm, empathetic wellness companion. Listen without judgment, \
respond briefly and gently, and never present yourself as a medical professional.

You can trigger in-app experiences by embedding these exact tags in a reply:
- [ACTION:START_BREATHING_EXERCISE] to offer a guided breathing exercise
- [ACTION:START_MEDITATION:{topic}] to offer a guided meditation on a topic
- [ACTION:START_MEDITATION:{topic}] may appear more than once for alternatives
- [ACTION:CREATE_PLAYLIST:{theme}] to create a music playlist for a theme

Use a tag only when it genuinely helps; the surrounding text should still \
read naturally without it.";

/// HTTP client for the chat providers, shaped after the OpenAI and Ollama
/// chat endpoints.
pub struct AIProviderClient {
    config: AIConfig,
    http_client: reqwest::Client,
}

impl AIProviderClient {
    pub fn new(config: AIConfig) -> Self {
        AIProviderClient {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    pub fn get_model(&self) -> &str {
        &self.config.model
    }

    /// One chat round-trip with an explicit system prompt.
    async fn chat(
        &self,
        messages: Vec<serde_json::Value>,
        system_prompt: String,
    ) -> Result<String> {
        match self.config.provider {
            AIProvider::OpenAI => self.chat_openai(messages, system_prompt).await,
            AIProvider::Ollama => self.chat_ollama(messages, system_prompt).await,
        }
    }

    async fn chat_openai(
        &self,
        messages: Vec<serde_json::Value>,
        system_prompt: String,
    ) -> Result<String> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| AuraError::Config("OpenAI API key required".to_string()))?;

        let mut request_messages = vec![serde_json::json!({
            "role": "system",
            "content": system_prompt
        })];
        request_messages.extend(messages);

        let request_body = serde_json::json!({
            "model": self.config.model,
            "messages": request_messages,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature
        });

        let response = self
            .http_client
            .post("https://api.openai.com/v1/chat/completions")
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| AuraError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unreadable error body".to_string());
            return Err(AuraError::Transport(format!(
                "OpenAI API error: {}",
                error_text
            )));
        }

        let response_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AuraError::Transport(e.to_string()))?;

        let content = response_json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| AuraError::Transport("Invalid OpenAI response format".to_string()))?
            .to_string();

        Ok(content)
    }

    async fn chat_ollama(
        &self,
        messages: Vec<serde_json::Value>,
        system_prompt: String,
    ) -> Result<String> {
        let default_url = "http://localhost:11434".to_string();
        let base_url = self.config.base_url.as_ref().unwrap_or(&default_url);

        let mut request_messages = vec![serde_json::json!({
            "role": "system",
            "content": system_prompt
        })];
        request_messages.extend(messages);

        let request_body = serde_json::json!({
            "model": self.config.model,
            "messages": request_messages,
            "stream": false
        });

        let url = format!("{}/api/chat", base_url);
        let response = self
            .http_client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| AuraError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unreadable error body".to_string());
            return Err(AuraError::Transport(format!(
                "Ollama API error: {}",
                error_text
            )));
        }

        let response_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AuraError::Transport(e.to_string()))?;

        let content = response_json["message"]["content"]
            .as_str()
            .ok_or_else(|| AuraError::Transport("Invalid Ollama response format".to_string()))?
            .to_string();

        Ok(content)
    }
}

fn history_to_wire(history: &[Message]) -> Vec<serde_json::Value> {
    history
        .iter()
        .map(|msg| {
            let role = match msg.sender {
                Sender::User => "user",
                Sender::Ai => "assistant",
            };
            serde_json::json!({ "role": role, "content": msg.text })
        })
        .collect()
}

fn context_prompt(
    mood_log: &[MoodEntry],
    scenario: Option<&str>,
    streak: &StreakRecord,
) -> String {
    let mut prompt = String::from(SYSTEM_PROMPT);

    if !mood_log.is_empty() {
        let recent: Vec<String> = mood_log
            .iter()
            .rev()
            .take(10)
            .map(|e| format!("{} on {}", e.mood, e.date))
            .collect();
        prompt.push_str(&format!(
            "\n\nThe user's recent logged moods (newest first): {}.",
            recent.join(", ")
        ));
    }

    if streak.streak > 0 {
        prompt.push_str(&format!(
            "\n\nThe user has logged their mood {} day(s) in a row.",
            streak.streak
        ));
    }

    if let Some(scenario) = scenario {
        prompt.push_str(&format!(
            "\n\nRole-play mode: act out the \"{}\" scenario with the user. \
             Stay in character as the other party.",
            scenario
        ));
    }

    prompt
}

/// Strip a Markdown code fence so a JSON payload parses.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open.strip_suffix("```").unwrap_or(without_open).trim()
}

impl AiTransport for AIProviderClient {
    async fn get_reply(
        &self,
        history: &[Message],
        mood_log: &[MoodEntry],
        scenario: Option<&str>,
        streak: &StreakRecord,
    ) -> Result<String> {
        let system_prompt = context_prompt(mood_log, scenario, streak);
        self.chat(history_to_wire(history), system_prompt).await
    }

    async fn get_meditation_script(&self, topic: &str) -> Result<String> {
        let request = serde_json::json!({
            "role": "user",
            "content": format!(
                "Write a short, soothing guided meditation script about \"{}\". \
                 Plain prose only, no headings, no action tags.",
                topic
            )
        });
        self.chat(vec![request], SYSTEM_PROMPT.to_string()).await
    }

    async fn get_playlist(&self, theme: &str) -> Result<Vec<Song>> {
        let request = serde_json::json!({
            "role": "user",
            "content": format!(
                "Suggest 8 songs for the theme \"{}\". Respond with ONLY a JSON \
                 array of objects with \"title\" and \"artist\" string fields.",
                theme
            )
        });
        let raw = self.chat(vec![request], SYSTEM_PROMPT.to_string()).await?;

        let songs: Vec<Song> = serde_json::from_str(strip_code_fence(&raw))
            .map_err(AuraError::Serialization)?;
        Ok(songs)
    }
}
