use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use colored::*;

use crate::ai_provider::{AIProviderClient, AiTransport};
use crate::config::Config;
use crate::directive::ActionDirective;
use crate::insights::{generate_insights, PeriodInsight};
use crate::message::{Feedback, Sender};
use crate::mood::{Mood, MoodLog};
use crate::orchestrator::{ConversationOrchestrator, SendOutcome};
use crate::quote::daily_quote;
use crate::speech::{ConsoleSpeech, MeditationSession};
use crate::store::{FileKvStore, KvStore, THEME_KEY};
use crate::streak::{StreakTracker, StreakUpdate};

#[derive(Parser)]
#[command(name = "aura", version, about = "Aura - conversational wellness companion")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Override the data directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive conversation
    Chat {
        /// Model to use
        #[arg(long)]
        model: Option<String>,
        /// AI provider (openai or ollama)
        #[arg(long)]
        provider: Option<String>,
    },
    /// Log how you are feeling right now
    Mood {
        /// One of: happy, sad, anxious, stressed, calm
        mood: Mood,
    },
    /// Show mood insights for the last 7 and 30 days
    Insights,
    /// Show the current logging streak
    Streak,
    /// Show today's quote
    Quote,
    /// Show or select the color theme
    Theme {
        /// Theme name to select
        name: Option<String>,
    },
}

fn open_store(config: &Config) -> Result<FileKvStore> {
    Ok(FileKvStore::new(config.store_dir())?)
}

pub async fn handle_chat(
    data_dir: Option<PathBuf>,
    model: Option<String>,
    provider: Option<String>,
) -> Result<()> {
    let config = Config::new(data_dir)?;
    let store = open_store(&config)?;

    let ai_config = config.get_ai_config(provider, model)?;
    let transport = AIProviderClient::new(ai_config);

    println!("{}", "Starting conversation with Aura...".cyan());
    println!("{}", format!("Model: {}", transport.get_model()).dimmed());

    let mut orchestrator = ConversationOrchestrator::new(transport, store, Local::now());

    println!(
        "{}",
        "Commands: /mood <mood>, /music <mood>, /insights, /streak, /scenario <name>, /retry"
            .yellow()
    );
    println!("{}", "Type 'exit', 'quit', or 'bye' to end.".yellow());
    println!("{}", "---".dimmed());

    if let Some(greeting) = orchestrator.messages().first() {
        println!("{} {}\n", "Aura:".green().bold(), greeting.text);
    }

    loop {
        print!("{} ", "You:".cyan().bold());
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if matches!(input.to_lowercase().as_str(), "exit" | "quit" | "bye") {
            println!("{}", "Take care. 🌿".green());
            break;
        }

        if let Some(command) = input.strip_prefix('/') {
            handle_chat_command(command, &mut orchestrator).await?;
            continue;
        }

        println!("{}", "Aura is typing...".dimmed());
        let outcome = orchestrator.send(input).await;
        render_outcome(&mut orchestrator, outcome).await;
    }

    Ok(())
}

async fn handle_chat_command<T: AiTransport, K: KvStore>(
    command: &str,
    orchestrator: &mut ConversationOrchestrator<T, K>,
) -> Result<()> {
    let parts: Vec<&str> = command.split_whitespace().collect();
    if parts.is_empty() {
        return Ok(());
    }

    match parts[0] {
        "mood" => {
            if parts.len() < 2 {
                println!("{}", "Usage: /mood <happy|sad|anxious|stressed|calm>".yellow());
                return Ok(());
            }
            match parts[1].parse::<Mood>() {
                Ok(mood) => {
                    let update = orchestrator.log_mood(mood, Local::now());
                    print_streak_update(&update);
                    let outcome = orchestrator.share_mood(mood).await;
                    render_outcome(orchestrator, outcome).await;
                }
                Err(e) => println!("{}", e.to_string().red()),
            }
        }
        "insights" => {
            print_insights(orchestrator.mood_log());
        }
        "streak" => {
            let streak = orchestrator.streak();
            if streak.streak == 0 {
                println!("No streak yet. Log a mood to start one.");
            } else {
                println!(
                    "🔥 {} day(s) in a row (last log: {})",
                    streak.streak, streak.last_log_date
                );
            }
        }
        "music" => {
            if parts.len() < 2 {
                println!("{}", "Usage: /music <happy|sad|anxious|stressed|calm>".yellow());
                return Ok(());
            }
            match parts[1].parse::<Mood>() {
                Ok(mood) => {
                    let outcome = orchestrator.request_music(mood).await;
                    render_outcome(orchestrator, outcome).await;
                }
                Err(e) => println!("{}", e.to_string().red()),
            }
        }
        "feedback" => {
            let feedback = match parts.get(1).copied() {
                Some("up") => Feedback::Up,
                Some("down") => Feedback::Down,
                _ => {
                    println!("{}", "Usage: /feedback <up|down>".yellow());
                    return Ok(());
                }
            };
            let last_ai = orchestrator
                .messages()
                .iter()
                .rev()
                .find(|m| m.sender == Sender::Ai && !m.is_error)
                .map(|m| m.id.clone());
            match last_ai {
                Some(id) => {
                    orchestrator.set_feedback(&id, feedback);
                    println!("{}", "Thanks for the feedback.".green());
                }
                None => println!("{}", "No reply to rate yet.".yellow()),
            }
        }
        "scenario" => {
            if parts.len() < 2 {
                if orchestrator.active_scenario().is_some() {
                    orchestrator.clear_scenario();
                    println!("{}", "Role-play scenario cleared.".yellow());
                } else {
                    println!("{}", "No active scenario. Usage: /scenario <name>".yellow());
                }
            } else {
                let scenario = parts[1..].join(" ");
                orchestrator.select_scenario(scenario);
                if let Some(kickoff) = orchestrator.messages().last() {
                    println!("{} {}\n", "Aura:".green().bold(), kickoff.text);
                }
            }
        }
        "retry" => {
            let last_error = orchestrator
                .messages()
                .iter()
                .rev()
                .find(|m| m.is_error)
                .map(|m| m.id.clone());
            match last_error {
                Some(id) => {
                    println!("{}", "Retrying...".dimmed());
                    let outcome = orchestrator.retry(&id).await;
                    render_outcome(orchestrator, outcome).await;
                }
                None => println!("{}", "Nothing to retry.".yellow()),
            }
        }
        "help" | "h" => {
            println!("{}", "Available commands:".cyan().bold());
            println!("  {:<20} - Log a mood and share it", "/mood <mood>".yellow());
            println!("  {:<20} - Ask for music for a mood", "/music <mood>".yellow());
            println!("  {:<20} - Mood insights (7/30 days)", "/insights".yellow());
            println!("  {:<20} - Current logging streak", "/streak".yellow());
            println!("  {:<20} - Rate the last reply", "/feedback <up|down>".yellow());
            println!("  {:<20} - Start or clear a role-play", "/scenario [name]".yellow());
            println!("  {:<20} - Retry the last failed reply", "/retry".yellow());
        }
        _ => {
            println!(
                "{}",
                format!("Unknown command: /{}. Type '/help' for commands.", parts[0]).red()
            );
        }
    }

    Ok(())
}

/// Print the appended reply (or error) and run each dispatched directive.
async fn render_outcome<T: AiTransport, K: KvStore>(
    orchestrator: &mut ConversationOrchestrator<T, K>,
    outcome: SendOutcome,
) {
    match outcome {
        SendOutcome::Ignored => {}
        SendOutcome::Reply {
            message_id,
            directives,
        } => {
            if let Some(message) = orchestrator.messages().iter().find(|m| m.id == message_id) {
                if !message.text.is_empty() {
                    println!("{} {}\n", "Aura:".green().bold(), message.text);
                }
            }
            for directive in directives {
                dispatch_directive(orchestrator, directive).await;
            }
        }
        SendOutcome::Failed { .. } => {
            if let Some(message) = orchestrator.messages().last() {
                println!("{} {}", "Aura:".red().bold(), message.text);
                println!("{}", "(type /retry to try again)\n".dimmed());
            }
        }
    }
}

async fn dispatch_directive<T: AiTransport, K: KvStore>(
    orchestrator: &ConversationOrchestrator<T, K>,
    directive: ActionDirective,
) {
    match directive {
        ActionDirective::Breathing => run_breathing_exercise(),
        ActionDirective::Meditation { topic } => {
            println!("{}", format!("🧘 Guided meditation: {}", topic).cyan().bold());
            let mut session = MeditationSession::new(topic, ConsoleSpeech::new());
            match session.start(orchestrator.transport()).await {
                Ok(()) => {
                    if session.is_speaking() {
                        session.close();
                    }
                }
                Err(e) => {
                    eprintln!("Could not prepare the meditation: {}", e);
                    println!("{}", "Could not prepare the meditation. Please try again.".red());
                }
            }
        }
        ActionDirective::Playlist { theme } => {
            println!("{}", format!("🎵 Creating a \"{}\" playlist...", theme).cyan());
            match orchestrator.transport().get_playlist(&theme).await {
                Ok(songs) if songs.is_empty() => {
                    println!("No songs came back for that theme.");
                }
                Ok(songs) => {
                    for (i, song) in songs.iter().enumerate() {
                        println!("  {}. {} — {}", i + 1, song.title.bold(), song.artist);
                    }
                    println!();
                }
                Err(e) => {
                    eprintln!("Failed to get playlist: {}", e);
                    println!(
                        "{}",
                        "Sorry, I couldn't create that playlist right now. \
                         Please try again later."
                            .red()
                    );
                }
            }
        }
    }
}

fn run_breathing_exercise() {
    println!("{}", "🫁 Guided breathing".cyan().bold());
    println!("Follow three slow rounds:");
    for round in 1..=3 {
        println!("  Round {}: breathe in for 4... hold for 4... out for 6.", round);
    }
    println!();
}

pub fn handle_mood(data_dir: Option<PathBuf>, mood: Mood) -> Result<()> {
    let config = Config::new(data_dir)?;
    let mut store = open_store(&config)?;
    let now = Local::now();

    let mut log = MoodLog::load(&store);
    log.append(mood, now);
    log.save(&mut store);

    let update = StreakTracker::record_log_event(&mut store, now);
    println!("Logged mood: {}", mood.to_string().bold());
    print_streak_update(&update);

    Ok(())
}

fn print_streak_update(update: &StreakUpdate) {
    println!("🔥 Streak: {} day(s)", update.record.streak);
    if let Some(milestone) = update.milestone {
        println!(
            "{}",
            format!("🎉 Milestone reached: {} days in a row!", milestone)
                .green()
                .bold()
        );
    }
}

pub fn handle_insights(data_dir: Option<PathBuf>) -> Result<()> {
    let config = Config::new(data_dir)?;
    let store = open_store(&config)?;
    let log = MoodLog::load(&store);
    print_insights(&log);
    Ok(())
}

fn print_insights(log: &MoodLog) {
    let insights = generate_insights(&log.entries, Local::now());
    print_period("Last 7 days", &insights.last_7_days);
    print_period("Last 30 days", &insights.last_30_days);
}

fn print_period(label: &str, insight: &PeriodInsight) {
    println!("{}", label.cyan().bold());
    if insight.total_entries == 0 {
        println!("  No mood entries in this period.\n");
        return;
    }
    println!("  Entries: {}", insight.total_entries);
    if let Some(mood) = insight.most_frequent_mood {
        println!("  Most frequent: {}", mood.to_string().bold());
    }
    for mc in &insight.mood_counts {
        println!("  {:<10} {}", mc.mood.to_string(), "▇".repeat(mc.count));
    }
    println!();
}

pub fn handle_streak(data_dir: Option<PathBuf>) -> Result<()> {
    let config = Config::new(data_dir)?;
    let store = open_store(&config)?;
    let record = StreakTracker::load(&store);

    if record.streak == 0 {
        println!("No streak yet. Log a mood with 'aura mood <mood>' to start one.");
    } else {
        println!(
            "🔥 {} day(s) in a row (last log: {})",
            record.streak, record.last_log_date
        );
    }
    Ok(())
}

pub fn handle_quote(data_dir: Option<PathBuf>) -> Result<()> {
    let config = Config::new(data_dir)?;
    let mut store = open_store(&config)?;
    let quote = daily_quote(&mut store, Local::now());
    println!("💭 \"{}\"", quote.quote);
    Ok(())
}

pub fn handle_theme(data_dir: Option<PathBuf>, name: Option<String>) -> Result<()> {
    let config = Config::new(data_dir)?;
    let mut store = open_store(&config)?;

    match name {
        Some(name) => {
            store.set(THEME_KEY, &name)?;
            println!("Theme set to: {}", name.bold());
        }
        None => match store.get(THEME_KEY)? {
            Some(name) => println!("Current theme: {}", name.bold()),
            None => println!("No theme selected."),
        },
    }
    Ok(())
}
