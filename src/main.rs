mod ai_provider;
mod cli;
mod config;
mod dates;
mod directive;
mod error;
mod insights;
mod message;
mod mood;
mod orchestrator;
mod quote;
mod sanitize;
mod speech;
mod store;
mod streak;

use clap::Parser;

use cli::{Args, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.command {
        Commands::Chat { model, provider } => {
            cli::handle_chat(args.data_dir, model, provider).await
        }
        Commands::Mood { mood } => cli::handle_mood(args.data_dir, mood),
        Commands::Insights => cli::handle_insights(args.data_dir),
        Commands::Streak => cli::handle_streak(args.data_dir),
        Commands::Quote => cli::handle_quote(args.data_dir),
        Commands::Theme { name } => cli::handle_theme(args.data_dir, name),
    }
}
