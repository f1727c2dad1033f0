mod classify;
mod collect;
mod history;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use leadscan_core::{AppConfig, Platform};
use leadscan_qualify::{CallPolicy, GeminiClient, LeadQualifier};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "leadscan-cli")]
#[command(about = "Qualify social media content as real estate leads")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Classify one piece of text and print the lead, if any
    Classify {
        #[arg(long)]
        text: String,
        /// instagram, facebook or youtube
        #[arg(long)]
        platform: Option<Platform>,
        /// Also run the AI quality review on an accepted lead
        #[arg(long)]
        assess: bool,
    },
    /// Fetch one platform through the collector and qualify the results
    Collect {
        #[arg(long)]
        platform: Platform,
        /// Comma-separated hashtags, group ids or video ids
        #[arg(long, value_delimiter = ',', required = true)]
        targets: Vec<String>,
        /// Also run the AI quality review on every lead
        #[arg(long)]
        assess: bool,
    },
    /// Show recent scans from the scan log
    History {
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(
            long,
            env = "LEADSCAN_SCAN_LOG_PATH",
            default_value = "./data/scan_history.jsonl"
        )]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Classify {
            text,
            platform,
            assess,
        }) => {
            let config = leadscan_core::load_app_config()?;
            let qualifier = build_qualifier(&config)?;
            classify::run_classify(&qualifier, &text, platform, assess).await?;
        }
        Some(Commands::Collect {
            platform,
            targets,
            assess,
        }) => {
            let config = leadscan_core::load_app_config()?;
            let qualifier = build_qualifier(&config)?;
            collect::run_collect(&config, &qualifier, platform, &targets, assess).await?;
        }
        Some(Commands::History { limit, file }) => {
            history::run_history(&file, limit).await?;
        }
        None => println!("leadscan-cli: run with --help to list commands"),
    }

    Ok(())
}

fn build_qualifier(config: &AppConfig) -> anyhow::Result<LeadQualifier> {
    let model = GeminiClient::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
        config.gemini_base_url.clone(),
        config.ai_timeout_secs,
    )?;
    let policy = CallPolicy::new(
        config.ai_timeout_secs,
        config.ai_max_retries,
        config.ai_retry_backoff_ms,
    );
    Ok(LeadQualifier::new(
        Arc::new(model),
        policy,
        config.min_text_chars,
    ))
}
