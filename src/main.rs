//! # marsbot
//!
//! Runs one bot personality on Discord:
//! - Domain: configuration, personality records, errors, traits
//! - Infrastructure: Discord gateway/REST, personality stores, LLM, caches
//! - Application: normalizer, capability pipeline, character, router, runtime
//! - Interface: prefix-command handlers

mod application;
mod domain;
mod infrastructure;
mod interface;
mod strings;

use anyhow::{Context, Result};
use clap::Parser;

use crate::application::runtime::BotRuntime;
use crate::domain::config::AppConfig;
use crate::strings::logs;

const CONFIG_PATH: &str = "data/config.yaml";

#[derive(Parser, Debug)]
#[command(name = "marsbot", about = "Run a marsbot personality on Discord")]
struct Cli {
    /// Personality to load (document id or manifest directory name)
    bot_id: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Secrets may come from a local .env file.
    dotenvy::dotenv().ok();

    let config = AppConfig::load(CONFIG_PATH).context("Failed to load configuration")?;
    let _log_guard = application::logging::init(&config.logging)?;

    tracing::info!("{}", logs::LAUNCHING);
    tracing::debug!(?config, "configuration loaded");
    config.validate().context("Invalid configuration")?;

    let runtime = BotRuntime::bootstrap(&config, &cli.bot_id)
        .await
        .with_context(|| format!("Failed to start bot `{}`", cli.bot_id))?;
    tracing::info!(name = %runtime.personality().name, "personality ready");

    tokio::select! {
        result = runtime.run() => {
            if let Err(e) = &result {
                tracing::error!("{}", logs::gateway_stopped(&e.to_string()));
            }
            result.context("Gateway failed")?;
        }
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => tracing::info!("{}", logs::SHUTDOWN),
                Err(e) => tracing::error!("{}", logs::shutdown_fail(&e.to_string())),
            }
        }
    }

    Ok(())
}
