//! Serve command
//!
//! Usage: revfeed serve [--config <FILE>] [--bind <ADDR>] [--db <FILE>] [--time-budget-ms <MS>]
//!
//! Flags override the config file, which overrides built-in defaults.

use clap::Args;
use revfeed_api::ServiceConfig;
use revfeed_core::logging_facility::{self, Profile};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// TOML service configuration
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Listen address, e.g. 0.0.0.0:8080
    #[arg(long)]
    pub bind: Option<String>,

    /// SQLite database holding the imported seeds
    #[arg(long)]
    pub db: Option<PathBuf>,

    #[arg(long)]
    pub time_budget_ms: Option<u64>,

    /// development, production or test
    #[arg(long)]
    pub log_profile: Option<Profile>,
}

pub fn execute(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(args)?;
    logging_facility::init(config.logging.profile);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(revfeed_api::serve(&config))?;
    Ok(())
}

fn resolve_config(args: ServeArgs) -> Result<ServiceConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => ServiceConfig::from_file(path)?,
        None => ServiceConfig::default().with_env(|key| std::env::var(key).ok())?,
    };

    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(db) = args.db {
        config.store.database = db;
    }
    if let Some(ms) = args.time_budget_ms {
        config.feed.time_budget_ms = ms;
    }
    if let Some(profile) = args.log_profile {
        config.logging.profile = profile;
    }
    Ok(config)
}
