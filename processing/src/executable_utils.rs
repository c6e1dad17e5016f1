use clap::Args;
use common::config::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::model::GenericError;

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Path to config file
    #[arg(short, long, default_value = "ecom/config/dev.yaml")]
    pub config: PathBuf,
}

/// Loads `.env`, the config file, and installs the tracing subscriber.
///
/// `RUST_LOG` wins over the configured `log_level` when set.
pub fn initialize_executable(args: &ConfigArgs) -> Result<Config, GenericError> {
    // a missing .env is fine
    let dotenv = dotenvy::dotenv().ok();

    let config = Config::load(&args.config)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.common.log_level))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!(
        project = %config.common.project_name,
        config = %args.config.display(),
        dotenv = ?dotenv,
        "Loaded config"
    );
    tracing::debug!(?config, "Effective config");

    Ok(config)
}
