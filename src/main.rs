use anyhow::{Context, Result};
use clap::Parser;
use shiptrack::config::Config;
use shiptrack::logging::{self, LogTarget};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "shiptrack")]
#[command(version, about = "Track a shipment from the terminal", long_about = None)]
struct Cli {
    /// Path to config file (default: ~/.shiptrack/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL of the tracking service
    #[arg(long)]
    api_base: Option<String>,

    /// Lookup timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Look up a single tracking ID, print the result and exit
    #[arg(long, value_name = "ID")]
    once: Option<String>,

    /// With --once, print the tracking result as JSON
    #[arg(long, requires = "once")]
    json: bool,

    /// Write a default config file and exit
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .or_else(Config::default_path)
        .context("Could not determine config path; pass --config")?;

    if cli.init_config {
        if config_path.exists() {
            println!("Config already exists at {}", config_path.display());
        } else {
            Config::write_default(&config_path)?;
            println!("Created default config at {}", config_path.display());
        }
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = Config::load(&config_path)?;
    if let Some(base_url) = cli.api_base {
        config.api.base_url = base_url;
    }
    if let Some(timeout) = cli.timeout {
        config.api.timeout_secs = timeout;
    }

    match cli.once {
        Some(tracking_id) => {
            let _log_guard = logging::init(&config.logging.level, LogTarget::Stderr)?;
            shiptrack::app::run_once(&config, &tracking_id, cli.json).await
        }
        None => {
            let _log_guard =
                logging::init(&config.logging.level, LogTarget::File(config.log_directory()))?;
            shiptrack::app::run(&config).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
