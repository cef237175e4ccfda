use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use clean_configuration::{load_config_from, setup_logging, DEFAULT_CONFIG_PATH};
use clean_setup::Application;

/// Accepts uploaded contact lists and returns them cleaned as CSV.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// YAML configuration file; a missing file means defaults plus environment.
    #[arg(short, long, env = "CLEAN_SERVICE_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config_from(&args.config)?;
    setup_logging(&config);
    tracing::debug!(config_path = %args.config.display(), "configuration loaded");

    let server_config = config.server.clone();
    let app = Application::new(config).await?;
    app.run(server_config).await?;
    Ok(())
}
