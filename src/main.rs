use anyhow::Result;
use clap::Parser;
use log::info;

use appstore_cli::cli::{Cli, commands};
use appstore_cli::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger to file (truncate on each run)
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("appstore-cli.log")?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    let cli = Cli::parse();
    info!("Starting appstore-cli");

    let config = Config::load()?;
    commands::run(cli, config).await
}
