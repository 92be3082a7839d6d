use anyhow::Result;
use clap::Parser;
use env_logger::{Builder, Env};
use log::info;
use rouillexfer::constants::DEFAULT_CONFIG_PATH;
use rouillexfer::core_cli::Cli;
use rouillexfer::{server, Config};
use std::io::Write;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Cli::parse();

    // Initialize the logger with a custom format
    let default_filter = if args.verbose { "debug" } else { "info" };
    Builder::from_env(Env::default().default_filter_or(default_filter))
        .format(|buf, record| {
            let timestamp = buf.timestamp();
            writeln!(
                buf,
                "[{}] [{}] {}",
                timestamp,
                record.level(),
                record.args()
            )
        })
        .init();

    let config_path = args
        .config
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let mut config = Config::load_from_file(&config_path)?;
    info!("Loaded configuration from {:?}", config_path);

    if let Some(listen_port) = args.listen_port {
        config.server.listen_port = listen_port;
    }

    server::run(config).await
}
