use crate::config::Config;
use crate::core_network::network;
use anyhow::Result;
use log::{error, info};
use std::sync::Arc;

/// Runs the server with the provided configuration.
///
/// The confinement root is resolved once here; a missing or non-directory
/// `chroot_dir` stops startup.
pub async fn run(config: Config) -> Result<()> {
    log_config(&config);
    let root = config.server.canonical_root()?;
    info!("Sessions are confined to {:?}", root);

    if let Err(e) = network::start_server(Arc::new(config), root).await {
        error!("Server stopped: {}", e);
        return Err(e);
    }

    Ok(())
}

// Helper function to log configuration options
pub fn log_config(config: &Config) {
    info!("  Listen Port: {}", config.server.listen_port);
    info!("  PASV Address: {}", config.server.pasv_address);
    info!("  Chroot Directory: {:?}", config.server.chroot_dir);
    info!("  Transfer Chunk Size: {} bytes", config.server.chunk_size());
    info!("  Data Channel Policy: {:?}", config.server.data_channel_policy);
}
