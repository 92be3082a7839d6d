use crate::constants::{DEFAULT_LISTEN_PORT, TRANSFER_CHUNK_SIZE};
use crate::core_network::DataChannelPolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_port: u16,
    /// Address passive data listeners bind to; also the session's host.
    pub pasv_address: IpAddr,
    /// Confinement root of every session.
    pub chroot_dir: PathBuf,
    pub transfer_chunk_size: Option<usize>, // Optional to allow default value
    pub data_channel_policy: DataChannelPolicy,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_port: DEFAULT_LISTEN_PORT,
            pasv_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            chroot_dir: PathBuf::from("/var/ftp"),
            transfer_chunk_size: Some(TRANSFER_CHUNK_SIZE),
            data_channel_policy: DataChannelPolicy::Persist,
        }
    }
}

impl ServerConfig {
    pub fn chunk_size(&self) -> usize {
        self.transfer_chunk_size.unwrap_or(TRANSFER_CHUNK_SIZE)
    }

    /// Canonical form of `chroot_dir`, which must be an existing directory.
    pub fn canonical_root(&self) -> Result<PathBuf> {
        let root = self
            .chroot_dir
            .canonicalize()
            .with_context(|| format!("Failed to resolve chroot_dir: {:?}", self.chroot_dir))?;
        if !root.is_dir() {
            anyhow::bail!("chroot_dir is not a directory: {:?}", root);
        }
        Ok(root)
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse configuration")
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {:?}", path))?;
        Self::from_toml(&config_str)
            .with_context(|| format!("Failed to parse configuration file: {:?}", path))
    }
}
