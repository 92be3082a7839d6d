use crate::config::ServerConfig;
use crate::constants::TRANSFER_CHUNK_SIZE;
use crate::core_error::SessionResult;
use crate::core_network::{DataChannelManager, DataChannelPolicy, Mode};
use crate::core_transfer::{TransferEngine, TransferHandle};
use crate::core_vfs::PathStack;
use log::{debug, info};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

/// State of one connected client: working directory below `root` plus the
/// data-channel mode used by its transfers.
#[derive(Debug)]
pub struct Session {
    root: PathBuf,
    host: IpAddr,
    cwd: PathStack,
    data: DataChannelManager,
    engine: TransferEngine,
}

impl Session {
    pub fn new(root: PathBuf, host: IpAddr) -> Self {
        Self::with_options(root, host, DataChannelPolicy::default(), TRANSFER_CHUNK_SIZE)
    }

    pub fn from_config(root: PathBuf, config: &ServerConfig) -> Self {
        Self::with_options(
            root,
            config.pasv_address,
            config.data_channel_policy,
            config.chunk_size(),
        )
    }

    pub fn with_options(
        root: PathBuf,
        host: IpAddr,
        policy: DataChannelPolicy,
        chunk_size: usize,
    ) -> Self {
        info!("A client has bound to a session rooted at {:?}", root);
        Self {
            root,
            host,
            cwd: PathStack::new(),
            data: DataChannelManager::new(policy),
            engine: TransferEngine::new(chunk_size),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn host(&self) -> IpAddr {
        self.host
    }

    pub fn mode(&self) -> Mode {
        self.data.mode()
    }

    /// Absolute path of the current directory.
    pub fn current_path(&self) -> PathBuf {
        self.cwd.resolve(&self.root)
    }

    /// Changes directory; `..` goes up, `.` stays put.
    pub fn cd(&mut self, name: &str) -> SessionResult<()> {
        self.cwd.push(&self.root, name)?;
        debug!("Working directory is now {}", self.cwd.current_relative_path());
        Ok(())
    }

    pub fn pwd(&self) -> String {
        self.cwd.current_relative_path()
    }

    /// Names of the entries in the current directory, sorted.
    pub async fn dir(&self) -> SessionResult<Vec<String>> {
        let mut entries = tokio::fs::read_dir(self.current_path()).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    /// Starts sending `file` to the client; does not wait for the copy.
    pub async fn get(&mut self, file: &str) -> SessionResult<TransferHandle> {
        let dir = self.current_path();
        self.engine.get(file, &dir, &mut self.data).await
    }

    /// Starts receiving `file` from the client; does not wait for the copy.
    pub async fn put(&mut self, file: &str) -> SessionResult<TransferHandle> {
        let dir = self.current_path();
        self.engine.put(file, &dir, &mut self.data).await
    }

    /// Opens a passive listener on the session host and returns its address.
    pub fn pasv(&mut self) -> SessionResult<SocketAddr> {
        Ok(self.data.enter_passive(self.host)?)
    }

    pub fn port(&mut self, addr: SocketAddr) {
        self.data.enter_active(addr);
    }
}
