use crate::core_error::{SessionError, SessionResult};
use crate::core_network::port::setup_port_connection;
use crate::core_network::{DataChannelManager, Mode, PendingConnection};
use crate::core_transfer::task::{pump, spawn_transfer, TransferDirection, TransferHandle};
use crate::core_vfs::validate_file_name;
use log::{debug, info};
use std::io;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

/// Data connection handed to a transfer task: already open, or still to be
/// accepted/dialed from inside the task.
enum DataEndpoint {
    Connected(TcpStream),
    Pending(PendingConnection),
}

impl DataEndpoint {
    async fn connect(self) -> io::Result<TcpStream> {
        match self {
            DataEndpoint::Connected(stream) => Ok(stream),
            DataEndpoint::Pending(pending) => pending.establish().await,
        }
    }
}

/// Starts file transfers over the session's data channel. Each call returns
/// as soon as the copy task is spawned.
#[derive(Debug, Clone)]
pub struct TransferEngine {
    chunk_size: usize,
}

impl TransferEngine {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Sends `file` from `dir` to the client.
    ///
    /// In active mode the client is dialed before returning, so a refused
    /// connection is reported to the caller and the mode is left as it was.
    /// In passive mode the accept happens inside the task.
    pub async fn get(
        &self,
        file: &str,
        dir: &Path,
        data: &mut DataChannelManager,
    ) -> SessionResult<TransferHandle> {
        let name = validate_file_name(file)?;
        if data.mode() == Mode::None {
            return Err(SessionError::NoDataConnection);
        }

        let path = dir.join(name);
        let source = open_for_reading(&path).await?;

        // Dial before touching the mode so a refused connection keeps the
        // PORT address under the reset policy.
        let dialed = match data.peer_addr() {
            Some(peer) => Some(setup_port_connection(peer).await?),
            None => None,
        };
        let endpoint = match (dialed, data.obtain_connection()?) {
            (Some(stream), _) => DataEndpoint::Connected(stream),
            (None, pending) => {
                debug!("GET of {:?} will {}", path, pending);
                DataEndpoint::Pending(pending)
            }
        };

        info!("Starting GET of {:?}", path);
        let chunk_size = self.chunk_size;
        Ok(spawn_transfer(
            TransferDirection::Get,
            path,
            send_file(source, endpoint, chunk_size),
        ))
    }

    /// Receives `file` into `dir` from the client.
    ///
    /// The file is created before returning. The data connection, accepted
    /// or dialed, is opened by the task; if that fails the created file is
    /// left behind empty.
    pub async fn put(
        &self,
        file: &str,
        dir: &Path,
        data: &mut DataChannelManager,
    ) -> SessionResult<TransferHandle> {
        let name = validate_file_name(file)?;
        if data.mode() == Mode::None {
            return Err(SessionError::NoDataConnection);
        }

        let path = dir.join(name);
        let target = File::create(&path).await?;
        let pending = data.obtain_connection()?;
        debug!("PUT of {:?} will {}", path, pending);

        info!("Starting PUT of {:?}", path);
        let chunk_size = self.chunk_size;
        Ok(spawn_transfer(
            TransferDirection::Put,
            path,
            receive_file(target, DataEndpoint::Pending(pending), chunk_size),
        ))
    }
}

async fn open_for_reading(path: &Path) -> SessionResult<File> {
    let not_found = || SessionError::NotFound(path.to_path_buf());
    let metadata = tokio::fs::metadata(path).await.map_err(|_| not_found())?;
    if metadata.is_dir() {
        return Err(not_found());
    }
    File::open(path).await.map_err(|_| not_found())
}

async fn send_file(
    mut file: File,
    endpoint: DataEndpoint,
    chunk_size: usize,
) -> (u64, io::Result<()>) {
    let mut copied = 0;
    let mut conn = match endpoint.connect().await {
        Ok(conn) => conn,
        Err(e) => return (copied, Err(e)),
    };

    let result = pump(&mut file, &mut conn, chunk_size, &mut copied).await;
    let closed = conn.shutdown().await;
    drop(conn);
    drop(file);

    (copied, result.and(closed))
}

async fn receive_file(
    mut file: File,
    endpoint: DataEndpoint,
    chunk_size: usize,
) -> (u64, io::Result<()>) {
    let mut copied = 0;
    let mut conn = match endpoint.connect().await {
        Ok(conn) => conn,
        Err(e) => return (copied, Err(e)),
    };

    let result = pump(&mut conn, &mut file, chunk_size, &mut copied).await;
    if let Err(e) = conn.shutdown().await {
        debug!("Data connection shutdown after PUT: {}", e);
    }
    drop(conn);
    let synced = file.sync_all().await;
    drop(file);

    (copied, result.and(synced))
}
