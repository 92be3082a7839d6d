use chrono::{DateTime, Local};
use log::{error, info};
use std::fmt;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferDirection {
    /// File to connection.
    Get,
    /// Connection to file.
    Put,
}

impl fmt::Display for TransferDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferDirection::Get => write!(f, "GET"),
            TransferDirection::Put => write!(f, "PUT"),
        }
    }
}

/// Outcome of one transfer task, as seen from inside the server.
#[derive(Debug, Clone)]
pub struct TransferReport {
    pub direction: TransferDirection,
    pub path: PathBuf,
    pub bytes: u64,
    pub error: Option<String>,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
}

impl TransferReport {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Completion hook of a spawned transfer. Dropping it detaches the task,
/// which keeps running to the end.
#[derive(Debug)]
pub struct TransferHandle {
    direction: TransferDirection,
    path: PathBuf,
    handle: JoinHandle<TransferReport>,
}

impl TransferHandle {
    pub fn direction(&self) -> TransferDirection {
        self.direction
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the task to finish and returns its report.
    pub async fn wait(self) -> TransferReport {
        match self.handle.await {
            Ok(report) => report,
            Err(e) => {
                error!("{} task for {:?} did not finish: {}", self.direction, self.path, e);
                let now = Local::now();
                TransferReport {
                    direction: self.direction,
                    path: self.path,
                    bytes: 0,
                    error: Some(e.to_string()),
                    started_at: now,
                    finished_at: now,
                }
            }
        }
    }
}

/// Spawns `task` and turns its `(bytes, result)` into a [`TransferReport`].
///
/// Failures stop at this boundary: they are logged and recorded in the
/// report, never returned to whoever started the transfer.
pub(crate) fn spawn_transfer<F>(
    direction: TransferDirection,
    path: PathBuf,
    task: F,
) -> TransferHandle
where
    F: Future<Output = (u64, io::Result<()>)> + Send + 'static,
{
    let report_path = path.clone();
    let handle = tokio::spawn(async move {
        let started_at = Local::now();
        let (bytes, result) = task.await;
        let finished_at = Local::now();

        let error = match result {
            Ok(()) => {
                info!("{} of {:?} complete, {} bytes", direction, report_path, bytes);
                None
            }
            Err(e) => {
                error!(
                    "{} of {:?} failed after {} bytes: {}",
                    direction, report_path, bytes, e
                );
                Some(e.to_string())
            }
        };

        TransferReport {
            direction,
            path: report_path,
            bytes,
            error,
            started_at,
            finished_at,
        }
    });

    TransferHandle {
        direction,
        path,
        handle,
    }
}

/// Copies `reader` into `writer` in `chunk_size` steps until end of input,
/// then flushes `writer`. `copied` tracks progress even when the copy fails.
pub async fn pump<R, W>(
    reader: &mut R,
    writer: &mut W,
    chunk_size: usize,
    copied: &mut u64,
) -> io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buffer = vec![0; chunk_size];
    loop {
        let bytes_read = reader.read(&mut buffer).await?;
        if bytes_read == 0 {
            break;
        }
        writer.write_all(&buffer[..bytes_read]).await?;
        *copied += bytes_read as u64;
    }
    writer.flush().await
}
