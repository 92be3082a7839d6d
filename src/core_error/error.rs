// Error taxonomy shared by the session core
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Bad file name: {0:?}")]
    InvalidName(String),

    #[error("Already in root directory")]
    RootBoundary,

    #[error("No such file or directory: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("No data connection, use PASV or PORT first")]
    NoDataConnection,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SessionError {
    pub fn to_ftp_response(&self) -> String {
        match self {
            SessionError::InvalidName(_) => {
                "553 Requested action not taken. File name not allowed.".to_string()
            }
            SessionError::RootBoundary => "550 Already in root directory.".to_string(),
            SessionError::NotFound(_) => "550 File or directory not found.".to_string(),
            SessionError::NotADirectory(_) => "550 Not a directory.".to_string(),
            SessionError::NoDataConnection => "425 Use PORT or PASV first.".to_string(),
            SessionError::Io(_) => {
                "451 Requested action aborted. Local error in processing.".to_string()
            }
        }
    }
}

pub type SessionResult<T> = Result<T, SessionError>;
