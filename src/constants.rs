// src/constants.rs

/// Pending connections queued on a passive data listener.
pub const PASV_BACKLOG: u32 = 5;

/// Bytes moved per read/write step of a transfer.
pub const TRANSFER_CHUNK_SIZE: usize = 512;

pub const PATH_SEPARATOR: char = '/';

pub const CURRENT_DIR: &str = ".";
pub const PARENT_DIR: &str = "..";

pub const DEFAULT_CONFIG_PATH: &str = "/etc/rouillexfer.conf";
pub const DEFAULT_LISTEN_PORT: u16 = 2121;
