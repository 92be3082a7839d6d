use crate::helpers::{send_response, Writer};
use crate::session::Session;
use log::{debug, info, warn};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::Mutex;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PortArgError {
    #[error("Expected h1,h2,h3,h4,p1,p2")]
    WrongArity,
    #[error("Invalid number in PORT argument: {0:?}")]
    InvalidNumber(String),
}

/// Parses the `h1,h2,h3,h4,p1,p2` argument of the PORT command.
pub fn parse_port_argument(arg: &str) -> Result<SocketAddr, PortArgError> {
    let parts: Vec<&str> = arg.trim().split(',').collect();
    if parts.len() != 6 {
        return Err(PortArgError::WrongArity);
    }

    let mut bytes = [0u8; 6];
    for (slot, part) in bytes.iter_mut().zip(&parts) {
        *slot = part
            .trim()
            .parse::<u8>()
            .map_err(|_| PortArgError::InvalidNumber(part.to_string()))?;
    }

    let ip = Ipv4Addr::new(bytes[0], bytes[1], bytes[2], bytes[3]);
    let port = (bytes[4] as u16) << 8 | bytes[5] as u16;
    Ok(SocketAddr::new(IpAddr::V4(ip), port))
}

/// Handles the PORT (Active Mode) FTP command.
///
/// Only the address is recorded here; it is dialed when a transfer starts.
pub async fn handle_port_command(
    writer: Writer,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let addr = match parse_port_argument(&arg) {
        Ok(addr) => addr,
        Err(e) => {
            warn!("Rejected PORT argument {:?}: {}", arg, e);
            send_response(&writer, b"501 Syntax error in parameters or arguments.\r\n").await?;
            return Ok(());
        }
    };

    info!("Received PORT command with address: {}", addr);
    session.lock().await.port(addr);
    send_response(&writer, b"200 Command okay.\r\n").await
}

/// Opens the outbound data connection of active mode.
pub async fn setup_port_connection(addr: SocketAddr) -> std::io::Result<TcpStream> {
    let data_stream = TcpStream::connect(addr).await?;
    debug!("Active data connection established with {}", addr);
    Ok(data_stream)
}
