use crate::core_error::SessionError;
use log::{debug, warn};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

/// Write half of a control connection, shared between handlers.
pub type Writer = Arc<Mutex<OwnedWriteHalf>>;

/// Sends a response to the client.
pub async fn send_response(writer: &Writer, message: &[u8]) -> Result<(), std::io::Error> {
    let mut writer = writer.lock().await;
    writer.write_all(message).await?;
    writer.flush().await?;
    Ok(())
}

/// Reports a failed session operation to the client. The session itself
/// stays usable.
pub async fn send_error(
    writer: &Writer,
    command: &str,
    error: &SessionError,
) -> Result<(), std::io::Error> {
    warn!("{} failed: {}", command, error);
    let reply = format!("{}\r\n", error.to_ftp_response());
    send_response(writer, reply.as_bytes()).await
}

/// Sends a multi-line reply: `code-first`, one indented line per item, then
/// `code last`.
pub async fn send_multiline(
    writer: &Writer,
    code: u16,
    first: &str,
    items: &[String],
    last: &str,
) -> Result<(), std::io::Error> {
    let mut reply = format!("{}-{}\r\n", code, first);
    for item in items {
        reply.push(' ');
        reply.push_str(item);
        reply.push_str("\r\n");
    }
    reply.push_str(&format!("{} {}\r\n", code, last));
    debug!("Sending {} line reply", items.len() + 2);
    send_response(writer, reply.as_bytes()).await
}

/// Splits a control line into its upper-cased verb and the (trimmed) rest.
pub fn split_command(line: &str) -> (String, String) {
    let line = line.trim();
    match line.split_once(' ') {
        Some((verb, arg)) => (verb.to_ascii_uppercase(), arg.trim().to_string()),
        None => (line.to_ascii_uppercase(), String::new()),
    }
}
