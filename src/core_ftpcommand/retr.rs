use crate::helpers::{send_error, send_response, Writer};
use crate::session::Session;
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the RETR command.
///
/// The reply only says the transfer has started: the copy runs in its own
/// task and its outcome is logged server side.
///
/// # Arguments
///
/// * `writer` - The shared control connection.
/// * `session` - A shared, locked session containing the client's state.
/// * `arg` - The name of the file to retrieve, relative to the current directory.
pub async fn handle_retr_command(
    writer: Writer,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    if arg.is_empty() {
        warn!("RETR command received with no arguments");
        send_response(&writer, b"501 Syntax error in parameters or arguments.\r\n").await?;
        return Ok(());
    }

    let started = session.lock().await.get(&arg).await;
    match started {
        Ok(transfer) => {
            info!("Sending file: {:?}", transfer.path());
            send_response(&writer, b"150 Opening data connection.\r\n").await
        }
        Err(e) => send_error(&writer, "RETR", &e).await,
    }
}
