use crate::helpers::{send_error, send_response, Writer};
use crate::session::Session;
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the STOR command. Like RETR, it returns once the receiving task
/// has been started.
pub async fn handle_stor_command(
    writer: Writer,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    if arg.is_empty() {
        warn!("STOR command received with no arguments");
        send_response(&writer, b"501 Syntax error in parameters or arguments.\r\n").await?;
        return Ok(());
    }

    let started = session.lock().await.put(&arg).await;
    match started {
        Ok(transfer) => {
            info!("Receiving file: {:?}", transfer.path());
            send_response(&writer, b"150 File status okay; about to open data connection.\r\n")
                .await
        }
        Err(e) => send_error(&writer, "STOR", &e).await,
    }
}
