use crate::helpers::{send_response, Writer};
use crate::session::Session;
use log::info;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the QUIT command. The connection loop closes the control
/// connection once this reply is out.
pub async fn handle_quit_command(
    writer: Writer,
    _session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    info!("Received QUIT command. Closing connection.");
    send_response(&writer, b"221 Service closing control connection.\r\n").await
}
