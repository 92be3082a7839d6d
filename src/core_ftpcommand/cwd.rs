use crate::helpers::{send_error, send_response, Writer};
use crate::session::Session;
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the CWD command: one directory name, `.` or `..`.
pub async fn handle_cwd_command(
    writer: Writer,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    if arg.is_empty() {
        warn!("CWD command received with no arguments");
        send_response(&writer, b"501 Syntax error in parameters or arguments.\r\n").await?;
        return Ok(());
    }

    let result = {
        let mut session = session.lock().await;
        session.cd(&arg).map(|_| session.pwd())
    };

    match result {
        Ok(pwd) => {
            info!("Directory successfully changed to: {}", pwd);
            send_response(&writer, b"250 Directory successfully changed.\r\n").await
        }
        Err(e) => send_error(&writer, "CWD", &e).await,
    }
}

/// Handles the CDUP command, i.e. `CWD ..`.
pub async fn handle_cdup_command(
    writer: Writer,
    session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    handle_cwd_command(writer, session, "..".to_string()).await
}
