use crate::helpers::{send_response, Writer};
use crate::session::Session;
use std::sync::Arc;
use tokio::sync::Mutex;

pub async fn handle_pwd_command(
    writer: Writer,
    session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    let pwd = session.lock().await.pwd();
    let response = format!("257 \"{}\" is the current directory.\r\n", pwd);
    send_response(&writer, response.as_bytes()).await
}
