use crate::helpers::{send_error, send_multiline, Writer};
use crate::session::Session;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles LIST and NLST. Names travel back on the control connection as a
/// multi-line reply; no data connection is used.
pub async fn handle_list_command(
    writer: Writer,
    session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    let (pwd, listing) = {
        let session = session.lock().await;
        (session.pwd(), session.dir().await)
    };

    match listing {
        Ok(names) => {
            send_multiline(
                &writer,
                250,
                &format!("Listing of {}", pwd),
                &names,
                "End of listing.",
            )
            .await
        }
        Err(e) => send_error(&writer, "LIST", &e).await,
    }
}
