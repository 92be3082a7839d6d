use crate::constants::PASV_BACKLOG;
use crate::helpers::{send_error, send_response, Writer};
use crate::session::Session;
use log::debug;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpSocket};
use tokio::sync::Mutex;

/// Handles the PASV command: opens a fresh passive listener for the session
/// and relays its address to the client.
pub async fn handle_pasv_command(
    writer: Writer,
    session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    let entered = session.lock().await.pasv();
    match entered {
        Ok(addr) => {
            let pasv_response = format_pasv_response(addr);
            send_response(&writer, pasv_response.as_bytes()).await?;
            debug!("PASV response sent to client: {}", pasv_response.trim_end());
            Ok(())
        }
        Err(e) => send_error(&writer, "PASV", &e).await,
    }
}

/// Sets up a passive mode (PASV) listener on an ephemeral port of `pasv_ip`.
///
/// The socket is built by hand so the backlog of pending data connections
/// is bounded to [`PASV_BACKLOG`]. Must be called from within the runtime.
pub fn setup_pasv_listener(pasv_ip: IpAddr) -> io::Result<TcpListener> {
    let socket = match pasv_ip {
        IpAddr::V4(_) => TcpSocket::new_v4()?,
        IpAddr::V6(_) => TcpSocket::new_v6()?,
    };
    socket.bind(SocketAddr::new(pasv_ip, 0))?;
    let listener = socket.listen(PASV_BACKLOG)?;

    debug!(
        "PASV listener set up on IP: {}, Port: {}",
        pasv_ip,
        listener.local_addr()?.port()
    );
    Ok(listener)
}

/// Formats the reply relaying a passive listener address to the client.
pub fn format_pasv_response(addr: SocketAddr) -> String {
    match addr.ip() {
        IpAddr::V4(ip) => {
            let [a, b, c, d] = ip.octets();
            format!(
                "227 Entering Passive Mode ({},{},{},{},{},{}).\r\n",
                a,
                b,
                c,
                d,
                addr.port() / 256,
                addr.port() % 256
            )
        }
        IpAddr::V6(_) => format!(
            "229 Entering Extended Passive Mode (|||{}|).\r\n",
            addr.port()
        ),
    }
}
