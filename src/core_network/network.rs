use crate::config::Config;
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_ftpcommand::handlers::{initialize_command_handlers, CommandHandler};
use crate::helpers::{send_response, split_command, Writer};
use crate::session::Session;
use anyhow::Result;
use log::{debug, error, info};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

pub type HandlerTable = Arc<HashMap<FtpCommand, Arc<CommandHandler>>>;

const BANNER: &[u8] = b"220 rouillexfer ready.\r\n";

pub async fn start_server(config: Arc<Config>, root: PathBuf) -> Result<()> {
    let listen_port = config.server.listen_port;
    let listener = TcpListener::bind(("0.0.0.0", listen_port)).await?;
    info!("Server listening on port {}", listen_port);
    serve(listener, config, root).await
}

/// Accepts control connections forever, one [`Session`] per client.
pub async fn serve(listener: TcpListener, config: Arc<Config>, root: PathBuf) -> Result<()> {
    let handlers: HandlerTable = Arc::new(initialize_command_handlers());

    loop {
        let (socket, addr) = listener.accept().await?;
        info!("New connection from {:?}", addr);

        let session = Arc::new(Mutex::new(Session::from_config(root.clone(), &config.server)));
        let handlers = Arc::clone(&handlers);

        tokio::spawn(async move {
            if let Err(e) = handle_connection(socket, session, handlers).await {
                error!("Connection error: {:?}", e);
            }
            info!("Connection closed for {:?}", addr);
        });
    }
}

pub async fn handle_connection(
    socket: TcpStream,
    session: Arc<Mutex<Session>>,
    handlers: HandlerTable,
) -> Result<()> {
    let (read_half, write_half) = socket.into_split();
    let writer: Writer = Arc::new(Mutex::new(write_half));
    send_response(&writer, BANNER).await?;

    let mut reader = BufReader::new(read_half);
    let mut buffer = String::new();

    loop {
        buffer.clear();
        if reader.read_line(&mut buffer).await? == 0 {
            info!("Client disconnected");
            break;
        }

        let (verb, arg) = split_command(&buffer);
        if verb.is_empty() {
            continue;
        }
        debug!("Received command: {} {}", verb, arg);

        let handler = FtpCommand::parse(&verb)
            .and_then(|command| handlers.get(&command).map(|handler| (command, handler)));
        match handler {
            Some((command, handler)) => {
                handler(Arc::clone(&writer), Arc::clone(&session), arg).await?;
                if command == FtpCommand::QUIT {
                    break;
                }
            }
            None => {
                send_response(&writer, b"502 Command not implemented.\r\n").await?;
            }
        }
    }
    Ok(())
}
