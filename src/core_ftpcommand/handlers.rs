use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_ftpcommand::{cwd, list, noop, pwd, quit, retr, stor};
use crate::helpers::Writer;
use crate::session::Session;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::Mutex as TokioMutex;

// Specific crates for PORT and PASV commands
use crate::core_network::pasv;
use crate::core_network::port;

pub type CommandHandler = Box<
    dyn Fn(
            Writer,
            Arc<TokioMutex<Session>>,
            String, // Command argument
        ) -> Pin<Box<dyn Future<Output = Result<(), std::io::Error>> + Send>>
        + Send
        + Sync,
>;

/// Boxes an `async fn` handler into the shape stored in the table.
fn command_handler<F, Fut>(handler: F) -> Arc<CommandHandler>
where
    F: Fn(Writer, Arc<TokioMutex<Session>>, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), std::io::Error>> + Send + 'static,
{
    let boxed: CommandHandler = Box::new(
        move |writer: Writer,
              session: Arc<TokioMutex<Session>>,
              arg: String|
              -> Pin<Box<dyn Future<Output = Result<(), std::io::Error>> + Send>> {
            Box::pin(handler(writer, session, arg))
        },
    );
    Arc::new(boxed)
}

pub fn initialize_command_handlers() -> HashMap<FtpCommand, Arc<CommandHandler>> {
    let mut handlers: HashMap<FtpCommand, Arc<CommandHandler>> = HashMap::new();

    handlers.insert(FtpCommand::CWD, command_handler(cwd::handle_cwd_command));
    handlers.insert(FtpCommand::CDUP, command_handler(cwd::handle_cdup_command));
    handlers.insert(FtpCommand::PWD, command_handler(pwd::handle_pwd_command));
    handlers.insert(FtpCommand::LIST, command_handler(list::handle_list_command));
    handlers.insert(FtpCommand::NLST, command_handler(list::handle_list_command));
    handlers.insert(FtpCommand::RETR, command_handler(retr::handle_retr_command));
    handlers.insert(FtpCommand::STOR, command_handler(stor::handle_stor_command));
    handlers.insert(FtpCommand::PASV, command_handler(pasv::handle_pasv_command));
    handlers.insert(FtpCommand::PORT, command_handler(port::handle_port_command));
    handlers.insert(FtpCommand::NOOP, command_handler(noop::handle_noop_command));
    handlers.insert(FtpCommand::QUIT, command_handler(quit::handle_quit_command));

    handlers
}
