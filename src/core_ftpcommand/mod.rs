// Here's the list of the FTP commands implemented
pub mod cwd;
pub mod ftpcommand;
pub mod handlers;
pub mod list;
pub mod noop;
pub mod pwd;
pub mod quit;
pub mod retr;
pub mod stor;
