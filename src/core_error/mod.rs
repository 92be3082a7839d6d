pub mod error;

pub use error::{SessionError, SessionResult};
