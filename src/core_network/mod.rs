pub mod data_channel;
pub mod network;
pub mod pasv;
pub mod port;

pub use data_channel::{DataChannelManager, DataChannelPolicy, Mode, PendingConnection};
