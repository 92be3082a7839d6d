pub mod engine;
pub mod task;

pub use engine::TransferEngine;
pub use task::{TransferDirection, TransferHandle, TransferReport};
