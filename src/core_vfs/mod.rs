pub mod path_stack;

pub use path_stack::{validate_file_name, validate_name, PathStack, PathStep};
