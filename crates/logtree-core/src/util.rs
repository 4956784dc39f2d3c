//! Common utility functions.

pub mod data;
pub mod fs;
pub mod printf;

// Re-export commonly used items
pub use data::{deep_merge, load_yaml, load_yaml_file};
pub use fs::expand_path;
