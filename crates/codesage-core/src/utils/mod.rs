//! Utility functions for display formatting.

pub mod format;

pub use format::{format_timestamp, truncate_code, truncate_string};
