//! CLI command implementations

pub mod config;
pub mod inspect;
pub mod json_output;
pub mod pack;
pub mod preview;

mod progress_line;
