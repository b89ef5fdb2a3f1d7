//! CLI layer for CRM-RS.
//!
//! The command-line front end: parses arguments with clap, validates form
//! fields, calls the storage gateway and renders the results.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::{execute, execute_with};
pub use output::OutputFormat;
pub use parser::{Cli, Commands};
