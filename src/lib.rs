//! # CRM-RS
//!
//! A local contact manager.
//!
//! Customer records (name, email, phone, company) are kept in an embedded
//! `SQLite` database and reached through an asynchronous storage gateway that
//! opens the database once, upgrades its schema when needed, and runs every
//! create, update, list and delete as its own transaction.
//!
//! ## Features
//!
//! - **Storage Gateway**: memoized connect-or-reuse with cached failures
//! - **Versioned schema**: one collection keyed by an auto-increment id, with
//!   a unique email index
//! - **Field validation**: regex checks applied by the front end
//! - **CLI**: list, show, add, edit, delete and find customers

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod storage;

// Re-export commonly used types at crate root
pub use error::{Error, Result};

// Re-export core domain types
pub use crate::core::{Customer, CustomerIndex, validate_customer};

// Re-export storage types
pub use storage::{ConnectionState, Gateway, SqliteStorage, Storage};

// Re-export configuration
pub use config::{DEFAULT_DB_PATH, DatabaseConfig};

// Re-export CLI types
pub use cli::{Cli, Commands, OutputFormat};
