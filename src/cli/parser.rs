//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use crate::config::{DEFAULT_DB_PATH, DatabaseConfig};
use crate::core::CustomerIndex;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CRM-RS: a local contact manager.
///
/// Stores customer records (name, email, phone, company) in an embedded
/// database.
#[derive(Parser, Debug)]
#[command(name = "crm-rs")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the CRM database file.
    ///
    /// Defaults to `.crm/CRM.db` in the current directory.
    #[arg(short, long, env = "CRM_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the database, or upgrade it to the current schema.
    Init,

    /// Show database status.
    Status,

    /// List all customers.
    #[command(name = "list", alias = "ls")]
    List,

    /// Show one customer.
    Show {
        /// Customer id.
        id: i64,
    },

    /// Add a new customer.
    #[command(alias = "new")]
    Add {
        /// Customer name (letters and spaces, 3-50 characters).
        #[arg(long)]
        name: String,

        /// Email address (must be unique).
        #[arg(long)]
        email: String,

        /// Phone number (7-14 digits).
        #[arg(long)]
        phone: String,

        /// Company name (letters and spaces, 3-50 characters).
        #[arg(long)]
        company: String,
    },

    /// Edit an existing customer. Omitted fields keep their value.
    Edit {
        /// Customer id.
        id: i64,

        /// New name.
        #[arg(long)]
        name: Option<String>,

        /// New email address.
        #[arg(long)]
        email: Option<String>,

        /// New phone number.
        #[arg(long)]
        phone: Option<String>,

        /// New company name.
        #[arg(long)]
        company: Option<String>,
    },

    /// Delete a customer.
    #[command(alias = "rm")]
    Delete {
        /// Customer id.
        id: i64,
    },

    /// Find customers by an indexed field (nombre, correo, telefono, empresa).
    Find {
        /// Field to match on.
        field: CustomerIndex,

        /// Exact value to look for.
        value: String,
    },
}

impl Cli {
    /// Returns the database path, using the default if not specified.
    #[must_use]
    pub fn get_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH))
    }

    /// Builds the database configuration for this invocation.
    #[must_use]
    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig::at_path(self.get_db_path())
    }
}
