//! Database configuration.

use crate::error::{Error, Result};
use crate::storage::schema::{DB_NAME, DB_VERSION};
use std::path::{Path, PathBuf};

/// Default database path relative to the working directory.
pub const DEFAULT_DB_PATH: &str = ".crm/CRM.db";

/// Where and at which schema version the gateway opens the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Database name, recorded in the schema.
    pub name: String,
    /// Schema version to open at.
    pub version: u32,
    /// Database file. `None` keeps the database in memory.
    pub path: Option<PathBuf>,
}

impl DatabaseConfig {
    /// Configuration for a database file at `path`.
    #[must_use]
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Configuration for a private in-memory database.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            path: None,
            ..Self::default()
        }
    }

    /// Overrides the schema version.
    #[must_use]
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Returns the database path (None for in-memory).
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Checks the configuration before anything is opened.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an empty name, version 0, or an empty
    /// path.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(config_error("database name must not be empty"));
        }
        if self.version == 0 {
            return Err(config_error("schema version must be at least 1"));
        }
        if let Some(path) = &self.path
            && path.as_os_str().is_empty()
        {
            return Err(config_error("database path must not be empty"));
        }
        Ok(())
    }
}

fn config_error(message: &str) -> Error {
    Error::Config {
        message: message.to_string(),
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: DB_NAME.to_string(),
            version: DB_VERSION,
            path: Some(PathBuf::from(DEFAULT_DB_PATH)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DatabaseConfig::default();
        assert_eq!(config.name, "CRM");
        assert_eq!(config.version, 1);
        assert_eq!(config.path(), Some(Path::new(DEFAULT_DB_PATH)));
    }

    #[test]
    fn test_builders() {
        let config = DatabaseConfig::at_path("/tmp/crm.db").with_version(2);
        assert_eq!(config.path(), Some(Path::new("/tmp/crm.db")));
        assert_eq!(config.version, 2);

        assert!(DatabaseConfig::in_memory().path().is_none());
    }

    #[test]
    fn test_validate() {
        assert!(DatabaseConfig::default().validate().is_ok());
        assert!(DatabaseConfig::in_memory().validate().is_ok());

        let err = DatabaseConfig::in_memory().with_version(0).validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "configuration error: schema version must be at least 1"
        );

        let empty_name = DatabaseConfig {
            name: " ".to_string(),
            ..DatabaseConfig::in_memory()
        };
        assert!(matches!(empty_name.validate(), Err(Error::Config { .. })));

        assert!(DatabaseConfig::at_path("").validate().is_err());
    }
}
