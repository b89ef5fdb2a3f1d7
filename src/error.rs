//! Error types for CRM-RS operations.
//!
//! This module provides the error hierarchy using `thiserror` for storage,
//! field validation and CLI commands.

use thiserror::Error;

/// Result type alias for CRM operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error types for CRM operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Storage-related errors (database operations).
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// A customer field failed validation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// CLI command errors.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// Configuration errors.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },
}

/// Storage-specific errors for database operations.
///
/// The gateway surfaces every failure as one of `Connection`, `Write` or
/// `Read`; the remaining variants come from the schema upgrade step and are
/// folded into `Connection` once they reach a gateway caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The database could not be opened.
    #[error("connection error: {0}")]
    Connection(String),

    /// An insert, update or delete transaction failed.
    #[error("write error: {reason}")]
    Write {
        /// What went wrong.
        reason: String,
        /// The key the write collided with, if that is why it failed.
        conflict: Option<WriteConflict>,
    },

    /// A read transaction or cursor traversal failed.
    #[error("read error: {0}")]
    Read(String),

    /// The stored schema is newer than the one requested.
    #[error("database is at version {stored}, cannot open at version {requested}")]
    VersionMismatch {
        /// Version recorded in the database.
        stored: u32,
        /// Version asked for by the caller.
        requested: u32,
    },

    /// Schema upgrade error.
    #[error("migration error: {0}")]
    Migration(String),

    /// The schema bookkeeping exists but holds no usable version.
    #[error("stored schema version is missing or unreadable: {0}")]
    CorruptSchema(String),
}

/// Key a rejected write collided with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteConflict {
    /// Another record already holds the primary key.
    PrimaryKey,
    /// Another record already holds the value of a unique index.
    UniqueIndex,
}

impl StorageError {
    /// Wraps a `SQLite` failure raised while opening the database.
    pub fn connection(err: impl std::fmt::Display) -> Self {
        Self::Connection(err.to_string())
    }

    /// Wraps a failure raised around a read-write transaction.
    pub fn write(err: impl std::fmt::Display) -> Self {
        Self::Write {
            reason: err.to_string(),
            conflict: None,
        }
    }

    /// Wraps a `SQLite` failure raised by a read-write transaction, keeping
    /// the constraint it hit.
    pub fn sqlite_write(err: rusqlite::Error) -> Self {
        let conflict = match &err {
            rusqlite::Error::SqliteFailure(failure, _) => match failure.extended_code {
                rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY => Some(WriteConflict::PrimaryKey),
                rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE => Some(WriteConflict::UniqueIndex),
                _ => None,
            },
            _ => None,
        };

        Self::Write {
            reason: err.to_string(),
            conflict,
        }
    }

    /// Wraps a `SQLite` failure raised by a read-only transaction.
    pub fn read(err: impl std::fmt::Display) -> Self {
        Self::Read(err.to_string())
    }

    /// Returns the key a failed write collided with.
    #[must_use]
    pub const fn conflict(&self) -> Option<WriteConflict> {
        match self {
            Self::Write { conflict, .. } => *conflict,
            _ => None,
        }
    }
}

/// Field validation errors raised before a record reaches storage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A field was empty or only whitespace.
    #[error("{field} is required")]
    Required {
        /// Name of the empty field.
        field: &'static str,
    },

    /// Name must be 3 to 50 letters or spaces.
    #[error("name must be 3 to 50 characters, letters and spaces only")]
    Name,

    /// Email does not look like an address.
    #[error("enter a valid email address")]
    Email,

    /// Phone must be 7 to 14 digits.
    #[error("phone must be 7 to 14 digits")]
    Phone,

    /// Company must be 3 to 50 letters or spaces.
    #[error("company must be 3 to 50 characters, letters and spaces only")]
    Company,
}

/// CLI command-specific errors.
#[derive(Error, Debug)]
pub enum CommandError {
    /// No customer with the given id.
    #[error("customer not found: {id}")]
    NotFound {
        /// Id that was looked up.
        id: i64,
    },

    /// Invalid argument provided.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Command execution failed.
    #[error("command execution failed: {0}")]
    ExecutionFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::Connection("unable to open database file".to_string());
        assert_eq!(
            err.to_string(),
            "connection error: unable to open database file"
        );

        let err = StorageError::VersionMismatch {
            stored: 2,
            requested: 1,
        };
        assert_eq!(
            err.to_string(),
            "database is at version 2, cannot open at version 1"
        );
    }

    #[test]
    fn test_error_from_storage() {
        let err: Error = StorageError::Read("cursor failed".to_string()).into();
        assert!(matches!(err, Error::Storage(StorageError::Read(_))));
        assert_eq!(err.to_string(), "storage error: read error: cursor failed");
    }

    #[test]
    fn test_error_from_validation() {
        let err: Error = ValidationError::Phone.into();
        assert!(matches!(err, Error::Validation(ValidationError::Phone)));
    }

    #[test]
    fn test_required_display() {
        let err = ValidationError::Required { field: "email" };
        assert_eq!(err.to_string(), "email is required");
    }

    #[test]
    fn test_command_error_display() {
        let err = CommandError::NotFound { id: 7 };
        assert_eq!(err.to_string(), "customer not found: 7");
    }

    fn sqlite_failure(extended_code: std::ffi::c_int, message: &str) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(extended_code),
            Some(message.to_string()),
        )
    }

    #[test]
    fn test_write_conflict_from_error_code() {
        let err = StorageError::sqlite_write(sqlite_failure(
            rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
            "UNIQUE constraint failed: clientes.correo",
        ));
        assert_eq!(err.conflict(), Some(WriteConflict::UniqueIndex));

        // SQLite words rowid clashes as UNIQUE too; the code tells them apart
        let err = StorageError::sqlite_write(sqlite_failure(
            rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY,
            "UNIQUE constraint failed: clientes.id",
        ));
        assert_eq!(err.conflict(), Some(WriteConflict::PrimaryKey));

        let err = StorageError::sqlite_write(sqlite_failure(
            rusqlite::ffi::SQLITE_IOERR,
            "UNIQUE constraint failed",
        ));
        assert_eq!(err.conflict(), None);

        assert_eq!(StorageError::write("disk I/O error").conflict(), None);
        assert_eq!(
            StorageError::Read("UNIQUE constraint failed".to_string()).conflict(),
            None
        );
    }

    #[test]
    fn test_error_config() {
        let err = Error::Config {
            message: "bad version".to_string(),
        };
        assert_eq!(err.to_string(), "configuration error: bad version");
    }
}
