//! Storage layer for CRM-RS.
//!
//! Customer records live in an embedded `SQLite` database. [`SqliteStorage`]
//! runs synchronous transactions against it; [`Gateway`] owns the cached
//! connection and exposes the asynchronous operations the front end uses.

pub mod gateway;
pub mod schema;
pub mod sqlite;
pub mod traits;

pub use gateway::{ConnectionState, Gateway, shared};
pub use schema::{DB_NAME, DB_VERSION};
pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageStats};
