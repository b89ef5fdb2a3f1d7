//! Asynchronous storage gateway.
//!
//! The gateway owns one database connection for its whole lifetime. The
//! first operation opens it (running the schema upgrade if the stored version
//! is behind), every later operation reuses it, and a failed open is
//! remembered so callers get the same error instead of a fresh attempt.
//!
//! `SQLite` calls are blocking, so each operation is shipped to tokio's
//! blocking pool and runs there as a single transaction.

use crate::config::DatabaseConfig;
use crate::core::{Customer, CustomerIndex};
use crate::error::{Error, Result, StorageError};
use crate::storage::sqlite::SqliteStorage;
use crate::storage::traits::{Storage, StorageStats};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Lifecycle of the gateway's connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// Nothing has asked for the connection yet.
    Closed,
    /// The database is being opened (and possibly upgraded).
    Opening,
    /// The connection is cached and shared by all operations.
    Open,
    /// Opening failed; every operation reports the open error.
    Failed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Closed => "closed",
            Self::Opening => "opening",
            Self::Open => "open",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Transaction mode an operation runs in.
///
/// Decides how failures outside the store itself (a poisoned lock, a
/// panicked worker) are classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TransactionMode {
    /// Read-only transaction; failures are read errors.
    ReadOnly,
    /// Read-write transaction; failures are write errors.
    ReadWrite,
}

impl TransactionMode {
    fn error(self, reason: impl fmt::Display) -> StorageError {
        match self {
            Self::ReadOnly => StorageError::read(reason),
            Self::ReadWrite => StorageError::write(reason),
        }
    }
}

type Handle = Arc<Mutex<SqliteStorage>>;

struct Inner {
    config: DatabaseConfig,
    connection: OnceCell<std::result::Result<Handle, StorageError>>,
    opening: AtomicBool,
    upgrades: AtomicUsize,
}

/// Connect-or-reuse access to the customer store.
///
/// Cloning is cheap; clones share the connection.
///
/// # Examples
///
/// ```
/// use crm_rs::config::DatabaseConfig;
/// use crm_rs::core::Customer;
/// use crm_rs::storage::Gateway;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let gateway = Gateway::new(DatabaseConfig::in_memory());
/// let id = gateway
///     .create(Customer::new("Ana Gomez", "ana@x.com", "5551234", "Acme"))
///     .await
///     .unwrap();
/// assert_eq!(gateway.list().await.unwrap()[0].id, Some(id));
/// # }
/// ```
#[derive(Clone)]
pub struct Gateway {
    inner: Arc<Inner>,
}

impl Gateway {
    /// Creates a gateway. Nothing is opened until the first operation.
    #[must_use]
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                connection: OnceCell::new(),
                opening: AtomicBool::new(false),
                upgrades: AtomicUsize::new(0),
            }),
        }
    }

    /// Returns the configuration the gateway opens with.
    #[must_use]
    pub fn config(&self) -> &DatabaseConfig {
        &self.inner.config
    }

    /// Returns the current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        match self.inner.connection.get() {
            Some(Ok(_)) => ConnectionState::Open,
            Some(Err(_)) => ConnectionState::Failed,
            None if self.inner.opening.load(Ordering::Acquire) => ConnectionState::Opening,
            None => ConnectionState::Closed,
        }
    }

    /// Number of schema upgrades this gateway has run (0 or 1).
    #[must_use]
    pub fn upgrade_count(&self) -> usize {
        self.inner.upgrades.load(Ordering::Acquire)
    }

    /// Opens the database, or waits for an open already in progress.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Connection`] if the database cannot be opened
    /// or upgraded. The failure is cached.
    pub async fn connect(&self) -> Result<()> {
        self.handle().await.map(|_| ())
    }

    /// Inserts a new customer and returns its assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] if the email is already taken.
    pub async fn create(&self, customer: Customer) -> Result<i64> {
        self.run(TransactionMode::ReadWrite, move |storage| {
            storage.add_customer(&customer)
        })
        .await
    }

    /// Replaces the customer stored under `customer.id` (or inserts it).
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] if the record has no id or its email
    /// belongs to another customer.
    pub async fn update(&self, customer: Customer) -> Result<()> {
        self.run(TransactionMode::ReadWrite, move |storage| {
            storage.put_customer(&customer)
        })
        .await
    }

    /// Lists every customer in ascending id order.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the read transaction fails.
    pub async fn list(&self) -> Result<Vec<Customer>> {
        self.run(TransactionMode::ReadOnly, |storage| storage.list_customers())
            .await
    }

    /// Deletes a customer. Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] if the transaction fails.
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.run(TransactionMode::ReadWrite, move |storage| {
            storage.delete_customer(id)
        })
        .await
    }

    /// Fetches one customer by id.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the read transaction fails.
    pub async fn get(&self, id: i64) -> Result<Option<Customer>> {
        self.run(TransactionMode::ReadOnly, move |storage| storage.get_customer(id))
            .await
    }

    /// Lists customers whose indexed field equals `value`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the read transaction fails.
    pub async fn find_by(
        &self,
        index: CustomerIndex,
        value: impl Into<String>,
    ) -> Result<Vec<Customer>> {
        let value = value.into();
        self.run(TransactionMode::ReadOnly, move |storage| {
            storage.find_customers(index, &value)
        })
        .await
    }

    /// Gathers storage statistics.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the statistics cannot be read.
    pub async fn stats(&self) -> Result<StorageStats> {
        self.run(TransactionMode::ReadOnly, |storage| storage.stats())
            .await
    }

    /// Runs one store call on the blocking pool against the shared connection.
    async fn run<T, F>(&self, mode: TransactionMode, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteStorage) -> Result<T> + Send + 'static,
    {
        let handle = self.handle().await?;

        let result = tokio::task::spawn_blocking(move || -> Result<T> {
            let mut storage = handle.lock().map_err(|e| mode.error(e))?;
            op(&mut storage)
        })
        .await
        .map_err(|e| Error::from(mode.error(e)))?;

        if let Err(err) = &result {
            warn!(?mode, error = %err, "storage operation failed");
        }
        result
    }

    async fn handle(&self) -> Result<Handle> {
        let outcome = self
            .inner
            .connection
            .get_or_init(|| self.open())
            .await;

        match outcome {
            Ok(handle) => Ok(Arc::clone(handle)),
            Err(err) => Err(err.clone().into()),
        }
    }

    /// Opens and upgrades the database. Runs at most once per gateway.
    ///
    /// The blocking open is detached from this future: if the caller stops
    /// waiting, the open (and any upgrade) still finishes and is still
    /// counted, and the gateway drops back to `Closed`.
    async fn open(&self) -> std::result::Result<Handle, StorageError> {
        let opening = OpeningGuard::enter(&self.inner.opening);

        let inner = Arc::clone(&self.inner);
        debug!(db = %inner.config.name, version = inner.config.version, "opening database");

        let opened = tokio::task::spawn_blocking(move || -> std::result::Result<_, StorageError> {
            let (storage, upgraded_from) = open_storage(&inner.config)?;
            if let Some(from) = upgraded_from {
                inner.upgrades.fetch_add(1, Ordering::AcqRel);
                info!(
                    db = %inner.config.name,
                    from,
                    to = inner.config.version,
                    "schema upgraded"
                );
            }
            Ok(storage)
        })
        .await
        .map_err(StorageError::connection)
        .and_then(|opened| opened);

        // The result is about to be cached, which settles the state.
        opening.complete();

        match opened {
            Ok(storage) => Ok(Arc::new(Mutex::new(storage))),
            Err(err) => {
                warn!(error = %err, "failed to open database");
                Err(err)
            }
        }
    }
}

/// Marks an open as in progress until it completes or its future is dropped.
struct OpeningGuard<'a> {
    flag: &'a AtomicBool,
    completed: bool,
}

impl<'a> OpeningGuard<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self {
            flag,
            completed: false,
        }
    }

    fn complete(mut self) {
        self.completed = true;
    }
}

impl Drop for OpeningGuard<'_> {
    fn drop(&mut self) {
        if !self.completed {
            self.flag.store(false, Ordering::Release);
        }
    }
}

/// Opens the configured database and brings its schema to the requested
/// version. Any failure on the way is a connection error.
fn open_storage(
    config: &DatabaseConfig,
) -> std::result::Result<(SqliteStorage, Option<u32>), StorageError> {
    config.validate().map_err(into_connection_error)?;

    let mut storage = match config.path() {
        Some(path) => SqliteStorage::open(path),
        None => SqliteStorage::in_memory(),
    }
    .map_err(into_connection_error)?;

    let upgraded_from = storage
        .upgrade_to(&config.name, config.version)
        .map_err(into_connection_error)?;

    Ok((storage, upgraded_from))
}

fn into_connection_error(err: Error) -> StorageError {
    match err {
        Error::Storage(StorageError::Connection(reason)) => StorageError::Connection(reason),
        Error::Storage(other) => StorageError::Connection(other.to_string()),
        other => StorageError::Connection(other.to_string()),
    }
}

static SHARED: OnceLock<Gateway> = OnceLock::new();

/// Returns the process-wide gateway, creating it from `config` on first use.
///
/// Later calls return the same gateway and ignore their `config`.
pub fn shared(config: DatabaseConfig) -> &'static Gateway {
    SHARED.get_or_init(|| Gateway::new(config))
}
