//! `SQLite` storage implementation.
//!
//! Provides persistent customer storage using `SQLite`. Every write runs in
//! an `IMMEDIATE` transaction and every read in a deferred one, so each
//! operation sees and leaves a consistent snapshot.

// SQLite stores all integers as i64. Counts are never negative.
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use crate::core::{Customer, CustomerIndex};
use crate::error::{Result, StorageError};
use crate::storage::schema::{
    CHECK_SCHEMA_SQL, DB_NAME, DB_VERSION, GET_VERSION_SQL, SCHEMA_INFO_SQL, SET_NAME_SQL,
    SET_VERSION_SQL, get_migrations,
};
use crate::storage::traits::{Storage, StorageStats};
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const SELECT_CUSTOMER: &str = "SELECT id, nombre, correo, telefono, empresa FROM clientes";

/// SQLite-based customer storage.
///
/// # Examples
///
/// ```no_run
/// use crm_rs::storage::{SqliteStorage, Storage};
///
/// let mut storage = SqliteStorage::open("CRM.db").unwrap();
/// storage.init().unwrap();
/// ```
pub struct SqliteStorage {
    /// `SQLite` connection.
    conn: Connection,
    /// Path to the database file (None for in-memory).
    path: Option<PathBuf>,
}

impl SqliteStorage {
    /// Opens or creates a `SQLite` database at the given path.
    ///
    /// Only the raw connection is established; call [`Self::upgrade_to`] or
    /// [`Storage::init`] to create the schema.
    ///
    /// # Errors
    ///
    /// Returns a connection error if the file cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(StorageError::connection)?;
        }

        let conn = Connection::open(&path).map_err(StorageError::connection)?;

        conn.execute("PRAGMA foreign_keys = ON;", [])
            .map_err(StorageError::connection)?;

        // journal_mode returns the resulting mode as a row
        let _: String = conn
            .query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))
            .map_err(StorageError::connection)?;

        debug!(path = %path.display(), "opened sqlite database");

        Ok(Self {
            conn,
            path: Some(path),
        })
    }

    /// Creates an in-memory `SQLite` database.
    ///
    /// Useful for testing.
    ///
    /// # Errors
    ///
    /// Returns a connection error if the database cannot be created.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(StorageError::connection)?;
        conn.execute("PRAGMA foreign_keys = ON;", [])
            .map_err(StorageError::connection)?;

        Ok(Self { conn, path: None })
    }

    /// Returns the database path (None for in-memory).
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Opens the schema at `version`, upgrading it if needed.
    ///
    /// When the stored version is lower than `version` (an empty database
    /// counts as version 0) the pending migrations run in one exclusive
    /// transaction and the previous version is returned. When the versions
    /// match nothing happens and `None` is returned.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::VersionMismatch`] if the stored version is
    /// higher than `version`, and [`StorageError::Migration`] if an upgrade
    /// step fails. A failed upgrade leaves the database untouched.
    pub fn upgrade_to(&mut self, name: &str, version: u32) -> Result<Option<u32>> {
        if version == 0 {
            return Err(
                StorageError::Connection("schema version must be at least 1".to_string()).into(),
            );
        }

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Exclusive)
            .map_err(StorageError::connection)?;

        let stored = read_version(&tx, StorageError::connection)?;
        if stored > version {
            return Err(StorageError::VersionMismatch {
                stored,
                requested: version,
            }
            .into());
        }
        if stored == version {
            return Ok(None);
        }

        info!(db = name, from = stored, to = version, "upgrading schema");

        tx.execute_batch(SCHEMA_INFO_SQL)
            .map_err(|e| StorageError::Migration(e.to_string()))?;
        for migration in get_migrations(stored, version) {
            tx.execute_batch(migration.sql)
                .map_err(|e| StorageError::Migration(e.to_string()))?;
        }
        tx.execute(SET_VERSION_SQL, params![version.to_string()])
            .map_err(|e| StorageError::Migration(e.to_string()))?;
        tx.execute(SET_NAME_SQL, params![name])
            .map_err(|e| StorageError::Migration(e.to_string()))?;

        tx.commit()
            .map_err(|e| StorageError::Migration(e.to_string()))?;

        Ok(Some(stored))
    }

    fn customer_from_row(row: &Row<'_>) -> rusqlite::Result<Customer> {
        Ok(Customer {
            id: Some(row.get(0)?),
            name: row.get(1)?,
            email: row.get(2)?,
            phone: row.get(3)?,
            company: row.get(4)?,
        })
    }

    /// Walks a query's rows front to back, collecting every customer.
    fn collect_customers(
        conn: &Connection,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> rusqlite::Result<Vec<Customer>> {
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;

        let mut customers = Vec::new();
        while let Some(row) = rows.next()? {
            customers.push(Self::customer_from_row(row)?);
        }
        Ok(customers)
    }
}

/// Reads the stored schema version, 0 when the database is empty.
///
/// `wrap` classifies `SQLite` failures. Bookkeeping without a parseable
/// version is reported as [`StorageError::CorruptSchema`] rather than read
/// as an empty database, so a damaged store is never upgraded over.
fn read_version<F>(conn: &Connection, wrap: F) -> Result<u32>
where
    F: Fn(rusqlite::Error) -> StorageError,
{
    let initialized: i64 = conn
        .query_row(CHECK_SCHEMA_SQL, [], |row| row.get(0))
        .map_err(&wrap)?;
    if initialized == 0 {
        return Ok(0);
    }

    let version: Option<String> = conn
        .query_row(GET_VERSION_SQL, [], |row| row.get(0))
        .optional()
        .map_err(&wrap)?;

    match version {
        Some(raw) => raw.trim().parse().map_err(|_| {
            StorageError::CorruptSchema(format!("version is {raw:?}")).into()
        }),
        None => Err(StorageError::CorruptSchema("no version recorded".to_string()).into()),
    }
}

impl Storage for SqliteStorage {
    fn init(&mut self) -> Result<()> {
        self.upgrade_to(DB_NAME, DB_VERSION)?;
        Ok(())
    }

    fn is_initialized(&self) -> Result<bool> {
        let count: i64 = self
            .conn
            .query_row(CHECK_SCHEMA_SQL, [], |row| row.get(0))
            .map_err(StorageError::read)?;
        Ok(count > 0)
    }

    fn schema_version(&self) -> Result<u32> {
        read_version(&self.conn, StorageError::read)
    }

    // ==================== Customer Operations ====================

    fn add_customer(&mut self, customer: &Customer) -> Result<i64> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StorageError::sqlite_write)?;

        let id = if let Some(id) = customer.id {
            tx.execute(
                r"
            INSERT INTO clientes (id, nombre, correo, telefono, empresa)
            VALUES (?, ?, ?, ?, ?)
        ",
                params![
                    id,
                    customer.name,
                    customer.email,
                    customer.phone,
                    customer.company
                ],
            )
            .map_err(StorageError::sqlite_write)?;
            id
        } else {
            tx.execute(
                r"
            INSERT INTO clientes (nombre, correo, telefono, empresa)
            VALUES (?, ?, ?, ?)
        ",
                params![
                    customer.name,
                    customer.email,
                    customer.phone,
                    customer.company
                ],
            )
            .map_err(StorageError::sqlite_write)?;
            tx.last_insert_rowid()
        };

        tx.commit().map_err(StorageError::sqlite_write)?;
        debug!(id, "added customer");

        Ok(id)
    }

    fn put_customer(&mut self, customer: &Customer) -> Result<()> {
        let id = customer
            .id
            .ok_or_else(|| StorageError::write("customer record has no id"))?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StorageError::sqlite_write)?;

        // Conflict target is the key only, so an email clash still aborts.
        tx.execute(
            r"
            INSERT INTO clientes (id, nombre, correo, telefono, empresa)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                nombre = excluded.nombre,
                correo = excluded.correo,
                telefono = excluded.telefono,
                empresa = excluded.empresa
        ",
            params![
                id,
                customer.name,
                customer.email,
                customer.phone,
                customer.company
            ],
        )
        .map_err(StorageError::sqlite_write)?;

        tx.commit().map_err(StorageError::sqlite_write)?;
        debug!(id, "stored customer");

        Ok(())
    }

    fn get_customer(&self, id: i64) -> Result<Option<Customer>> {
        let customer = self
            .conn
            .query_row(
                &format!("{SELECT_CUSTOMER} WHERE id = ?"),
                params![id],
                Self::customer_from_row,
            )
            .optional()
            .map_err(StorageError::read)?;

        Ok(customer)
    }

    fn list_customers(&self) -> Result<Vec<Customer>> {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(StorageError::read)?;

        let customers =
            Self::collect_customers(&tx, &format!("{SELECT_CUSTOMER} ORDER BY id"), [])
                .map_err(StorageError::read)?;

        tx.commit().map_err(StorageError::read)?;
        Ok(customers)
    }

    fn find_customers(&self, index: CustomerIndex, value: &str) -> Result<Vec<Customer>> {
        let sql = format!(
            "{SELECT_CUSTOMER} WHERE {} = ? ORDER BY id",
            index.column()
        );

        Ok(Self::collect_customers(&self.conn, &sql, params![value])
            .map_err(StorageError::read)?)
    }

    fn delete_customer(&mut self, id: i64) -> Result<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StorageError::sqlite_write)?;

        let removed = tx
            .execute("DELETE FROM clientes WHERE id = ?", params![id])
            .map_err(StorageError::sqlite_write)?;

        tx.commit().map_err(StorageError::sqlite_write)?;
        debug!(id, removed, "deleted customer");

        Ok(())
    }

    fn customer_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM clientes", [], |row| row.get(0))
            .map_err(StorageError::read)?;
        Ok(count as usize)
    }

    fn stats(&self) -> Result<StorageStats> {
        let schema_version = self.schema_version()?;

        let name: Option<String> = if schema_version > 0 {
            self.conn
                .query_row(
                    "SELECT value FROM schema_info WHERE key = 'name'",
                    [],
                    |row| row.get(0),
                )
                .optional()
                .map_err(StorageError::read)?
        } else {
            None
        };

        let customer_count = if schema_version > 0 {
            self.customer_count()?
        } else {
            0
        };

        let db_size = self
            .path
            .as_ref()
            .and_then(|p| std::fs::metadata(p).ok().map(|m| m.len()));

        Ok(StorageStats {
            name,
            customer_count,
            schema_version,
            db_size,
        })
    }
}
