//! Storage trait definition.
//!
//! Defines the synchronous interface the gateway drives on its blocking
//! pool. Each method runs exactly one transaction.

use crate::core::{Customer, CustomerIndex};
use crate::error::Result;
use serde::Serialize;

/// Trait for persistent customer storage backends.
pub trait Storage: Send {
    /// Brings the schema up to the current version.
    ///
    /// Should be idempotent - safe to call multiple times.
    ///
    /// # Errors
    ///
    /// Returns an error if schema creation or upgrade fails.
    fn init(&mut self) -> Result<()>;

    /// Checks if storage is initialized.
    ///
    /// # Errors
    ///
    /// Returns an error if the check cannot be performed.
    fn is_initialized(&self) -> Result<bool>;

    /// Returns the stored schema version (0 for an empty database).
    ///
    /// # Errors
    ///
    /// Returns an error if the version cannot be read.
    fn schema_version(&self) -> Result<u32>;

    // ==================== Customer Operations ====================

    /// Inserts a new customer in a read-write transaction.
    ///
    /// Returns the assigned id. A record that already carries an id is
    /// inserted under that id and fails if it is taken.
    ///
    /// # Errors
    ///
    /// Returns a write error on any constraint violation.
    fn add_customer(&mut self, customer: &Customer) -> Result<i64>;

    /// Replaces the customer stored under `customer.id`, or inserts it.
    ///
    /// # Errors
    ///
    /// Returns a write error if the record has no id or the email clashes
    /// with another customer.
    fn put_customer(&mut self, customer: &Customer) -> Result<()>;

    /// Retrieves a customer by id.
    ///
    /// # Errors
    ///
    /// Returns a read error if the query fails.
    fn get_customer(&self, id: i64) -> Result<Option<Customer>>;

    /// Lists all customers in ascending id order.
    ///
    /// # Errors
    ///
    /// Returns a read error if the transaction or cursor fails.
    fn list_customers(&self) -> Result<Vec<Customer>>;

    /// Lists customers whose indexed field equals `value`, in id order.
    ///
    /// # Errors
    ///
    /// Returns a read error if the query fails.
    fn find_customers(&self, index: CustomerIndex, value: &str) -> Result<Vec<Customer>>;

    /// Deletes a customer by id. Deleting a missing id is a no-op.
    ///
    /// # Errors
    ///
    /// Returns a write error if the transaction fails.
    fn delete_customer(&mut self, id: i64) -> Result<()>;

    /// Returns the number of stored customers.
    ///
    /// # Errors
    ///
    /// Returns a read error if the count query fails.
    fn customer_count(&self) -> Result<usize>;

    /// Gets storage statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if statistics cannot be gathered.
    fn stats(&self) -> Result<StorageStats>;
}

/// Storage statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StorageStats {
    /// Database name recorded in the schema.
    pub name: Option<String>,
    /// Number of customers stored.
    pub customer_count: usize,
    /// Schema version.
    pub schema_version: u32,
    /// Database file size in bytes (if applicable).
    pub db_size: Option<u64>,
}
