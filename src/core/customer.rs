//! Customer records.
//!
//! A customer is the only entity the CRM stores. Records are plain data:
//! the storage layer assigns the id and owns the persisted copy, callers only
//! hold transient copies (e.g. to fill an edit form).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A customer record.
///
/// Serialized field names follow the persisted collection layout
/// (`nombre`, `correo`, `telefono`, `empresa`).
///
/// # Examples
///
/// ```
/// use crm_rs::core::Customer;
///
/// let customer = Customer::new("Ana Gomez", "ana@x.com", "5551234", "Acme");
/// assert!(customer.id.is_none());
/// assert_eq!(customer.email, "ana@x.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Primary key (assigned by the store on creation).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Customer name.
    #[serde(rename = "nombre")]
    pub name: String,

    /// Email address, unique across all customers.
    #[serde(rename = "correo")]
    pub email: String,

    /// Phone number, digits only.
    #[serde(rename = "telefono")]
    pub phone: String,

    /// Company name.
    #[serde(rename = "empresa")]
    pub company: String,
}

impl Customer {
    /// Creates a customer that has not been stored yet.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        company: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            company: company.into(),
        }
    }

    /// Returns a copy of this record carrying the given id.
    #[must_use]
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Returns the value this record holds for an indexed field.
    #[must_use]
    pub fn field(&self, index: CustomerIndex) -> &str {
        match index {
            CustomerIndex::Nombre => &self.name,
            CustomerIndex::Correo => &self.email,
            CustomerIndex::Telefono => &self.phone,
            CustomerIndex::Empresa => &self.company,
        }
    }
}

/// Secondary indexes on the customer collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerIndex {
    /// Name index (non-unique).
    Nombre,
    /// Email index (unique).
    Correo,
    /// Phone index (non-unique).
    Telefono,
    /// Company index (non-unique).
    Empresa,
}

impl CustomerIndex {
    /// All indexes, in schema order.
    pub const ALL: [Self; 4] = [Self::Nombre, Self::Correo, Self::Telefono, Self::Empresa];

    /// Column (and index) name in the collection.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Nombre => "nombre",
            Self::Correo => "correo",
            Self::Telefono => "telefono",
            Self::Empresa => "empresa",
        }
    }

    /// Whether the index enforces uniqueness.
    #[must_use]
    pub const fn is_unique(self) -> bool {
        matches!(self, Self::Correo)
    }
}

impl fmt::Display for CustomerIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for CustomerIndex {
    type Err = String;

    /// Accepts the persisted column name or its English alias.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nombre" | "name" => Ok(Self::Nombre),
            "correo" | "email" => Ok(Self::Correo),
            "telefono" | "phone" => Ok(Self::Telefono),
            "empresa" | "company" => Ok(Self::Empresa),
            other => Err(format!("unknown index: {other}")),
        }
    }
}
