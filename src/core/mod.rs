//! Core domain models for CRM-RS.
//!
//! The customer record, its indexed fields, and the field validation the
//! front end applies before a record is stored. Nothing here does I/O.

pub mod customer;
pub mod validation;

pub use customer::{Customer, CustomerIndex};
pub use validation::validate_customer;
