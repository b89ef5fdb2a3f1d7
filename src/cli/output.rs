//! Output formatting for CLI commands.
//!
//! Supports text and JSON output formats.

use crate::core::Customer;
use crate::error::Error;
use crate::storage::{ConnectionState, StorageStats};
use serde::Serialize;
use std::fmt::Write;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
}

impl OutputFormat {
    /// Parses format from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Formats the result of `init`.
#[must_use]
pub fn format_init(stats: &StorageStats, upgraded: bool, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let name = stats.name.as_deref().unwrap_or("CRM");
            if upgraded {
                format!(
                    "Initialized {name} database (schema v{})\n",
                    stats.schema_version
                )
            } else {
                format!(
                    "{name} database already at schema v{}\n",
                    stats.schema_version
                )
            }
        }
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct InitOutput<'a> {
                upgraded: bool,
                #[serde(flatten)]
                stats: &'a StorageStats,
            }
            format_json(&InitOutput { upgraded, stats })
        }
    }
}

/// Formats a status response.
#[must_use]
pub fn format_status(stats: &StorageStats, state: ConnectionState, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_status_text(stats, state),
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct StatusOutput<'a> {
                connection: ConnectionState,
                #[serde(flatten)]
                stats: &'a StorageStats,
            }
            format_json(&StatusOutput {
                connection: state,
                stats,
            })
        }
    }
}

fn format_status_text(stats: &StorageStats, state: ConnectionState) -> String {
    let mut output = String::new();
    output.push_str("CRM-RS Status\n");
    output.push_str("=============\n\n");
    let _ = writeln!(
        output,
        "  Database:      {}",
        stats.name.as_deref().unwrap_or("-")
    );
    let _ = writeln!(output, "  Connection:    {state}");
    let _ = writeln!(output, "  Customers:     {}", stats.customer_count);
    let _ = writeln!(output, "  Schema:        v{}", stats.schema_version);
    if let Some(size) = stats.db_size {
        let _ = writeln!(output, "  DB size:       {size} bytes");
    }
    output
}

/// Formats a customer list.
#[must_use]
pub fn format_customer_list(customers: &[Customer], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_customer_list_text(customers),
        OutputFormat::Json => format_json(&customers),
    }
}

fn format_customer_list_text(customers: &[Customer]) -> String {
    if customers.is_empty() {
        return "No customers found.\n".to_string();
    }

    let mut output = String::new();
    let _ = writeln!(
        output,
        "{:<6} {:<24} {:<16} {:<20} Email",
        "ID", "Name", "Phone", "Company"
    );
    output.push_str(&"-".repeat(90));
    output.push('\n');

    for customer in customers {
        let _ = writeln!(
            output,
            "{:<6} {:<24} {:<16} {:<20} {}",
            format_id(customer.id),
            truncate(&customer.name, 24),
            truncate(&customer.phone, 16),
            truncate(&customer.company, 20),
            customer.email
        );
    }

    output
}

/// Formats a single customer.
#[must_use]
pub fn format_customer(customer: &Customer, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            let _ = writeln!(output, "Customer: {}", customer.name);
            let _ = writeln!(output, "  ID:       {}", format_id(customer.id));
            let _ = writeln!(output, "  Email:    {}", customer.email);
            let _ = writeln!(output, "  Phone:    {}", customer.phone);
            let _ = writeln!(output, "  Company:  {}", customer.company);
            output
        }
        OutputFormat::Json => format_json(customer),
    }
}

/// Formats a successful write with a short confirmation line.
#[must_use]
pub fn format_saved(customer: &Customer, action: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format!(
            "Customer {} {action}: {}\n",
            format_id(customer.id),
            customer.name
        ),
        OutputFormat::Json => format_json(customer),
    }
}

/// Formats the result of a delete.
#[must_use]
pub fn format_deleted(id: i64, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format!("Customer {id} deleted\n"),
        OutputFormat::Json => format_json(&serde_json::json!({ "deleted": id })),
    }
}

/// Formats an error for output.
#[must_use]
pub fn format_error(error: &Error, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => error.to_string(),
        OutputFormat::Json => format_json(&serde_json::json!({ "error": error.to_string() })),
    }
}

/// Formats a value as JSON.
fn format_json<T: Serialize + ?Sized>(value: &T) -> String {
    let mut json = serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string());
    json.push('\n');
    json
}

fn format_id(id: Option<i64>) -> String {
    id.map_or_else(|| "-".to_string(), |i| i.to_string())
}

/// Truncates a string to max length (in characters) with ellipsis.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{head}...")
    }
}
