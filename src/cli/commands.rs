//! CLI command implementations.
//!
//! Each command reads its fields from the parsed arguments, validates them,
//! and hands the record to the storage gateway.

use crate::cli::output::{
    OutputFormat, format_customer, format_customer_list, format_deleted, format_init,
    format_saved, format_status,
};
use crate::cli::parser::{Cli, Commands};
use crate::core::{Customer, CustomerIndex, validate_customer};
use crate::error::{CommandError, Error, Result, WriteConflict};
use crate::storage::Gateway;
use tracing::debug;

/// Executes the CLI command against a fresh gateway for `cli`'s database.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub async fn execute(cli: &Cli) -> Result<String> {
    let gateway = Gateway::new(cli.database_config());
    execute_with(&gateway, &cli.command, OutputFormat::parse(&cli.format)).await
}

/// Executes a command against an existing gateway.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub async fn execute_with(
    gateway: &Gateway,
    command: &Commands,
    format: OutputFormat,
) -> Result<String> {
    debug!(?command, "executing command");

    match command {
        Commands::Init => cmd_init(gateway, format).await,
        Commands::Status => cmd_status(gateway, format).await,
        Commands::List => cmd_list(gateway, format).await,
        Commands::Show { id } => cmd_show(gateway, *id, format).await,
        Commands::Add {
            name,
            email,
            phone,
            company,
        } => {
            let customer = Customer::new(name, email, phone, company);
            cmd_add(gateway, customer, format).await
        }
        Commands::Edit {
            id,
            name,
            email,
            phone,
            company,
        } => {
            let changes = CustomerChanges {
                name: name.clone(),
                email: email.clone(),
                phone: phone.clone(),
                company: company.clone(),
            };
            cmd_edit(gateway, *id, changes, format).await
        }
        Commands::Delete { id } => cmd_delete(gateway, *id, format).await,
        Commands::Find { field, value } => cmd_find(gateway, *field, value, format).await,
    }
}

/// Fields given to `edit`; `None` keeps the stored value.
#[derive(Debug, Default)]
struct CustomerChanges {
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    company: Option<String>,
}

impl CustomerChanges {
    fn apply(self, customer: &mut Customer) {
        if let Some(name) = self.name {
            customer.name = name;
        }
        if let Some(email) = self.email {
            customer.email = email;
        }
        if let Some(phone) = self.phone {
            customer.phone = phone;
        }
        if let Some(company) = self.company {
            customer.company = company;
        }
    }
}

/// Loads a customer or reports it as not found.
async fn load_customer(gateway: &Gateway, id: i64) -> Result<Customer> {
    gateway
        .get(id)
        .await?
        .ok_or_else(|| CommandError::NotFound { id }.into())
}

/// Rewords a unique-email failure; other errors pass through.
fn explain_write_error(err: Error, email: &str) -> Error {
    match err {
        Error::Storage(ref storage) if storage.conflict() == Some(WriteConflict::UniqueIndex) => {
            CommandError::ExecutionFailed(format!("a customer with email {email} already exists"))
                .into()
        }
        other => other,
    }
}

// ==================== Command Implementations ====================

async fn cmd_init(gateway: &Gateway, format: OutputFormat) -> Result<String> {
    gateway.connect().await?;
    let stats = gateway.stats().await?;
    Ok(format_init(&stats, gateway.upgrade_count() > 0, format))
}

async fn cmd_status(gateway: &Gateway, format: OutputFormat) -> Result<String> {
    let stats = gateway.stats().await?;
    Ok(format_status(&stats, gateway.state(), format))
}

async fn cmd_list(gateway: &Gateway, format: OutputFormat) -> Result<String> {
    let customers = gateway.list().await?;
    Ok(format_customer_list(&customers, format))
}

async fn cmd_show(gateway: &Gateway, id: i64, format: OutputFormat) -> Result<String> {
    let customer = load_customer(gateway, id).await?;
    Ok(format_customer(&customer, format))
}

async fn cmd_add(gateway: &Gateway, customer: Customer, format: OutputFormat) -> Result<String> {
    validate_customer(&customer)?;

    let email = customer.email.clone();
    let id = gateway
        .create(customer.clone())
        .await
        .map_err(|e| explain_write_error(e, &email))?;

    Ok(format_saved(&customer.with_id(id), "added", format))
}

async fn cmd_edit(
    gateway: &Gateway,
    id: i64,
    changes: CustomerChanges,
    format: OutputFormat,
) -> Result<String> {
    let mut customer = load_customer(gateway, id).await?;
    changes.apply(&mut customer);
    validate_customer(&customer)?;

    let email = customer.email.clone();
    gateway
        .update(customer.clone())
        .await
        .map_err(|e| explain_write_error(e, &email))?;

    Ok(format_saved(&customer, "updated", format))
}

async fn cmd_delete(gateway: &Gateway, id: i64, format: OutputFormat) -> Result<String> {
    gateway.delete(id).await?;
    Ok(format_deleted(id, format))
}

async fn cmd_find(
    gateway: &Gateway,
    field: CustomerIndex,
    value: &str,
    format: OutputFormat,
) -> Result<String> {
    let customers = gateway.find_by(field, value).await?;
    Ok(format_customer_list(&customers, format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::error::ValidationError;

    fn gateway() -> Gateway {
        Gateway::new(DatabaseConfig::in_memory())
    }

    fn add_ana() -> Commands {
        Commands::Add {
            name: "Ana Gomez".to_string(),
            email: "ana@x.com".to_string(),
            phone: "5551234".to_string(),
            company: "Acme".to_string(),
        }
    }

    #[test]
    fn test_changes_apply_only_given_fields() {
        let mut customer = Customer::new("Ana Gomez", "ana@x.com", "5551234", "Acme").with_id(1);
        CustomerChanges {
            phone: Some("5559999".to_string()),
            ..CustomerChanges::default()
        }
        .apply(&mut customer);

        assert_eq!(customer.phone, "5559999");
        assert_eq!(customer.name, "Ana Gomez");
        assert_eq!(customer.id, Some(1));
    }

    #[tokio::test]
    async fn test_add_then_list() {
        let gateway = gateway();
        let out = execute_with(&gateway, &add_ana(), OutputFormat::Text)
            .await
            .unwrap();
        assert_eq!(out, "Customer 1 added: Ana Gomez\n");

        let out = execute_with(&gateway, &Commands::List, OutputFormat::Text)
            .await
            .unwrap();
        assert!(out.contains("Ana Gomez"));
    }

    #[tokio::test]
    async fn test_add_rejects_invalid_fields() {
        let gateway = gateway();
        let command = Commands::Add {
            name: "Ana Gomez".to_string(),
            email: "ana@x.com".to_string(),
            phone: "12".to_string(),
            company: "Acme".to_string(),
        };

        let err = execute_with(&gateway, &command, OutputFormat::Text)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::Phone)));
        assert!(gateway.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_duplicate_email_is_explained() {
        let gateway = gateway();
        execute_with(&gateway, &add_ana(), OutputFormat::Text)
            .await
            .unwrap();

        let err = execute_with(&gateway, &add_ana(), OutputFormat::Text)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "command error: command execution failed: a customer with email ana@x.com already exists"
        );
    }

    #[tokio::test]
    async fn test_edit_missing_customer() {
        let gateway = gateway();
        let command = Commands::Edit {
            id: 9,
            name: Some("Someone Else".to_string()),
            email: None,
            phone: None,
            company: None,
        };

        let err = execute_with(&gateway, &command, OutputFormat::Text)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Command(CommandError::NotFound { id: 9 })));
    }

    #[tokio::test]
    async fn test_edit_keeps_other_fields() {
        let gateway = gateway();
        execute_with(&gateway, &add_ana(), OutputFormat::Text)
            .await
            .unwrap();

        let command = Commands::Edit {
            id: 1,
            name: None,
            email: None,
            phone: None,
            company: Some("Globex".to_string()),
        };
        execute_with(&gateway, &command, OutputFormat::Text)
            .await
            .unwrap();

        let stored = gateway.get(1).await.unwrap().unwrap();
        assert_eq!(stored.company, "Globex");
        assert_eq!(stored.email, "ana@x.com");
    }

    #[tokio::test]
    async fn test_delete_unknown_id_succeeds() {
        let gateway = gateway();
        let out = execute_with(&gateway, &Commands::Delete { id: 5 }, OutputFormat::Json)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["deleted"], 5);
    }
}
