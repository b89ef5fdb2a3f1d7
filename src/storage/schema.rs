//! Database schema definitions.
//!
//! Contains the SQL for the customer collection and the versioned upgrade
//! step that creates it.

/// Name of the CRM database.
pub const DB_NAME: &str = "CRM";

/// Schema version the application opens the database at.
pub const DB_VERSION: u32 = 1;

/// SQL for the bookkeeping table that records the schema version.
pub const SCHEMA_INFO_SQL: &str = r"
CREATE TABLE IF NOT EXISTS schema_info (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
";

/// SQL to check if schema is initialized.
pub const CHECK_SCHEMA_SQL: &str = r"
SELECT COUNT(*) FROM sqlite_master
WHERE type='table' AND name='schema_info';
";

/// SQL to get schema version.
pub const GET_VERSION_SQL: &str = r"
SELECT value FROM schema_info WHERE key = 'version';
";

/// SQL to set schema version.
pub const SET_VERSION_SQL: &str = r"
INSERT OR REPLACE INTO schema_info (key, value) VALUES ('version', ?);
";

/// SQL to record the database name.
pub const SET_NAME_SQL: &str = r"
INSERT OR REPLACE INTO schema_info (key, value) VALUES ('name', ?);
";

/// Upgrade step from an empty database to version 1.
///
/// `AUTOINCREMENT` keeps ids from being reused after a delete.
const UPGRADE_V0_TO_V1: &str = r"
CREATE TABLE IF NOT EXISTS clientes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    nombre TEXT NOT NULL,
    correo TEXT NOT NULL,
    telefono TEXT NOT NULL,
    empresa TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS nombre ON clientes(nombre);
CREATE UNIQUE INDEX IF NOT EXISTS correo ON clientes(correo);
CREATE INDEX IF NOT EXISTS telefono ON clientes(telefono);
CREATE INDEX IF NOT EXISTS empresa ON clientes(empresa);
";

/// A schema upgrade step.
pub struct Migration {
    /// Version this migration upgrades from.
    pub from_version: u32,
    /// Version this migration upgrades to.
    pub to_version: u32,
    /// SQL statements to execute.
    pub sql: &'static str,
}

/// Available migrations.
pub const MIGRATIONS: &[Migration] = &[Migration {
    from_version: 0,
    to_version: 1,
    sql: UPGRADE_V0_TO_V1,
}];

/// Gets the migrations needed to go from `current_version` to `target_version`.
#[must_use]
pub fn get_migrations(current_version: u32, target_version: u32) -> Vec<&'static Migration> {
    MIGRATIONS
        .iter()
        .filter(|m| m.from_version >= current_version && m.to_version <= target_version)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_version() {
        const _: () = assert!(DB_VERSION >= 1);
    }

    #[test]
    fn test_upgrade_creates_collection_and_indexes() {
        assert!(UPGRADE_V0_TO_V1.contains("CREATE TABLE IF NOT EXISTS clientes"));
        assert!(UPGRADE_V0_TO_V1.contains("AUTOINCREMENT"));
        assert!(UPGRADE_V0_TO_V1.contains("CREATE UNIQUE INDEX IF NOT EXISTS correo"));
        assert_eq!(UPGRADE_V0_TO_V1.matches("CREATE INDEX").count(), 3);
    }

    #[test]
    fn test_migrations_ordered() {
        for migration in MIGRATIONS {
            assert!(migration.to_version > migration.from_version);
        }
    }

    #[test]
    fn test_get_migrations() {
        assert_eq!(get_migrations(0, DB_VERSION).len(), 1);
        assert!(get_migrations(DB_VERSION, DB_VERSION).is_empty());
    }
}
