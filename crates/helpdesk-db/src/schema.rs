//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Users
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD first_name ON TABLE user TYPE string;
DEFINE FIELD last_name ON TABLE user TYPE string;
DEFINE FIELD department ON TABLE user TYPE string \
    ASSERT $value IN ['Finance', 'HrAdmin', 'Marketing', \
    'SystemNetwork'];
DEFINE FIELD site ON TABLE user TYPE string \
    ASSERT $value IN ['LagosOffice', 'AbujaOffice'];
DEFINE FIELD role ON TABLE user TYPE string \
    ASSERT $value IN ['User', 'Technician', 'Manager', 'Admin'];
DEFINE FIELD is_active ON TABLE user TYPE bool DEFAULT true;
DEFINE FIELD employee_id ON TABLE user TYPE option<string>;
DEFINE FIELD last_login ON TABLE user TYPE option<datetime>;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;
DEFINE INDEX idx_user_employee_id ON TABLE user \
    COLUMNS employee_id UNIQUE;
DEFINE INDEX idx_user_department ON TABLE user COLUMNS department;

-- =======================================================================
-- Tickets
-- =======================================================================
DEFINE TABLE ticket SCHEMAFULL;
DEFINE FIELD title ON TABLE ticket TYPE string;
DEFINE FIELD description ON TABLE ticket TYPE option<string>;
DEFINE FIELD status ON TABLE ticket TYPE string \
    ASSERT $value IN ['Open', 'InProgress', 'WaitingForApproval', \
    'WaitingForUser', 'Resolved', 'Closed', 'Cancelled'];
DEFINE FIELD priority ON TABLE ticket TYPE string \
    ASSERT $value IN ['Low', 'Medium', 'High', 'Urgent'];
DEFINE FIELD category ON TABLE ticket TYPE string \
    ASSERT $value IN ['AccountManagement', 'Applications', \
    'Facilities', 'Finance', 'Hardware', 'HumanResources', \
    'Networking'];
DEFINE FIELD created_by ON TABLE ticket TYPE string;
DEFINE FIELD assigned_to ON TABLE ticket TYPE option<string>;
DEFINE FIELD service_catalog_item ON TABLE ticket \
    TYPE option<string>;
DEFINE FIELD additional_data ON TABLE ticket TYPE option<string>;
DEFINE FIELD cc_emails ON TABLE ticket TYPE option<string>;
DEFINE FIELD created_at ON TABLE ticket TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE ticket TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD resolved_at ON TABLE ticket TYPE option<datetime>;
DEFINE INDEX idx_ticket_status ON TABLE ticket COLUMNS status;
DEFINE INDEX idx_ticket_created_by ON TABLE ticket \
    COLUMNS created_by;
DEFINE INDEX idx_ticket_assigned_to ON TABLE ticket \
    COLUMNS assigned_to;

-- =======================================================================
-- Service catalog
-- =======================================================================
DEFINE TABLE service_catalog_item SCHEMAFULL;
DEFINE FIELD name ON TABLE service_catalog_item TYPE string;
DEFINE FIELD description ON TABLE service_catalog_item \
    TYPE option<string>;
DEFINE FIELD category ON TABLE service_catalog_item TYPE string \
    ASSERT $value IN ['AccountManagement', 'Applications', \
    'Facilities', 'Finance', 'Hardware', 'HumanResources', \
    'Networking'];
DEFINE FIELD required_fields ON TABLE service_catalog_item \
    TYPE option<string>;
DEFINE FIELD is_active ON TABLE service_catalog_item TYPE bool \
    DEFAULT true;
DEFINE FIELD estimated_resolution_hours ON TABLE service_catalog_item \
    TYPE option<int>;
DEFINE FIELD auto_assign_to_department ON TABLE service_catalog_item \
    TYPE option<string>;
DEFINE FIELD created_at ON TABLE service_catalog_item TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_catalog_name ON TABLE service_catalog_item \
    COLUMNS name UNIQUE;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_v1_is_nonempty() {
        assert!(!SCHEMA_V1.is_empty());
    }

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }
}
