//! Schema definitions and migration runner for SurrealDB.
//!
//! Tables are SCHEMAFULL. UUIDs are stored as strings, enums as
//! lowercase strings guarded by ASSERT. `owner_id` is READONLY so the
//! owning actor cannot change after creation.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{debug, info};

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
-- Organizations (owner scope)
-- =======================================================================
DEFINE TABLE organization SCHEMAFULL;
DEFINE FIELD name ON TABLE organization TYPE string;
DEFINE FIELD location ON TABLE organization TYPE string;
DEFINE FIELD owner_id ON TABLE organization TYPE string READONLY;
DEFINE FIELD created_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_organization_owner ON TABLE organization \
    COLUMNS owner_id;

-- =======================================================================
-- Projects (scoped to organization)
-- =======================================================================
DEFINE TABLE project SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE project TYPE string;
DEFINE FIELD name ON TABLE project TYPE string;
DEFINE FIELD description ON TABLE project TYPE string DEFAULT '';
DEFINE FIELD owner_id ON TABLE project TYPE string READONLY;
DEFINE FIELD created_at ON TABLE project TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE project TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_project_org_owner ON TABLE project \
    COLUMNS organization_id, owner_id;

-- =======================================================================
-- Instances (scoped to project)
-- =======================================================================
DEFINE TABLE instance SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE instance TYPE string;
DEFINE FIELD project_id ON TABLE instance TYPE string;
DEFINE FIELD name ON TABLE instance TYPE string;
DEFINE FIELD engine ON TABLE instance TYPE string \
    ASSERT $value IN ['mysql', 'mariadb', 'mongodb', 'postgres'];
DEFINE FIELD enable_backups ON TABLE instance TYPE bool DEFAULT false;
DEFINE FIELD admin_password_hash ON TABLE instance TYPE string;
DEFINE FIELD allow_cidrs ON TABLE instance TYPE array<string> \
    ASSERT array::len($value) > 0;
DEFINE FIELD owner_id ON TABLE instance TYPE string READONLY;
DEFINE FIELD status ON TABLE instance TYPE string \
    ASSERT $value IN ['pending', 'running', 'failed'];
DEFINE FIELD created_at ON TABLE instance TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE instance TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_instance_project_name ON TABLE instance \
    COLUMNS project_id, name;
DEFINE INDEX idx_instance_owner ON TABLE instance \
    COLUMNS owner_id;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the recorded maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let current = current_version(db).await?;
    let pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| m.version > current).collect();
    if pending.is_empty() {
        debug!(version = current, "Schema is up to date");
        return Ok(());
    }

    for migration in pending {
        apply(db, migration).await?;
    }

    Ok(())
}

async fn current_version<C: Connection>(db: &Surreal<C>) -> Result<u32, DbError> {
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    Ok(records.first().map(|m| m.version).unwrap_or(0))
}

async fn apply<C: Connection>(db: &Surreal<C>, migration: &Migration) -> Result<(), DbError> {
    info!(
        version = migration.version,
        name = migration.name,
        "Applying migration"
    );

    db.query(migration.sql).await?.check().map_err(|e| {
        DbError::Migration(format!(
            "v{} '{}' failed: {e}",
            migration.version, migration.name
        ))
    })?;

    db.query("CREATE _migration SET version = $version, name = $name")
        .bind(("version", migration.version))
        .bind(("name", migration.name))
        .await?
        .check()
        .map_err(|e| {
            DbError::Migration(format!(
                "could not record v{}: {e}",
                migration.version
            ))
        })?;

    info!(version = migration.version, "Migration applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_v1_defines_hierarchy_tables() {
        for table in ["organization", "project", "instance"] {
            assert!(
                SCHEMA_V1.contains(&format!("DEFINE TABLE {table} SCHEMAFULL")),
                "missing {table}"
            );
        }
    }

    #[test]
    fn instance_status_constraint_matches_lifecycle() {
        assert!(SCHEMA_V1.contains("ASSERT $value IN ['pending', 'running', 'failed']"));
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
