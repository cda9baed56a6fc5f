//! SQL schema definitions and migrations.
//!
//! One `kv` table holds both namespaces. The layout is portable between
//! SQLite and Postgres.
//!
//! # Migration System
//!
//! Migrations are code-based so each step can issue dialect-specific SQL.
//! To add one, increment `SCHEMA_VERSION` and add a match arm to
//! `run_migration`.

use crate::Result;
use crate::backend::errors::BackendError;

use super::{SqlxBackend, SqlxResultExt};

/// Current schema version.
pub const SCHEMA_VERSION: i64 = 1;

/// SQL statements to create the schema tables.
pub const CREATE_TABLES: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS schema_version (
        version BIGINT PRIMARY KEY
    )",
    // namespace is "account" or "pref"
    "CREATE TABLE IF NOT EXISTS kv (
        namespace TEXT NOT NULL,
        key TEXT NOT NULL,
        value TEXT NOT NULL,
        PRIMARY KEY (namespace, key)
    )",
];

/// Initialize the database schema.
///
/// Creates tables if they don't exist and runs migrations when the stored
/// version is older than [`SCHEMA_VERSION`]. A newer stored version is
/// refused with [`BackendError::SchemaVersionMismatch`].
pub async fn initialize(backend: &SqlxBackend) -> Result<()> {
    let pool = backend.pool();

    for statement in CREATE_TABLES {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| BackendError::SqlxError {
                reason: format!("Schema creation failed: {e} - SQL: {statement}"),
                source: Some(e),
            })?;
    }

    let row: Option<(i64,)> = sqlx::query_as("SELECT version FROM schema_version")
        .fetch_optional(pool)
        .await
        .sql_context("Failed to check schema version")?;

    match row {
        None => {
            sqlx::query("INSERT INTO schema_version (version) VALUES ($1)")
                .bind(SCHEMA_VERSION)
                .execute(pool)
                .await
                .sql_context("Failed to initialize schema version")?;
        }
        Some((current,)) if current < SCHEMA_VERSION => {
            migrate(backend, current, SCHEMA_VERSION).await?;
        }
        Some((current,)) if current > SCHEMA_VERSION => {
            return Err(BackendError::SchemaVersionMismatch {
                found: current,
                expected: SCHEMA_VERSION,
            }
            .into());
        }
        Some(_) => {}
    }

    Ok(())
}

async fn migrate(backend: &SqlxBackend, from: i64, to: i64) -> Result<()> {
    tracing::info!(from, to, "Starting SQL schema migration");

    let mut current = from;
    while current < to {
        let next = current + 1;
        run_migration(backend, current, next).await?;

        sqlx::query("UPDATE schema_version SET version = $1")
            .bind(next)
            .execute(backend.pool())
            .await
            .sql_context(&format!("Failed to update schema version to {next}"))?;

        tracing::info!(version = next, "Migration completed");
        current = next;
    }

    Ok(())
}

async fn run_migration(backend: &SqlxBackend, from: i64, to: i64) -> Result<()> {
    // No migrations exist yet; version 1 is the first layout.
    let _ = backend;
    Err(BackendError::SchemaVersionMismatch {
        found: from,
        expected: to,
    }
    .into())
}
