//! Key-value operations for SQL backends.

use crate::Result;
use crate::backend::errors::BackendError;
use crate::backend::{Namespace, WriteOp};

use super::{SqlxBackend, SqlxResultExt};

const UPSERT: &str = "INSERT INTO kv (namespace, key, value) VALUES ($1, $2, $3)
     ON CONFLICT (namespace, key) DO UPDATE SET value = excluded.value";

pub async fn get(backend: &SqlxBackend, namespace: Namespace, key: &str) -> Result<String> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT value FROM kv WHERE namespace = $1 AND key = $2")
            .bind(namespace.as_str())
            .bind(key)
            .fetch_optional(backend.pool())
            .await
            .sql_context("Failed to get value")?;

    match row {
        Some((value,)) => Ok(value),
        None => Err(BackendError::KeyNotFound {
            namespace,
            key: key.to_string(),
        }
        .into()),
    }
}

pub async fn put(backend: &SqlxBackend, namespace: Namespace, key: &str, value: &str) -> Result<()> {
    sqlx::query(UPSERT)
        .bind(namespace.as_str())
        .bind(key)
        .bind(value)
        .execute(backend.pool())
        .await
        .sql_context("Failed to put value")?;
    Ok(())
}

pub async fn delete(backend: &SqlxBackend, namespace: Namespace, key: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM kv WHERE namespace = $1 AND key = $2")
        .bind(namespace.as_str())
        .bind(key)
        .execute(backend.pool())
        .await
        .sql_context("Failed to delete value")?;

    if result.rows_affected() == 0 {
        return Err(BackendError::KeyNotFound {
            namespace,
            key: key.to_string(),
        }
        .into());
    }
    Ok(())
}

pub async fn keys(backend: &SqlxBackend, namespace: Namespace) -> Result<Vec<String>> {
    let rows: Vec<(String,)> =
        sqlx::query_as("SELECT key FROM kv WHERE namespace = $1 ORDER BY key")
            .bind(namespace.as_str())
            .fetch_all(backend.pool())
            .await
            .sql_context("Failed to list keys")?;
    Ok(rows.into_iter().map(|(key,)| key).collect())
}

pub async fn scan(backend: &SqlxBackend, namespace: Namespace) -> Result<Vec<(String, String)>> {
    let rows: Vec<(String, String)> =
        sqlx::query_as("SELECT key, value FROM kv WHERE namespace = $1 ORDER BY key")
            .bind(namespace.as_str())
            .fetch_all(backend.pool())
            .await
            .sql_context("Failed to scan namespace")?;
    Ok(rows)
}

/// Apply every operation inside one transaction.
pub async fn write_batch(backend: &SqlxBackend, ops: Vec<WriteOp>) -> Result<()> {
    let mut tx = backend
        .pool()
        .begin()
        .await
        .sql_context("Failed to begin transaction")?;

    for op in ops {
        match op {
            WriteOp::Put {
                namespace,
                key,
                value,
            } => {
                sqlx::query(UPSERT)
                    .bind(namespace.as_str())
                    .bind(key)
                    .bind(value)
                    .execute(&mut *tx)
                    .await
                    .sql_context("Failed to put value in batch")?;
            }
            WriteOp::Delete { namespace, key } => {
                sqlx::query("DELETE FROM kv WHERE namespace = $1 AND key = $2")
                    .bind(namespace.as_str())
                    .bind(key)
                    .execute(&mut *tx)
                    .await
                    .sql_context("Failed to delete value in batch")?;
            }
        }
    }

    // Dropping `tx` without commit rolls back.
    tx.commit().await.sql_context("Failed to commit batch")?;
    Ok(())
}
