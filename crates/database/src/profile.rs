//! Profile document storage with deep-merge writes.

use console_core::merge_documents;
use serde_json::Value;
use sqlx::{SqliteConnection, SqlitePool};

use crate::models::ProfileRow;
use crate::Result;

/// Get a user's raw profile row.
pub async fn get_row(pool: &SqlitePool, user_id: &str) -> Result<Option<ProfileRow>> {
    let row = sqlx::query_as::<_, ProfileRow>(
        r#"
        SELECT user_id, document, created_at, updated_at
        FROM profiles
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Get a user's profile document.
pub async fn get_document(pool: &SqlitePool, user_id: &str) -> Result<Option<Value>> {
    match get_row(pool, user_id).await? {
        Some(row) => Ok(Some(serde_json::from_str(&row.document)?)),
        None => Ok(None),
    }
}

/// Check whether a profile document exists.
pub async fn profile_exists(pool: &SqlitePool, user_id: &str) -> Result<bool> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM profiles WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

/// Merge a partial document into a user's profile.
///
/// The read, merge and write run in one `BEGIN IMMEDIATE` transaction, so
/// concurrent merges queue on the write lock instead of failing the lock
/// upgrade. Creates the profile if it doesn't exist. Returns the merged
/// document.
pub async fn merge_document(pool: &SqlitePool, user_id: &str, patch: Value) -> Result<Value> {
    let mut conn = pool.acquire().await?;
    sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;

    match merge_locked(&mut conn, user_id, patch).await {
        Ok(document) => {
            sqlx::query("COMMIT").execute(&mut *conn).await?;
            Ok(document)
        }
        Err(e) => {
            if let Err(rollback) = sqlx::query("ROLLBACK").execute(&mut *conn).await {
                tracing::warn!(user_id, error = %rollback, "Rollback failed, closing connection");
                drop(conn.detach());
            }
            Err(e)
        }
    }
}

async fn merge_locked(conn: &mut SqliteConnection, user_id: &str, patch: Value) -> Result<Value> {
    let stored: Option<String> = sqlx::query_scalar(
        r#"
        SELECT document FROM profiles WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;

    let mut document = match stored {
        Some(text) => serde_json::from_str(&text)?,
        None => Value::Object(serde_json::Map::new()),
    };
    merge_documents(&mut document, patch);
    let text = serde_json::to_string(&document)?;

    sqlx::query(
        r#"
        INSERT INTO profiles (user_id, document)
        VALUES (?, ?)
        ON CONFLICT(user_id) DO UPDATE SET
            document = excluded.document,
            updated_at = datetime('now')
        "#,
    )
    .bind(user_id)
    .bind(&text)
    .execute(&mut *conn)
    .await?;

    tracing::debug!(user_id, bytes = text.len(), "Merged profile document");
    Ok(document)
}
