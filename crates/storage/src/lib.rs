use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};

use shared::domain::{SessionCredential, UserRole};

/// Client-side durable store. Holds the persisted session credential and
/// the cached notice feed between app launches.
#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone)]
pub struct StoredNotice {
    pub notice_id: i64,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        let storage = Self { pool };
        storage.ensure_tables().await?;
        Ok(storage)
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    async fn ensure_tables(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS session_credential (
                slot         INTEGER PRIMARY KEY CHECK (slot = 0),
                access_token TEXT NOT NULL,
                role         TEXT NOT NULL,
                updated_at   TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("failed to ensure session_credential table exists")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS notices (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                body       TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("failed to ensure notices table exists")?;

        Ok(())
    }

    pub async fn save_credential(&self, credential: &SessionCredential) -> Result<()> {
        sqlx::query(
            "INSERT INTO session_credential (slot, access_token, role, updated_at)
             VALUES (0, ?, ?, CURRENT_TIMESTAMP)
             ON CONFLICT(slot) DO UPDATE SET
                access_token = excluded.access_token,
                role = excluded.role,
                updated_at = excluded.updated_at",
        )
        .bind(&credential.access_token)
        .bind(role_to_str(credential.role))
        .execute(&self.pool)
        .await
        .context("failed to persist session credential")?;
        Ok(())
    }

    pub async fn load_credential(&self) -> Result<Option<SessionCredential>> {
        let row = sqlx::query("SELECT access_token, role FROM session_credential WHERE slot = 0")
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let access_token: String = row.try_get("access_token")?;
        let role = role_from_str(&row.try_get::<String, _>("role")?)?;
        Ok(Some(SessionCredential { access_token, role }))
    }

    /// Returns true when a credential row was actually removed.
    pub async fn clear_credential(&self) -> Result<bool> {
        let result = sqlx::query("DELETE FROM session_credential WHERE slot = 0")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn append_notice(&self, body: &str) -> Result<i64> {
        let rec = sqlx::query("INSERT INTO notices (body) VALUES (?) RETURNING id")
            .bind(body)
            .fetch_one(&self.pool)
            .await?;
        Ok(rec.get::<i64, _>(0))
    }

    pub async fn list_notices(&self) -> Result<Vec<StoredNotice>> {
        let rows = sqlx::query("SELECT id, body, created_at FROM notices ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| StoredNotice {
                notice_id: r.get::<i64, _>(0),
                body: r.get::<String, _>(1),
                created_at: r.get::<DateTime<Utc>, _>(2),
            })
            .collect())
    }

    pub async fn clear_notices(&self) -> Result<()> {
        sqlx::query("DELETE FROM notices")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn role_to_str(role: UserRole) -> &'static str {
    match role {
        UserRole::Creator => "CREATOR",
        UserRole::ProductManager => "PRODUCT_MANAGER",
    }
}

fn role_from_str(raw: &str) -> Result<UserRole> {
    match raw {
        "CREATOR" => Ok(UserRole::Creator),
        "PRODUCT_MANAGER" => Ok(UserRole::ProductManager),
        other => Err(anyhow!("unknown stored role '{other}'")),
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    if parent.as_os_str().is_empty() {
        return Ok(());
    }

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.starts_with("sqlite::memory:") || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
