//! User account queries

use parla_common::db::models::UserProfile;
use parla_common::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// Full user row, password hash included. Never serialized; handlers
/// convert to [`UserProfile`] before responding.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub image_url: Option<String>,
}

impl UserRecord {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            image_url: self.image_url.clone(),
        }
    }
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<UserRecord>> {
    let row = sqlx::query(
        "SELECT id, name, email, password_hash, image_url FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(record_from_row))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<UserRecord>> {
    let row =
        sqlx::query("SELECT id, name, email, password_hash, image_url FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;

    Ok(row.as_ref().map(record_from_row))
}

/// Insert a new user and return its id.
pub async fn insert(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    password_hash: &str,
) -> Result<i64> {
    let result = sqlx::query("INSERT INTO users (name, email, password_hash) VALUES (?, ?, ?)")
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .execute(pool)
        .await?;

    Ok(result.last_insert_rowid())
}

/// Rename a user. Returns false when no such user exists.
pub async fn update_name(pool: &SqlitePool, id: i64, name: &str) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE users SET name = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
    )
    .bind(name)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

fn record_from_row(row: &SqliteRow) -> UserRecord {
    UserRecord {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        image_url: row.get("image_url"),
    }
}
