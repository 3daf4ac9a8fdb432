//! Article queries

use parla_common::db::models::Article;
use parla_common::Result;
use serde::Serialize;
use sqlx::{Row, SqlitePool};

/// Listing row without the article body
#[derive(Debug, Clone, Serialize)]
pub struct ArticleSummary {
    pub id: i64,
    pub title: String,
    pub created_at: String,
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<ArticleSummary>> {
    let rows = sqlx::query("SELECT id, title, created_at FROM articles ORDER BY id")
        .fetch_all(pool)
        .await?;

    Ok(rows
        .iter()
        .map(|row| ArticleSummary {
            id: row.get("id"),
            title: row.get("title"),
            created_at: row.get("created_at"),
        })
        .collect())
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Article>> {
    let row = sqlx::query("SELECT id, title, content, created_at FROM articles WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|row| Article {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        created_at: row.get("created_at"),
    }))
}

/// Exact-title lookup. Titles are not unique, so this can return more
/// than one row.
pub async fn find_by_title(pool: &SqlitePool, title: &str) -> Result<Vec<Article>> {
    let rows = sqlx::query(
        "SELECT id, title, content, created_at FROM articles WHERE title = ? ORDER BY id",
    )
    .bind(title)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| Article {
            id: row.get("id"),
            title: row.get("title"),
            content: row.get("content"),
            created_at: row.get("created_at"),
        })
        .collect())
}
