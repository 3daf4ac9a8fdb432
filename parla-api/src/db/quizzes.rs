//! Quiz queries

use parla_common::db::models::{QuizItem, QuizKind};
use parla_common::Result;
use serde::Serialize;
use sqlx::{Row, SqlitePool};

/// Quiz row plus whether any attempt has been recorded for it
#[derive(Debug, Clone, Serialize)]
pub struct QuizSummary {
    pub id: i64,
    pub text: String,
    pub is_open: bool,
    pub is_answered: bool,
}

/// Reduced quiz row for practice-phrase selection
#[derive(Debug, Clone, Serialize)]
pub struct QuizPhrase {
    pub id: i64,
    pub text: String,
    pub level: String,
}

/// Look up one quiz by kind and id.
pub async fn find(pool: &SqlitePool, kind: QuizKind, id: i64) -> Result<Option<QuizItem>> {
    let row = sqlx::query("SELECT id, text, level, is_open FROM quizzes WHERE kind = ? AND id = ?")
        .bind(kind.as_str())
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|row| QuizItem {
        id: row.get("id"),
        kind,
        text: row.get("text"),
        level: row.get("level"),
        is_open: row.get("is_open"),
    }))
}

/// All quizzes of one kind at one level, each with its answered flag.
pub async fn list_for_level(
    pool: &SqlitePool,
    kind: QuizKind,
    level: &str,
) -> Result<Vec<QuizSummary>> {
    let rows = sqlx::query(
        r#"
        SELECT q.id, q.text, q.is_open,
               EXISTS(SELECT 1 FROM attempts a WHERE a.quiz_id = q.id) AS is_answered
        FROM quizzes q
        WHERE q.kind = ? AND q.level = ?
        ORDER BY q.id
        "#,
    )
    .bind(kind.as_str())
    .bind(level)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(summary_from_row).collect())
}

/// One quiz of one kind by id, with its answered flag.
pub async fn find_with_answered(
    pool: &SqlitePool,
    kind: QuizKind,
    id: i64,
) -> Result<Option<QuizSummary>> {
    let row = sqlx::query(
        r#"
        SELECT q.id, q.text, q.is_open,
               EXISTS(SELECT 1 FROM attempts a WHERE a.quiz_id = q.id) AS is_answered
        FROM quizzes q
        WHERE q.kind = ? AND q.id = ?
        "#,
    )
    .bind(kind.as_str())
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(summary_from_row))
}

/// Up to `limit` random open quizzes for a level.
pub async fn random_open_for_level(
    pool: &SqlitePool,
    kind: QuizKind,
    level: &str,
    limit: i64,
) -> Result<Vec<QuizPhrase>> {
    let rows = sqlx::query(
        r#"
        SELECT id, text, level FROM quizzes
        WHERE kind = ? AND level = ? AND is_open = 1
        ORDER BY RANDOM()
        LIMIT ?
        "#,
    )
    .bind(kind.as_str())
    .bind(level)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| QuizPhrase {
            id: row.get("id"),
            text: row.get("text"),
            level: row.get("level"),
        })
        .collect())
}

fn summary_from_row(row: &sqlx::sqlite::SqliteRow) -> QuizSummary {
    QuizSummary {
        id: row.get("id"),
        text: row.get("text"),
        is_open: row.get("is_open"),
        is_answered: row.get("is_answered"),
    }
}
