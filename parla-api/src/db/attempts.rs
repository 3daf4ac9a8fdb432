//! Attempt recording and history queries

use parla_common::db::models::{Outcome, QuizKind};
use parla_common::Result;
use serde::Serialize;
use sqlx::{Row, SqlitePool};

/// Insert one attempt row. The table is append-only; rows are never
/// updated or deleted here.
pub async fn insert(pool: &SqlitePool, user_id: i64, quiz_id: i64, outcome: Outcome) -> Result<()> {
    sqlx::query("INSERT INTO attempts (user_id, quiz_id, is_answered, outcome) VALUES (?, ?, 1, ?)")
        .bind(user_id)
        .bind(quiz_id)
        .bind(outcome.as_str())
        .execute(pool)
        .await?;

    Ok(())
}

/// One history row: an attempt joined with its quiz text and level
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub quiz_id: i64,
    pub outcome: String,
    pub created_at: String,
    pub text: String,
    pub level: String,
}

/// A user's attempts of one quiz kind, newest first.
pub async fn history_for_user(
    pool: &SqlitePool,
    user_id: i64,
    kind: QuizKind,
) -> Result<Vec<HistoryEntry>> {
    let rows = sqlx::query(
        r#"
        SELECT a.id, a.quiz_id, a.outcome, a.created_at, q.text, q.level
        FROM attempts a
        JOIN quizzes q ON q.id = a.quiz_id
        WHERE a.user_id = ? AND q.kind = ?
        ORDER BY a.created_at DESC, a.id DESC
        "#,
    )
    .bind(user_id)
    .bind(kind.as_str())
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| HistoryEntry {
            id: row.get("id"),
            quiz_id: row.get("quiz_id"),
            outcome: row.get("outcome"),
            created_at: row.get("created_at"),
            text: row.get("text"),
            level: row.get("level"),
        })
        .collect())
}

/// Aggregate outcome counts plus a per-language breakdown
#[derive(Debug, Clone, Serialize)]
pub struct AttemptStats {
    pub total_attempts: i64,
    pub perfect_count: i64,
    pub perfect_percentage: f64,
    pub not_bad_count: i64,
    pub not_bad_percentage: f64,
    pub languages: Vec<LanguageCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LanguageCount {
    pub language: String,
    pub attempt_count: i64,
}

/// Outcome totals and per-language counts for one user and quiz kind.
pub async fn stats_for_user(
    pool: &SqlitePool,
    user_id: i64,
    kind: QuizKind,
) -> Result<AttemptStats> {
    let row = sqlx::query(
        r#"
        SELECT COUNT(*) AS total,
               COALESCE(SUM(CASE WHEN a.outcome = 'Perfect' THEN 1 ELSE 0 END), 0) AS perfect,
               COALESCE(SUM(CASE WHEN a.outcome = 'Not Bad' THEN 1 ELSE 0 END), 0) AS not_bad
        FROM attempts a
        JOIN quizzes q ON q.id = a.quiz_id
        WHERE a.user_id = ? AND q.kind = ?
        "#,
    )
    .bind(user_id)
    .bind(kind.as_str())
    .fetch_one(pool)
    .await?;

    let total: i64 = row.get("total");
    let perfect: i64 = row.get("perfect");
    let not_bad: i64 = row.get("not_bad");

    let language_rows = sqlx::query(
        r#"
        SELECT q.level AS language, COUNT(*) AS attempt_count
        FROM attempts a
        JOIN quizzes q ON q.id = a.quiz_id
        WHERE a.user_id = ? AND q.kind = ?
        GROUP BY q.level
        ORDER BY attempt_count DESC
        "#,
    )
    .bind(user_id)
    .bind(kind.as_str())
    .fetch_all(pool)
    .await?;

    let languages = language_rows
        .iter()
        .map(|row| LanguageCount {
            language: row.get("language"),
            attempt_count: row.get("attempt_count"),
        })
        .collect();

    Ok(AttemptStats {
        total_attempts: total,
        perfect_count: perfect,
        perfect_percentage: percentage(perfect, total),
        not_bad_count: not_bad,
        not_bad_percentage: percentage(not_bad, total),
        languages,
    })
}

/// Share of `count` in `total` as a percentage with one decimal place
fn percentage(count: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 1000.0).round() / 10.0
}
