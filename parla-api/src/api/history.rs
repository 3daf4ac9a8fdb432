//! Per-user attempt history and statistics

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::api::quizzes::parse_kind;
use crate::db::attempts;
use crate::db::attempts::{AttemptStats, HistoryEntry};
use crate::error::ApiResult;
use crate::AppState;

pub fn history_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users/:id/history/:kind", get(history))
        .route("/api/users/:id/stats/:kind", get(stats))
}

/// Unknown users simply have no attempts, so both endpoints report an
/// empty history rather than 404.
async fn history(
    State(state): State<AppState>,
    Path((id, kind)): Path<(i64, String)>,
) -> ApiResult<Json<Vec<HistoryEntry>>> {
    let kind = parse_kind(&kind)?;
    let entries = attempts::history_for_user(&state.db, id, kind).await?;
    Ok(Json(entries))
}

async fn stats(
    State(state): State<AppState>,
    Path((id, kind)): Path<(i64, String)>,
) -> ApiResult<Json<AttemptStats>> {
    let kind = parse_kind(&kind)?;
    let stats = attempts::stats_for_user(&state.db, id, kind).await?;
    Ok(Json(stats))
}
