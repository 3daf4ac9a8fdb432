//! Quiz browsing endpoints

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use parla_common::db::models::QuizKind;

use crate::db::quizzes;
use crate::db::quizzes::{QuizPhrase, QuizSummary};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// How many phrases a random practice set contains
const RANDOM_SET_SIZE: i64 = 5;

pub fn quiz_routes() -> Router<AppState> {
    Router::new()
        .route("/api/quizzes/:kind/level/:level", get(list_for_level))
        .route("/api/quizzes/:kind/random/:level", get(random_for_level))
        .route("/api/quizzes/:kind/:id", get(get_quiz))
}

/// `:kind` path segments must name a known quiz kind.
pub(crate) fn parse_kind(kind: &str) -> Result<QuizKind, ApiError> {
    kind.parse::<QuizKind>().map_err(ApiError::BadRequest)
}

async fn list_for_level(
    State(state): State<AppState>,
    Path((kind, level)): Path<(String, String)>,
) -> ApiResult<Json<Vec<QuizSummary>>> {
    let kind = parse_kind(&kind)?;
    let quizzes = quizzes::list_for_level(&state.db, kind, &level).await?;
    Ok(Json(quizzes))
}

async fn get_quiz(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, i64)>,
) -> ApiResult<Json<QuizSummary>> {
    let kind = parse_kind(&kind)?;
    let quiz = quizzes::find_with_answered(&state.db, kind, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No {} quiz with id {}", kind, id)))?;

    Ok(Json(quiz))
}

async fn random_for_level(
    State(state): State<AppState>,
    Path((kind, level)): Path<(String, String)>,
) -> ApiResult<Json<Vec<QuizPhrase>>> {
    let kind = parse_kind(&kind)?;
    let phrases =
        quizzes::random_open_for_level(&state.db, kind, &level, RANDOM_SET_SIZE).await?;

    Ok(Json(phrases))
}
