//! Audio submission endpoint
//!
//! Accepts a multipart recording, runs it through the grading pipeline,
//! and reports the outcome. All heavy lifting lives in [`crate::pipeline`];
//! this module only parses the request and shapes the response.

use axum::extract::{Multipart, Path, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;

use parla_common::db::models::Outcome;

use crate::api::quizzes::parse_kind;
use crate::error::{ApiError, ApiResult};
use crate::pipeline::{AudioUpload, SubmissionRequest};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub outcome: Outcome,
    pub text: String,
    pub recognized_text: String,
    pub is_answered: bool,
}

pub fn submission_routes() -> Router<AppState> {
    Router::new().route("/api/quizzes/:kind/:id/submissions", post(submit))
}

async fn submit(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, i64)>,
    multipart: Multipart,
) -> ApiResult<Json<SubmissionResponse>> {
    let kind = parse_kind(&kind)?;
    let (audio, language, user_id) = parse_submission_body(multipart).await?;

    let outcome = state
        .pipeline
        .submit(SubmissionRequest {
            kind,
            quiz_id: id,
            user_id,
            language,
            audio,
        })
        .await?;

    Ok(Json(SubmissionResponse {
        outcome: outcome.outcome,
        text: outcome.expected_text,
        recognized_text: outcome.recognized_text,
        is_answered: true,
    }))
}

/// Pull the audio upload and optional overrides out of the multipart
/// body. Unknown fields are ignored; an empty file part counts as no
/// upload at all.
async fn parse_submission_body(
    mut multipart: Multipart,
) -> Result<(Option<AudioUpload>, Option<String>, Option<i64>), ApiError> {
    let mut audio: Option<AudioUpload> = None;
    let mut language: Option<String> = None;
    let mut user_id: Option<i64> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest("Malformed multipart body".to_string()))?
    {
        // field.name() borrows the field, so copy it out before the
        // content reads below consume the field.
        let name = match field.name() {
            Some(name) => name.to_string(),
            None => continue,
        };

        match name.as_str() {
            "file" => {
                let file_name = field.file_name().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|_| ApiError::BadRequest("Malformed multipart body".to_string()))?;
                audio = Some(AudioUpload {
                    file_name,
                    data: data.to_vec(),
                });
            }
            "language" => {
                let value = field
                    .text()
                    .await
                    .map_err(|_| ApiError::BadRequest("Malformed multipart body".to_string()))?;
                let value = value.trim();
                if !value.is_empty() {
                    language = Some(value.to_string());
                }
            }
            "user_id" => {
                let value = field
                    .text()
                    .await
                    .map_err(|_| ApiError::BadRequest("Malformed multipart body".to_string()))?;
                let parsed = value.trim().parse::<i64>().map_err(|_| {
                    ApiError::BadRequest("user_id must be an integer".to_string())
                })?;
                user_id = Some(parsed);
            }
            _ => {}
        }
    }

    Ok((audio.filter(|upload| !upload.data.is_empty()), language, user_id))
}
