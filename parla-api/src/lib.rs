//! parla-api library - REST backend for the Parla language-practice app
//!
//! Serves quiz browsing, articles, accounts, and attempt history, and
//! grades recorded audio through an external encoder and speech
//! recognizer (see [`pipeline`]).

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use parla_common::Config;

pub mod api;
pub mod db;
pub mod error;
pub mod pipeline;

pub use error::{ApiError, ApiResult};

use pipeline::SubmissionPipeline;

/// Largest accepted request body. Recordings are short phrase-length
/// clips, so this is generous.
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Audio grading pipeline
    pub pipeline: Arc<SubmissionPipeline>,
    /// Server start time, for the health endpoint
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, config: &Config) -> Self {
        Self {
            pipeline: Arc::new(SubmissionPipeline::new(db.clone(), config)),
            db,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::user_routes())
        .merge(api::article_routes())
        .merge(api::quiz_routes())
        .merge(api::submission_routes())
        .merge(api::history_routes())
        .with_state(state)
        // Default axum body limit is too small for audio uploads
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        // Enable CORS for app clients served from another origin
        .layer(CorsLayer::permissive())
}
