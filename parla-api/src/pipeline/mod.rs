//! Audio submission pipeline
//!
//! A submission travels: multipart upload → scratch file → audio encoder
//! (normalize to PCM WAV) → speech recognizer → outcome classification →
//! attempt row. Scratch files created along the way are removed on every
//! exit path, including panics.
//!
//! Stages within one submission are strictly sequential; independent
//! submissions run concurrently, each with its own scratch files and
//! external processes.

pub mod recognize;
pub mod scratch;
pub mod tool;
pub mod transcode;

pub use recognize::RecognitionResult;
pub use scratch::{ScratchGuard, ScratchStore};
pub use tool::{run_tool, ToolError, ToolOutput};

use crate::db;
use parla_common::db::models::{Outcome, QuizItem, QuizKind, ANONYMOUS_USER_ID};
use parla_common::Config;
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

/// Failure taxonomy for the submission pipeline.
///
/// Every variant is terminal for the current submission; nothing here is
/// retried automatically.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no {kind} quiz with id {id}")]
    QuizNotFound { kind: QuizKind, id: i64 },

    #[error("no audio file in request")]
    MissingAudio,

    #[error("audio file missing: {path}")]
    FileMissing { path: PathBuf },

    #[error("failed to launch {tool}: {source}")]
    Launch {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} failed: {detail}")]
    ToolFailure { tool: &'static str, detail: String },

    #[error("{tool} did not finish within {limit:?}")]
    Timeout { tool: &'static str, limit: Duration },

    #[error("store operation failed: {0}")]
    Persistence(#[source] parla_common::Error),

    #[error("scratch file error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ToolError> for PipelineError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::Launch { tool, source } => PipelineError::Launch { tool, source },
            ToolError::TimedOut { tool, limit } => PipelineError::Timeout { tool, limit },
            ToolError::Wait { tool, source } => PipelineError::ToolFailure {
                tool,
                detail: source.to_string(),
            },
        }
    }
}

/// One parsed multipart submission, before any processing
#[derive(Debug)]
pub struct SubmissionRequest {
    pub kind: QuizKind,
    pub quiz_id: i64,
    /// Attributed user; the anonymous user when absent
    pub user_id: Option<i64>,
    /// Recognition language; the quiz's level tag when absent
    pub language: Option<String>,
    pub audio: Option<AudioUpload>,
}

/// Raw audio bytes received in the multipart body
#[derive(Debug)]
pub struct AudioUpload {
    pub file_name: Option<String>,
    pub data: Vec<u8>,
}

/// What the caller gets back after grading
#[derive(Debug)]
pub struct SubmissionOutcome {
    pub outcome: Outcome,
    pub expected_text: String,
    pub recognized_text: String,
}

/// Orchestrates audio submissions end to end.
///
/// Holds the shared pool and tool configuration; individual submissions
/// borrow it, so any number can be in flight at once.
pub struct SubmissionPipeline {
    db: SqlitePool,
    scratch: ScratchStore,
    encoder_path: String,
    recognizer_path: String,
    transcode_timeout: Duration,
    recognize_timeout: Duration,
}

impl SubmissionPipeline {
    pub fn new(db: SqlitePool, config: &Config) -> Self {
        Self {
            db,
            scratch: ScratchStore::new(config.scratch_dir()),
            encoder_path: config.encoder_path.clone(),
            recognizer_path: config.recognizer_path.clone(),
            transcode_timeout: config.transcode_timeout(),
            recognize_timeout: config.recognize_timeout(),
        }
    }

    pub fn scratch(&self) -> &ScratchStore {
        &self.scratch
    }

    /// Run one submission through transcoding, recognition, grading and
    /// persistence.
    ///
    /// Invariant: scratch files created for this submission are deleted
    /// before this returns, on success and on every failure path alike.
    pub async fn submit(
        &self,
        request: SubmissionRequest,
    ) -> Result<SubmissionOutcome, PipelineError> {
        // Both checks precede any filesystem work, so a rejected request
        // leaves nothing behind to clean up.
        let quiz = db::quizzes::find(&self.db, request.kind, request.quiz_id)
            .await
            .map_err(PipelineError::Persistence)?
            .ok_or(PipelineError::QuizNotFound {
                kind: request.kind,
                id: request.quiz_id,
            })?;
        let audio = request.audio.ok_or(PipelineError::MissingAudio)?;

        let language = request.language.unwrap_or_else(|| quiz.level.clone());
        let user_id = request.user_id.unwrap_or(ANONYMOUS_USER_ID);

        let mut guard = ScratchGuard::new();
        let result = self
            .run_stages(&quiz, audio, &language, user_id, &mut guard)
            .await;
        guard.cleanup();
        result
    }

    async fn run_stages(
        &self,
        quiz: &QuizItem,
        audio: AudioUpload,
        language: &str,
        user_id: i64,
        guard: &mut ScratchGuard,
    ) -> Result<SubmissionOutcome, PipelineError> {
        let raw = self.scratch.allocate(audio.file_name.as_deref());
        guard.track(raw.clone());
        tokio::fs::write(&raw, &audio.data).await?;

        // Tracked before the encoder runs: a failing encoder can still
        // leave a partial output file behind.
        let converted = transcode::converted_path(&raw);
        guard.track(converted.clone());
        transcode::convert(&self.encoder_path, &raw, &converted, self.transcode_timeout).await?;

        let recognition = recognize::run(
            &self.recognizer_path,
            &converted,
            &quiz.text,
            language,
            quiz.kind,
            self.recognize_timeout,
        )
        .await?;

        let outcome = Outcome::from_status(&recognition.status);
        db::attempts::insert(&self.db, user_id, quiz.id, outcome)
            .await
            .map_err(|e| {
                error!("Failed to record attempt for quiz {}: {}", quiz.id, e);
                PipelineError::Persistence(e)
            })?;

        info!(
            quiz_id = quiz.id,
            user_id,
            status = %recognition.status,
            outcome = %outcome,
            "Submission graded"
        );

        Ok(SubmissionOutcome {
            outcome,
            expected_text: quiz.text.clone(),
            recognized_text: recognition.recognized_text,
        })
    }
}
