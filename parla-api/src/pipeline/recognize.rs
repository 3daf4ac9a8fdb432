//! Speech recognizer invocation and output parsing
//!
//! The recognizer is a separate binary invoked as
//! `<audio> <expected-text> <language>` with an extra `--spelling-check`
//! flag for spelling quizzes. It prints exactly one JSON object on
//! stdout; stderr carries diagnostics only and never affects the result.

use crate::pipeline::tool::{clip, run_tool};
use crate::pipeline::PipelineError;
use parla_common::db::models::QuizKind;
use serde::Deserialize;
use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error};

pub(crate) const TOOL: &str = "speech recognizer";

/// Parsed recognizer output.
///
/// `status` and `recognized_text` are required; anything that fails to
/// parse into this shape is a protocol violation.
#[derive(Debug, Clone, Deserialize)]
pub struct RecognitionResult {
    /// Grading label, e.g. "Perfect", "Close", "Not Bad"
    pub status: String,
    /// What the recognizer heard (empty when nothing was understood)
    pub recognized_text: String,
    /// Similarity score in percent, when the recognizer reports one
    #[serde(default)]
    pub score: Option<f64>,
    /// Recognizer-reported error detail, if any
    #[serde(default)]
    pub error: Option<String>,
}

/// Run the recognizer on a converted audio file and parse its verdict.
pub async fn run(
    recognizer: &str,
    audio: &Path,
    expected_text: &str,
    language: &str,
    kind: QuizKind,
    limit: Duration,
) -> Result<RecognitionResult, PipelineError> {
    let mut args: Vec<&OsStr> = vec![
        audio.as_os_str(),
        OsStr::new(expected_text),
        OsStr::new(language),
    ];
    if kind == QuizKind::Spelling {
        args.push(OsStr::new("--spelling-check"));
    }

    let result = run_tool(TOOL, recognizer, args, limit).await?;

    // Progress chatter ends up on stderr; it is not a failure by itself.
    if !result.stderr.trim().is_empty() {
        debug!("Recognizer stderr: {}", result.stderr.trim());
    }

    if !result.status.success() {
        error!(
            "Recognizer failed (exit {:?}): {}",
            result.status.code(),
            result.stderr.trim()
        );
        return Err(PipelineError::ToolFailure {
            tool: TOOL,
            detail: format!(
                "exit {:?}: {}",
                result.status.code(),
                clip(result.stderr.trim(), 500)
            ),
        });
    }

    let parsed: RecognitionResult = serde_json::from_str(result.stdout.trim()).map_err(|e| {
        error!(
            "Unparseable recognizer output ({}): {}",
            e,
            clip(result.stdout.trim(), 500)
        );
        PipelineError::ToolFailure {
            tool: TOOL,
            detail: format!("invalid output: {}", e),
        }
    })?;

    debug!(
        status = %parsed.status,
        recognized = %parsed.recognized_text,
        "Recognition complete"
    );
    Ok(parsed)
}
