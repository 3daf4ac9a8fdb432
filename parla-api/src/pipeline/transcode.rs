//! Audio transcoding via the configured encoder binary
//!
//! The recognizer only accepts 16-bit PCM WAV at 44.1 kHz, so every
//! upload is converted before recognition regardless of what the client
//! recorded.

use crate::pipeline::tool::{clip, run_tool};
use crate::pipeline::PipelineError;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error};

pub(crate) const TOOL: &str = "audio encoder";

/// Output path derived from the raw upload: `<stem>_converted.wav`
/// alongside the original.
pub fn converted_path(raw: &Path) -> PathBuf {
    let stem = raw
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio".to_string());
    raw.with_file_name(format!("{}_converted.wav", stem))
}

/// Transcode `raw` into 16-bit PCM WAV at 44.1 kHz at `output`.
pub async fn convert(
    encoder: &str,
    raw: &Path,
    output: &Path,
    limit: Duration,
) -> Result<(), PipelineError> {
    if !raw.exists() {
        return Err(PipelineError::FileMissing {
            path: raw.to_path_buf(),
        });
    }

    let args = [
        OsStr::new("-y"),
        OsStr::new("-i"),
        raw.as_os_str(),
        OsStr::new("-acodec"),
        OsStr::new("pcm_s16le"),
        OsStr::new("-ar"),
        OsStr::new("44100"),
        output.as_os_str(),
    ];
    let result = run_tool(TOOL, encoder, args, limit).await?;

    // The encoder writes its log to stderr even on success; it only
    // matters when something went wrong.
    if !result.status.success() {
        error!(
            "Audio encoder failed (exit {:?}): {}",
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
    if !output.exists() {
        error!(
            "Audio encoder exited cleanly but produced no output at {}",
            output.display()
        );
        return Err(PipelineError::ToolFailure {
            tool: TOOL,
            detail: "no output file produced".to_string(),
        });
    }

    debug!("Transcoded {} -> {}", raw.display(), output.display());
    Ok(())
}
