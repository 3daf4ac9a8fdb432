//! External tool invocation with a hard deadline
//!
//! Both pipeline stages that shell out (transcoding and recognition) go
//! through [`run_tool`], so process launch, output capture and timeout
//! handling live in one place.

use std::ffi::OsStr;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::error;

/// Failure modes of a tool invocation
#[derive(Debug, Error)]
pub enum ToolError {
    /// The binary could not be started at all
    #[error("failed to launch {tool}: {source}")]
    Launch {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// The process did not finish within its deadline
    #[error("{tool} did not finish within {limit:?}")]
    TimedOut { tool: &'static str, limit: Duration },

    /// Waiting on the running process failed
    #[error("failed waiting for {tool}: {source}")]
    Wait {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Captured output of a finished tool
#[derive(Debug)]
pub struct ToolOutput {
    pub status: std::process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Run an external program with a deadline, capturing stdout and stderr.
///
/// kill_on_drop ensures the child is killed when the timed-out wait future
/// is dropped, so a hung tool cannot outlive its deadline.
pub async fn run_tool<I, S>(
    tool: &'static str,
    program: &str,
    args: I,
    limit: Duration,
) -> Result<ToolOutput, ToolError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = command.spawn().map_err(|source| {
        error!("Failed to launch {} ({}): {}", tool, program, source);
        ToolError::Launch { tool, source }
    })?;

    let output = match tokio::time::timeout(limit, child.wait_with_output()).await {
        Ok(result) => result.map_err(|source| ToolError::Wait { tool, source })?,
        Err(_) => {
            error!("{} exceeded its {}s limit, killed", tool, limit.as_secs());
            return Err(ToolError::TimedOut { tool, limit });
        }
    };

    Ok(ToolOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// First `max_chars` characters of a tool's output, for error payloads.
/// Full output still goes to the log at the failure site.
pub(crate) fn clip(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
