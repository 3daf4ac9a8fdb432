//! Scratch file naming and cleanup
//!
//! Uploaded audio lands in the scratch directory under a
//! collision-resistant name. Every file created for a submission is
//! registered with a [`ScratchGuard`] and removed when the submission
//! finishes, whichever way it finishes.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Allocates uniquely named files inside the scratch directory
#[derive(Debug, Clone)]
pub struct ScratchStore {
    dir: PathBuf,
}

impl ScratchStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Pick a fresh path for an upload.
    ///
    /// The name combines a millisecond timestamp with a UUID so parallel
    /// submissions never collide. Only a sanitized extension is kept from
    /// the client-supplied file name; the rest of it never touches the
    /// filesystem.
    pub fn allocate(&self, original_name: Option<&str>) -> PathBuf {
        let ext = original_name
            .and_then(extension_of)
            .unwrap_or_else(|| "wav".to_string());
        let name = format!(
            "{}-{}.{}",
            chrono::Utc::now().timestamp_millis(),
            Uuid::new_v4(),
            ext
        );
        self.dir.join(name)
    }
}

/// Extension of a client-supplied file name, restricted to short
/// alphanumeric strings. Anything else falls back to the default.
fn extension_of(name: &str) -> Option<String> {
    let ext = Path::new(name).extension()?.to_str()?;
    if ext.is_empty() || ext.len() > 8 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Tracks scratch files for one submission and deletes them at the end.
///
/// Paths are registered before the files are written, so partially
/// created files are removed too. Dropping the guard without calling
/// [`ScratchGuard::cleanup`] (a panic path) still removes the files.
#[derive(Debug, Default)]
pub struct ScratchGuard {
    paths: Vec<PathBuf>,
    cleaned: bool,
}

impl ScratchGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a path for deletion.
    pub fn track(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    /// Delete every tracked file that exists. Individual deletion errors
    /// are logged and do not propagate.
    pub fn cleanup(mut self) {
        self.remove_all();
        self.cleaned = true;
    }

    fn remove_all(&mut self) {
        for path in &self.paths {
            if !path.exists() {
                continue;
            }
            match std::fs::remove_file(path) {
                Ok(()) => debug!("Removed scratch file: {}", path.display()),
                Err(e) => warn!("Failed to remove scratch file {}: {}", path.display(), e),
            }
        }
    }
}

impl Drop for ScratchGuard {
    fn drop(&mut self) {
        if !self.cleaned {
            self.remove_all();
        }
    }
}
