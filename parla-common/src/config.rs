//! Configuration loading and root folder resolution

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
pub const DEFAULT_HTTP_PORT: u16 = 5000;
pub const DEFAULT_ENCODER: &str = "ffmpeg";
pub const DEFAULT_RECOGNIZER: &str = "parla-recognize";
pub const DEFAULT_TRANSCODE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_RECOGNIZE_TIMEOUT_SECS: u64 = 120;

/// Optional settings read from the TOML config file.
///
/// Every field is optional so a partial (or missing) file still resolves
/// to a usable configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_folder: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoder_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recognizer_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcode_timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recognize_timeout_secs: Option<u64>,
}

/// Fully resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Folder holding the database and scratch directory
    pub root_folder: PathBuf,
    pub http_host: String,
    pub http_port: u16,
    /// Audio encoder binary (name on PATH, or absolute path)
    pub encoder_path: String,
    /// Speech recognizer binary (name on PATH, or absolute path)
    pub recognizer_path: String,
    pub transcode_timeout_secs: u64,
    pub recognize_timeout_secs: u64,
}

impl Config {
    /// Resolve configuration following the priority order:
    /// 1. Command-line argument (highest priority)
    /// 2. Environment variable (PARLA_*)
    /// 3. TOML config file
    /// 4. Compiled default (fallback)
    pub fn resolve(cli_root: Option<PathBuf>, cli_port: Option<u16>) -> Result<Self> {
        let file = match default_config_file() {
            Some(path) if path.exists() => load_toml_config(&path)?,
            _ => TomlConfig::default(),
        };
        Ok(Self::from_parts(file, cli_root, cli_port))
    }

    /// Combine file settings with CLI overrides and environment variables.
    pub fn from_parts(file: TomlConfig, cli_root: Option<PathBuf>, cli_port: Option<u16>) -> Self {
        let root_folder = cli_root
            .or_else(|| std::env::var("PARLA_ROOT_FOLDER").ok().map(PathBuf::from))
            .or(file.root_folder)
            .unwrap_or_else(default_root_folder);

        let http_port = cli_port
            .or_else(|| std::env::var("PARLA_PORT").ok().and_then(|v| v.parse().ok()))
            .or(file.http_port)
            .unwrap_or(DEFAULT_HTTP_PORT);

        let encoder_path = std::env::var("PARLA_ENCODER_PATH")
            .ok()
            .or(file.encoder_path)
            .unwrap_or_else(|| DEFAULT_ENCODER.to_string());

        let recognizer_path = std::env::var("PARLA_RECOGNIZER_PATH")
            .ok()
            .or(file.recognizer_path)
            .unwrap_or_else(|| DEFAULT_RECOGNIZER.to_string());

        Config {
            root_folder,
            http_host: file
                .http_host
                .unwrap_or_else(|| DEFAULT_HTTP_HOST.to_string()),
            http_port,
            encoder_path,
            recognizer_path,
            transcode_timeout_secs: file
                .transcode_timeout_secs
                .unwrap_or(DEFAULT_TRANSCODE_TIMEOUT_SECS),
            recognize_timeout_secs: file
                .recognize_timeout_secs
                .unwrap_or(DEFAULT_RECOGNIZE_TIMEOUT_SECS),
        }
    }

    /// Path of the SQLite database inside the root folder
    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join("parla.db")
    }

    /// Directory holding transient audio files during submission processing
    pub fn scratch_dir(&self) -> PathBuf {
        self.root_folder.join("temp")
    }

    /// Create the root folder and scratch directory if missing.
    /// Safe to call multiple times.
    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root_folder)?;
        std::fs::create_dir_all(self.scratch_dir())?;
        Ok(())
    }

    pub fn transcode_timeout(&self) -> Duration {
        Duration::from_secs(self.transcode_timeout_secs)
    }

    pub fn recognize_timeout(&self) -> Duration {
        Duration::from_secs(self.recognize_timeout_secs)
    }
}

/// Load a TOML config file from disk
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Write a TOML config file to disk, creating parent directories as needed
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

/// Default configuration file path for the platform.
///
/// Prefers ~/.config/parla/parla.toml; on Linux also checks
/// /etc/parla/parla.toml.
pub fn default_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("parla").join("parla.toml"));
    if let Some(path) = &user_config {
        if path.exists() {
            return user_config;
        }
    }
    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/parla/parla.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }
    user_config
}

/// OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("parla"))
        .unwrap_or_else(|| PathBuf::from("./parla_data"))
}
