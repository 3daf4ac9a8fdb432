//! # Parla Common Library
//!
//! Shared code for the parla backend including:
//! - Database schema and model types
//! - Configuration loading and root folder resolution
//! - Common error types

pub mod config;
pub mod db;
pub mod error;

pub use config::Config;
pub use error::{Error, Result};
