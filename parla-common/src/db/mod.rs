//! Database schema and model types

pub mod init;
pub mod models;

pub use init::init_database;
pub use models::{Article, Outcome, QuizItem, QuizKind, UserProfile, ANONYMOUS_USER_ID};
