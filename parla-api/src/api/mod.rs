//! HTTP endpoint handlers

pub mod articles;
pub mod health;
pub mod history;
pub mod quizzes;
pub mod submissions;
pub mod users;

pub use articles::article_routes;
pub use health::health_routes;
pub use history::history_routes;
pub use quizzes::quiz_routes;
pub use submissions::submission_routes;
pub use users::user_routes;
