//! Database query modules, one per entity

pub mod articles;
pub mod attempts;
pub mod quizzes;
pub mod users;
