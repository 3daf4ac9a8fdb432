//! Database model types shared across the parla services

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Seeded user that owns submissions made without an explicit user id
pub const ANONYMOUS_USER_ID: i64 = 1;

/// Public view of a user account. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub image_url: Option<String>,
}

/// Reading material shown in the app
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: String,
}

/// Quiz category: the kind of answer the learner must produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizKind {
    Pronunciation,
    Spelling,
}

impl QuizKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuizKind::Pronunciation => "pronunciation",
            QuizKind::Spelling => "spelling",
        }
    }
}

impl fmt::Display for QuizKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuizKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pronunciation" => Ok(QuizKind::Pronunciation),
            "spelling" => Ok(QuizKind::Spelling),
            other => Err(format!("unknown quiz kind: {}", other)),
        }
    }
}

/// A single quiz item: the text the learner must pronounce or spell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizItem {
    pub id: i64,
    pub kind: QuizKind,
    pub text: String,
    pub level: String,
    pub is_open: bool,
}

/// Two-level grading of a recognition result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Perfect,
    #[serde(rename = "Not Bad")]
    NotBad,
}

impl Outcome {
    /// Collapse a recognizer status label into the stored outcome.
    ///
    /// Only an exact `"Perfect"` grades as [`Outcome::Perfect`]; every other
    /// label (including casing or whitespace variants) grades as
    /// [`Outcome::NotBad`].
    pub fn from_status(status: &str) -> Outcome {
        if status == "Perfect" {
            Outcome::Perfect
        } else {
            Outcome::NotBad
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Perfect => "Perfect",
            Outcome::NotBad => "Not Bad",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Perfect" => Ok(Outcome::Perfect),
            "Not Bad" => Ok(Outcome::NotBad),
            other => Err(format!("unknown outcome: {}", other)),
        }
    }
}
