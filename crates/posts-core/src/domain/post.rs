use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::Rule;

/// Store-assigned post identifier.
pub type PostId = i64;

/// Longest title accepted, counted in characters after trimming.
pub const TITLE_MAX_CHARS: usize = 255;

/// Post entity - the single resource exposed by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Build a freshly created post; both timestamps are `now`.
    pub fn new(id: PostId, title: Title, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.into_inner(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the title and refresh `updated_at`.
    ///
    /// `updated_at` never moves backwards, even if the wall clock does.
    pub fn retitle(&mut self, title: Title, now: DateTime<Utc>) {
        self.title = title.into_inner();
        self.updated_at = now.max(self.updated_at);
    }
}

/// A validated post title: trimmed, non-empty and at most [`TITLE_MAX_CHARS`] long.
///
/// Repositories only accept this type, so an invalid title can never be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title(String);

impl Title {
    /// Normalize and check a raw title.
    pub fn parse(raw: &str) -> Result<Self, Rule> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Rule::Required);
        }
        if trimmed.chars().count() > TITLE_MAX_CHARS {
            return Err(Rule::MaxChars(TITLE_MAX_CHARS));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}
