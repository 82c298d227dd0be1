//! Data Transfer Objects - request types for the API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /api/posts` and `PUT /api/posts/{id}`.
///
/// `title` is kept as raw JSON so that a missing, null or non-string value
/// surfaces as a field-level validation error rather than a parse failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostPayload {
    #[serde(default)]
    pub title: Option<Value>,
}

/// Query string of `GET /api/posts`.
///
/// Signed, so that `page=-1` reaches range validation instead of failing to parse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListPostsQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}
