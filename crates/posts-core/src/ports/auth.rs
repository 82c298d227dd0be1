//! Authentication ports.

/// Claims carried by a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    /// Opaque identifier of the caller.
    pub subject: String,
    /// Guard the token was issued for (e.g. `api`).
    pub guard: String,
    pub exp: i64,
}

/// Token service trait - issues and verifies bearer credentials.
pub trait TokenService: Send + Sync {
    /// Issue a token for `subject` under this service's guard.
    fn generate_token(&self, subject: &str) -> Result<String, AuthError>;

    /// Validate and decode a token.
    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Name of the guard this service authenticates for.
    fn guard(&self) -> &str;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing authorization header")]
    MissingAuth,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Authentication unavailable: {0}")]
    Internal(String),
}
