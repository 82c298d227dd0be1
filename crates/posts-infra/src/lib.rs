//! # Posts Infrastructure
//!
//! Concrete implementations of the ports defined in `posts-core`.
//! This crate contains the post stores and the bearer-token verifier.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL post store via SeaORM
//! - `auth` - JWT bearer tokens

pub mod database;

#[cfg(feature = "auth")]
pub mod auth;

// Re-exports - In-Memory
pub use database::InMemoryPostRepository;

#[cfg(feature = "auth")]
pub use auth::{JwtConfig, JwtTokenService};

#[cfg(feature = "postgres")]
pub use database::PostgresPostRepository;
