//! # Posts Core
//!
//! The domain layer of the posts API.
//! This crate contains the post lifecycle rules with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;
pub mod validation;

pub use error::DomainError;
pub use services::PostService;
