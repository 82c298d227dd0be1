//! Issue a bearer token for local development.
//!
//! Tokens are signed with the same `JWT_SECRET`, `JWT_ISSUER` and
//! `AUTH_GUARD` the server validates against.
//!
//! ```text
//! cargo run --bin issue-token -- <subject>
//! ```

use anyhow::{Context, Result, bail};
use posts_core::ports::TokenService;
use posts_infra::JwtTokenService;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let subject = std::env::args()
        .nth(1)
        .context("usage: issue-token <subject>")?;
    if subject.trim().is_empty() {
        bail!("subject must not be empty");
    }

    let tokens = JwtTokenService::from_env();
    let token = tokens
        .generate_token(&subject)
        .context("failed to sign token")?;

    println!("{token}");
    eprintln!(
        "guard={} expires_in={}s",
        tokens.guard(),
        tokens.expiration_seconds()
    );

    Ok(())
}
