//! Migration CLI tool.
//!
//! Reads `DATABASE_URL` (or `.env`) and applies the posts schema,
//! e.g. `cargo run -p migration -- up`. Logging is set up by the CLI itself.

use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    cli::run_cli(migration::Migrator).await;
}
