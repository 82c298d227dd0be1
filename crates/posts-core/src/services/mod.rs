//! Application services - orchestrate validation and persistence.

mod posts;

pub use posts::{PostListing, PostService};
