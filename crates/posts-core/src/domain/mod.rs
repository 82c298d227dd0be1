//! Domain entities - the core business objects.

mod post;

pub use post::{Post, PostId, Title, TITLE_MAX_CHARS};
