//! Content module - posts, front-matter and the on-disk store

pub mod frontmatter;
mod post;
pub mod slug;
pub mod store;

pub use frontmatter::{Document, FieldValue, FrontMatter, FrontmatterError};
pub use post::{format_timestamp, parse_timestamp, Post};
pub use slug::slugify;
pub use store::{ContentStore, Entries, Entry, Location, SlugDir, CONTENT_FILE};
