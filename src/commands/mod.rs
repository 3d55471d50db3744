//! CLI commands

pub mod feed;
pub mod list;
pub mod new;
pub mod publish;
pub mod sync_images;
