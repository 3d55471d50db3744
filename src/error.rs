//! Error types for content operations

use std::io;
use std::path::{Path, PathBuf};

use crate::content::{FrontmatterError, Location};

/// Errors raised by the content store, the draft creator and the publisher
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// A required front-matter field is missing or blank
    #[error("missing required field \"{field}\"")]
    Validation { slug: String, field: &'static str },

    /// The target location is already taken
    #[error("already exists at {}", .path.display())]
    Collision { slug: String, path: PathBuf },

    /// Front-matter could not be parsed
    #[error("{}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        source: FrontmatterError,
    },

    /// A new draft would reuse an existing slug
    #[error("{location} post already exists: {}", .path.display())]
    DuplicateSlug {
        slug: String,
        location: Location,
        path: PathBuf,
    },

    /// I/O failure on a path
    #[error("{}: {source}", .path.display())]
    Filesystem { path: PathBuf, source: io::Error },

    /// An external command (git) failed
    #[error("`{command}` failed: {message}")]
    ExternalTool { command: String, message: String },
}

impl ContentError {
    /// Skips are expected outcomes of a publish run, not failures
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            ContentError::Validation { .. } | ContentError::Collision { .. }
        )
    }
}

/// Result alias for content operations
pub type Result<T, E = ContentError> = std::result::Result<T, E>;

/// Attach a path to an I/O error
pub(crate) fn fs_error(path: &Path) -> impl FnOnce(io::Error) -> ContentError + '_ {
    move |source| ContentError::Filesystem {
        path: path.to_path_buf(),
        source,
    }
}
