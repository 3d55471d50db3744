//! Staging directories for atomic publishing

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use walkdir::WalkDir;

use crate::content::CONTENT_FILE;
use crate::error::{fs_error, ContentError, Result};

/// A hidden directory next to the publish target.
///
/// It is removed on drop unless [`StagingDir::commit`] renamed it into place.
pub struct StagingDir {
    path: PathBuf,
    committed: bool,
}

impl StagingDir {
    /// Create an empty staging directory inside `parent`
    pub fn create(parent: &Path, slug: &str) -> Result<Self> {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let path = parent.join(format!(".{}.publish-{}-{}", slug, std::process::id(), nanos));
        fs::create_dir(&path).map_err(fs_error(&path))?;
        tracing::debug!("Staging in {:?}", path);

        Ok(Self {
            path,
            committed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the rewritten content file
    pub fn write_content(&self, content: &str) -> Result<()> {
        let path = self.path.join(CONTENT_FILE);
        fs::write(&path, content).map_err(fs_error(&path))
    }

    /// Copy everything from a post directory except its content file
    pub fn copy_assets(&self, source: &Path) -> Result<usize> {
        let mut copied = 0;
        for entry in WalkDir::new(source).min_depth(1) {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(source).to_path_buf();
                ContentError::Filesystem {
                    path,
                    source: e.into(),
                }
            })?;

            let relative = entry
                .path()
                .strip_prefix(source)
                .unwrap_or(entry.path());
            if entry.depth() == 1 && relative == Path::new(CONTENT_FILE) {
                continue;
            }

            let dest = self.path.join(relative);
            if entry.file_type().is_dir() {
                fs::create_dir_all(&dest).map_err(fs_error(&dest))?;
            } else {
                fs::copy(entry.path(), &dest).map_err(fs_error(entry.path()))?;
                copied += 1;
            }
        }
        Ok(copied)
    }

    /// Atomically move the staged post to `target`
    pub fn commit(mut self, target: &Path) -> Result<()> {
        if target.exists() {
            return Err(ContentError::Collision {
                slug: target
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                path: target.to_path_buf(),
            });
        }

        fs::rename(&self.path, target).map_err(fs_error(target))?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Err(e) = fs::remove_dir_all(&self.path) {
            tracing::warn!("Failed to clean up staging directory {:?}: {}", self.path, e);
        }
    }
}
