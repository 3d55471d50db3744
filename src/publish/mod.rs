//! Publisher - moves drafts into the published store
//!
//! Each draft goes through validation, target resolution, timestamp
//! assignment, staging next to the target, an atomic rename, and finally the
//! removal of the draft directory. Only the rename makes a post visible.

pub mod git;
mod staging;

use chrono::{DateTime, Datelike, Utc};
use std::fs;
use std::path::{Path, PathBuf};

use crate::content::{format_timestamp, frontmatter, ContentStore, Entry, Location, Post};
use crate::error::{fs_error, ContentError, Result};

pub use git::{commit_message, Git};
pub use staging::StagingDir;

/// A post that made it into the published store
#[derive(Debug, Clone)]
pub struct Published {
    pub slug: String,
    pub title: String,
    /// Draft directory the post came from
    pub source: PathBuf,
    /// Directory the post now lives in
    pub target: PathBuf,
    pub published_at: String,
    /// Set when this was a republish
    pub updated_at: Option<String>,
    /// The draft directory could not be removed
    pub warning: Option<String>,
}

/// Result of publishing one draft
#[derive(Debug)]
pub enum PublishOutcome {
    Published(Published),
    /// Validation or collision; nothing was touched
    Skipped { slug: String, reason: ContentError },
    /// Staging or commit failed; the draft is untouched
    Failed { slug: String, error: ContentError },
}

impl PublishOutcome {
    pub fn slug(&self) -> &str {
        match self {
            PublishOutcome::Published(p) => &p.slug,
            PublishOutcome::Skipped { slug, .. } | PublishOutcome::Failed { slug, .. } => slug,
        }
    }
}

/// Outcomes of a batch, in processing order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<PublishOutcome>,
}

impl BatchReport {
    pub fn published(&self) -> impl Iterator<Item = &Published> {
        self.outcomes.iter().filter_map(|o| match o {
            PublishOutcome::Published(p) => Some(p),
            _ => None,
        })
    }

    pub fn published_count(&self) -> usize {
        self.published().count()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, PublishOutcome::Skipped { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, PublishOutcome::Failed { .. }))
            .count()
    }

    /// Drafts that did not get published, skipped or failed
    pub fn error_count(&self) -> usize {
        self.skipped_count() + self.failed_count()
    }
}

/// Publishes drafts from a content store
pub struct Publisher<'a> {
    store: &'a ContentStore,
}

impl<'a> Publisher<'a> {
    pub fn new(store: &'a ContentStore) -> Self {
        Self { store }
    }

    /// Publish drafts one after another; a failing draft never stops the others
    pub fn publish_batch(&self, entries: &[Entry]) -> BatchReport {
        let outcomes = entries.iter().map(|entry| self.publish(entry)).collect();
        BatchReport { outcomes }
    }

    /// Publish a single draft, stamped with the current time
    pub fn publish(&self, entry: &Entry) -> PublishOutcome {
        self.publish_at(entry, Utc::now())
    }

    /// Publish a single draft as of `now`
    pub fn publish_at(&self, entry: &Entry, now: DateTime<Utc>) -> PublishOutcome {
        let slug = entry.slug.clone();

        let (post, target) = match self.prepare(entry, now) {
            Ok(prepared) => prepared,
            Err(reason) => return PublishOutcome::Skipped { slug, reason },
        };

        if let Err(error) = self.stage_and_commit(entry, &post, &target) {
            tracing::warn!("Publishing {} failed: {}", slug, error);
            return PublishOutcome::Failed { slug, error };
        }
        tracing::info!("Published {} to {:?}", slug, target);

        let warning = match fs::remove_dir_all(&entry.dir) {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!("Published {} but could not remove draft {:?}: {}", slug, entry.dir, e);
                Some(format!(
                    "could not remove draft directory {}: {}",
                    entry.dir.display(),
                    e
                ))
            }
        };

        PublishOutcome::Published(Published {
            slug,
            title: post.title,
            source: entry.dir.clone(),
            target,
            published_at: post.published_at.unwrap_or_default(),
            updated_at: post.updated_at,
            warning,
        })
    }

    /// Validate, resolve the target and assign timestamps
    fn prepare(&self, entry: &Entry, now: DateTime<Utc>) -> Result<(Post, PathBuf)> {
        let mut post = entry.post();

        if post.title.trim().is_empty() {
            return Err(ContentError::Validation {
                slug: entry.slug.clone(),
                field: "title",
            });
        }
        if post.summary.is_none() {
            return Err(ContentError::Validation {
                slug: entry.slug.clone(),
                field: "summary",
            });
        }

        if let Some(existing) = self.store.find(&entry.slug, Location::Published) {
            return Err(ContentError::Collision {
                slug: entry.slug.clone(),
                path: existing,
            });
        }

        let stamp = format_timestamp(now);
        if post.published_at.is_some() {
            post.updated_at = Some(stamp);
        } else {
            post.published_at = Some(stamp);
            post.updated_at = None;
            post.source.remove("updatedAt");
        }

        let year = post.published_date().unwrap_or(now).year();
        let target = self.store.target_dir(&entry.slug, year);
        if target.exists() {
            return Err(ContentError::Collision {
                slug: entry.slug.clone(),
                path: target,
            });
        }

        Ok((post, target))
    }

    fn stage_and_commit(&self, entry: &Entry, post: &Post, target: &Path) -> Result<()> {
        let parent = target.parent().unwrap_or(self.store.published_root());
        fs::create_dir_all(parent).map_err(fs_error(parent))?;

        let staging = StagingDir::create(parent, &entry.slug)?;
        staging.write_content(&frontmatter::serialize(&post.body, &post.front_matter()))?;
        let assets = staging.copy_assets(&entry.dir)?;
        tracing::debug!("Staged {} with {} asset(s)", entry.slug, assets);

        staging.commit(target)
    }
}
