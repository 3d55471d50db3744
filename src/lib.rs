//! draftpress: draft-to-published pipeline for an MDX blog
//!
//! Drafts live in their own directory until they are published into the
//! content tree. Published posts get their images mirrored into the public
//! directory and are syndicated as an RSS feed.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod feed;
pub mod images;
pub mod output;
pub mod prompt;
pub mod publish;
pub mod server;

use anyhow::Result;
use std::path::{Path, PathBuf};

use content::ContentStore;
use images::ImageSync;

/// A blog site rooted at a directory
#[derive(Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Published posts
    pub content_dir: PathBuf,
    /// Drafts
    pub drafts_dir: PathBuf,
    /// Public (static) directory
    pub public_dir: PathBuf,
}

impl Site {
    /// Load the site in `base_dir`, reading `_config.yml` when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Self {
        let content_dir = base_dir.join(&config.content_dir);
        let drafts_dir = base_dir.join(&config.drafts_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Self {
            config,
            base_dir,
            content_dir,
            drafts_dir,
            public_dir,
        }
    }

    pub fn store(&self) -> ContentStore {
        ContentStore::new(&self.drafts_dir, &self.content_dir, self.config.layout)
    }

    /// Where post images are mirrored
    pub fn image_mirror_dir(&self) -> PathBuf {
        self.public_dir.join(self.config.image_dir.trim_matches('/'))
    }

    pub fn image_sync<'a>(&self, store: &'a ContentStore) -> ImageSync<'a> {
        ImageSync::new(store, self.image_mirror_dir())
    }
}
