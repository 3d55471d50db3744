//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub feed_description: String,
    pub language: String,

    // URL
    pub url: String,
    /// Route prefix of post pages, e.g. `blog` for `/blog/<slug>`
    pub blog_path: String,
    /// Route of the generated feed, relative to the site root
    pub feed_path: String,
    /// Maximum number of feed items, newest first (all posts when unset)
    pub feed_limit: Option<usize>,

    // Directory
    pub content_dir: String,
    pub drafts_dir: String,
    pub public_dir: String,
    /// Image mirror, relative to `public_dir`
    pub image_dir: String,
    pub layout: Layout,

    // Version control
    #[serde(default)]
    pub git: GitConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "My Blog".to_string(),
            description: String::new(),
            feed_description: String::new(),
            language: "en-us".to_string(),

            url: "http://example.com".to_string(),
            blog_path: "blog".to_string(),
            feed_path: "rss.xml".to_string(),
            feed_limit: None,

            content_dir: "src/content/blog".to_string(),
            drafts_dir: "src/content/blog/drafts".to_string(),
            public_dir: "public".to_string(),
            image_dir: "images/blog".to_string(),
            layout: Layout::Yearly,

            git: GitConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Site URL without a trailing slash
    pub fn site_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    /// Description used for the feed channel, falling back to the site description
    pub fn channel_description(&self) -> &str {
        if self.feed_description.is_empty() {
            &self.description
        } else {
            &self.feed_description
        }
    }
}

/// How published posts are laid out under `content_dir`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// `<content_dir>/<slug>/index.mdx`
    Flat,
    /// `<content_dir>/<YYYY>/<slug>/index.mdx`
    Yearly,
}

/// Version control after publishing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    pub enabled: bool,
    pub remote: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            remote: "origin".to_string(),
        }
    }
}
