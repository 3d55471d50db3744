//! Content store - post directories for drafts and published posts

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use super::frontmatter::{self, Document};
use super::Post;
use crate::config::Layout;
use crate::error::{fs_error, ContentError, Result};

/// Name of the content file inside every post directory
pub const CONTENT_FILE: &str = "index.mdx";

lazy_static! {
    static ref YEAR_DIR: Regex = Regex::new(r"^\d{4}$").unwrap();
}

/// Area of the store a post lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Drafts,
    Published,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Drafts => f.write_str("draft"),
            Location::Published => f.write_str("published"),
        }
    }
}

/// A post directory, not yet read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugDir {
    pub slug: String,
    pub path: PathBuf,
}

/// A post directory with its parsed content file
#[derive(Debug, Clone)]
pub struct Entry {
    pub slug: String,
    pub dir: PathBuf,
    pub location: Location,
    pub document: Document,
}

impl Entry {
    pub fn content_path(&self) -> PathBuf {
        self.dir.join(CONTENT_FILE)
    }

    /// Typed view of the content file
    pub fn post(&self) -> Post {
        Post::from_document(&self.slug, &self.document)
    }

    /// Title for display, empty when missing
    pub fn title(&self) -> String {
        self.document.data.get_text("title").unwrap_or_default()
    }
}

/// Reads and locates post directories on disk
#[derive(Debug, Clone)]
pub struct ContentStore {
    drafts_root: PathBuf,
    published_root: PathBuf,
    layout: Layout,
}

impl ContentStore {
    pub fn new(drafts_root: impl Into<PathBuf>, published_root: impl Into<PathBuf>, layout: Layout) -> Self {
        Self {
            drafts_root: drafts_root.into(),
            published_root: published_root.into(),
            layout,
        }
    }

    pub fn drafts_root(&self) -> &Path {
        &self.drafts_root
    }

    pub fn published_root(&self) -> &Path {
        &self.published_root
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn root(&self, location: Location) -> &Path {
        match location {
            Location::Drafts => &self.drafts_root,
            Location::Published => &self.published_root,
        }
    }

    /// Lazily read all drafts
    pub fn list_drafts(&self) -> Result<Entries> {
        self.list(Location::Drafts)
    }

    /// Lazily read all published posts
    pub fn list_published(&self) -> Result<Entries> {
        self.list(Location::Published)
    }

    /// Lazily read every post directory of a location. Directories without a
    /// content file or with malformed front-matter are skipped with a warning.
    pub fn list(&self, location: Location) -> Result<Entries> {
        Ok(Entries {
            location,
            dirs: self.slug_dirs(location)?.into_iter(),
        })
    }

    /// Published post directories, without reading them
    pub fn published_dirs(&self) -> Result<Vec<SlugDir>> {
        self.slug_dirs(Location::Published)
    }

    /// Post directories of a location, sorted by path. A missing root yields none.
    pub fn slug_dirs(&self, location: Location) -> Result<Vec<SlugDir>> {
        let root = self.root(location);
        if !root.is_dir() {
            return Ok(Vec::new());
        }

        let mut dirs = match (location, self.layout) {
            (Location::Drafts, _) | (Location::Published, Layout::Flat) => self.child_dirs(root)?,
            (Location::Published, Layout::Yearly) => {
                let mut dirs = Vec::new();
                for year in self.child_dirs(root)? {
                    if YEAR_DIR.is_match(&year.slug) {
                        dirs.extend(self.child_dirs(&year.path)?);
                    }
                }
                dirs
            }
        };

        dirs.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(dirs)
    }

    /// Directory of a post, if present
    pub fn find(&self, slug: &str, location: Location) -> Option<PathBuf> {
        let root = self.root(location);
        match (location, self.layout) {
            (Location::Drafts, _) | (Location::Published, Layout::Flat) => {
                let dir = root.join(slug);
                dir.is_dir().then_some(dir)
            }
            (Location::Published, Layout::Yearly) => fs::read_dir(root)
                .ok()?
                .filter_map(|e| e.ok())
                .filter(|e| e.file_name().to_str().is_some_and(|name| YEAR_DIR.is_match(name)))
                .map(|e| e.path().join(slug))
                .find(|dir| dir.is_dir()),
        }
    }

    pub fn exists(&self, slug: &str, location: Location) -> bool {
        self.find(slug, location).is_some()
    }

    /// Where a post is published, given its publication year
    pub fn target_dir(&self, slug: &str, year: i32) -> PathBuf {
        match self.layout {
            Layout::Flat => self.published_root.join(slug),
            Layout::Yearly => self.published_root.join(format!("{:04}", year)).join(slug),
        }
    }

    /// Directory for a new draft
    pub fn draft_dir(&self, slug: &str) -> PathBuf {
        self.drafts_root.join(slug)
    }

    /// Read one post directory
    pub fn read_entry(&self, dir: &SlugDir, location: Location) -> Result<Entry> {
        let path = dir.path.join(CONTENT_FILE);
        let raw = fs::read_to_string(&path).map_err(fs_error(&path))?;
        let document =
            frontmatter::parse(&raw).map_err(|source| ContentError::Malformed { path, source })?;

        Ok(Entry {
            slug: dir.slug.clone(),
            dir: dir.path.clone(),
            location,
            document,
        })
    }

    /// Sub-directories that can hold posts: hidden entries (staging
    /// directories included) and the drafts root are left out
    fn child_dirs(&self, parent: &Path) -> Result<Vec<SlugDir>> {
        let mut dirs = Vec::new();
        for entry in fs::read_dir(parent).map_err(fs_error(parent))? {
            let entry = entry.map_err(fs_error(parent))?;
            let path = entry.path();
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                tracing::warn!("Skipping non UTF-8 directory name {:?}", path);
                continue;
            };
            if name.starts_with('.') || !path.is_dir() || path == self.drafts_root {
                continue;
            }
            dirs.push(SlugDir { slug: name, path });
        }
        Ok(dirs)
    }
}

/// Lazy sequence of readable post directories
pub struct Entries {
    location: Location,
    dirs: std::vec::IntoIter<SlugDir>,
}

impl Iterator for Entries {
    type Item = Entry;

    fn next(&mut self) -> Option<Entry> {
        for dir in self.dirs.by_ref() {
            let path = dir.path.join(CONTENT_FILE);
            if !path.is_file() {
                tracing::warn!("Skipping {:?}: no {}", dir.path, CONTENT_FILE);
                continue;
            }

            let raw = match fs::read_to_string(&path) {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::warn!("Skipping {:?}: {}", path, e);
                    continue;
                }
            };

            match frontmatter::parse(&raw) {
                Ok(document) => {
                    return Some(Entry {
                        slug: dir.slug,
                        dir: dir.path,
                        location: self.location,
                        document,
                    })
                }
                Err(e) => {
                    tracing::warn!("Skipping {:?}: {}", path, e);
                }
            }
        }
        None
    }
}
