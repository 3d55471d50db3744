//! Image synchronizer - mirrors post images into the public directory

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::content::ContentStore;
use crate::error::{fs_error, Result};

/// Extensions mirrored to the public directory (compared lowercase)
pub const IMAGE_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "webp", "gif", "avif", "svg"];

/// What a sync run changed
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Slugs whose mirror was rebuilt
    pub rebuilt: Vec<String>,
    /// Slugs whose mirror already matched
    pub unchanged: Vec<String>,
    /// Mirrored slugs without a post, deleted
    pub orphans: Vec<String>,
    pub files_copied: usize,
    pub files_removed: usize,
}

impl SyncReport {
    /// Total number of writes and deletes
    pub fn changes(&self) -> usize {
        self.files_copied + self.files_removed + self.orphans.len()
    }
}

/// Mirrors images of published posts into `<mirror_root>/<slug>/`
pub struct ImageSync<'a> {
    store: &'a ContentStore,
    mirror_root: PathBuf,
}

impl<'a> ImageSync<'a> {
    pub fn new(store: &'a ContentStore, mirror_root: impl Into<PathBuf>) -> Self {
        Self {
            store,
            mirror_root: mirror_root.into(),
        }
    }

    pub fn mirror_root(&self) -> &Path {
        &self.mirror_root
    }

    /// Bring the mirror in line with the published posts
    pub fn sync(&self) -> Result<SyncReport> {
        fs::create_dir_all(&self.mirror_root).map_err(fs_error(&self.mirror_root))?;

        let mut report = SyncReport::default();
        let mut current = HashSet::new();

        for dir in self.store.published_dirs()? {
            if !current.insert(dir.slug.clone()) {
                tracing::warn!("Duplicate slug {} at {:?}, images not mirrored", dir.slug, dir.path);
                continue;
            }

            let sources = image_files(&dir.path)?;
            let mirror = self.mirror_root.join(&dir.slug);

            if mirror_matches(&mirror, &sources)? {
                tracing::debug!("Images for {} are up to date", dir.slug);
                report.unchanged.push(dir.slug);
                continue;
            }

            if mirror.exists() {
                report.files_removed += count_files(&mirror)?;
                fs::remove_dir_all(&mirror).map_err(fs_error(&mirror))?;
            }
            if !sources.is_empty() {
                fs::create_dir_all(&mirror).map_err(fs_error(&mirror))?;
                for (name, source) in &sources {
                    let dest = mirror.join(name);
                    fs::copy(source, &dest).map_err(fs_error(&dest))?;
                    report.files_copied += 1;
                }
            }
            tracing::info!("Synced {} image(s) for {}", sources.len(), dir.slug);
            report.rebuilt.push(dir.slug);
        }

        for entry in fs::read_dir(&self.mirror_root).map_err(fs_error(&self.mirror_root))? {
            let entry = entry.map_err(fs_error(&self.mirror_root))?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if current.contains(&name) {
                continue;
            }
            report.files_removed += count_files(&path)?;
            fs::remove_dir_all(&path).map_err(fs_error(&path))?;
            tracing::info!("Removed orphaned images for {}", name);
            report.orphans.push(name);
        }
        report.orphans.sort();

        Ok(report)
    }
}

/// Whether a file name has a mirrored image extension
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Image files directly inside a post directory, keyed by file name
fn image_files(dir: &Path) -> Result<BTreeMap<String, PathBuf>> {
    let mut files = BTreeMap::new();
    for entry in fs::read_dir(dir).map_err(fs_error(dir))? {
        let entry = entry.map_err(fs_error(dir))?;
        let path = entry.path();
        if path.is_file() && is_image(&path) {
            files.insert(entry.file_name().to_string_lossy().into_owned(), path);
        }
    }
    Ok(files)
}

/// The mirror holds exactly the source images, byte for byte
fn mirror_matches(mirror: &Path, sources: &BTreeMap<String, PathBuf>) -> Result<bool> {
    if !mirror.exists() {
        return Ok(sources.is_empty());
    }
    if !mirror.is_dir() {
        return Ok(false);
    }

    let mut seen = 0;
    for entry in fs::read_dir(mirror).map_err(fs_error(mirror))? {
        let entry = entry.map_err(fs_error(mirror))?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        let Some(source) = sources.get(&name) else {
            return Ok(false);
        };
        if !path.is_file() || !same_contents(source, &path)? {
            return Ok(false);
        }
        seen += 1;
    }

    Ok(seen == sources.len() && !sources.is_empty())
}

fn same_contents(a: &Path, b: &Path) -> Result<bool> {
    let len_a = fs::metadata(a).map_err(fs_error(a))?.len();
    let len_b = fs::metadata(b).map_err(fs_error(b))?.len();
    if len_a != len_b {
        return Ok(false);
    }
    Ok(fs::read(a).map_err(fs_error(a))? == fs::read(b).map_err(fs_error(b))?)
}

fn count_files(dir: &Path) -> Result<usize> {
    let mut count = 0;
    for entry in walkdir::WalkDir::new(dir).min_depth(1) {
        let entry = entry.map_err(|e| crate::error::ContentError::Filesystem {
            path: dir.to_path_buf(),
            source: e.into(),
        })?;
        if !entry.file_type().is_dir() {
            count += 1;
        }
    }
    Ok(count)
}
