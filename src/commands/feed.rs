//! Write the RSS feed to disk

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::feed::FeedRenderer;
use crate::output::Output;
use crate::Site;

/// Default output: `<public>/<feed_path>`
pub fn default_output(site: &Site) -> PathBuf {
    site.public_dir.join(site.config.feed_path.trim_start_matches('/'))
}

/// Render the feed to `output`, or to the default location
pub fn run(site: &Site, output: Option<&Path>) -> Result<()> {
    let out = Output::new();
    let path = output.map(Path::to_path_buf).unwrap_or_else(|| default_output(site));

    let xml = FeedRenderer::new(&site.config).render(&site.store())?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create {:?}", parent))?;
    }
    fs::write(&path, &xml).with_context(|| format!("Failed to write {:?}", path))?;

    tracing::info!("Generated {:?}", path);
    out.success(&format!("Wrote feed to {}", path.display()));
    Ok(())
}
