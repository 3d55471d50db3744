//! Mirror post images into the public directory

use anyhow::Result;

use crate::output::Output;
use crate::Site;

pub fn run(site: &Site) -> Result<()> {
    let out = Output::new();
    let store = site.store();

    if !store.published_root().is_dir() {
        out.info(&format!(
            "No content directory at {}, nothing to sync",
            store.published_root().display()
        ));
        return Ok(());
    }

    let sync = site.image_sync(&store);
    let report = sync.sync().map_err(|e| {
        out.error(&e.to_string());
        e
    })?;

    for slug in &report.rebuilt {
        out.success(&format!("Synced images for {}", slug));
    }
    for slug in &report.orphans {
        out.warning(&format!("Removed images of missing post {}", slug));
    }

    if report.changes() == 0 {
        out.summary(&format!("Images up to date in {}", sync.mirror_root().display()));
    } else {
        out.summary(&format!(
            "{} file(s) copied, {} removed, {} post(s) unchanged",
            report.files_copied,
            report.files_removed,
            report.unchanged.len()
        ));
    }
    Ok(())
}
