//! Create a new draft

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::content::frontmatter::serialize;
use crate::content::{slugify, ContentStore, FieldValue, FrontMatter, Location, CONTENT_FILE};
use crate::error::{fs_error, ContentError};
use crate::output::Output;
use crate::prompt::{parse_tags, Prompt};
use crate::Site;

/// Answers collected for a new draft
#[derive(Debug, Clone, Default)]
pub struct DraftRequest {
    pub title: String,
    pub summary: Option<String>,
    pub tags: Vec<String>,
}

impl DraftRequest {
    /// Scaffold front-matter: title, summary when given, tags
    pub fn front_matter(&self) -> FrontMatter {
        let mut data = FrontMatter::new();
        data.insert("title", self.title.as_str());
        if let Some(summary) = self.summary.as_deref().filter(|s| !s.trim().is_empty()) {
            data.insert("summary", summary);
        }
        data.insert("tags", FieldValue::List(self.tags.clone()));
        data
    }
}

/// Create `<drafts>/<slug>/index.mdx`, refusing slugs already in use
pub fn create_draft(store: &ContentStore, request: &DraftRequest) -> crate::error::Result<PathBuf> {
    let slug = slugify(&request.title);

    for location in [Location::Drafts, Location::Published] {
        if let Some(path) = store.find(&slug, location) {
            return Err(ContentError::DuplicateSlug {
                slug,
                location,
                path,
            });
        }
    }

    let root = store.drafts_root();
    fs::create_dir_all(root).map_err(fs_error(root))?;

    let dir = store.draft_dir(&slug);
    fs::create_dir(&dir).map_err(|e| match e.kind() {
        std::io::ErrorKind::AlreadyExists => ContentError::DuplicateSlug {
            slug: slug.clone(),
            location: Location::Drafts,
            path: dir.clone(),
        },
        _ => fs_error(&dir)(e),
    })?;

    let path = dir.join(CONTENT_FILE);
    if let Err(e) = fs::write(&path, serialize("", &request.front_matter())) {
        if let Err(cleanup) = fs::remove_dir_all(&dir) {
            tracing::warn!("Failed to remove {:?}: {}", dir, cleanup);
        }
        return Err(fs_error(&path)(e));
    }

    tracing::debug!("Created draft {:?}", path);
    Ok(path)
}

/// Prompt for a title, summary and tags, then create the draft
pub fn run(site: &Site) -> Result<()> {
    let out = Output::new();
    let mut prompt = Prompt::stdio();

    let request = DraftRequest {
        title: prompt.required("Title")?,
        summary: prompt.optional("Summary (optional)")?,
        tags: prompt
            .optional("Tags (comma-separated, optional)")?
            .map(|t| parse_tags(&t))
            .unwrap_or_default(),
    };

    let store = site.store();
    match create_draft(&store, &request) {
        Ok(path) => {
            out.success(&format!("Created draft {}", path.display()));
            out.info("");
            out.info("Next steps:");
            out.info(&format!("  1. Write the post in {}", path.display()));
            out.info("  2. Put images next to it and reference them by file name");
            out.info("  3. Add a summary if you have not, then run `draftpress publish`");
            Ok(())
        }
        Err(e) => {
            out.error(&e.to_string());
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Layout;
    use crate::content::frontmatter::parse;
    use crate::content::store::tests::{store_in, write_post};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn request(title: &str) -> DraftRequest {
        DraftRequest {
            title: title.to_string(),
            summary: None,
            tags: Vec::new(),
        }
    }

    #[test]
    fn test_create_draft_scaffold() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp, Layout::Yearly);
        let req = DraftRequest {
            title: "Hello, World!".to_string(),
            summary: Some("First post".to_string()),
            tags: vec!["rust".to_string(), "intro".to_string()],
        };

        let path = create_draft(&store, &req).unwrap();
        assert_eq!(path, store.draft_dir("hello-world").join(CONTENT_FILE));

        let doc = parse(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc.data.get_text("title").as_deref(), Some("Hello, World!"));
        assert_eq!(doc.data.get_text("summary").as_deref(), Some("First post"));
        assert_eq!(doc.data.get_list("tags"), vec!["rust", "intro"]);
        assert_eq!(doc.body, "");
    }

    #[test]
    fn test_create_draft_without_summary() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp, Layout::Flat);

        let path = create_draft(&store, &request("Plain")).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("tags: []"), "{raw}");
        assert!(!raw.contains("summary"));
    }

    #[test]
    fn test_duplicate_draft_slug() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp, Layout::Yearly);
        create_draft(&store, &request("Same Title")).unwrap();

        let err = create_draft(&store, &request("same title")).unwrap_err();
        assert!(matches!(err, ContentError::DuplicateSlug { location: Location::Drafts, .. }));
    }

    #[test]
    fn test_duplicate_published_slug_leaves_no_draft() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp, Layout::Yearly);
        write_post(&store.target_dir("taken", 2023), "---\ntitle: Taken\n---\n");

        let err = create_draft(&store, &request("Taken")).unwrap_err();
        assert!(matches!(err, ContentError::DuplicateSlug { location: Location::Published, .. }));
        assert!(!store.draft_dir("taken").exists());
    }

    #[test]
    fn test_symbol_only_title_gets_fallback_slug() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp, Layout::Flat);

        let path = create_draft(&store, &request("!!!")).unwrap();
        let slug = path.parent().unwrap().file_name().unwrap().to_string_lossy().into_owned();
        assert!(slug.starts_with("post-"), "{slug}");
    }
}
