//! Feed renderer - published posts as an RSS 2.0 document

mod components;
mod html;
mod rss;
mod urls;

pub use components::{extract_attribute, Attribute};
pub use rss::{format_rfc822, Channel, Item};
pub use urls::UrlResolver;

use chrono::Utc;
use rayon::prelude::*;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;

use crate::config::SiteConfig;
use crate::content::{ContentStore, Post};
use crate::error::ContentError;

/// Shown in place of a post that could not be rendered
pub const CONTENT_UNAVAILABLE: &str = "<p>Content unavailable.</p>";

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("site url must be an absolute http(s) URL, got \"{0}\"")]
    InvalidSiteUrl(String),

    #[error(transparent)]
    Content(#[from] ContentError),
}

pub type Result<T, E = FeedError> = std::result::Result<T, E>;

/// Renders published posts into feed items
pub struct FeedRenderer<'a> {
    config: &'a SiteConfig,
}

impl<'a> FeedRenderer<'a> {
    pub fn new(config: &'a SiteConfig) -> Self {
        Self { config }
    }

    /// Full RSS document for every published post in the store
    pub fn render(&self, store: &ContentStore) -> Result<String> {
        // Site url is checked once for the whole document
        UrlResolver::new(self.config.site_url(), &self.config.image_dir, &self.config.blog_path, "")?;

        let posts: Vec<Post> = store.list_published()?.map(|entry| entry.post()).collect();
        let items = self.items(&posts);
        tracing::debug!("Rendered {} feed item(s) from {} post(s)", items.len(), posts.len());

        let site_url = self.config.site_url();
        let channel = Channel {
            title: self.config.title.clone(),
            link: site_url.to_string(),
            self_link: format!("{}/{}", site_url, self.config.feed_path.trim_start_matches('/')),
            description: self.config.channel_description().to_string(),
            language: self.config.language.clone(),
            last_build: items.first().map(Item::last_modified).unwrap_or_else(Utc::now),
        };

        Ok(rss::render(&channel, &items))
    }

    /// Feed items, newest first, limited to `feed_limit`
    ///
    /// Posts without a title or a readable `publishedAt` are left out.
    pub fn items(&self, posts: &[Post]) -> Vec<Item> {
        let mut items: Vec<Item> = posts
            .par_iter()
            .filter_map(|post| {
                let Some(published_at) = post.published_date() else {
                    tracing::warn!("Skipping {} in feed: no valid publishedAt", post.slug);
                    return None;
                };
                if post.title.trim().is_empty() {
                    tracing::warn!("Skipping {} in feed: missing title", post.slug);
                    return None;
                }

                Some(Item {
                    title: post.title.clone(),
                    link: self.post_url(&post.slug),
                    published_at,
                    updated_at: post.updated_date(),
                    summary: post.summary.clone(),
                    categories: post.tags.clone(),
                    content: self.render_post(post),
                })
            })
            .collect();

        items.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        if let Some(limit) = self.config.feed_limit {
            items.truncate(limit);
        }
        items
    }

    /// Sanitized HTML body of one post
    ///
    /// Errors and panics while rendering yield [`CONTENT_UNAVAILABLE`].
    pub fn render_post(&self, post: &Post) -> String {
        guarded(&post.slug, || self.try_render_post(post))
    }

    fn try_render_post(&self, post: &Post) -> Result<String> {
        let urls = UrlResolver::new(
            self.config.site_url(),
            &self.config.image_dir,
            &self.config.blog_path,
            &post.slug,
        )?;
        let markdown = components::translate(&post.body, &urls);
        let rendered = html::render_markdown(&markdown, &urls);
        Ok(html::sanitize(&rendered))
    }

    pub fn post_url(&self, slug: &str) -> String {
        let mut url = self.config.site_url().to_string();
        let blog_path = self.config.blog_path.trim_matches('/');
        if !blog_path.is_empty() {
            url.push('/');
            url.push_str(blog_path);
        }
        url.push('/');
        url.push_str(slug);
        url
    }
}

fn guarded<F>(slug: &str, render: F) -> String
where
    F: FnOnce() -> Result<String>,
{
    match panic::catch_unwind(AssertUnwindSafe(render)) {
        Ok(Ok(html)) => html,
        Ok(Err(e)) => {
            tracing::error!("Failed to render {} for the feed: {}", slug, e);
            CONTENT_UNAVAILABLE.to_string()
        }
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!("Rendering {} for the feed panicked: {}", slug, message);
            CONTENT_UNAVAILABLE.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Layout;
    use crate::content::store::tests::{store_in, write_post};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn config() -> SiteConfig {
        SiteConfig {
            title: "Test Blog".to_string(),
            url: "https://example.com/".to_string(),
            ..SiteConfig::default()
        }
    }

    fn post(slug: &str, published_at: Option<&str>, body: &str) -> Post {
        Post {
            slug: slug.to_string(),
            title: format!("Title {}", slug),
            summary: Some("Summary".to_string()),
            tags: vec!["rust".to_string()],
            image: None,
            published_at: published_at.map(str::to_string),
            updated_at: None,
            extra: Default::default(),
            source: Default::default(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_render_post_translates_and_resolves() {
        let config = config();
        let renderer = FeedRenderer::new(&config);
        let html = renderer.render_post(&post(
            "hello",
            None,
            "Intro\n\n<Figure src=\"shot.png\" alt=\"Shot\" />\n\n<Callout type=\"warning\">Mind the gap</Callout>\n\n<script>x</script>",
        ));

        assert!(html.contains(r#"src="https://example.com/images/blog/hello/shot.png""#), "{html}");
        assert!(html.contains("⚠️ Mind the gap"), "{html}");
        assert!(html.contains("<blockquote>"), "{html}");
        assert!(!html.contains("<script>"), "{html}");
    }

    #[test]
    fn test_tweet_without_id_renders_placeholder() {
        let config = config();
        let html = FeedRenderer::new(&config).render_post(&post("t", None, "<Tweet />"));
        assert!(html.contains("Tweet unavailable"), "{html}");
    }

    #[test]
    fn test_invalid_site_url_is_content_unavailable() {
        let config = SiteConfig {
            url: "not a url".to_string(),
            ..SiteConfig::default()
        };
        let html = FeedRenderer::new(&config).render_post(&post("x", None, "Body"));
        assert_eq!(html, CONTENT_UNAVAILABLE);
    }

    #[test]
    fn test_panicking_render_is_content_unavailable() {
        let html = guarded("boom", || panic!("renderer bug"));
        assert_eq!(html, CONTENT_UNAVAILABLE);

        let html = guarded("fine", || Ok("<p>ok</p>".to_string()));
        assert_eq!(html, "<p>ok</p>");
    }

    #[test]
    fn test_items_sorted_filtered_and_limited() {
        let mut config = config();
        let posts = vec![
            post("old", Some("2023-05-01T00:00:00.000Z"), ""),
            post("draftish", None, ""),
            post("new", Some("2024-02-01T00:00:00.000Z"), ""),
            post("mid", Some("2023-12-01"), ""),
        ];

        let items = FeedRenderer::new(&config).items(&posts);
        let links: Vec<&str> = items.iter().map(|i| i.link.as_str()).collect();
        assert_eq!(
            links,
            vec![
                "https://example.com/blog/new",
                "https://example.com/blog/mid",
                "https://example.com/blog/old",
            ]
        );

        config.feed_limit = Some(1);
        assert_eq!(FeedRenderer::new(&config).items(&posts).len(), 1);
    }

    #[test]
    fn test_render_store() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp, Layout::Yearly);
        write_post(
            &store.target_dir("first", 2024),
            "---\ntitle: First\npublishedAt: \"2024-01-01T00:00:00.000Z\"\nupdatedAt: \"2024-06-01T12:00:00.000Z\"\nsummary: One\ntags: [a, b]\n---\n\nSee [docs](docs).\n",
        );
        write_post(
            &store.target_dir("second", 2023),
            "---\ntitle: Second\npublishedAt: \"2023-01-01T00:00:00.000Z\"\nsummary: Two\n---\n\nBody\n",
        );

        let config = config();
        let xml = FeedRenderer::new(&config).render(&store).unwrap();

        assert!(xml.contains("<title>Test Blog</title>"));
        assert!(xml.contains(r#"<atom:link href="https://example.com/rss.xml""#));
        assert!(xml.contains("<lastBuildDate>Sat, 01 Jun 2024 12:00:00 GMT</lastBuildDate>"));
        assert!(xml.contains("<category>a</category>"));
        assert!(xml.contains("<category>b</category>"));
        assert!(xml.contains("https://example.com/blog/first/docs"));
        let first = xml.find("blog/first").unwrap();
        let second = xml.find("blog/second").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_render_empty_store() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp, Layout::Flat);
        let config = config();
        let xml = FeedRenderer::new(&config).render(&store).unwrap();
        assert!(xml.contains("<channel>"));
        assert!(!xml.contains("<item>"));
    }
}
