//! URL resolution for feed content

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use super::FeedError;

/// Characters escaped in relative paths before they are joined to the site URL
const PATH: &AsciiSet = &CONTROLS.add(b' ').add(b'"').add(b'<').add(b'>').add(b'`');

/// Resolves image and link URLs of one post to absolute URLs
#[derive(Debug, Clone)]
pub struct UrlResolver {
    site_url: String,
    image_base: String,
    link_base: String,
}

impl UrlResolver {
    /// `site_url` must be an absolute http(s) URL
    pub fn new(site_url: &str, image_dir: &str, blog_path: &str, slug: &str) -> Result<Self, FeedError> {
        let site_url = site_url.trim().trim_end_matches('/');
        if !is_absolute(site_url) {
            return Err(FeedError::InvalidSiteUrl(site_url.to_string()));
        }

        Ok(Self {
            site_url: site_url.to_string(),
            image_base: join(site_url, &[image_dir, slug]),
            link_base: join(site_url, &[blog_path, slug]),
        })
    }

    /// Resolve an image source; relative paths point into the post's image mirror
    pub fn image(&self, url: &str) -> String {
        self.resolve(url, &self.image_base)
    }

    /// Resolve a link target; relative paths are relative to the post page
    pub fn link(&self, url: &str) -> String {
        self.resolve(url, &self.link_base)
    }

    fn resolve(&self, url: &str, base: &str) -> String {
        let trimmed = url.trim();
        if trimmed.is_empty() || is_absolute(trimmed) || trimmed.starts_with("mailto:") {
            return trimmed.to_string();
        }

        if let Some(path) = trimmed.strip_prefix('/') {
            return format!("{}/{}", self.site_url, utf8_percent_encode(path, PATH));
        }

        let relative = trimmed.strip_prefix("./").unwrap_or(trimmed);
        format!("{}/{}", base, utf8_percent_encode(relative, PATH))
    }
}

fn is_absolute(url: &str) -> bool {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn join(site_url: &str, segments: &[&str]) -> String {
    let mut url = site_url.to_string();
    for segment in segments {
        let segment = segment.trim_matches('/');
        if !segment.is_empty() {
            url.push('/');
            url.push_str(segment);
        }
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> UrlResolver {
        UrlResolver::new("https://example.com/", "images/blog", "blog", "my-post").unwrap()
    }

    #[test]
    fn test_absolute_urls_pass_through() {
        let r = resolver();
        assert_eq!(r.image("https://cdn.example.net/a.png"), "https://cdn.example.net/a.png");
        assert_eq!(r.link("HTTP://Example.org/x"), "HTTP://Example.org/x");
        assert_eq!(r.link("mailto:me@example.com"), "mailto:me@example.com");
    }

    #[test]
    fn test_root_relative_urls() {
        let r = resolver();
        assert_eq!(r.link("/about"), "https://example.com/about");
        assert_eq!(r.image("/images/logo.svg"), "https://example.com/images/logo.svg");
    }

    #[test]
    fn test_relative_urls() {
        let r = resolver();
        assert_eq!(r.image("cover.png"), "https://example.com/images/blog/my-post/cover.png");
        assert_eq!(r.image("./cover photo.png"), "https://example.com/images/blog/my-post/cover%20photo.png");
        assert_eq!(r.link("notes"), "https://example.com/blog/my-post/notes");
        assert_eq!(r.link("#section"), "https://example.com/blog/my-post/#section");
    }

    #[test]
    fn test_invalid_site_url() {
        let err = UrlResolver::new("example.com", "images/blog", "blog", "x").unwrap_err();
        assert!(matches!(err, FeedError::InvalidSiteUrl(_)));
    }
}
