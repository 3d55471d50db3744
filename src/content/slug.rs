//! Slug generation

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DISALLOWED: Regex = Regex::new(r"[^a-z0-9\s-]").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref HYPHENS: Regex = Regex::new(r"-{2,}").unwrap();
}

/// Turn a title into a directory-safe slug (`Hello, World!` -> `hello-world`)
///
/// Never returns an empty string: titles without any usable character get a
/// slug derived from the current time.
pub fn slugify(title: &str) -> String {
    slugify_at(title, Utc::now())
}

/// [`slugify`] with an explicit clock for the fallback slug
pub fn slugify_at(title: &str, now: DateTime<Utc>) -> String {
    let lowered = title.trim().to_lowercase();
    let stripped = DISALLOWED.replace_all(&lowered, "");
    let hyphenated = WHITESPACE.replace_all(&stripped, "-");
    let collapsed = HYPHENS.replace_all(&hyphenated, "-");
    let slug = collapsed.trim_matches('-');

    if slug.is_empty() {
        format!("post-{}", now.format("%Y%m%d-%H%M%S%3f"))
    } else {
        slug.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  Rust:  Ownership & Borrowing!  "), "rust-ownership-borrowing");
        assert_eq!(slugify("Already-hyphenated -- title"), "already-hyphenated-title");
        assert_eq!(slugify("Top 10 Tips for 2024"), "top-10-tips-for-2024");
    }

    #[test]
    fn test_non_ascii_letters_are_stripped() {
        assert_eq!(slugify("Café Society"), "caf-society");
    }

    #[test]
    fn test_fallback_for_unusable_title() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 45).unwrap();
        assert_eq!(slugify_at("!!! ???", now), "post-20250601-123045000");
        assert_eq!(slugify_at("日本語", now), "post-20250601-123045000");
        assert_eq!(slugify_at(" - ", now), "post-20250601-123045000");
        assert!(!slugify("🎉🎉").is_empty());
    }
}
