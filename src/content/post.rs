//! Post model

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use indexmap::IndexMap;

use super::frontmatter::{Document, FieldValue, FrontMatter};

/// Front-matter keys with a typed home on [`Post`]
const KNOWN_FIELDS: [&str; 6] = ["title", "summary", "tags", "image", "publishedAt", "updatedAt"];

/// A blog post, draft or published
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    /// Directory name, unique per location
    pub slug: String,

    /// Post title, required to publish
    pub title: String,

    /// Short description, required to publish
    pub summary: Option<String>,

    /// Tags in display order
    pub tags: Vec<String>,

    /// Preview image override
    pub image: Option<String>,

    /// First publication timestamp, never changed once set
    pub published_at: Option<String>,

    /// Timestamp of the latest republish
    pub updated_at: Option<String>,

    /// Any other front-matter field, kept as found
    pub extra: IndexMap<String, FieldValue>,

    /// Front-matter as read; typed fields left unchanged are written back from here
    pub source: FrontMatter,

    /// Markdown/MDX body
    pub body: String,
}

impl Post {
    /// Build a typed post from a parsed content file
    pub fn from_document(slug: impl Into<String>, doc: &Document) -> Self {
        let data = &doc.data;
        let extra = data
            .iter()
            .filter(|(key, _)| !KNOWN_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Self {
            slug: slug.into(),
            title: data.get_text("title").unwrap_or_default(),
            summary: data.get_text("summary"),
            tags: data.get_list("tags"),
            image: data.get_text("image"),
            published_at: data.get_text("publishedAt"),
            updated_at: data.get_text("updatedAt"),
            extra,
            source: data.clone(),
            body: doc.body.clone(),
        }
    }

    /// Front-matter for this post; field order is applied when serializing
    ///
    /// Fields whose typed value did not change keep their original form, so
    /// `image: null` stays null and a scalar `tags: x` stays a scalar.
    pub fn front_matter(&self) -> FrontMatter {
        let mut data = FrontMatter::new();
        let title = Some(self.title.as_str()).filter(|t| !t.trim().is_empty());
        self.put_text(&mut data, "title", title);
        self.put_text(&mut data, "publishedAt", self.published_at.as_deref());
        self.put_text(&mut data, "updatedAt", self.updated_at.as_deref());
        self.put_text(&mut data, "summary", self.summary.as_deref());
        self.put_text(&mut data, "image", self.image.as_deref());

        match self.source.get("tags") {
            Some(original) if original.as_list() == self.tags => data.insert("tags", original.clone()),
            None if self.tags.is_empty() => {}
            _ => data.insert("tags", self.tags.clone()),
        }

        for (key, value) in &self.extra {
            data.insert(key.clone(), value.clone());
        }
        data
    }

    fn put_text(&self, data: &mut FrontMatter, key: &str, value: Option<&str>) {
        let original = self.source.get(key);
        let original_text = self.source.get_text(key);
        match (value, original) {
            (Some(value), Some(original)) if original_text.as_deref() == Some(value) => {
                data.insert(key, original.clone())
            }
            (Some(value), _) => data.insert(key, value),
            // blank or null in the file, still unset
            (None, Some(original)) if original_text.is_none() => data.insert(key, original.clone()),
            (None, _) => {}
        }
    }

    pub fn to_document(&self) -> Document {
        Document {
            data: self.front_matter(),
            body: self.body.clone(),
        }
    }

    /// Parsed first publication time
    pub fn published_date(&self) -> Option<DateTime<Utc>> {
        self.published_at.as_deref().and_then(parse_timestamp)
    }

    /// Parsed update time
    pub fn updated_date(&self) -> Option<DateTime<Utc>> {
        self.updated_at.as_deref().and_then(parse_timestamp)
    }
}

/// Timestamp format written into front-matter (`2024-01-01T00:00:00.000Z`)
pub fn format_timestamp(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Parse a front-matter timestamp in various formats, as UTC
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    // RFC 3339 / ISO 8601 with offset
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    let formats = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M:%S",
    ];
    for fmt in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::frontmatter;
    use chrono::{Datelike, TimeZone};

    #[test]
    fn test_from_document() {
        let doc = frontmatter::parse(
            r#"---
title: Hello
summary: ""
tags: single
publishedAt: 2024-01-01T00:00:00Z
series: Intro
---

Body
"#,
        )
        .unwrap();

        let post = Post::from_document("hello", &doc);
        assert_eq!(post.slug, "hello");
        assert_eq!(post.title, "Hello");
        assert_eq!(post.summary, None);
        assert_eq!(post.tags, vec!["single"]);
        assert_eq!(post.published_at.as_deref(), Some("2024-01-01T00:00:00Z"));
        assert_eq!(post.updated_at, None);
        assert_eq!(
            post.extra.get("series"),
            Some(&FieldValue::String("Intro".to_string()))
        );
        assert_eq!(post.body, "Body\n");
    }

    #[test]
    fn test_front_matter_round_trip() {
        let doc = frontmatter::parse(
            "---\ntitle: T\nsummary: S\ntags: [a, b]\nimage: cover.jpg\nlayout: wide\n---\n\nText\n",
        )
        .unwrap();
        let post = Post::from_document("t", &doc);
        let rebuilt = post.to_document();

        assert_eq!(rebuilt, doc);
        assert_eq!(Post::from_document("t", &rebuilt), post);
    }

    #[test]
    fn test_front_matter_keeps_original_forms() {
        let doc = frontmatter::parse(
            "---\ntitle: T\nsummary: \"\"\nimage: null\ntags: single\n---\n",
        )
        .unwrap();
        let post = Post::from_document("t", &doc);
        let data = post.front_matter();

        assert_eq!(data.get("image"), Some(&FieldValue::Null));
        assert_eq!(data.get("summary"), Some(&FieldValue::String(String::new())));
        assert_eq!(data.get("tags"), Some(&FieldValue::String("single".to_string())));
        assert_eq!(data, doc.data);
    }

    #[test]
    fn test_front_matter_does_not_invent_tags() {
        let doc = frontmatter::parse("---\ntitle: T\nimage: \"\"\n---\n").unwrap();
        let mut post = Post::from_document("t", &doc);

        let data = post.front_matter();
        assert!(!data.contains_key("tags"));
        assert_eq!(data.get("image"), Some(&FieldValue::String(String::new())));

        post.tags.push("new".to_string());
        post.image = Some("cover.png".to_string());
        let data = post.front_matter();
        assert_eq!(data.get_list("tags"), vec!["new"]);
        assert_eq!(data.get_text("image").as_deref(), Some("cover.png"));
    }

    #[test]
    fn test_front_matter_drops_cleared_fields() {
        let doc = frontmatter::parse("---\ntitle: T\nupdatedAt: 2024-02-01T00:00:00Z\ntags: [a]\n---\n").unwrap();
        let mut post = Post::from_document("t", &doc);
        post.updated_at = None;
        post.tags.clear();

        let data = post.front_matter();
        assert!(!data.contains_key("updatedAt"));
        assert_eq!(data.get("tags"), Some(&FieldValue::List(Vec::new())));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2024-01-15T10:30:00.000Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15T10:30:00+00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15 10:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15T10:30:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-01-15").map(|d| d.day()),
            Some(15)
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_format_timestamp() {
        let time = Utc.with_ymd_and_hms(2024, 3, 9, 8, 7, 6).unwrap();
        assert_eq!(format_timestamp(time), "2024-03-09T08:07:06.000Z");
        assert_eq!(parse_timestamp(&format_timestamp(time)), Some(time));
    }
}
