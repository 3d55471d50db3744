//! Markdown to sanitized HTML for feed items

use std::collections::HashSet;

use ammonia::Builder;
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};

use super::urls::UrlResolver;

/// Render Markdown to HTML, resolving image and link targets
///
/// Every call builds its own parser.
pub fn render_markdown(markdown: &str, urls: &UrlResolver) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_SMART_PUNCTUATION
        | Options::ENABLE_GFM;
    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: CowStr::from(urls.image(&dest_url)),
            title,
            id,
        }),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: CowStr::from(urls.link(&dest_url)),
            title,
            id,
        }),
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Strip everything outside the allowed tag and attribute set
pub fn sanitize(html: &str) -> String {
    let mut builder = Builder::default();
    builder
        .add_tags(["img", "figure", "figcaption"])
        .tag_attributes(
            [
                ("img", HashSet::from(["src", "alt", "title", "width", "height"])),
                ("a", HashSet::from(["href", "name", "title"])),
            ]
            .into_iter()
            .collect(),
        )
        .url_schemes(HashSet::from(["http", "https", "mailto"]));
    builder.clean(html).to_string()
}
