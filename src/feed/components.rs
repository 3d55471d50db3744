//! Translation of custom MDX components into Markdown/HTML
//!
//! Posts embed `<Figure>`, `<Tweet>`, `<Callout>`, `<Credits>` and
//! `<Comment>` components that only the site's page renderer understands.
//! Feed readers get standard Markdown or plain HTML instead.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::HashMap;

use super::urls::UrlResolver;

/// Component attributes that are ever read. Nothing else is extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Src,
    Alt,
    Caption,
    Id,
    Url,
    Type,
    Content,
}

impl Attribute {
    pub const ALL: [Attribute; 7] = [
        Attribute::Src,
        Attribute::Alt,
        Attribute::Caption,
        Attribute::Id,
        Attribute::Url,
        Attribute::Type,
        Attribute::Content,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Attribute::Src => "src",
            Attribute::Alt => "alt",
            Attribute::Caption => "caption",
            Attribute::Id => "id",
            Attribute::Url => "url",
            Attribute::Type => "type",
            Attribute::Content => "content",
        }
    }
}

lazy_static! {
    /// One pattern per allowed attribute: `name="v"`, `name='v'`, `name={"v"}`, `name={v}` or `name=v`
    static ref ATTRIBUTES: HashMap<Attribute, Regex> = Attribute::ALL
        .iter()
        .map(|&attr| {
            let pattern = format!(
                r#"(?:^|\s){}\s*=\s*(?:"((?:[^"\\]|\\.)*)"|'((?:[^'\\]|\\.)*)'|\{{\s*"([^"]*)"\s*\}}|\{{\s*'([^']*)'\s*\}}|\{{([^}}]*)\}}|([^\s/>]+))"#,
                attr.name()
            );
            (attr, Regex::new(&pattern).unwrap())
        })
        .collect();
    static ref ESCAPED_QUOTE: Regex = Regex::new(r#"\\(['"\\])"#).unwrap();

    static ref FIGURE: Regex = tag("Figure", Form::Void);
    static ref TWEET: Regex = tag("Tweet", Form::Void);
    static ref CALLOUT: Regex = tag("Callout", Form::Paired);
    static ref CREDITS_EMPTY: Regex = tag("Credits", Form::SelfClosing);
    static ref CREDITS: Regex = tag("Credits", Form::Paired);
    static ref COMMENT_EMPTY: Regex = tag("Comment", Form::SelfClosing);
    static ref COMMENT: Regex = tag("Comment", Form::Paired);
}

/// Attribute text; `>` inside quoted values does not end the tag
const ATTRIBUTE_TEXT: &str = r#"(?:\s+((?:[^>"']|"[^"]*"|'[^']*')*?))?"#;

enum Form {
    /// `<Name ... />` or `<Name ...>`
    Void,
    /// `<Name ... />`
    SelfClosing,
    /// `<Name ...>children</Name>`, children in group 2
    Paired,
}

fn tag(name: &str, form: Form) -> Regex {
    let pattern = match form {
        Form::Void => format!(r"(?s)<{name}{ATTRIBUTE_TEXT}\s*/?>"),
        Form::SelfClosing => format!(r"(?s)<{name}{ATTRIBUTE_TEXT}\s*/>"),
        Form::Paired => format!(r"(?s)<{name}{ATTRIBUTE_TEXT}\s*>(.*?)</{name}>"),
    };
    Regex::new(&pattern).unwrap()
}

/// Value of an attribute inside a component's attribute text
pub fn extract_attribute(attributes: &str, attr: Attribute) -> Option<String> {
    let caps = ATTRIBUTES[&attr].captures(attributes)?;

    if let Some(quoted) = caps.get(1).or_else(|| caps.get(2)) {
        return Some(ESCAPED_QUOTE.replace_all(quoted.as_str(), "$1").into_owned());
    }
    (3..=6)
        .find_map(|i| caps.get(i))
        .map(|m| m.as_str().trim().to_string())
}

/// Replace every known component with Markdown or HTML
pub fn translate(body: &str, urls: &UrlResolver) -> String {
    let out = FIGURE.replace_all(body, |caps: &Captures| figure(attrs(caps), urls));
    let out = TWEET.replace_all(&out, |caps: &Captures| tweet(attrs(caps)));
    let out = CALLOUT.replace_all(&out, |caps: &Captures| callout(attrs(caps), &caps[2]));
    let out = CREDITS_EMPTY.replace_all(&out, |caps: &Captures| emphasis(attrs(caps), "", "*"));
    let out = CREDITS.replace_all(&out, |caps: &Captures| emphasis(attrs(caps), &caps[2], "*"));
    let out = COMMENT_EMPTY.replace_all(&out, |caps: &Captures| emphasis(attrs(caps), "", "**"));
    let out = COMMENT.replace_all(&out, |caps: &Captures| emphasis(attrs(caps), &caps[2], "**"));
    out.into_owned()
}

fn attrs<'c>(caps: &'c Captures) -> &'c str {
    caps.get(1).map(|m| m.as_str()).unwrap_or("")
}

/// `<Figure src alt caption />` as an image, or a `<figure>` when captioned
fn figure(attributes: &str, urls: &UrlResolver) -> String {
    let Some(src) = extract_attribute(attributes, Attribute::Src).filter(|s| !s.trim().is_empty()) else {
        tracing::debug!("Dropping <Figure> without src");
        return String::new();
    };
    let src = urls.image(&src);
    let alt = extract_attribute(attributes, Attribute::Alt).unwrap_or_default();

    match extract_attribute(attributes, Attribute::Caption).filter(|c| !c.trim().is_empty()) {
        Some(caption) => format!(
            r#"<figure><img src="{}" alt="{}" /><figcaption>{}</figcaption></figure>"#,
            escape_html(&src),
            escape_html(&alt),
            escape_html(&caption)
        ),
        None => format!("![{}](<{}>)", escape_link_text(&alt), src),
    }
}

/// `<Tweet id | url />` as a link, or a placeholder when it cannot be linked
fn tweet(attributes: &str) -> String {
    let url = extract_attribute(attributes, Attribute::Url)
        .filter(|u| !u.trim().is_empty())
        .or_else(|| {
            extract_attribute(attributes, Attribute::Id)
                .filter(|id| !id.trim().is_empty())
                .map(|id| format!("https://twitter.com/i/status/{}", id.trim()))
        });

    match url {
        Some(url) => format!("\n\n> 📱 **Tweet:** [View on X/Twitter](<{}>)\n\n", url.trim()),
        None => "\n\n> 📱 **Tweet unavailable:** this embed could not be displayed.\n\n".to_string(),
    }
}

/// `<Callout type>…</Callout>` as a blockquote led by a severity icon
fn callout(attributes: &str, content: &str) -> String {
    let icon = match extract_attribute(attributes, Attribute::Type).as_deref() {
        Some("warning") => "⚠️",
        Some("error") => "❌",
        Some("success") => "✅",
        _ => "ℹ️",
    };

    let mut quote = String::from("\n\n>");
    quote.push(' ');
    quote.push_str(icon);
    for (i, line) in content.trim().lines().enumerate() {
        let line = line.trim();
        if i == 0 {
            if !line.is_empty() {
                quote.push(' ');
                quote.push_str(line);
            }
        } else if line.is_empty() {
            quote.push_str("\n>");
        } else {
            quote.push_str("\n> ");
            quote.push_str(line);
        }
    }
    quote.push_str("\n\n");
    quote
}

/// `<Credits>`/`<Comment>`: the `content` attribute wins over children
fn emphasis(attributes: &str, children: &str, marker: &str) -> String {
    let text = extract_attribute(attributes, Attribute::Content)
        .unwrap_or_else(|| children.trim().to_string());
    if text.trim().is_empty() {
        return String::new();
    }
    format!("\n\n{marker}{}{marker}\n\n", text.trim())
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn escape_link_text(s: &str) -> String {
    s.replace('\\', "\\\\").replace('[', "\\[").replace(']', "\\]")
}
