//! RSS 2.0 document assembly

use chrono::{DateTime, Utc};

/// Channel-level metadata
#[derive(Debug, Clone)]
pub struct Channel {
    pub title: String,
    pub link: String,
    pub self_link: String,
    pub description: String,
    pub language: String,
    pub last_build: DateTime<Utc>,
}

/// A single rendered feed item
#[derive(Debug, Clone)]
pub struct Item {
    pub title: String,
    pub link: String,
    pub published_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub summary: Option<String>,
    pub categories: Vec<String>,
    pub content: String,
}

impl Item {
    /// Latest of the update and publish times
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.published_at)
    }
}

pub fn render(channel: &Channel, items: &[Item]) -> String {
    let mut feed = String::new();
    feed.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    feed.push('\n');
    feed.push_str(
        r#"<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom" xmlns:content="http://purl.org/rss/1.0/modules/content/">"#,
    );
    feed.push('\n');
    feed.push_str("  <channel>\n");
    feed.push_str(&format!("    <title>{}</title>\n", escape_xml(&channel.title)));
    feed.push_str(&format!("    <link>{}</link>\n", escape_xml(&channel.link)));
    feed.push_str(&format!(
        "    <atom:link href=\"{}\" rel=\"self\" type=\"application/rss+xml\"/>\n",
        escape_xml(&channel.self_link)
    ));
    feed.push_str(&format!(
        "    <description>{}</description>\n",
        escape_xml(&channel.description)
    ));
    feed.push_str(&format!("    <language>{}</language>\n", escape_xml(&channel.language)));
    feed.push_str(&format!(
        "    <lastBuildDate>{}</lastBuildDate>\n",
        format_rfc822(&channel.last_build)
    ));

    for item in items {
        feed.push_str("    <item>\n");
        feed.push_str(&format!("      <title>{}</title>\n", escape_xml(&item.title)));
        feed.push_str(&format!("      <link>{}</link>\n", escape_xml(&item.link)));
        feed.push_str(&format!(
            "      <guid isPermaLink=\"true\">{}</guid>\n",
            escape_xml(&item.link)
        ));
        feed.push_str(&format!(
            "      <pubDate>{}</pubDate>\n",
            format_rfc822(&item.published_at)
        ));
        for category in &item.categories {
            feed.push_str(&format!("      <category>{}</category>\n", escape_xml(category)));
        }
        if let Some(summary) = &item.summary {
            feed.push_str(&format!(
                "      <description>{}</description>\n",
                wrap_cdata(summary)
            ));
        }
        feed.push_str(&format!(
            "      <content:encoded>{}</content:encoded>\n",
            wrap_cdata(&item.content)
        ));
        feed.push_str("    </item>\n");
    }

    feed.push_str("  </channel>\n");
    feed.push_str("</rss>\n");
    feed
}

/// RFC 822 date in GMT, as RSS readers expect
pub fn format_rfc822(date: &DateTime<Utc>) -> String {
    date.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    strip_invalid_xml_chars(s)
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Wrap text in CDATA, splitting any `]]>` it contains
fn wrap_cdata(s: &str) -> String {
    format!(
        "<![CDATA[{}]]>",
        strip_invalid_xml_chars(s).replace("]]>", "]]]]><![CDATA[>")
    )
}

/// Strip characters XML 1.0 does not allow
/// (#x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF])
fn strip_invalid_xml_chars(s: &str) -> String {
    s.chars()
        .filter(|&c| {
            c == '\t'
                || c == '\n'
                || c == '\r'
                || ('\u{0020}'..='\u{D7FF}').contains(&c)
                || ('\u{E000}'..='\u{FFFD}').contains(&c)
                || ('\u{10000}'..='\u{10FFFF}').contains(&c)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use quick_xml::events::Event;
    use quick_xml::Reader;

    fn channel() -> Channel {
        Channel {
            title: "Tom & Jerry's <Blog>".to_string(),
            link: "https://example.com".to_string(),
            self_link: "https://example.com/rss.xml".to_string(),
            description: "Notes".to_string(),
            language: "en-us".to_string(),
            last_build: Utc.with_ymd_and_hms(2024, 3, 5, 8, 9, 10).unwrap(),
        }
    }

    fn item(content: &str) -> Item {
        Item {
            title: "A \"quoted\" title".to_string(),
            link: "https://example.com/blog/a?x=1&y=2".to_string(),
            published_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            updated_at: None,
            summary: Some("Short".to_string()),
            categories: vec!["rust".to_string(), "c&c".to_string()],
            content: content.to_string(),
        }
    }

    /// Parse the document with quick-xml, collecting the text of every CDATA section
    fn parse(xml: &str) -> Vec<String> {
        let mut reader = Reader::from_str(xml);
        let mut cdata = Vec::new();
        loop {
            match reader.read_event() {
                Ok(Event::Eof) => break,
                Ok(Event::CData(c)) => cdata.push(String::from_utf8(c.into_inner().into_owned()).unwrap()),
                Ok(_) => {}
                Err(e) => panic!("invalid XML at {}: {}", reader.buffer_position(), e),
            }
        }
        cdata
    }

    #[test]
    fn test_rfc822() {
        let date = Utc.with_ymd_and_hms(2024, 3, 5, 8, 9, 10).unwrap();
        assert_eq!(format_rfc822(&date), "Tue, 05 Mar 2024 08:09:10 GMT");
    }

    #[test]
    fn test_feed_is_well_formed() {
        let xml = render(&channel(), &[item("<p>Hello <b>world</b></p>")]);
        parse(&xml);

        assert!(xml.contains("<title>Tom &amp; Jerry&apos;s &lt;Blog&gt;</title>"));
        assert!(xml.contains(r#"<atom:link href="https://example.com/rss.xml" rel="self""#));
        assert!(xml.contains("<guid isPermaLink=\"true\">https://example.com/blog/a?x=1&amp;y=2</guid>"));
        assert!(xml.contains("<pubDate>Mon, 01 Jan 2024 00:00:00 GMT</pubDate>"));
        assert!(xml.contains("<lastBuildDate>Tue, 05 Mar 2024 08:09:10 GMT</lastBuildDate>"));
        assert!(xml.contains("<category>c&amp;c</category>"));
        assert!(xml.contains("<description><![CDATA[Short]]></description>"));
    }

    #[test]
    fn test_cdata_terminator_is_split() {
        let xml = render(&channel(), &[item("<pre>a]]>b</pre>")]);
        let cdata = parse(&xml);
        assert!(xml.contains("a]]]]><![CDATA[>b"));
        assert_eq!(cdata.concat(), "Short<pre>a]]>b</pre>");
    }

    #[test]
    fn test_invalid_chars_stripped() {
        let xml = render(&channel(), &[item("bell\u{7}here\u{0}")]);
        parse(&xml);
        assert!(xml.contains("<![CDATA[bellhere]]>"));
    }

    #[test]
    fn test_empty_channel() {
        let xml = render(&channel(), &[]);
        parse(&xml);
        assert!(!xml.contains("<item>"));
    }
}
