//! List store contents

use anyhow::Result;
use std::collections::HashMap;

use crate::content::{Entry, Location};
use crate::Site;

/// List drafts, published posts or tags
pub fn run(site: &Site, content_type: &str) -> Result<()> {
    let store = site.store();

    match content_type {
        "draft" | "drafts" => {
            let drafts: Vec<Entry> = store.list(Location::Drafts)?.collect();
            println!("Drafts ({}):", drafts.len());
            for draft in drafts {
                let post = draft.post();
                let ready = if post.summary.is_some() { "" } else { " (no summary)" };
                println!("  {} [{}]{}", post.title, draft.slug, ready);
            }
        }
        "post" | "posts" | "published" => {
            let mut posts: Vec<_> = store.list(Location::Published)?.map(|e| e.post()).collect();
            posts.sort_by(|a, b| b.published_date().cmp(&a.published_date()));
            println!("Published ({}):", posts.len());
            for post in posts {
                let date = post
                    .published_date()
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "----------".to_string());
                println!("  {} - {} [{}]", date, post.title, post.slug);
            }
        }
        "tag" | "tags" => {
            let mut tags: HashMap<String, usize> = HashMap::new();
            for entry in store.list(Location::Published)? {
                for tag in entry.post().tags {
                    *tags.entry(tag).or_insert(0) += 1;
                }
            }
            println!("Tags ({}):", tags.len());
            let mut tags: Vec<_> = tags.into_iter().collect();
            tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            for (tag, count) in tags {
                println!("  {} ({})", tag, count);
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: drafts, published, tags",
                content_type
            );
        }
    }

    Ok(())
}
