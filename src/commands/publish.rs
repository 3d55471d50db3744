//! Publish selected drafts

use anyhow::{bail, Result};
use std::path::PathBuf;

use crate::content::Entry;
use crate::output::Output;
use crate::prompt::Prompt;
use crate::publish::{commit_message, BatchReport, Git, PublishOutcome, Publisher};
use crate::Site;

/// Ask which drafts to publish, publish them, then commit (and push) the result
pub fn run(site: &Site, push: bool) -> Result<()> {
    let out = Output::new();
    let store = site.store();

    if !store.drafts_root().is_dir() {
        out.info(&format!("No drafts directory at {}", store.drafts_root().display()));
        return Ok(());
    }

    let drafts: Vec<Entry> = store.list_drafts()?.collect();
    if drafts.is_empty() {
        out.info("No drafts to publish.");
        return Ok(());
    }

    let choices: Vec<String> = drafts
        .iter()
        .map(|d| match d.title() {
            title if title.is_empty() => d.slug.clone(),
            title => format!("{} ({})", title, d.slug),
        })
        .collect();
    let selected = Prompt::stdio().multi_select("Drafts:", &choices)?;
    let selected: Vec<Entry> = selected.into_iter().map(|i| drafts[i].clone()).collect();

    publish_entries(site, &selected, push)
}

/// Publish the given drafts in order, then commit (and push) what was published
///
/// Fails when any draft was skipped or failed, or when version control failed.
/// Published posts stay published either way.
pub fn publish_entries(site: &Site, entries: &[Entry], push: bool) -> Result<()> {
    let out = Output::new();
    let store = site.store();

    let report = Publisher::new(&store).publish_batch(entries);
    print_report(&out, &report);

    let mut git_failed = false;
    if report.published_count() > 0 && site.config.git.enabled {
        if let Err(e) = commit(site, &report, push, &out) {
            out.error(&format!("Version control: {}", e));
            git_failed = true;
        }
    }

    if report.error_count() > 0 {
        bail!("{} of {} draft(s) were not published", report.error_count(), report.outcomes.len());
    }
    if git_failed {
        bail!("Published, but committing the changes failed");
    }
    Ok(())
}

fn print_report(out: &Output, report: &BatchReport) {
    for outcome in &report.outcomes {
        match outcome {
            PublishOutcome::Published(p) => {
                let verb = if p.updated_at.is_some() { "Republished" } else { "Published" };
                out.success(&format!("{} \"{}\" -> {}", verb, p.title, p.target.display()));
                if let Some(warning) = &p.warning {
                    out.warning(warning);
                }
            }
            PublishOutcome::Skipped { slug, reason } => {
                out.warning(&format!("Skipped {}: {}", slug, reason));
            }
            PublishOutcome::Failed { slug, error } => {
                out.error(&format!("Failed {}: {}", slug, error));
            }
        }
    }

    out.summary(&format!(
        "{} published, {} skipped, {} failed",
        report.published_count(),
        report.skipped_count(),
        report.failed_count()
    ));
}

/// Stage published targets and retired drafts, commit, optionally push
fn commit(site: &Site, report: &BatchReport, push: bool, out: &Output) -> Result<()> {
    let git = Git::new(&site.base_dir);
    if !git.is_repository() {
        out.warning(&format!(
            "{} is not a git repository, skipping commit",
            site.base_dir.display()
        ));
        return Ok(());
    }

    let mut paths: Vec<PathBuf> = Vec::new();
    let mut titles = Vec::new();
    for published in report.published() {
        paths.push(published.target.clone());
        if git.is_tracked(&published.source)? {
            paths.push(published.source.clone());
        }
        titles.push(published.title.clone());
    }

    git.stage(&paths)?;
    let message = commit_message(&titles);
    git.commit(&message)?;
    out.success(&format!("Committed: {}", message));

    if push {
        git.push(&site.config.git.remote)?;
        out.success(&format!("Pushed to {}", site.config.git.remote));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Layout, SiteConfig};
    use crate::content::store::tests::write_post;
    use crate::content::{ContentStore, Location};
    use pretty_assertions::assert_eq;
    use std::path::Path;
    use std::process::Command;
    use tempfile::TempDir;

    fn git(dir: &Path, args: &[&str]) -> String {
        let output = Command::new("git").current_dir(dir).args(args).output().unwrap();
        assert!(
            output.status.success(),
            "git {:?}: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).unwrap()
    }

    fn init_repo(dir: &Path) {
        git(dir, &["init", "-q"]);
        git(dir, &["config", "user.email", "author@example.com"]);
        git(dir, &["config", "user.name", "Author"]);
        git(dir, &["config", "commit.gpgsign", "false"]);
    }

    fn site(dir: &Path) -> Site {
        let config = SiteConfig {
            layout: Layout::Flat,
            ..SiteConfig::default()
        };
        Site::with_config(dir.to_path_buf(), config)
    }

    fn add_draft(store: &ContentStore, slug: &str, title: &str) {
        write_post(
            &store.draft_dir(slug),
            &format!("---\ntitle: {}\nsummary: About {}\n---\n\nBody\n", title, title),
        );
    }

    fn drafts(store: &ContentStore) -> Vec<Entry> {
        store.list_drafts().unwrap().collect()
    }

    #[test]
    fn test_commit_stages_target_and_retired_draft() {
        let tmp = TempDir::new().unwrap();
        init_repo(tmp.path());
        let site = site(tmp.path());
        let store = site.store();
        add_draft(&store, "hello", "Hello");
        git(tmp.path(), &["add", "--all"]);
        git(tmp.path(), &["commit", "-q", "-m", "Add draft"]);

        publish_entries(&site, &drafts(&store), false).unwrap();

        assert!(store.exists("hello", Location::Published));
        assert_eq!(git(tmp.path(), &["log", "-1", "--format=%s"]).trim(), "Publish \"Hello\"");
        assert_eq!(git(tmp.path(), &["status", "--porcelain"]), "");
    }

    #[test]
    fn test_commit_message_for_several_posts() {
        let tmp = TempDir::new().unwrap();
        init_repo(tmp.path());
        let site = site(tmp.path());
        let store = site.store();
        add_draft(&store, "a-first", "First");
        add_draft(&store, "b-second", "Second");

        publish_entries(&site, &drafts(&store), false).unwrap();

        assert_eq!(
            git(tmp.path(), &["log", "-1", "--format=%s"]).trim(),
            "Publish 2 posts: \"First\", \"Second\""
        );
        assert_eq!(git(tmp.path(), &["status", "--porcelain"]), "");
    }

    #[test]
    fn test_commit_through_relative_site_dir() {
        let tmp = TempDir::new_in(".").unwrap();
        assert!(tmp.path().is_relative());
        init_repo(tmp.path());
        let site = site(tmp.path());
        let store = site.store();
        add_draft(&store, "hello", "Hello");

        publish_entries(&site, &drafts(&store), false).unwrap();

        assert_eq!(git(tmp.path(), &["log", "-1", "--format=%s"]).trim(), "Publish \"Hello\"");
        let tracked = git(tmp.path(), &["ls-files"]);
        assert!(tracked.contains("src/content/blog/hello/index.mdx"), "{tracked}");
    }

    #[test]
    fn test_outside_repository_commit_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let site = site(tmp.path());
        let store = site.store();
        add_draft(&store, "hello", "Hello");

        publish_entries(&site, &drafts(&store), false).unwrap();
        assert!(store.exists("hello", Location::Published));
        assert!(!tmp.path().join(".git").exists());
    }

    #[test]
    fn test_git_failure_fails_without_rollback() {
        let tmp = TempDir::new().unwrap();
        init_repo(tmp.path());
        let site = site(tmp.path());
        let store = site.store();
        add_draft(&store, "hello", "Hello");

        // no remote named origin, so the push fails
        let err = publish_entries(&site, &drafts(&store), true).unwrap_err();
        assert!(err.to_string().contains("committing"), "{err}");

        assert!(store.exists("hello", Location::Published));
        assert!(!store.exists("hello", Location::Drafts));
        assert_eq!(git(tmp.path(), &["log", "-1", "--format=%s"]).trim(), "Publish \"Hello\"");
    }

    #[test]
    fn test_skipped_draft_fails_the_run() {
        let tmp = TempDir::new().unwrap();
        let mut site = site(tmp.path());
        site.config.git.enabled = false;
        let store = site.store();
        add_draft(&store, "good", "Good");
        write_post(&store.draft_dir("no-summary"), "---\ntitle: No Summary\n---\n");

        let err = publish_entries(&site, &drafts(&store), false).unwrap_err();
        assert!(err.to_string().contains("1 of 2"), "{err}");
        assert!(store.exists("good", Location::Published));
        assert!(store.exists("no-summary", Location::Drafts));
    }
}
