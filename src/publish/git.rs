//! Version control after publishing

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{ContentError, Result};

/// Runs git in a working tree
pub struct Git {
    repo_dir: PathBuf,
}

impl Git {
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
        }
    }

    /// Whether `repo_dir` is inside a git working tree
    pub fn is_repository(&self) -> bool {
        self.run(["rev-parse", "--is-inside-work-tree"])
            .map(|out| out.trim() == "true")
            .unwrap_or(false)
    }

    /// Whether git tracks anything under `path`
    pub fn is_tracked(&self, path: &Path) -> Result<bool> {
        let out = self.run([
            OsStr::new("ls-files"),
            OsStr::new("--"),
            self.relative(path).as_os_str(),
        ])?;
        Ok(!out.trim().is_empty())
    }

    /// Stage additions and deletions under the given paths
    pub fn stage(&self, paths: &[PathBuf]) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }
        let mut args = vec![OsStr::new("add"), OsStr::new("--all"), OsStr::new("--")];
        args.extend(paths.iter().map(|p| self.relative(p).as_os_str()));
        self.run(args).map(|_| ())
    }

    pub fn commit(&self, message: &str) -> Result<()> {
        self.run(["commit", "-m", message]).map(|_| ())
    }

    pub fn push(&self, remote: &str) -> Result<()> {
        self.run(["push", remote, "HEAD"]).map(|_| ())
    }

    /// Paths under `repo_dir` as seen from inside it; git runs there
    fn relative<'p>(&self, path: &'p Path) -> &'p Path {
        match path.strip_prefix(&self.repo_dir) {
            Ok(rest) if rest.as_os_str().is_empty() => Path::new("."),
            Ok(rest) => rest,
            Err(_) => path,
        }
    }

    fn run<I, S>(&self, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<S> = args.into_iter().collect();
        let command = std::iter::once("git".to_string())
            .chain(args.iter().map(|a| a.as_ref().to_string_lossy().into_owned()))
            .collect::<Vec<_>>()
            .join(" ");
        tracing::debug!("Running {}", command);

        let output = Command::new("git")
            .current_dir(&self.repo_dir)
            .args(&args)
            .output()
            .map_err(|e| ContentError::ExternalTool {
                command: command.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ContentError::ExternalTool {
                command,
                message: match output.status.code() {
                    Some(code) => format!("exit code {}: {}", code, stderr),
                    None => format!("terminated by signal: {}", stderr),
                },
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Commit message for a batch of published titles
pub fn commit_message(titles: &[String]) -> String {
    match titles {
        [] => "Publish posts".to_string(),
        [title] => format!("Publish \"{}\"", title),
        titles => {
            let quoted: Vec<String> = titles.iter().map(|t| format!("\"{}\"", t)).collect();
            format!("Publish {} posts: {}", titles.len(), quoted.join(", "))
        }
    }
}
