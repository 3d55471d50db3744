//! Interactive prompts
//!
//! Reading and writing are generic so the prompts can be driven from tests.

use anyhow::{bail, Result};
use std::collections::BTreeSet;
use std::io::{self, BufRead, Write};

pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl Prompt<io::StdinLock<'static>, io::Stdout> {
    /// Prompt on the terminal
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// One trimmed line, or `None` once input is closed
    pub fn ask(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{}: ", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Ask until a non-empty answer is given
    pub fn required(&mut self, label: &str) -> Result<String> {
        loop {
            match self.ask(label)? {
                None => bail!("Input closed before {} was given", label.to_lowercase()),
                Some(answer) if answer.is_empty() => {
                    writeln!(self.output, "{} is required.", label)?;
                }
                Some(answer) => return Ok(answer),
            }
        }
    }

    /// Empty answers become `None`
    pub fn optional(&mut self, label: &str) -> Result<Option<String>> {
        Ok(self.ask(label)?.filter(|answer| !answer.is_empty()))
    }

    /// Numbered list; returns the chosen indices in list order
    pub fn multi_select(&mut self, label: &str, choices: &[String]) -> Result<Vec<usize>> {
        writeln!(self.output, "{}", label)?;
        for (i, choice) in choices.iter().enumerate() {
            writeln!(self.output, "  {:>2}) {}", i + 1, choice)?;
        }

        loop {
            let Some(answer) = self.ask("Select (e.g. 1,3-4 or all)")? else {
                bail!("Input closed before a selection was made");
            };
            match parse_selection(&answer, choices.len()) {
                Ok(selected) => return Ok(selected),
                Err(e) => writeln!(self.output, "{}", e)?,
            }
        }
    }
}

/// Parse `1,3-4` or `all` into sorted zero-based indices
pub fn parse_selection(input: &str, len: usize) -> Result<Vec<usize>> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("all") || input == "*" {
        if len == 0 {
            bail!("Nothing to select");
        }
        return Ok((0..len).collect());
    }

    let mut selected = BTreeSet::new();
    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (start, end) = match part.split_once('-') {
            Some((a, b)) => (parse_index(a, len)?, parse_index(b, len)?),
            None => {
                let i = parse_index(part, len)?;
                (i, i)
            }
        };
        if start > end {
            bail!("Invalid range: {}", part);
        }
        selected.extend(start..=end);
    }

    if selected.is_empty() {
        bail!("Select at least one entry");
    }
    Ok(selected.into_iter().collect())
}

fn parse_index(s: &str, len: usize) -> Result<usize> {
    match s.trim().parse::<usize>() {
        Ok(n) if (1..=len).contains(&n) => Ok(n - 1),
        _ => bail!("Not a number between 1 and {}: {}", len, s.trim()),
    }
}

/// Comma-separated tags, trimmed, empties and duplicates dropped
pub fn parse_tags(input: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}
