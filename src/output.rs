//! User-facing outcome lines on stderr

use console::{Style, Term};

/// Prints colored, marker-prefixed outcome lines
pub struct Output {
    term: Term,
    green: Style,
    yellow: Style,
    red: Style,
    bold: Style,
}

impl Output {
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
            bold: Style::new().bold(),
        }
    }

    pub fn info(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    /// ✅ in green
    pub fn success(&self, msg: &str) {
        self.marked("✅", &self.green, msg);
    }

    /// ⚠️ in yellow
    pub fn warning(&self, msg: &str) {
        self.marked("⚠️ ", &self.yellow, msg);
    }

    /// ❌ in red
    pub fn error(&self, msg: &str) {
        self.marked("❌", &self.red, msg);
    }

    /// 📊 aggregate counts at the end of a run
    pub fn summary(&self, msg: &str) {
        let _ = self.term.write_line("");
        self.marked("📊", &self.bold, msg);
    }

    fn marked(&self, marker: &str, style: &Style, msg: &str) {
        let _ = self
            .term
            .write_line(&format!("{} {}", marker, style.apply_to(msg)));
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
