use console::style;

use crate::export::{ExportReport, ExportedWiki, FailedWiki};

/// Styled terminal messages. Status lines go to stderr so stdout stays
/// clean for listings and JSON.
pub struct Output {
    quiet: bool,
}

impl Output {
    pub fn new() -> Self {
        Self { quiet: false }
    }

    pub fn quiet(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            eprintln!("{} {}", style("✓").green(), message);
        }
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        if !self.quiet {
            eprintln!("{} {}", style("⚠").yellow(), message);
        }
    }

    pub fn info(&self, message: &str) {
        if !self.quiet {
            eprintln!("{} {}", style("ℹ").blue(), message);
        }
    }

    pub fn header(&self, message: &str) {
        if !self.quiet {
            eprintln!("\n{}", style(message).bold().underlined());
        }
    }

    pub fn exported(&self, wiki: &ExportedWiki) {
        self.success(&format!(
            "{} {} ({} pages, {} ms)",
            style(&wiki.wiki).bold(),
            style(wiki.file.display()).dim(),
            wiki.pages,
            wiki.duration_ms
        ));
    }

    pub fn failed(&self, wiki: &FailedWiki) {
        self.error(&format!("{}: {}", style(&wiki.wiki).bold(), wiki.error));
    }

    /// Per-wiki lines followed by a one-line total
    pub fn report(&self, report: &ExportReport) {
        self.header("Export summary");
        for wiki in &report.exported {
            self.exported(wiki);
        }
        for wiki in &report.failed {
            self.failed(wiki);
        }

        let total = format!(
            "{} wikis, {} pages",
            report.exported.len(),
            report.total_pages()
        );
        if report.is_success() {
            self.success(&total);
        } else {
            self.warning(&format!("{} ({} failed)", total, report.failed.len()));
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
