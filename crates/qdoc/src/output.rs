//! Progress reporting on stderr.

use std::path::Path;

use console::{Style, Term};

use crate::error::CliError;
use crate::process::{Outcome, Summary};

/// Styled per-file progress and failure lines.
pub(crate) struct Output {
    term: Term,
    written: Style,
    skipped: Style,
    failed: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            written: Style::new().green(),
            skipped: Style::new().yellow(),
            failed: Style::new().red(),
        }
    }

    /// Report what happened to one input file.
    ///
    /// Files without documentation are only logged.
    pub(crate) fn outcome(&self, input: &Path, outcome: &Outcome) {
        match outcome {
            Outcome::Written {
                output,
                sections,
                bytes,
            } => {
                tracing::info!(input = %input.display(), output = %output.display(), sections, bytes, "Wrote documentation");
                self.line(
                    &self.written,
                    &format!("{} -> {}", input.display(), output.display()),
                );
            }
            Outcome::SkippedEmpty => {
                tracing::debug!(input = %input.display(), "No documentation found");
            }
            Outcome::SkippedSameFile => self.line(
                &self.skipped,
                &format!("Skipping {}: output would overwrite input", input.display()),
            ),
        }
    }

    /// Report a failure that did not stop the run.
    pub(crate) fn failure(&self, err: &CliError) {
        self.line(&self.failed, &format!("Error: {err}"));
    }

    pub(crate) fn warning(&self, msg: &str) {
        self.line(&self.skipped, &format!("Warning: {msg}"));
    }

    /// Final counts, red when anything failed.
    pub(crate) fn summary(&self, summary: &Summary) {
        let text = summary.to_string();
        if summary.has_failures() {
            self.line(&self.failed, &text);
        } else {
            let _ = self.term.write_line(&text);
        }
    }

    fn line(&self, style: &Style, text: &str) {
        let _ = self.term.write_line(&style.apply_to(text).to_string());
    }
}
