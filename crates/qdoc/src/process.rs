//! Per-file documentation generation.

use std::fs;
use std::path::{Path, PathBuf};

use qdoc_core::RenderOptions;

use crate::error::CliError;

/// Result of processing one input file.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// Markdown was written.
    Written {
        output: PathBuf,
        sections: usize,
        bytes: usize,
    },
    /// The file produced no documentation; nothing was written.
    SkippedEmpty,
    /// The output path would overwrite the input.
    SkippedSameFile,
}

/// Render `input` and write the Markdown to `output`.
///
/// Input bytes are decoded lossily, so invalid UTF-8 never fails a file.
/// Missing parent directories of `output` are created.
///
/// # Errors
///
/// Returns error if the input cannot be read or the output cannot be written.
pub(crate) fn process_file(
    input: &Path,
    output: &Path,
    options: &RenderOptions,
) -> Result<Outcome, CliError> {
    if is_same_file(input, output) {
        return Ok(Outcome::SkippedSameFile);
    }

    let bytes = fs::read(input).map_err(|source| CliError::Read {
        path: input.to_path_buf(),
        source,
    })?;
    let source = String::from_utf8_lossy(&bytes);
    let rendered = qdoc_core::render_source(&source, options);

    if rendered.is_blank() {
        return Ok(Outcome::SkippedEmpty);
    }

    let write_err = |source| CliError::Write {
        path: output.to_path_buf(),
        source,
    };
    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(output, &rendered.markdown).map_err(write_err)?;

    Ok(Outcome::Written {
        output: output.to_path_buf(),
        sections: rendered.section_count,
        bytes: rendered.markdown.len(),
    })
}

fn is_same_file(input: &Path, output: &Path) -> bool {
    if input == output {
        return true;
    }
    match (fs::canonicalize(input), fs::canonicalize(output)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Running totals over a batch of files.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Summary {
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl Summary {
    pub(crate) fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Written { .. } => self.written += 1,
            Outcome::SkippedEmpty | Outcome::SkippedSameFile => self.skipped += 1,
        }
    }

    pub(crate) fn record_failure(&mut self) {
        self.failed += 1;
    }

    pub(crate) fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} written, {} skipped, {} failed",
            self.written, self.skipped, self.failed
        )
    }
}
