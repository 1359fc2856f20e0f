//! Input selection and output path derivation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use qdoc_config::OutputConfig;

use crate::error::CliError;

/// Files matched by a set of glob patterns.
#[derive(Debug, Default)]
pub(crate) struct Expansion {
    /// Matched regular files, in pattern order, without duplicates.
    pub files: Vec<PathBuf>,
    /// Patterns that failed to parse.
    pub errors: Vec<CliError>,
}

/// Expand glob patterns into input files.
///
/// An invalid pattern is recorded and skipped; the remaining patterns are
/// still expanded. Directories and unreadable entries are ignored.
pub(crate) fn expand_patterns(patterns: &[String]) -> Expansion {
    let mut expansion = Expansion::default();
    let mut seen = HashSet::new();

    for pattern in patterns {
        let paths = match glob::glob(pattern) {
            Ok(paths) => paths,
            Err(source) => {
                expansion.errors.push(CliError::Pattern {
                    pattern: pattern.clone(),
                    source,
                });
                continue;
            }
        };
        for entry in paths {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    tracing::warn!(path = %e.path().display(), error = %e.error(), "Skipping unreadable path");
                    continue;
                }
            };
            if !path.is_file() {
                tracing::debug!(path = %path.display(), "Skipping non-file match");
                continue;
            }
            if seen.insert(path.clone()) {
                expansion.files.push(path);
            }
        }
    }

    expansion
}

/// How output paths are derived from input paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum OutputNaming {
    /// `dir/name.lua` → `dir/name<ext>`
    Beside { ext: String },
    /// `dir/name.lua` → `dir/<base><ext>`
    Base { base: String, ext: String },
    /// `any/name.lua` → `<dir>/name<ext>`
    Directory { dir: PathBuf, ext: String },
}

impl OutputNaming {
    /// Choose a naming scheme. An output directory takes precedence over a base name.
    pub(crate) fn new(config: &OutputConfig) -> Self {
        let ext = config.ext.clone();
        match (&config.dir, &config.base) {
            (Some(dir), _) => Self::Directory {
                dir: dir.clone(),
                ext,
            },
            (None, Some(base)) => Self::Base {
                base: base.clone(),
                ext,
            },
            (None, None) => Self::Beside { ext },
        }
    }

    /// Output path for one input file.
    pub(crate) fn output_path(&self, input: &Path) -> PathBuf {
        match self {
            Self::Beside { ext } => replace_ext(input, ext),
            Self::Base { base, ext } => {
                let dir = input.parent().unwrap_or(Path::new(""));
                replace_ext(&dir.join(base), ext)
            }
            Self::Directory { dir, ext } => match input.file_name() {
                Some(name) => dir.join(replace_ext(Path::new(name), ext)),
                None => dir.join(replace_ext(input, ext)),
            },
        }
    }
}

/// Replace everything from the last `.` of the file name with `ext`.
///
/// A file name without a dot gets `ext` appended. A leading dot counts, so
/// `.lua` becomes `.md`.
fn replace_ext(path: &Path, ext: &str) -> PathBuf {
    let Some(name) = path.file_name() else {
        let mut owned = path.as_os_str().to_owned();
        owned.push(ext);
        return PathBuf::from(owned);
    };
    let mut replaced = match name.to_str() {
        Some(name) => name.rfind('.').map_or(name, |dot| &name[..dot]).into(),
        None => path.file_stem().unwrap_or(name).to_owned(),
    };
    replaced.push(ext);
    path.with_file_name(replaced)
}
