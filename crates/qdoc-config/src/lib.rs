//! Configuration management for qdoc.
//!
//! Parses `qdoc.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ```toml
//! [input]
//! patterns = ["src/**/*.lua"]
//!
//! [output]
//! dir = "${DOCS_DIR:-docs/api}"
//! ext = ".md"
//!
//! [render]
//! toc = true
//! ```
//!
//! `output.dir` supports environment variable expansion: `${VAR}` errors if
//! VAR is unset, `${VAR:-default}` falls back to the default.

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// Only non-None (and non-empty) values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override input glob patterns.
    pub patterns: Vec<String>,
    /// Override output directory.
    pub output_dir: Option<PathBuf>,
    /// Override output base name.
    pub base: Option<String>,
    /// Override output extension.
    pub ext: Option<String>,
    /// Override table of contents flag.
    pub toc: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "qdoc.toml";

/// Inputs matched when nothing else is configured.
const DEFAULT_PATTERN: &str = "*.lua";

/// Extension given to output files by default.
const DEFAULT_EXT: &str = ".md";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input file selection.
    pub input: InputConfig,
    /// Output naming (raw strings from TOML).
    output: OutputConfigRaw,
    /// Rendering options.
    pub render: RenderConfig,

    /// Resolved output configuration (set after loading).
    #[serde(skip)]
    pub output_resolved: OutputConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Input file selection.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Glob patterns selecting source files.
    pub patterns: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            patterns: vec![DEFAULT_PATTERN.to_owned()],
        }
    }
}

/// Raw output configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OutputConfigRaw {
    dir: Option<String>,
    base: Option<String>,
    ext: Option<String>,
}

/// Resolved output naming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Directory receiving all outputs. `None` writes next to each input.
    pub dir: Option<PathBuf>,
    /// Base name replacing the input file stem (only without `dir`).
    pub base: Option<String>,
    /// Extension replacing the input extension, including the dot.
    pub ext: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: None,
            base: None,
            ext: DEFAULT_EXT.to_owned(),
        }
    }
}

/// Rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Whether to emit a table of contents.
    pub toc: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { toc: true }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`output.dir`").
        field: String,
        /// Error message (e.g., "${`DOCS_DIR`} not set").
        message: String,
    },
}

/// Require a file name component to be usable on its own.
fn require_plain_name(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.chars().any(std::path::is_separator) {
        return Err(ConfigError::Validation(format!(
            "{field} cannot contain a path separator"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `qdoc.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, so CLI
    /// arguments take precedence over config file values. The result is
    /// validated last.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the final configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            tracing::debug!(path = %discovered.display(), "Discovered config file");
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if !settings.patterns.is_empty() {
            self.input.patterns.clone_from(&settings.patterns);
        }
        if let Some(dir) = &settings.output_dir {
            self.output_resolved.dir = Some(dir.clone());
        }
        if let Some(base) = &settings.base {
            self.output_resolved.base = Some(base.clone());
        }
        if let Some(ext) = &settings.ext {
            self.output_resolved.ext.clone_from(ext);
        }
        if let Some(toc) = settings.toc {
            self.render.toc = toc;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_input()?;
        self.validate_output()?;
        Ok(())
    }

    fn validate_input(&self) -> Result<(), ConfigError> {
        if self.input.patterns.is_empty() {
            return Err(ConfigError::Validation(
                "input.patterns cannot be empty".to_owned(),
            ));
        }
        if self.input.patterns.iter().any(String::is_empty) {
            return Err(ConfigError::Validation(
                "input.patterns cannot contain an empty pattern".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_output(&self) -> Result<(), ConfigError> {
        require_plain_name(&self.output_resolved.ext, "output.ext")?;
        if let Some(ref base) = self.output_resolved.base {
            if base.is_empty() {
                return Err(ConfigError::Validation(
                    "output.base cannot be empty".to_owned(),
                ));
            }
            require_plain_name(base, "output.base")?;
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref dir) = self.output.dir {
            self.output.dir = Some(expand::expand_env(dir, "output.dir")?);
        }
        Ok(())
    }

    /// Resolve relative paths against the config file directory.
    ///
    /// The directory prefix of a pattern is glob-escaped so that brackets or
    /// wildcards in the directory name match literally.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let pattern_root = glob::Pattern::escape(&config_dir.to_string_lossy());
        self.input.patterns = self
            .input
            .patterns
            .iter()
            .map(|pattern| {
                if Path::new(pattern).is_absolute() {
                    pattern.clone()
                } else {
                    Path::new(&pattern_root)
                        .join(pattern)
                        .to_string_lossy()
                        .into_owned()
                }
            })
            .collect();

        self.output_resolved = OutputConfig {
            dir: self.output.dir.as_deref().map(|d| config_dir.join(d)),
            base: self.output.base.clone(),
            ext: self
                .output
                .ext
                .clone()
                .unwrap_or_else(|| DEFAULT_EXT.to_owned()),
        };
    }
}
