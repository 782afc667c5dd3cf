//! Rule configuration for smellcheck.
//!
//! A config file chooses which rules run, in what order, and tunes their
//! thresholds. Every field is optional; an empty file means the built-in
//! defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::detect::{BUILTIN_RULES, DEFAULT_ALLOWED_VALUES, DEFAULT_MAX_STATEMENTS};

/// Default config file names to search for.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["smellcheck.yaml", ".smellcheck.yaml"];

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub version: String,
    /// Rule ids to run, in registration order (default: all built-in rules)
    #[serde(default)]
    pub rules: Option<Vec<String>>,
    #[serde(default)]
    pub long_function: Option<LongFunctionConfig>,
    #[serde(default)]
    pub magic_number: Option<MagicNumberConfig>,
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse a config from YAML text. Blank text yields the defaults.
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Rule ids in the order they should run.
    pub fn rule_ids(&self) -> Vec<String> {
        match &self.rules {
            Some(ids) => ids.clone(),
            None => BUILTIN_RULES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Statement threshold for long functions (defaults to 20).
    pub fn max_statements(&self) -> usize {
        self.long_function
            .as_ref()
            .and_then(|c| c.max_statements)
            .unwrap_or(DEFAULT_MAX_STATEMENTS)
    }

    /// Numeric values that are never magic (defaults to 0, 1, -1).
    pub fn allowed_values(&self) -> Vec<f64> {
        self.magic_number
            .as_ref()
            .and_then(|c| c.allowed_values.clone())
            .unwrap_or_else(|| DEFAULT_ALLOWED_VALUES.to_vec())
    }

    /// Whether a module-level `NAME = literal` exempts the literal (defaults to true).
    pub fn allow_assignments(&self) -> bool {
        self.magic_number
            .as_ref()
            .and_then(|c| c.allow_assignments)
            .unwrap_or(true)
    }
}

/// Settings for the `long-function` rule.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct LongFunctionConfig {
    #[serde(default)]
    pub max_statements: Option<usize>,
}

/// Settings for the `magic-number` rule.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct MagicNumberConfig {
    #[serde(default)]
    pub allowed_values: Option<Vec<f64>>,
    #[serde(default)]
    pub allow_assignments: Option<bool>,
}

/// Find a config file in `dir`.
pub fn discover(dir: &Path) -> Option<PathBuf> {
    DEFAULT_CONFIG_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Load the config at `path`, or discover one in the current directory,
/// or fall back to defaults.
pub fn load(path: Option<&Path>) -> anyhow::Result<Config> {
    let found = match path {
        Some(p) => Some(p.to_path_buf()),
        None => discover(Path::new(".")),
    };

    let config = match found {
        Some(p) => {
            tracing::debug!(path = %p.display(), "loading config");
            Config::parse_file(&p)
                .map_err(|e| anyhow::anyhow!("failed to parse {}: {}", p.display(), e))?
        }
        None => Config::default(),
    };

    validate(&config)?;
    Ok(config)
}

/// Validate a config for correctness.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    let ids = config.rule_ids();
    for (i, id) in ids.iter().enumerate() {
        if !BUILTIN_RULES.contains(&id.as_str()) {
            anyhow::bail!(
                "unknown rule {:?}, expected one of: {}",
                id,
                BUILTIN_RULES.join(", ")
            );
        }
        if ids[..i].contains(id) {
            anyhow::bail!("rule {:?} listed more than once", id);
        }
    }

    if config.max_statements() == 0 {
        anyhow::bail!("long_function.max_statements must be at least 1");
    }

    if config.allowed_values().iter().any(|v| !v.is_finite()) {
        anyhow::bail!("magic_number.allowed_values must be finite numbers");
    }

    Ok(())
}
