//! Configuration file management for safegen.
//!
//! Provides a TOML-based config file at `~/.config/safegen/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use safegen_core::catalog::Catalog;
use safegen_core::oracle::PlannerConfig;
use safegen_core::pddl::MANIPULATION_DOMAIN;

/// Overrides the planner executable.
pub const ENV_PLANNER: &str = "SAFEGEN_PLANNER";
/// Overrides the per-call planner timeout, in seconds.
pub const ENV_PLANNER_TIMEOUT: &str = "SAFEGEN_PLANNER_TIMEOUT";
/// Overrides the artifact directory.
pub const ENV_OUTPUT_DIR: &str = "SAFEGEN_OUTPUT_DIR";

/// Artifact directory used when nothing else is configured.
pub const DEFAULT_OUTPUT_DIR: &str = "tmp";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub planner: PlannerConfig,
    #[serde(default)]
    pub generation: GenerationSection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    /// Candidates to try per problem before giving up. Unset retries forever.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
    /// Catalog TOML to use instead of the built-in one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<PathBuf>,
    /// Domain PDDL to hand the planner instead of the built-in one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<PathBuf>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the safegen config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/safegen` or `~/.config/safegen`,
/// never the platform-specific `dirs::config_dir()`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("safegen");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("safegen")
}

/// Return the path to the safegen config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse a config file. Returns an error if it does not exist.
pub fn load_config_from(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(config)
}

/// Load the config file if one exists at the default path.
///
/// A missing file is not an error; a malformed one is.
pub fn load_config() -> Result<Option<ConfigFile>> {
    let path = config_path();
    if !path.exists() {
        return Ok(None);
    }
    load_config_from(&path).map(Some)
}

/// Serialize and write the config file, creating parent dirs as needed.
pub fn save_config_to(config: &ConfigFile, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    }

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Values given on the command line. `None` defers to the rest of the chain.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub planner: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub max_attempts: Option<u32>,
}

/// Fully resolved configuration, ready for use.
#[derive(Debug, Clone)]
pub struct SafegenConfig {
    pub planner: PlannerConfig,
    pub output_dir: PathBuf,
    pub max_attempts: Option<u32>,
    pub catalog: Catalog,
    /// Domain text handed to the planner.
    pub domain: String,
}

impl SafegenConfig {
    /// Resolve configuration from the default config file location.
    pub fn resolve(cli: &CliOverrides) -> Result<Self> {
        let file = load_config()?;
        Self::resolve_with(file, cli)
    }

    /// Resolve using the chain: CLI flag > env var > config file > default.
    ///
    /// - Planner command: `cli.planner` > `SAFEGEN_PLANNER` > `[planner] command`
    /// - Planner timeout: `SAFEGEN_PLANNER_TIMEOUT` > `[planner] timeout_secs`
    /// - Output dir: `cli.output_dir` > `SAFEGEN_OUTPUT_DIR` > `[generation] output_dir` > `tmp`
    /// - Attempt budget: `cli.max_attempts` > `[generation] max_attempts` > unbounded
    pub fn resolve_with(file: Option<ConfigFile>, cli: &CliOverrides) -> Result<Self> {
        let ConfigFile {
            mut planner,
            generation,
        } = file.unwrap_or_default();

        if let Some(command) = &cli.planner {
            planner.command = command.clone();
        } else if let Ok(command) = std::env::var(ENV_PLANNER) {
            planner.command = command;
        }

        if let Ok(secs) = std::env::var(ENV_PLANNER_TIMEOUT) {
            planner.timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("{ENV_PLANNER_TIMEOUT} is not a number of seconds: {secs:?}"))?;
        }

        let output_dir = if let Some(dir) = &cli.output_dir {
            dir.clone()
        } else if let Ok(dir) = std::env::var(ENV_OUTPUT_DIR) {
            PathBuf::from(dir)
        } else if let Some(dir) = generation.output_dir {
            dir
        } else {
            PathBuf::from(DEFAULT_OUTPUT_DIR)
        };

        let max_attempts = cli.max_attempts.or(generation.max_attempts);

        let catalog = match &generation.catalog {
            Some(path) => Catalog::load(path)
                .with_context(|| format!("failed to load catalog from {}", path.display()))?,
            None => Catalog::builtin(),
        };

        let domain = match &generation.domain {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read domain file {}", path.display()))?,
            None => MANIPULATION_DOMAIN.to_string(),
        };

        Ok(Self {
            planner,
            output_dir,
            max_attempts,
            catalog,
            domain,
        })
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
