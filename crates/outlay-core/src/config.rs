//! Application configuration
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path (`--config`), or the override file in the data dir
//!    (~/.local/share/outlay/config.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Missing keys take their default value. Environment variables
//! (`OUTLAY_LEDGER`, `OUTLAY_ADVISOR`) are applied on top by the caller.

use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::advisor::{DEFAULT_TEMPLATE, DEFAULT_TIMEOUT};
use crate::chart::Palette;
use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/outlay.toml");

/// Environment variable overriding the ledger path
pub const ENV_LEDGER: &str = "OUTLAY_LEDGER";
/// Environment variable overriding the advisor backend
pub const ENV_ADVISOR: &str = "OUTLAY_ADVISOR";

/// Which advisor implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvisorBackend {
    /// External program (ollama by default)
    Process,
    /// Canned responses
    Mock,
}

impl AdvisorBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Process => "process",
            Self::Mock => "mock",
        }
    }
}

impl fmt::Display for AdvisorBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdvisorBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "process" => Ok(Self::Process),
            "mock" => Ok(Self::Mock),
            other => Err(Error::Config(format!(
                "Unknown advisor backend '{}' (expected 'process' or 'mock')",
                other
            ))),
        }
    }
}

/// Advisory client settings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvisorConfig {
    pub backend: AdvisorBackend,
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Duration,
    /// Custom prompt template file; the embedded one is used when unset
    pub prompt_template: Option<PathBuf>,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            backend: AdvisorBackend::Process,
            program: "ollama".to_string(),
            args: vec!["run".to_string(), "llama3.1:8b".to_string()],
            timeout: DEFAULT_TIMEOUT,
            prompt_template: None,
        }
    }
}

impl AdvisorConfig {
    /// Prompt template text
    pub fn template(&self) -> Result<Cow<'static, str>> {
        match &self.prompt_template {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!(
                        "Failed to read prompt template {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                Ok(Cow::Owned(content))
            }
            None => Ok(Cow::Borrowed(DEFAULT_TEMPLATE)),
        }
    }
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Embedded,
    File(PathBuf),
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Embedded => f.write_str("built-in defaults"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Effective configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub ledger_path: PathBuf,
    pub categories: Vec<String>,
    pub advisor: AdvisorConfig,
    pub palette: Palette,
    pub source: ConfigSource,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ledger_path: PathBuf::from("expenses.csv"),
            categories: vec![
                "Utility".to_string(),
                "Food".to_string(),
                "Entertainment".to_string(),
            ],
            advisor: AdvisorConfig::default(),
            palette: Palette::default(),
            source: ConfigSource::Embedded,
        }
    }
}

impl Config {
    /// Load configuration (explicit path, then override file, then embedded default)
    ///
    /// An explicit path that does not exist is an error; a missing override
    /// file is not.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        if let Some(path) = default_config_path() {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        debug!("Using embedded default config");
        Self::from_toml(DEFAULT_CONFIG)
    }

    /// Parse a config file from disk
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        let mut config = Self::from_toml(&content)?;
        config.source = ConfigSource::File(path.to_path_buf());
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Parse TOML text; missing keys take their defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        let mut config = Config::default();

        if let Some(ledger) = raw.ledger {
            if let Some(path) = ledger.path {
                if path.trim().is_empty() {
                    return Err(Error::Config("ledger.path must not be empty".into()));
                }
                config.ledger_path = PathBuf::from(path);
            }
        }

        if let Some(categories) = raw.categories {
            if let Some(presets) = categories.presets {
                config.categories = presets
                    .into_iter()
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty())
                    .collect();
            }
        }

        if let Some(advisor) = raw.advisor {
            if let Some(backend) = advisor.backend {
                config.advisor.backend = backend.parse()?;
            }
            if let Some(program) = advisor.program {
                if program.trim().is_empty() {
                    return Err(Error::Config("advisor.program must not be empty".into()));
                }
                config.advisor.program = program;
            }
            if let Some(args) = advisor.args {
                config.advisor.args = args;
            }
            if let Some(secs) = advisor.timeout_secs {
                if secs == 0 {
                    return Err(Error::Config(
                        "advisor.timeout_secs must be greater than zero".into(),
                    ));
                }
                config.advisor.timeout = Duration::from_secs(secs);
            }
            config.advisor.prompt_template = advisor.prompt_template.map(PathBuf::from);
        }

        if let Some(chart) = raw.chart {
            if let Some(palette) = chart.palette {
                config.palette = Palette::new(palette.as_slice())?;
            }
        }

        Ok(config)
    }

    /// Apply `OUTLAY_*` environment overrides from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply environment overrides from an arbitrary lookup
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_LEDGER).filter(|v| !v.trim().is_empty()) {
            debug!(path = %path, "Ledger path overridden by {}", ENV_LEDGER);
            self.ledger_path = PathBuf::from(path);
        }
        if let Some(backend) = lookup(ENV_ADVISOR).filter(|v| !v.trim().is_empty()) {
            self.advisor.backend = backend.parse()?;
            debug!(backend = %self.advisor.backend, "Advisor overridden by {}", ENV_ADVISOR);
        }
        Ok(())
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("outlay").join("config.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    ledger: Option<RawLedger>,
    categories: Option<RawCategories>,
    advisor: Option<RawAdvisor>,
    chart: Option<RawChart>,
}

#[derive(Debug, Deserialize)]
struct RawLedger {
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCategories {
    presets: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawAdvisor {
    backend: Option<String>,
    program: Option<String>,
    args: Option<Vec<String>>,
    timeout_secs: Option<u64>,
    prompt_template: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawChart {
    palette: Option<Vec<String>>,
}
