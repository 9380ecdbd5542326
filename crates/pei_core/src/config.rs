//! Runtime settings resolved from the environment.
//!
//! | key             | meaning                                   |
//! |-----------------|-------------------------------------------|
//! | `PEI_DB_PATH`   | SQLite file; defaults to the temp dir      |
//! | `PEI_TERM`      | `global`, `1`..`4` or `b1`..`b4`            |
//! | `PEI_LOG_LEVEL` | `trace|debug|info|warn|error`              |
//! | `PEI_LOG_DIR`   | absolute log directory; unset disables logs |

use crate::logging::default_log_level;
use crate::model::status::{Term, TermMode};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

pub const DB_PATH_ENV: &str = "PEI_DB_PATH";
pub const TERM_ENV: &str = "PEI_TERM";
pub const LOG_LEVEL_ENV: &str = "PEI_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "PEI_LOG_DIR";
const DEFAULT_DB_FILE_NAME: &str = "pei_tracker.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidTermMode(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTermMode(value) => write!(
                f,
                "invalid term mode `{value}`; expected global, 1..4 or b1..b4"
            ),
        }
    }
}

impl Error for ConfigError {}

impl FromStr for TermMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        if normalized.is_empty() || normalized == "global" {
            return Ok(Self::Global);
        }
        normalized
            .strip_prefix('b')
            .unwrap_or(&normalized)
            .parse::<u8>()
            .ok()
            .and_then(Term::from_number)
            .map(Self::Scoped)
            .ok_or_else(|| ConfigError::InvalidTermMode(value.trim().to_string()))
    }
}

/// Settings for one tracker process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    pub db_path: PathBuf,
    pub term_mode: TermMode,
    pub log_level: String,
    pub log_dir: Option<String>,
}

impl TrackerConfig {
    /// Reads settings from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let term_mode = match read(TERM_ENV) {
            Some(raw) => raw.parse()?,
            None => TermMode::Global,
        };

        Ok(Self {
            db_path: resolve_db_path(read(DB_PATH_ENV).as_deref()),
            term_mode,
            log_level: read(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: read(LOG_DIR_ENV),
        })
    }
}

/// `explicit` when non-blank, else `<temp_dir>/pei_tracker.sqlite3`.
pub fn resolve_db_path(explicit: Option<&str>) -> PathBuf {
    match explicit.map(str::trim).filter(|value| !value.is_empty()) {
        Some(path) => PathBuf::from(path),
        None => std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
    }
}
