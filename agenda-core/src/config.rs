//! Global agenda configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{AgendaError, AgendaResult};

static DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";
static DEFAULT_SESSION_PATH: &str = "~/.config/agenda/session.toml";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_session_path() -> PathBuf {
    PathBuf::from(DEFAULT_SESSION_PATH)
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Configuration at ~/.config/agenda/config.toml
///
/// Every key can be overridden from the environment with an `AGENDA_` prefix,
/// e.g. `AGENDA_API_URL=https://agenda.example.com/api`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AgendaConfig {
    /// Base URL of the REST API, including the `/api` prefix.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Where the session token and user profile are persisted.
    #[serde(default = "default_session_path")]
    pub session_path: PathBuf,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AgendaConfig {
    fn default() -> Self {
        AgendaConfig {
            api_url: default_api_url(),
            session_path: default_session_path(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AgendaConfig {
    pub fn config_path() -> AgendaResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AgendaError::Config("Could not determine config directory".into()))?
            .join("agenda");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the config file (creating a commented default on first run),
    /// layered under `AGENDA_*` environment overrides.
    pub fn load() -> AgendaResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> AgendaResult<Self> {
        Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(Environment::with_prefix("AGENDA"))
            .build()
            .map_err(|e| AgendaError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| AgendaError::Config(e.to_string()))
    }

    /// Session file path with `~` expanded.
    pub fn session_path(&self) -> PathBuf {
        let full_path_str =
            shellexpand::tilde(&self.session_path.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> AgendaResult<()> {
        let contents = format!(
            "\
# agenda configuration

# Base URL of the events API:
# api_url = \"{}\"

# Where the login session is stored:
# session_path = \"{}\"

# Request timeout in seconds:
# timeout_secs = {}
",
            DEFAULT_API_URL, DEFAULT_SESSION_PATH, DEFAULT_TIMEOUT_SECS
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AgendaError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| AgendaError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
