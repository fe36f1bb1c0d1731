//! Client configuration: an optional RON file plus environment overrides.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use docqa_engine::{BackendSettings, SpeechSettings};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::logging::LogDestination;

const DEFAULT_CONFIG_FILE: &str = "docqa.ron";
const ENV_CONFIG: &str = "DOCQA_CONFIG";
const ENV_BACKEND_URL: &str = "DOCQA_BACKEND_URL";
const ENV_SPEECH_PROGRAM: &str = "DOCQA_SPEECH_PROGRAM";
const ENV_LOG: &str = "DOCQA_LOG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("invalid value {value:?} for {name}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend_url: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub speech_program: String,
    pub speech_args: Vec<String>,
    pub log: LogDestination,
}

impl Default for AppConfig {
    fn default() -> Self {
        let backend = BackendSettings::default();
        let speech = SpeechSettings::default();
        Self {
            backend_url: backend.base_url,
            connect_timeout_secs: backend.connect_timeout.as_secs(),
            request_timeout_secs: backend.request_timeout.as_secs(),
            speech_program: speech.program,
            speech_args: speech.args,
            log: LogDestination::default(),
        }
    }
}

impl AppConfig {
    /// Loads `$DOCQA_CONFIG` (or `./docqa.ron`) and applies `DOCQA_*` overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os(ENV_CONFIG)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_from(&path, |name| std::env::var(name).ok())
    }

    /// A missing file yields the defaults; an unreadable or malformed one is an error.
    pub fn load_from(
        path: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match fs::read_to_string(path) {
            Ok(text) => ron::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => Self::default(),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        config.apply_overrides(lookup)?;
        Ok(config)
    }

    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = lookup(ENV_BACKEND_URL).filter(|url| !url.trim().is_empty()) {
            self.backend_url = url.trim().to_string();
        }
        if let Some(program) = lookup(ENV_SPEECH_PROGRAM).filter(|p| !p.trim().is_empty()) {
            self.speech_program = program.trim().to_string();
        }
        if let Some(value) = lookup(ENV_LOG) {
            self.log = LogDestination::parse(&value).ok_or(ConfigError::InvalidValue {
                name: ENV_LOG,
                value,
            })?;
        }
        Ok(())
    }

    pub fn backend_settings(&self) -> BackendSettings {
        BackendSettings {
            base_url: self.backend_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    pub fn speech_settings(&self) -> SpeechSettings {
        SpeechSettings {
            program: self.speech_program.clone(),
            args: self.speech_args.clone(),
        }
    }
}
