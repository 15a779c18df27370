//! Run configuration and the optional TOML settings file.
//!
//! Values resolve in the order: command-line flag or environment variable,
//! then the settings file, then the built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::Deserialize;
use tracing::debug;

use crate::error::{CloneCastError, CloneCastResult};
use crate::{DEFAULT_LANGUAGE, DEFAULT_OUT_DIR, XTTS_V2_MODEL_ID};

/// Default inference server address
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8020";

/// Default connect timeout
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Name of the settings file inside the platform config directory
pub const SETTINGS_FILE_NAME: &str = "config.toml";

/// Inference server connection settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the inference server
    pub url: String,
    /// Whole-request timeout in seconds; `None` waits for as long as synthesis takes
    pub timeout_secs: Option<u64>,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SERVER_URL.to_string(),
            timeout_secs: None,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl ServerConfig {
    /// Whole-request timeout, if one is configured
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Connect timeout
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Base URL without a trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    /// Validate the server settings
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an empty or non-HTTP URL or a zero timeout.
    pub fn validate(&self) -> CloneCastResult<()> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(CloneCastError::configuration("server URL cannot be empty"));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(CloneCastError::configuration(format!(
                "server URL must start with http:// or https://, got '{url}'"
            )));
        }
        if self.timeout_secs == Some(0) {
            return Err(CloneCastError::configuration(
                "request timeout must be greater than 0",
            ));
        }
        if self.connect_timeout_secs == 0 {
            return Err(CloneCastError::configuration(
                "connect timeout must be greater than 0",
            ));
        }
        Ok(())
    }
}

/// `[defaults]` table of the settings file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DefaultsSection {
    /// Default language for records without one
    pub language: Option<String>,
    /// Default output directory
    pub out_dir: Option<PathBuf>,
}

/// Contents of the optional settings file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Inference server settings
    pub server: ServerConfig,
    /// Batch defaults
    pub defaults: DefaultsSection,
}

impl Settings {
    /// Parse settings from TOML text
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the TOML is invalid.
    pub fn from_toml_str(text: &str) -> CloneCastResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read settings from a file
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> CloneCastResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            CloneCastError::configuration(format!(
                "failed to read settings file '{}': {e}",
                path.display()
            ))
        })?;
        debug!(path = %path.display(), "Loaded settings file");
        Self::from_toml_str(&text)
    }

    /// Platform location of the settings file, e.g. `~/.config/clonecast/config.toml`
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("ai", "Clonecast", "clonecast")
            .map(|dirs| dirs.config_dir().join(SETTINGS_FILE_NAME))
    }

    /// Load settings from `explicit`, or from the default location if a file exists there.
    ///
    /// An explicit path must exist. A missing default file yields built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the chosen file cannot be read or parsed.
    pub fn discover(explicit: Option<&Path>) -> CloneCastResult<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }
}

/// Complete configuration for one batch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Reference voice audio shared by every record
    pub speaker_wav: PathBuf,
    /// JSON batch file
    pub input_json: PathBuf,
    /// Directory receiving `<id>.wav` files
    pub out_dir: PathBuf,
    /// Language for records without one
    pub default_language: String,
    /// Pretrained model identifier
    pub model_id: String,
    /// Inference server settings
    pub server: ServerConfig,
}

impl BatchConfig {
    /// Create a configuration with built-in defaults for everything but the two input paths
    #[must_use]
    pub fn new(speaker_wav: impl Into<PathBuf>, input_json: impl Into<PathBuf>) -> Self {
        Self {
            speaker_wav: speaker_wav.into(),
            input_json: input_json.into(),
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            default_language: DEFAULT_LANGUAGE.to_string(),
            model_id: XTTS_V2_MODEL_ID.to_string(),
            server: ServerConfig::default(),
        }
    }

    /// Fill unset values from a settings file, leaving explicit overrides alone
    #[must_use]
    pub fn resolve(overrides: ConfigOverrides, settings: Settings) -> Self {
        let mut server = settings.server;
        if let Some(url) = overrides.server_url {
            server.url = url;
        }
        if let Some(timeout_secs) = overrides.timeout_secs {
            server.timeout_secs = Some(timeout_secs);
        }

        Self {
            speaker_wav: overrides.speaker_wav,
            input_json: overrides.input_json,
            out_dir: overrides
                .out_dir
                .or(settings.defaults.out_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR)),
            default_language: overrides
                .language
                .or(settings.defaults.language)
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            model_id: XTTS_V2_MODEL_ID.to_string(),
            server,
        }
    }

    /// Set the output directory
    #[must_use]
    pub fn with_out_dir(mut self, out_dir: impl Into<PathBuf>) -> Self {
        self.out_dir = out_dir.into();
        self
    }

    /// Set the inference server settings
    #[must_use]
    pub fn with_server(mut self, server: ServerConfig) -> Self {
        self.server = server;
        self
    }

    /// Validate the configuration
    ///
    /// File existence is checked by the driver, not here.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for invalid server settings or an empty output directory.
    pub fn validate(&self) -> CloneCastResult<()> {
        self.server.validate()?;
        if self.out_dir.as_os_str().is_empty() {
            return Err(CloneCastError::configuration(
                "output directory cannot be empty",
            ));
        }
        Ok(())
    }
}

/// Values given explicitly on the command line or through the environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// `--speaker-wav`
    pub speaker_wav: PathBuf,
    /// `--json`
    pub input_json: PathBuf,
    /// `--out-dir`
    pub out_dir: Option<PathBuf>,
    /// `--language`
    pub language: Option<String>,
    /// `--server`
    pub server_url: Option<String>,
    /// `--timeout-secs`
    pub timeout_secs: Option<u64>,
}
