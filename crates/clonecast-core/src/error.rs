//! Error types for the Clonecast batch driver.

use std::path::{Path, PathBuf};

/// Result type alias for Clonecast operations
pub type CloneCastResult<T> = Result<T, CloneCastError>;

/// Main error type for Clonecast operations
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CloneCastError {
    /// Reference voice file does not exist
    #[error("Reference voice file '{}' not found.", path.display())]
    ReferenceNotFound {
        /// Path that was checked
        path: PathBuf,
    },

    /// JSON input file does not exist
    #[error("JSON file '{}' not found.", path.display())]
    InputNotFound {
        /// Path that was checked
        path: PathBuf,
    },

    /// JSON input could not be read or has the wrong shape
    #[error("Failed to parse JSON file: {message}")]
    InputParse {
        /// Error message describing the parse failure
        message: String,
    },

    /// Every record was dropped during extraction
    #[error("No valid text entries found to process.")]
    NoValidRecords,

    /// The pretrained model could not be loaded
    #[error("Failed to load TTS model: {message}")]
    ModelLoad {
        /// Error message describing the load failure
        message: String,
    },

    /// TTS synthesis failed
    #[error("TTS synthesis failed: {message}")]
    Synthesis {
        /// Error message describing the failure
        message: String,
    },

    /// Audio format or processing error
    #[error("Audio processing error: {message}")]
    AudioProcessing {
        /// Error message describing the processing issue
        message: String,
    },

    /// File I/O error
    #[error("File I/O error: {message}")]
    File {
        /// Error message describing the file operation failure
        message: String,
    },

    /// Network error talking to the inference server
    #[error("Network error: {message}")]
    Network {
        /// Error message describing the network issue
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message describing the configuration issue
        message: String,
    },
}

impl CloneCastError {
    /// Create a new reference-not-found error
    #[must_use]
    pub fn reference_not_found<P: AsRef<Path>>(path: P) -> Self {
        Self::ReferenceNotFound {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create a new input-not-found error
    #[must_use]
    pub fn input_not_found<P: AsRef<Path>>(path: P) -> Self {
        Self::InputNotFound {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create a new input parse error
    #[must_use]
    pub fn input_parse<S: Into<String>>(message: S) -> Self {
        Self::InputParse {
            message: message.into(),
        }
    }

    /// Create a new model load error
    #[must_use]
    pub fn model_load<S: Into<String>>(message: S) -> Self {
        Self::ModelLoad {
            message: message.into(),
        }
    }

    /// Create a new synthesis error
    #[must_use]
    pub fn synthesis<S: Into<String>>(message: S) -> Self {
        Self::Synthesis {
            message: message.into(),
        }
    }

    /// Create a new audio processing error
    #[must_use]
    pub fn audio_processing<S: Into<String>>(message: S) -> Self {
        Self::AudioProcessing {
            message: message.into(),
        }
    }

    /// Create a new file error
    #[must_use]
    pub fn file<S: Into<String>>(message: S) -> Self {
        Self::File {
            message: message.into(),
        }
    }

    /// Create a new network error
    #[must_use]
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    #[must_use]
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Get the error category for logging
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::ReferenceNotFound { .. } => "reference",
            Self::InputNotFound { .. } | Self::InputParse { .. } | Self::NoValidRecords => "input",
            Self::ModelLoad { .. } => "model",
            Self::Synthesis { .. } => "synthesis",
            Self::AudioProcessing { .. } => "audio_processing",
            Self::File { .. } => "file",
            Self::Network { .. } => "network",
            Self::Configuration { .. } => "configuration",
        }
    }
}

// Convert from common error types
impl From<std::io::Error> for CloneCastError {
    fn from(err: std::io::Error) -> Self {
        Self::file(err.to_string())
    }
}

impl From<serde_json::Error> for CloneCastError {
    fn from(err: serde_json::Error) -> Self {
        Self::input_parse(err.to_string())
    }
}

impl From<reqwest::Error> for CloneCastError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network(format!("request timed out: {err}"))
        } else {
            Self::network(err.to_string())
        }
    }
}

impl From<hound::Error> for CloneCastError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(io) => Self::file(io.to_string()),
            other => Self::audio_processing(other.to_string()),
        }
    }
}

impl From<toml::de::Error> for CloneCastError {
    fn from(err: toml::de::Error) -> Self {
        Self::configuration(format!("invalid settings file: {err}"))
    }
}
