//! # Clonecast Core
//!
//! Batch generation of cloned-voice speech: one reference recording, many
//! utterances read from a JSON file, one WAV file per utterance.
//!
//! ## Example
//!
//! ```rust,no_run
//! use clonecast_core::{BatchConfig, BatchDriver, HttpModelLoader};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = BatchConfig::new("data/reference/ref_voice.wav", "data/inputs/sentences.json");
//!     let loader = HttpModelLoader::new(&config.server)?;
//!     let mut driver = BatchDriver::new(config, loader, std::io::stdout());
//!     let report = driver.run()?;
//!     println!("{} of {} generated", report.succeeded, report.total);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod audio;
pub mod config;
pub mod driver;
pub mod error;
pub mod http_model;
pub mod model;
pub mod record;

// Re-export main types for convenience
pub use audio::{probe_reference, AudioSummary, WavClip};
pub use config::{BatchConfig, ConfigOverrides, ServerConfig, Settings};
pub use driver::{BatchDriver, BatchReport, RecordFailure};
pub use error::{CloneCastError, CloneCastResult};
pub use http_model::{HttpModelLoader, HttpSpeechModel, ModelStatus};
pub use model::{ModelLoader, SpeechModel, SUPPORTED_LANGUAGES};
pub use record::{load_records_from_json, parse_records, UtteranceRecord};

/// Version information for the clonecast-core crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Pretrained multilingual voice-cloning model used for every run
pub const XTTS_V2_MODEL_ID: &str = "tts_models/multilingual/multi-dataset/xtts_v2";

/// Language for records and runs that do not name one
pub const DEFAULT_LANGUAGE: &str = "en";

/// Output directory when none is configured
pub const DEFAULT_OUT_DIR: &str = "outputs";
