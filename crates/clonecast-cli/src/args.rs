use clap::{ArgAction, Parser};
use clonecast_core::config::ConfigOverrides;
use std::path::PathBuf;

const AFTER_HELP: &str = "\
Example:
  JSON batch processing:
    clonecast --speaker-wav data/reference/ref_voice.wav --json data/inputs/sentences.json

Input format:
  [
    {\"id\": \"intro\", \"text\": \"Hello!\", \"language\": \"en\"},
    {\"text\": \"Bonjour\", \"language\": \"fr\"}
  ]";

/// Clonecast Command Line Interface
///
/// Voice-cloning TTS with XTTS v2: synthesize every entry of a JSON batch
/// file in the voice of one reference recording.
#[derive(Parser, Debug)]
#[command(name = "clonecast")]
#[command(author, version, about, long_about = None, after_help = AFTER_HELP)]
pub struct Cli {
    /// Path to reference voice audio file (.wav format recommended)
    #[arg(long, value_name = "PATH")]
    pub speaker_wav: PathBuf,

    /// Path to JSON file with an array of objects containing id, text, and optional language fields
    #[arg(long, value_name = "PATH")]
    pub json: PathBuf,

    /// Output directory for generated audio files, created if missing (default: outputs)
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Default language code (default: en).
    /// Supported: en, es, fr, de, it, pt, pl, tr, ru, nl, cs, ar, zh-cn, hu, ko, ja, hi
    #[arg(long, value_name = "CODE")]
    pub language: Option<String>,

    /// Inference server hosting the model (default: http://127.0.0.1:8020)
    #[arg(long, value_name = "URL", env = "CLONECAST_SERVER")]
    pub server: Option<String>,

    /// Per-request timeout in seconds (default: none, a request may run as long as synthesis takes)
    #[arg(long, value_name = "SECS", env = "CLONECAST_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Settings file (default: the platform config directory's clonecast/config.toml, if present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (default warn; -v info, -vv debug, -vvv trace).
    /// RUST_LOG overrides this.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn to_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            speaker_wav: self.speaker_wav.clone(),
            input_json: self.json.clone(),
            out_dir: self.out_dir.clone(),
            language: self.language.clone(),
            server_url: self.server.clone(),
            timeout_secs: self.timeout_secs,
        }
    }

    /// Log filter used when RUST_LOG is not set
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
