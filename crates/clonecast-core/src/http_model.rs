//! Voice-cloning model hosted by an inference server.
//!
//! The server keeps the pretrained weights in memory; this client asks it to
//! load a model once, then posts one utterance at a time and writes the WAV it
//! gets back.
//!
//! Endpoints:
//!
//! - `POST /v1/models/load` with JSON `{"model": "<id>"}`, answered by
//!   `{"model": "<id>", "sample_rate": 24000, "languages": ["en", ...]}`
//! - `POST /v1/synthesize` as `multipart/form-data` with text fields `model`,
//!   `text`, `language` and a `speaker_wav` file part, answered by `audio/wav`

use std::fs;
use std::path::{Path, PathBuf};

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::audio::{AudioSummary, WavClip};
use crate::config::ServerConfig;
use crate::error::{CloneCastError, CloneCastResult};
use crate::model::{is_language_supported, ModelLoader, SpeechModel, SUPPORTED_LANGUAGES};

/// Longest server error body echoed into an error message
const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Debug, Serialize)]
struct LoadRequest<'a> {
    model: &'a str,
}

/// Server answer to a load request
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelStatus {
    /// Model the server now has loaded
    pub model: String,
    /// Output sample rate, if reported
    #[serde(default)]
    pub sample_rate: Option<u32>,
    /// Language codes the model accepts, if reported
    #[serde(default)]
    pub languages: Vec<String>,
}

/// Loads models on an inference server
#[derive(Debug, Clone)]
pub struct HttpModelLoader {
    client: Client,
    base_url: String,
}

impl HttpModelLoader {
    /// Create a loader for the server described by `server`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the settings are invalid or the HTTP
    /// client cannot be built.
    pub fn new(server: &ServerConfig) -> CloneCastResult<Self> {
        server.validate()?;
        let client = Client::builder()
            .timeout(server.timeout())
            .connect_timeout(server.connect_timeout())
            .build()
            .map_err(|e| {
                CloneCastError::configuration(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            base_url: server.base_url().to_string(),
        })
    }

    /// Server base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl ModelLoader for HttpModelLoader {
    type Model = HttpSpeechModel;

    fn load(&self, model_id: &str) -> CloneCastResult<HttpSpeechModel> {
        let url = format!("{}/v1/models/load", self.base_url);
        info!(url = %url, model = model_id, "Requesting model load");

        let response = self
            .client
            .post(&url)
            .json(&LoadRequest { model: model_id })
            .send()
            .map_err(|e| {
                CloneCastError::model_load(format!(
                    "cannot reach inference server at {}: {e}",
                    self.base_url
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CloneCastError::model_load(format!(
                "HTTP {status}: {}",
                error_detail(response)
            )));
        }

        let model_status: ModelStatus = response
            .json()
            .map_err(|e| CloneCastError::model_load(format!("invalid load response: {e}")))?;

        if model_status.model != model_id {
            return Err(CloneCastError::model_load(format!(
                "server loaded '{}' instead of '{model_id}'",
                model_status.model
            )));
        }

        info!(
            model = %model_status.model,
            sample_rate = ?model_status.sample_rate,
            languages = model_status.languages.len(),
            "Model loaded"
        );

        Ok(HttpSpeechModel::new(
            self.client.clone(),
            self.base_url.clone(),
            model_status,
        ))
    }
}

#[derive(Debug, Clone)]
struct ReferenceAudio {
    path: PathBuf,
    file_name: String,
    bytes: Vec<u8>,
}

/// A model loaded on an inference server
#[derive(Debug)]
pub struct HttpSpeechModel {
    client: Client,
    base_url: String,
    model_id: String,
    sample_rate: Option<u32>,
    languages: Vec<String>,
    reference: Option<ReferenceAudio>,
}

impl HttpSpeechModel {
    fn new(client: Client, base_url: String, status: ModelStatus) -> Self {
        let languages = if status.languages.is_empty() {
            SUPPORTED_LANGUAGES.iter().map(ToString::to_string).collect()
        } else {
            status.languages
        };

        Self {
            client,
            base_url,
            model_id: status.model,
            sample_rate: status.sample_rate,
            languages,
            reference: None,
        }
    }

    /// Language codes accepted by this model
    #[must_use]
    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    /// Output sample rate reported by the server
    #[must_use]
    pub const fn sample_rate(&self) -> Option<u32> {
        self.sample_rate
    }

    // The reference recording is read once and reused for every utterance.
    fn reference_part(&mut self, speaker_wav: &Path) -> CloneCastResult<Part> {
        let cached = matches!(&self.reference, Some(reference) if reference.path == speaker_wav);
        if !cached {
            let bytes = fs::read(speaker_wav).map_err(|e| {
                CloneCastError::file(format!(
                    "failed to read reference voice '{}': {e}",
                    speaker_wav.display()
                ))
            })?;
            let file_name = speaker_wav
                .file_name()
                .map_or_else(
                    || "speaker.wav".to_string(),
                    |name| name.to_string_lossy().into_owned(),
                );
            debug!(path = %speaker_wav.display(), bytes = bytes.len(), "Cached reference voice");
            self.reference = Some(ReferenceAudio {
                path: speaker_wav.to_path_buf(),
                file_name,
                bytes,
            });
        }

        let reference = self
            .reference
            .clone()
            .ok_or_else(|| CloneCastError::file("reference voice unavailable"))?;

        Part::bytes(reference.bytes)
            .file_name(reference.file_name)
            .mime_str("audio/wav")
            .map_err(|e| {
                CloneCastError::synthesis(format!("failed to attach reference voice: {e}"))
            })
    }
}

impl SpeechModel for HttpSpeechModel {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn synthesize_to_file(
        &mut self,
        text: &str,
        language: &str,
        speaker_wav: &Path,
        output: &Path,
    ) -> CloneCastResult<AudioSummary> {
        if !is_language_supported(&self.languages, language) {
            return Err(CloneCastError::synthesis(format!(
                "unsupported language '{language}' (supported: {})",
                self.languages.join(", ")
            )));
        }

        let form = Form::new()
            .text("model", self.model_id.clone())
            .text("text", text.to_string())
            .text("language", language.to_string())
            .part("speaker_wav", self.reference_part(speaker_wav)?);

        let url = format!("{}/v1/synthesize", self.base_url);
        debug!(url = %url, language, chars = text.chars().count(), "Posting synthesis request");

        let response = self.client.post(&url).multipart(form).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(CloneCastError::synthesis(format!(
                "HTTP {status}: {}",
                error_detail(response)
            )));
        }

        let body = response.bytes()?;
        let clip = WavClip::from_wav_bytes(&body)?;
        if let Some(expected) = self.sample_rate {
            if clip.spec().sample_rate != expected {
                debug!(
                    expected,
                    actual = clip.spec().sample_rate,
                    "Server returned a different sample rate than advertised"
                );
            }
        }
        clip.write(output)
    }
}

fn error_detail(response: Response) -> String {
    let body = response.text().unwrap_or_default();
    let body = body.trim();
    if body.is_empty() {
        return "empty response body".to_string();
    }
    if body.chars().count() > MAX_ERROR_BODY_CHARS {
        let head: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        format!("{head}...")
    } else {
        body.to_string()
    }
}
