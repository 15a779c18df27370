//! Seam between the batch driver and the pretrained voice-cloning model.
//!
//! The driver only needs two operations from the model: load it once by
//! identifier, then synthesize one utterance at a time straight to a file.

use std::path::Path;

use crate::audio::AudioSummary;
use crate::error::CloneCastResult;

/// Language codes understood by XTTS v2
pub const SUPPORTED_LANGUAGES: &[&str] = &[
    "en", "es", "fr", "de", "it", "pt", "pl", "tr", "ru", "nl", "cs", "ar", "zh-cn", "hu", "ko",
    "ja", "hi",
];

/// Check a language code against a list, ignoring ASCII case
#[must_use]
pub fn is_language_supported<S: AsRef<str>>(languages: &[S], language: &str) -> bool {
    languages
        .iter()
        .any(|supported| supported.as_ref().eq_ignore_ascii_case(language))
}

/// A loaded voice-cloning model
#[cfg_attr(test, mockall::automock)]
pub trait SpeechModel {
    /// Identifier the model was loaded with
    fn model_id(&self) -> &str;

    /// Synthesize `text` in `language` with the voice of `speaker_wav`, writing a WAV file
    /// to `output`
    ///
    /// # Errors
    ///
    /// Returns an error for an unsupported language, an unusable reference
    /// recording, or any failure inside the model. The caller treats every
    /// error here as affecting this utterance only.
    fn synthesize_to_file(
        &mut self,
        text: &str,
        language: &str,
        speaker_wav: &Path,
        output: &Path,
    ) -> CloneCastResult<AudioSummary>;
}

/// Loads a [`SpeechModel`] by identifier
#[cfg_attr(test, mockall::automock(type Model = MockSpeechModel;))]
pub trait ModelLoader {
    /// Model type produced by this loader
    type Model: SpeechModel;

    /// Load the model named `model_id`
    ///
    /// # Errors
    ///
    /// Returns [`crate::CloneCastError::ModelLoad`] when the model is unknown,
    /// its assets are missing, or the environment cannot run it.
    fn load(&self, model_id: &str) -> CloneCastResult<Self::Model>;
}
