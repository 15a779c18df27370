//! WAV decoding and writing
//!
//! Audio returned by the inference server is decoded before it touches the
//! output directory, so an error page or a truncated body never lands on disk
//! as `<id>.wav`.

use std::fs::{self, File};
use std::io::{BufWriter, Cursor, Seek, Write};
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tracing::{debug, warn};

use crate::error::{CloneCastError, CloneCastResult};

/// Shape of a written or probed audio file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioSummary {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Samples per channel
    pub frames: u64,
}

impl AudioSummary {
    /// Length in seconds
    #[must_use]
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames as f64 / f64::from(self.sample_rate)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Samples {
    Int(Vec<i32>),
    Float(Vec<f32>),
}

impl Samples {
    fn len(&self) -> usize {
        match self {
            Self::Int(samples) => samples.len(),
            Self::Float(samples) => samples.len(),
        }
    }
}

/// Decoded PCM clip with its original WAV format
#[derive(Debug, Clone, PartialEq)]
pub struct WavClip {
    spec: WavSpec,
    samples: Samples,
}

impl WavClip {
    /// Build a 32-bit float clip from interleaved samples
    ///
    /// # Errors
    ///
    /// Returns an error if `channels` or `sample_rate` is zero, or if the sample
    /// count is not a whole number of frames.
    pub fn from_float_samples(
        sample_rate: u32,
        channels: u16,
        samples: Vec<f32>,
    ) -> CloneCastResult<Self> {
        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        Self::checked(spec, Samples::Float(samples))
    }

    /// Decode a complete WAV file held in memory
    ///
    /// # Errors
    ///
    /// Returns an audio processing error if the bytes are not a readable WAV
    /// file or contain no audio frames.
    pub fn from_wav_bytes(bytes: &[u8]) -> CloneCastResult<Self> {
        let reader = WavReader::new(Cursor::new(bytes)).map_err(|e| {
            CloneCastError::audio_processing(format!("response is not a WAV file: {e}"))
        })?;
        let spec = reader.spec();

        let samples = match spec.sample_format {
            SampleFormat::Int => Samples::Int(
                reader
                    .into_samples::<i32>()
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| {
                        CloneCastError::audio_processing(format!("truncated WAV data: {e}"))
                    })?,
            ),
            SampleFormat::Float => Samples::Float(
                reader
                    .into_samples::<f32>()
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| {
                        CloneCastError::audio_processing(format!("truncated WAV data: {e}"))
                    })?,
            ),
        };

        Self::checked(spec, samples)
    }

    fn checked(spec: WavSpec, samples: Samples) -> CloneCastResult<Self> {
        if spec.channels == 0 || spec.sample_rate == 0 {
            return Err(CloneCastError::audio_processing(format!(
                "invalid WAV format: {} channels at {} Hz",
                spec.channels, spec.sample_rate
            )));
        }
        if samples.len() == 0 {
            return Err(CloneCastError::audio_processing("WAV contains no audio frames"));
        }
        if samples.len() % usize::from(spec.channels) != 0 {
            return Err(CloneCastError::audio_processing(format!(
                "{} samples do not divide into {} channels",
                samples.len(),
                spec.channels
            )));
        }
        Ok(Self { spec, samples })
    }

    /// WAV format of this clip
    #[must_use]
    pub const fn spec(&self) -> WavSpec {
        self.spec
    }

    /// Shape of this clip
    #[must_use]
    pub fn summary(&self) -> AudioSummary {
        AudioSummary {
            sample_rate: self.spec.sample_rate,
            channels: self.spec.channels,
            frames: (self.samples.len() / usize::from(self.spec.channels)) as u64,
        }
    }

    /// Length in seconds
    #[must_use]
    pub fn duration_secs(&self) -> f64 {
        self.summary().duration_secs()
    }

    fn write_into<W: Write + Seek>(&self, writer: W) -> CloneCastResult<()> {
        let mut wav = WavWriter::new(writer, self.spec)?;
        match &self.samples {
            Samples::Int(samples) => {
                for &sample in samples {
                    wav.write_sample(sample)?;
                }
            }
            Samples::Float(samples) => {
                for &sample in samples {
                    wav.write_sample(sample)?;
                }
            }
        }
        wav.finalize()?;
        Ok(())
    }

    /// Encode this clip as an in-memory WAV file
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn to_wav_bytes(&self) -> CloneCastResult<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        self.write_into(&mut buffer)?;
        Ok(buffer.into_inner())
    }

    /// Write this clip to `path`, replacing any existing file
    ///
    /// A partially written file is removed on failure.
    ///
    /// # Errors
    ///
    /// Returns a file error if the file cannot be created or written.
    pub fn write(&self, path: &Path) -> CloneCastResult<AudioSummary> {
        let file = File::create(path).map_err(|e| {
            CloneCastError::file(format!("failed to create '{}': {e}", path.display()))
        })?;

        if let Err(err) = self.write_into(BufWriter::new(file)) {
            if let Err(remove_err) = fs::remove_file(path) {
                warn!(
                    path = %path.display(),
                    error = %remove_err,
                    "Failed to remove partial WAV file"
                );
            }
            return Err(err);
        }

        let summary = self.summary();
        debug!(
            path = %path.display(),
            sample_rate = summary.sample_rate,
            channels = summary.channels,
            frames = summary.frames,
            "Wrote WAV file"
        );
        Ok(summary)
    }
}

/// Read the header of a reference voice file
///
/// Returns `None` (after logging a warning) when the file is not a readable
/// WAV; the model may still accept other formats.
#[must_use]
pub fn probe_reference(path: &Path) -> Option<AudioSummary> {
    match WavReader::open(path) {
        Ok(reader) => {
            let spec = reader.spec();
            Some(AudioSummary {
                sample_rate: spec.sample_rate,
                channels: spec.channels,
                frames: u64::from(reader.duration()),
            })
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                error = %err,
                "Reference voice is not a readable WAV file"
            );
            None
        }
    }
}
