//! Batch synthesis driver.
//!
//! One run: check the reference voice, read the batch file, load the model
//! once, then synthesize every record in order. A failed record is reported
//! and skipped; only problems before the loop end the run early.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::audio::probe_reference;
use crate::config::BatchConfig;
use crate::error::{CloneCastError, CloneCastResult};
use crate::model::{ModelLoader, SpeechModel};
use crate::record::{load_records_from_json, UtteranceRecord, PREVIEW_CHARS};

/// A record whose synthesis failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFailure {
    /// Record id
    pub id: String,
    /// Error text shown to the user
    pub message: String,
}

/// Outcome of a completed batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Records attempted
    pub total: usize,
    /// Records written successfully
    pub succeeded: usize,
    /// Files written, in processing order
    pub outputs: Vec<PathBuf>,
    /// Failed records, in processing order
    pub failures: Vec<RecordFailure>,
}

impl BatchReport {
    fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Number of failed records
    #[must_use]
    pub fn failed(&self) -> usize {
        self.total - self.succeeded
    }

    /// Whether every record succeeded
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.succeeded == self.total
    }
}

/// Runs a batch against a [`ModelLoader`], printing progress to `out`
#[derive(Debug)]
pub struct BatchDriver<L, W> {
    config: BatchConfig,
    loader: L,
    out: W,
}

impl<L, W> BatchDriver<L, W>
where
    L: ModelLoader,
    W: Write,
{
    /// Create a driver
    pub fn new(config: BatchConfig, loader: L, out: W) -> Self {
        Self {
            config,
            loader,
            out,
        }
    }

    /// Give back the progress writer
    pub fn into_output(self) -> W {
        self.out
    }

    /// Run the batch
    ///
    /// # Errors
    ///
    /// Returns an error only for problems that stop the whole run: invalid
    /// configuration, a missing reference voice, a missing or malformed batch
    /// file, no usable records, a model that fails to load, or an output
    /// directory that cannot be created. Per-record failures are counted in
    /// the returned [`BatchReport`] instead.
    pub fn run(&mut self) -> CloneCastResult<BatchReport> {
        self.config.validate()?;

        let speaker_wav = &self.config.speaker_wav;
        if !speaker_wav.exists() {
            return Err(CloneCastError::reference_not_found(speaker_wav));
        }
        if let Some(reference) = probe_reference(speaker_wav) {
            info!(
                path = %speaker_wav.display(),
                sample_rate = reference.sample_rate,
                channels = reference.channels,
                duration_secs = reference.duration_secs(),
                "Reference voice"
            );
        }

        let records =
            load_records_from_json(&self.config.input_json, &self.config.default_language)?;
        writeln!(self.out, "Loaded {} entries from JSON file", records.len())?;
        if records.is_empty() {
            return Err(CloneCastError::NoValidRecords);
        }

        writeln!(self.out, "Loading TTS model: {}", self.config.model_id)?;
        let load_start = Instant::now();
        let mut model = self.loader.load(&self.config.model_id)?;
        info!(
            model = %self.config.model_id,
            elapsed_ms = load_start.elapsed().as_millis(),
            "TTS model ready"
        );

        fs::create_dir_all(&self.config.out_dir).map_err(|e| {
            CloneCastError::file(format!(
                "failed to create output directory '{}': {e}",
                self.config.out_dir.display()
            ))
        })?;

        self.synthesize_all(&mut model, &records)
    }

    fn synthesize_all<M: SpeechModel>(
        &mut self,
        model: &mut M,
        records: &[UtteranceRecord],
    ) -> CloneCastResult<BatchReport> {
        let total = records.len();
        let mut report = BatchReport::new(total);
        let mut seen_ids = HashSet::with_capacity(total);

        writeln!(self.out, "Processing {total} entries...")?;

        for (index, record) in records.iter().enumerate() {
            let position = index + 1;
            let output_path = record.output_path(&self.config.out_dir);
            if !seen_ids.insert(record.id.as_str()) {
                debug!(
                    id = %record.id,
                    path = %output_path.display(),
                    "Duplicate id, overwriting earlier output"
                );
            }

            writeln!(
                self.out,
                "[{position}/{total}] Generating: {} ({}) - '{}'",
                record.id,
                record.language,
                record.preview(PREVIEW_CHARS)
            )?;
            info!(
                progress = format!("[{position}/{total}]"),
                id = %record.id,
                language = %record.language,
                "Synthesizing record"
            );

            let started = Instant::now();
            match model.synthesize_to_file(
                &record.text,
                &record.language,
                &self.config.speaker_wav,
                &output_path,
            ) {
                Ok(audio) => {
                    writeln!(self.out, "  ✓ Generated: {}", output_path.display())?;
                    info!(
                        id = %record.id,
                        path = %output_path.display(),
                        audio_secs = audio.duration_secs(),
                        elapsed_ms = started.elapsed().as_millis(),
                        "Record generated"
                    );
                    report.succeeded += 1;
                    report.outputs.push(output_path);
                }
                Err(err) => {
                    writeln!(self.out, "  ✗ Error generating {}: {err}", record.id)?;
                    warn!(
                        id = %record.id,
                        category = err.category(),
                        error = %err,
                        "Record failed"
                    );
                    report.failures.push(RecordFailure {
                        id: record.id.clone(),
                        message: err.to_string(),
                    });
                }
            }
        }

        writeln!(
            self.out,
            "\nCompleted: {}/{} files generated successfully",
            report.succeeded, report.total
        )?;
        if !report.all_succeeded() {
            writeln!(self.out, "Failed: {} files", report.failed())?;
        }
        info!(
            succeeded = report.succeeded,
            failed = report.failed(),
            total = report.total,
            "Batch complete"
        );

        Ok(report)
    }
}
