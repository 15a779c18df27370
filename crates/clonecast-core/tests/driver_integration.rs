//! Integration tests for the batch driver with an in-process model

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use assert_fs::prelude::*;
use clonecast_core::{
    AudioSummary, BatchConfig, BatchDriver, CloneCastError, CloneCastResult, ModelLoader,
    SpeechModel, WavClip, XTTS_V2_MODEL_ID,
};
use predicates::prelude::*;

/// Writes a short tone per utterance; fails for languages it does not know.
#[derive(Debug)]
struct ToneModel {
    id: String,
    calls: Rc<RefCell<Vec<(String, String, PathBuf)>>>,
}

impl SpeechModel for ToneModel {
    fn model_id(&self) -> &str {
        &self.id
    }

    fn synthesize_to_file(
        &mut self,
        text: &str,
        language: &str,
        speaker_wav: &Path,
        output: &Path,
    ) -> CloneCastResult<AudioSummary> {
        self.calls
            .borrow_mut()
            .push((text.to_string(), language.to_string(), speaker_wav.to_path_buf()));
        if language == "xx" {
            return Err(CloneCastError::synthesis(format!(
                "unsupported language '{language}'"
            )));
        }
        let samples = (0..text.len() * 100)
            .map(|i| (i as f32 * 0.05).sin() * 0.5)
            .collect();
        WavClip::from_float_samples(24_000, 1, samples)?.write(output)
    }
}

#[derive(Debug, Default)]
struct ToneLoader {
    loads: Rc<RefCell<Vec<String>>>,
    calls: Rc<RefCell<Vec<(String, String, PathBuf)>>>,
}

impl ModelLoader for ToneLoader {
    type Model = ToneModel;

    fn load(&self, model_id: &str) -> CloneCastResult<ToneModel> {
        self.loads.borrow_mut().push(model_id.to_string());
        Ok(ToneModel {
            id: model_id.to_string(),
            calls: Rc::clone(&self.calls),
        })
    }
}

fn setup(json: &str) -> (assert_fs::TempDir, BatchConfig) {
    let temp = assert_fs::TempDir::new().unwrap();
    let reference = temp.child("ref_voice.wav");
    reference
        .write_binary(
            &WavClip::from_float_samples(22_050, 1, vec![0.0; 2205])
                .unwrap()
                .to_wav_bytes()
                .unwrap(),
        )
        .unwrap();
    let input = temp.child("sentences.json");
    input.write_str(json).unwrap();

    let config = BatchConfig::new(reference.path(), input.path())
        .with_out_dir(temp.child("generated").child("nested").path());
    (temp, config)
}

#[test_log::test]
fn writes_one_wav_per_surviving_record() {
    let (temp, config) = setup(
        r#"[
            {"id": "intro", "text": "Welcome to the show."},
            {"text": "   "},
            {"text": "Bonjour tout le monde", "language": "fr"}
        ]"#,
    );
    let loader = ToneLoader::default();
    let loads = Rc::clone(&loader.loads);
    let calls = Rc::clone(&loader.calls);

    let mut driver = BatchDriver::new(config, loader, Vec::new());
    let report = driver.run().unwrap();

    assert_eq!(report.total, 2);
    assert_eq!(report.succeeded, 2);
    assert_eq!(*loads.borrow(), vec![XTTS_V2_MODEL_ID.to_string()]);

    let out = temp.child("generated").child("nested");
    out.child("intro.wav").assert(predicate::path::is_file());
    out.child("utt_3.wav").assert(predicate::path::is_file());
    out.child("utt_2.wav").assert(predicate::path::missing());

    let written = hound::WavReader::open(out.child("intro.wav").path()).unwrap();
    assert_eq!(written.spec().sample_rate, 24_000);

    let calls = calls.borrow();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].0, "Bonjour tout le monde");
    assert_eq!(calls[1].1, "fr");
    assert!(calls.iter().all(|(_, _, reference)| reference == &temp.child("ref_voice.wav").path()));
}

#[test_log::test]
fn unsupported_language_is_counted_not_fatal() {
    let (temp, config) = setup(
        r#"[
            {"id": "a", "text": "one"},
            {"id": "b", "text": "two", "language": "xx"},
            {"id": "c", "text": "three"}
        ]"#,
    );
    let mut driver = BatchDriver::new(config, ToneLoader::default(), Vec::new());
    let report = driver.run().unwrap();

    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.failures[0].id, "b");

    let out = temp.child("generated").child("nested");
    out.child("a.wav").assert(predicate::path::is_file());
    out.child("b.wav").assert(predicate::path::missing());
    out.child("c.wav").assert(predicate::path::is_file());

    let printed = String::from_utf8(driver.into_output()).unwrap();
    assert!(predicate::str::contains("Completed: 2/3 files generated successfully").eval(&printed));
    assert!(predicate::str::contains("Failed: 1 files").eval(&printed));
    assert!(predicate::str::contains("  ✗ Error generating b:").eval(&printed));
}

#[test]
fn duplicate_ids_overwrite_earlier_output() {
    let (temp, config) = setup(
        r#"[
            {"id": "dup", "text": "a much longer first sentence"},
            {"id": "dup", "text": "short"}
        ]"#,
    );
    let mut driver = BatchDriver::new(config, ToneLoader::default(), Vec::new());
    let report = driver.run().unwrap();
    assert_eq!(report.succeeded, 2);

    let path = temp.child("generated").child("nested").child("dup.wav");
    let reader = hound::WavReader::open(path.path()).unwrap();
    assert_eq!(reader.duration() as usize, "short".len() * 100);
}

#[test]
fn existing_output_directory_is_reused() {
    let (temp, config) = setup(r#"[{"id": "keep", "text": "hello"}]"#);
    let out = temp.child("generated").child("nested");
    out.create_dir_all().unwrap();
    out.child("previous.wav").write_binary(b"old").unwrap();

    let mut driver = BatchDriver::new(config, ToneLoader::default(), Vec::new());
    driver.run().unwrap();

    out.child("previous.wav").assert(predicate::path::is_file());
    out.child("keep.wav").assert(predicate::path::is_file());
}
