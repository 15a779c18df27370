//! Utterance records read from the JSON batch file.
//!
//! The batch file is a JSON array of objects. Each object may carry `id`,
//! `text` and `language`; any other field is ignored. A field holding a falsy
//! value (`null`, `false`, `0`, `""`, `[]` or `{}`) counts as absent. Records
//! whose text is blank after trimming are dropped silently, and the survivors
//! keep the order of the array.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{CloneCastError, CloneCastResult};
use crate::DEFAULT_LANGUAGE;

/// Number of characters shown in the progress preview of a record's text
pub const PREVIEW_CHARS: usize = 50;

/// One utterance to synthesize
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtteranceRecord {
    /// Identifier, also the output file stem
    pub id: String,
    /// Trimmed, non-empty text
    pub text: String,
    /// Language code passed to the model
    pub language: String,
}

impl UtteranceRecord {
    /// Output path for this record inside `out_dir`
    #[must_use]
    pub fn output_path(&self, out_dir: &Path) -> PathBuf {
        out_dir.join(format!("{}.wav", self.id))
    }

    /// Text truncated to `max_chars` characters, with `...` appended when cut
    #[must_use]
    pub fn preview(&self, max_chars: usize) -> String {
        if self.text.chars().count() > max_chars {
            let head: String = self.text.chars().take(max_chars).collect();
            format!("{head}...")
        } else {
            self.text.clone()
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n.abs() > 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

/// Field `key` of `entry`, or `None` when it is missing or falsy
fn field<'a>(entry: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    entry.get(key).filter(|value| is_truthy(value))
}

/// Fallback id for the entry at 0-based `index` of the original array
#[must_use]
pub fn fallback_id(index: usize) -> String {
    format!("utt_{}", index + 1)
}

/// Effective default language: `default_language`, or `"en"` when it is empty
#[must_use]
pub fn effective_default_language(default_language: &str) -> &str {
    if default_language.is_empty() {
        DEFAULT_LANGUAGE
    } else {
        default_language
    }
}

/// Parse records from the text of a batch file
///
/// # Errors
///
/// Returns [`CloneCastError::InputParse`] if the text is not a JSON array of
/// objects, or if a truthy `id` is not a string or number, or a truthy `text`
/// is not a string. A truthy non-string `language` is kept as its JSON text
/// and left for the model to reject.
pub fn parse_records(json: &str, default_language: &str) -> CloneCastResult<Vec<UtteranceRecord>> {
    let entries: Vec<Map<String, Value>> = serde_json::from_str(json)?;
    let default_language = effective_default_language(default_language);

    let mut records = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let id = match field(entry, "id") {
            None => fallback_id(index),
            Some(Value::String(id)) => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            Some(other) => {
                return Err(CloneCastError::input_parse(format!(
                    "entry {}: `id` must be a string or number, got {other}",
                    index + 1
                )))
            }
        };
        let text = match field(entry, "text") {
            None => String::new(),
            Some(Value::String(text)) => text.trim().to_string(),
            Some(other) => {
                return Err(CloneCastError::input_parse(format!(
                    "entry {}: `text` must be a string, got {other}",
                    index + 1
                )))
            }
        };
        let language = match field(entry, "language") {
            None => default_language.to_string(),
            Some(Value::String(language)) => language.clone(),
            Some(other) => other.to_string(),
        };

        if text.is_empty() {
            debug!(index, id = %id, "Dropping entry with empty text");
            continue;
        }

        records.push(UtteranceRecord { id, text, language });
    }

    Ok(records)
}

/// Load records from a JSON batch file
///
/// # Errors
///
/// Returns [`CloneCastError::InputNotFound`] if the file does not exist and
/// [`CloneCastError::InputParse`] if it cannot be read or parsed.
pub fn load_records_from_json(
    path: &Path,
    default_language: &str,
) -> CloneCastResult<Vec<UtteranceRecord>> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => CloneCastError::input_not_found(path),
        _ => CloneCastError::input_parse(format!("{}: {e}", path.display())),
    })?;

    let records = parse_records(&content, default_language)?;
    debug!(path = %path.display(), records = records.len(), "Parsed batch file");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn record(id: &str, text: &str, language: &str) -> UtteranceRecord {
        UtteranceRecord {
            id: id.to_string(),
            text: text.to_string(),
            language: language.to_string(),
        }
    }

    #[test]
    fn test_blank_entries_dropped_and_ids_use_original_position() {
        let json = r#"[
            {"text": "Hello"},
            {"id": "greet2", "text": "  "},
            {"text": "Bye", "language": "fr"}
        ]"#;
        let records = parse_records(json, "en").unwrap();
        assert_eq!(
            records,
            vec![record("utt_1", "Hello", "en"), record("utt_3", "Bye", "fr")]
        );
    }

    #[test]
    fn test_text_is_trimmed() {
        let records = parse_records(r#"[{"id": "a", "text": "  padded \n"}]"#, "en").unwrap();
        assert_eq!(records[0].text, "padded");
    }

    #[rstest]
    #[case(r#"[{"id": "", "text": "x"}]"#, "utt_1")]
    #[case(r#"[{"id": null, "text": "x"}]"#, "utt_1")]
    #[case(r#"[{"text": "x"}]"#, "utt_1")]
    #[case(r#"[{"id": "custom", "text": "x"}]"#, "custom")]
    #[case(r#"[{"id": 42, "text": "x"}]"#, "42")]
    #[case(r#"[{"id": 0, "text": "x"}]"#, "utt_1")]
    #[case(r#"[{"id": 0.0, "text": "x"}]"#, "utt_1")]
    #[case(r#"[{"id": false, "text": "x"}]"#, "utt_1")]
    #[case(r#"[{"id": [], "text": "x"}]"#, "utt_1")]
    #[case(r#"[{"id": {}, "text": "x"}]"#, "utt_1")]
    fn test_id_resolution(#[case] json: &str, #[case] expected: &str) {
        let records = parse_records(json, "en").unwrap();
        assert_eq!(records[0].id, expected);
    }

    #[rstest]
    #[case(r#"[{"text": "x"}]"#, "de", "de")]
    #[case(r#"[{"text": "x", "language": ""}]"#, "de", "de")]
    #[case(r#"[{"text": "x", "language": null}]"#, "de", "de")]
    #[case(r#"[{"text": "x"}]"#, "", "en")]
    #[case(r#"[{"text": "x", "language": "ja"}]"#, "", "ja")]
    #[case(r#"[{"text": "x", "language": false}]"#, "de", "de")]
    #[case(r#"[{"text": "x", "language": 0}]"#, "de", "de")]
    #[case(r#"[{"text": "x", "language": []}]"#, "de", "de")]
    #[case(r#"[{"text": "x", "language": 5}]"#, "de", "5")]
    #[case(r#"[{"text": "x", "language": true}]"#, "de", "true")]
    fn test_language_resolution(
        #[case] json: &str,
        #[case] default_language: &str,
        #[case] expected: &str,
    ) {
        let records = parse_records(json, default_language).unwrap();
        assert_eq!(records[0].language, expected);
    }

    #[rstest]
    #[case(r#"{"id": "a"}"#)]
    #[case(r#"{"id": "a", "text": null}"#)]
    #[case(r#"{"id": "a", "text": false}"#)]
    #[case(r#"{"id": "a", "text": 0}"#)]
    #[case(r#"{"id": "a", "text": ""}"#)]
    #[case(r#"{"id": "a", "text": []}"#)]
    #[case(r#"{"id": "a", "text": {}}"#)]
    fn test_falsy_text_drops_only_that_entry(#[case] entry: &str) {
        let json = format!(r#"[{entry}, {{"text": "Hi"}}]"#);
        let records = parse_records(&json, "en").unwrap();
        assert_eq!(records, vec![record("utt_2", "Hi", "en")]);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let records =
            parse_records(r#"[{"text": "x", "speaker": "bob", "speed": 1.2}]"#, "en").unwrap();
        assert_eq!(records.len(), 1);
    }

    #[rstest]
    #[case(r#"{"items": []}"#)]
    #[case(r#"["just a string"]"#)]
    #[case(r#"[{"text": 5}]"#)]
    #[case(r#"[{"text": true}]"#)]
    #[case(r#"[{"text": ["x"]}]"#)]
    #[case(r#"[{"text": "x", "id": true}]"#)]
    #[case(r#"[{"text": "x", "id": ["a"]}]"#)]
    #[case(r#"[{"text": "x""#)]
    fn test_malformed_input_is_parse_error(#[case] json: &str) {
        let err = parse_records(json, "en").unwrap_err();
        assert!(matches!(err, CloneCastError::InputParse { .. }), "{err:?}");
    }

    #[rstest]
    #[case("short", "short")]
    #[case(&"a".repeat(50), &"a".repeat(50))]
    #[case(&"a".repeat(51), &format!("{}...", "a".repeat(50)))]
    #[case(&"é".repeat(60), &format!("{}...", "é".repeat(50)))]
    fn test_preview(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(record("x", text, "en").preview(PREVIEW_CHARS), expected);
    }

    #[test]
    fn test_output_path() {
        let path = record("greet", "hi", "en").output_path(Path::new("out/nested"));
        assert_eq!(path, Path::new("out/nested").join("greet.wav"));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        let err = load_records_from_json(&missing, "en").unwrap_err();
        assert_eq!(err, CloneCastError::input_not_found(&missing));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        fs::write(&path, r#"[{"id": "one", "text": "Hola", "language": "es"}]"#).unwrap();
        let records = load_records_from_json(&path, "en").unwrap();
        assert_eq!(records, vec![record("one", "Hola", "es")]);
    }
}
