//! Turning loosely shaped posting objects into [`Record`]s.
//!
//! Input is duck-typed: any field may be missing, `null`, a number where text
//! was expected, or spelled with one of the alternate keys listed below. Each
//! field resolves through its own fallback chain so one bad field never
//! poisons the rest of the record, and one bad entry never aborts the load.

use crate::error::{MatchError, Result};
use crate::normalize::split_skills;
use crate::{Record, RecordId};
use serde::Deserialize;
use serde_json::{Number, Value};

pub const FALLBACK_TITLE: &str = "Untitled";
pub const FALLBACK_COMPANY: &str = "Unknown";
pub const FALLBACK_LOCATION: &str = "Remote";

/// Raw posting as it appears in the source file. Nothing is trusted to be present.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawRecord {
    pub id: Option<Value>,
    pub title: Option<Value>,
    pub job_title: Option<Value>,
    pub company: Option<Value>,
    pub org: Option<Value>,
    pub location: Option<Value>,
    pub city: Option<Value>,
    pub sector: Option<Value>,
    pub domain: Option<Value>,
    pub education: Option<Value>,
    pub min_education: Option<Value>,
    pub skills: Option<Value>,
    pub description: Option<Value>,
    pub summary: Option<Value>,
    pub stipend: Option<Value>,
    pub salary: Option<Value>,
    pub duration: Option<Value>,
}

impl RawRecord {
    /// Resolve every field through its fallback chain. `position` is the entry's
    /// index in the raw input and becomes the id when none is given.
    pub fn into_record(self, position: usize) -> Record {
        Record {
            id: record_id(self.id.as_ref(), position),
            title: first_text(&[&self.title, &self.job_title], FALLBACK_TITLE),
            company: first_text(&[&self.company, &self.org], FALLBACK_COMPANY),
            location: first_text(&[&self.location, &self.city], FALLBACK_LOCATION),
            sector: first_text(&[&self.sector, &self.domain], ""),
            education: first_text(&[&self.education, &self.min_education], ""),
            skills: coerce_skills(self.skills.as_ref()),
            description: first_text(&[&self.description, &self.summary], ""),
            stipend: first_text(&[&self.stipend, &self.salary], ""),
            duration: first_text(&[&self.duration], ""),
        }
    }
}

/// Outcome of a load: the records that made it, and how many entries were dropped.
#[derive(Debug, Default, Clone)]
pub struct LoadedDataset {
    pub records: Vec<Record>,
    pub skipped: usize,
}

/// Map raw entries to records. Entries that are not JSON objects are skipped
/// and counted; ids still follow the original positions.
pub fn load_dataset(raw: &[Value]) -> LoadedDataset {
    load_dataset_from(raw.iter().cloned(), 0)
}

pub(crate) fn load_dataset_from<I>(raw: I, first_position: usize) -> LoadedDataset
where
    I: IntoIterator<Item = Value>,
{
    let mut out = LoadedDataset::default();
    for (offset, value) in raw.into_iter().enumerate() {
        let position = first_position + offset;
        if !value.is_object() {
            tracing::warn!(position, kind = value_kind(&value), "skipping non-object dataset entry");
            out.skipped += 1;
            continue;
        }
        match serde_json::from_value::<RawRecord>(value) {
            Ok(raw) => out.records.push(raw.into_record(position)),
            Err(err) => {
                tracing::warn!(position, error = %err, "skipping unreadable dataset entry");
                out.skipped += 1;
            }
        }
    }
    out
}

/// Raw entries of a JSON document whose top level must be an array.
pub fn read_entries_json(text: &str) -> Result<Vec<Value>> {
    let json: Value = serde_json::from_str(text)?;
    match json {
        Value::Array(entries) => Ok(entries),
        other => Err(MatchError::Dataset(format!(
            "expected a JSON array of postings, found {}",
            value_kind(&other)
        ))),
    }
}

/// Raw entries of a JSON-lines document, one per non-blank line.
pub fn read_entries_jsonl(text: &str) -> Result<Vec<Value>> {
    let mut entries = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        if line.trim().is_empty() { continue; }
        let value: Value = serde_json::from_str(line)
            .map_err(|e| MatchError::Dataset(format!("line {}: {e}", lineno + 1)))?;
        entries.push(value);
    }
    Ok(entries)
}

pub fn parse_dataset_json(text: &str) -> Result<LoadedDataset> {
    Ok(load_dataset_from(read_entries_json(text)?, 0))
}

pub fn parse_dataset_jsonl(text: &str) -> Result<LoadedDataset> {
    Ok(load_dataset_from(read_entries_jsonl(text)?, 0))
}

fn record_id(value: Option<&Value>, position: usize) -> RecordId {
    match value {
        None | Some(Value::Null) => RecordId::Num(Number::from(position)),
        Some(Value::Number(n)) => RecordId::Num(n.clone()),
        Some(Value::String(s)) => RecordId::Text(s.clone()),
        Some(other) => RecordId::Text(other.to_string()),
    }
}

/// Text form of a scalar; arrays and objects are treated as absent.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn first_text(candidates: &[&Option<Value>], fallback: &str) -> String {
    candidates
        .iter()
        .copied()
        .filter_map(Option::as_ref)
        .find_map(scalar_text)
        .unwrap_or_else(|| fallback.to_string())
}

/// Arrays are kept element for element, blanks included; only a delimited
/// string is split and cleaned.
fn coerce_skills(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        Some(Value::String(s)) => split_skills(s),
        _ => Vec::new(),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fills_fallbacks_for_missing_fields() {
        let loaded = load_dataset(&[json!({})]);
        let r = &loaded.records[0];
        assert_eq!(r.id, RecordId::num(0));
        assert_eq!(r.title, "Untitled");
        assert_eq!(r.company, "Unknown");
        assert_eq!(r.location, "Remote");
        assert_eq!(r.sector, "");
        assert_eq!(r.education, "");
        assert!(r.skills.is_empty());
        assert_eq!(r.duration, "");
    }

    #[test]
    fn uses_alternate_keys() {
        let loaded = load_dataset(&[json!({
            "job_title": "Data Intern",
            "org": "Acme",
            "city": "Pune",
            "domain": "Analytics",
            "min_education": "B.Sc",
            "summary": "Crunch numbers",
            "salary": 8000
        })]);
        let r = &loaded.records[0];
        assert_eq!(r.title, "Data Intern");
        assert_eq!(r.company, "Acme");
        assert_eq!(r.location, "Pune");
        assert_eq!(r.sector, "Analytics");
        assert_eq!(r.education, "B.Sc");
        assert_eq!(r.description, "Crunch numbers");
        assert_eq!(r.stipend, "8000");
    }

    #[test]
    fn primary_key_wins_over_alternate() {
        let loaded = load_dataset(&[json!({ "title": "A", "job_title": "B", "location": null, "city": "Delhi" })]);
        assert_eq!(loaded.records[0].title, "A");
        assert_eq!(loaded.records[0].location, "Delhi");
    }

    #[test]
    fn empty_string_is_present() {
        let loaded = load_dataset(&[json!({ "location": "" })]);
        assert_eq!(loaded.records[0].location, "");
    }

    #[test]
    fn coerces_skill_strings_and_arrays() {
        let loaded = load_dataset(&[
            json!({ "skills": "React, Node;SQL|  " }),
            json!({ "skills": ["Python", " ", 3, null, "Go "] }),
            json!({ "skills": 42 }),
        ]);
        assert_eq!(loaded.records[0].skills, vec!["React", "Node", "SQL"]);
        assert_eq!(loaded.records[1].skills, vec!["Python", " ", "3", "null", "Go "]);
        assert!(loaded.records[2].skills.is_empty());
    }

    #[test]
    fn skips_non_objects_but_keeps_positions() {
        let loaded = load_dataset(&[json!("junk"), json!({ "title": "Kept" }), json!(7)]);
        assert_eq!(loaded.skipped, 2);
        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.records[0].id, RecordId::num(1));
    }

    #[test]
    fn keeps_explicit_ids() {
        let loaded = load_dataset(&[json!({ "id": "abc" }), json!({ "id": 17 })]);
        assert_eq!(loaded.records[0].id, RecordId::Text("abc".into()));
        assert_eq!(loaded.records[1].id, RecordId::num(17));
    }

    #[test]
    fn numeric_ids_are_kept_verbatim() {
        let loaded = load_dataset(&[json!({ "id": 1.5 }), json!({ "id": 1.0 })]);
        assert_eq!(serde_json::to_value(&loaded.records[0].id).unwrap(), json!(1.5));
        assert_eq!(loaded.records[0].id.to_string(), "1.5");
        assert_eq!(loaded.records[1].id.to_string(), "1");
    }

    #[test]
    fn rejects_non_array_documents() {
        assert!(matches!(parse_dataset_json(r#"{"title":"x"}"#), Err(MatchError::Dataset(_))));
        assert!(matches!(parse_dataset_json("[1, 2"), Err(MatchError::Json(_))));
        assert!(parse_dataset_json("[]").unwrap().records.is_empty());
    }

    #[test]
    fn parses_json_lines() {
        let loaded = parse_dataset_jsonl("{\"title\":\"a\"}\n\n{\"title\":\"b\"}\n").unwrap();
        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.records[1].id, RecordId::num(1));
        let err = parse_dataset_jsonl("{\"title\":\"a\"}\n{oops").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
