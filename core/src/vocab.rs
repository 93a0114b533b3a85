use crate::normalize::normalize;
use crate::Record;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

/// Suggestions returned when the query is empty.
pub const SUGGEST_DEFAULT_LIMIT: usize = 30;
/// Upper bound on suggestions for a non-empty query.
pub const SUGGEST_MATCH_LIMIT: usize = 40;

/// Distinct display values seen in a dataset, sorted case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    pub educations: Vec<String>,
    pub sectors: Vec<String>,
    pub locations: Vec<String>,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VocabField {
    Education,
    Sector,
    Location,
    Skills,
}

impl FromStr for VocabField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "education" | "educations" => Ok(VocabField::Education),
            "sector" | "sectors" => Ok(VocabField::Sector),
            "location" | "locations" => Ok(VocabField::Location),
            "skill" | "skills" => Ok(VocabField::Skills),
            other => Err(format!("unknown vocabulary field '{other}'")),
        }
    }
}

impl Vocabulary {
    pub fn build(records: &[Record]) -> Self {
        let mut educations = BTreeSet::new();
        let mut sectors = BTreeSet::new();
        let mut locations = BTreeSet::new();
        let mut skills = BTreeSet::new();

        for r in records {
            insert_non_empty(&mut educations, &r.education);
            insert_non_empty(&mut sectors, &r.sector);
            insert_non_empty(&mut locations, &r.location);
            for s in &r.skills {
                insert_non_empty(&mut skills, s);
            }
        }

        Self {
            educations: sorted_for_display(educations),
            sectors: sorted_for_display(sectors),
            locations: sorted_for_display(locations),
            skills: sorted_for_display(skills),
        }
    }

    pub fn field(&self, field: VocabField) -> &[String] {
        match field {
            VocabField::Education => &self.educations,
            VocabField::Sector => &self.sectors,
            VocabField::Location => &self.locations,
            VocabField::Skills => &self.skills,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.educations.is_empty() && self.sectors.is_empty() && self.locations.is_empty() && self.skills.is_empty()
    }

    /// Autocomplete candidates for what the user has typed so far.
    ///
    /// Education matches by prefix so abbreviations like `B` surface `B.Tech`;
    /// the other fields match anywhere in the value. For skills the query may
    /// be the whole comma-separated entry and only the last token counts.
    pub fn suggest(&self, field: VocabField, query: &str) -> Vec<String> {
        let list = self.field(field);
        let q = match field {
            VocabField::Skills => normalize(query.rsplit(',').next().unwrap_or("")),
            _ => normalize(query),
        };
        if q.is_empty() {
            return list.iter().take(SUGGEST_DEFAULT_LIMIT).cloned().collect();
        }
        list.iter()
            .filter(|v| {
                let nv = normalize(v);
                match field {
                    VocabField::Education => nv.starts_with(&q),
                    _ => nv.contains(&q),
                }
            })
            .take(SUGGEST_MATCH_LIMIT)
            .cloned()
            .collect()
    }
}

fn insert_non_empty(set: &mut BTreeSet<String>, value: &str) {
    if !value.is_empty() {
        set.insert(value.to_string());
    }
}

fn sorted_for_display(set: BTreeSet<String>) -> Vec<String> {
    let mut out: Vec<String> = set.into_iter().collect();
    // Stable sort over a byte-ordered set: equal lowercase keys keep a fixed order.
    out.sort_by_cached_key(|s| s.to_lowercase());
    out
}
