use crate::normalize::normalize;
use crate::{Record, RecordId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Normalized education / sector / location / skill token to the records carrying it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvertedIndex {
    pub postings: BTreeMap<String, BTreeSet<RecordId>>,
    pub num_records: usize,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    pub fn build(records: &[Record]) -> Self {
        let mut index = Self::new();
        for r in records {
            for s in &r.skills {
                index.insert(s, &r.id);
            }
            index.insert(&r.education, &r.id);
            index.insert(&r.location, &r.id);
            index.insert(&r.sector, &r.id);
        }
        index.num_records = records.len();
        index
    }

    fn insert(&mut self, value: &str, id: &RecordId) {
        let key = normalize(value);
        if key.is_empty() { return; }
        self.postings.entry(key).or_default().insert(id.clone());
    }

    pub fn len(&self) -> usize { self.postings.len() }

    pub fn is_empty(&self) -> bool { self.postings.is_empty() }

    /// Records whose field normalizes exactly to `token`.
    pub fn lookup(&self, token: &str) -> Option<&BTreeSet<RecordId>> {
        self.postings.get(&normalize(token))
    }

    /// Records with any indexed field containing `token`.
    pub fn lookup_containing(&self, token: &str) -> BTreeSet<RecordId> {
        let needle = normalize(token);
        if needle.is_empty() { return BTreeSet::new(); }
        self.postings
            .iter()
            .filter(|(key, _)| key.contains(&needle))
            .flat_map(|(_, ids)| ids.iter().cloned())
            .collect()
    }

    pub fn record_ids(&self) -> BTreeSet<&RecordId> {
        self.postings.values().flatten().collect()
    }
}
