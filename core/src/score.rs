//! Multi-factor fit score of a posting against a profile.
//!
//! Total = skills·w + location·w + education·w + sector·w + tie-break.
//! The tie-break term is at most 0.0099, small enough that it only reorders
//! postings whose weighted scores are (nearly) equal.

use crate::error::MatchError;
use crate::expand::expand;
use crate::normalize::normalize;
use crate::{Breakdown, Profile, Record, RecordId, ScoredResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

pub const LOCATION_PARTIAL: f64 = 0.8;
pub const SECTOR_PARTIAL: f64 = 0.75;
const REMOTE: &str = "remote";
const TIE_MODULUS: u64 = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub skills: f64,
    pub location: f64,
    pub education: f64,
    pub sector: f64,
}

impl Weights {
    pub const DEFAULT: Weights = Weights { skills: 0.52, location: 0.20, education: 0.16, sector: 0.12 };

    pub fn sum(&self) -> f64 {
        self.skills + self.location + self.education + self.sector
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        let all = [self.skills, self.location, self.education, self.sector];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(MatchError::InvalidWeights("weights must be finite and non-negative".into()));
        }
        if self.sum() <= 0.0 {
            return Err(MatchError::InvalidWeights("at least one weight must be positive".into()));
        }
        Ok(())
    }

    fn total(&self, b: &Breakdown) -> f64 {
        b.skills * self.skills + b.location * self.location + b.education * self.education + b.sector * self.sector
    }
}

impl Default for Weights {
    fn default() -> Self { Self::DEFAULT }
}

impl fmt::Display for Weights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "skills={},location={},education={},sector={}",
            self.skills, self.location, self.education, self.sector
        )
    }
}

/// Parses `skills=0.5,location=0.2,...`. Factors not named keep their default.
impl FromStr for Weights {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut w = Weights::DEFAULT;
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| MatchError::InvalidWeights(format!("expected factor=value, got '{part}'")))?;
            let value: f64 = value
                .trim()
                .parse()
                .map_err(|_| MatchError::InvalidWeights(format!("'{}' is not a number", value.trim())))?;
            match normalize(key).as_str() {
                "skills" | "skill" => w.skills = value,
                "location" => w.location = value,
                "education" => w.education = value,
                "sector" => w.sector = value,
                other => return Err(MatchError::InvalidWeights(format!("unknown factor '{other}'"))),
            }
        }
        w.validate()?;
        Ok(w)
    }
}

/// A profile with its comparisons precomputed once per query.
#[derive(Debug, Clone)]
pub struct PreparedProfile {
    /// Normalized, non-blank skill tokens in entry order.
    pub skills: Vec<String>,
    /// Normalized union of every token's expansion.
    pub candidates: BTreeSet<String>,
    pub education: String,
    pub sector: String,
    pub location: String,
}

impl PreparedProfile {
    pub fn new<S: AsRef<str>>(profile: &Profile, skill_vocabulary: &[S]) -> Self {
        let skills: Vec<String> = profile
            .skills
            .iter()
            .map(|s| normalize(s))
            .filter(|s| !s.is_empty())
            .collect();
        let candidates = skills
            .iter()
            .flat_map(|tok| expand(tok, skill_vocabulary))
            .map(|c| normalize(&c))
            .filter(|c| !c.is_empty())
            .collect();
        Self {
            skills,
            candidates,
            education: normalize(&profile.education),
            sector: normalize(&profile.sector),
            location: normalize(&profile.location),
        }
    }
}

/// Fraction of the record's skills covered by the expanded candidates.
/// A blank record skill is contained in every candidate, so it counts as covered.
pub fn skills_score(record_skills: &[String], candidates: &BTreeSet<String>) -> f64 {
    let matched = record_skills
        .iter()
        .map(|s| normalize(s))
        .filter(|ds| candidates.iter().any(|c| ds.contains(c.as_str()) || c.contains(ds.as_str())))
        .count();
    (matched as f64 / record_skills.len().max(1) as f64).min(1.0)
}

/// Arguments are already normalized. A blank record location is contained in
/// every profile location and earns the partial credit.
pub fn location_score(record: &str, profile: &str) -> f64 {
    if profile.is_empty() || record == REMOTE || profile == REMOTE || record == profile {
        1.0
    } else if record.contains(profile) || profile.contains(record) {
        LOCATION_PARTIAL
    } else {
        0.0
    }
}

/// Arguments are already normalized.
pub fn education_score(record: &str, profile: &str) -> f64 {
    if !profile.is_empty() && record.starts_with(profile) { 1.0 } else { 0.0 }
}

/// Arguments are already normalized.
pub fn sector_score(record: &str, profile: &str) -> f64 {
    if profile.is_empty() {
        0.0
    } else if record == profile {
        1.0
    } else if record.contains(profile) {
        SECTOR_PARTIAL
    } else {
        0.0
    }
}

/// Deterministic term in `0.0..=0.0099` from the profile skills and the record id.
pub fn tie_break<S: AsRef<str>>(skills: &[S], id: &RecordId) -> f64 {
    let joined = skills.iter().map(|s| s.as_ref()).collect::<Vec<_>>().join("|");
    let seed = format!("{joined}::{id}");
    let hash = seed
        .encode_utf16()
        .fold(0u64, |h, unit| (h * 31 + u64::from(unit)) % TIE_MODULUS);
    (hash % 100) as f64 / 10_000.0
}

pub fn score_record(prepared: &PreparedProfile, record: &Record, weights: &Weights) -> ScoredResult {
    let breakdown = Breakdown {
        skills: skills_score(&record.skills, &prepared.candidates),
        location: location_score(&normalize(&record.location), &prepared.location),
        education: education_score(&normalize(&record.education), &prepared.education),
        sector: sector_score(&normalize(&record.sector), &prepared.sector),
    };
    let score = weights.total(&breakdown) + tie_break(&prepared.skills, &record.id);
    ScoredResult { record: record.clone(), score, breakdown }
}

/// Score every record against `profile`, preserving input order.
pub fn score<S: AsRef<str>>(
    profile: &Profile,
    records: &[Record],
    skill_vocabulary: &[S],
    weights: &Weights,
) -> Vec<ScoredResult> {
    let prepared = PreparedProfile::new(profile, skill_vocabulary);
    records.iter().map(|r| score_record(&prepared, r, weights)).collect()
}
