pub mod evaluator;
pub mod gaps;
pub mod history;
pub mod scoring;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{InstitutionType, SubjectKey};

/// Score at or above which a match is shown as strong.
pub const STRONG_MATCH_THRESHOLD: u8 = 80;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequirementComparison {
    pub required: u8,
    pub user_score: i32,
    pub met: bool,
}

pub type Comparisons = BTreeMap<SubjectKey, RequirementComparison>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchResult {
    pub course_id: u32,
    pub course_name: String,
    pub institution: String,
    pub match_score: u8,
    pub requirements_met: bool,
    pub comparisons: Comparisons,
}

impl MatchResult {
    pub fn passed_count(&self) -> usize {
        self.comparisons.values().filter(|c| c.met).count()
    }

    pub fn failed_count(&self) -> usize {
        self.comparisons.len().saturating_sub(self.passed_count())
    }

    pub fn tier(&self) -> MatchTier {
        MatchTier::from_score(self.match_score)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Moderate,
    Strong,
}

impl MatchTier {
    pub fn from_score(score: u8) -> Self {
        if score >= STRONG_MATCH_THRESHOLD {
            Self::Strong
        } else {
            Self::Moderate
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstitutionMatch {
    pub institution_id: String,
    pub name: String,
    pub institution_type: InstitutionType,
    pub requirements_met: bool,
    pub comparisons: Comparisons,
    pub offered_courses: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubjectGap {
    pub course_id: u32,
    pub course_name: String,
    pub subject: SubjectKey,
    pub user_score: i32,
    pub required: u8,
    pub shortfall: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchRecord {
    pub course_id: u32,
    pub course_name: String,
    pub match_score: u8,
    pub requirements_met: bool,
    pub catalog_fingerprint: String,
    pub captured_at: DateTime<Utc>,
}
