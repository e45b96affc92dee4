pub mod validate;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::{InstitutionType, SubjectKey};

pub use validate::{check_profile, validate_profile, ValidationIssue, REQUIRED_SUBJECTS};

/// One submitted subject mark. `key` is resolved from `name` at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectResult {
    pub name: String,
    pub mark: i32,
    pub level: Option<String>,
    pub key: Option<SubjectKey>,
}

impl SubjectResult {
    pub fn new(name: impl Into<String>, mark: i32) -> Self {
        let name = name.into();
        let key = SubjectKey::resolve(&name);
        Self {
            name,
            mark,
            level: None,
            key,
        }
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }
}

/// A student's submitted results, interests and institution preferences.
///
/// Subjects keep submission order. Serialized in the same shape the
/// results form submits, so keys are always re-resolved on load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ProfileSubmission", into = "ProfileSubmission")]
pub struct AcademicProfile {
    pub subjects: Vec<SubjectResult>,
    pub interests: Vec<String>,
    pub institution_types: Vec<InstitutionType>,
}

impl AcademicProfile {
    pub fn new(subjects: Vec<SubjectResult>) -> Self {
        Self {
            subjects,
            ..Self::default()
        }
    }

    pub fn with_interests(mut self, interests: Vec<String>) -> Self {
        self.interests = interests;
        self
    }

    pub fn with_institution_types(mut self, types: Vec<InstitutionType>) -> Self {
        self.institution_types = types;
        self
    }

    pub fn from_submission(submission: ProfileSubmission) -> Self {
        let subjects = submission
            .subjects
            .into_iter()
            .map(|entry| SubjectResult {
                key: SubjectKey::resolve(&entry.name),
                name: entry.name,
                mark: entry.mark,
                level: entry.level,
            })
            .collect();
        let institution_types = submission
            .preferences
            .institution_types
            .iter()
            .filter_map(|raw| match raw.parse::<InstitutionType>() {
                Ok(kind) => Some(kind),
                Err(err) => {
                    warn!("ignoring institution preference: {err}");
                    None
                }
            })
            .collect();
        Self {
            subjects,
            interests: submission.interests,
            institution_types,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed reading results: {}", path.display()))?;
        let submission: ProfileSubmission = serde_json::from_str(&data)
            .with_context(|| format!("failed parsing results JSON: {}", path.display()))?;
        Ok(Self::from_submission(submission))
    }

    /// Mean of all submitted marks, rounded half away from zero.
    pub fn average_mark(&self) -> Option<i32> {
        if self.subjects.is_empty() {
            return None;
        }
        let total: i64 = self.subjects.iter().map(|s| i64::from(s.mark)).sum();
        let average = total as f64 / self.subjects.len() as f64;
        Some(average.round() as i32)
    }

    pub fn subject(&self, key: &SubjectKey) -> Option<&SubjectResult> {
        self.subjects.iter().find(|s| s.key.as_ref() == Some(key))
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileSubmission {
    #[serde(default)]
    pub subjects: Vec<SubmittedSubject>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub preferences: SubmittedPreferences,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmittedSubject {
    pub name: String,
    pub mark: i32,
    #[serde(default)]
    pub level: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmittedPreferences {
    #[serde(default, rename = "institutionTypes")]
    pub institution_types: Vec<String>,
}

impl From<ProfileSubmission> for AcademicProfile {
    fn from(value: ProfileSubmission) -> Self {
        Self::from_submission(value)
    }
}

impl From<AcademicProfile> for ProfileSubmission {
    fn from(value: AcademicProfile) -> Self {
        Self {
            subjects: value
                .subjects
                .into_iter()
                .map(|s| SubmittedSubject {
                    name: s.name,
                    mark: s.mark,
                    level: s.level,
                })
                .collect(),
            interests: value.interests,
            preferences: SubmittedPreferences {
                institution_types: value
                    .institution_types
                    .iter()
                    .map(|kind| kind.as_slug().to_string())
                    .collect(),
            },
        }
    }
}
