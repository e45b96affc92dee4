use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::SubjectKey;
use crate::profile::AcademicProfile;

/// Subjects every submission must include.
pub const REQUIRED_SUBJECTS: [SubjectKey; 2] = [SubjectKey::Mathematics, SubjectKey::English];

/// Why a submission was rejected. Messages are user-facing.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum ValidationIssue {
    #[error("Please submit at least one subject.")]
    EmptyProfile,
    #[error("Please include Mathematics and English subjects (missing {0}).")]
    MissingRequiredSubject(SubjectKey),
    #[error("Please ensure all marks are between 0 and 100 ({subject}: {mark}).")]
    OutOfRangeMark { subject: String, mark: i32 },
}

/// Reports the first failed rule: empty profile, then required subjects, then mark range.
pub fn check_profile(profile: &AcademicProfile) -> Result<(), ValidationIssue> {
    if profile.subjects.is_empty() {
        return Err(ValidationIssue::EmptyProfile);
    }

    if let Some(missing) = REQUIRED_SUBJECTS
        .iter()
        .find(|required| profile.subject(required).is_none())
    {
        return Err(ValidationIssue::MissingRequiredSubject(missing.clone()));
    }

    if let Some(bad) = profile
        .subjects
        .iter()
        .find(|s| !(0..=100).contains(&s.mark))
    {
        return Err(ValidationIssue::OutOfRangeMark {
            subject: bad.name.clone(),
            mark: bad.mark,
        });
    }

    Ok(())
}

pub fn validate_profile(profile: &AcademicProfile) -> bool {
    check_profile(profile).is_ok()
}
