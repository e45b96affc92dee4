use crate::catalog::{Course, Institution, RequirementSet, SubjectKey};
use crate::eligibility::scoring::MatchScorer;
use crate::eligibility::{Comparisons, InstitutionMatch, MatchResult, RequirementComparison};
use crate::profile::AcademicProfile;

/// Mark of the first submitted subject carrying `key`, or 0 when none does.
pub fn lookup_mark(profile: &AcademicProfile, key: &SubjectKey) -> i32 {
    profile.subject(key).map(|s| s.mark).unwrap_or(0)
}

pub fn compare_requirements(requirements: &RequirementSet, profile: &AcademicProfile) -> Comparisons {
    requirements
        .iter()
        .map(|(key, required)| {
            let user_score = lookup_mark(profile, key);
            (
                key.clone(),
                RequirementComparison {
                    required,
                    user_score,
                    met: user_score >= i32::from(required),
                },
            )
        })
        .collect()
}

/// True when every comparison is met; an empty set is eligible.
pub fn is_eligible(comparisons: &Comparisons) -> bool {
    comparisons.values().all(|c| c.met)
}

pub fn evaluate_course(
    course: &Course,
    profile: &AcademicProfile,
    scorer: &mut dyn MatchScorer,
) -> MatchResult {
    let comparisons = compare_requirements(&course.requirements, profile);
    let requirements_met = is_eligible(&comparisons);
    MatchResult {
        course_id: course.id,
        course_name: course.name.clone(),
        institution: course.institution.clone(),
        match_score: scorer.match_score(profile, &course.category),
        requirements_met,
        comparisons,
    }
}

pub fn evaluate_institution(institution: &Institution, profile: &AcademicProfile) -> InstitutionMatch {
    let comparisons = compare_requirements(&institution.requirements, profile);
    InstitutionMatch {
        institution_id: institution.id.clone(),
        name: institution.name.clone(),
        institution_type: institution.institution_type,
        requirements_met: is_eligible(&comparisons),
        comparisons,
        offered_courses: institution.courses.len(),
    }
}
