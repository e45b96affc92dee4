use chrono::NaiveDate;

use crate::catalog::{Catalog, Course, Institution, InstitutionType};
use crate::eligibility::evaluator::{evaluate_course, evaluate_institution};
use crate::eligibility::scoring::MatchScorer;
use crate::eligibility::{InstitutionMatch, MatchResult};
use crate::profile::AcademicProfile;

/// Minimum match score shown when the user has not picked one.
pub const DEFAULT_MIN_SCORE: u8 = 70;

/// Evaluates every catalog course, best score first, ties by course id.
pub fn build_recommendations(
    catalog: &Catalog,
    profile: &AcademicProfile,
    scorer: &mut dyn MatchScorer,
) -> Vec<MatchResult> {
    let mut results: Vec<MatchResult> = catalog
        .courses
        .iter()
        .map(|course| evaluate_course(course, profile, scorer))
        .collect();
    results.sort_by(|a, b| {
        b.match_score
            .cmp(&a.match_score)
            .then_with(|| a.course_id.cmp(&b.course_id))
    });
    results
}

pub fn filter_by_min_score(results: &[MatchResult], min_score: u8) -> Vec<MatchResult> {
    results
        .iter()
        .filter(|r| r.match_score >= min_score)
        .cloned()
        .collect()
}

/// Case-insensitive search over course name and institution. An empty term matches all.
pub fn search_courses<'a>(courses: &'a [Course], term: &str) -> Vec<&'a Course> {
    let term = term.trim().to_lowercase();
    courses
        .iter()
        .filter(|c| {
            c.name.to_lowercase().contains(&term) || c.institution.to_lowercase().contains(&term)
        })
        .collect()
}

/// Case-insensitive search over institution name and location.
pub fn search_institutions<'a>(institutions: &'a [Institution], term: &str) -> Vec<&'a Institution> {
    let term = term.trim().to_lowercase();
    institutions
        .iter()
        .filter(|i| {
            i.name.to_lowercase().contains(&term) || i.location.to_lowercase().contains(&term)
        })
        .collect()
}

/// Keeps institutions of the selected types; no selection keeps everything.
pub fn filter_institutions_by_type<'a>(
    institutions: &[&'a Institution],
    types: &[InstitutionType],
) -> Vec<&'a Institution> {
    institutions
        .iter()
        .copied()
        .filter(|i| types.is_empty() || types.contains(&i.institution_type))
        .collect()
}

pub fn match_institutions(
    institutions: &[&Institution],
    profile: &AcademicProfile,
) -> Vec<InstitutionMatch> {
    institutions
        .iter()
        .map(|institution| evaluate_institution(institution, profile))
        .collect()
}

/// Whole days until the nearest deadline after `today`; 0 when none remain.
pub fn days_until_nearest_deadline<'a>(
    deadlines: impl IntoIterator<Item = &'a NaiveDate>,
    today: NaiveDate,
) -> i64 {
    deadlines
        .into_iter()
        .filter(|deadline| **deadline > today)
        .min()
        .map(|nearest| (*nearest - today).num_days())
        .unwrap_or(0)
}

/// Deadlines of the recommended courses still present in `catalog`.
pub fn recommended_deadlines<'a>(
    catalog: &'a Catalog,
    recommendations: &'a [MatchResult],
) -> impl Iterator<Item = &'a NaiveDate> + 'a {
    recommendations
        .iter()
        .filter_map(|r| catalog.course(r.course_id))
        .map(|course| &course.application_deadline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog;
    use crate::eligibility::scoring::{FixedScorer, PlaceholderScorer};
    use crate::profile::SubjectResult;

    struct Scripted(Vec<u8>);

    impl MatchScorer for Scripted {
        fn match_score(&mut self, _profile: &AcademicProfile, _category: &str) -> u8 {
            self.0.remove(0)
        }
    }

    fn profile() -> AcademicProfile {
        AcademicProfile::new(vec![
            SubjectResult::new("Mathematics", 78),
            SubjectResult::new("Physical Science", 72),
            SubjectResult::new("English Home Language", 82),
        ])
    }

    #[test]
    fn recommendations_sorted_by_score_then_id() {
        let catalog = default_catalog();
        let mut scorer = Scripted(vec![80, 92, 80, 75, 88]);
        let results = build_recommendations(&catalog, &profile(), &mut scorer);
        let ids: Vec<u32> = results.iter().map(|r| r.course_id).collect();
        assert_eq!(ids, vec![2, 5, 1, 3, 4]);
    }

    #[test]
    fn min_score_filter_is_inclusive() {
        let catalog = default_catalog();
        let mut scorer = Scripted(vec![70, 69, 95, 71, 50]);
        let results = build_recommendations(&catalog, &profile(), &mut scorer);
        let kept = filter_by_min_score(&results, DEFAULT_MIN_SCORE);
        let scores: Vec<u8> = kept.iter().map(|r| r.match_score).collect();
        assert_eq!(scores, vec![95, 71, 70]);
    }

    #[test]
    fn placeholder_scores_always_pass_default_threshold() {
        let catalog = default_catalog();
        let mut scorer = PlaceholderScorer::seeded(42, 75, 95);
        let results = build_recommendations(&catalog, &profile(), &mut scorer);
        assert_eq!(filter_by_min_score(&results, DEFAULT_MIN_SCORE).len(), results.len());
    }

    #[test]
    fn searches_courses_by_name_or_institution() {
        let catalog = default_catalog();
        let hits = search_courses(&catalog.courses, "  SCIENCE ");
        assert_eq!(hits.len(), 3);
        let hits = search_courses(&catalog.courses, "wits");
        assert_eq!(hits.len(), 1);
        assert_eq!(search_courses(&catalog.courses, "").len(), catalog.courses.len());
    }

    #[test]
    fn filters_institutions_by_type_and_location() {
        let catalog = default_catalog();
        let cape_town = search_institutions(&catalog.institutions, "cape town");
        assert_eq!(cape_town.len(), 2);

        let technical =
            filter_institutions_by_type(&cape_town, &[InstitutionType::UniversityOfTechnology]);
        assert_eq!(technical.len(), 1);
        assert_eq!(technical[0].id, "cput");

        assert_eq!(filter_institutions_by_type(&cape_town, &[]).len(), 2);
    }

    #[test]
    fn institution_matches_follow_minimums() {
        let catalog = default_catalog();
        let all: Vec<&Institution> = catalog.institutions.iter().collect();
        let matches = match_institutions(&all, &profile());
        assert!(matches.iter().all(|m| m.requirements_met));
    }

    #[test]
    fn nearest_deadline_skips_past_and_today() {
        let today = NaiveDate::from_ymd_opt(2024, 9, 28).unwrap();
        let catalog = default_catalog();
        let deadlines = catalog.courses.iter().map(|c| &c.application_deadline);
        assert_eq!(days_until_nearest_deadline(deadlines, today), 2);

        let late = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let deadlines = catalog.courses.iter().map(|c| &c.application_deadline);
        assert_eq!(days_until_nearest_deadline(deadlines, late), 0);
    }

    #[test]
    fn fixed_scores_keep_catalog_order() {
        let catalog = default_catalog();
        let results = build_recommendations(&catalog, &profile(), &mut FixedScorer(90));
        let ids: Vec<u32> = results.iter().map(|r| r.course_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn deadline_countdown_uses_only_recommended_courses() {
        let catalog = default_catalog();
        let today = NaiveDate::from_ymd_opt(2024, 9, 29).unwrap();
        let mut results = build_recommendations(&catalog, &profile(), &mut FixedScorer(90));
        results.retain(|r| r.course_id == 2);

        let deadlines = recommended_deadlines(&catalog, &results);
        assert_eq!(days_until_nearest_deadline(deadlines, today), 16);
        assert_eq!(
            days_until_nearest_deadline(recommended_deadlines(&catalog, &[]), today),
            0
        );
    }
}
