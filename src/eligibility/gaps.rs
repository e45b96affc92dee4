use crate::eligibility::{MatchResult, SubjectGap};

/// Every unmet requirement across `results`, largest shortfall first.
pub fn collect_gaps(results: &[MatchResult]) -> Vec<SubjectGap> {
    let mut gaps: Vec<SubjectGap> = results
        .iter()
        .flat_map(|result| {
            result
                .comparisons
                .iter()
                .filter(|(_, c)| !c.met)
                .map(move |(subject, c)| SubjectGap {
                    course_id: result.course_id,
                    course_name: result.course_name.clone(),
                    subject: subject.clone(),
                    user_score: c.user_score,
                    required: c.required,
                    shortfall: i32::from(c.required) - c.user_score,
                })
        })
        .collect();

    gaps.sort_by(|a, b| {
        b.shortfall
            .cmp(&a.shortfall)
            .then_with(|| a.course_id.cmp(&b.course_id))
    });
    gaps
}

/// Courses whose only obstacles are within `margin` marks.
pub fn near_misses(results: &[MatchResult], margin: i32) -> Vec<&MatchResult> {
    results
        .iter()
        .filter(|r| !r.requirements_met)
        .filter(|r| {
            r.comparisons
                .values()
                .filter(|c| !c.met)
                .all(|c| i32::from(c.required) - c.user_score <= margin)
        })
        .collect()
}
