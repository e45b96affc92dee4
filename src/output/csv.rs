use anyhow::Result;

use crate::eligibility::{MatchResult, SubjectGap};

pub fn recommendations_to_csv(results: &[MatchResult]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "course_id",
        "course",
        "institution",
        "match_score",
        "requirements_met",
        "requirements_passed",
        "requirements_total",
    ])?;
    for result in results {
        writer.write_record([
            result.course_id.to_string(),
            result.course_name.clone(),
            result.institution.clone(),
            result.match_score.to_string(),
            result.requirements_met.to_string(),
            result.passed_count().to_string(),
            result.comparisons.len().to_string(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn gaps_to_csv(gaps: &[SubjectGap]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["course_id", "course", "subject", "user_score", "required", "shortfall"])?;
    for gap in gaps {
        writer.write_record([
            gap.course_id.to_string(),
            gap.course_name.clone(),
            gap.subject.as_slug().to_string(),
            gap.user_score.to_string(),
            gap.required.to_string(),
            gap.shortfall.to_string(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}
