use chrono::Utc;

use crate::eligibility::{MatchRecord, MatchResult};

pub fn record_from_result(catalog_fingerprint: impl Into<String>, result: &MatchResult) -> MatchRecord {
    MatchRecord {
        course_id: result.course_id,
        course_name: result.course_name.clone(),
        match_score: result.match_score,
        requirements_met: result.requirements_met,
        catalog_fingerprint: catalog_fingerprint.into(),
        captured_at: Utc::now(),
    }
}

pub fn summarize_timeline(records: &[MatchRecord], course_id: Option<u32>) -> String {
    if records.is_empty() {
        return "No history records found.".to_string();
    }

    let mut met_count = 0usize;
    let mut total = 0usize;
    for rec in records {
        if let Some(course_id) = course_id {
            if rec.course_id != course_id {
                continue;
            }
        }
        total += 1;
        if rec.requirements_met {
            met_count += 1;
        }
    }

    if total == 0 {
        return "No matching records for selected course.".to_string();
    }

    format!(
        "Requirements met: {met_count}/{total} ({:.1}%)",
        (met_count as f64 / total as f64) * 100.0
    )
}
