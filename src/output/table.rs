use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::catalog::{Course, Institution};
use crate::eligibility::{
    InstitutionMatch, MatchRecord, MatchResult, MatchTier, RequirementComparison, SubjectGap,
};
use crate::session::Application;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn met_cell(met: bool) -> Cell {
    if met {
        Cell::new("YES").fg(Color::Green)
    } else {
        Cell::new("NO").fg(Color::Red)
    }
}

/// "78% ✓ (70% required)"
pub fn format_comparison(comparison: &RequirementComparison) -> String {
    format!(
        "{}% {} ({}% required)",
        comparison.user_score,
        if comparison.met { "✓" } else { "✗" },
        comparison.required
    )
}

pub fn render_recommendations_table(results: &[MatchResult]) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "Course",
        "Institution",
        "Match",
        "Requirements Met",
        "Subjects",
    ]);

    for r in results {
        let match_cell = match r.tier() {
            MatchTier::Strong => Cell::new(format!("{}% Match", r.match_score)).fg(Color::Green),
            MatchTier::Moderate => Cell::new(format!("{}% Match", r.match_score)).fg(Color::Yellow),
        };
        let subjects = r
            .comparisons
            .iter()
            .map(|(subject, c)| format!("{subject}: {}", format_comparison(c)))
            .collect::<Vec<_>>()
            .join("\n");
        table.add_row(Row::from(vec![
            Cell::new(&r.course_name),
            Cell::new(&r.institution),
            match_cell,
            met_cell(r.requirements_met),
            Cell::new(subjects),
        ]));
    }
    table.to_string()
}

pub fn render_gaps_table(gaps: &[SubjectGap]) -> String {
    let mut table = new_table();
    table.set_header(vec!["Course", "Subject", "Your Mark", "Required", "Shortfall"]);
    for gap in gaps {
        table.add_row(vec![
            gap.course_name.clone(),
            gap.subject.to_string(),
            format!("{}%", gap.user_score),
            format!("{}%", gap.required),
            gap.shortfall.to_string(),
        ]);
    }
    table.to_string()
}

pub fn render_courses_table(courses: &[&Course]) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "ID",
        "Course",
        "Institution",
        "Duration",
        "Admission Points",
        "Deadline",
        "Career Paths",
    ]);
    for course in courses {
        table.add_row(vec![
            course.id.to_string(),
            course.name.clone(),
            course.institution.clone(),
            course.duration.clone(),
            course.admission_points.to_string(),
            course.application_deadline.to_string(),
            course.career_paths.join(", "),
        ]);
    }
    table.to_string()
}

pub fn render_institutions_table(rows: &[(&Institution, InstitutionMatch)]) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "",
        "Institution",
        "Location",
        "Type",
        "Ranking",
        "Fee",
        "Closing Date",
        "Courses",
        "Minimums Met",
    ]);
    for (institution, matched) in rows {
        let plural = if matched.offered_courses == 1 { "" } else { "s" };
        table.add_row(Row::from(vec![
            Cell::new(institution.initials()),
            Cell::new(&institution.name),
            Cell::new(&institution.location),
            Cell::new(institution.institution_type.to_string()),
            Cell::new(format!("#{}", institution.ranking)),
            Cell::new(format!("R{}", institution.application_fee)),
            Cell::new(institution.closing_date.to_string()),
            Cell::new(format!("{} Course{plural}", matched.offered_courses)),
            met_cell(matched.requirements_met),
        ]));
    }
    table.to_string()
}

pub fn render_applications_table(applications: &[Application]) -> String {
    let mut table = new_table();
    table.set_header(vec!["ID", "Applying To", "Status", "Progress", "Started"]);
    for app in applications {
        table.add_row(vec![
            app.id.to_string(),
            app.target.label().to_string(),
            app.status.to_string(),
            format!("{}%", app.progress()),
            app.started_at.to_rfc3339(),
        ]);
    }
    table.to_string()
}

pub fn render_history_table(records: &[MatchRecord]) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "Captured At",
        "Course",
        "Match",
        "Requirements Met",
        "Catalog",
    ]);
    for rec in records {
        table.add_row(vec![
            rec.captured_at.to_rfc3339(),
            rec.course_name.clone(),
            format!("{}%", rec.match_score),
            rec.requirements_met.to_string(),
            rec.catalog_fingerprint.chars().take(12).collect::<String>(),
        ]);
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog;
    use crate::eligibility::gaps::collect_gaps;
    use crate::eligibility::scoring::FixedScorer;
    use crate::profile::{AcademicProfile, SubjectResult};
    use crate::recommend::build_recommendations;

    #[test]
    fn comparison_formatting() {
        let met = RequirementComparison {
            required: 70,
            user_score: 78,
            met: true,
        };
        let unmet = RequirementComparison {
            required: 65,
            user_score: 0,
            met: false,
        };
        assert_eq!(format_comparison(&met), "78% ✓ (70% required)");
        assert_eq!(format_comparison(&unmet), "0% ✗ (65% required)");
    }

    #[test]
    fn tables_include_course_rows() {
        let catalog = default_catalog();
        let profile = AcademicProfile::new(vec![
            SubjectResult::new("Mathematics", 78),
            SubjectResult::new("English Home Language", 82),
        ]);
        let results = build_recommendations(&catalog, &profile, &mut FixedScorer(92));

        let rendered = render_recommendations_table(&results);
        assert!(rendered.contains("Computer Science"));
        assert!(rendered.contains("92% Match"));

        let gaps = render_gaps_table(&collect_gaps(&results));
        assert!(gaps.contains("Physical Science"));
    }

    #[test]
    fn applications_show_status_slug_and_progress() {
        let catalog = default_catalog();
        let mut session = crate::session::SessionContext::default();
        session.start_course_application(&catalog.courses[0]);
        let rendered = render_applications_table(&session.applications);
        assert!(rendered.contains("in_progress"));
        assert!(rendered.contains("50%"));
        assert!(!rendered.contains("InProgress"));
    }
}
