pub mod migrations;
pub mod store;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Course, Institution};
use crate::eligibility::MatchResult;
use crate::profile::AcademicProfile;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    NotStarted,
    InProgress,
    Submitted,
    UnderReview,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Submitted => "submitted",
            Self::UnderReview => "under_review",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    /// Percentage shown against an application in this status.
    pub fn progress(&self) -> u8 {
        match self {
            Self::NotStarted => 0,
            Self::InProgress => 50,
            Self::Submitted => 80,
            Self::UnderReview => 90,
            Self::Accepted | Self::Rejected => 100,
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected)
    }

    /// The following step, or `None` once a decision is needed or made.
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::NotStarted => Some(Self::InProgress),
            Self::InProgress => Some(Self::Submitted),
            Self::Submitted => Some(Self::UnderReview),
            Self::UnderReview | Self::Accepted | Self::Rejected => None,
        }
    }

    fn stage(&self) -> u8 {
        match self {
            Self::NotStarted => 0,
            Self::InProgress => 1,
            Self::Submitted => 2,
            Self::UnderReview => 3,
            Self::Accepted | Self::Rejected => 4,
        }
    }

    /// Status only moves forward, and a decision is final.
    pub fn can_move_to(&self, next: Self) -> bool {
        !self.is_final() && next.stage() > self.stage()
    }
}

impl Display for ApplicationStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_slug())
    }
}

#[derive(Debug, Error)]
#[error("unknown application status: {0}")]
pub struct ApplicationStatusParseError(pub String);

impl FromStr for ApplicationStatus {
    type Err = ApplicationStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "not_started" => Ok(Self::NotStarted),
            "in_progress" => Ok(Self::InProgress),
            "submitted" => Ok(Self::Submitted),
            "under_review" => Ok(Self::UnderReview),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ApplicationStatusParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error("no application with id {0}")]
    NotFound(i64),
    #[error("application {id} is {from}; it cannot move to {to}")]
    InvalidTransition {
        id: i64,
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    #[error("application {id} is {status} and needs an explicit decision (accepted or rejected)")]
    DecisionRequired { id: i64, status: ApplicationStatus },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ApplicationTarget {
    Course { course_id: u32, course_name: String },
    Institution { institution_id: String, institution_name: String },
}

impl ApplicationTarget {
    pub fn label(&self) -> &str {
        match self {
            Self::Course { course_name, .. } => course_name,
            Self::Institution {
                institution_name, ..
            } => institution_name,
        }
    }

    /// Same course or institution, regardless of the recorded name.
    pub fn refers_to_same(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Course { course_id: a, .. }, Self::Course { course_id: b, .. }) => a == b,
            (
                Self::Institution {
                    institution_id: a, ..
                },
                Self::Institution {
                    institution_id: b, ..
                },
            ) => a.eq_ignore_ascii_case(b),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Application {
    pub id: i64,
    pub target: ApplicationTarget,
    pub status: ApplicationStatus,
    pub started_at: DateTime<Utc>,
}

impl Application {
    fn start(target: ApplicationTarget, started_at: DateTime<Utc>) -> Self {
        Self {
            id: started_at.timestamp_millis(),
            target,
            status: ApplicationStatus::InProgress,
            started_at,
        }
    }

    pub fn progress(&self) -> u8 {
        self.status.progress()
    }
}

/// Everything known about the current student, passed explicitly to
/// whatever needs it and persisted through `SessionStore`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionContext {
    pub student: Option<String>,
    pub profile: Option<AcademicProfile>,
    pub recommendations: Vec<MatchResult>,
    pub applications: Vec<Application>,
}

impl SessionContext {
    pub fn new(student: Option<String>) -> Self {
        Self {
            student,
            ..Self::default()
        }
    }

    /// Replaces the profile; recommendations from the previous profile are dropped.
    pub fn submit_profile(&mut self, profile: AcademicProfile) {
        self.profile = Some(profile);
        self.recommendations.clear();
    }

    pub fn set_recommendations(&mut self, recommendations: Vec<MatchResult>) {
        self.recommendations = recommendations;
    }

    pub fn start_course_application(&mut self, course: &Course) -> &Application {
        self.push_application(ApplicationTarget::Course {
            course_id: course.id,
            course_name: course.name.clone(),
        })
    }

    pub fn start_institution_application(&mut self, institution: &Institution) -> &Application {
        self.push_application(ApplicationTarget::Institution {
            institution_id: institution.id.clone(),
            institution_name: institution.name.clone(),
        })
    }

    /// Starts an application, or returns the existing one for the same target.
    fn push_application(&mut self, target: ApplicationTarget) -> &Application {
        if let Some(index) = self
            .applications
            .iter()
            .position(|app| app.target.refers_to_same(&target))
        {
            return &self.applications[index];
        }
        let mut started_at = Utc::now();
        // ids are millisecond timestamps; keep them unique within a session
        if let Some(last) = self.applications.last() {
            if started_at.timestamp_millis() <= last.id {
                started_at = last.started_at + chrono::Duration::milliseconds(1);
            }
        }
        self.applications.push(Application::start(target, started_at));
        &self.applications[self.applications.len() - 1]
    }

    pub fn application(&self, id: i64) -> Option<&Application> {
        self.applications.iter().find(|app| app.id == id)
    }

    /// Moves an application to `status`, or to its next step when `None`.
    pub fn advance_application(
        &mut self,
        id: i64,
        status: Option<ApplicationStatus>,
    ) -> Result<&Application, ApplicationError> {
        let app = self
            .applications
            .iter_mut()
            .find(|app| app.id == id)
            .ok_or(ApplicationError::NotFound(id))?;
        let to = match status {
            Some(to) => to,
            None => app.status.next().ok_or(if app.status.is_final() {
                ApplicationError::InvalidTransition {
                    id,
                    from: app.status,
                    to: app.status,
                }
            } else {
                ApplicationError::DecisionRequired {
                    id,
                    status: app.status,
                }
            })?,
        };
        if !app.status.can_move_to(to) {
            return Err(ApplicationError::InvalidTransition {
                id,
                from: app.status,
                to,
            });
        }
        app.status = to;
        Ok(&*app)
    }

    /// 25 for a known student, 50 for submitted results, 25 for any application.
    pub fn profile_completion(&self) -> u8 {
        let mut completion = 0;
        if self.student.is_some() {
            completion += 25;
        }
        if self.profile.is_some() {
            completion += 50;
        }
        if !self.applications.is_empty() {
            completion += 25;
        }
        completion
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog;
    use crate::profile::SubjectResult;

    #[test]
    fn completion_accumulates() {
        let catalog = default_catalog();
        let mut session = SessionContext::new(None);
        assert_eq!(session.profile_completion(), 0);

        session.student = Some("Thandi".to_string());
        assert_eq!(session.profile_completion(), 25);

        session.submit_profile(AcademicProfile::new(vec![SubjectResult::new("Mathematics", 70)]));
        assert_eq!(session.profile_completion(), 75);

        session.start_course_application(&catalog.courses[0]);
        assert_eq!(session.profile_completion(), 100);
    }

    #[test]
    fn new_application_starts_in_progress() {
        let catalog = default_catalog();
        let mut session = SessionContext::default();
        let app = session.start_course_application(&catalog.courses[1]).clone();
        assert_eq!(app.status, ApplicationStatus::InProgress);
        assert_eq!(app.progress(), 50);
        assert_eq!(app.target.label(), "Electrical Engineering");

        let inst = session
            .start_institution_application(&catalog.institutions[0])
            .clone();
        assert!(inst.id > app.id);
        assert_eq!(session.applications.len(), 2);
    }

    #[test]
    fn resubmission_clears_recommendations() {
        let mut session = SessionContext::default();
        session.set_recommendations(vec![MatchResult {
            course_id: 1,
            course_name: "Computer Science".to_string(),
            institution: "University of Cape Town".to_string(),
            match_score: 90,
            requirements_met: true,
            comparisons: Default::default(),
        }]);
        session.submit_profile(AcademicProfile::default());
        assert!(session.recommendations.is_empty());
    }

    #[test]
    fn applying_twice_keeps_one_application() {
        let catalog = default_catalog();
        let mut session = SessionContext::default();
        let first = session.start_course_application(&catalog.courses[0]).id;
        let second = session.start_course_application(&catalog.courses[0]).id;
        assert_eq!(first, second);
        assert_eq!(session.applications.len(), 1);

        session.start_institution_application(&catalog.institutions[0]);
        session.start_institution_application(&catalog.institutions[0]);
        assert_eq!(session.applications.len(), 2);
    }

    #[test]
    fn status_advances_step_by_step() {
        let catalog = default_catalog();
        let mut session = SessionContext::default();
        let id = session.start_course_application(&catalog.courses[0]).id;

        let app = session.advance_application(id, None).expect("submit");
        assert_eq!(app.status, ApplicationStatus::Submitted);
        assert_eq!(app.progress(), 80);

        let app = session.advance_application(id, None).expect("review");
        assert_eq!(app.status, ApplicationStatus::UnderReview);
        assert_eq!(app.progress(), 90);

        assert_eq!(
            session.advance_application(id, None).unwrap_err(),
            ApplicationError::DecisionRequired {
                id,
                status: ApplicationStatus::UnderReview
            }
        );

        let app = session
            .advance_application(id, Some(ApplicationStatus::Accepted))
            .expect("decide");
        assert_eq!(app.progress(), 100);
    }

    #[test]
    fn status_never_moves_backwards_or_past_a_decision() {
        let catalog = default_catalog();
        let mut session = SessionContext::default();
        let id = session.start_course_application(&catalog.courses[2]).id;

        assert!(matches!(
            session.advance_application(id, Some(ApplicationStatus::NotStarted)),
            Err(ApplicationError::InvalidTransition { .. })
        ));
        session
            .advance_application(id, Some(ApplicationStatus::Rejected))
            .expect("reject");
        assert!(matches!(
            session.advance_application(id, Some(ApplicationStatus::Accepted)),
            Err(ApplicationError::InvalidTransition { .. })
        ));
        assert_eq!(
            session.advance_application(id + 1, None).unwrap_err(),
            ApplicationError::NotFound(id + 1)
        );
    }

    #[test]
    fn status_parses_and_displays_as_slug() {
        assert_eq!(
            "Under Review".parse::<ApplicationStatus>().expect("parse"),
            ApplicationStatus::UnderReview
        );
        assert_eq!(ApplicationStatus::InProgress.to_string(), "in_progress");
        assert!("pending".parse::<ApplicationStatus>().is_err());
    }
}
