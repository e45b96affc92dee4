use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::eligibility::MatchRecord;
use crate::session::migrations::BASE_MIGRATION;
use crate::session::SessionContext;

pub const STUDENT_KEY: &str = "student";
pub const PROFILE_KEY: &str = "profile";
pub const RECOMMENDATIONS_KEY: &str = "recommendations";
pub const APPLICATIONS_KEY: &str = "applications";

/// Flat key-value store of JSON blobs plus an append-only match history.
pub struct SessionStore {
    conn: Connection,
}

impl SessionStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("failed opening session store: {}", path.display()))?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    pub fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(BASE_MIGRATION)?;
        Ok(())
    }

    pub fn put_blob<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        self.conn.execute(
            r#"
INSERT INTO session_blobs(key, value_json, updated_at)
VALUES (?1, ?2, ?3)
ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json, updated_at = excluded.updated_at
"#,
            params![key, serde_json::to_string(value)?, Utc::now().to_rfc3339()],
        )?;
        debug!("stored session blob {key}");
        Ok(())
    }

    pub fn get_blob<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT value_json FROM session_blobs WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        match json {
            Some(json) => Ok(Some(
                serde_json::from_str(&json)
                    .with_context(|| format!("corrupt session blob: {key}"))?,
            )),
            None => Ok(None),
        }
    }

    pub fn remove_blob(&self, key: &str) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM session_blobs WHERE key = ?1", params![key])?;
        Ok(removed > 0)
    }

    pub fn load_session(&self) -> Result<SessionContext> {
        Ok(SessionContext {
            student: self.get_blob(STUDENT_KEY)?,
            profile: self.get_blob(PROFILE_KEY)?,
            recommendations: self.get_blob(RECOMMENDATIONS_KEY)?.unwrap_or_default(),
            applications: self.get_blob(APPLICATIONS_KEY)?.unwrap_or_default(),
        })
    }

    pub fn save_session(&self, session: &SessionContext) -> Result<()> {
        match &session.student {
            Some(student) => self.put_blob(STUDENT_KEY, student)?,
            None => {
                self.remove_blob(STUDENT_KEY)?;
            }
        }
        match &session.profile {
            Some(profile) => self.put_blob(PROFILE_KEY, profile)?,
            None => {
                self.remove_blob(PROFILE_KEY)?;
            }
        }
        self.put_blob(RECOMMENDATIONS_KEY, &session.recommendations)?;
        self.put_blob(APPLICATIONS_KEY, &session.applications)?;
        Ok(())
    }

    pub fn insert_match_record(&self, record: &MatchRecord) -> Result<()> {
        self.conn.execute(
            r#"
INSERT INTO match_history(
    course_id, course_name, match_score, requirements_met, catalog_fingerprint, captured_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
"#,
            params![
                record.course_id,
                record.course_name,
                record.match_score,
                if record.requirements_met { 1 } else { 0 },
                record.catalog_fingerprint,
                record.captured_at.to_rfc3339()
            ],
        )?;
        Ok(())
    }

    pub fn load_history(&self, course_id: Option<u32>, limit: usize) -> Result<Vec<MatchRecord>> {
        let sql = if course_id.is_some() {
            r#"
SELECT course_id, course_name, match_score, requirements_met, catalog_fingerprint, captured_at
FROM match_history
WHERE course_id = ?1
ORDER BY id DESC
LIMIT ?2
"#
        } else {
            r#"
SELECT course_id, course_name, match_score, requirements_met, catalog_fingerprint, captured_at
FROM match_history
ORDER BY id DESC
LIMIT ?1
"#
        };

        let mut stmt = self.conn.prepare(sql)?;
        let rows = if let Some(course_id) = course_id {
            stmt.query_map(params![course_id, limit as i64], |row| {
                row_to_match_record(row)
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?
        } else {
            stmt.query_map(params![limit as i64], |row| row_to_match_record(row))?
                .collect::<std::result::Result<Vec<_>, _>>()?
        };
        Ok(rows)
    }
}

fn row_to_match_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<MatchRecord> {
    let captured_at_raw: String = row.get(5)?;
    let captured_at = DateTime::parse_from_rfc3339(&captured_at_raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now());
    Ok(MatchRecord {
        course_id: row.get(0)?,
        course_name: row.get(1)?,
        match_score: row.get(2)?,
        requirements_met: row.get::<_, i64>(3)? != 0,
        catalog_fingerprint: row.get(4)?,
        captured_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog;
    use crate::eligibility::history::record_from_result;
    use crate::eligibility::scoring::FixedScorer;
    use crate::profile::{AcademicProfile, SubjectResult};
    use crate::recommend::build_recommendations;

    fn open_temp() -> (tempfile::TempDir, SessionStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::open(&dir.path().join("state/session.db")).expect("open");
        (dir, store)
    }

    #[test]
    fn empty_store_yields_empty_session() {
        let (_dir, store) = open_temp();
        let session = store.load_session().expect("load");
        assert_eq!(session, SessionContext::default());
    }

    #[test]
    fn session_round_trips_through_blobs() {
        let (_dir, store) = open_temp();
        let catalog = default_catalog();
        let profile = AcademicProfile::new(vec![
            SubjectResult::new("Mathematics", 78),
            SubjectResult::new("English Home Language", 82).with_level("Home Language"),
        ]);

        let mut session = SessionContext::new(Some("Thandi".to_string()));
        session.submit_profile(profile.clone());
        session.set_recommendations(build_recommendations(
            &catalog,
            &profile,
            &mut FixedScorer(85),
        ));
        session.start_course_application(&catalog.courses[2]);
        store.save_session(&session).expect("save");

        let loaded = store.load_session().expect("load");
        assert_eq!(loaded, session);
    }

    #[test]
    fn blob_overwrite_replaces_value() {
        let (_dir, store) = open_temp();
        store.put_blob("k", &1u32).expect("put");
        store.put_blob("k", &2u32).expect("put");
        assert_eq!(store.get_blob::<u32>("k").expect("get"), Some(2));
        assert!(store.remove_blob("k").expect("remove"));
        assert_eq!(store.get_blob::<u32>("k").expect("get"), None);
    }

    #[test]
    fn history_is_newest_first_and_filterable() {
        let (_dir, store) = open_temp();
        let catalog = default_catalog();
        let profile = AcademicProfile::new(vec![SubjectResult::new("Mathematics", 90)]);
        for _ in 0..2 {
            for result in build_recommendations(&catalog, &profile, &mut FixedScorer(80)) {
                store
                    .insert_match_record(&record_from_result(&catalog.fingerprint, &result))
                    .expect("insert");
            }
        }

        let all = store.load_history(None, 100).expect("history");
        assert_eq!(all.len(), 10);
        assert_eq!(all[0].course_id, 5);

        let cs = store.load_history(Some(1), 100).expect("history");
        assert_eq!(cs.len(), 2);
        assert!(cs.iter().all(|r| !r.requirements_met));
        assert_eq!(store.load_history(None, 3).expect("history").len(), 3);
    }
}
