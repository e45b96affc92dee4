pub const BASE_MIGRATION: &str = r#"
CREATE TABLE IF NOT EXISTS session_blobs (
    key TEXT PRIMARY KEY,
    value_json TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS match_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    course_id INTEGER NOT NULL,
    course_name TEXT NOT NULL,
    match_score INTEGER NOT NULL,
    requirements_met INTEGER NOT NULL,
    catalog_fingerprint TEXT NOT NULL,
    captured_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_match_history_course
    ON match_history(course_id, id DESC);
"#;
