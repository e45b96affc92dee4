use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::eligibility::scoring::{DEFAULT_SCORE_CEILING, DEFAULT_SCORE_FLOOR};
use crate::recommend::DEFAULT_MIN_SCORE;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub student: StudentConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StudentConfig {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CatalogConfig {
    /// JSON catalog file; empty uses the built-in catalog.
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    #[serde(default = "default_min_score")]
    pub min_score: u8,
    #[serde(default = "default_score_floor")]
    pub score_floor: u8,
    #[serde(default = "default_score_ceiling")]
    pub score_ceiling: u8,
    #[serde(default = "default_near_miss_margin")]
    pub near_miss_margin: i32,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub student: Option<String>,
    pub catalog_path: Option<PathBuf>,
    pub min_score: Option<u8>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/matric-link/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let parsed: Self = toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        Ok(parsed)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(student) = overrides.student {
            self.student.name = student;
        }
        if let Some(path) = overrides.catalog_path {
            self.catalog.path = path.display().to_string();
        }
        if let Some(min_score) = overrides.min_score {
            self.matching.min_score = min_score;
        }
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }

    pub fn resolved_catalog_path(&self) -> Option<PathBuf> {
        let trimmed = self.catalog.path.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(expand_tilde(trimmed))
        }
    }

    pub fn student_name(&self) -> Option<String> {
        let trimmed = self.student.name.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    pub fn default_template() -> String {
        let template = r#"[student]
name = ""

[storage]
db_path = "~/.local/share/matric-link/session.db"

[catalog]
# JSON catalog file; leave empty for the built-in catalog
path = ""

[matching]
min_score = 70
score_floor = 75
score_ceiling = 95
near_miss_margin = 5
"#;
        template.to_string()
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            min_score: default_min_score(),
            score_floor: default_score_floor(),
            score_ceiling: default_score_ceiling(),
            near_miss_margin: default_near_miss_margin(),
        }
    }
}

fn default_db_path() -> String {
    "~/.local/share/matric-link/session.db".to_string()
}

fn default_min_score() -> u8 {
    DEFAULT_MIN_SCORE
}

fn default_score_floor() -> u8 {
    DEFAULT_SCORE_FLOOR
}

fn default_score_ceiling() -> u8 {
    DEFAULT_SCORE_CEILING
}

fn default_near_miss_margin() -> i32 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_parses_to_defaults() {
        let parsed: Config = toml::from_str(&Config::default_template()).expect("template");
        let defaults = Config::default();
        assert_eq!(parsed.storage.db_path, defaults.storage.db_path);
        assert_eq!(parsed.matching.min_score, 70);
        assert_eq!(parsed.matching.score_floor, defaults.matching.score_floor);
        assert_eq!(parsed.matching.score_ceiling, defaults.matching.score_ceiling);
        assert!(parsed.resolved_catalog_path().is_none());
        assert!(parsed.student_name().is_none());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[matching]\nmin_score = 85\n").expect("partial");
        assert_eq!(parsed.matching.min_score, 85);
        assert_eq!(parsed.matching.near_miss_margin, 5);
    }

    #[test]
    fn overrides_win() {
        let mut config = Config::default();
        config.apply_overrides(ConfigOverrides {
            student: Some("Sipho".to_string()),
            catalog_path: Some(PathBuf::from("/tmp/catalog.json")),
            min_score: Some(80),
        });
        assert_eq!(config.student_name().as_deref(), Some("Sipho"));
        assert_eq!(
            config.resolved_catalog_path(),
            Some(PathBuf::from("/tmp/catalog.json"))
        );
        assert_eq!(config.matching.min_score, 80);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config::load(Some(&dir.path().join("absent.toml"))).expect("load");
        assert_eq!(config.matching.min_score, DEFAULT_MIN_SCORE);
    }

    #[test]
    fn written_template_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("conf/config.toml");
        Config::write_template(&path).expect("write");
        let config = Config::load(Some(&path)).expect("load");
        assert_eq!(config.matching.score_ceiling, 95);
    }
}
