use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::warn;

/// Canonical subject identifier used to index requirement sets.
///
/// Serialized as its snake_case slug so it can key JSON maps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(into = "String", try_from = "String")]
pub enum SubjectKey {
    Mathematics,
    PhysicalScience,
    English,
    LifeSciences,
    Accounting,
    InformationTechnology,
    Custom(String),
}

impl SubjectKey {
    pub const KNOWN: [SubjectKey; 6] = [
        SubjectKey::Mathematics,
        SubjectKey::PhysicalScience,
        SubjectKey::English,
        SubjectKey::LifeSciences,
        SubjectKey::Accounting,
        SubjectKey::InformationTechnology,
    ];

    pub fn as_slug(&self) -> &str {
        match self {
            Self::Mathematics => "mathematics",
            Self::PhysicalScience => "physical_science",
            Self::English => "english",
            Self::LifeSciences => "life_sciences",
            Self::Accounting => "accounting",
            Self::InformationTechnology => "information_technology",
            Self::Custom(slug) => slug,
        }
    }

    /// Human-readable label as it appears in submitted subject names.
    pub fn label(&self) -> String {
        match self {
            Self::Mathematics => "Mathematics".to_string(),
            Self::PhysicalScience => "Physical Science".to_string(),
            Self::English => "English".to_string(),
            Self::LifeSciences => "Life Sciences".to_string(),
            Self::Accounting => "Accounting".to_string(),
            Self::InformationTechnology => "Information Technology".to_string(),
            Self::Custom(slug) => slug.replacen('_', " ", 1).to_uppercase(),
        }
    }

    /// Resolves a free-text subject name to a canonical key.
    ///
    /// Known labels are matched by case-sensitive containment in declaration
    /// order, so "English Home Language" resolves to `English`. Names that
    /// contain no known label become a `Custom` key built from their slug.
    pub fn resolve(subject_name: &str) -> Option<SubjectKey> {
        if let Some(known) = Self::KNOWN
            .iter()
            .find(|key| subject_name.contains(key.label().as_str()))
        {
            return Some(known.clone());
        }
        let slug = slugify(subject_name);
        if slug.is_empty() {
            None
        } else {
            Some(Self::Custom(slug))
        }
    }
}

impl Display for SubjectKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Error)]
#[error("unknown subject key: {0}")]
pub struct SubjectKeyParseError(pub String);

impl FromStr for SubjectKey {
    type Err = SubjectKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = slugify(s);
        let key = match normalized.as_str() {
            "mathematics" | "maths" | "math" => SubjectKey::Mathematics,
            "physical_science" | "physical_sciences" | "physics" => SubjectKey::PhysicalScience,
            "english" => SubjectKey::English,
            "life_sciences" | "life_science" | "biology" => SubjectKey::LifeSciences,
            "accounting" => SubjectKey::Accounting,
            "information_technology" | "it" => SubjectKey::InformationTechnology,
            _ => {
                if normalized.is_empty() {
                    return Err(SubjectKeyParseError(s.to_string()));
                }
                SubjectKey::Custom(normalized)
            }
        };
        Ok(key)
    }
}

impl From<SubjectKey> for String {
    fn from(value: SubjectKey) -> Self {
        value.as_slug().to_string()
    }
}

impl TryFrom<String> for SubjectKey {
    type Error = SubjectKeyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

fn slugify(raw: &str) -> String {
    raw.trim()
        .to_ascii_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Minimum mark per subject for admission. Empty means no requirements.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(
    from = "BTreeMap<SubjectKey, u8>",
    into = "BTreeMap<SubjectKey, u8>"
)]
pub struct RequirementSet(BTreeMap<SubjectKey, u8>);

impl RequirementSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: SubjectKey, minimum: u8) -> Self {
        self.0.insert(key, minimum.min(100));
        self
    }

    pub fn get(&self, key: &SubjectKey) -> Option<u8> {
        self.0.get(key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SubjectKey, u8)> {
        self.0.iter().map(|(key, minimum)| (key, *minimum))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<SubjectKey, u8>> for RequirementSet {
    fn from(raw: BTreeMap<SubjectKey, u8>) -> Self {
        raw.into_iter()
            .inspect(|(key, minimum)| {
                if *minimum > 100 {
                    warn!(subject = %key, minimum, "requirement above 100 capped");
                }
            })
            .collect()
    }
}

impl From<RequirementSet> for BTreeMap<SubjectKey, u8> {
    fn from(value: RequirementSet) -> Self {
        value.0
    }
}

impl FromIterator<(SubjectKey, u8)> for RequirementSet {
    fn from_iter<T: IntoIterator<Item = (SubjectKey, u8)>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Self::new(), |set, (key, minimum)| set.with(key, minimum))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Course {
    pub id: u32,
    pub name: String,
    pub institution: String,
    pub category: String,
    #[serde(default)]
    pub requirements: RequirementSet,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub career_paths: Vec<String>,
    #[serde(default)]
    pub admission_points: u32,
    pub application_deadline: NaiveDate,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum InstitutionType {
    University,
    UniversityOfTechnology,
    College,
    Private,
}

impl InstitutionType {
    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::University => "university",
            Self::UniversityOfTechnology => "university_of_technology",
            Self::College => "college",
            Self::Private => "private",
        }
    }
}

impl Display for InstitutionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::University => "Traditional University",
            Self::UniversityOfTechnology => "University of Technology",
            Self::College => "TVET College",
            Self::Private => "Private Institution",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Error)]
#[error("unknown institution type: {0}")]
pub struct InstitutionTypeParseError(pub String);

impl FromStr for InstitutionType {
    type Err = InstitutionTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match slugify(s).as_str() {
            "university" | "traditional_university" => Ok(Self::University),
            "university_of_technology" | "uot" => Ok(Self::UniversityOfTechnology),
            "college" | "tvet" | "tvet_college" => Ok(Self::College),
            "private" | "private_institution" => Ok(Self::Private),
            _ => Err(InstitutionTypeParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Institution {
    pub id: String,
    pub name: String,
    pub location: String,
    pub institution_type: InstitutionType,
    pub ranking: u32,
    pub application_fee: u32,
    pub closing_date: NaiveDate,
    #[serde(default)]
    pub courses: Vec<String>,
    #[serde(default)]
    pub requirements: RequirementSet,
}

impl Institution {
    /// Initials shown in place of a logo, e.g. "UoCT" for University of Cape Town.
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Catalog {
    pub courses: Vec<Course>,
    pub institutions: Vec<Institution>,
    #[serde(default)]
    pub fingerprint: String,
}

impl Catalog {
    pub fn with_fingerprint(courses: Vec<Course>, institutions: Vec<Institution>) -> Self {
        let canonical = serde_json::to_string(&(&courses, &institutions)).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        let fingerprint = format!("{:x}", hasher.finalize());
        Self {
            courses,
            institutions,
            fingerprint,
        }
    }

    pub fn course(&self, id: u32) -> Option<&Course> {
        self.courses.iter().find(|course| course.id == id)
    }

    pub fn institution(&self, id: &str) -> Option<&Institution> {
        self.institutions
            .iter()
            .find(|institution| institution.id.eq_ignore_ascii_case(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_labels_by_containment() {
        assert_eq!(
            SubjectKey::resolve("English Home Language"),
            Some(SubjectKey::English)
        );
        assert_eq!(
            SubjectKey::resolve("Physical Science"),
            Some(SubjectKey::PhysicalScience)
        );
        assert_eq!(
            SubjectKey::resolve("Mathematics"),
            Some(SubjectKey::Mathematics)
        );
    }

    #[test]
    fn resolution_is_case_sensitive() {
        assert_eq!(
            SubjectKey::resolve("mathematics"),
            Some(SubjectKey::Custom("mathematics".to_string()))
        );
        assert_eq!(
            SubjectKey::resolve("Mathematical Literacy"),
            Some(SubjectKey::Custom("mathematical_literacy".to_string()))
        );
        assert_eq!(SubjectKey::resolve("   "), None);
    }

    #[test]
    fn parses_slugs_and_aliases() {
        assert_eq!(
            "physical-science".parse::<SubjectKey>().unwrap(),
            SubjectKey::PhysicalScience
        );
        assert_eq!("Maths".parse::<SubjectKey>().unwrap(), SubjectKey::Mathematics);
        assert_eq!(
            "geography".parse::<SubjectKey>().unwrap(),
            SubjectKey::Custom("geography".to_string())
        );
        assert!("".parse::<SubjectKey>().is_err());
    }

    #[test]
    fn custom_label_matches_display_fallback() {
        let key = SubjectKey::Custom("business_studies".to_string());
        assert_eq!(key.label(), "BUSINESS STUDIES");
    }

    #[test]
    fn requirement_set_uses_slugs_as_json_keys() {
        let set = RequirementSet::new()
            .with(SubjectKey::Mathematics, 70)
            .with(SubjectKey::PhysicalScience, 65)
            .with(SubjectKey::English, 60);
        let json = serde_json::to_string(&set).expect("serialize");
        assert_eq!(json, r#"{"mathematics":70,"physical_science":65,"english":60}"#);
        let back: RequirementSet = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, set);
    }

    #[test]
    fn requirement_minimum_is_capped_at_100() {
        let set = RequirementSet::new().with(SubjectKey::Accounting, 120);
        assert_eq!(set.get(&SubjectKey::Accounting), Some(100));
    }

    #[test]
    fn parses_institution_types() {
        assert_eq!(
            "university_of_technology".parse::<InstitutionType>().unwrap(),
            InstitutionType::UniversityOfTechnology
        );
        assert_eq!(
            "TVET".parse::<InstitutionType>().unwrap(),
            InstitutionType::College
        );
        assert!("online".parse::<InstitutionType>().is_err());
        assert_eq!(InstitutionType::College.to_string(), "TVET College");
    }

    #[test]
    fn fingerprint_is_stable_sha256_hex() {
        let a = Catalog::with_fingerprint(Vec::new(), Vec::new());
        let b = Catalog::with_fingerprint(Vec::new(), Vec::new());
        assert_eq!(a.fingerprint, b.fingerprint);
        assert_eq!(a.fingerprint.len(), 64);
    }
}
