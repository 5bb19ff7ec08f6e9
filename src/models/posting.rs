//! Posting data structures.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Placeholder shown when a source does not expose the hiring company.
pub const UNKNOWN_COMPANY: &str = "—";

/// A posting as extracted by a source adapter, before normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawPosting {
    pub title: String,

    /// Link as found in the markup; may be relative
    pub href: String,

    #[serde(default)]
    pub company: Option<String>,

    #[serde(default)]
    pub location: Option<String>,

    /// Source-specific freshness text ("2 days ago", "Today", "2025-01-14")
    #[serde(default)]
    pub posted_at: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}

/// A normalized job posting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Posting {
    pub title: String,
    pub company: String,
    pub location: String,

    /// Name of the adapter that produced this posting
    pub source: String,

    /// Absolute URL to the posting
    pub link: String,

    /// Raw freshness text, empty when unknown
    #[serde(default)]
    pub posted_at: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl Posting {
    /// Identity key used for deduplication: lower-cased title and link.
    pub fn dedup_key(&self) -> (String, String) {
        (self.title.to_lowercase(), self.link.clone())
    }

    /// Stable identifier derived from the dedup key.
    pub fn canonical_id(&self) -> String {
        let (title, link) = self.dedup_key();
        let mut hasher = Sha256::new();
        hasher.update(title.as_bytes());
        hasher.update([0u8]);
        hasher.update(link.as_bytes());
        hex::encode(&hasher.finalize()[..8])
    }
}

/// Seniority/track of a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleType {
    DataAnalyst,
    DataScience,
    Intern,
    GraduateTrainee,
    Other,
}

impl RoleType {
    pub fn label(&self) -> &'static str {
        match self {
            RoleType::DataAnalyst => "Data Analyst",
            RoleType::DataScience => "Data Science",
            RoleType::Intern => "Intern",
            RoleType::GraduateTrainee => "Graduate Trainee",
            RoleType::Other => "Other",
        }
    }
}

impl fmt::Display for RoleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether a posting can be worked away from the office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkMode {
    Remote,
    Onsite,
}

impl WorkMode {
    pub fn label(&self) -> &'static str {
        match self {
            WorkMode::Remote => "Remote",
            WorkMode::Onsite => "Onsite",
        }
    }
}

impl fmt::Display for WorkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Output of the classifier for a single posting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub role_type: RoleType,
    pub work_mode: WorkMode,
    pub skills: Vec<String>,
}

/// A posting together with its derived classification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassifiedPosting {
    #[serde(flatten)]
    pub posting: Posting,
    pub role_type: RoleType,
    pub work_mode: WorkMode,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl ClassifiedPosting {
    pub fn new(posting: Posting, classification: Classification) -> Self {
        Self {
            posting,
            role_type: classification.role_type,
            work_mode: classification.work_mode,
            skills: classification.skills,
        }
    }
}

/// Serialized form written by `run --output`.
#[derive(Debug, Clone, Serialize)]
pub struct PostingOutput<'a> {
    pub id: String,
    #[serde(flatten)]
    pub posting: &'a ClassifiedPosting,
}

impl<'a> From<&'a ClassifiedPosting> for PostingOutput<'a> {
    fn from(posting: &'a ClassifiedPosting) -> Self {
        Self {
            id: posting.posting.canonical_id(),
            posting,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_posting() -> Posting {
        Posting {
            title: "Data Analyst".to_string(),
            company: "Acme".to_string(),
            location: "Lagos".to_string(),
            source: "Jobberman".to_string(),
            link: "https://www.jobberman.com/job/1".to_string(),
            posted_at: String::new(),
            description: String::new(),
        }
    }

    #[test]
    fn test_dedup_key_ignores_title_case() {
        let a = sample_posting();
        let mut b = sample_posting();
        b.title = "DATA ANALYST".to_string();
        b.source = "Indeed".to_string();
        assert_eq!(a.dedup_key(), b.dedup_key());
        assert_eq!(a.canonical_id(), b.canonical_id());
    }

    #[test]
    fn test_canonical_id_differs_by_link() {
        let a = sample_posting();
        let mut b = sample_posting();
        b.link = "https://www.jobberman.com/job/2".to_string();
        assert_ne!(a.canonical_id(), b.canonical_id());
        assert_eq!(a.canonical_id().len(), 16);
    }

    #[test]
    fn test_labels() {
        assert_eq!(RoleType::GraduateTrainee.to_string(), "Graduate Trainee");
        assert_eq!(WorkMode::Onsite.to_string(), "Onsite");
    }

    #[test]
    fn test_output_serialization_flattens_posting() {
        let classified = ClassifiedPosting::new(
            sample_posting(),
            Classification {
                role_type: RoleType::DataAnalyst,
                work_mode: WorkMode::Onsite,
                skills: vec!["SQL".to_string()],
            },
        );
        let value = serde_json::to_value(PostingOutput::from(&classified)).unwrap();
        assert_eq!(value["title"], "Data Analyst");
        assert_eq!(value["role_type"], "DataAnalyst");
        assert_eq!(value["skills"][0], "SQL");
        assert!(value["id"].as_str().is_some());
        assert!(value.get("description").is_none());
    }
}
