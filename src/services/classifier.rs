// src/services/classifier.rs

//! Keyword-based posting classifier.
//!
//! Derives the role type, work mode and skill set of a posting from its
//! text alone. The same inputs always produce the same classification.

use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};

use crate::models::{Classification, DigestConfig, RoleType, WorkMode};

const REMOTE_KEYWORDS: [&str; 4] = ["remote", "hybrid", "work from home", "anywhere"];

/// Classifier holding the compiled reference skill list.
#[derive(Debug, Clone)]
pub struct Classifier {
    skills: Vec<(String, Regex)>,
    max_skills: usize,
}

impl Classifier {
    /// Build a classifier over an ordered reference skill list.
    ///
    /// Terms that fail to compile are skipped with a warning.
    pub fn new<S: AsRef<str>>(skills: &[S], max_skills: usize) -> Self {
        let skills = skills
            .iter()
            .filter_map(|term| {
                let term = term.as_ref().trim();
                if term.is_empty() {
                    return None;
                }
                match skill_pattern(term) {
                    Ok(re) => Some((term.to_string(), re)),
                    Err(e) => {
                        log::warn!("Skipping skill '{}': {}", term, e);
                        None
                    }
                }
            })
            .collect();

        Self { skills, max_skills }
    }

    pub fn from_config(config: &DigestConfig) -> Self {
        Self::new(&config.skills, config.max_skills)
    }

    /// Classify a posting from its title, location and description.
    pub fn classify(&self, title: &str, location: &str, description: &str) -> Classification {
        Classification {
            role_type: role_type(title),
            work_mode: work_mode(title, location),
            skills: self.skills(title, description),
        }
    }

    /// Skills mentioned in the title or description, in reference-list order.
    pub fn skills(&self, title: &str, description: &str) -> Vec<String> {
        let text = format!("{title} {description}");
        self.skills
            .iter()
            .filter(|(_, re)| re.is_match(&text))
            .map(|(term, _)| term.clone())
            .take(self.max_skills)
            .collect()
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::from_config(&DigestConfig::default())
    }
}

/// Classify with the default reference skill list.
pub fn classify(title: &str, location: &str, description: &str) -> Classification {
    static DEFAULT: OnceLock<Classifier> = OnceLock::new();
    DEFAULT
        .get_or_init(Classifier::default)
        .classify(title, location, description)
}

/// Role type from the title; earlier rules take precedence.
pub fn role_type(title: &str) -> RoleType {
    let t = title.to_lowercase();
    if t.contains("graduate") && t.contains("trainee") {
        RoleType::GraduateTrainee
    } else if t.contains("intern") {
        RoleType::Intern
    } else if t.contains("science") {
        RoleType::DataScience
    } else if t.contains("analyst") || t.contains("analytics") {
        RoleType::DataAnalyst
    } else {
        RoleType::Other
    }
}

/// Work mode from the title and location.
pub fn work_mode(title: &str, location: &str) -> WorkMode {
    let text = format!("{title} {location}").to_lowercase();
    if REMOTE_KEYWORDS.iter().any(|k| text.contains(k)) {
        WorkMode::Remote
    } else {
        WorkMode::Onsite
    }
}

/// Case-insensitive whole-word pattern; inner spaces match any whitespace run.
fn skill_pattern(term: &str) -> Result<Regex, regex::Error> {
    let body = term
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    RegexBuilder::new(&format!(r"\b{body}\b"))
        .case_insensitive(true)
        .build()
}
