//! Skill normalization and matching.
//!
//! Skill lists arrive from the structured extractor in whatever shape it
//! produced. [`normalize_skills`] flattens them; the submodules score a
//! candidate's skills against a job's required skills.

pub mod exact;
pub mod matcher;
pub mod semantic;

pub use exact::{exact_match_pct, skill_coverage};
pub use matcher::{SkillMatchResult, SkillMatcher};
pub use semantic::{SemanticScore, SemanticScorer};

use serde_json::Value;
use std::collections::BTreeSet;

use crate::errors::Degradation;

/// Keys under which extracted records carry skills, checked in order.
const SKILL_KEYS: &[&str] = &[
    "Skills Required",
    "Required Skills",
    "required_skills",
    "skills_required",
    "Technical Skills",
    "technical_skills",
    "skills",
    "Skills",
];

/// Case-folded, trimmed, deduplicated skills. Never holds an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillSet(BTreeSet<String>);

impl SkillSet {
    pub fn new<S: AsRef<str>>(skills: &[S]) -> Self {
        SkillSet(
            skills
                .iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        )
    }

    /// Case-insensitive membership.
    pub fn contains(&self, skill: &str) -> bool {
        self.0.contains(&skill.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn intersection_len(&self, other: &SkillSet) -> usize {
        self.0.intersection(&other.0).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Flattened skills plus the reason, if the input shape had to be guessed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedSkills {
    pub skills: Vec<String>,
    pub ambiguity: Option<Degradation>,
}

/// Flatten a skill field of any supported shape into trimmed, non-empty strings.
///
/// Accepts a list of strings, a record holding one of the known skill keys
/// (optionally wrapped in `"result"`), a comma-separated string, or nothing.
/// Duplicates are dropped case-insensitively, keeping the first spelling.
/// Never fails; unknown shapes fall back to comma-splitting their JSON text.
pub fn normalize_skills(input: Option<&Value>) -> NormalizedSkills {
    let mut raw = Vec::new();
    let ambiguity = match input {
        None => None,
        Some(value) => collect(value, &mut raw),
    };

    let mut seen = BTreeSet::new();
    let skills = raw
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && seen.insert(s.to_lowercase()))
        .collect();

    NormalizedSkills { skills, ambiguity }
}

fn collect(value: &Value, out: &mut Vec<String>) -> Option<Degradation> {
    match value {
        Value::Null => None,
        Value::String(s) => {
            out.extend(split_commas(s));
            None
        }
        Value::Array(items) => {
            let mut ambiguity = None;
            for item in items {
                let found = match item {
                    Value::String(s) => {
                        out.push(s.clone());
                        None
                    }
                    Value::Number(n) => {
                        out.push(n.to_string());
                        None
                    }
                    other => collect(other, out),
                };
                ambiguity = ambiguity.or(found);
            }
            ambiguity
        }
        Value::Object(map) => {
            if let Some(inner) = map.get("result").filter(|v| v.is_object()) {
                return collect(inner, out);
            }
            if let Some(field) = SKILL_KEYS.iter().find_map(|k| map.get(*k)) {
                return collect(field, out);
            }
            // Entries such as {"name": "Rust", "level": "expert"}
            if let Some(Value::String(name)) = map.get("name").or_else(|| map.get("skill")) {
                out.push(name.clone());
                return None;
            }
            fallback(value, out)
        }
        Value::Bool(_) | Value::Number(_) => fallback(value, out),
    }
}

fn fallback(value: &Value, out: &mut Vec<String>) -> Option<Degradation> {
    let text = value.to_string();
    tracing::debug!(input = %text, "Unrecognised skill shape, splitting on commas");
    out.extend(split_commas(&text));
    Some(Degradation::NormalizationAmbiguity(format!(
        "unrecognised skill shape: {}",
        truncate(&text, 80)
    )))
}

fn split_commas(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(',').map(|part| part.trim().to_string())
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn skills(v: Value) -> Vec<String> {
        normalize_skills(Some(&v)).skills
    }

    #[test]
    fn test_flat_list_trimmed_and_deduplicated() {
        assert_eq!(
            skills(json!([" Python ", "SQL", "", "python", "  "])),
            vec!["Python", "SQL"]
        );
    }

    #[test]
    fn test_none_and_null_are_empty() {
        assert!(normalize_skills(None).skills.is_empty());
        assert!(skills(Value::Null).is_empty());
    }

    #[test]
    fn test_required_skills_key() {
        assert_eq!(
            skills(json!({"Skills Required": ["Rust", "Tokio"], "Job Title": "Engineer"})),
            vec!["Rust", "Tokio"]
        );
    }

    #[test]
    fn test_technical_skills_under_result_wrapper() {
        let record = json!({"result": {"Technical Skills": ["Go", "Kubernetes"], "Soft Skills": ["Empathy"]}});
        assert_eq!(skills(record), vec!["Go", "Kubernetes"]);
    }

    #[test]
    fn test_comma_separated_string() {
        let out = normalize_skills(Some(&json!("AWS, Docker,, Terraform")));
        assert_eq!(out.skills, vec!["AWS", "Docker", "Terraform"]);
        assert!(out.ambiguity.is_none());
    }

    #[test]
    fn test_object_entries_with_name() {
        assert_eq!(
            skills(json!([{"name": "Rust", "level": "expert"}, "SQL"])),
            vec!["Rust", "SQL"]
        );
    }

    #[test]
    fn test_unknown_record_degrades_to_comma_split() {
        let out = normalize_skills(Some(&json!({"foo": "bar"})));
        assert_eq!(out.skills, vec![r#"{"foo":"bar"}"#]);
        assert!(matches!(out.ambiguity, Some(Degradation::NormalizationAmbiguity(_))));
    }

    #[test]
    fn test_skill_set_is_case_insensitive() {
        let set = SkillSet::new(&["Python", "PYTHON", " sql ", ""]);
        assert_eq!(set.len(), 2);
        assert!(set.contains("python"));
        assert!(set.contains("SQL"));
        assert!(!set.contains(""));
    }
}
