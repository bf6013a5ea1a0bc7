//! Candidate and job profiles built from extracted records.
//!
//! The structured extractor returns loosely shaped JSON. Resumes look like
//! `{"result": {"name": ..., "Technical Skills": [...], "Experience": [...]}}`,
//! job descriptions like `{"Job Title": ..., "Experience Required": ..., "Skills Required": [...]}`.
//! Conversion here is tolerant: missing fields become defaults, never errors.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::Degradation;
use crate::skills::normalize_skills;

/// Placeholder used when a record carries no experience text.
pub const NOT_PROVIDED: &str = "Not provided";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub name: String,
    pub skills: Vec<String>,
    /// One line per role, or the extractor's free text
    pub experience: String,
    #[serde(default)]
    pub degradations: Vec<Degradation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobProfile {
    pub title: Option<String>,
    pub required_skills: Vec<String>,
    pub required_experience: String,
    #[serde(default)]
    pub degradations: Vec<Degradation>,
}

impl CandidateProfile {
    pub fn new(name: impl Into<String>, skills: Vec<String>, experience: impl Into<String>) -> Self {
        CandidateProfile {
            name: name.into(),
            skills,
            experience: experience.into(),
            degradations: Vec::new(),
        }
    }

    /// Build a profile from an extracted resume record.
    ///
    /// `file_name` supplies the display name when the record has none.
    pub fn from_record(file_name: &str, record: &Value) -> Self {
        let body = unwrap_result(record);
        let skills = normalize_skills(
            field(body, &["Technical Skills", "technical_skills", "skills", "Skills"]),
        );

        CandidateProfile {
            name: record_name(body).unwrap_or_else(|| display_name(file_name)),
            skills: skills.skills,
            experience: field(body, &["Experience", "experience"])
                .map(describe_experience)
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| NOT_PROVIDED.to_string()),
            degradations: skills.ambiguity.into_iter().collect(),
        }
    }
}

impl JobProfile {
    pub fn new(required_skills: Vec<String>, required_experience: impl Into<String>) -> Self {
        JobProfile {
            title: None,
            required_skills,
            required_experience: required_experience.into(),
            degradations: Vec::new(),
        }
    }

    /// Build a profile from an extracted job description record.
    pub fn from_record(record: &Value) -> Self {
        let body = unwrap_result(record);
        let skills = normalize_skills(field(
            body,
            &["Skills Required", "Required Skills", "required_skills", "skills_required", "skills"],
        ));

        JobProfile {
            title: field(body, &["Job Title", "job_title", "title"])
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            required_skills: skills.skills,
            required_experience: field(
                body,
                &["Experience Required", "experience_required", "required_experience", "experience"],
            )
            .map(describe_experience)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| NOT_PROVIDED.to_string()),
            degradations: skills.ambiguity.into_iter().collect(),
        }
    }
}

/// Turn a file name into a short display name.
///
/// `"john_doe_resume.pdf"` becomes `"John Doe"`: extension dropped,
/// underscores as spaces, title case, at most the first two words.
pub fn display_name(file_name: &str) -> String {
    let base = std::path::Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file_name);
    let stem = base.split('.').next().unwrap_or(base);

    let words: Vec<String> = stem
        .replace(['_', '-'], " ")
        .split_whitespace()
        .take(2)
        .map(title_case)
        .collect();

    if words.is_empty() {
        file_name.to_string()
    } else {
        words.join(" ")
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn unwrap_result(record: &Value) -> &Value {
    match record.get("result") {
        Some(inner) if inner.is_object() => inner,
        _ => record,
    }
}

fn field<'a>(body: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let map = body.as_object()?;
    keys.iter().find_map(|k| map.get(*k)).filter(|v| !v.is_null())
}

fn record_name(body: &Value) -> Option<String> {
    if let Some(name) = field(body, &["name", "Name"]).and_then(Value::as_str) {
        let name = name.trim();
        if !name.is_empty() {
            return Some(name.to_string());
        }
    }

    let personal = field(body, &["Personal_Information", "personal_information"])?.as_object()?;
    let parts: Vec<&str> = ["First Name", "Last Name"]
        .iter()
        .filter_map(|k| personal.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    (!parts.is_empty()).then(|| parts.join(" "))
}

/// Flatten an experience field into prompt-ready text.
fn describe_experience(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .map(describe_experience)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Object(entry) => describe_role(entry),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn describe_role(entry: &Map<String, Value>) -> String {
    let get = |keys: &[&str]| {
        keys.iter()
            .find_map(|k| entry.get(*k).and_then(Value::as_str))
            .map(str::trim)
            .filter(|s| !s.is_empty())
    };

    let mut line = match (get(&["Position", "position", "title"]), get(&["Company", "company"])) {
        (Some(p), Some(c)) => format!("{} at {}", p, c),
        (Some(p), None) => p.to_string(),
        (None, Some(c)) => c.to_string(),
        (None, None) => return Value::Object(entry.clone()).to_string(),
    };

    let location = get(&["Location", "location"]);
    let period = match (get(&["Start_Date", "start_date"]), get(&["End_Date", "end_date"])) {
        (Some(s), Some(e)) => Some(format!("{} - {}", s, e)),
        (Some(s), None) => Some(format!("{} - present", s)),
        _ => None,
    };
    let details: Vec<String> = location.map(str::to_string).into_iter().chain(period).collect();
    if !details.is_empty() {
        line.push_str(&format!(" ({})", details.join(", ")));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("john_doe_resume.pdf"), "John Doe");
        assert_eq!(display_name("uploads/ALICE.txt"), "Alice");
        assert_eq!(display_name("mary-jane_watson_cv.json"), "Mary Jane");
        assert_eq!(display_name(".pdf"), ".pdf");
    }

    #[test]
    fn test_candidate_from_wrapped_record() {
        let record = json!({
            "result": {
                "Personal_Information": {"First Name": "Ada", "Last Name": "Lovelace"},
                "Technical Skills": ["Python", " SQL "],
                "Experience": [
                    {"Position": "Data Engineer", "Company": "Acme", "Location": "Berlin",
                     "Start_Date": "2019-01", "End_Date": "2023-06"},
                    {"Position": "Analyst", "Company": "Initech"}
                ]
            }
        });
        let profile = CandidateProfile::from_record("ada_resume.pdf", &record);
        assert_eq!(profile.name, "Ada Lovelace");
        assert_eq!(profile.skills, vec!["Python", "SQL"]);
        assert_eq!(
            profile.experience,
            "Data Engineer at Acme (Berlin, 2019-01 - 2023-06)\nAnalyst at Initech"
        );
        assert!(profile.degradations.is_empty());
    }

    #[test]
    fn test_candidate_defaults() {
        let profile = CandidateProfile::from_record("bob_smith.pdf", &json!({}));
        assert_eq!(profile.name, "Bob Smith");
        assert!(profile.skills.is_empty());
        assert_eq!(profile.experience, NOT_PROVIDED);
    }

    #[test]
    fn test_job_from_record() {
        let record = json!({
            "Job Title": "Backend Engineer",
            "Experience Required": "3+ years building APIs",
            "Skills Required": ["Rust", "PostgreSQL"]
        });
        let job = JobProfile::from_record(&record);
        assert_eq!(job.title.as_deref(), Some("Backend Engineer"));
        assert_eq!(job.required_skills, vec!["Rust", "PostgreSQL"]);
        assert_eq!(job.required_experience, "3+ years building APIs");
    }

    #[test]
    fn test_job_without_skills() {
        let job = JobProfile::from_record(&json!({"Job Title": "Mystery"}));
        assert!(job.required_skills.is_empty());
        assert_eq!(job.required_experience, NOT_PROVIDED);
    }
}
