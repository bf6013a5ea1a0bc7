/// Loading job and candidate documents from disk.
///
/// `.json` files are treated as already-extracted records; anything else is
/// read as UTF-8 text and sent through a `ProfileExtractor`. The job
/// description must load. A candidate that cannot be read is skipped with a
/// warning so the rest of the batch is still ranked.

use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::errors::{Degradation, RankerError};
use crate::extraction::ProfileExtractor;
use crate::profile::{CandidateProfile, JobProfile, display_name};

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

fn read_text(path: &Path) -> Result<String, RankerError> {
    std::fs::read_to_string(path)
        .map_err(|e| RankerError::input(&path.display().to_string(), &format!("Failed to read: {}", e)))
}

fn read_record(path: &Path) -> Result<Value, RankerError> {
    let text = read_text(path)?;
    serde_json::from_str(&text)
        .map_err(|e| RankerError::input(&path.display().to_string(), &format!("Invalid JSON: {}", e)))
}

/// Load the job description. Any failure here is fatal for the run.
pub async fn load_job(path: &Path, extractor: &dyn ProfileExtractor) -> Result<JobProfile, RankerError> {
    if is_json(path) {
        return Ok(JobProfile::from_record(&read_record(path)?));
    }
    let text = read_text(path)?;
    if text.trim().is_empty() {
        return Err(RankerError::input(&path.display().to_string(), "Job description is empty"));
    }
    let record = extractor.extract_job(&text).await?;
    Ok(JobProfile::from_record(&record))
}

/// Load one candidate. `None` means the document had no usable content.
///
/// Unreadable files, non-UTF-8 text, and invalid JSON records are logged
/// and skipped. A failed extraction still yields a profile rated on the
/// raw text, tagged as degraded.
pub async fn load_candidate(path: &Path, extractor: &dyn ProfileExtractor) -> Option<CandidateProfile> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    if is_json(path) {
        return match read_record(path) {
            Ok(record) => Some(CandidateProfile::from_record(&file_name, &record)),
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "Skipped candidate: unreadable record");
                None
            }
        };
    }

    let text = match read_text(path) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(file = %path.display(), error = %e, "Skipped candidate: unreadable document");
            return None;
        }
    };
    if text.trim().is_empty() {
        tracing::warn!(file = %path.display(), "Skipped candidate: empty document");
        return None;
    }

    match extractor.extract_candidate(&text).await {
        Ok(record) => Some(CandidateProfile::from_record(&file_name, &record)),
        Err(e) => {
            // Rate on the raw text; skills stay empty
            tracing::warn!(file = %file_name, error = %e, "Structured extraction failed");
            let mut profile = CandidateProfile::new(display_name(&file_name), Vec::new(), text.trim());
            profile.degradations.push(Degradation::MalformedModelOutput(e.to_string()));
            Some(profile)
        }
    }
}

/// Load every candidate in order, dropping the ones with no usable content.
pub async fn load_candidates(paths: &[PathBuf], extractor: &dyn ProfileExtractor) -> Vec<CandidateProfile> {
    let mut candidates = Vec::with_capacity(paths.len());
    for path in paths {
        if let Some(profile) = load_candidate(path, extractor).await {
            candidates.push(profile);
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::ExtractionError;
    use async_trait::async_trait;
    use serde_json::json;

    /// Returns a fixed record for text mentioning "Rust", fails otherwise.
    struct FixedExtractor;

    #[async_trait]
    impl ProfileExtractor for FixedExtractor {
        async fn extract_candidate(&self, text: &str) -> Result<Value, ExtractionError> {
            if text.contains("Rust") {
                Ok(json!({"name": "Ada Lovelace", "Technical Skills": ["Rust"], "Experience": []}))
            } else {
                Err(ExtractionError::MalformedOutput {
                    reason: "No JSON object found".to_string(),
                    content: String::new(),
                })
            }
        }

        async fn extract_job(&self, _text: &str) -> Result<Value, ExtractionError> {
            Ok(json!({"Job Title": "Engineer", "Skills Required": ["Rust"]}))
        }
    }

    fn write(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[tokio::test]
    async fn test_bad_candidates_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let paths = vec![
            write(dir.path(), "broken.json", b"{\"name\": \"Broken\""),
            write(dir.path(), "jane_doe.json", br#"{"name": "Jane Doe", "skills": ["SQL"]}"#),
            write(dir.path(), "scan.txt", &[0xff, 0xfe, 0x00, 0x9f, 0x92]),
            write(dir.path(), "blank.txt", b"   \n"),
            dir.path().join("missing.txt"),
            write(dir.path(), "ada.txt", b"Rust developer, 5 years"),
        ];

        let candidates = load_candidates(&paths, &FixedExtractor).await;
        let names: Vec<&str> = candidates.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Jane Doe", "Ada Lovelace"]);
    }

    #[tokio::test]
    async fn test_failed_extraction_keeps_raw_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "john_smith_resume.txt", b"Ten years of COBOL");

        let profile = load_candidate(&path, &FixedExtractor).await.unwrap();
        assert_eq!(profile.name, "John Smith");
        assert!(profile.skills.is_empty());
        assert_eq!(profile.experience, "Ten years of COBOL");
        assert!(matches!(profile.degradations[..], [Degradation::MalformedModelOutput(_)]));
    }

    #[tokio::test]
    async fn test_job_errors_are_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let broken = write(dir.path(), "job.json", b"not json");
        let empty = write(dir.path(), "job.txt", b"");

        assert!(matches!(
            load_job(&broken, &FixedExtractor).await,
            Err(RankerError::Input { .. })
        ));
        assert!(load_job(&empty, &FixedExtractor).await.is_err());

        let text = write(dir.path(), "role.txt", b"We need a Rust engineer");
        let job = load_job(&text, &FixedExtractor).await.unwrap();
        assert_eq!(job.required_skills, vec!["Rust"]);
    }
}
