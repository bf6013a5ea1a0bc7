/// Rendering of ranked results for the presentation layer.
///
/// CSV with the columns `candidate_name, experience_pct, skill_pct, total`,
/// an aligned plain-text table, and a JSON report for cross-run comparison.
/// Zero or degraded scores carry their explanation so operators can tell a
/// true zero match from a scoring fallback.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RankingResult;

/// Full report for one ranking run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingReport {
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    pub job_title: Option<String>,
    pub cancelled: bool,
    pub results: Vec<RankingResult>,
}

impl RankingReport {
    pub fn new(job_title: Option<String>, results: Vec<RankingResult>, cancelled: bool) -> Self {
        RankingReport {
            run_id: uuid::Uuid::new_v4().to_string(),
            generated_at: Utc::now(),
            job_title,
            cancelled,
            results,
        }
    }
}

/// CSV with a header row, two decimals per score.
pub fn to_csv(results: &[RankingResult]) -> String {
    let mut out = String::from("candidate_name,experience_pct,skill_pct,total\n");
    for r in results {
        out.push_str(&format!(
            "{},{:.2},{:.2},{:.2}\n",
            csv_field(&r.candidate_name),
            r.aggregate.experience_component,
            r.aggregate.skill_component,
            r.aggregate.total
        ));
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Aligned table, one row per candidate, with notes under suspicious rows.
pub fn to_table(results: &[RankingResult]) -> String {
    let name_width = results
        .iter()
        .map(|r| r.candidate_name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Candidate".len());

    let mut out = format!(
        "{:<4} {:<name_width$} {:>10} {:>10} {:>10}\n",
        "Rank", "Candidate", "Experience", "Skills", "Total"
    );
    out.push_str(&format!("{}\n", "-".repeat(4 + 1 + name_width + 3 * 11)));

    for (idx, r) in results.iter().enumerate() {
        out.push_str(&format!(
            "{:<4} {:<name_width$} {:>9.2}% {:>9.2}% {:>9.2}%\n",
            idx + 1,
            r.candidate_name,
            r.aggregate.experience_component,
            r.aggregate.skill_component,
            r.aggregate.total
        ));
        for note in notes(r) {
            out.push_str(&format!("     note: {}\n", note));
        }
    }
    out
}

/// Explanations worth showing next to a row.
///
/// Degradation reasons always; the skill explanation and the first line of the
/// model answer whenever a component scored zero.
pub fn notes(result: &RankingResult) -> Vec<String> {
    let mut notes: Vec<String> = result.degradations.iter().map(|d| d.to_string()).collect();
    if result.aggregate.skill_component == 0.0 {
        notes.push(result.skill_match.explanation.clone());
    }
    if result.experience_rating.rating == 0 {
        if let Some(line) = result.experience_rating.raw_text.lines().map(str::trim).find(|l| !l.is_empty()) {
            notes.push(format!("model said: {}", line));
        }
    }
    notes.dedup();
    notes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Degradation;
    use crate::experience::ExperienceRating;
    use crate::ranking::AggregateScore;
    use crate::skills::SkillMatchResult;

    fn result(name: &str, rating_text: &str, skill: f64, total: f64) -> RankingResult {
        let mut skill_match = SkillMatchResult::no_required_skills();
        skill_match.final_pct = skill;
        skill_match.explanation = format!("Skills match: {:.2}%", skill);
        let experience_rating = ExperienceRating::from_response(rating_text.to_string());
        RankingResult {
            candidate_name: name.to_string(),
            aggregate: AggregateScore {
                experience_component: experience_rating.pct(),
                skill_component: skill,
                total,
            },
            degradations: experience_rating.degradations.clone(),
            experience_rating,
            skill_match,
        }
    }

    #[test]
    fn test_csv_header_and_rows() {
        let rows = vec![
            result("Jane Roe", "Rating: 9/10", 83.67, 86.2),
            result("Doe, John", "Rating: 4/10", 40.0, 40.0),
        ];
        let csv = to_csv(&rows);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "candidate_name,experience_pct,skill_pct,total");
        assert_eq!(lines[1], "Jane Roe,90.00,83.67,86.20");
        assert_eq!(lines[2], "\"Doe, John\",40.00,40.00,40.00");
    }

    #[test]
    fn test_csv_escapes_quotes() {
        assert_eq!(csv_field("A \"B\""), "\"A \"\"B\"\"\"");
    }

    #[test]
    fn test_table_lists_ranks_in_order() {
        let rows = vec![
            result("Jane", "Rating: 9/10", 80.0, 84.0),
            result("Joe", "Rating: 5/10", 50.0, 50.0),
        ];
        let table = to_table(&rows);
        let lines: Vec<&str> = table.lines().collect();
        assert!(lines[2].starts_with("1    Jane"));
        assert!(lines[3].starts_with("2    Joe"));
    }

    #[test]
    fn test_notes_surface_zero_scores() {
        let r = result("Zed", "Error calling model: Transport error: refused", 0.0, 0.0);
        let notes = notes(&r);
        assert!(notes.iter().any(|n| n.contains("Skills match: 0.00%")));
        assert!(notes.iter().any(|n| n.starts_with("model said: Error calling model:")));
        assert!(r.degradations.iter().any(|d| matches!(d, Degradation::MalformedModelOutput(_))));
    }

    #[test]
    fn test_report_serializes_results() {
        let report = RankingReport::new(Some("SRE".to_string()), vec![result("A", "Rating: 5/10", 50.0, 50.0)], false);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["job_title"], "SRE");
        assert_eq!(json["results"][0]["candidate_name"], "A");
        assert_eq!(json["results"][0]["aggregate"]["total"], 50.0);
    }
}
