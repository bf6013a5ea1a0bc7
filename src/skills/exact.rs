/// Exact (case-insensitive) skill overlap.
///
/// Asymmetric by construction: the denominator is always the number of
/// distinct required skills, so extra candidate skills never raise the score.

use std::collections::HashSet;

use super::SkillSet;

/// `|required ∩ candidate| / |required| * 100`, or 0 when nothing is required.
pub fn exact_match_pct<R: AsRef<str>, C: AsRef<str>>(required: &[R], candidate: &[C]) -> f64 {
    let required = SkillSet::new(required);
    if required.is_empty() {
        return 0.0;
    }
    let candidate = SkillSet::new(candidate);
    required.intersection_len(&candidate) as f64 / required.len() as f64 * 100.0
}

/// Split required skills into (matched, missing), keeping the job's spelling and order.
pub fn skill_coverage<R: AsRef<str>, C: AsRef<str>>(
    required: &[R],
    candidate: &[C],
) -> (Vec<String>, Vec<String>) {
    let candidate = SkillSet::new(candidate);
    let mut seen = HashSet::new();
    let mut matched = Vec::new();
    let mut missing = Vec::new();

    for skill in required {
        let skill = skill.as_ref().trim();
        if skill.is_empty() || !seen.insert(skill.to_lowercase()) {
            continue;
        }
        if candidate.contains(skill) {
            matched.push(skill.to_string());
        } else {
            missing.push(skill.to_string());
        }
    }

    (matched, missing)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: [&str; 3] = ["Python", "SQL", "Machine Learning"];

    #[test]
    fn test_empty_required_is_zero() {
        let none: [&str; 0] = [];
        assert_eq!(exact_match_pct(&none, &["python"]), 0.0);
        assert_eq!(exact_match_pct(&["", "  "], &["python"]), 0.0);
    }

    #[test]
    fn test_two_of_three() {
        let pct = exact_match_pct(&REQUIRED, &["python", "sql"]);
        assert!((pct - 66.666_666).abs() < 1e-3, "pct was {}", pct);
    }

    #[test]
    fn test_invariant_under_order_and_case() {
        let a = exact_match_pct(&REQUIRED, &["python", "sql", "docker"]);
        let b = exact_match_pct(&["machine learning", "sql", "PYTHON"], &["Docker", "SQL", "Python"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_denominator_is_required_count() {
        // Candidate has many extras; score is still bounded by required coverage
        let pct = exact_match_pct(&["Rust"], &["Rust", "Go", "Java", "C"]);
        assert_eq!(pct, 100.0);
        let pct = exact_match_pct(&["Rust", "Go", "Java", "C"], &["Rust"]);
        assert_eq!(pct, 25.0);
    }

    #[test]
    fn test_duplicates_counted_once() {
        assert_eq!(exact_match_pct(&["SQL", "sql", "Rust"], &["sql"]), 50.0);
    }

    #[test]
    fn test_skill_coverage() {
        let (matched, missing) = skill_coverage(&REQUIRED, &["PYTHON", "sql", "Excel"]);
        assert_eq!(matched, vec!["Python", "SQL"]);
        assert_eq!(missing, vec!["Machine Learning"]);
    }
}
