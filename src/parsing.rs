/// Parsers for untrusted free-text model output.
///
/// Two independent primitives:
/// - rating extraction for the `Rating: <n>/10` response line
///   (also matches `Experience Rating: <n>/10`), plus the `Conclusion:` points
/// - balanced-brace extraction of the first JSON object embedded in prose
///
/// Neither ever panics or returns a partial structure; failures come back as
/// explicit values the caller can turn into a default.

use regex::Regex;
use serde_json::{Value, json};
use thiserror::Error;

use crate::errors::Degradation;

/// Highest rating the response format allows.
pub const MAX_RATING: u8 = 10;

/// Outcome of looking for a rating line.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingParse {
    /// Rating in 0..=10; 0 when nothing usable was found
    pub rating: u8,
    pub degradation: Option<Degradation>,
}

/// First `<n>` of a `Rating: <n>/10` occurrence, unclamped. Label case is exact.
///
/// Digit runs too long for `u64` saturate to `u64::MAX`.
pub fn find_rating(text: &str) -> Option<u64> {
    let re = Regex::new(r"Rating:\s*(\d+)/10").ok()?;
    let digits = re.captures(text)?.get(1)?.as_str();
    Some(digits.parse().unwrap_or(u64::MAX))
}

/// Rating with its degradation reason, clamped to 0..=10.
pub fn parse_rating(text: &str) -> RatingParse {
    match find_rating(text) {
        Some(n) if n <= MAX_RATING as u64 => RatingParse {
            rating: n as u8,
            degradation: None,
        },
        Some(n) => RatingParse {
            rating: MAX_RATING,
            degradation: Some(Degradation::MalformedModelOutput(format!(
                "rating {}/10 out of range, clamped to {}",
                n, MAX_RATING
            ))),
        },
        None => RatingParse {
            rating: 0,
            degradation: Some(Degradation::MalformedModelOutput(
                "no 'Rating: <n>/10' line in model output".to_string(),
            )),
        },
    }
}

/// Rating in 0..=10, defaulting to 0 when no rating line is present.
pub fn extract_rating(text: &str) -> u8 {
    parse_rating(text).rating
}

/// Factual points listed after the last `Conclusion:` label.
///
/// Points are separated by `•` bullets or newline-dash bullets. Without a
/// label the whole trimmed text is treated as the conclusion.
pub fn conclusion_points(text: &str) -> Vec<String> {
    let body = match text.rfind("Conclusion:") {
        Some(idx) => &text[idx + "Conclusion:".len()..],
        None => text,
    };
    let body = body.trim();
    if body.is_empty() {
        return Vec::new();
    }

    body.replace("\n-", "•")
        .split('•')
        .map(|p| p.trim_matches(|c: char| c == '•' || c == '-' || c.is_whitespace()))
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Why a JSON object could not be pulled out of a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JsonExtractError {
    #[error("No JSON object found")]
    NoObject,

    #[error("Unbalanced braces")]
    Unbalanced,

    #[error("Invalid JSON: {0}")]
    Invalid(String),
}

/// Byte span of the first `{ ... }` whose brace depth returns to zero.
///
/// Braces are counted literally; quoting is not interpreted.
pub fn balanced_span(text: &str) -> Result<(usize, usize), JsonExtractError> {
    let start = text.find('{').ok_or(JsonExtractError::NoObject)?;
    let mut depth = 0usize;
    for (offset, byte) in text.as_bytes()[start..].iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((start, start + offset + 1));
                }
            }
            _ => {}
        }
    }
    Err(JsonExtractError::Unbalanced)
}

/// Parse the first balanced JSON object in `text`.
pub fn try_extract_json(text: &str) -> Result<Value, JsonExtractError> {
    let (start, end) = balanced_span(text)?;
    serde_json::from_str(&text[start..end]).map_err(|e| JsonExtractError::Invalid(e.to_string()))
}

/// Like [`try_extract_json`], but failures become
/// `{"error": <reason>, "raw_response": <text>}`.
pub fn extract_json(text: &str) -> Value {
    match try_extract_json(text) {
        Ok(value) => value,
        Err(e) => json!({
            "error": e.to_string(),
            "raw_response": text,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_rating() {
        assert_eq!(extract_rating("Rating: 7/10"), 7);
    }

    #[test]
    fn test_experience_rating_with_conclusion() {
        assert_eq!(extract_rating("Experience Rating: 10/10\nConclusion: ..."), 10);
    }

    #[test]
    fn test_no_rating_defaults_to_zero() {
        let parsed = parse_rating("The candidate looks strong overall.");
        assert_eq!(parsed.rating, 0);
        assert!(matches!(parsed.degradation, Some(Degradation::MalformedModelOutput(_))));
    }

    #[test]
    fn test_label_is_case_sensitive() {
        assert_eq!(extract_rating("rating: 8/10"), 0);
        assert_eq!(extract_rating("RATING: 8/10"), 0);
    }

    #[test]
    fn test_first_match_wins_and_whitespace_allowed() {
        assert_eq!(extract_rating("blah Rating:   4/10 then Rating: 9/10"), 4);
    }

    #[test]
    fn test_out_of_range_is_clamped_and_tagged() {
        let parsed = parse_rating("Rating: 12/10");
        assert_eq!(parsed.rating, 10);
        assert!(parsed.degradation.is_some());
    }

    #[test]
    fn test_overflowing_rating_is_clamped_like_out_of_range() {
        let parsed = parse_rating("Experience Rating: 99999999999999999999/10");
        assert_eq!(parsed.rating, parse_rating("Experience Rating: 12/10").rating);
        assert_eq!(parsed.rating, 10);
        match parsed.degradation {
            Some(Degradation::MalformedModelOutput(reason)) => assert!(reason.contains("out of range")),
            other => panic!("expected out-of-range tag, got {:?}", other),
        }
    }

    #[test]
    fn test_model_error_text_yields_zero() {
        assert_eq!(extract_rating("Error calling model: connection refused"), 0);
    }

    #[test]
    fn test_conclusion_bullets() {
        let text = "Experience Rating: 6/10\nConclusion:\n- 5 years Python\n- Led a team of 4\n- No cloud work\n- Strong SQL\n- Relevant domain";
        let points = conclusion_points(text);
        assert_eq!(points.len(), 5);
        assert_eq!(points[0], "5 years Python");
        assert_eq!(points[4], "Relevant domain");
    }

    #[test]
    fn test_conclusion_dot_bullets() {
        let points = conclusion_points("Conclusion: • A • B •C");
        assert_eq!(points, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_conclusion_without_label_is_whole_text() {
        assert_eq!(conclusion_points("  just prose  "), vec!["just prose"]);
        assert!(conclusion_points("Conclusion:   ").is_empty());
    }

    #[test]
    fn test_nested_json_in_noise() {
        let value = try_extract_json(r#"noise {"a": {"b": 1}} trailing"#).unwrap();
        assert_eq!(value, json!({"a": {"b": 1}}));
    }

    #[test]
    fn test_unterminated_json_is_error_object() {
        let input = r#"{"a": "#;
        let value = extract_json(input);
        assert_eq!(value["raw_response"], input);
        assert_eq!(value["error"], "Unbalanced braces");
    }

    #[test]
    fn test_no_brace_is_error_object() {
        let value = extract_json("no json here");
        assert_eq!(value["error"], "No JSON object found");
        assert_eq!(value["raw_response"], "no json here");
    }

    #[test]
    fn test_balanced_but_invalid_json() {
        let input = "here {not json} ok";
        assert!(matches!(try_extract_json(input), Err(JsonExtractError::Invalid(_))));
        let value = extract_json(input);
        assert!(value["error"].as_str().unwrap().starts_with("Invalid JSON"));
        assert_eq!(value["raw_response"], input);
    }

    #[test]
    fn test_only_first_object_is_taken() {
        let value = try_extract_json(r#"{"x": 1} and {"y": 2}"#).unwrap();
        assert_eq!(value, json!({"x": 1}));
    }
}
