//! Rule-based lead scoring.
//!
//! Each matched criterion adds a fixed weight; the total is capped at 1.0.
//! Weights are kept in hundredths so sums are exact (0.4 + 0.3 + 0.2 == 0.9).

use regex::Regex;
use std::sync::LazyLock;

pub const DECISION_ROLE_REASON: &str = "Decision-making role";
pub const COMPANY_REASON: &str = "Company provided";
pub const REGION_REASON: &str = "High-conversion region";

const DECISION_ROLE_POINTS: u32 = 40;
const COMPANY_POINTS: u32 = 30;
const REGION_POINTS: u32 = 20;
const MAX_POINTS: u32 = 100;

static DECISION_ROLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)manager|director|head|founder").expect("valid role regex"));

// Whole words only: "us" must not match inside "Australia".
static HIGH_CONVERSION_REGION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(us|uk|canada|europe)\b").expect("valid region regex")
});

/// The lead attributes the scorer looks at.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreInput<'a> {
    pub role: Option<&'a str>,
    pub company: Option<&'a str>,
    pub region: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeadScore {
    /// Score in `[0, 1]`.
    pub score: f64,
    /// Matched criteria joined with ", "; empty when nothing matched.
    pub reason: String,
}

/// Whether a job title reads as a decision maker.
pub fn is_decision_maker(role: Option<&str>) -> bool {
    role.is_some_and(|r| DECISION_ROLE.is_match(r))
}

/// Character count of the company name after trimming whitespace.
pub fn company_len(company: Option<&str>) -> usize {
    company.map(|c| c.trim().chars().count()).unwrap_or(0)
}

pub fn is_high_conversion_region(region: Option<&str>) -> bool {
    region.is_some_and(|r| HIGH_CONVERSION_REGION.is_match(r))
}

/// Scores a lead. Missing fields simply do not contribute.
pub fn score_lead(input: ScoreInput<'_>) -> LeadScore {
    let mut points = 0u32;
    let mut reasons = Vec::with_capacity(3);

    if is_decision_maker(input.role) {
        points += DECISION_ROLE_POINTS;
        reasons.push(DECISION_ROLE_REASON);
    }

    if company_len(input.company) > 2 {
        points += COMPANY_POINTS;
        reasons.push(COMPANY_REASON);
    }

    if is_high_conversion_region(input.region) {
        points += REGION_POINTS;
        reasons.push(REGION_REASON);
    }

    LeadScore {
        score: f64::from(points.min(MAX_POINTS)) / 100.0,
        reason: reasons.join(", "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_criteria_add_up() {
        let result = score_lead(ScoreInput {
            role: Some("Head of Sales"),
            company: Some("Acme"),
            region: Some("US"),
        });
        assert_eq!(result.score, 0.9);
        assert_eq!(
            result.reason,
            "Decision-making role, Company provided, High-conversion region"
        );
    }

    #[test]
    fn empty_input_scores_zero() {
        let result = score_lead(ScoreInput::default());
        assert_eq!(result.score, 0.0);
        assert_eq!(result.reason, "");
    }

    #[test]
    fn role_match_is_case_insensitive_substring() {
        assert!(is_decision_maker(Some("ENGINEERING MANAGER")));
        assert!(is_decision_maker(Some("Co-Founder")));
        assert!(!is_decision_maker(Some("Software Engineer")));
        assert!(!is_decision_maker(None));
    }

    #[test]
    fn company_needs_more_than_two_trimmed_chars() {
        let short = score_lead(ScoreInput {
            company: Some("  AB  "),
            ..Default::default()
        });
        assert_eq!(short.score, 0.0);

        let ok = score_lead(ScoreInput {
            company: Some("ABC"),
            ..Default::default()
        });
        assert_eq!(ok.score, 0.3);
        assert_eq!(ok.reason, COMPANY_REASON);
    }

    #[test]
    fn region_matches_whole_words_only() {
        assert!(is_high_conversion_region(Some("us")));
        assert!(is_high_conversion_region(Some("UK")));
        assert!(is_high_conversion_region(Some("Western Europe")));
        assert!(is_high_conversion_region(Some("Toronto, Canada")));
        assert!(!is_high_conversion_region(Some("Australia")));
        assert!(!is_high_conversion_region(Some("Russia")));
        assert!(!is_high_conversion_region(Some("APAC")));
    }

    #[test]
    fn reason_order_is_fixed() {
        let result = score_lead(ScoreInput {
            role: Some("Director"),
            company: None,
            region: Some("Canada"),
        });
        assert_eq!(result.score, 0.6);
        assert_eq!(result.reason, "Decision-making role, High-conversion region");
    }
}
