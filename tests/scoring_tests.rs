/// Scenario tests for scoring and qualification
use flowmeet_api::qualification::{booking_url, is_qualified, status_label};
use flowmeet_api::scoring::{score_lead, ScoreInput};

#[cfg(test)]
mod scoring_scenarios {
    use super::*;

    #[test]
    fn all_criteria_score_point_nine() {
        let scored = score_lead(ScoreInput {
            role: Some("Head of Sales"),
            company: Some("Acme"),
            region: Some("US"),
        });
        assert_eq!(scored.score, 0.9);
        assert_eq!(
            scored.reason,
            "Decision-making role, Company provided, High-conversion region"
        );
    }

    #[test]
    fn empty_input_scores_zero() {
        let scored = score_lead(ScoreInput::default());
        assert_eq!(scored.score, 0.0);
        assert_eq!(scored.reason, "");
    }

    #[test]
    fn region_match_is_whole_word() {
        let scored = score_lead(ScoreInput {
            region: Some("Australia"),
            ..Default::default()
        });
        assert_eq!(scored.score, 0.0);

        let scored = score_lead(ScoreInput {
            region: Some("Western Europe"),
            ..Default::default()
        });
        assert_eq!(scored.score, 0.2);
    }

    #[test]
    fn short_company_is_not_counted() {
        let scored = score_lead(ScoreInput {
            company: Some("IO"),
            ..Default::default()
        });
        assert_eq!(scored.score, 0.0);
    }
}

#[cfg(test)]
mod qualification_scenarios {
    use super::*;

    #[test]
    fn founder_override_boundary() {
        // "X" is too short, "XY" is enough
        assert!(!is_qualified(0.4, Some("Founder"), Some("X")));
        assert!(is_qualified(0.4, Some("Founder"), Some("XY")));
    }

    #[test]
    fn qualified_lead_gets_workspace_link() {
        let qualified = is_qualified(0.9, Some("CEO"), Some("Acme"));
        assert!(qualified);
        assert_eq!(
            booking_url(qualified, Some("https://cal.com/acme"), "https://default"),
            Some("https://cal.com/acme".to_string())
        );
        assert_eq!(status_label(qualified), "Qualified");
    }

    #[test]
    fn unqualified_lead_gets_no_link() {
        assert_eq!(
            booking_url(false, Some("https://cal.com/acme"), "https://default"),
            None
        );
        assert_eq!(status_label(false), "Unqualified");
    }
}
