/// Property-based tests using proptest
/// Tests invariants of scoring, qualification and enrichment for all inputs
use flowmeet_api::enrichment::{boost_score, BOOSTED_SCORE_CAP};
use flowmeet_api::qualification::{is_qualified, QUALIFICATION_THRESHOLD};
use flowmeet_api::scoring::{score_lead, ScoreInput};
use flowmeet_api::validation::is_valid_email;
use proptest::prelude::*;

fn opt(value: &Option<String>) -> Option<&str> {
    value.as_deref()
}

// Property: Score stays within [0, 1]
proptest! {
    #[test]
    fn score_is_bounded(
        role in proptest::option::of("\\PC*"),
        company in proptest::option::of("\\PC*"),
        region in proptest::option::of("\\PC*")
    ) {
        let scored = score_lead(ScoreInput {
            role: opt(&role),
            company: opt(&company),
            region: opt(&region),
        });
        prop_assert!((0.0..=1.0).contains(&scored.score));
    }

    #[test]
    fn empty_reason_means_zero_score(
        role in proptest::option::of("[a-z ]{0,12}"),
        company in proptest::option::of("[a-z]{0,6}"),
        region in proptest::option::of("[a-z]{0,8}")
    ) {
        let scored = score_lead(ScoreInput {
            role: opt(&role),
            company: opt(&company),
            region: opt(&region),
        });
        prop_assert_eq!(scored.reason.is_empty(), scored.score == 0.0);
    }
}

// Property: Qualification is monotonic in score
proptest! {
    #[test]
    fn qualification_is_monotonic(
        s1 in 0.0f64..=1.0,
        delta in 0.0f64..=1.0,
        role in proptest::option::of("(Founder|CEO|Head of Sales|Engineer|Intern)"),
        company in proptest::option::of("[A-Za-z]{0,5}")
    ) {
        let s2 = (s1 + delta).min(1.0);
        if is_qualified(s1, opt(&role), opt(&company)) {
            prop_assert!(is_qualified(s2, opt(&role), opt(&company)));
        }
    }

    #[test]
    fn threshold_alone_qualifies(score in QUALIFICATION_THRESHOLD..=1.0) {
        prop_assert!(is_qualified(score, None, None));
    }

    #[test]
    fn single_char_company_never_uses_override(
        score in 0.0f64..QUALIFICATION_THRESHOLD,
        c in "[A-Za-z]"
    ) {
        prop_assert!(!is_qualified(score, Some("Founder"), Some(&c)));
    }

    #[test]
    fn two_char_company_uses_override(
        score in 0.0f64..QUALIFICATION_THRESHOLD,
        company in "[A-Za-z]{2}"
    ) {
        prop_assert!(is_qualified(score, Some("Founder"), Some(&company)));
    }
}

// Property: Enrichment boost never lowers a score and respects the cap
proptest! {
    #[test]
    fn boost_never_lowers(points in 0u32..=100) {
        let score = f64::from(points) / 100.0;
        let boosted = boost_score(score);
        prop_assert!(boosted >= score);
        prop_assert!(boosted <= BOOSTED_SCORE_CAP.max(score));
    }
}

// Property: Email validation should never panic
proptest! {
    #[test]
    fn email_validation_never_panics(email in "\\PC*") {
        let _ = is_valid_email(&email);
    }

    #[test]
    fn well_formed_emails_accepted(
        local in "[a-z]{1,10}",
        domain in "[a-z]{1,10}",
        tld in "[a-z]{2,4}"
    ) {
        let email = format!("{}@{}.{}", local, domain, tld);
        prop_assert!(is_valid_email(&email));
    }
}
