//! Qualification policy and booking-link selection.

use crate::scoring::{company_len, is_decision_maker};

/// Minimum score that qualifies a lead on its own.
pub const QUALIFICATION_THRESHOLD: f64 = 0.6;

pub const STATUS_QUALIFIED: &str = "Qualified";
pub const STATUS_UNQUALIFIED: &str = "Unqualified";

/// A lead qualifies when its score reaches the threshold, or when a
/// decision-maker title comes with a company name longer than one character.
pub fn is_qualified(score: f64, role: Option<&str>, company: Option<&str>) -> bool {
    score >= QUALIFICATION_THRESHOLD || (is_decision_maker(role) && company_len(company) > 1)
}

/// Booking link for a lead: the workspace's own link when set, otherwise the
/// configured default. Unqualified leads get none.
pub fn booking_url(
    qualified: bool,
    workspace_url: Option<&str>,
    default_url: &str,
) -> Option<String> {
    if !qualified {
        return None;
    }
    let url = workspace_url
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .unwrap_or(default_url);
    Some(url.to_string())
}

pub fn status_label(qualified: bool) -> &'static str {
    if qualified {
        STATUS_QUALIFIED
    } else {
        STATUS_UNQUALIFIED
    }
}
