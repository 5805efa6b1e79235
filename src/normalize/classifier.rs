//! Event classification from play-by-play description text.
//!
//! An ordered table of (matcher, category) rules evaluated in priority
//! order, so adding a new pattern is a data change. Keyword categories
//! outrank the shot fallback: "MISS Tatum Free Throw 1 of 2" is a free
//! throw, not a missed field goal.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::data::models::EventCategory;

/// Keyword rules, checked in order before the shot fallback.
static RULES: Lazy<Vec<(Regex, EventCategory)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r"(?i)^SUB:|\bSUB IN\b|\bSUB OUT\b").unwrap(),
            EventCategory::Substitution,
        ),
        (
            Regex::new(r"(?i)Free Throw").unwrap(),
            EventCategory::FreeThrow,
        ),
        (
            Regex::new(r"(?i)\bREBOUND\b").unwrap(),
            EventCategory::Rebound,
        ),
        (
            Regex::new(r"(?i)Turnover").unwrap(),
            EventCategory::Turnover,
        ),
        (Regex::new(r"(?i)\bSTEAL\b").unwrap(), EventCategory::Steal),
        (Regex::new(r"(?i)\bBLOCK\b").unwrap(), EventCategory::Block),
        (Regex::new(r"(?i)\bFOUL\b").unwrap(), EventCategory::Foul),
        (
            Regex::new(r"(?i)Timeout").unwrap(),
            EventCategory::Timeout,
        ),
        (
            Regex::new(r"(?i)Jump Ball").unwrap(),
            EventCategory::JumpBall,
        ),
        (
            Regex::new(r"(?i)Violation|Traveling|Palming|Goaltending").unwrap(),
            EventCategory::Violation,
        ),
    ]
});

/// "MISS" marks a missed attempt.
pub(crate) static RE_MISS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bMISS\b").unwrap());

/// "25 PTS" marks a made basket with the scorer's running total.
pub(crate) static RE_PTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d+)\s*PTS\b").unwrap());

/// Field-goal verbs that appear in shot descriptions.
pub(crate) static RE_SHOT_VERB: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(Shot|Layup|Dunk|Fadeaway|Tip|Putback|Alley Oop|Hook)\b").unwrap()
});

/// Classify a clean description line into an [`EventCategory`].
///
/// Never fails; text matching nothing is `Unknown`.
pub fn classify(text: &str) -> EventCategory {
    for (pattern, category) in RULES.iter() {
        if pattern.is_match(text) {
            return *category;
        }
    }

    // Shot fallback: an explicit MISS outranks made-shot markers because
    // miss descriptions still carry the shot verb.
    if RE_MISS.is_match(text) {
        return EventCategory::ShotMiss;
    }
    if RE_PTS.is_match(text) || RE_SHOT_VERB.is_match(text) {
        return EventCategory::ShotMade;
    }

    EventCategory::Unknown
}
