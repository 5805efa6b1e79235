//! Raw block → normalized event.
//!
//! Splits the clock/score/description blob, classifies the description,
//! extracts shot and free-throw details, and derives points from the
//! category rather than parsing score text. Never fails: unparseable
//! text degrades to an UNKNOWN event with the raw blob retained, so the
//! event index stays stable for the lineup tracker and segmenter.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::data::models::{
    Clock, EventCategory, NormalizedEvent, PlayerId, RawEventBlock, SubDirection, TeamId,
};
use crate::normalize::classifier;

// =============================================================================
// Extraction patterns
// =============================================================================

/// Running score line, e.g. "98 - 102" (away - home).
static RE_SCORE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,3})\s*[-\u{2013}]\s*(\d{1,3})$").unwrap());

/// Shot distance: digits immediately preceding an apostrophe ("26'").
static RE_DISTANCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)'").unwrap());

/// Three-point marker.
static RE_THREE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b3-?PT\b").unwrap());

/// Free-throw sequence marker, e.g. "1 of 2".
static RE_FT_SEQ: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(\d)\s+OF\s+(\d)\b").unwrap());

/// Technical free throws and fouls.
static RE_TECHNICAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)TECHNICAL").unwrap());

static RE_SUB_IN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bSUB IN\b").unwrap());
static RE_SUB_OUT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bSUB OUT\b").unwrap());

/// Assist parenthetical: "(Brown 5 AST)".
static RE_ASSIST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\(([A-Za-z.'\- ]+?)\s*\d*\s*AST\)").unwrap());

/// Leading name token, after an optional MISS or substitution prefix.
static RE_LEAD_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:MISS\s+|SUB(?: IN| OUT)?:\s*)?([A-Z][A-Za-z.'\-]*)").unwrap()
});

// =============================================================================
// Line splitting
// =============================================================================

/// Split a raw blob into (clock, away score, home score, description).
///
/// Line 0 is the clock; line 1 is consumed as the running score when it
/// matches `number - number`, otherwise it belongs to the description.
fn parse_clock_and_score(raw_text: &str) -> (Option<Clock>, Option<u32>, Option<u32>, String) {
    let lines: Vec<&str> = raw_text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let Some((first, rest)) = lines.split_first() else {
        return (None, None, None, String::new());
    };

    let clock = Clock::parse(first);

    let (away, home, desc_lines) = match rest.split_first() {
        Some((second, tail)) => {
            if let Some(caps) = RE_SCORE.captures(second) {
                let away = caps.get(1).and_then(|m| m.as_str().parse().ok());
                let home = caps.get(2).and_then(|m| m.as_str().parse().ok());
                (away, home, tail)
            } else {
                (None, None, rest)
            }
        }
        None => (None, None, rest),
    };

    (clock, away, home, desc_lines.join(" "))
}

// =============================================================================
// Detail extraction
// =============================================================================

fn parse_sub_direction(description: &str) -> Option<SubDirection> {
    if RE_SUB_IN.is_match(description) {
        Some(SubDirection::In)
    } else if RE_SUB_OUT.is_match(description) {
        Some(SubDirection::Out)
    } else {
        None
    }
}

fn parse_ft_sequence(description: &str) -> (Option<u8>, Option<u8>) {
    match RE_FT_SEQ.captures(description) {
        Some(caps) => {
            let number = caps.get(1).and_then(|m| m.as_str().parse().ok());
            let total = caps.get(2).and_then(|m| m.as_str().parse().ok());
            (number, total)
        }
        None => (None, None),
    }
}

/// Fallback player attribution from the description text, used only
/// when the upstream row carries no id column.
fn leading_name(description: &str) -> Option<PlayerId> {
    RE_LEAD_NAME
        .captures(description)
        .and_then(|caps| caps.get(1))
        .map(|m| PlayerId::from(m.as_str()))
}

fn assist_name(description: &str) -> Option<PlayerId> {
    RE_ASSIST
        .captures(description)
        .and_then(|caps| caps.get(1))
        .map(|m| PlayerId::from(m.as_str().trim()))
}

// =============================================================================
// Normalizer
// =============================================================================

/// Convert one raw block into exactly one normalized event.
///
/// Total: every input yields an output, including garbage (category
/// UNKNOWN, raw text preserved for audit).
pub fn normalize_block(block: &RawEventBlock) -> NormalizedEvent {
    let (clock, away_score, home_score, description) = parse_clock_and_score(&block.raw_text);

    let category = classifier::classify(&description);

    let is_miss = classifier::RE_MISS.is_match(&description);
    let is_made = match category {
        EventCategory::ShotMade => Some(true),
        EventCategory::ShotMiss => Some(false),
        EventCategory::FreeThrow => Some(!is_miss),
        _ => None,
    };

    let is_three = category.is_shot_attempt() && RE_THREE.is_match(&description);

    let shot_distance_ft = if category.is_shot_attempt() {
        RE_DISTANCE
            .captures(&description)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    } else {
        None
    };

    let (ft_number, ft_total) = if category == EventCategory::FreeThrow {
        parse_ft_sequence(&description)
    } else {
        (None, None)
    };

    // Points derive from the category and flags, not from "N PTS" text.
    let points = match (category, is_made) {
        (EventCategory::ShotMade, _) => {
            if is_three {
                3
            } else {
                2
            }
        }
        (EventCategory::FreeThrow, Some(true)) => 1,
        _ => 0,
    };

    let sub_direction = if category == EventCategory::Substitution {
        parse_sub_direction(&description)
    } else {
        None
    };

    let team_id = block
        .team_id
        .as_deref()
        .and_then(TeamId::from_raw);

    let primary_player_id = block
        .player1_id
        .as_deref()
        .and_then(PlayerId::from_raw)
        .or_else(|| match category {
            EventCategory::Timeout | EventCategory::JumpBall | EventCategory::Unknown => None,
            _ => leading_name(&description),
        });

    let secondary_player_id = block
        .player2_id
        .as_deref()
        .and_then(PlayerId::from_raw)
        .or_else(|| {
            if category == EventCategory::ShotMade {
                assist_name(&description)
            } else {
                None
            }
        });

    let tertiary_player_id = block.player3_id.as_deref().and_then(PlayerId::from_raw);

    NormalizedEvent {
        game_id: block.game_id.clone(),
        period: block.period,
        sequence: block.sequence,
        clock,
        team_id,
        category,
        primary_player_id,
        secondary_player_id,
        tertiary_player_id,
        points,
        is_made,
        is_three,
        shot_distance_ft,
        ft_number,
        ft_total,
        is_technical: RE_TECHNICAL.is_match(&description),
        sub_direction,
        away_score,
        home_score,
        description,
        raw_text: block.raw_text.clone(),
    }
}
