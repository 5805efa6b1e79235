//! Core data models for the play-by-play pipeline.
//!
//! These models provide type safety and serialization for raw upstream
//! rows, normalized events, and the derived possession table. Text
//! conventions follow the NBA stats play-by-play feed.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Identifiers
// =============================================================================

/// Normalize an upstream id string.
///
/// Upstream columns mix `"1610612738"`, `"201143.0"`, bare `"0"` (a null
/// marker), and empty strings. Everything collapses to a canonical
/// integer string or `None`.
pub fn canonical_id(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        let n = f as i64;
        if n == 0 {
            return None;
        }
        return Some(n.to_string());
    }
    Some(trimmed.to_string())
}

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Build from an upstream column value, normalizing away
            /// float artifacts and null markers.
            pub fn from_raw(raw: &str) -> Option<Self> {
                canonical_id(raw).map(Self)
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

id_type!(
    /// NBA game identifier (e.g. "0022200001").
    GameId
);
id_type!(
    /// NBA team identifier (e.g. "1610612738").
    TeamId
);
id_type!(
    /// NBA player identifier (e.g. "201143").
    PlayerId
);

// =============================================================================
// Game clock
// =============================================================================

/// Game clock remaining in the period, in seconds.
///
/// Accepts `MM:SS` and `MM:SS.T` ("11:38", "0:24.7"). Decreases within a
/// period and resets at period boundaries.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Clock(pub f64);

impl Clock {
    pub fn seconds(&self) -> f64 {
        self.0
    }

    pub fn parse(s: &str) -> Option<Self> {
        let (min_part, sec_part) = s.trim().split_once(':')?;
        let minutes: u32 = min_part.parse().ok()?;
        let seconds: f64 = sec_part.parse().ok()?;
        if !(0.0..60.0).contains(&seconds) {
            return None;
        }
        Some(Self(f64::from(minutes) * 60.0 + seconds))
    }
}

impl FromStr for Clock {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid game clock: {s}"))
    }
}

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let minutes = (self.0 / 60.0).floor() as u32;
        let seconds = self.0 - f64::from(minutes) * 60.0;
        if (seconds - seconds.floor()).abs() > f64::EPSILON {
            write!(f, "{minutes}:{seconds:04.1}")
        } else {
            write!(f, "{minutes}:{:02}", seconds as u32)
        }
    }
}

// =============================================================================
// Enums
// =============================================================================

/// Closed classification of a play-by-play event.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventCategory {
    ShotMade,
    ShotMiss,
    FreeThrow,
    Rebound,
    Turnover,
    Foul,
    Steal,
    Block,
    Substitution,
    Timeout,
    JumpBall,
    Violation,
    #[default]
    #[serde(other)]
    Unknown,
}

impl EventCategory {
    /// Administrative events carry no possession signal: they neither
    /// assign offense nor interrupt an and-one sequence.
    pub fn is_administrative(&self) -> bool {
        matches!(self, Self::Substitution | Self::Timeout | Self::Unknown)
    }

    pub fn is_shot_attempt(&self) -> bool {
        matches!(self, Self::ShotMade | Self::ShotMiss)
    }

    /// Events that mark a possession as live play rather than dead time.
    pub fn is_scoring_play(&self) -> bool {
        matches!(
            self,
            Self::ShotMade | Self::ShotMiss | Self::FreeThrow | Self::Turnover
        )
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ShotMade => "SHOT_MADE",
            Self::ShotMiss => "SHOT_MISS",
            Self::FreeThrow => "FREE_THROW",
            Self::Rebound => "REBOUND",
            Self::Turnover => "TURNOVER",
            Self::Foul => "FOUL",
            Self::Steal => "STEAL",
            Self::Block => "BLOCK",
            Self::Substitution => "SUBSTITUTION",
            Self::Timeout => "TIMEOUT",
            Self::JumpBall => "JUMP_BALL",
            Self::Violation => "VIOLATION",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Direction of a substitution event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubDirection {
    In,
    Out,
}

/// Why a possession closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TerminationReason {
    MadeShot,
    Turnover,
    DefensiveRebound,
    FreeThrowFinal,
    PeriodEnd,
    GameEnd,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MadeShot => "MADE_SHOT",
            Self::Turnover => "TURNOVER",
            Self::DefensiveRebound => "DEFENSIVE_REBOUND",
            Self::FreeThrowFinal => "FREE_THROW_FINAL",
            Self::PeriodEnd => "PERIOD_END",
            Self::GameEnd => "GAME_END",
        };
        f.write_str(s)
    }
}

// =============================================================================
// Raw input
// =============================================================================

/// One raw play-by-play row as delivered by the upstream fetcher.
///
/// `raw_text` is the clock/score/description blob; the id columns are
/// upstream sidecar attribution and arrive un-normalized (float
/// artifacts, `"0"` null markers).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEventBlock {
    #[serde(alias = "GAME_ID")]
    pub game_id: GameId,
    #[serde(alias = "PERIOD")]
    pub period: u8,
    #[serde(default, alias = "SEQUENCE")]
    pub sequence: u32,
    #[serde(alias = "RAW_TEXT", alias = "RAW")]
    pub raw_text: String,
    #[serde(default, alias = "TEAM_ID")]
    pub team_id: Option<String>,
    #[serde(default, alias = "PLAYER1_ID")]
    pub player1_id: Option<String>,
    #[serde(default, alias = "PLAYER2_ID")]
    pub player2_id: Option<String>,
    #[serde(default, alias = "PLAYER3_ID")]
    pub player3_id: Option<String>,
}

// =============================================================================
// Normalized event
// =============================================================================

/// The canonical unit flowing through the lineup tracker and segmenter.
/// Created once from a [`RawEventBlock`], never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    pub game_id: GameId,
    pub period: u8,
    /// Original stream position; the total order within a game is
    /// `(period, -clock, sequence)` and the input arrives already sorted.
    pub sequence: u32,
    pub clock: Option<Clock>,
    /// Team primarily associated with the event (shooting team, fouling
    /// team, rebounding team, ...).
    pub team_id: Option<TeamId>,
    pub category: EventCategory,
    pub primary_player_id: Option<PlayerId>,
    /// Assist or steal counterpart.
    pub secondary_player_id: Option<PlayerId>,
    /// Third upstream actor (blocker, foul drawn); always opposite-team.
    pub tertiary_player_id: Option<PlayerId>,
    /// Derived from category and flags, never parsed as free text.
    pub points: u8,
    pub is_made: Option<bool>,
    pub is_three: bool,
    pub shot_distance_ft: Option<u32>,
    /// Position within a free-throw sequence ("1 OF 2" => 1 of 2).
    pub ft_number: Option<u8>,
    pub ft_total: Option<u8>,
    /// Technical free throws and fouls; these never open or close a live
    /// possession.
    pub is_technical: bool,
    pub sub_direction: Option<SubDirection>,
    pub away_score: Option<u32>,
    pub home_score: Option<u32>,
    /// Clean description line (clock and score stripped).
    pub description: String,
    /// Original blob, retained for audit.
    pub raw_text: String,
}

impl NormalizedEvent {
    /// True for the last free throw of its sequence ("1 OF 1", "2 OF 2",
    /// "3 OF 3").
    pub fn is_last_free_throw(&self) -> bool {
        self.category == EventCategory::FreeThrow
            && matches!((self.ft_number, self.ft_total), (Some(n), Some(t)) if n == t)
    }

    pub fn made(&self) -> bool {
        self.is_made == Some(true)
    }

    /// All upstream player ids attached to the event, in column order.
    pub fn players(&self) -> impl Iterator<Item = &PlayerId> {
        self.primary_player_id
            .iter()
            .chain(self.secondary_player_id.iter())
            .chain(self.tertiary_player_id.iter())
    }
}

// =============================================================================
// Lineup annotation
// =============================================================================

/// Five-player set on the floor for one team.
pub type Lineup = BTreeSet<PlayerId>;

/// A normalized event plus both teams' on-court sets at that moment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineupAnnotatedEvent {
    pub event: NormalizedEvent,
    /// Keyed by team id; exactly two entries for a well-formed game.
    pub lineups: BTreeMap<TeamId, Lineup>,
}

impl LineupAnnotatedEvent {
    pub fn lineup_for(&self, team: &TeamId) -> Option<&Lineup> {
        self.lineups.get(team)
    }
}

// =============================================================================
// Possession
// =============================================================================

/// One derived possession: a contiguous span during which one team
/// controlled the ball. Immutable once emitted by the segmenter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Possession {
    pub game_id: GameId,
    pub period: u8,
    pub offense_team_id: TeamId,
    pub defense_team_id: TeamId,
    pub offense_lineup: Lineup,
    pub defense_lineup: Lineup,
    pub points: u32,
    pub start_clock: Option<Clock>,
    pub end_clock: Option<Clock>,
    pub event_count: u32,
    pub termination_reason: TerminationReason,
}

impl Possession {
    /// Both lineups hold exactly five distinct players. Enforced by the
    /// downstream validator, not at emission time.
    pub fn has_valid_lineups(&self) -> bool {
        self.offense_lineup.len() == 5 && self.defense_lineup.len() == 5
    }
}
