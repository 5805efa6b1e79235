//! End-to-end pipeline tests over synthetic play-by-play games.
//!
//! Every scenario is built from raw text blocks and run through the full
//! normalize → team-map → lineup → segment chain, with hand-calculated
//! expected possessions so a rule regression is caught at the surface
//! downstream consumers actually see.
//!
//! Stages under test:
//!   1. Event normalizer        (src/normalize/)
//!   2. Player→team attribution (src/lineups/team_map.rs)
//!   3. Lineup tracker          (src/lineups/tracker.rs)
//!   4. Possession segmenter    (src/possessions/segmenter.rs)
//!   5. Lineup validator        (src/possessions/validator.rs)

use pbp_possessions::data::models::{
    GameId, PlayerId, RawEventBlock, TeamId, TerminationReason,
};
use pbp_possessions::lineups::{solve_starters, PlayerTeamMap};
use pbp_possessions::normalize::normalize_block;
use pbp_possessions::pipeline::{process_game, GameOutput};
use pbp_possessions::possessions::validate_possessions;

const HOME: &str = "1610612738";
const AWAY: &str = "1610612755";

// =============================================================================
// Helpers
// =============================================================================

/// Builds an ordered synthetic game from (period, clock, team, player,
/// description) tuples.
struct GameBuilder {
    game_id: GameId,
    rows: Vec<RawEventBlock>,
}

impl GameBuilder {
    fn new(game_id: &str) -> Self {
        Self {
            game_id: GameId::from(game_id),
            rows: Vec::new(),
        }
    }

    fn event(mut self, period: u8, clock: &str, team: &str, player: Option<&str>, text: &str) -> Self {
        let sequence = self.rows.len() as u32;
        self.rows.push(RawEventBlock {
            game_id: self.game_id.clone(),
            period,
            sequence,
            raw_text: format!("{clock}\n{text}"),
            team_id: Some(team.to_string()),
            player1_id: player.map(str::to_string),
            player2_id: None,
            player3_id: None,
        });
        self
    }

    fn run(self) -> GameOutput {
        process_game(self.game_id.clone(), &self.rows)
    }
}

/// A one-period game where all ten players act, so both lineups solve to
/// exactly five and every possession survives validation.
///
/// Script (offense alternates HOME←→AWAY):
///   AWAY  jump ball, two fouls, missed three, offensive rebound,
///         made layup                      → MADE_SHOT, 2 pts
///   HOME  missed jumper, offensive rebound, bad-pass turnover
///                                         → TURNOVER, 0 pts
///   AWAY  made three + shooting foul + made bonus free throw
///                                         → FREE_THROW_FINAL, 4 pts
///   HOME  made dunk                       → MADE_SHOT, 2 pts
///   AWAY  sub in a6 / sub out a1, made jumper
///                                         → MADE_SHOT, 2 pts
///   HOME  missed layup, AWAY defensive rebound
///                                         → DEFENSIVE_REBOUND, 0 pts
fn clean_game() -> GameOutput {
    GameBuilder::new("0022200001")
        .event(1, "12:00", AWAY, Some("a1"), "Jump Ball a1 vs. h1")
        .event(1, "11:50", AWAY, Some("a2"), "a2 P.FOUL (P1.T1)")
        .event(1, "11:45", HOME, Some("h2"), "h2 P.FOUL (P1.T1)")
        .event(1, "11:40", AWAY, Some("a3"), "MISS a3 26' 3PT Jump Shot")
        .event(1, "11:38", AWAY, Some("a4"), "a4 REBOUND (Off:1 Def:0)")
        .event(1, "11:35", AWAY, Some("a5"), "a5 Driving Layup (2 PTS)")
        .event(1, "11:20", HOME, Some("h1"), "MISS h1 Pullup Jump Shot")
        .event(1, "11:18", HOME, Some("h3"), "h3 REBOUND (Off:1 Def:0)")
        .event(1, "11:10", HOME, Some("h4"), "h4 Bad Pass Turnover (P1.T1)")
        .event(1, "10:55", AWAY, Some("a1"), "a1 26' 3PT Jump Shot (5 PTS)")
        .event(1, "10:55", HOME, Some("h5"), "h5 S.FOUL (P1.T2)")
        .event(1, "10:55", AWAY, Some("a1"), "a1 Free Throw 1 of 1 (6 PTS)")
        .event(1, "10:30", HOME, Some("h5"), "h5 Driving Dunk (2 PTS)")
        .event(1, "10:10", AWAY, Some("a6"), "SUB IN: a6")
        .event(1, "10:08", AWAY, Some("a1"), "SUB OUT: a1")
        .event(1, "10:00", AWAY, Some("a6"), "a6 Pullup Jump Shot (2 PTS)")
        .event(1, "9:50", HOME, Some("h1"), "MISS h1 Driving Layup")
        .event(1, "9:48", AWAY, Some("a2"), "a2 REBOUND (Off:0 Def:1)")
        .run()
}

// =============================================================================
// Lineup solving
// =============================================================================

#[test]
fn test_clean_game_solves_five_starters_per_team() {
    let out = clean_game();
    let map = PlayerTeamMap::build(&out.events);

    let away_starters = solve_starters(&out.events, &TeamId::from(AWAY), &map);
    let home_starters = solve_starters(&out.events, &TeamId::from(HOME), &map);

    assert_eq!(away_starters.len(), 5);
    assert_eq!(home_starters.len(), 5);
    for p in ["a1", "a2", "a3", "a4", "a5"] {
        assert!(away_starters.contains(&PlayerId::from(p)), "missing {p}");
    }
    // a6 entered through a substitution and must not be a starter.
    assert!(!away_starters.contains(&PlayerId::from("a6")));
    for p in ["h1", "h2", "h3", "h4", "h5"] {
        assert!(home_starters.contains(&PlayerId::from(p)), "missing {p}");
    }
}

#[test]
fn test_first_action_without_subs_marks_starter() {
    let out = GameBuilder::new("0022200002")
        .event(1, "11:40", HOME, Some("h1"), "h1 Driving Layup (2 PTS)")
        .event(1, "11:20", AWAY, Some("a1"), "a1 Pullup Jump Shot (2 PTS)")
        .run();
    let map = PlayerTeamMap::build(&out.events);
    let starters = solve_starters(&out.events, &TeamId::from(HOME), &map);
    assert!(starters.contains(&PlayerId::from("h1")));
}

#[test]
fn test_sub_in_before_out_is_not_starter() {
    // A enters before leaving and never acts otherwise: not a starter.
    let out = GameBuilder::new("0022200003")
        .event(1, "11:40", HOME, Some("hA"), "SUB IN: hA")
        .event(1, "10:40", HOME, Some("hA"), "SUB OUT: hA")
        .event(1, "10:00", AWAY, Some("a1"), "a1 Driving Layup (2 PTS)")
        .run();
    let map = PlayerTeamMap::build(&out.events);
    let starters = solve_starters(&out.events, &TeamId::from(HOME), &map);
    assert!(!starters.contains(&PlayerId::from("hA")));
}

// =============================================================================
// Possession structure
// =============================================================================

#[test]
fn test_clean_game_possession_table() {
    let out = clean_game();
    let reasons: Vec<TerminationReason> = out
        .possessions
        .iter()
        .map(|p| p.termination_reason)
        .collect();
    assert_eq!(
        reasons,
        vec![
            TerminationReason::MadeShot,
            TerminationReason::Turnover,
            TerminationReason::FreeThrowFinal,
            TerminationReason::MadeShot,
            TerminationReason::MadeShot,
            TerminationReason::DefensiveRebound,
        ]
    );

    // Points: 2 + 0 + 4 (and-one) + 2 + 2 + 0 = 10, matching the sum of
    // all scoring events in the script.
    let total: u32 = out.possessions.iter().map(|p| p.points).sum();
    let event_points: u32 = out.events.iter().map(|e| u32::from(e.points)).sum();
    assert_eq!(total, 10);
    assert_eq!(total, event_points);
}

#[test]
fn test_offense_and_defense_always_differ_and_alternate() {
    let out = clean_game();
    assert!(!out.possessions.is_empty());

    for p in &out.possessions {
        assert_ne!(p.offense_team_id, p.defense_team_id);
    }

    // Consecutive possessions in the same period alternate offense: no
    // MADE_SHOT → MADE_SHOT chain keeps the same team.
    for pair in out.possessions.windows(2) {
        if pair[0].period == pair[1].period
            && pair[0].termination_reason != TerminationReason::DefensiveRebound
        {
            assert_ne!(pair[0].offense_team_id, pair[1].offense_team_id);
        }
    }
}

#[test]
fn test_and_one_merges_three_plus_bonus() {
    let out = clean_game();
    let and_one = &out.possessions[2];
    assert_eq!(and_one.termination_reason, TerminationReason::FreeThrowFinal);
    assert_eq!(and_one.points, 4);
    assert_eq!(and_one.offense_team_id, TeamId::from(AWAY));
    // Three events: the made three, the shooting foul, the bonus FT.
    assert_eq!(and_one.event_count, 3);
}

#[test]
fn test_offensive_rebound_does_not_split_possession() {
    let out = clean_game();
    // HOME's trip (miss, own rebound, turnover) stays one possession.
    let trip = &out.possessions[1];
    assert_eq!(trip.offense_team_id, TeamId::from(HOME));
    assert_eq!(trip.event_count, 3);
    assert_eq!(trip.points, 0);
}

#[test]
fn test_substituted_lineup_attached_to_possession() {
    let out = clean_game();
    // Possession after the a1→a6 swap.
    let poss = &out.possessions[4];
    assert_eq!(poss.offense_team_id, TeamId::from(AWAY));
    assert!(poss.offense_lineup.contains(&PlayerId::from("a6")));
    assert!(!poss.offense_lineup.contains(&PlayerId::from("a1")));
    assert_eq!(poss.offense_lineup.len(), 5);
    assert_eq!(poss.defense_lineup.len(), 5);
}

#[test]
fn test_validator_keeps_clean_game_whole() {
    let out = clean_game();
    let count = out.possessions.len();
    let (clean, stats) = validate_possessions(out.possessions);
    assert_eq!(clean.len(), count);
    assert_eq!(stats.dropped, 0);
}

#[test]
fn test_validator_drops_short_lineups() {
    // Only three HOME players ever act: HOME lineups solve to 3 and
    // every possession fails the exactly-five check.
    let out = GameBuilder::new("0022200004")
        .event(1, "11:40", HOME, Some("h1"), "h1 Driving Layup (2 PTS)")
        .event(1, "11:20", AWAY, Some("a1"), "MISS a1 Pullup Jump Shot")
        .event(1, "11:18", HOME, Some("h2"), "h2 REBOUND (Off:0 Def:1)")
        .event(1, "11:00", HOME, Some("h3"), "h3 Driving Dunk (2 PTS)")
        .run();
    assert!(!out.possessions.is_empty());
    let (clean, stats) = validate_possessions(out.possessions);
    assert!(clean.is_empty());
    assert_eq!(stats.kept, 0);
}

// =============================================================================
// End-to-end two-period scenario
// =============================================================================

#[test]
fn test_two_period_game_end_to_end() {
    // Six events per period; the substitution/timeout tails produce
    // zombie possessions that must be discarded at the period and game
    // boundaries.
    let out = GameBuilder::new("0022200005")
        // Period 1
        .event(1, "12:00", AWAY, Some("a1"), "Jump Ball a1 vs. h1")
        .event(1, "11:40", AWAY, Some("a1"), "a1 Driving Layup (2 PTS)")
        .event(1, "11:20", HOME, Some("h1"), "MISS h1 26' 3PT Jump Shot")
        .event(1, "11:18", HOME, Some("h2"), "h2 REBOUND (Off:1 Def:0)")
        .event(1, "11:10", HOME, Some("h1"), "h1 26' 3PT Jump Shot (3 PTS)")
        .event(1, "0:30", AWAY, Some("a2"), "SUB IN: a2")
        // Period 2
        .event(2, "12:00", HOME, Some("h1"), "h1 Bad Pass Turnover (P1.T1)")
        .event(2, "11:40", AWAY, Some("a1"), "a1 Driving Layup (12 PTS)")
        .event(2, "11:40", HOME, Some("h2"), "h2 S.FOUL (P1.T1)")
        .event(2, "11:40", AWAY, Some("a1"), "a1 Free Throw 1 of 1 (13 PTS)")
        .event(2, "11:00", HOME, Some("h9"), "SUB IN: h9")
        .event(2, "10:50", AWAY, None, "76ers Timeout: Regular")
        .run();

    let reasons: Vec<TerminationReason> = out
        .possessions
        .iter()
        .map(|p| p.termination_reason)
        .collect();
    assert_eq!(
        reasons,
        vec![
            TerminationReason::MadeShot,
            TerminationReason::MadeShot,
            TerminationReason::Turnover,
            TerminationReason::FreeThrowFinal,
        ]
    );

    assert_eq!(out.possessions[0].period, 1);
    assert_eq!(out.possessions[1].period, 1);
    assert_eq!(out.possessions[2].period, 2);
    assert_eq!(out.possessions[3].period, 2);

    // Offense resets to unknown at the period boundary and re-resolves
    // from the first attributable event.
    assert_eq!(out.possessions[2].offense_team_id, TeamId::from(HOME));
    assert_eq!(out.possessions[3].offense_team_id, TeamId::from(AWAY));

    // 2 + 3 + 0 + (2 + 1) = 8, the sum of every scoring event.
    let total: u32 = out.possessions.iter().map(|p| p.points).sum();
    let event_points: u32 = out.events.iter().map(|e| u32::from(e.points)).sum();
    assert_eq!(total, 8);
    assert_eq!(total, event_points);
}

// =============================================================================
// Normalizer guarantees
// =============================================================================

#[test]
fn test_normalizer_is_idempotent_and_total() {
    let block = RawEventBlock {
        game_id: GameId::from("0022200006"),
        period: 3,
        sequence: 42,
        raw_text: "7:15\n55 - 60\nTatum 26' 3PT Jump Shot (21 PTS) (Brown 4 AST)".to_string(),
        team_id: Some(HOME.to_string()),
        player1_id: Some("1628369".to_string()),
        player2_id: Some("1627759".to_string()),
        player3_id: None,
    };
    assert_eq!(normalize_block(&block), normalize_block(&block));

    // Garbage still yields exactly one event, category UNKNOWN.
    let garbage = RawEventBlock {
        raw_text: "\u{fffd}\u{fffd}\u{fffd}".to_string(),
        ..block
    };
    let ev = normalize_block(&garbage);
    assert_eq!(ev.category, pbp_possessions::data::models::EventCategory::Unknown);
    assert_eq!(ev.raw_text, garbage.raw_text);
}

#[test]
fn test_pipeline_is_deterministic() {
    let a = clean_game();
    let b = clean_game();
    assert_eq!(a.possessions, b.possessions);
    assert_eq!(a.events, b.events);
}
