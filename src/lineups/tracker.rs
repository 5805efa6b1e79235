//! On-court lineup reconstruction.
//!
//! Play-by-play never enumerates the ten players on the floor at
//! tip-off, so identity is inferred from action order. Each period is
//! solved independently per team (substitutions are free between
//! periods): a first forward scan derives the starting five, a second
//! replay applies substitutions and snapshots both teams' sets onto
//! every event.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::data::models::{
    EventCategory, Lineup, LineupAnnotatedEvent, NormalizedEvent, PlayerId, SubDirection, TeamId,
};
use crate::lineups::team_map::{distinct_teams, PlayerTeamMap};

// =============================================================================
// Starter solving
// =============================================================================

/// Derive one team's starting five for a period from action order.
///
/// A player subbed out without ever being subbed in must have started;
/// a player acting before any "in" substitution of their own must have
/// started. The result is emitted as computed even when it is not five
/// players; validation is a downstream concern.
pub fn solve_starters(
    period_events: &[NormalizedEvent],
    team: &TeamId,
    map: &PlayerTeamMap,
) -> Lineup {
    let mut starters: Lineup = BTreeSet::new();
    let mut subbed_in: BTreeSet<PlayerId> = BTreeSet::new();

    for ev in period_events {
        let team_candidates: Vec<&PlayerId> = ev
            .players()
            .filter(|p| map.team_of(p) == Some(team))
            .collect();

        if ev.category == EventCategory::Substitution {
            let Some(p1) = &ev.primary_player_id else { continue };
            if !team_candidates.iter().any(|p| *p == p1) {
                continue;
            }
            match ev.sub_direction {
                Some(SubDirection::In) => {
                    subbed_in.insert(p1.clone());
                }
                Some(SubDirection::Out) => {
                    if !subbed_in.contains(p1) {
                        starters.insert(p1.clone());
                    }
                }
                None => {}
            }
        } else {
            for p in team_candidates {
                if !subbed_in.contains(p) {
                    starters.insert(p.clone());
                }
            }
        }
    }

    starters
}

// =============================================================================
// Tracking
// =============================================================================

/// One team's on-court set during a period replay.
struct TeamLineupState {
    team: TeamId,
    on_court: Lineup,
}

impl TeamLineupState {
    fn new(team: TeamId, starters: Lineup) -> Self {
        Self {
            team,
            on_court: starters,
        }
    }

    /// Apply a substitution event if it belongs to this team.
    /// An "out" for a player not on the floor is a no-op.
    fn apply(&mut self, ev: &NormalizedEvent) {
        if ev.category != EventCategory::Substitution || ev.team_id.as_ref() != Some(&self.team) {
            return;
        }
        let Some(p1) = &ev.primary_player_id else { return };
        match ev.sub_direction {
            Some(SubDirection::In) => {
                self.on_court.insert(p1.clone());
            }
            Some(SubDirection::Out) => {
                if !self.on_court.remove(p1) {
                    debug!(
                        team = %self.team,
                        player = %p1,
                        "SUB OUT for player not on floor — ignored"
                    );
                }
            }
            None => {}
        }
    }
}

/// Annotate one period's events with both teams' lineups.
fn annotate_period(
    period_events: &[NormalizedEvent],
    teams: (&TeamId, &TeamId),
    map: &PlayerTeamMap,
) -> Vec<LineupAnnotatedEvent> {
    let (team_a, team_b) = teams;

    let starters_a = solve_starters(period_events, team_a, map);
    let starters_b = solve_starters(period_events, team_b, map);

    if let Some(ev) = period_events.first() {
        for (team, starters) in [(team_a, &starters_a), (team_b, &starters_b)] {
            if starters.len() != 5 {
                warn!(
                    game_id = %ev.game_id,
                    period = ev.period,
                    team = %team,
                    solved = starters.len(),
                    "Starting lineup did not solve to five players"
                );
            }
        }
    }

    let mut state_a = TeamLineupState::new(team_a.clone(), starters_a);
    let mut state_b = TeamLineupState::new(team_b.clone(), starters_b);

    period_events
        .iter()
        .map(|ev| {
            state_a.apply(ev);
            state_b.apply(ev);
            LineupAnnotatedEvent {
                event: ev.clone(),
                lineups: [
                    (state_a.team.clone(), state_a.on_court.clone()),
                    (state_b.team.clone(), state_b.on_court.clone()),
                ]
                .into_iter()
                .collect(),
            }
        })
        .collect()
}

/// Annotate a full game's ordered events with lineups.
///
/// A game without exactly two distinct team ids cannot be attributed and
/// yields no annotated events (and therefore no possessions downstream).
pub fn annotate_game(
    events: &[NormalizedEvent],
    map: &PlayerTeamMap,
) -> Vec<LineupAnnotatedEvent> {
    let teams = distinct_teams(events);
    let [team_a, team_b] = teams.as_slice() else {
        if let Some(ev) = events.first() {
            warn!(
                game_id = %ev.game_id,
                teams = teams.len(),
                "Expected exactly two teams — game skipped"
            );
        }
        return Vec::new();
    };

    let mut annotated = Vec::with_capacity(events.len());
    let mut start = 0;
    while start < events.len() {
        let period = events[start].period;
        let end = events[start..]
            .iter()
            .position(|ev| ev.period != period)
            .map(|offset| start + offset)
            .unwrap_or(events.len());
        annotated.extend(annotate_period(&events[start..end], (team_a, team_b), map));
        start = end;
    }
    annotated
}
