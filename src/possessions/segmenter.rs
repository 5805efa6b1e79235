//! Possession segmentation.
//!
//! A single forward scan over one game's lineup-annotated events,
//! folding an explicit state value into a sequence of [`Possession`]
//! records. Termination rules, in priority order: period change, made
//! field goal (unless an and-one keeps it open), turnover, defensive
//! rebound, final made free throw; a still-open possession at the end of
//! the stream closes as game end. Possessions with no scoring play and
//! no points are dead-time artifacts and are discarded.

use tracing::debug;

use crate::data::models::{
    Clock, EventCategory, GameId, Lineup, LineupAnnotatedEvent, Possession, TeamId,
    TerminationReason,
};

// =============================================================================
// And-one detection
// =============================================================================

/// How many subsequent events the and-one scan may examine.
const AND_ONE_LOOKAHEAD: usize = 5;

/// Categories passed over while scanning for the bonus free throw.
///
/// Foul is included alongside the administrative categories: the
/// shooting foul that awards the free throw is recorded between the made
/// basket and the attempt.
const fn and_one_skippable(category: EventCategory) -> bool {
    matches!(
        category,
        EventCategory::Substitution
            | EventCategory::Timeout
            | EventCategory::Unknown
            | EventCategory::Foul
    )
}

/// A made basket at `index` is an and-one when the bonus free throw by
/// the same team follows within the lookahead window. The possession
/// must then stay open: the free throw belongs to it.
///
/// The scan stops at the first possession-moving event; a technical free
/// throw or one by the other team is not a bonus attempt.
pub fn is_and_one(events: &[LineupAnnotatedEvent], index: usize) -> bool {
    let shot = &events[index].event;
    let Some(shot_team) = &shot.team_id else {
        return false;
    };

    for ann in events.iter().skip(index + 1).take(AND_ONE_LOOKAHEAD) {
        let ev = &ann.event;
        if ev.period != shot.period {
            return false;
        }
        if and_one_skippable(ev.category) {
            continue;
        }
        if ev.category == EventCategory::FreeThrow {
            return !ev.is_technical && ev.made() && ev.team_id.as_ref() == Some(shot_team);
        }
        return false;
    }
    false
}

// =============================================================================
// Segmenter state
// =============================================================================

/// The open possession being accumulated. Owned by the scan; reset on
/// every finalization.
#[derive(Debug)]
struct OpenPossession {
    period: u8,
    offense_team_id: Option<TeamId>,
    points: u32,
    event_count: u32,
    has_scoring_play: bool,
    start_index: usize,
    start_clock: Option<Clock>,
}

impl OpenPossession {
    fn restart(
        &mut self,
        period: u8,
        offense: Option<TeamId>,
        start_index: usize,
        start_clock: Option<Clock>,
    ) {
        self.period = period;
        self.offense_team_id = offense;
        self.points = 0;
        self.event_count = 0;
        self.has_scoring_play = false;
        self.start_index = start_index;
        self.start_clock = start_clock;
    }
}

struct Segmenter<'a> {
    events: &'a [LineupAnnotatedEvent],
    game_id: GameId,
    team_a: TeamId,
    team_b: TeamId,
    open: OpenPossession,
    /// Team of the most recent non-technical shot or free throw; rebound
    /// attribution compares against this rather than the open offense,
    /// which is robust to missed free-throw sequences.
    last_shot_team: Option<TeamId>,
    out: Vec<Possession>,
}

impl Segmenter<'_> {
    fn opponent(&self, team: &TeamId) -> TeamId {
        if team == &self.team_a {
            self.team_b.clone()
        } else {
            self.team_a.clone()
        }
    }

    /// Pick the lineup snapshot for a possession's event slice,
    /// preferring a non-administrative event when one exists.
    fn slice_lineups(&self, slice: &[LineupAnnotatedEvent], offense: &TeamId) -> (Lineup, Lineup) {
        let ann = slice
            .iter()
            .find(|a| !a.event.category.is_administrative())
            .or_else(|| slice.first());
        match ann {
            Some(ann) => {
                let defense = self.opponent(offense);
                (
                    ann.lineup_for(offense).cloned().unwrap_or_default(),
                    ann.lineup_for(&defense).cloned().unwrap_or_default(),
                )
            }
            None => (Lineup::default(), Lineup::default()),
        }
    }

    /// Close the open possession at `end_index` and restart the
    /// accumulator. Possessions with unknown offense, an empty slice, or
    /// no live play (zombies) are discarded rather than emitted.
    fn close(
        &mut self,
        end_index: usize,
        reason: TerminationReason,
        next_offense: Option<TeamId>,
        restart_index: usize,
        restart_clock: Option<Clock>,
    ) {
        let next_period = self
            .events
            .get(restart_index)
            .map(|a| a.event.period)
            .unwrap_or(self.open.period);

        let is_live =
            self.open.event_count > 0 && (self.open.has_scoring_play || self.open.points > 0);

        if let (Some(offense), true) = (self.open.offense_team_id.take(), is_live) {
            let defense = self.opponent(&offense);
            let slice = &self.events[self.open.start_index..=end_index];
            let (offense_lineup, defense_lineup) = self.slice_lineups(slice, &offense);

            self.out.push(Possession {
                game_id: self.game_id.clone(),
                period: self.open.period,
                offense_team_id: offense,
                defense_team_id: defense,
                offense_lineup,
                defense_lineup,
                points: self.open.points,
                start_clock: self.open.start_clock,
                end_clock: self.events[end_index].event.clock,
                event_count: self.open.event_count,
                termination_reason: reason,
            });
        } else if self.open.event_count > 0 {
            debug!(
                game_id = %self.game_id,
                period = self.open.period,
                events = self.open.event_count,
                reason = %reason,
                "Discarded dead-time possession"
            );
        }

        self.open
            .restart(next_period, next_offense, restart_index, restart_clock);
    }

    fn run(mut self) -> Vec<Possession> {
        let events = self.events;
        for (idx, ann) in events.iter().enumerate() {
            let ev = &ann.event;

            // 1. Period change: close out the old period and reset
            //    offense to unknown. Rebound attribution resets too.
            if ev.period != self.open.period {
                self.close(idx - 1, TerminationReason::PeriodEnd, None, idx, None);
                self.last_shot_team = None;
            }

            // 2. Offense discovery. Blocks, steals, and administrative
            //    events do not reliably indicate the offense.
            if self.open.offense_team_id.is_none() {
                if let Some(team) = &ev.team_id {
                    if !matches!(
                        ev.category,
                        EventCategory::Block
                            | EventCategory::Steal
                            | EventCategory::Substitution
                            | EventCategory::Timeout
                            | EventCategory::Unknown
                    ) {
                        self.open.offense_team_id = Some(team.clone());
                    }
                }
            }

            // 3. Accumulate unconditionally.
            if self.open.event_count == 0 && self.open.start_clock.is_none() {
                self.open.start_clock = ev.clock;
            }
            self.open.event_count += 1;
            self.open.points += u32::from(ev.points);
            self.open.has_scoring_play |= ev.category.is_scoring_play();

            // 4-7. Termination rules.
            match ev.category {
                EventCategory::ShotMade => {
                    self.last_shot_team = ev.team_id.clone();
                    if !is_and_one(events, idx) {
                        let next = ev
                            .team_id
                            .as_ref()
                            .or(self.open.offense_team_id.as_ref())
                            .map(|t| self.opponent(t));
                        self.close(idx, TerminationReason::MadeShot, next, idx + 1, None);
                    }
                }
                EventCategory::ShotMiss => {
                    self.last_shot_team = ev.team_id.clone();
                }
                EventCategory::Turnover => {
                    let next = ev
                        .team_id
                        .as_ref()
                        .or(self.open.offense_team_id.as_ref())
                        .map(|t| self.opponent(t));
                    self.close(idx, TerminationReason::Turnover, next, idx + 1, None);
                }
                EventCategory::Rebound => {
                    let reference = self
                        .last_shot_team
                        .clone()
                        .or_else(|| self.open.offense_team_id.clone());
                    if let (Some(reb_team), Some(reference)) = (&ev.team_id, reference) {
                        if *reb_team != reference {
                            // The rebound anchors the next possession:
                            // its clock and lineup snapshot carry over.
                            self.close(
                                idx,
                                TerminationReason::DefensiveRebound,
                                Some(reb_team.clone()),
                                idx,
                                ev.clock,
                            );
                        }
                    }
                }
                EventCategory::FreeThrow => {
                    if !ev.is_technical {
                        self.last_shot_team = ev.team_id.clone();
                    }
                    if ev.made() && ev.is_last_free_throw() && !ev.is_technical {
                        let next = ev
                            .team_id
                            .as_ref()
                            .or(self.open.offense_team_id.as_ref())
                            .map(|t| self.opponent(t));
                        self.close(idx, TerminationReason::FreeThrowFinal, next, idx + 1, None);
                    }
                }
                _ => {}
            }
        }

        // 8. Game end.
        if !events.is_empty() {
            let last = events.len() - 1;
            self.close(last, TerminationReason::GameEnd, None, events.len(), None);
        }

        self.out
    }
}

// =============================================================================
// Entry point
// =============================================================================

/// Partition one game's annotated events into possessions.
///
/// Requires the annotation stage to have attributed exactly two teams;
/// anything else yields no possessions.
pub fn segment_game(events: &[LineupAnnotatedEvent]) -> Vec<Possession> {
    let Some(first) = events.first() else {
        return Vec::new();
    };

    let mut teams = first.lineups.keys();
    let (Some(team_a), Some(team_b), None) = (teams.next(), teams.next(), teams.next()) else {
        return Vec::new();
    };

    let segmenter = Segmenter {
        events,
        game_id: first.event.game_id.clone(),
        team_a: team_a.clone(),
        team_b: team_b.clone(),
        open: OpenPossession {
            // Seeded from the first event so a phantom possession is
            // never closed at event zero.
            period: first.event.period,
            offense_team_id: None,
            points: 0,
            event_count: 0,
            has_scoring_play: false,
            start_index: 0,
            start_clock: first.event.clock,
        },
        last_shot_team: None,
        out: Vec::new(),
    };

    segmenter.run()
}
