//! Player→team attribution for one game.
//!
//! Play-by-play rows attribute a team to the *event*, not to each player
//! on the row: the second and third actors may belong to either side.
//! The map is assembled from sources ordered least→most authoritative,
//! later sources overwriting earlier ones: substitutions and free throws
//! (always own-team), assist credits on made shots (own-team), a
//! primary-actor fallback, then opposite-team attribution for the third
//! actor and for foul/turnover counterparts (foul drawn, stealer).

use std::collections::HashMap;

use crate::data::models::{EventCategory, NormalizedEvent, PlayerId, TeamId};

/// Game-scoped player→team lookup.
#[derive(Debug, Default, Clone)]
pub struct PlayerTeamMap {
    map: HashMap<PlayerId, TeamId>,
}

impl PlayerTeamMap {
    /// Build the map from one game's normalized events.
    pub fn build(events: &[NormalizedEvent]) -> Self {
        let mut map: HashMap<PlayerId, TeamId> = HashMap::new();

        // Substitutions: the row's team is the substituted player's team.
        for ev in events {
            if ev.category == EventCategory::Substitution {
                if let (Some(team), Some(p1)) = (&ev.team_id, &ev.primary_player_id) {
                    map.insert(p1.clone(), team.clone());
                }
            }
        }

        // Free throws: the shooter is on the row's team.
        for ev in events {
            if ev.category == EventCategory::FreeThrow {
                if let (Some(team), Some(p1)) = (&ev.team_id, &ev.primary_player_id) {
                    map.insert(p1.clone(), team.clone());
                }
            }
        }

        // Assist credits on made shots: the assister shares the shooter's team.
        for ev in events {
            if ev.category == EventCategory::ShotMade {
                if let (Some(team), Some(p2)) = (&ev.team_id, &ev.secondary_player_id) {
                    map.insert(p2.clone(), team.clone());
                }
            }
        }

        // Fallback: an unmapped primary actor belongs to the row's team.
        for ev in events {
            if let (Some(team), Some(p1)) = (&ev.team_id, &ev.primary_player_id) {
                map.entry(p1.clone()).or_insert_with(|| team.clone());
            }
        }

        // Opposite-team attribution needs both team ids.
        let teams = distinct_teams(events);
        if let [team_a, team_b] = teams.as_slice() {
            for ev in events {
                let Some(team) = &ev.team_id else { continue };
                let opponent = if team == team_a { team_b } else { team_a };

                if let Some(p3) = &ev.tertiary_player_id {
                    map.insert(p3.clone(), opponent.clone());
                }
                if matches!(ev.category, EventCategory::Foul | EventCategory::Turnover) {
                    if let Some(p2) = &ev.secondary_player_id {
                        map.insert(p2.clone(), opponent.clone());
                    }
                }
            }
        }

        Self { map }
    }

    pub fn team_of(&self, player: &PlayerId) -> Option<&TeamId> {
        self.map.get(player)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Distinct non-null team ids across a game, in first-appearance order.
pub fn distinct_teams(events: &[NormalizedEvent]) -> Vec<TeamId> {
    let mut teams: Vec<TeamId> = Vec::new();
    for ev in events {
        if let Some(team) = &ev.team_id {
            if !teams.contains(team) {
                teams.push(team.clone());
            }
        }
    }
    teams
}
