//! Per-game pipeline orchestration.
//!
//! Normalize → attribute players to teams → annotate lineups → segment.
//! One game is a pure, bounded, synchronous computation over its ordered
//! rows; games share no mutable state and fan out in the driver.

use tracing::debug;

use crate::data::models::{GameId, NormalizedEvent, Possession, RawEventBlock};
use crate::lineups::{annotate_game, PlayerTeamMap};
use crate::normalize::normalize_block;
use crate::possessions::segment_game;

/// One game's derived artifacts.
#[derive(Debug)]
pub struct GameOutput {
    pub game_id: GameId,
    pub events: Vec<NormalizedEvent>,
    pub possessions: Vec<Possession>,
}

/// Run the full pipeline for one game's ordered raw rows.
///
/// Data-quality problems degrade inside the stages (UNKNOWN events,
/// short lineups, skipped one-team games); this function never fails.
pub fn process_game(game_id: GameId, blocks: &[RawEventBlock]) -> GameOutput {
    let events: Vec<NormalizedEvent> = blocks.iter().map(normalize_block).collect();
    let team_map = PlayerTeamMap::build(&events);
    let annotated = annotate_game(&events, &team_map);
    let possessions = segment_game(&annotated);

    debug!(
        game_id = %game_id,
        events = events.len(),
        mapped_players = team_map.len(),
        possessions = possessions.len(),
        "Game processed"
    );

    GameOutput {
        game_id,
        events,
        possessions,
    }
}
