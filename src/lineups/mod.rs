pub mod team_map;
pub mod tracker;

pub use team_map::{distinct_teams, PlayerTeamMap};
pub use tracker::{annotate_game, solve_starters};
