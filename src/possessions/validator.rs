//! Possession validation.
//!
//! Final cleaning step: keeps only possessions whose offense and defense
//! lineups each hold exactly five distinct players. Kept separate from
//! the segmenter so a single garbled period never suppresses the rest of
//! a game's possessions.

use tracing::info;

use crate::data::models::Possession;

/// Outcome of a validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationStats {
    pub initial: usize,
    pub kept: usize,
    pub dropped: usize,
}

impl ValidationStats {
    pub fn dropped_pct(&self) -> f64 {
        if self.initial == 0 {
            0.0
        } else {
            self.dropped as f64 / self.initial as f64 * 100.0
        }
    }
}

/// Filter a possession table down to records with exactly five players
/// per side, reporting what was dropped.
pub fn validate_possessions(possessions: Vec<Possession>) -> (Vec<Possession>, ValidationStats) {
    let initial = possessions.len();
    let clean: Vec<Possession> = possessions
        .into_iter()
        .filter(Possession::has_valid_lineups)
        .collect();

    let stats = ValidationStats {
        initial,
        kept: clean.len(),
        dropped: initial - clean.len(),
    };

    info!(
        initial = stats.initial,
        kept = stats.kept,
        dropped = stats.dropped,
        dropped_pct = format!("{:.3}", stats.dropped_pct()),
        "Validated possession lineups"
    );

    (clean, stats)
}
