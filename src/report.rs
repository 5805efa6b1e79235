//! Run reporting.
//!
//! Accumulates event-category value counts and possession totals across
//! a run and renders them through `tracing` when the run finishes.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::data::models::{EventCategory, NormalizedEvent, Possession};

/// Aggregate statistics for one processing run.
#[derive(Debug)]
pub struct RunReport {
    started_at: DateTime<Utc>,
    games: usize,
    events: usize,
    category_counts: HashMap<EventCategory, usize>,
    possessions: usize,
    total_points: u64,
}

impl RunReport {
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            games: 0,
            events: 0,
            category_counts: HashMap::new(),
            possessions: 0,
            total_points: 0,
        }
    }

    /// Fold one game's artifacts into the running totals.
    pub fn record_game(&mut self, events: &[NormalizedEvent], possessions: &[Possession]) {
        self.games += 1;
        self.events += events.len();
        for ev in events {
            *self.category_counts.entry(ev.category).or_insert(0) += 1;
        }
        self.possessions += possessions.len();
        self.total_points += possessions.iter().map(|p| u64::from(p.points)).sum::<u64>();
    }

    pub fn unknown_count(&self) -> usize {
        self.category_counts
            .get(&EventCategory::Unknown)
            .copied()
            .unwrap_or(0)
    }

    /// Render the summary, category counts sorted by frequency.
    pub fn log(&self) {
        let elapsed = Utc::now() - self.started_at;

        let mut counts: Vec<(EventCategory, usize)> =
            self.category_counts.iter().map(|(c, n)| (*c, *n)).collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.to_string().cmp(&b.0.to_string())));

        info!(
            games = self.games,
            events = self.events,
            possessions = self.possessions,
            total_points = self.total_points,
            unknown_events = self.unknown_count(),
            elapsed_ms = elapsed.num_milliseconds(),
            "Run complete"
        );
        for (category, count) in counts {
            info!(category = %category, count, "Event category count");
        }
    }
}
