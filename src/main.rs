//! NBA play-by-play possession pipeline.
//!
//! Derives two artifacts from raw play-by-play text: per-event five-man
//! lineups for both teams, and a possession table tagged with offense,
//! defense, lineups, and points scored.
//!
//! Architecture:
//! - Regex-table event normalizer (unparseable text degrades, never drops)
//! - Game-scoped player→team attribution map
//! - Two-pass lineup tracker: solve starters, then replay substitutions
//! - Explicit-state possession segmenter with bounded and-one lookahead
//! - Exactly-five lineup validator feeding the clean output
//! - Tokio runtime; games fan out as independent blocking tasks

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use futures::stream::{self, StreamExt};
use tracing::{error, info, warn};

use pbp_possessions::config::Settings;
use pbp_possessions::data::event_feed;
use pbp_possessions::data::models::Possession;
use pbp_possessions::errors::PipelineError;
use pbp_possessions::pipeline::{self, GameOutput};
use pbp_possessions::possessions::validate_possessions;
use pbp_possessions::report::RunReport;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env();
    init_logging(&settings);

    info!("=== Play-by-Play Possession Pipeline ===");
    info!(
        input = %settings.input_path,
        output = %settings.output_path,
        max_concurrency = settings.max_concurrency,
        "Configuration loaded"
    );

    if let Err(errors) = settings.validate() {
        for e in &errors {
            error!(error = %e, "Configuration error");
        }
        anyhow::bail!("Configuration validation failed");
    }

    let games = event_feed::load_games(Path::new(&settings.input_path))?;

    let mut report = RunReport::start();

    // Fan out one blocking task per game; events within a game stay
    // strictly ordered inside their task.
    let mut outputs: Vec<GameOutput> = stream::iter(games)
        .map(|(game_id, blocks)| {
            tokio::task::spawn_blocking(move || pipeline::process_game(game_id, &blocks))
        })
        .buffer_unordered(settings.max_concurrency)
        .filter_map(|joined| async move {
            match joined {
                Ok(output) => Some(output),
                Err(e) => {
                    warn!(error = %e, "Game task failed");
                    None
                }
            }
        })
        .collect()
        .await;

    // Deterministic output order regardless of completion order.
    outputs.sort_by(|a, b| a.game_id.cmp(&b.game_id));

    for output in &outputs {
        report.record_game(&output.events, &output.possessions);
    }

    let possessions: Vec<Possession> = outputs.into_iter().flat_map(|o| o.possessions).collect();

    write_possessions(Path::new(&settings.output_path), &possessions)?;
    info!(
        path = %settings.output_path,
        rows = possessions.len(),
        "Wrote possession table"
    );

    if settings.emit_clean {
        let (clean, _stats) = validate_possessions(possessions);
        write_possessions(Path::new(&settings.clean_output_path), &clean)?;
        info!(
            path = %settings.clean_output_path,
            rows = clean.len(),
            "Wrote clean possession table"
        );
    }

    report.log();
    Ok(())
}

/// Write possessions as JSON lines.
fn write_possessions(path: &Path, rows: &[Possession]) -> Result<(), PipelineError> {
    let file = File::create(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    for row in rows {
        let line = serde_json::to_string(row).map_err(|source| PipelineError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        writeln!(writer, "{line}").map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

fn init_logging(settings: &Settings) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));

    if settings.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}
