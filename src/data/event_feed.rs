//! Raw event feed from JSON files.
//!
//! Loads upstream play-by-play rows from a single JSON file (array or
//! JSON lines) or a directory of such files, and groups them by game
//! preserving stream order. I/O and JSON faults are typed errors;
//! per-row data problems are the normalizer's concern.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::data::models::{GameId, RawEventBlock};
use crate::errors::PipelineError;

/// Ordered rows per game.
pub type GameRows = BTreeMap<GameId, Vec<RawEventBlock>>;

/// Load every raw row under `path` and group by game.
///
/// Rows keep file order within a game; a row without an upstream
/// sequence number is assigned its arrival index so downstream tie
/// breaking stays stable.
pub fn load_games(path: &Path) -> Result<GameRows, PipelineError> {
    let mut games: GameRows = BTreeMap::new();

    for file in input_files(path)? {
        let rows = read_rows(&file)?;
        debug!(path = %file.display(), rows = rows.len(), "Loaded raw file");
        for block in rows {
            games.entry(block.game_id.clone()).or_default().push(block);
        }
    }

    for rows in games.values_mut() {
        for (idx, block) in rows.iter_mut().enumerate() {
            if block.sequence == 0 {
                block.sequence = idx as u32;
            }
        }
    }

    info!(
        games = games.len(),
        rows = games.values().map(Vec::len).sum::<usize>(),
        "Grouped raw play-by-play by game"
    );
    Ok(games)
}

fn input_files(path: &Path) -> Result<Vec<std::path::PathBuf>, PipelineError> {
    if path.is_dir() {
        let entries = fs::read_dir(path).map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut files: Vec<_> = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| {
                matches!(
                    p.extension().and_then(|e| e.to_str()),
                    Some("json") | Some("jsonl")
                )
            })
            .collect();
        files.sort();
        if files.is_empty() {
            return Err(PipelineError::NoInput(path.to_path_buf()));
        }
        Ok(files)
    } else {
        Ok(vec![path.to_path_buf()])
    }
}

fn read_rows(path: &Path) -> Result<Vec<RawEventBlock>, PipelineError> {
    let text = fs::read_to_string(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if path.extension().and_then(|e| e.to_str()) == Some("jsonl") {
        text.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(|line| {
                serde_json::from_str(line).map_err(|source| PipelineError::Json {
                    path: path.to_path_buf(),
                    source,
                })
            })
            .collect()
    } else {
        serde_json::from_str(&text).map_err(|source| PipelineError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}
