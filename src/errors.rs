//! Pipeline error types.
//!
//! Errors are reserved for I/O and serialization faults at the edges.
//! Malformed play-by-play data never raises: unparseable text degrades
//! to UNKNOWN events, bad lineups and unresolved possessions are handled
//! by the downstream validator.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No raw event files found under {}", .0.display())]
    NoInput(PathBuf),
}
