//! The single error type surfaced by every fallible operation in this crate.
//!
//! Per spec: the core is a batch computation, all errors are fatal, there are
//! no partial outputs. The only non-fatal, observable events are progress
//! diagnostics, which go through `log` rather than this type.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimeWarpError {
    #[error("malformed path text at byte {pos}: {reason}")]
    MalformedPath { pos: usize, reason: String },

    #[error("expected 0 or 2 media paths, found {found}")]
    WrongMediaCount { found: usize },

    #[error("I/O error reading audio file {path:?}: {source}")]
    AudioIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("spectrogram for {path:?} is empty: audio is too short for the configured resolution")]
    EmptySpectrogram { path: PathBuf },

    #[error("failed to transcode {path:?} with external transcoder: {reason}")]
    Transcode { path: PathBuf, reason: String },

    #[error("corridor search lost connectivity before reaching the goal: no finite-cost path found")]
    NoPath,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Config(#[from] toml::de::Error),
}
