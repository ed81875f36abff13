//! Tunable constants and run configuration, loaded from an optional TOML
//! file and overridable from the CLI (see `main.rs`). Field-for-field this
//! mirrors the original implementation's `Config` class; the one field that
//! did not survive is `VISUAL`, a cached debug image meant for inspection
//! from an interactive console session, which has no counterpart in a batch
//! binary.

use crate::error::TimeWarpError;
use serde::{Deserialize, Serialize};
use std::path::{Path as FsPath, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The two source media paths to compare, or empty to reuse a
    /// previously saved path from `text_file`.
    pub media: Vec<PathBuf>,
    /// A previously saved textual path, used instead of recomputing one
    /// when `media` is empty.
    pub text_file: Option<PathBuf>,
    /// Where the computed path is written.
    pub log_file: PathBuf,
    /// Target sample rate (Hz) the external transcoder resamples to.
    pub default_hz: u32,
    /// Size of the base spectrogram time unit, in centiseconds.
    pub base_tick: f64,
    /// Path-finding precision, in base ticks.
    pub precision: u32,
    /// Window overlap degree used when building the base spectrogram.
    pub b_overlap_degree: u32,
    /// Block overlap degree used when re-binning the base spectrogram.
    pub c_overlap_degree: u32,
    /// Number of random frame pairs sampled to estimate `av_cost`.
    pub sample_size: u32,
    /// Antidiagonal corridor radius used by the corridor DP.
    pub radius: i64,
    /// Penalty for a diagonal<->axial transition, in units of `av_cost`.
    pub penalty: f64,
    /// Cost of an axial move, in units of `av_cost`.
    pub nondiagkoef: f64,
    /// Re-encode cached intermediate WAVs even if they already exist.
    pub rewrite_wav: bool,
    /// Keep intermediate WAVs around after the run.
    pub save_wav: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            media: Vec::new(),
            text_file: None,
            log_file: PathBuf::from("log.out"),
            default_hz: 4000,
            base_tick: 1.0,
            precision: 2,
            b_overlap_degree: 3,
            c_overlap_degree: 3,
            sample_size: 3000,
            radius: 6,
            penalty: 15.0,
            nondiagkoef: 1.3,
            rewrite_wav: false,
            save_wav: true,
        }
    }
}

impl Config {
    /// Load from a TOML file if given, falling back to built-in defaults
    /// (matching the original's literal constants) for any field the file
    /// doesn't set. Validates the result before returning it.
    pub fn load(path: Option<&FsPath>) -> Result<Config, TimeWarpError> {
        let cfg = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| TimeWarpError::AudioIo {
                    path: path.to_path_buf(),
                    source,
                })?;
                toml::from_str(&text)?
            }
            None => Config::default(),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), TimeWarpError> {
        if !(self.media.is_empty() || self.media.len() == 2) {
            return Err(TimeWarpError::WrongMediaCount {
                found: self.media.len(),
            });
        }
        if self.media.is_empty() && self.text_file.is_none() {
            return Err(TimeWarpError::InvalidConfig(
                "either `media` (2 paths) or `text_file` must be set".into(),
            ));
        }
        if self.precision == 0 {
            return Err(TimeWarpError::InvalidConfig("precision must be >= 1".into()));
        }
        if self.radius < 0 {
            return Err(TimeWarpError::InvalidConfig("radius must be >= 0".into()));
        }
        Ok(())
    }
}
