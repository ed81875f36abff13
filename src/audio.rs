//! Mono PCM audio loading, with on-demand transcoding of non-WAV media
//! through an external `ffmpeg` binary.

use crate::config::Config;
use crate::error::TimeWarpError;
use std::path::{Path, PathBuf};
use std::process::Command;

/// One decoded track: mono samples in `[-1, 1]` at `sample_rate` Hz.
pub struct MonoAudio {
    pub sample_rate: u32,
    pub samples: Vec<f32>,
}

impl MonoAudio {
    /// Read a WAV file, mixing down to mono if it has more than one channel
    /// (first channel only, matching the original's `extract_mono`).
    pub fn read_wav(path: &Path) -> Result<MonoAudio, TimeWarpError> {
        let mut reader = hound::WavReader::open(path).map_err(|e| TimeWarpError::AudioIo {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })?;
        let spec = reader.spec();
        let channels = spec.channels as usize;
        let sample_rate = spec.sample_rate;

        let all: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<_, _>>()
                .map_err(|e| io_err(path, e))?,
            hound::SampleFormat::Int => {
                let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / max))
                    .collect::<Result<_, _>>()
                    .map_err(|e| io_err(path, e))?
            }
        };

        let samples = if channels <= 1 {
            all
        } else {
            all.into_iter().step_by(channels).collect()
        };

        Ok(MonoAudio { sample_rate, samples })
    }
}

fn io_err(path: &Path, e: hound::Error) -> TimeWarpError {
    TimeWarpError::AudioIo {
        path: path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
    }
}

/// Ensure `path` is readable as mono WAV at `config.default_hz`, transcoding
/// through `ffmpeg` first if it isn't already a `.wav` file. Returns the path
/// to read with `MonoAudio::read_wav`.
///
/// The external command is built as an explicit argv (never a shell string),
/// so filenames containing shell metacharacters cannot inject commands —
/// unlike the original's `shell=True` invocation.
pub fn ensure_wav(path: &Path, config: &Config) -> Result<PathBuf, TimeWarpError> {
    if path.extension().and_then(|e| e.to_str()).map(|e| e.eq_ignore_ascii_case("wav")) == Some(true) {
        return Ok(path.to_path_buf());
    }

    let cache = path.with_extension("timewarp.wav");
    if cache.exists() && !config.rewrite_wav {
        return Ok(cache);
    }

    let status = Command::new("ffmpeg")
        .arg("-y")
        .arg("-i")
        .arg(path)
        .arg("-vn")
        .arg("-ac")
        .arg("1")
        .arg("-ar")
        .arg(config.default_hz.to_string())
        .arg(&cache)
        .status()
        .map_err(|e| TimeWarpError::Transcode {
            path: path.to_path_buf(),
            reason: format!("failed to spawn ffmpeg: {e}"),
        })?;

    if !status.success() {
        return Err(TimeWarpError::Transcode {
            path: path.to_path_buf(),
            reason: format!("ffmpeg exited with {status}"),
        });
    }

    Ok(cache)
}

/// Remove a transcoded cache file unless the configuration asked to keep it.
/// A no-op if `path` was already a `.wav` (nothing was transcoded).
pub fn cleanup_wav(original: &Path, transcoded: &Path, config: &Config) {
    if config.save_wav || original == transcoded {
        return;
    }
    let _ = std::fs::remove_file(transcoded);
}
