//! CLI entry point: loads configuration, loads or transcodes the two source
//! tracks, runs the multi-resolution search, and writes the resulting path's
//! textual form to the configured log file.

use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::time::Instant;
use timewarp::audio::{self, MonoAudio};
use timewarp::config::Config;
use timewarp::driver;
use timewarp::error::TimeWarpError;
use timewarp::path::Path;
use timewarp::spectrogram::Spectrogram;

/// Align a subtitle track's implicit timeline between two audio cuts.
#[derive(Parser, Debug)]
#[command(name = "subtitle-timewarp", version, about)]
struct Cli {
    /// TOML configuration file; unset fields keep their built-in defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override Config::media: exactly two source media paths.
    #[arg(long, num_args = 2)]
    media: Vec<PathBuf>,

    /// Override Config::text_file: reuse a previously computed path instead
    /// of recomputing one.
    #[arg(long)]
    text_file: Option<PathBuf>,

    /// Override Config::log_file: where the computed path is written.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), TimeWarpError> {
    let mut config = Config::load(cli.config.as_deref())?;
    if !cli.media.is_empty() {
        config.media = cli.media;
    }
    if cli.text_file.is_some() {
        config.text_file = cli.text_file;
    }
    if let Some(log_file) = cli.log_file {
        config.log_file = log_file;
    }
    config.validate()?;

    let start = Instant::now();
    let path = compute_path(&config)?;

    std::fs::write(&config.log_file, path.to_string()).map_err(|source| TimeWarpError::AudioIo {
        path: config.log_file.clone(),
        source,
    })?;
    info!(
        "wrote {} in {:.2}s",
        config.log_file.display(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn compute_path(config: &Config) -> Result<Path, TimeWarpError> {
    if config.media.is_empty() {
        let text_file = config
            .text_file
            .as_ref()
            .expect("Config::validate rejects empty media without a text_file");
        let text = std::fs::read_to_string(text_file).map_err(|source| TimeWarpError::AudioIo {
            path: text_file.clone(),
            source,
        })?;
        return Path::parse(text.trim());
    }

    let a = &config.media[0];
    let b = &config.media[1];

    let wav_a = audio::ensure_wav(a, config)?;
    let wav_b = audio::ensure_wav(b, config)?;
    let audio_a = MonoAudio::read_wav(&wav_a)?;
    let audio_b = MonoAudio::read_wav(&wav_b)?;

    let mut spec_a = Spectrogram::build(&audio_a, config, a)?;
    let mut spec_b = Spectrogram::build(&audio_b, config, b)?;
    let result = driver::run(&mut spec_a, &mut spec_b, config);

    audio::cleanup_wav(a, &wav_a, config);
    audio::cleanup_wav(b, &wav_b, config);

    result
}
