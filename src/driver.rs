//! Sequences the multi-resolution search: pick a starting power-of-two
//! multiplier, then repeatedly re-bin both spectrograms, run the corridor
//! DP, and halve the multiplier until it reaches the finest (`mult == 1`)
//! resolution. The final path is scaled up to base-tick units.

use crate::config::Config;
use crate::corridor_dp::corridor_search;
use crate::distance::cos_log;
use crate::error::TimeWarpError;
use crate::path::Path;
use crate::spectrogram::Spectrogram;
use log::info;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seeds `av_cost` sampling so repeated runs over the same inputs are
/// reproducible; the original's attempt at this (`random.seed = 31168`,
/// a no-op assignment to a function attribute) never actually took effect.
const SAMPLE_SEED: u64 = 31168;

/// Largest power of two `m` with `m <= min(base_len_x, base_len_y) / precision`,
/// clamped to at least 1.
fn initial_mult(base_len_x: usize, base_len_y: usize, precision: u32) -> u64 {
    let min_len = base_len_x.min(base_len_y) as f64;
    let ratio = (min_len / precision as f64).max(1.0);
    let exponent = ratio.log2().floor().max(0.0) as u32;
    1u64 << exponent
}

/// Mean `cos_log` distance between `sample_size` random frame pairs drawn
/// from each spectrogram's current view.
fn average_cost(x: &Spectrogram, y: &Spectrogram, config: &Config, rng: &mut impl Rng) -> f64 {
    let total: f64 = (0..config.sample_size)
        .map(|_| cos_log(x.rand_vector(rng), y.rand_vector(rng)))
        .sum();
    let av_cost = total / config.sample_size as f64;
    info!("av_cost={av_cost}");
    av_cost
}

/// Run the full multi-resolution search and return the final path, scaled
/// so its run counts are in base-tick units.
pub fn run(x: &mut Spectrogram, y: &mut Spectrogram, config: &Config) -> Result<Path, TimeWarpError> {
    let mut mult = initial_mult(x.base_len(), y.base_len(), config.precision);
    let mut rng = ChaCha8Rng::seed_from_u64(SAMPLE_SEED);
    let mut draft: Option<Path> = None;

    loop {
        x.rebin(config, mult);
        y.rebin(config, mult);

        let seed = draft.unwrap_or_else(|| Path::boundary(x.current_len() as u64, y.current_len() as u64));

        info!("multiresolution driver: mult={mult}");
        let av_cost = average_cost(x, y, config, &mut rng);
        let refined = corridor_search(x, y, &seed, config, av_cost)?;

        mult /= 2;
        if mult == 0 {
            draft = Some(refined);
            break;
        }
        draft = Some(refined.scale(2));
    }

    Ok(draft.expect("loop always assigns draft before breaking").scale(config.precision as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::MonoAudio;

    #[test]
    fn initial_mult_is_a_power_of_two_not_exceeding_the_ratio() {
        let m = initial_mult(10_000, 8_000, 2);
        assert!(m.is_power_of_two());
        assert!(m as f64 <= 8_000.0 / 2.0);
    }

    #[test]
    fn short_input_still_yields_mult_of_at_least_one() {
        assert_eq!(initial_mult(1, 1, 2), 1);
    }

    #[test]
    fn identical_tracks_end_on_a_mostly_diagonal_path_at_base_resolution() {
        let config = Config {
            sample_size: 200,
            ..Config::default()
        };
        let samples: Vec<f32> = (0..8000).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();
        let audio_x = MonoAudio { sample_rate: 8000, samples: samples.clone() };
        let audio_y = MonoAudio { sample_rate: 8000, samples };
        let path = std::path::Path::new("test.wav");
        let mut x = Spectrogram::build(&audio_x, &config, path).unwrap();
        let mut y = Spectrogram::build(&audio_y, &config, path).unwrap();

        let path = run(&mut x, &mut y, &config).unwrap();
        assert_eq!(path.end_point().x, path.end_point().y);
    }
}
