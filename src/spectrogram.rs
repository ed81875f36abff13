//! Short-time spectral view of one mono audio track, at two levels of
//! resolution: a fixed "base" spectrogram computed once from the raw
//! samples, and a "current" view re-binned from it at a caller-chosen
//! multiplier (coarser for early passes, finer as the driver refines).

use crate::audio::MonoAudio;
use crate::config::Config;
use crate::error::TimeWarpError;
use realfft::RealFftPlanner;
use std::path::Path;

/// One frequency-bin magnitude-squared vector per base time tick.
pub struct Spectrogram {
    base: Vec<Vec<f64>>,
    current: Vec<Vec<f64>>,
    /// Resolution multiplier (in units of `Config::precision` base ticks)
    /// the current view was last computed at.
    mult_by: u64,
}

fn hann_window(size: usize) -> Vec<f64> {
    if size <= 1 {
        return vec![1.0; size];
    }
    (0..size)
        .map(|i| 0.5 - 0.5 * (2.0 * std::f64::consts::PI * i as f64 / (size - 1) as f64).cos())
        .collect()
}

impl Spectrogram {
    /// Build the base spectrogram for `audio` at the configured tick size
    /// and window/overlap degree. `samples_in_tick = base_tick * rate / 100`
    /// (base_tick is in centiseconds), window = `samples_in_tick *
    /// b_overlap_degree`, hop = `samples_in_tick`. `source_path` is kept only
    /// to name the offending file if the audio turns out to be empty.
    pub fn build(audio: &MonoAudio, config: &Config, source_path: &Path) -> Result<Spectrogram, TimeWarpError> {
        if audio.samples.is_empty() {
            return Err(TimeWarpError::EmptySpectrogram {
                path: source_path.to_path_buf(),
            });
        }
        let samples_in_tick =
            ((config.base_tick * audio.sample_rate as f64) / 100.0).round() as usize;
        let samples_in_tick = samples_in_tick.max(1);
        let window_size = samples_in_tick * config.b_overlap_degree as usize;
        let hop = samples_in_tick;

        let mut planner = RealFftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(window_size.max(1));
        let window = hann_window(window_size);

        let samples = &audio.samples;
        let mut base = Vec::new();
        let mut start = 0usize;
        let mut in_buf = fft.make_input_vec();
        let mut out_buf = fft.make_output_vec();
        let mut scratch = fft.make_scratch_vec();

        while start < samples.len() {
            for (i, slot) in in_buf.iter_mut().enumerate() {
                let idx = start + i;
                *slot = if idx < samples.len() {
                    samples[idx] as f64 * window[i]
                } else {
                    0.0
                };
            }
            fft.process_with_scratch(&mut in_buf, &mut out_buf, &mut scratch)
                .expect("fixed-size real FFT never fails on a correctly sized buffer");
            base.push(out_buf.iter().map(|c| c.norm_sqr()).collect());
            start += hop;
        }
        // `samples` is non-empty (checked above) and the window loop always
        // runs at least once from `start == 0`, so `base` is never empty here.

        Ok(Spectrogram {
            base,
            current: Vec::new(),
            mult_by: 0,
        })
    }

    pub fn base_len(&self) -> usize {
        self.base.len()
    }

    pub fn current_len(&self) -> usize {
        self.current.len()
    }

    pub fn frame(&self, i: usize) -> &[f64] {
        &self.current[i]
    }

    /// Re-bin the base spectrogram into the "current" view used by one
    /// resolution pass: each output tick averages `c_overlap_degree`
    /// consecutive blocks of `precision * mult_by` base ticks, with
    /// `precision * mult_by` stride between consecutive output ticks
    /// (i.e. overlapping averaging windows, non-overlapping output ticks).
    ///
    /// Per spec §3/§4.4, the base spectrogram is conceptually zero-padded
    /// to length `(T_curr + C_OVERLAP_DEGREE - 1) * block_size` first, and
    /// every output frame then divides by the *same* fixed denominator
    /// `c_overlap_degree * block_size` — rows that fall past the real data
    /// (because they were zero-padded) still count toward that denominator,
    /// so frames near the tail are pulled down rather than renormalized
    /// over however many real rows happened to be available.
    pub fn rebin(&mut self, config: &Config, mult_by: u64) {
        let tick = (config.precision as u64 * mult_by).max(1) as usize;
        let ticks = self.base.len();
        let window_count = ticks.div_ceil(tick);
        let freq_bins = self.base[0].len();
        let block_size = config.c_overlap_degree as usize * tick;

        let mut current = Vec::with_capacity(window_count);
        for w in 0..window_count {
            let block_start = w * tick;
            let block_end = (block_start + block_size).min(ticks);
            let mut acc = vec![0.0f64; freq_bins];
            for row in &self.base[block_start.min(ticks)..block_end] {
                for (a, v) in acc.iter_mut().zip(row) {
                    *a += v;
                }
            }
            for a in &mut acc {
                *a /= block_size as f64;
            }
            current.push(acc);
        }
        self.current = current;
        self.mult_by = mult_by;
    }

    /// One random frame from the current view, for `av_cost` sampling.
    pub fn rand_vector(&self, rng: &mut impl rand::Rng) -> &[f64] {
        let i = rng.gen_range(0..self.current.len());
        &self.current[i]
    }
}
