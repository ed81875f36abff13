//! Penalty-weighted corridor dynamic program: given a draft path from a
//! coarser resolution, refine it by exact DP restricted to a narrow band
//! around it. Two arrival states are tracked per cell — best cost arriving
//! via a diagonal move, best cost arriving via an axial move — so that
//! switching move family (diagonal <-> axial) can be charged a transition
//! penalty without forcing every cell to track one state per possible
//! incoming move.

use crate::config::Config;
use crate::distance::cos_log;
use crate::error::TimeWarpError;
use crate::path::Path;
use crate::point::{Move, Point};
use crate::spectrogram::Spectrogram;
use log::info;
use rustc_hash::FxHashMap;
use std::time::{Duration, Instant};

const PROGRESS_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Clone)]
struct Cell {
    diag: (f64, Path),
    horver: (f64, Path),
}

fn back_moves(p: Point) -> &'static [Move] {
    if p.x == 0 {
        &[Move::Up]
    } else if p.y == 0 {
        &[Move::Right]
    } else {
        &[Move::Up, Move::Right, Move::Diag]
    }
}

fn edge_cost(v: Point, mv: Move, x: &Spectrogram, y: &Spectrogram, av_cost: f64, nondiagkoef: f64) -> f64 {
    if mv.is_diag() {
        cos_log(x.frame(v.x as usize), y.frame(v.y as usize))
    } else {
        av_cost * nondiagkoef
    }
}

/// Sweep antidiagonals within `draft.corridor(config.radius)`, filling one
/// `Cell` per visited lattice point, and return the cheapest path from
/// (0, 0) to (x.current_len(), y.current_len()).
///
/// `config.penalty` is scaled by `av_cost` before being charged, so the
/// penalty's weight stays proportional to the track's typical frame
/// distance regardless of how loud or quiet either source is.
pub fn corridor_search(
    x: &Spectrogram,
    y: &Spectrogram,
    draft: &Path,
    config: &Config,
    av_cost: f64,
) -> Result<Path, TimeWarpError> {
    let goal = Point::new(x.current_len() as i64, y.current_len() as i64);
    let penalty = config.penalty * av_cost;

    let mut curr: FxHashMap<Point, Cell> = FxHashMap::default();
    let mut prev1: FxHashMap<Point, Cell> = FxHashMap::default();
    let mut prev2: FxHashMap<Point, Cell> = FxHashMap::default();
    prev1.insert(
        Point::new(0, 0),
        Cell {
            diag: (0.0, Path::new()),
            horver: (0.0, Path::new()),
        },
    );

    let mut current_slice = 1i64;
    let first_stamp = Instant::now();
    let mut prev_stamp = first_stamp;

    for point in draft.corridor(config.radius) {
        if point.slice() > goal.slice() {
            break;
        }
        if prev_stamp.elapsed() > PROGRESS_INTERVAL {
            info!("corridor dp: at {point}");
            prev_stamp = Instant::now();
        }
        if point.slice() > current_slice {
            current_slice = point.slice();
            prev2 = std::mem::replace(&mut prev1, std::mem::take(&mut curr));
        }
        if !(0 <= point.x && point.x <= goal.x && 0 <= point.y && point.y <= goal.y) {
            continue;
        }

        let mut best_diag = (f64::INFINITY, Path::new());
        let mut best_horver = (f64::INFINITY, Path::new());

        for &mv in back_moves(point) {
            let prev = point.back(mv);
            if mv.is_diag() {
                if let Some(cell) = prev2.get(&prev) {
                    let (cost, path) = if cell.diag.0 <= cell.horver.0 + penalty {
                        cell.diag.clone()
                    } else {
                        (cell.horver.0 + penalty, cell.horver.1.clone())
                    };
                    let new_cost = cost + edge_cost(prev, mv, x, y, av_cost, config.nondiagkoef);
                    if new_cost < best_diag.0 {
                        best_diag = (new_cost, path.plus(Some(mv)));
                    }
                }
            } else if let Some(cell) = prev1.get(&prev) {
                let (cost, path) = if cell.horver.0 <= cell.diag.0 + penalty {
                    cell.horver.clone()
                } else {
                    (cell.diag.0 + penalty, cell.diag.1.clone())
                };
                let new_cost = cost + edge_cost(prev, mv, x, y, av_cost, config.nondiagkoef);
                if new_cost < best_horver.0 {
                    best_horver = (new_cost, path.plus(Some(mv)));
                }
            }
        }

        curr.insert(
            point,
            Cell {
                diag: best_diag,
                horver: best_horver,
            },
        );
    }

    info!(
        "corridor dp (radius {}) finished in {:.2}s",
        config.radius,
        first_stamp.elapsed().as_secs_f64()
    );

    let final_cell = curr.get(&goal).ok_or(TimeWarpError::NoPath)?;
    let (cost, path) = if final_cell.diag.0 <= final_cell.horver.0 {
        &final_cell.diag
    } else {
        &final_cell.horver
    };
    if !cost.is_finite() {
        return Err(TimeWarpError::NoPath);
    }
    Ok(path.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::MonoAudio;

    fn spec_from(samples: Vec<f32>, rate: u32, config: &Config, mult: u64) -> Spectrogram {
        let audio = MonoAudio { sample_rate: rate, samples };
        let mut spec = Spectrogram::build(&audio, config, std::path::Path::new("test.wav")).unwrap();
        spec.rebin(config, mult);
        spec
    }

    #[test]
    fn identical_tracks_find_a_finite_path_along_the_diagonal() {
        let config = Config::default();
        let samples: Vec<f32> = (0..4000).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();
        let x = spec_from(samples.clone(), 8000, &config, 1);
        let y = spec_from(samples, 8000, &config, 1);
        let draft = Path::boundary(x.current_len() as u64, y.current_len() as u64);
        let path = corridor_search(&x, &y, &draft, &config, 1.0).unwrap();
        assert_eq!(
            path.end_point(),
            Point::new(x.current_len() as i64, y.current_len() as i64)
        );
    }

    #[test]
    fn zero_radius_corridor_that_misses_the_goal_reports_no_path() {
        let config = Config { radius: 0, ..Config::default() };
        let samples: Vec<f32> = (0..4000).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();
        let x = spec_from(samples.clone(), 8000, &config, 1);
        let y = spec_from(samples, 8000, &config, 1);
        // A draft path ending well short of the real goal, walked with zero
        // corridor slack: the DP can never reach the true goal cell.
        let draft = Path::boundary(1, 1);
        let result = corridor_search(&x, &y, &draft, &config, 1.0);
        assert!(matches!(result, Err(TimeWarpError::NoPath)));
    }
}
