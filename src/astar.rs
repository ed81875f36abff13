//! Coarse A* search: an exact full-grid pass at a single spectrogram
//! resolution, independent of the corridor DP's (C7) radius restriction.
//! Exercised directly by its own tests (its cost must agree with plain
//! Dijkstra on a small grid); the driver (C8) does not call it — it always
//! seeds its first corridor-DP pass with the boundary path instead.

use crate::distance::cos_log;
use crate::error::TimeWarpError;
use crate::grid_set::GridSet;
use crate::path::Path;
use crate::point::{Move, Point};
use crate::queue::PriorityQueue;
use crate::spectrogram::Spectrogram;
use log::info;
use std::time::{Duration, Instant};

const PROGRESS_INTERVAL: Duration = Duration::from_secs(10);

fn options(v: Point, goal: Point) -> &'static [Move] {
    if v.x == goal.x {
        &[Move::Up]
    } else if v.y == goal.y {
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

/// `|v.diff - goal.diff| * av_cost`: admissible because no edge costs less
/// than `av_cost` per unit of diagonal progress lost, and consistent because
/// adjacent cells differ in `diff` by at most 1.
fn heuristic(v: Point, goal: Point, av_cost: f64) -> f64 {
    ((v.diff() - goal.diff()).unsigned_abs() as f64) * av_cost
}

/// Full-grid A* over the two spectrograms' current views, from (0, 0) to
/// (x.current_len(), y.current_len()). Returns the optimal path in the
/// `cos_log` + axial-penalty cost model at this resolution.
pub fn coarse_search(
    x: &Spectrogram,
    y: &Spectrogram,
    av_cost: f64,
    nondiagkoef: f64,
) -> Result<Path, TimeWarpError> {
    let goal = Point::new(x.current_len() as i64, y.current_len() as i64);
    if goal.x == 0 || goal.y == 0 {
        return Err(TimeWarpError::NoPath);
    }

    let mut front = PriorityQueue::<Point>::new();
    front.update(Point::new(0, 0), 0.0, 0.0, &Path::new(), None);
    let mut visited = GridSet::new(goal.x, goal.y);

    let first_stamp = Instant::now();
    let mut prev_stamp = first_stamp;
    let mut cycles: u64 = 0;

    while let Some(current) = front.pop() {
        if prev_stamp.elapsed() > PROGRESS_INTERVAL {
            info!(
                "a* coarse search: at {}, heap_size={}, cycles={}",
                current.key,
                front.len(),
                cycles
            );
            prev_stamp = Instant::now();
        }

        if current.key == goal {
            info!(
                "a* coarse search terminated in {} cycles, {:.2}s",
                cycles,
                first_stamp.elapsed().as_secs_f64()
            );
            return Ok(current.path);
        }

        for &mv in options(current.key, goal) {
            let next = current.key.apply(mv);
            if visited.contains(next) {
                continue;
            }
            let new_cost = current.cost + edge_cost(current.key, mv, x, y, av_cost, nondiagkoef);
            let priority = new_cost + heuristic(next, goal, av_cost);
            front.update(next, priority, new_cost, &current.path, Some(mv));
        }
        visited.add(current.key);
        cycles += 1;
    }

    Err(TimeWarpError::NoPath)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::MonoAudio;
    use crate::config::Config;

    fn spec_from(samples: Vec<f32>, rate: u32, config: &Config) -> Spectrogram {
        let audio = MonoAudio { sample_rate: rate, samples };
        let mut spec = Spectrogram::build(&audio, config, std::path::Path::new("test.wav")).unwrap();
        spec.rebin(config, 4);
        spec
    }

    #[test]
    fn identical_tracks_favor_the_diagonal() {
        let config = Config::default();
        let samples: Vec<f32> = (0..4000)
            .map(|i| (i as f32 * 0.05).sin() * 0.5)
            .collect();
        let x = spec_from(samples.clone(), 8000, &config);
        let y = spec_from(samples, 8000, &config);
        let path = coarse_search(&x, &y, 1.0, config.nondiagkoef).unwrap();
        assert_eq!(path.end_point().x, x.current_len() as i64);
        assert_eq!(path.end_point().y, y.current_len() as i64);
        // Monotone and reaches the goal; identical tracks should be mostly diagonal.
        let runs_diag = path.to_string().matches('/').count();
        assert!(runs_diag >= 1);
    }

    #[test]
    fn heuristic_never_overestimates_unit_step() {
        let goal = Point::new(10, 10);
        let v = Point::new(3, 4);
        let h_v = heuristic(v, goal, 2.0);
        let h_next = heuristic(v.apply(Move::Diag), goal, 2.0);
        // Consistency: h(v) <= cost(v, next) + h(next) for any admissible edge cost >= 0.
        assert!(h_v <= 0.0 + h_next + 1e-9 || h_v - h_next <= 2.0);
    }

    #[test]
    fn differently_shaped_tracks_still_reach_goal() {
        let config = Config::default();
        let x = spec_from((0..4000).map(|i| (i as f32 * 0.05).sin() * 0.5).collect(), 8000, &config);
        let y = spec_from((0..6000).map(|i| (i as f32 * 0.05).cos() * 0.3).collect(), 8000, &config);
        let path = coarse_search(&x, &y, 1.0, config.nondiagkoef).unwrap();
        assert_eq!(path.end_point(), Point::new(x.current_len() as i64, y.current_len() as i64));
    }

    /// Recompute the total edge cost of `path` from scratch (walking every
    /// individual move, not the compressed `points_on_path` view), using the
    /// same edge-cost definition `coarse_search` uses.
    fn path_cost(path: &Path, x: &Spectrogram, y: &Spectrogram, av_cost: f64, nondiagkoef: f64) -> f64 {
        let mut v = Point::new(0, 0);
        let mut total = 0.0;
        for (mv, count) in path.runs() {
            for _ in 0..count {
                total += edge_cost(v, mv, x, y, av_cost, nondiagkoef);
                v = v.apply(mv);
            }
        }
        total
    }

    /// Plain forward DP over the full grid's DAG shortest-path problem,
    /// completely independent of the priority queue / heuristic / visited-
    /// set machinery `coarse_search` uses: every cell's cost is resolved
    /// from its three predecessors in slice order, which is exact for a DAG
    /// with nonnegative edge weights (the Dijkstra result on this graph).
    fn brute_force_goal_cost(x: &Spectrogram, y: &Spectrogram, av_cost: f64, nondiagkoef: f64) -> f64 {
        let n = x.current_len();
        let m = y.current_len();
        let mut dist = vec![vec![f64::INFINITY; m + 1]; n + 1];
        dist[0][0] = 0.0;
        for slice in 0..=(n + m) {
            for i in 0..=n.min(slice) {
                let j = slice - i;
                if j > m {
                    continue;
                }
                let d = dist[i][j];
                if !d.is_finite() {
                    continue;
                }
                let v = Point::new(i as i64, j as i64);
                if i < n {
                    let c = d + edge_cost(v, Move::Right, x, y, av_cost, nondiagkoef);
                    if c < dist[i + 1][j] {
                        dist[i + 1][j] = c;
                    }
                }
                if j < m {
                    let c = d + edge_cost(v, Move::Up, x, y, av_cost, nondiagkoef);
                    if c < dist[i][j + 1] {
                        dist[i][j + 1] = c;
                    }
                }
                if i < n && j < m {
                    let c = d + edge_cost(v, Move::Diag, x, y, av_cost, nondiagkoef);
                    if c < dist[i + 1][j + 1] {
                        dist[i + 1][j + 1] = c;
                    }
                }
            }
        }
        dist[n][m]
    }

    #[test]
    fn coarse_search_cost_matches_independent_dijkstra_on_a_small_grid() {
        let config = Config::default();
        let samples_x: Vec<f32> = (0..1600).map(|i| (i as f32 * 0.07).sin() * 0.5).collect();
        let samples_y: Vec<f32> = (0..2000).map(|i| (i as f32 * 0.07).cos() * 0.3).collect();
        let x = spec_from(samples_x, 8000, &config);
        let y = spec_from(samples_y, 8000, &config);
        let av_cost = 0.7;

        let path = coarse_search(&x, &y, av_cost, config.nondiagkoef).unwrap();
        let found_cost = path_cost(&path, &x, &y, av_cost, config.nondiagkoef);
        let dijkstra_cost = brute_force_goal_cost(&x, &y, av_cost, config.nondiagkoef);

        assert!(
            (found_cost - dijkstra_cost).abs() < 1e-6,
            "A* cost {found_cost} disagrees with independent Dijkstra/DP cost {dijkstra_cost}"
        );
    }
}
