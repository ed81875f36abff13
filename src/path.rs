//! A run-length-encoded monotonic lattice path: the value both the A* pass
//! (C6) and the corridor DP passes (C7) produce and consume, and the sole
//! artifact the external subtitle shifter reads.
//!
//! Internally a path is a singly linked list of runs, newest run first,
//! shared via `Rc` so that cloning a prefix — something every corridor-DP
//! cell and every priority-queue element does — is O(1) rather than O(run
//! count). Extending a shared prefix conses a new node onto the existing
//! tail instead of mutating it.

use crate::error::TimeWarpError;
use crate::point::{Move, Point};
use std::fmt;
use std::rc::Rc;

#[derive(Debug)]
struct Run {
    mv: Move,
    count: u64,
    prev: Option<Rc<Run>>,
}

/// An immutable (in practice — see module docs on sharing), canonical,
/// run-length-encoded monotonic path from an implicit origin.
#[derive(Debug, Clone)]
pub struct Path {
    tail: Option<Rc<Run>>,
    runs: usize,
}

impl Default for Path {
    fn default() -> Self {
        Path {
            tail: None,
            runs: 0,
        }
    }
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of (move, count) runs in the canonical encoding.
    pub fn run_count(&self) -> usize {
        self.runs
    }

    pub fn is_empty(&self) -> bool {
        self.tail.is_none()
    }

    pub fn last_move(&self) -> Option<Move> {
        self.tail.as_ref().map(|r| r.mv)
    }

    /// The (move, count) runs in path order (oldest first). O(run count);
    /// exposed for callers that need to walk every individual move (e.g.
    /// replaying per-move edge costs), unlike `points_on_path`'s compressed
    /// vertical runs.
    pub fn runs(&self) -> Vec<(Move, u64)> {
        self.runs_forward()
    }

    /// Append one move, merging it into the trailing run if the move is the
    /// same as the path's current last move.
    pub fn append(&mut self, mv: Move) {
        if let Some(rc) = &self.tail {
            if rc.mv == mv {
                let node = Run {
                    mv,
                    count: rc.count + 1,
                    prev: rc.prev.clone(),
                };
                self.tail = Some(Rc::new(node));
                return;
            }
        }
        let node = Run {
            mv,
            count: 1,
            prev: self.tail.clone(),
        };
        self.tail = Some(Rc::new(node));
        self.runs += 1;
    }

    /// `self` with one more move appended, leaving `self` untouched. Mirrors
    /// the original `Path.plus`: `path.plus(None)` is a no-op clone.
    pub fn plus(&self, mv: Option<Move>) -> Path {
        let mut p = self.clone();
        if let Some(mv) = mv {
            p.append(mv);
        }
        p
    }

    /// Multiply every run's count by `k` (k >= 1), i.e. re-express the same
    /// trajectory on a k-times finer lattice.
    pub fn scale(&self, k: u64) -> Path {
        assert!(k >= 1);
        let mut out = Path::new();
        for (mv, count) in self.runs_forward() {
            out.push_run(mv, count * k);
        }
        out
    }

    /// Push a whole run at once (count >= 1). Used internally by `scale` and
    /// by the corridor-DP seed path; still merges with the current tail.
    fn push_run(&mut self, mv: Move, count: u64) {
        if count == 0 {
            return;
        }
        if let Some(rc) = &self.tail {
            if rc.mv == mv {
                let node = Run {
                    mv,
                    count: rc.count + count,
                    prev: rc.prev.clone(),
                };
                self.tail = Some(Rc::new(node));
                return;
            }
        }
        let node = Run {
            mv,
            count,
            prev: self.tail.clone(),
        };
        self.tail = Some(Rc::new(node));
        self.runs += 1;
    }

    /// Runs in path order (oldest first). O(run count).
    fn runs_forward(&self) -> Vec<(Move, u64)> {
        let mut rev = Vec::with_capacity(self.runs);
        let mut node = self.tail.clone();
        while let Some(rc) = node {
            rev.push((rc.mv, rc.count));
            node = rc.prev.clone();
        }
        rev.reverse();
        rev
    }

    /// Build a straight boundary path `"-N |M"`: traverse the top edge, then
    /// the right edge. Used to seed the very first corridor-DP pass when no
    /// draft path exists yet.
    pub fn boundary(n: u64, m: u64) -> Path {
        let mut p = Path::new();
        p.push_run(Move::Right, n);
        p.push_run(Move::Up, m);
        p
    }

    /// Every lattice point the path passes through, starting at (0, 0).
    /// Vertical runs are collapsed to their endpoint only: during a vertical
    /// run x is constant, so the subtitle-timestamp mapping is one-to-many
    /// and only the run's endpoints matter to the consumer.
    pub fn points_on_path(&self) -> Vec<Point> {
        let mut out = vec![Point::new(0, 0)];
        let mut cur = Point::new(0, 0);
        for (mv, count) in self.runs_forward() {
            match mv {
                Move::Up => {
                    cur = Point::new(cur.x, cur.y + count as i64);
                    out.push(cur);
                }
                Move::Right | Move::Diag => {
                    for _ in 0..count {
                        cur = cur.apply(mv);
                        out.push(cur);
                    }
                }
            }
        }
        out
    }

    /// The final point of the path, given the implicit origin (0, 0).
    pub fn end_point(&self) -> Point {
        let mut cur = Point::new(0, 0);
        for (mv, count) in self.runs_forward() {
            match mv {
                Move::Up => cur = Point::new(cur.x, cur.y + count as i64),
                Move::Right => cur = Point::new(cur.x + count as i64, cur.y),
                Move::Diag => cur = Point::new(cur.x + count as i64, cur.y + count as i64),
            }
        }
        cur
    }

    /// Lattice points within antidiagonal distance `radius` of the path.
    ///
    /// Reproduces the reference algorithm's half-unit walk along the path
    /// (an axial run advances one unit per step, a diagonal run advances in
    /// half-unit increments) using coordinates doubled to stay in integers:
    /// at an even "doubled x" position the offset ranges symmetrically over
    /// `-radius..=radius`; at an odd one (mid-diagonal) it ranges over
    /// `radius*2` half-integer offsets instead. This asymmetry is what makes
    /// the corridor track a diagonal run at full density rather than only at
    /// its unit endpoints.
    pub fn corridor(&self, radius: i64) -> Vec<Point> {
        assert!(radius >= 0);
        let mut out = Vec::new();
        let mut xd: i64 = 0; // 2*x
        let mut yd: i64 = 0; // 2*y
        for (mv, count) in self.runs_forward() {
            let (dxd, dyd, substeps) = match mv {
                Move::Up => (0, 2, count),
                Move::Right => (2, 0, count),
                Move::Diag => (1, 1, count * 2),
            };
            for _ in 0..substeps {
                xd += dxd;
                yd += dyd;
                if xd % 2 == 0 {
                    for k in -radius..=radius {
                        let id = 2 * k;
                        out.push(Point::new((xd + id) / 2, (yd - id) / 2));
                    }
                } else {
                    for k in -radius..radius {
                        let id = 2 * k + 1;
                        out.push(Point::new((xd + id) / 2, (yd - id) / 2));
                    }
                }
            }
        }
        out
    }

    /// Parse the textual form `"<move><count>( <move><count>)*"`
    /// (`^(-|\||/)\d+( (-|\||/)\d+)*$`): each token glues a single move
    /// character directly to its decimal count, and tokens are
    /// space-separated. Matches `original_source/grid_path.py`'s
    /// `Path.parse` (`string.split()` then `item[0]` as the move and
    /// `item[1:]` as the count) and every call site that builds a path
    /// string (`original_source/spectrum.py`'s `'-{}|{}'.format(...)`).
    pub fn parse(s: &str) -> Result<Path, TimeWarpError> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        if tokens.is_empty() {
            return Err(TimeWarpError::MalformedPath {
                pos: 0,
                reason: "expected at least one <move><count> token".into(),
            });
        }
        let mut path = Path::new();
        for tok in tokens {
            let mut chars = tok.chars();
            let mv_char = chars.next().ok_or_else(|| TimeWarpError::MalformedPath {
                pos: 0,
                reason: "empty token".into(),
            })?;
            let mv = Move::from_char(mv_char).ok_or_else(|| TimeWarpError::MalformedPath {
                pos: 0,
                reason: format!("unknown move {mv_char:?}, expected one of -|/"),
            })?;
            let count_str = chars.as_str();
            if count_str.is_empty() {
                return Err(TimeWarpError::MalformedPath {
                    pos: 0,
                    reason: format!("token {tok:?} is missing a count"),
                });
            }
            let count: u64 = count_str.parse().map_err(|_| TimeWarpError::MalformedPath {
                pos: 0,
                reason: format!("expected a positive integer count, got {count_str:?}"),
            })?;
            if count == 0 {
                return Err(TimeWarpError::MalformedPath {
                    pos: 0,
                    reason: "run counts must be at least 1".into(),
                });
            }
            path.push_run(mv, count);
        }
        Ok(path)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let runs = self.runs_forward();
        for (i, (mv, count)) in runs.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}{}", mv, count)?;
        }
        Ok(())
    }
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        self.runs_forward() == other.runs_forward()
    }
}
impl Eq for Path {}
