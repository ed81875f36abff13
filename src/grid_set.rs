//! A sparse visited-set over a W x H lattice whose membership clusters along
//! diagonals (as A*'s visited set does): one sorted list of disjoint,
//! non-adjacent integer intervals per antidiagonal.

use crate::point::Point;

/// A set of integers stored as disjoint, non-adjacent closed intervals
/// sorted by left endpoint. `add` and `contains` are O(log K) in the number
/// of intervals.
#[derive(Debug, Default, Clone)]
struct DisjointSegments {
    segments: Vec<(i64, i64)>,
}

impl DisjointSegments {
    fn new() -> Self {
        Self::default()
    }

    fn contains(&self, x: i64) -> bool {
        let idx = self.segments.partition_point(|&(l, _)| l <= x);
        idx > 0 && self.segments[idx - 1].1 >= x
    }

    fn add(&mut self, x: i64) {
        if self.contains(x) {
            return;
        }
        let idx = self.segments.partition_point(|&(l, _)| l <= x);
        let merge_left = idx > 0 && self.segments[idx - 1].1 == x - 1;
        let merge_right = idx < self.segments.len() && self.segments[idx].0 == x + 1;
        match (merge_left, merge_right) {
            (true, true) => {
                let left = self.segments[idx - 1].0;
                let right = self.segments[idx].1;
                self.segments.splice(idx - 1..=idx, [(left, right)]);
            }
            (true, false) => self.segments[idx - 1].1 = x,
            (false, true) => self.segments[idx].0 = x,
            (false, false) => self.segments.insert(idx, (x, x)),
        }
    }
}

/// A set of lattice points in a `width` x `height` rectangle, organized as
/// one `DisjointSegments` per antidiagonal `d = y - x + width`.
pub struct GridSet {
    width: i64,
    diagonals: Vec<DisjointSegments>,
}

impl GridSet {
    pub fn new(width: i64, height: i64) -> Self {
        let n = (width + height + 1).max(1) as usize;
        GridSet {
            width,
            diagonals: (0..n).map(|_| DisjointSegments::new()).collect(),
        }
    }

    fn diag_index(&self, p: Point) -> Option<usize> {
        let d = p.y - p.x + self.width;
        if d < 0 {
            None
        } else {
            usize::try_from(d).ok()
        }
    }

    pub fn add(&mut self, p: Point) {
        if let Some(d) = self.diag_index(p) {
            if let Some(seg) = self.diagonals.get_mut(d) {
                seg.add(p.x);
            }
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        self.diag_index(p)
            .and_then(|d| self.diagonals.get(d))
            .is_some_and(|seg| seg.contains(p.x))
    }
}
