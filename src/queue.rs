//! A binary-heap priority queue with O(log n) decrease-key, keyed by an
//! arbitrary hashable key. The A* coarse search (C6) uses this with lattice
//! points as keys to implement `push-or-decrease` in a single call.

use crate::path::Path;
use crate::point::Move;
use rustc_hash::FxHashMap;
use std::hash::Hash;

/// One entry in the queue: `key` is how callers address the element,
/// `priority` is the heap order (f + g in A* terms), `cost` is the
/// accumulated g-cost, and `path` is the run-length-encoded path prefix
/// reaching `key`. `heap_pos` mirrors this element's current index in the
/// backing array and is kept in sync on every swap.
#[derive(Debug, Clone)]
pub struct QueueElement<K> {
    pub key: K,
    pub priority: f64,
    pub cost: f64,
    pub path: Path,
    heap_pos: usize,
}

/// A min-priority queue over `priority`, supporting `update` as a combined
/// push-or-decrease-key operation in O(log n) after an O(1) key lookup.
pub struct PriorityQueue<K> {
    heap: Vec<QueueElement<K>>,
    index: FxHashMap<K, usize>,
}

impl<K: Eq + Hash + Clone> Default for PriorityQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone> PriorityQueue<K> {
    pub fn new() -> Self {
        PriorityQueue {
            heap: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Insert `key` at `priority` (with `path ++ move`) if absent; if
    /// present and `priority` is strictly lower than its current priority,
    /// overwrite priority/cost/path and sift up; otherwise a no-op.
    pub fn update(&mut self, key: K, priority: f64, cost: f64, path: &Path, mv: Option<Move>) {
        if let Some(&i) = self.index.get(&key) {
            if priority < self.heap[i].priority {
                self.heap[i].priority = priority;
                self.heap[i].cost = cost;
                self.heap[i].path = path.plus(mv);
                self.sift_up(i);
            }
            return;
        }
        let i = self.heap.len();
        self.heap.push(QueueElement {
            key: key.clone(),
            priority,
            cost,
            path: path.plus(mv),
            heap_pos: i,
        });
        self.index.insert(key, i);
        self.sift_up(i);
    }

    /// Remove and return the element with the smallest priority.
    pub fn pop(&mut self) -> Option<QueueElement<K>> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.heap.swap(0, last);
        let top = self.heap.pop().expect("just checked non-empty");
        self.index.remove(&top.key);
        if !self.heap.is_empty() {
            self.heap[0].heap_pos = 0;
            self.index.insert(self.heap[0].key.clone(), 0);
            self.sift_down(0);
        }
        Some(top)
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.heap[a].heap_pos = a;
        self.heap[b].heap_pos = b;
        self.index.insert(self.heap[a].key.clone(), a);
        self.index.insert(self.heap[b].key.clone(), b);
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.heap[i].priority < self.heap[parent].priority {
                self.swap(i, parent);
                i = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let n = self.heap.len();
        loop {
            let l = 2 * i + 1;
            let r = 2 * i + 2;
            let mut smallest = i;
            if l < n && self.heap[l].priority < self.heap[smallest].priority {
                smallest = l;
            }
            if r < n && self.heap[r].priority < self.heap[smallest].priority {
                smallest = r;
            }
            if smallest == i {
                break;
            }
            self.swap(i, smallest);
            i = smallest;
        }
    }

    /// Debug/test-only: verify the heap-order and bijection invariants hold.
    #[cfg(test)]
    fn check_invariants(&self) {
        for (i, e) in self.heap.iter().enumerate() {
            assert_eq!(e.heap_pos, i, "heap_pos out of sync at index {i}");
            assert_eq!(self.index.get(&e.key), Some(&i), "index map out of sync at {i}");
            let l = 2 * i + 1;
            let r = 2 * i + 2;
            if l < self.heap.len() {
                assert!(e.priority <= self.heap[l].priority, "heap property violated");
            }
            if r < self.heap.len() {
                assert!(e.priority <= self.heap[r].priority, "heap property violated");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn pops_in_sorted_order() {
        let mut q = PriorityQueue::<i32>::new();
        let path = Path::new();
        for (k, p) in [(1, 5.0), (2, 1.0), (3, 3.0), (4, 2.0)] {
            q.update(k, p, p, &path, None);
        }
        let mut out = Vec::new();
        while let Some(e) = q.pop() {
            out.push(e.priority);
        }
        assert_eq!(out, vec![1.0, 2.0, 3.0, 5.0]);
        assert!(q.is_empty());
    }

    #[test]
    fn decrease_key_only_lowers() {
        let mut q = PriorityQueue::<&str>::new();
        let path = Path::new();
        q.update("a", 10.0, 10.0, &path, None);
        q.update("a", 20.0, 20.0, &path, None); // higher priority: no-op
        assert_eq!(q.pop().unwrap().priority, 10.0);

        q.update("b", 10.0, 10.0, &path, None);
        q.update("b", 2.0, 2.0, &path, None); // lower priority: applied
        let e = q.pop().unwrap();
        assert_eq!(e.priority, 2.0);
        assert_eq!(e.cost, 2.0);
    }

    #[test]
    fn stress_random_updates_and_pops() {
        let mut rng = rand::thread_rng();
        let mut q = PriorityQueue::<u32>::new();
        let path = Path::new();
        let mut best: std::collections::HashMap<u32, f64> = std::collections::HashMap::new();

        for _ in 0..10_000 {
            let key: u32 = rng.gen_range(0..500);
            let priority: f64 = rng.gen_range(0.0..1_000_000.0);
            q.update(key, priority, priority, &path, None);
            q.check_invariants();
            let e = best.entry(key).or_insert(f64::INFINITY);
            if priority < *e {
                *e = priority;
            }
            assert!(q.contains(&key));

            if rng.gen_bool(0.3) {
                if let Some(popped) = q.pop() {
                    q.check_invariants();
                    assert!(!q.contains(&popped.key));
                    best.remove(&popped.key);
                }
            }
        }

        let mut last = f64::NEG_INFINITY;
        while let Some(e) = q.pop() {
            assert!(e.priority >= last, "pop order not sorted");
            last = e.priority;
            q.check_invariants();
        }
        assert!(q.is_empty());
    }
}
