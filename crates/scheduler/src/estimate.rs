//! Greedy multi-server load model used for wait-time estimates.
//!
//! Each bucket stands for one busy server. Work is folded in arrival order
//! onto whichever bucket is currently least loaded. The result is an
//! estimate, not a guarantee: it ignores the one-activation-per-tick limit.

/// Projected load per simulated server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadBuckets {
    loads: Vec<u64>,
}

impl LoadBuckets {
    /// Start from the given loads; an empty set becomes a single idle bucket.
    pub fn new(initial: Vec<u64>) -> Self {
        let loads = if initial.is_empty() { vec![0] } else { initial };
        Self { loads }
    }

    fn least_index(&self) -> usize {
        let mut min_index = 0;
        for (index, load) in self.loads.iter().enumerate().skip(1) {
            if *load < self.loads[min_index] {
                min_index = index;
            }
        }
        min_index
    }

    /// Add `time` to the least-loaded bucket (first one wins ties).
    pub fn fold(&mut self, time: u64) {
        let index = self.least_index();
        self.loads[index] = self.loads[index].saturating_add(time);
    }

    pub fn fold_all(&mut self, times: impl IntoIterator<Item = u64>) {
        for time in times {
            self.fold(time);
        }
    }

    /// Load of the bucket that would take the next piece of work.
    pub fn least_loaded(&self) -> u64 {
        self.loads[self.least_index()]
    }

    pub fn loads(&self) -> &[u64] {
        &self.loads
    }
}
