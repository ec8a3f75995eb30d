//! State fingerprints for stuck detection.

use serde::{Deserialize, Serialize};

/// Lightweight fingerprint of one snapshot, compared across iterations to
/// detect no-progress loops. Deliberately coarse: only the signals that
/// change when the loop is actually getting somewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDigest {
    pub location: String,
    pub empty_required: usize,
    pub filled: usize,
    pub target_enabled: bool,
}

/// Bounded history of digests, most recent last; oldest evicted.
#[derive(Debug, Clone)]
pub struct DigestHistory {
    entries: Vec<StateDigest>,
    capacity: usize,
}

impl DigestHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, digest: StateDigest) {
        if self.entries.len() == self.capacity {
            self.entries.remove(0);
        }
        self.entries.push(digest);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn last(&self) -> Option<&StateDigest> {
        self.entries.last()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when the most recent `k` digests exist and are all identical.
    pub fn last_n_identical(&self, k: usize) -> bool {
        if k == 0 || self.entries.len() < k {
            return false;
        }
        let tail = &self.entries[self.entries.len() - k..];
        tail.windows(2).all(|pair| pair[0] == pair[1])
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest(filled: usize) -> StateDigest {
        StateDigest {
            location: "https://app.test".into(),
            empty_required: 2,
            filled,
            target_enabled: false,
        }
    }

    #[test]
    fn three_identical_detected() {
        let mut history = DigestHistory::new(8);
        history.push(digest(0));
        history.push(digest(0));
        assert!(!history.last_n_identical(3));
        history.push(digest(0));
        assert!(history.last_n_identical(3));
    }

    #[test]
    fn progress_breaks_the_streak() {
        let mut history = DigestHistory::new(8);
        history.push(digest(0));
        history.push(digest(0));
        history.push(digest(1));
        assert!(!history.last_n_identical(3));
    }

    #[test]
    fn capacity_evicts_oldest() {
        let mut history = DigestHistory::new(2);
        history.push(digest(0));
        history.push(digest(1));
        history.push(digest(2));
        assert_eq!(history.len(), 2);
        // Oldest entry gone; the remaining two differ.
        assert!(!history.last_n_identical(2));
        history.push(digest(2));
        assert!(history.last_n_identical(2));
    }
}
