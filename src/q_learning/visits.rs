//! Per-state visit counts advertised as confidence to peers.

use std::collections::HashMap;

use crate::identifiers::StateId;

#[derive(Debug, Clone, Default)]
pub struct VisitCounter {
    counts: HashMap<StateId, u64>,
}

impl VisitCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, state: StateId) {
        *self.counts.entry(state).or_insert(0) += 1;
    }

    pub fn count(&self, state: StateId) -> u64 {
        self.counts.get(&state).copied().unwrap_or(0)
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_accumulate_and_clear() {
        let mut visits = VisitCounter::new();
        visits.record(StateId::new(3));
        visits.record(StateId::new(3));
        assert_eq!(visits.count(StateId::new(3)), 2);
        assert_eq!(visits.count(StateId::new(4)), 0);
        visits.clear();
        assert_eq!(visits.count(StateId::new(3)), 0);
    }
}
