//! Confidence-weighted consensus over peer and local opinions
//!
//! Every opinion is a weighted vote: for each action the merged estimate is
//!
//! ```text
//! q = Σ c_i·q_i / Σ c_i      (0 when Σ c_i = 0)
//! ```
//!
//! taken over all peers that reported the action plus the local agent.
//! This is a weighted mean, not a majority vote, so one very confident
//! peer can dominate the result.
//!
//! Records are merged by action id alone. A round only ever concerns the
//! requester's current state, and action ids are unique per problem, so the
//! action id identifies the state-action pair.

use std::collections::HashMap;

use crate::{identifiers::ActionId, protocol::OpinionRecord};

/// Running confidence-weighted sum for one action.
#[derive(Debug, Clone, Copy)]
struct Accumulator {
    record: OpinionRecord,
    weighted_sum: f64,
    confidence: f64,
}

impl Accumulator {
    fn seed(record: &OpinionRecord) -> Self {
        Self {
            record: *record,
            weighted_sum: record.confidence * record.q_value,
            confidence: record.confidence,
        }
    }

    fn add(&mut self, record: &OpinionRecord) {
        self.weighted_sum += record.confidence * record.q_value;
        self.confidence += record.confidence;
    }

    fn normalize(self) -> OpinionRecord {
        let q_value = if self.confidence != 0.0 {
            self.weighted_sum / self.confidence
        } else {
            0.0
        };
        OpinionRecord {
            q_value,
            confidence: self.confidence,
            ..self.record
        }
    }
}

/// Merge peer opinions with the local agent's own opinions.
///
/// Returns one record per distinct action, in first-seen order (peer
/// records first, then local ones). Each record carries the weighted mean
/// Q-value and the summed confidence of all contributors.
pub fn aggregate(peers: &[OpinionRecord], local: &[OpinionRecord]) -> Vec<OpinionRecord> {
    let mut order: Vec<Accumulator> = Vec::new();
    let mut by_action: HashMap<ActionId, usize> = HashMap::new();

    for record in peers.iter().chain(local) {
        match by_action.get(&record.action) {
            Some(&index) => order[index].add(record),
            None => {
                by_action.insert(record.action, order.len());
                order.push(Accumulator::seed(record));
            }
        }
    }

    order.into_iter().map(Accumulator::normalize).collect()
}
