//! Q-store: one (value, confidence) entry per state-action pair

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    Error, Result,
    identifiers::{ActionId, StateId},
    mdp::Mdp,
};

/// Learning rate α and discount factor γ of the Q-learning rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LearningParameters {
    pub learning_rate: f64,
    pub discount_factor: f64,
}

impl LearningParameters {
    pub fn new(learning_rate: f64, discount_factor: f64) -> Self {
        Self {
            learning_rate,
            discount_factor,
        }
    }
}

/// Q-learning update: off-policy TD control
///
/// Q(s,a) ← (1 - α)·Q(s,a) + α·(r + γ·max_q)
pub fn q_learning_target(value: f64, reward: f64, max_q: f64, params: LearningParameters) -> f64 {
    let alpha = params.learning_rate;
    (1.0 - alpha) * value + alpha * (reward + params.discount_factor * max_q)
}

/// A single row of the Q-table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QEntry {
    pub state: StateId,
    pub action: ActionId,
    /// Expected discounted return.
    pub value: f64,
    /// Evidence weight, never decreases while the entry is revisited.
    pub confidence: f64,
}

impl QEntry {
    pub fn new(state: StateId, action: ActionId, value: f64, confidence: f64) -> Self {
        Self {
            state,
            action,
            value,
            confidence,
        }
    }
}

/// Q-table keyed by (state, action), holding at most one entry per pair.
///
/// Entries keep their insertion order so that saved tables list states and
/// actions in the order of the problem description.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QStore {
    entries: Vec<QEntry>,
    index: HashMap<(StateId, ActionId), usize>,
}

impl QStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// One zero-valued, zero-confidence entry per action of the problem.
    pub fn from_mdp(mdp: &Mdp) -> Self {
        let mut store = Self::new();
        for action in mdp.actions() {
            store.insert(QEntry::new(action.from(), action.id(), 0.0, 0.0));
        }
        store
    }

    /// Build from raw entries; a repeated pair keeps its first occurrence.
    pub fn from_entries(entries: impl IntoIterator<Item = QEntry>) -> Self {
        let mut store = Self::new();
        for entry in entries {
            if !store.insert(entry) {
                warn!(
                    state = %entry.state,
                    action = %entry.action,
                    "duplicate q-table entry ignored"
                );
            }
        }
        store
    }

    fn insert(&mut self, entry: QEntry) -> bool {
        let key = (entry.state, entry.action);
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key, self.entries.len());
        self.entries.push(entry);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[QEntry] {
        &self.entries
    }

    /// Unguarded access by id pair.
    pub fn get(&self, state: StateId, action: ActionId) -> Option<&QEntry> {
        self.index
            .get(&(state, action))
            .map(|&index| &self.entries[index])
    }

    /// Entries whose state matches `state`.
    pub fn entries_for_state(&self, state: StateId) -> impl Iterator<Item = &QEntry> {
        self.entries.iter().filter(move |entry| entry.state == state)
    }

    /// Guarded entry lookup.
    ///
    /// Unknown states or actions, actions that do not originate from the
    /// given state, and pairs missing from the table are logged and yield
    /// `None`.
    fn guarded(&self, mdp: &Mdp, state: StateId, action: ActionId) -> Option<&QEntry> {
        let Some(state_ref) = mdp.state(state) else {
            warn!(state = %state, "lookup for unknown state");
            return None;
        };
        let Some(action_ref) = mdp.action(action) else {
            warn!(action = %action, "lookup for unknown action");
            return None;
        };
        if action_ref.from() != state_ref.id() {
            warn!(
                state = %state,
                action = %action,
                origin = %action_ref.from(),
                "action is not available from state"
            );
            return None;
        }
        let entry = self.get(state, action);
        if entry.is_none() {
            warn!(state = %state, action = %action, "no q-table entry");
        }
        entry
    }

    /// Q-value of a pair, `0.0` when the lookup is not valid.
    pub fn lookup(&self, mdp: &Mdp, state: StateId, action: ActionId) -> f64 {
        self.guarded(mdp, state, action)
            .map_or(0.0, |entry| entry.value)
    }

    /// Confidence of a pair, `0.0` when the lookup is not valid.
    pub fn confidence(&self, mdp: &Mdp, state: StateId, action: ActionId) -> f64 {
        self.guarded(mdp, state, action)
            .map_or(0.0, |entry| entry.confidence)
    }

    /// Overwrite the value of a pair and add to its confidence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingQEntry`] when the table has no such pair,
    /// which means it is incomplete relative to the problem.
    pub fn update(
        &mut self,
        state: StateId,
        action: ActionId,
        value: f64,
        confidence_increment: f64,
    ) -> Result<()> {
        let index = *self
            .index
            .get(&(state, action))
            .ok_or(Error::MissingQEntry { state, action })?;
        let entry = &mut self.entries[index];
        entry.value = value;
        entry.confidence += confidence_increment;
        Ok(())
    }

    /// Overwrite the value of every entry for `action`, whatever its state.
    ///
    /// Returns the number of entries changed.
    pub fn set_action_value(&mut self, action: ActionId, value: f64) -> usize {
        let mut changed = 0;
        for entry in self.entries.iter_mut().filter(|e| e.action == action) {
            entry.value = value;
            changed += 1;
        }
        changed
    }

    /// Largest Q-value among the actions available from `state`.
    ///
    /// The maximum starts at zero, so negative estimates are floored and a
    /// state without actions contributes nothing.
    pub fn max_q(&self, mdp: &Mdp, state: StateId) -> f64 {
        let Some(state_ref) = mdp.state(state) else {
            warn!(state = %state, "max_q for unknown state");
            return 0.0;
        };
        state_ref
            .actions()
            .iter()
            .map(|&action| self.lookup(mdp, state, action))
            .fold(0.0, f64::max)
    }

    /// Action with the highest Q-value from `state`; ties go to the first
    /// declared action.
    pub fn greedy_action(&self, mdp: &Mdp, state: StateId) -> Option<ActionId> {
        let state_ref = mdp.state(state)?;
        let mut best: Option<(ActionId, f64)> = None;
        for &action in state_ref.actions() {
            let value = self.lookup(mdp, state, action);
            match best {
                Some((_, best_value)) if value <= best_value => {}
                _ => best = Some((action, value)),
            }
        }
        best.map(|(action, _)| action)
    }

    /// Copy value and confidence from `other` for every pair present in
    /// both tables. Returns the number of pairs copied.
    pub fn overlay(&mut self, other: &QStore) -> usize {
        let mut copied = 0;
        for entry in other.entries() {
            if let Some(&index) = self.index.get(&(entry.state, entry.action)) {
                self.entries[index].value = entry.value;
                self.entries[index].confidence = entry.confidence;
                copied += 1;
            }
        }
        copied
    }
}
