//! Shared problems for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use marl::mdp::{Mdp, MdpBuilder};

/// A --a0 (0.5)--> B --a1 (1.0)--> T, where T has no actions.
pub fn two_step_chain() -> Arc<Mdp> {
    Arc::new(
        MdpBuilder::new()
            .state(0)
            .state(1)
            .state(2)
            .action(0, 0)
            .action(1, 1)
            .transition(0, 1, 0.5)
            .transition(1, 2, 1.0)
            .build()
            .expect("chain problem is valid"),
    )
}

/// State 0 offers a slow path (0 -> 1 -> goal) and a direct path to the goal.
pub fn fork() -> Arc<Mdp> {
    Arc::new(
        MdpBuilder::new()
            .state(0)
            .state(1)
            .state(2)
            .action(0, 0)
            .action(1, 0)
            .action(2, 1)
            .transition(0, 1, 0.0)
            .transition(1, 2, 1.0)
            .transition(2, 2, 1.0)
            .build()
            .expect("fork problem is valid"),
    )
}

pub const FORK_JSON: &str = r#"{
  "states": [0, 1, 2],
  "actions": [
    { "id": 0, "from": 0, "transitions": [{ "to": 1, "reward": 0.0 }] },
    { "id": 1, "from": 0, "transitions": [{ "to": 2, "reward": 1.0 }] },
    { "id": 2, "from": 1, "transitions": [{ "to": 2, "reward": 1.0 }] }
  ]
}"#;
