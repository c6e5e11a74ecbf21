//! Tabular Q-learning storage
//!
//! The Q-store keeps exactly one (value, confidence) entry per
//! state-action pair of the problem. Values follow the off-policy
//! temporal-difference rule
//!
//! ```text
//! Q(s,a) ← (1 - α)·Q(s,a) + α·(r + γ·max_a' Q(s',a'))
//! ```
//!
//! while confidence grows by a fixed step each time the pair is updated,
//! so that peers can weigh the estimate by how much evidence backs it.
//!
//! ## Usage Example
//!
//! ```
//! use marl::{
//!     identifiers::{ActionId, StateId},
//!     mdp::MdpBuilder,
//!     q_learning::{LearningParameters, QStore, q_learning_target},
//! };
//!
//! let mdp = MdpBuilder::new()
//!     .state(0)
//!     .state(1)
//!     .action(0, 0)
//!     .transition(0, 1, 0.5)
//!     .build()?;
//! let mut store = QStore::from_mdp(&mdp);
//! let params = LearningParameters::new(0.5, 0.9);
//! let value = q_learning_target(0.0, 0.5, store.max_q(&mdp, StateId::new(1)), params);
//! store.update(StateId::new(0), ActionId::new(0), value, 0.01)?;
//! assert_eq!(store.lookup(&mdp, StateId::new(0), ActionId::new(0)), 0.25);
//! # Ok::<(), marl::Error>(())
//! ```

pub mod q_table;
pub mod serialization;
pub mod visits;

pub use q_table::{LearningParameters, QEntry, QStore, q_learning_target};
pub use serialization::{TABLE_HEADER, TABLE_PRECISION};
pub use visits::VisitCounter;
