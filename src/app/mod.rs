//! Application configuration.
//!
//! [`AgentConfig`] collects everything the learning engine needs to know
//! before a run: the operation and learning modes, the Q-learning
//! parameters, and the files it reads and writes. The command-line layer
//! fills it in; library users can build it directly.
//!
//! ```
//! use marl::app::{AgentConfig, LearningMode};
//!
//! let config = AgentConfig::new(1)
//!     .with_learning_mode(LearningMode::Exploit)
//!     .with_policy_input("policy.txt");
//! config.validate()?;
//! # Ok::<(), marl::Error>(())
//! ```

pub mod config;

pub use config::{AgentConfig, LearningMode, OperationMode};
