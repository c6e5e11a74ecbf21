//! Tabular Q-learning agents for discrete decision problems
//!
//! This crate provides:
//! - A problem model of states, actions and rewarded transitions
//! - A Q-store with a line-oriented text file format
//! - Boltzmann (softmax) action selection
//! - Confidence-weighted consensus over peer opinions
//! - A learning engine that runs alone, follows a saved table, or learns
//!   cooperatively with peers through a messenger
//! - An in-process messenger for running cooperating agents on threads

pub mod adapters;
pub mod app;
pub mod cli;
pub mod consensus;
pub mod engine;
pub mod error;
pub mod identifiers;
pub mod mdp;
pub mod policy;
pub mod ports;
pub mod protocol;
pub mod q_learning;

pub use app::{AgentConfig, LearningMode, OperationMode};
pub use engine::{Agent, RunSummary};
pub use error::{Error, Result};
pub use identifiers::{ActionId, AgentId, StateId};
pub use mdp::Mdp;
