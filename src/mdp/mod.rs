//! Markov decision problem model
//!
//! The learning engine only reads the problem: it walks from a [`State`] to
//! the [`Action`]s available there, and follows an action's first
//! [`Transition`] to the next state while collecting its reward.
//!
//! Problems are assembled with [`MdpBuilder`], which rejects dangling
//! references, or loaded from a JSON description via [`MdpDescription`].

pub mod description;
pub mod model;

pub use description::{ActionDescription, MdpDescription, TransitionDescription};
pub use model::{Action, Mdp, MdpBuilder, State, Transition};
