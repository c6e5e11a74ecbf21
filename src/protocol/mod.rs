//! Messages exchanged between cooperating agents.
//!
//! A consensus round is a single request/response exchange: the acting
//! agent broadcasts an [`OpinionRequest`] for its current state and waits
//! for the [`OpinionResponse`] carrying the request number it sent.

pub mod codec;
pub mod messages;

pub use messages::{Message, OpinionRecord, OpinionRequest, OpinionResponse};
