//! Messenger port - request/response transport between agents
//!
//! The learning engine never talks to sockets or channels directly. It
//! registers a rendezvous slot for a request number, sends the request, and
//! then blocks (with a deadline) until the correlated response arrives.
//!
//! # Serialized servicing
//!
//! Peers ask this agent for its opinions too. Those requests must be
//! answered from the same thread that runs the learning loop, because the
//! Q-store is not synchronized. Implementations therefore answer incoming
//! requests through the [`RequestHandler`] passed to
//! [`Messenger::await_response`] while they wait, and through the handler
//! passed to [`Messenger::shutdown`] when the agent stops.

use std::time::Duration;

use crate::{
    Result,
    protocol::{OpinionRequest, OpinionResponse},
};

/// Passive side of the protocol: answer a peer's question.
pub trait RequestHandler {
    /// Build the response to `request`. Must not mutate learning state.
    fn on_request(&self, request: &OpinionRequest) -> OpinionResponse;
}

/// Transport used by the multi-agent round loop.
pub trait Messenger: Send {
    /// Reserve the rendezvous slot for `request_number`.
    ///
    /// Called before [`Messenger::send`] so that a response racing the
    /// return from `send` still finds its slot.
    fn register(&mut self, request_number: u32);

    /// Dispatch a request to the peers.
    fn send(&mut self, request: &OpinionRequest) -> Result<()>;

    /// Block until the response for `request_number` arrives or `timeout`
    /// elapses, answering peer requests through `handler` meanwhile.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ResponseTimeout`] when the deadline passes.
    fn await_response(
        &mut self,
        request_number: u32,
        timeout: Duration,
        handler: &dyn RequestHandler,
    ) -> Result<OpinionResponse>;

    /// Leave the exchange, answering requests that are already queued.
    fn shutdown(&mut self, _handler: &dyn RequestHandler) -> Result<()> {
        Ok(())
    }
}
