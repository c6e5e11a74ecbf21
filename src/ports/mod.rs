//! Ports (trait boundaries) for external collaborators.
//!
//! The engine owns these traits; transports and statistics sinks implement
//! them in the adapters and engine layers.

pub mod messenger;
pub mod observer;

pub use messenger::{Messenger, RequestHandler};
pub use observer::Observer;
