//! Adapters implementing domain ports.
//!
//! This module contains infrastructure implementations of the traits defined
//! in the ports module. Adapters depend on the ports, not the other way
//! around.

pub mod local_hub;

pub use local_hub::{LocalEndpoint, LocalHub};
