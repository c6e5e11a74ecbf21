//! Command-line interface for running and inspecting learning agents.

pub mod commands;
pub mod output;
