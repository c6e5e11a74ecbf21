//! Subcommands of the `marl` binary.

pub mod inspect;
pub mod run;
