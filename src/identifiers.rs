//! Domain identifier types for states, actions and agents.
//!
//! These wrap the opaque integer identifiers used by problem descriptions,
//! Q-table files and protocol messages so that a state id can never be
//! passed where an action id is expected.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Identifier of a state in the decision problem.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct StateId(u32);

impl StateId {
    /// Create a new state identifier.
    ///
    /// # Examples
    ///
    /// ```
    /// use marl::identifiers::StateId;
    ///
    /// let state = StateId::new(7);
    /// assert_eq!(state.value(), 7);
    /// ```
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Get the raw identifier.
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<u32> for StateId {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl FromStr for StateId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// Identifier of an action. Action ids are unique across a whole problem,
/// not only within their origin state.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct ActionId(u32);

impl ActionId {
    /// Create a new action identifier.
    ///
    /// # Examples
    ///
    /// ```
    /// use marl::identifiers::ActionId;
    ///
    /// let action = ActionId::new(3);
    /// assert_eq!(action.to_string(), "3");
    /// ```
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Get the raw identifier.
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<u32> for ActionId {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl FromStr for ActionId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// Identifier of an agent taking part in a multi-agent run.
pub type AgentId = u32;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_parse_from_table_tokens() {
        assert_eq!("12".parse::<StateId>().unwrap(), StateId::new(12));
        assert_eq!("4".parse::<ActionId>().unwrap(), ActionId::new(4));
        assert!("#".parse::<StateId>().is_err());
        assert!("-1".parse::<ActionId>().is_err());
    }

    #[test]
    fn test_ids_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&(StateId::new(1), ActionId::new(2))).unwrap();
        assert_eq!(json, "[1,2]");
    }
}
