//! Configuration types for agent creation.

use std::{fmt, path::PathBuf, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{Error, Result, identifiers::AgentId};

/// Whether the agent learns alone or consults peers before every action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationMode {
    #[default]
    Single,
    Multi,
}

impl FromStr for OperationMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "multi" => Ok(Self::Multi),
            other => Err(Error::ParseMode {
                kind: "operation mode".to_string(),
                input: other.to_string(),
                expected: "single, multi".to_string(),
            }),
        }
    }
}

impl fmt::Display for OperationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => write!(f, "single"),
            Self::Multi => write!(f, "multi"),
        }
    }
}

/// Whether the agent improves its table or only follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningMode {
    #[default]
    Learn,
    Exploit,
}

impl FromStr for LearningMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "learn" => Ok(Self::Learn),
            "exploit" => Ok(Self::Exploit),
            other => Err(Error::ParseMode {
                kind: "learning mode".to_string(),
                input: other.to_string(),
                expected: "learn, exploit".to_string(),
            }),
        }
    }
}

impl fmt::Display for LearningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Learn => write!(f, "learn"),
            Self::Exploit => write!(f, "exploit"),
        }
    }
}

/// Configuration for creating a learning agent.
///
/// # Examples
///
/// ```
/// use marl::app::{AgentConfig, OperationMode};
///
/// let config = AgentConfig::new(4)
///     .with_operation_mode(OperationMode::Multi)
///     .with_learning_rate(0.5)
///     .with_discount_factor(0.9)
///     .with_temperature(1.0)
///     .with_episodes(100)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Unique among cooperating agents
    pub agent_id: AgentId,
    pub operation_mode: OperationMode,
    pub learning_mode: LearningMode,
    /// α in [0, 1]
    pub learning_rate: f64,
    /// γ in [0, 1]
    pub discount_factor: f64,
    /// τ > 0
    pub temperature: f64,
    /// Episodes (goal events) after which the run stops
    pub episodes: u64,
    /// Index into the problem's state list; `None` starts at a random state
    pub start: Option<usize>,
    /// Table to warm-start from (learn) or to follow (exploit)
    pub policy_input: Option<PathBuf>,
    /// Where the learned table is written
    pub policy_output: Option<PathBuf>,
    /// Episode statistics file
    pub stats_path: Option<PathBuf>,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
    /// Stop after this many actions in total, whatever the episode count
    pub max_steps: Option<u64>,
    /// Bound on the wait for a peer response
    pub response_timeout: Duration,
}

impl AgentConfig {
    pub const DEFAULT_LEARNING_RATE: f64 = 0.01;
    pub const DEFAULT_DISCOUNT_FACTOR: f64 = 0.5;
    pub const DEFAULT_TEMPERATURE: f64 = 50.0;
    pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(agent_id: AgentId) -> Self {
        Self {
            agent_id,
            operation_mode: OperationMode::default(),
            learning_mode: LearningMode::default(),
            learning_rate: Self::DEFAULT_LEARNING_RATE,
            discount_factor: Self::DEFAULT_DISCOUNT_FACTOR,
            temperature: Self::DEFAULT_TEMPERATURE,
            episodes: 1,
            start: None,
            policy_input: None,
            policy_output: None,
            stats_path: None,
            seed: None,
            max_steps: None,
            response_timeout: Self::DEFAULT_RESPONSE_TIMEOUT,
        }
    }

    pub fn with_operation_mode(mut self, mode: OperationMode) -> Self {
        self.operation_mode = mode;
        self
    }

    pub fn with_learning_mode(mut self, mode: LearningMode) -> Self {
        self.learning_mode = mode;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_discount_factor(mut self, discount_factor: f64) -> Self {
        self.discount_factor = discount_factor;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_episodes(mut self, episodes: u64) -> Self {
        self.episodes = episodes;
        self
    }

    pub fn with_start(mut self, index: usize) -> Self {
        self.start = Some(index);
        self
    }

    pub fn with_policy_input(mut self, path: impl Into<PathBuf>) -> Self {
        self.policy_input = Some(path.into());
        self
    }

    pub fn with_policy_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.policy_output = Some(path.into());
        self
    }

    pub fn with_stats_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.stats_path = Some(path.into());
        self
    }

    /// Set the random seed for deterministic behavior.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Check parameter ranges and mode combinations.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| -> Result<()> {
            Err(Error::InvalidConfiguration { message })
        };

        if !(0.0..=1.0).contains(&self.learning_rate) {
            return invalid(format!(
                "learning rate {} must be between 0 and 1",
                self.learning_rate
            ));
        }
        if !(0.0..=1.0).contains(&self.discount_factor) {
            return invalid(format!(
                "discount factor {} must be between 0 and 1",
                self.discount_factor
            ));
        }
        if !self.temperature.is_finite() || self.temperature <= 0.0 {
            return Err(Error::InvalidTemperature {
                value: self.temperature,
            });
        }
        if self.episodes == 0 {
            return invalid("episode count must be positive".to_string());
        }
        if self.operation_mode == OperationMode::Multi
            && self.learning_mode == LearningMode::Exploit
        {
            return invalid("exploit mode is not allowed in multi-agent operation".to_string());
        }
        if self.learning_mode == LearningMode::Exploit && self.policy_input.is_none() {
            return invalid("exploit mode requires an input policy".to_string());
        }
        Ok(())
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::new(0)
    }
}
