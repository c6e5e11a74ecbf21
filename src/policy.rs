//! Boltzmann (softmax) action selection
//!
//! An action with value `v_i` is drawn with probability
//! `exp(v_i / T) / Σ_j exp(v_j / T)`. High temperatures flatten the
//! distribution towards uniform exploration, low temperatures concentrate
//! it on the best-looking action.
//!
//! The selector holds no state between calls; randomness comes from the
//! caller's generator, which should be seeded once per agent and reused.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoltzmannPolicy {
    temperature: f64,
}

impl BoltzmannPolicy {
    /// Create a selector with temperature `T > 0`.
    pub fn new(temperature: f64) -> Result<Self> {
        if !temperature.is_finite() || temperature <= 0.0 {
            return Err(Error::InvalidTemperature { value: temperature });
        }
        Ok(Self { temperature })
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Selection probabilities for `values`.
    ///
    /// Exponents are shifted by the maximum value before exponentiation,
    /// which leaves the ratios unchanged and keeps every weight in (0, 1].
    pub fn probabilities(&self, values: &[f64]) -> Vec<f64> {
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let weights: Vec<f64> = values
            .iter()
            .map(|&v| ((v - max) / self.temperature).exp())
            .collect();
        let total: f64 = weights.iter().sum();
        weights.into_iter().map(|w| w / total).collect()
    }

    /// Index chosen for a uniform draw `ticket` in [0, 1).
    ///
    /// Returns the smallest `k` whose cumulative probability is strictly
    /// greater than the ticket, so zero-probability entries are never
    /// picked. Rounding that lets the walk overrun clamps to the last index.
    pub fn select_with_ticket(&self, values: &[f64], ticket: f64) -> Result<usize> {
        match values.len() {
            0 => return Err(Error::EmptyValues),
            1 => return Ok(0),
            _ => {}
        }
        let mut cumulative = 0.0;
        for (index, probability) in self.probabilities(values).into_iter().enumerate() {
            cumulative += probability;
            if ticket < cumulative {
                return Ok(index);
            }
        }
        Ok(values.len() - 1)
    }

    /// Draw an index from the softmax distribution over `values`.
    pub fn select<R: Rng + ?Sized>(&self, values: &[f64], rng: &mut R) -> Result<usize> {
        if values.len() == 1 {
            return Ok(0);
        }
        let ticket: f64 = rng.random();
        self.select_with_ticket(values, ticket)
    }
}
