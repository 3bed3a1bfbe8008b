use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigError;

const MAX_TICK_RATE_HZ: u32 = 1_000;
/// One hour.
const MAX_COLLISION_DELAY_MS: u64 = 3_600_000;

/// Tunable constants of the model. The device population and layout are
/// fixed and deliberately absent here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Phase progress added per tick; 0.02 gives 50 ticks per phase.
    /// Steps that do not divide 1.0 are rounded up to a whole tick count,
    /// so 0.03 runs 34 ticks per phase and progress moves by 1/34.
    pub progress_step: f64,
    /// Chance that a started transmission gets a deferred collision.
    pub collision_probability: f64,
    pub collision_delay_ms: u64,
    pub tick_rate_hz: u32,
    /// Retention of the event log sink.
    pub log_capacity: usize,
    /// RNG seed. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            progress_step: 0.02,
            collision_probability: 0.3,
            collision_delay_ms: 1000,
            tick_rate_hz: 30,
            log_capacity: 50,
            seed: None,
        }
    }
}

impl SimConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(raw)?;
        cfg.validate()
    }

    pub fn from_value(data: Value) -> Result<Self, ConfigError> {
        if data.is_null() {
            return Ok(Self::default());
        }
        let cfg: Self = serde_json::from_value(data)?;
        cfg.validate()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_collision_probability(mut self, p: f64) -> Self {
        self.collision_probability = p;
        self
    }

    pub fn validate(self) -> Result<Self, ConfigError> {
        if !(self.progress_step > 0.0 && self.progress_step <= 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "progress_step",
                value: self.progress_step,
            });
        }
        if !(0.0..=1.0).contains(&self.collision_probability) {
            return Err(ConfigError::OutOfRange {
                field: "collision_probability",
                value: self.collision_probability,
            });
        }
        if self.tick_rate_hz == 0 {
            return Err(ConfigError::OutOfRange {
                field: "tick_rate_hz",
                value: 0.0,
            });
        }
        if self.tick_rate_hz > MAX_TICK_RATE_HZ {
            return Err(ConfigError::OutOfRange {
                field: "tick_rate_hz",
                value: f64::from(self.tick_rate_hz),
            });
        }
        if self.collision_delay_ms > MAX_COLLISION_DELAY_MS {
            return Err(ConfigError::OutOfRange {
                field: "collision_delay_ms",
                value: self.collision_delay_ms as f64,
            });
        }
        if self.log_capacity == 0 {
            return Err(ConfigError::OutOfRange {
                field: "log_capacity",
                value: 0.0,
            });
        }
        Ok(self)
    }

    /// Ticks needed for progress to reach 1.0. The small tolerance keeps
    /// steps like 0.02 at exactly 50 despite binary rounding.
    pub fn ticks_per_phase(&self) -> u32 {
        ((1.0 / self.progress_step) - 1e-6).ceil().max(1.0) as u32
    }

    pub fn collision_delay_ticks(&self) -> u64 {
        self.collision_delay_ms
            .saturating_mul(u64::from(self.tick_rate_hz))
            .saturating_add(500)
            / 1000
    }
}
