//! Tunables for the taxi simulation and the host-side tracking loop.
//!
//! Defaults reproduce the live tracking screen: a 30 second animation split
//! into 100 ticks (one every 300 ms) with a snapshot flushed every 10 ticks.

use serde::{Deserialize, Serialize};

use crate::error::{PmrError, Result};

/// Ticks needed to go from 0 % to 100 %.
pub const DEFAULT_TOTAL_TICKS: u32 = 100;

/// Wall-clock length of a full ride animation.
pub const DEFAULT_ANIMATION_DURATION_MS: u64 = 30_000;

/// Snapshot flush cadence in ticks.
pub const DEFAULT_PERSIST_EVERY_TICKS: u32 = 10;

/// ETA used when a taxi leg has no planned duration.
pub const DEFAULT_LEG_ETA_MINUTES: f64 = 25.0;

/// Planned distance used when a taxi leg has none.
pub const DEFAULT_LEG_DISTANCE_KM: f64 = 7.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    pub total_ticks: u32,
    pub animation_duration_ms: u64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            total_ticks: DEFAULT_TOTAL_TICKS,
            animation_duration_ms: DEFAULT_ANIMATION_DURATION_MS,
        }
    }
}

impl SimulationParams {
    pub fn with_total_ticks(mut self, total_ticks: u32) -> Self {
        self.total_ticks = total_ticks;
        self
    }

    pub fn with_animation_duration_ms(mut self, animation_duration_ms: u64) -> Self {
        self.animation_duration_ms = animation_duration_ms;
        self
    }

    /// Host timer period; never below 1 ms.
    pub fn tick_interval_ms(&self) -> u64 {
        (self.animation_duration_ms / u64::from(self.total_ticks.max(1))).max(1)
    }

    pub fn validate(&self) -> Result<()> {
        if self.total_ticks == 0 {
            return Err(PmrError::invalid_argument(
                "total_ticks must be a positive integer",
            ));
        }
        Ok(())
    }
}

/// Everything a tracking host needs; loadable from a JSON file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    pub simulation: SimulationParams,
    pub persist_every_ticks: u32,
    pub default_eta_minutes: f64,
    pub default_distance_km: f64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationParams::default(),
            persist_every_ticks: DEFAULT_PERSIST_EVERY_TICKS,
            default_eta_minutes: DEFAULT_LEG_ETA_MINUTES,
            default_distance_km: DEFAULT_LEG_DISTANCE_KM,
        }
    }
}

impl TrackingConfig {
    pub fn with_simulation(mut self, simulation: SimulationParams) -> Self {
        self.simulation = simulation;
        self
    }

    pub fn with_persist_every_ticks(mut self, persist_every_ticks: u32) -> Self {
        self.persist_every_ticks = persist_every_ticks;
        self
    }

    pub fn with_default_eta_minutes(mut self, minutes: f64) -> Self {
        self.default_eta_minutes = minutes;
        self
    }

    /// Parse and validate a JSON document; missing keys take defaults.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw).map_err(|error| {
            PmrError::invalid_argument(format!("invalid tracking config: {error}"))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.simulation.validate()?;
        if self.persist_every_ticks == 0 {
            return Err(PmrError::invalid_argument(
                "persist_every_ticks must be a positive integer",
            ));
        }
        if !(self.default_eta_minutes.is_finite() && self.default_eta_minutes > 0.0) {
            return Err(PmrError::invalid_argument(
                "default_eta_minutes must be a positive number",
            ));
        }
        if !(self.default_distance_km.is_finite() && self.default_distance_km >= 0.0) {
            return Err(PmrError::invalid_argument(
                "default_distance_km must be a non-negative number",
            ));
        }
        Ok(())
    }
}
