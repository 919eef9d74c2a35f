// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Relay Chain Simulation Suite - Configuration
//
// Fleet and relay constants. The defaults are the fixed values the relay
// engine was calibrated against; a TOML file may override any subset.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_CAPACITY: usize = 20;
pub const DEFAULT_MAX_RANGE: i32 = 20;
pub const DEFAULT_RESERVE_FRACTION: f64 = 0.2;
pub const DEFAULT_CRITICAL_ENERGY: i32 = 25;
pub const DEFAULT_RECHARGE_RATE: i32 = 5;
pub const DEFAULT_DRAIN_RATE: i32 = 1;
pub const DEFAULT_MARGIN: f64 = 0.05;

// ---------------------------------------------------------------------------
// RelayConfig
// ---------------------------------------------------------------------------

/// Tunable constants for a relay simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RelayConfig {
    /// Number of nodes in the pool (fixed for the run).
    pub capacity: usize,
    /// Maximum distance a single hop may span.
    pub max_range: i32,
    /// Share of the pool that must stay idle as standby.
    pub reserve_fraction: f64,
    /// Engaged nodes below this energy are hot-swapped.
    pub critical_energy: i32,
    /// Energy gained per tick while idle.
    pub recharge_rate: i32,
    /// Energy lost per tick or per relayed message while engaged.
    pub drain_rate: i32,
    /// Coverage, reachability and placement-jitter margin as a fraction of `max_range`.
    pub margin: f64,
    pub initial_energy_min: i32,
    pub initial_energy_max: i32,
    pub max_energy: i32,
    /// Inclusive bounds for site and packet-origin coordinates.
    pub grid_min: i32,
    pub grid_max: i32,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            max_range: DEFAULT_MAX_RANGE,
            reserve_fraction: DEFAULT_RESERVE_FRACTION,
            critical_energy: DEFAULT_CRITICAL_ENERGY,
            recharge_rate: DEFAULT_RECHARGE_RATE,
            drain_rate: DEFAULT_DRAIN_RATE,
            margin: DEFAULT_MARGIN,
            initial_energy_min: 50,
            initial_energy_max: 100,
            max_energy: 100,
            grid_min: 1,
            grid_max: 100,
        }
    }
}

impl RelayConfig {
    /// Parse a (possibly partial) TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::Invalid("capacity must be positive".into()));
        }
        if self.max_range <= 0 {
            return Err(ConfigError::Invalid("max-range must be positive".into()));
        }
        if !(0.0..1.0).contains(&self.reserve_fraction) {
            return Err(ConfigError::Invalid(format!(
                "reserve-fraction {} outside [0, 1)",
                self.reserve_fraction
            )));
        }
        if !(0.0..1.0).contains(&self.margin) {
            return Err(ConfigError::Invalid(format!("margin {} outside [0, 1)", self.margin)));
        }
        if self.drain_rate < 0 || self.recharge_rate < 0 {
            return Err(ConfigError::Invalid("drain and recharge rates must be non-negative".into()));
        }
        if self.initial_energy_min > self.initial_energy_max
            || self.initial_energy_max > self.max_energy
            || self.initial_energy_min < 0
        {
            return Err(ConfigError::Invalid(format!(
                "initial energy range {}..={} incompatible with max-energy {}",
                self.initial_energy_min, self.initial_energy_max, self.max_energy
            )));
        }
        if self.grid_min > self.grid_max {
            return Err(ConfigError::Invalid(format!(
                "grid bounds {}..={} are inverted",
                self.grid_min, self.grid_max
            )));
        }
        Ok(())
    }

    /// Maximum number of simultaneously engaged nodes.
    pub fn engaged_cap(&self) -> usize {
        // Epsilon absorbs binary rounding in e.g. 20 * 0.8.
        ((self.capacity as f64) * (1.0 - self.reserve_fraction) + 1e-9).floor() as usize
    }

    /// Radius inside which an engaged node covers a site or accepts a packet.
    pub fn coverage_radius(&self) -> f64 {
        self.max_range as f64 * (1.0 - self.margin)
    }

    /// Magnitude of the placement perturbation applied per hop.
    pub fn placement_jitter(&self) -> f64 {
        self.max_range as f64 * self.margin
    }
}
