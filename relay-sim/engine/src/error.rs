// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Relay Chain Simulation Suite - Errors

use crate::types::NodeId;

/// Failures of relay construction, replacement and routing.
///
/// None of these abort the simulation; the caller decides whether to retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    #[error("no idle node available")]
    CapacityExhausted,
    #[error("relay needs {needed} more node(s) but only {available} fit inside the standby reserve")]
    ReserveViolation { needed: usize, available: usize },
    #[error("nearest relay is {distance} units away")]
    Unreachable { distance: i32 },
    #[error("no relay is active")]
    NoActiveRelay,
    #[error("coordinate ({x}, {y}) is outside the grid")]
    InvalidCoordinate { x: i32, y: i32 },
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),
    #[error("node {0} is not engaged")]
    NotEngaged(NodeId),
}

/// Errors from loading a [`crate::config::RelayConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
