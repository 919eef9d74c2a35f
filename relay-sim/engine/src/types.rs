// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Relay Chain Simulation Suite - Type Definitions

use std::fmt;

use serde::{Deserialize, Serialize};

// ─── Point ───────────────────────────────────────────────────────────────────

/// Integer grid coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The point with its axes swapped.
    pub const fn transposed(self) -> Self {
        Self { x: self.y, y: self.x }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Fixed location of the base station; every chain ultimately leads here.
pub const BASE_STATION: Point = Point::new(0, 0);

// ─── Identifiers ─────────────────────────────────────────────────────────────

/// Stable pool index of a relay node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Sequential identifier of a registered site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteId(pub u32);

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── RelayNode ───────────────────────────────────────────────────────────────

/// One pool-owned relay node.
///
/// `prev` points toward the base station and `next` toward the site, both
/// within one site's chain. A head whose chain branches off another relay
/// holds that relay's node in `uplink`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayNode {
    pub id: NodeId,
    pub energy: i32,
    pub position: Point,
    pub site: Option<SiteId>,
    pub engaged: bool,
    pub is_head: bool,
    pub prev: Option<NodeId>,
    pub next: Option<NodeId>,
    #[serde(default)]
    pub uplink: Option<NodeId>,
}

impl RelayNode {
    /// An idle, unassigned node at the base station.
    pub fn idle(id: NodeId, energy: i32) -> Self {
        Self {
            id,
            energy,
            position: BASE_STATION,
            site: None,
            engaged: false,
            is_head: false,
            prev: None,
            next: None,
            uplink: None,
        }
    }

    /// Return every mutable field to its idle default, keeping `id` and `energy`.
    pub fn reset(&mut self) {
        *self = Self::idle(self.id, self.energy);
    }
}

// ─── Site ────────────────────────────────────────────────────────────────────

/// A registered event site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub id: SiteId,
    pub position: Point,
}

// ─── Operation results ───────────────────────────────────────────────────────

/// Successful result of relay construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BuildOutcome {
    /// An engaged node already lies inside the coverage radius.
    Covered { anchor: NodeId },
    /// New nodes were engaged, listed head first.
    Established { nodes: Vec<NodeId> },
}

impl BuildOutcome {
    pub fn engaged_nodes(&self) -> &[NodeId] {
        match self {
            Self::Covered { .. } => &[],
            Self::Established { nodes } => nodes,
        }
    }
}

/// Record of one hot-swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    pub retired: NodeId,
    pub replacement: NodeId,
    pub position: Point,
    /// Tick of the timed loop, or `None` when triggered by message traffic.
    pub tick: Option<u64>,
}

/// Outcome of one lifecycle step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    pub tick: u64,
    pub replacements: Vec<Replacement>,
    /// Nodes left below the critical threshold with no replacement available.
    pub unprotected: Vec<NodeId>,
}

/// A message carried to the base station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delivery {
    pub origin: Point,
    /// Nodes that relayed the message, origin side first.
    pub path: Vec<NodeId>,
    pub replacements: Vec<Replacement>,
    pub unprotected: Vec<NodeId>,
}

// ─── Views ───────────────────────────────────────────────────────────────────

/// One row of the relay table: a site and its chain head to tail.
#[derive(Debug, Clone, Serialize)]
pub struct RelayChain {
    pub site: Site,
    /// Empty when the site is served by another site's relay.
    pub nodes: Vec<RelayNode>,
}

impl RelayChain {
    pub fn covered_by_other(&self) -> bool {
        self.nodes.is_empty()
    }
}

// ─── RelayStats ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelayStats {
    pub current_tick: u64,
    pub engaged_count: usize,
    pub idle_count: usize,
    pub site_count: usize,
    pub relays_failed: u32,
    pub replacement_count: u32,
    pub unprotected_count: u32,
    pub delivered_count: u32,
    pub unreachable_count: u32,
    pub total_hops: u64,
    pub min_engaged_energy: Option<i32>,
    pub mean_idle_energy: f64,
}
