// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Relay Chain Simulation Suite - Event Stream
//
// Every state change the display layer cares about is recorded here in
// order and mirrored to the `log` facade.

use std::fmt;

use serde::Serialize;

use crate::error::RelayError;
use crate::types::{NodeId, Point, SiteId};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RelayEvent {
    RelayEstablished {
        site: SiteId,
        position: Point,
        nodes: Vec<NodeId>,
    },
    SiteCovered {
        site: SiteId,
        position: Point,
        anchor: NodeId,
    },
    RelayFailed {
        position: Point,
        reason: String,
    },
    NodeReplaced {
        retired: NodeId,
        replacement: NodeId,
        position: Point,
        tick: Option<u64>,
    },
    UnprotectedNode {
        node: NodeId,
        energy: i32,
        tick: Option<u64>,
    },
    MessageDelivered {
        origin: Point,
        hops: usize,
    },
    MessageUnreachable {
        origin: Point,
        reason: String,
    },
}

impl RelayEvent {
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Self::RelayFailed { .. } | Self::UnprotectedNode { .. } | Self::MessageUnreachable { .. }
        )
    }
}

impl fmt::Display for RelayEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RelayEstablished { site, position, nodes } => write!(
                f,
                "relay established for site {} at {} using {} node(s)",
                site,
                position,
                nodes.len()
            ),
            Self::SiteCovered { site, position, anchor } => {
                write!(f, "site {} at {} covered by node {}", site, position, anchor)
            }
            Self::RelayFailed { position, reason } => {
                write!(f, "failed to establish relay to {}: {}", position, reason)
            }
            Self::NodeReplaced { retired, replacement, position, tick } => {
                write!(f, "node {} replaced by node {} at {}", retired, replacement, position)?;
                if let Some(t) = tick {
                    write!(f, " at time {}", t)?;
                }
                Ok(())
            }
            Self::UnprotectedNode { node, energy, .. } => {
                write!(f, "no node available to replace node {} (energy {}%)", node, energy)
            }
            Self::MessageDelivered { origin, hops } => {
                write!(f, "message from {} delivered to base station in {} hop(s)", origin, hops)
            }
            Self::MessageUnreachable { origin, reason } => {
                write!(f, "message from {} undeliverable: {}", origin, reason)
            }
        }
    }
}

// ─── EventLog ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<RelayEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: RelayEvent) {
        if event.is_warning() {
            log::warn!("{}", event);
        } else {
            log::info!("{}", event);
        }
        self.events.push(event);
    }

    pub(crate) fn relay_failed(&mut self, position: Point, err: &RelayError) {
        self.push(RelayEvent::RelayFailed { position, reason: err.to_string() });
    }

    pub fn events(&self) -> &[RelayEvent] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<RelayEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
