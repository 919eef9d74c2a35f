// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Relay Chain Simulation Suite - Node Pool
//
// Fixed-capacity arena of relay nodes. Chain links are pool indices, so a
// link can only ever name a node the pool owns.

use std::cmp::Reverse;
use std::ops::{Index, IndexMut};

use rand::Rng;
use serde::Serialize;

use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::geometry::distance;
use crate::types::{NodeId, Point, RelayNode, SiteId};

// ─── Link faults ─────────────────────────────────────────────────────────────

/// A broken structural invariant found by [`NodePool::verify_links`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LinkFault {
    /// `next` target does not point back via `prev`.
    AsymmetricNext(NodeId),
    /// `prev` target does not point forward via `next`.
    AsymmetricPrev(NodeId),
    /// Link crosses from one site's chain into another.
    CrossSiteLink(NodeId),
    /// Idle node still carries chain state.
    IdleLinked(NodeId),
    /// `is_head` disagrees with the absence of `prev`.
    HeadMismatch(NodeId),
    /// Uplink on a non-head, or pointing at an idle node.
    BadUplink(NodeId),
    /// Following `prev` never reaches a head.
    Unterminated(NodeId),
}

// ─── NodePool ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodePool {
    nodes: Vec<RelayNode>,
}

impl NodePool {
    /// Create `config.capacity` idle nodes with energy drawn uniformly from
    /// the configured initial range.
    pub fn allocate_fleet<R: Rng + ?Sized>(config: &RelayConfig, rng: &mut R) -> Self {
        let nodes = (0..config.capacity)
            .map(|i| {
                let energy = rng.gen_range(config.initial_energy_min..=config.initial_energy_max);
                RelayNode::idle(NodeId(i), energy)
            })
            .collect();
        Self { nodes }
    }

    /// Build a pool from explicit records. Ids are normalized to indices.
    pub fn from_nodes(mut nodes: Vec<RelayNode>) -> Self {
        for (i, node) in nodes.iter_mut().enumerate() {
            node.id = NodeId(i);
        }
        Self { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[RelayNode] {
        &self.nodes
    }

    pub fn get(&self, id: NodeId) -> Option<&RelayNode> {
        self.nodes.get(id.index())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut RelayNode> {
        self.nodes.get_mut(id.index())
    }

    /// Look up a node, failing with [`RelayError::UnknownNode`].
    pub fn node(&self, id: NodeId) -> Result<&RelayNode, RelayError> {
        self.get(id).ok_or(RelayError::UnknownNode(id))
    }

    pub fn engaged_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.engaged).count()
    }

    pub fn idle_count(&self) -> usize {
        self.len() - self.engaged_count()
    }

    /// Idle node with the most energy; ties go to the lowest id.
    pub fn find_strongest_idle(&self) -> Option<NodeId> {
        self.nodes
            .iter()
            .filter(|n| !n.engaged)
            .min_by_key(|n| (Reverse(n.energy), n.id))
            .map(|n| n.id)
    }

    /// Engaged node closest to `point` with its truncated distance; ties go
    /// to the lowest id.
    pub fn find_nearest_engaged(&self, point: Point) -> Option<(NodeId, i32)> {
        self.nodes
            .iter()
            .filter(|n| n.engaged)
            .map(|n| (n.id, distance(n.position, point)))
            .min_by_key(|&(id, d)| (d, id))
    }

    /// Head node of a site's chain, if the site has one.
    pub fn head_of(&self, site: SiteId) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|n| n.engaged && n.is_head && n.site == Some(site))
            .map(|n| n.id)
    }

    /// Walk a chain from `head` along `next` links.
    pub fn chain(&self, head: NodeId) -> ChainIter<'_> {
        ChainIter { pool: self, current: Some(head), remaining: self.len() }
    }

    /// Re-point every uplink aimed at `from` to `to`.
    pub(crate) fn retarget_uplinks(&mut self, from: NodeId, to: NodeId) {
        for node in self.nodes.iter_mut().filter(|n| n.uplink == Some(from)) {
            node.uplink = Some(to);
        }
    }

    /// Check every link invariant, returning all faults found.
    pub fn verify_links(&self) -> Result<(), Vec<LinkFault>> {
        let mut faults = Vec::new();

        for node in &self.nodes {
            if !node.engaged {
                if node.prev.is_some()
                    || node.next.is_some()
                    || node.uplink.is_some()
                    || node.is_head
                    || node.site.is_some()
                {
                    faults.push(LinkFault::IdleLinked(node.id));
                }
                continue;
            }

            if node.is_head != node.prev.is_none() {
                faults.push(LinkFault::HeadMismatch(node.id));
            }

            if let Some(next) = node.next {
                match self.get(next) {
                    Some(n) if n.prev == Some(node.id) => {
                        if n.site != node.site {
                            faults.push(LinkFault::CrossSiteLink(node.id));
                        }
                    }
                    _ => faults.push(LinkFault::AsymmetricNext(node.id)),
                }
            }

            if let Some(prev) = node.prev {
                match self.get(prev) {
                    Some(p) if p.next == Some(node.id) => {}
                    _ => faults.push(LinkFault::AsymmetricPrev(node.id)),
                }
            }

            if let Some(up) = node.uplink {
                let target_engaged = self.get(up).map_or(false, |u| u.engaged);
                if !node.is_head || !target_engaged {
                    faults.push(LinkFault::BadUplink(node.id));
                }
            }

            if !self.reaches_head(node.id) {
                faults.push(LinkFault::Unterminated(node.id));
            }
        }

        if faults.is_empty() {
            Ok(())
        } else {
            Err(faults)
        }
    }

    fn reaches_head(&self, start: NodeId) -> bool {
        let mut current = start;
        for _ in 0..=self.len() {
            match self.get(current) {
                Some(n) if n.is_head => return true,
                Some(n) => match n.prev {
                    Some(p) => current = p,
                    None => return false,
                },
                None => return false,
            }
        }
        false
    }
}

impl Index<NodeId> for NodePool {
    type Output = RelayNode;

    fn index(&self, id: NodeId) -> &RelayNode {
        &self.nodes[id.index()]
    }
}

impl IndexMut<NodeId> for NodePool {
    fn index_mut(&mut self, id: NodeId) -> &mut RelayNode {
        &mut self.nodes[id.index()]
    }
}

// ─── ChainIter ───────────────────────────────────────────────────────────────

/// Iterator over one chain, head to tail. Bounded by pool size.
pub struct ChainIter<'a> {
    pool: &'a NodePool,
    current: Option<NodeId>,
    remaining: usize,
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = &'a RelayNode;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.pool.get(self.current?)?;
        self.remaining -= 1;
        self.current = node.next;
        Some(node)
    }
}
