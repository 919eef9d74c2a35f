// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Relay Chain Simulation Suite - Shared Test Fixtures

use crate::pool::NodePool;
use crate::types::{NodeId, Point, RelayNode, SiteId};

/// Chain 0 -> 1 -> 2 for site 0 at (10,10), (20,20), (30,30), plus idle
/// nodes with the given energies.
pub(crate) fn chain_pool(chain_energy: [i32; 3], idle: &[i32]) -> NodePool {
    let mut nodes: Vec<RelayNode> = chain_energy
        .iter()
        .chain(idle)
        .map(|&e| RelayNode::idle(NodeId(0), e))
        .collect();
    for (i, node) in nodes.iter_mut().take(3).enumerate() {
        node.engaged = true;
        node.site = Some(SiteId(0));
        node.position = Point::new(10 * (i as i32 + 1), 10 * (i as i32 + 1));
        node.prev = i.checked_sub(1).map(NodeId);
        node.next = if i < 2 { Some(NodeId(i + 1)) } else { None };
        node.is_head = i == 0;
    }
    NodePool::from_nodes(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_fixture_is_well_linked() {
        let pool = chain_pool([90, 80, 70], &[100, 50]);
        assert_eq!(pool.len(), 5);
        assert_eq!(pool.engaged_count(), 3);
        assert_eq!(pool.head_of(SiteId(0)), Some(NodeId(0)));
        assert_eq!(pool[NodeId(2)].energy, 70);
        assert!(!pool[NodeId(4)].engaged);
        assert!(pool.verify_links().is_ok());
    }
}
