// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Relay Chain Simulation Suite - Energy Lifecycle
//
// Engaged nodes drain, idle nodes recharge, and any engaged node that drops
// below the critical threshold is hot-swapped with the strongest idle node.

use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::events::{EventLog, RelayEvent};
use crate::pool::NodePool;
use crate::types::{NodeId, Replacement, TickReport};

/// Result of draining one engaged node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protection {
    /// Still at or above the critical threshold.
    Healthy,
    /// Dropped below the threshold and was swapped out.
    Replaced(Replacement),
    /// Dropped below the threshold with no idle node to take over.
    Unprotected,
}

/// Advance every node by one tick, in pool order.
///
/// A replacement engaged earlier in the pass is drained when the pass
/// reaches it; a retired node recharges from the next tick on.
pub fn advance(pool: &mut NodePool, config: &RelayConfig, tick: u64, log: &mut EventLog) -> TickReport {
    let mut report = TickReport { tick, ..TickReport::default() };

    for i in 0..pool.len() {
        let id = NodeId(i);
        if pool[id].engaged {
            match drain(pool, id, config, Some(tick), log) {
                Protection::Healthy => {}
                Protection::Replaced(r) => report.replacements.push(r),
                Protection::Unprotected => report.unprotected.push(id),
            }
        } else {
            let node = &mut pool[id];
            node.energy = (node.energy + config.recharge_rate).min(config.max_energy);
        }
    }

    report
}

/// Charge one unit of work to an engaged node and hot-swap it if it falls
/// below the critical threshold.
///
/// Energy saturates at zero for a node left running unprotected.
pub fn drain(
    pool: &mut NodePool,
    id: NodeId,
    config: &RelayConfig,
    tick: Option<u64>,
    log: &mut EventLog,
) -> Protection {
    let node = &mut pool[id];
    node.energy = (node.energy - config.drain_rate).max(0);
    if node.energy >= config.critical_energy {
        return Protection::Healthy;
    }

    match replace(pool, id, tick, log) {
        Ok(r) => Protection::Replaced(r),
        Err(_) => Protection::Unprotected,
    }
}

/// Swap `id` out of its chain for the strongest idle node.
///
/// The replacement takes over position, site, head flag and every link;
/// neighbours and uplinks are re-pointed at it. The retired node returns to
/// idle defaults keeping its id and energy. The replacement keeps whatever
/// energy it had recharged to.
///
/// With no idle node available an `UnprotectedNode` event is recorded and
/// the pool is left untouched.
pub fn replace(
    pool: &mut NodePool,
    id: NodeId,
    tick: Option<u64>,
    log: &mut EventLog,
) -> Result<Replacement, RelayError> {
    let old = *pool.node(id)?;
    if !old.engaged {
        return Err(RelayError::NotEngaged(id));
    }

    let Some(new_id) = pool.find_strongest_idle() else {
        log.push(RelayEvent::UnprotectedNode { node: id, energy: old.energy, tick });
        return Err(RelayError::CapacityExhausted);
    };

    let new = &mut pool[new_id];
    new.engaged = true;
    new.position = old.position;
    new.site = old.site;
    new.is_head = old.is_head;
    new.prev = old.prev;
    new.next = old.next;
    new.uplink = old.uplink;

    if let Some(p) = old.prev {
        if pool[p].next == Some(id) {
            pool[p].next = Some(new_id);
        }
    }
    if let Some(n) = old.next {
        if pool[n].prev == Some(id) {
            pool[n].prev = Some(new_id);
        }
    }
    pool.retarget_uplinks(id, new_id);
    pool[id].reset();

    let replacement = Replacement { retired: id, replacement: new_id, position: old.position, tick };
    log.push(RelayEvent::NodeReplaced {
        retired: id,
        replacement: new_id,
        position: old.position,
        tick,
    });
    Ok(replacement)
}
