// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Relay Chain Simulation Suite - Message Routing

use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::events::{EventLog, RelayEvent};
use crate::lifecycle::{drain, Protection};
use crate::pool::NodePool;
use crate::types::{Delivery, Point};

/// Carry a message from `origin` to the base station.
///
/// Routing strategy:
/// 1. Enter the network at the engaged node nearest `origin`; fail if it
///    lies outside the coverage radius.
/// 2. Walk `prev` links toward the chain head, then through the head's
///    uplink into the host chain, until a head with no uplink is reached.
/// 3. Each relaying node pays one drain step and is hot-swapped if it falls
///    below the critical threshold. The walk continues from whichever node
///    now holds that slot.
pub fn route(
    pool: &mut NodePool,
    origin: Point,
    config: &RelayConfig,
    log: &mut EventLog,
) -> Result<Delivery, RelayError> {
    let entry = match pool.find_nearest_engaged(origin) {
        Some((id, d)) if (d as f64) <= config.coverage_radius() => id,
        Some((_, d)) => return Err(unreachable(origin, RelayError::Unreachable { distance: d }, log)),
        None => return Err(unreachable(origin, RelayError::NoActiveRelay, log)),
    };

    let mut delivery = Delivery {
        origin,
        path: Vec::new(),
        replacements: Vec::new(),
        unprotected: Vec::new(),
    };

    let mut current = Some(entry);
    while let Some(id) = current {
        delivery.path.push(id);
        let slot = match drain(pool, id, config, None, log) {
            Protection::Healthy => id,
            Protection::Replaced(r) => {
                delivery.replacements.push(r);
                r.replacement
            }
            Protection::Unprotected => {
                delivery.unprotected.push(id);
                id
            }
        };

        // A walk can visit each pool node at most once.
        if delivery.path.len() >= pool.len() {
            break;
        }
        let node = &pool[slot];
        current = node.prev.or(node.uplink);
    }

    log.push(RelayEvent::MessageDelivered { origin, hops: delivery.path.len() });
    Ok(delivery)
}

fn unreachable(origin: Point, err: RelayError, log: &mut EventLog) -> RelayError {
    log.push(RelayEvent::MessageUnreachable { origin, reason: err.to_string() });
    err
}
