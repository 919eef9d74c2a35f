// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Relay Chain Simulation Suite - Relay Construction
//
// Extends the relay network toward a new site one hop at a time, keeping a
// fraction of the pool idle as standby for hot-swaps.

use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::events::{EventLog, RelayEvent};
use crate::geometry::{directional_bias, distance};
use crate::pool::NodePool;
use crate::types::{BuildOutcome, NodeId, Point, Site, BASE_STATION};

/// Connect `site` to the relay network.
///
/// Algorithm:
/// 1. If an engaged node already lies inside the coverage radius, succeed
///    without mutation.
/// 2. Estimate the hop count from the nearest engaged node (or the base
///    station) and reject up front if it would breach the standby reserve.
/// 3. Place the strongest idle node one proportional step toward the site,
///    perturbed along the dominant axis, until a node lands within range.
///
/// The reserve is re-checked before every hop since placement jitter can
/// make the real hop count exceed the estimate. Any failure restores the
/// pool to its state before the call.
pub fn build_or_extend_relay(
    site: &Site,
    pool: &mut NodePool,
    config: &RelayConfig,
    log: &mut EventLog,
) -> Result<BuildOutcome, RelayError> {
    let anchor = pool.find_nearest_engaged(site.position);

    if let Some((anchor_id, d)) = anchor {
        if (d as f64) < config.coverage_radius() {
            log.push(RelayEvent::SiteCovered {
                site: site.id,
                position: site.position,
                anchor: anchor_id,
            });
            return Ok(BuildOutcome::Covered { anchor: anchor_id });
        }
    }

    match extend(site, pool, config, anchor.map(|(id, _)| id)) {
        Ok(nodes) => {
            log.push(RelayEvent::RelayEstablished {
                site: site.id,
                position: site.position,
                nodes: nodes.clone(),
            });
            Ok(BuildOutcome::Established { nodes })
        }
        Err(e) => {
            log.relay_failed(site.position, &e);
            Err(e)
        }
    }
}

/// Hops needed to span `d` units, never fewer than one.
pub fn hops_needed(d: i32, max_range: i32) -> usize {
    ((d as f64 / max_range as f64).ceil() as usize).max(1)
}

fn extend(
    site: &Site,
    pool: &mut NodePool,
    config: &RelayConfig,
    anchor: Option<NodeId>,
) -> Result<Vec<NodeId>, RelayError> {
    if pool.find_strongest_idle().is_none() {
        return Err(RelayError::CapacityExhausted);
    }

    let origin = anchor.map_or(BASE_STATION, |id| pool[id].position);
    let needed = hops_needed(distance(origin, site.position), config.max_range);
    let available = config.engaged_cap().saturating_sub(pool.engaged_count());
    if needed > available {
        return Err(RelayError::ReserveViolation { needed, available });
    }

    let snapshot = pool.clone();
    let placed = place_chain(site, pool, config, anchor, origin, needed);
    if placed.is_err() {
        *pool = snapshot;
    }
    placed
}

fn place_chain(
    site: &Site,
    pool: &mut NodePool,
    config: &RelayConfig,
    anchor: Option<NodeId>,
    origin: Point,
    estimate: usize,
) -> Result<Vec<NodeId>, RelayError> {
    let cap = config.engaged_cap();
    let jitter = config.placement_jitter();
    let mut hops_left = estimate as i64;
    let mut prev = anchor;
    let mut cursor = origin;
    let mut placed = Vec::with_capacity(estimate);

    loop {
        let id = pool.find_strongest_idle().ok_or(RelayError::CapacityExhausted)?;
        if pool.engaged_count() >= cap {
            return Err(RelayError::ReserveViolation {
                needed: hops_left.max(1) as usize,
                available: 0,
            });
        }

        let position = step_toward(cursor, site.position, hops_left, jitter);
        let chain_prev = prev.filter(|&p| pool[p].site == Some(site.id));

        let node = &mut pool[id];
        node.engaged = true;
        node.site = Some(site.id);
        node.position = position;
        node.prev = chain_prev;
        node.is_head = chain_prev.is_none();
        node.uplink = if node.is_head { prev } else { None };
        if let Some(p) = chain_prev {
            pool[p].next = Some(id);
        }

        log::debug!("site {}: node {} placed at {} ({} hop(s) estimated left)", site.id, id, position, hops_left);

        placed.push(id);
        prev = Some(id);
        cursor = position;
        hops_left -= 1;

        if distance(position, site.position) <= config.max_range {
            return Ok(placed);
        }
    }
}

/// Next placement from `from` toward `to`: the remaining offset split over
/// the hops still needed, shifted by `jitter` scaled with the directional
/// bias. The y axis is perturbed in the transposed frame.
pub fn step_toward(from: Point, to: Point, hops_left: i64, jitter: f64) -> Point {
    let hops = hops_left.max(1) as f64;

    let step_x = ((to.x - from.x) as f64 / hops).ceil();
    let x = (step_x + from.x as f64 - jitter * directional_bias(from, to)) as i32;

    let step_y = ((to.y - from.y) as f64 / hops).ceil();
    let bias_y = directional_bias(Point::new(x, from.y), to.transposed());
    let y = (step_y + from.y as f64 - jitter * bias_y) as i32;

    Point::new(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RelayNode, SiteId};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn fresh_pool(config: &RelayConfig) -> NodePool {
        NodePool::allocate_fleet(config, &mut ChaCha8Rng::seed_from_u64(1))
    }

    fn site(id: u32, x: i32, y: i32) -> Site {
        Site { id: SiteId(id), position: Point::new(x, y) }
    }

    /// Pool of `n` idle nodes plus one engaged head of site 0 at `anchor`.
    fn pool_with_anchor(n: usize, anchor: Point) -> NodePool {
        let mut pool = NodePool::from_nodes(vec![RelayNode::idle(NodeId(0), 90); n]);
        let a = &mut pool[NodeId(0)];
        a.engaged = true;
        a.is_head = true;
        a.site = Some(SiteId(0));
        a.position = anchor;
        pool
    }

    #[test]
    fn step_from_base_station_toward_diagonal_site() {
        assert_eq!(step_toward(Point::new(0, 0), Point::new(50, 50), 4, 1.0), Point::new(12, 12));
        assert_eq!(step_toward(Point::new(12, 12), Point::new(50, 50), 3, 1.0), Point::new(24, 24));
        assert_eq!(step_toward(Point::new(24, 24), Point::new(50, 50), 2, 1.0), Point::new(36, 36));
    }

    #[test]
    fn step_with_exhausted_estimate_covers_full_offset() {
        let p = step_toward(Point::new(36, 36), Point::new(55, 36), 0, 1.0);
        assert_eq!(p, Point::new(55, 37));
    }

    #[test]
    fn hops_never_below_one() {
        assert_eq!(hops_needed(0, 20), 1);
        assert_eq!(hops_needed(20, 20), 1);
        assert_eq!(hops_needed(21, 20), 2);
        assert_eq!(hops_needed(70, 20), 4);
    }

    #[test]
    fn first_relay_builds_chain_from_base() {
        let config = RelayConfig::default();
        let mut pool = fresh_pool(&config);
        let mut log = EventLog::new();

        let outcome = build_or_extend_relay(&site(0, 50, 50), &mut pool, &config, &mut log).unwrap();
        let nodes = outcome.engaged_nodes().to_vec();
        assert_eq!(nodes.len(), 3);

        let positions: Vec<Point> = nodes.iter().map(|&id| pool[id].position).collect();
        assert_eq!(positions, vec![Point::new(12, 12), Point::new(24, 24), Point::new(36, 36)]);

        let head = pool.head_of(SiteId(0)).unwrap();
        assert_eq!(head, nodes[0]);
        assert_eq!(pool[head].prev, None);
        assert_eq!(pool[head].uplink, None);
        let walked: Vec<NodeId> = pool.chain(head).map(|n| n.id).collect();
        assert_eq!(walked, nodes);

        let tail = pool[*nodes.last().unwrap()];
        assert_eq!(tail.next, None);
        assert!(distance(tail.position, Point::new(50, 50)) <= config.max_range);
        assert!(pool.verify_links().is_ok());
        assert!(matches!(log.events()[0], RelayEvent::RelayEstablished { .. }));
    }

    #[test]
    fn strongest_nodes_are_engaged_first() {
        let config = RelayConfig::default();
        let mut pool = fresh_pool(&config);
        let mut expected: Vec<(i32, NodeId)> =
            pool.nodes().iter().map(|n| (-n.energy, n.id)).collect();
        expected.sort();

        let outcome =
            build_or_extend_relay(&site(0, 50, 50), &mut pool, &config, &mut EventLog::new()).unwrap();
        let chosen: Vec<NodeId> = expected.iter().take(3).map(|&(_, id)| id).collect();
        assert_eq!(outcome.engaged_nodes(), chosen.as_slice());
    }

    #[test]
    fn site_near_engaged_node_is_covered_without_mutation() {
        let config = RelayConfig::default();
        let mut pool = fresh_pool(&config);
        let mut log = EventLog::new();
        build_or_extend_relay(&site(0, 50, 50), &mut pool, &config, &mut log).unwrap();
        let before = pool.clone();

        let outcome = build_or_extend_relay(&site(1, 40, 40), &mut pool, &config, &mut log).unwrap();
        assert!(matches!(outcome, BuildOutcome::Covered { .. }));
        assert_eq!(pool, before);
    }

    #[test]
    fn branch_head_uplinks_to_anchor() {
        let config = RelayConfig::default();
        let mut pool = fresh_pool(&config);
        let mut log = EventLog::new();
        let first = build_or_extend_relay(&site(0, 50, 50), &mut pool, &config, &mut log).unwrap();
        let anchor = *first.engaged_nodes().last().unwrap();

        let second = build_or_extend_relay(&site(1, 90, 10), &mut pool, &config, &mut log).unwrap();
        let head = second.engaged_nodes()[0];
        assert!(pool[head].is_head);
        assert_eq!(pool[head].prev, None);
        assert_eq!(pool[head].uplink, Some(anchor));
        assert_eq!(pool[anchor].next, None, "host chain tail must not gain a next link");
        assert!(pool.verify_links().is_ok());
    }

    #[test]
    fn estimate_over_reserve_rejected_before_mutation() {
        let config = RelayConfig { capacity: 5, ..RelayConfig::default() };
        let mut pool = fresh_pool(&config);
        let mut log = EventLog::new();
        build_or_extend_relay(&site(0, 50, 50), &mut pool, &config, &mut log).unwrap();
        let before = pool.clone();

        let err = build_or_extend_relay(&site(1, 100, 100), &mut pool, &config, &mut log).unwrap_err();
        assert_eq!(err, RelayError::ReserveViolation { needed: 5, available: 1 });
        assert_eq!(pool, before);
        assert!(log.events().last().unwrap().is_warning());
    }

    #[test]
    fn jitter_overrun_rolls_back() {
        // capacity 3 -> at most 2 engaged; the anchor already holds one slot.
        let config = RelayConfig { capacity: 3, ..RelayConfig::default() };
        let mut pool = pool_with_anchor(3, Point::new(0, 30));
        let before = pool.clone();

        // Estimated one hop, but the first placement lands at (9, 36).
        let err = build_or_extend_relay(&site(1, 4, 10), &mut pool, &config, &mut EventLog::new())
            .unwrap_err();
        assert!(matches!(err, RelayError::ReserveViolation { available: 0, .. }));
        assert_eq!(pool, before);
    }

    #[test]
    fn jitter_overrun_succeeds_with_room() {
        let config = RelayConfig { capacity: 6, ..RelayConfig::default() };
        let mut pool = pool_with_anchor(6, Point::new(0, 30));
        let outcome =
            build_or_extend_relay(&site(1, 4, 10), &mut pool, &config, &mut EventLog::new()).unwrap();
        let nodes = outcome.engaged_nodes();
        assert_eq!(nodes.len(), 2);
        assert_eq!(pool[nodes[0]].position, Point::new(9, 36));
        assert_eq!(pool[nodes[1]].prev, Some(nodes[0]));
        assert!(pool.engaged_count() <= config.engaged_cap());
        assert!(pool.verify_links().is_ok());
    }

    #[test]
    fn no_idle_node_is_capacity_exhausted() {
        let config = RelayConfig::default();
        let mut pool = pool_with_anchor(1, Point::new(0, 30));
        let err = build_or_extend_relay(&site(1, 90, 90), &mut pool, &config, &mut EventLog::new())
            .unwrap_err();
        assert_eq!(err, RelayError::CapacityExhausted);
    }
}
