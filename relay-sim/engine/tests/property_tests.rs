//! Property-based tests for the relay engine
//!
//! Random operation sequences are replayed against a seeded simulation and
//! the pool invariants are checked after every step.

use proptest::prelude::*;
use relay_engine::geometry::distance;
use relay_engine::*;

// ============================================================================
// Strategies
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Site(Point),
    Tick(u64),
    Packet(Point),
    Replace(usize),
}

fn grid_point() -> impl Strategy<Value = Point> {
    (1..=100_i32, 1..=100_i32).prop_map(|(x, y)| Point::new(x, y))
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => grid_point().prop_map(Op::Site),
        2 => (1..30_u64).prop_map(Op::Tick),
        3 => grid_point().prop_map(Op::Packet),
        1 => (0..20_usize).prop_map(Op::Replace),
    ]
}

fn apply(sim: &mut RelaySimulation, op: &Op) {
    match *op {
        Op::Site(p) => {
            let _ = sim.register_site(p);
        }
        Op::Tick(n) => {
            sim.advance_time(n);
        }
        Op::Packet(p) => {
            let _ = sim.send_packet(p);
        }
        Op::Replace(i) => {
            let _ = sim.replace_node(NodeId(i));
        }
    }
}

// ============================================================================
// Pool Invariants
// ============================================================================

#[cfg(test)]
mod invariant_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Engaged count never exceeds the reserve cap.
        #[test]
        fn reserve_never_breached(seed in any::<u64>(), ops in prop::collection::vec(op_strategy(), 1..40)) {
            let mut sim = RelaySimulation::seeded(seed);
            let cap = sim.config().engaged_cap();
            for op in &ops {
                apply(&mut sim, op);
                prop_assert!(sim.pool().engaged_count() <= cap, "after {:?}", op);
            }
        }

        /// prev/next stay mutual inverses and uplinks point at engaged nodes.
        #[test]
        fn links_stay_symmetric(seed in any::<u64>(), ops in prop::collection::vec(op_strategy(), 1..40)) {
            let mut sim = RelaySimulation::seeded(seed);
            for op in &ops {
                apply(&mut sim, op);
                prop_assert_eq!(sim.verify_links(), Ok(()), "after {:?}", op);
            }
        }

        /// Idle energy stays within the battery maximum; no energy goes negative.
        #[test]
        fn energy_stays_bounded(seed in any::<u64>(), ops in prop::collection::vec(op_strategy(), 1..40)) {
            let mut sim = RelaySimulation::seeded(seed);
            for op in &ops {
                apply(&mut sim, op);
                for node in sim.nodes() {
                    prop_assert!(node.energy >= 0);
                    if !node.engaged {
                        prop_assert!(node.energy <= 100, "idle node {} at {}", node.id, node.energy);
                    }
                }
            }
        }

        /// Node ids equal their pool index and the pool size never changes.
        #[test]
        fn ids_are_stable(seed in any::<u64>(), ops in prop::collection::vec(op_strategy(), 1..40)) {
            let mut sim = RelaySimulation::seeded(seed);
            for op in &ops {
                apply(&mut sim, op);
            }
            prop_assert_eq!(sim.nodes().len(), 20);
            for (i, node) in sim.nodes().iter().enumerate() {
                prop_assert_eq!(node.id, NodeId(i));
            }
        }
    }
}

// ============================================================================
// Operation Contracts
// ============================================================================

#[cfg(test)]
mod contract_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// A failed site request leaves the pool exactly as it was.
        #[test]
        fn failed_build_rolls_back(seed in any::<u64>(), sites in prop::collection::vec(grid_point(), 1..20)) {
            let mut sim = RelaySimulation::seeded(seed);
            for p in sites {
                let before = sim.pool().clone();
                if sim.register_site(p).is_err() {
                    prop_assert_eq!(sim.pool(), &before);
                }
            }
        }

        /// Every established chain ends within one hop of its site.
        #[test]
        fn established_chain_reaches_site(seed in any::<u64>(), p in grid_point()) {
            let mut sim = RelaySimulation::seeded(seed);
            sim.register_site(Point::new(50, 50)).unwrap();
            if let Ok(BuildOutcome::Established { nodes }) = sim.register_site(p) {
                let tail = sim.nodes()[nodes[nodes.len() - 1].index()];
                prop_assert!(distance(tail.position, p) <= 20);
            }
        }

        /// An unreachable packet does not touch the pool.
        #[test]
        fn unreachable_packet_is_side_effect_free(seed in any::<u64>(), p in grid_point()) {
            let mut sim = RelaySimulation::seeded(seed);
            sim.register_site(Point::new(20, 20)).unwrap();
            let before = sim.pool().clone();
            if let Err(e) = sim.send_packet(p) {
                prop_assert!(matches!(e, RelayError::Unreachable { .. }), "unexpected error {:?}", e);
                prop_assert_eq!(sim.pool(), &before);
            }
        }

        /// Distance is symmetric and never exceeds the Manhattan distance.
        #[test]
        fn distance_is_symmetric(a in grid_point(), b in grid_point()) {
            prop_assert_eq!(distance(a, b), distance(b, a));
            prop_assert!(distance(a, b) <= (a.x - b.x).abs() + (a.y - b.y).abs());
        }
    }
}
