// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Relay Chain Simulation Suite - Simulation Core

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use wasm_bindgen::prelude::*;

use crate::config::RelayConfig;
use crate::error::{ConfigError, RelayError};
use crate::events::{EventLog, RelayEvent};
use crate::lifecycle;
use crate::pool::{LinkFault, NodePool};
use crate::routing;
use crate::topology;
use crate::types::*;

// ─── RelaySimulation struct ──────────────────────────────────────────────────

#[wasm_bindgen]
pub struct RelaySimulation {
    pub(crate) config: RelayConfig,
    pub(crate) pool: NodePool,
    pub(crate) sites: Vec<Site>,
    pub(crate) events: EventLog,
    pub(crate) seed: u64,
    pub(crate) rng: ChaCha8Rng,

    pub(crate) current_tick: u64,

    pub(crate) relays_failed: u32,
    pub(crate) replacement_count: u32,
    pub(crate) unprotected_count: u32,
    pub(crate) delivered_count: u32,
    pub(crate) unreachable_count: u32,
    pub(crate) total_hops: u64,
}

// ─── Internal Logic (Testable, pure Rust) ────────────────────────────────────

impl RelaySimulation {
    pub fn with_config(config: RelayConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, seed))
    }

    /// Default-configured simulation.
    pub fn seeded(seed: u64) -> Self {
        Self::build(RelayConfig::default(), seed)
    }

    pub(crate) fn build(config: RelayConfig, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let pool = NodePool::allocate_fleet(&config, &mut rng);
        log::debug!("allocated fleet of {} nodes (seed {})", pool.len(), seed);
        Self {
            config,
            pool,
            sites: Vec::new(),
            events: EventLog::new(),
            seed,
            rng,
            current_tick: 0,
            relays_failed: 0,
            replacement_count: 0,
            unprotected_count: 0,
            delivered_count: 0,
            unreachable_count: 0,
            total_hops: 0,
        }
    }

    /// Register a site and connect it to the relay network.
    ///
    /// The site is recorded only on success, so failed requests do not
    /// consume a site id.
    pub fn register_site(&mut self, position: Point) -> Result<BuildOutcome, RelayError> {
        self.check_bounds(position)?;
        let site = Site { id: SiteId(self.sites.len() as u32), position };

        match topology::build_or_extend_relay(&site, &mut self.pool, &self.config, &mut self.events) {
            Ok(outcome) => {
                self.sites.push(site);
                Ok(outcome)
            }
            Err(e) => {
                self.relays_failed += 1;
                Err(e)
            }
        }
    }

    /// Advance one simulated minute.
    pub fn advance_tick(&mut self) -> TickReport {
        let report = lifecycle::advance(&mut self.pool, &self.config, self.current_tick, &mut self.events);
        self.current_tick += 1;
        self.replacement_count += report.replacements.len() as u32;
        self.unprotected_count += report.unprotected.len() as u32;
        report
    }

    pub fn advance_time(&mut self, ticks: u64) -> Vec<TickReport> {
        (0..ticks).map(|_| self.advance_tick()).collect()
    }

    /// Route a message from `origin` to the base station.
    pub fn send_packet(&mut self, origin: Point) -> Result<Delivery, RelayError> {
        self.check_bounds(origin)?;
        match routing::route(&mut self.pool, origin, &self.config, &mut self.events) {
            Ok(delivery) => {
                self.delivered_count += 1;
                self.total_hops += delivery.path.len() as u64;
                self.replacement_count += delivery.replacements.len() as u32;
                self.unprotected_count += delivery.unprotected.len() as u32;
                Ok(delivery)
            }
            Err(e) => {
                self.unreachable_count += 1;
                Err(e)
            }
        }
    }

    /// Hot-swap a node outside the timed loop.
    pub fn replace_node(&mut self, id: NodeId) -> Result<Replacement, RelayError> {
        match lifecycle::replace(&mut self.pool, id, None, &mut self.events) {
            Ok(r) => {
                self.replacement_count += 1;
                Ok(r)
            }
            Err(RelayError::CapacityExhausted) => {
                self.unprotected_count += 1;
                Err(RelayError::CapacityExhausted)
            }
            Err(e) => Err(e),
        }
    }

    fn check_bounds(&self, p: Point) -> Result<(), RelayError> {
        let range = self.config.grid_min..=self.config.grid_max;
        if range.contains(&p.x) && range.contains(&p.y) {
            Ok(())
        } else {
            Err(RelayError::InvalidCoordinate { x: p.x, y: p.y })
        }
    }

    // ─── Read-only views ─────────────────────────────────────────────────

    pub fn config(&self) -> &RelayConfig { &self.config }
    pub fn pool(&self) -> &NodePool { &self.pool }
    pub fn nodes(&self) -> &[RelayNode] { self.pool.nodes() }
    pub fn sites(&self) -> &[Site] { &self.sites }
    pub fn events(&self) -> &[RelayEvent] { self.events.events() }
    pub fn drain_events(&mut self) -> Vec<RelayEvent> { self.events.drain() }
    pub fn current_tick(&self) -> u64 { self.current_tick }
    pub fn seed(&self) -> u64 { self.seed }
    pub fn verify_links(&self) -> Result<(), Vec<LinkFault>> { self.pool.verify_links() }

    /// Every registered site with its chain head to tail.
    pub fn relay_table(&self) -> Vec<RelayChain> {
        self.sites
            .iter()
            .map(|&site| RelayChain {
                site,
                nodes: self
                    .pool
                    .head_of(site.id)
                    .map(|head| self.pool.chain(head).copied().collect())
                    .unwrap_or_default(),
            })
            .collect()
    }

    pub fn stats(&self) -> RelayStats {
        let engaged: Vec<&RelayNode> = self.nodes().iter().filter(|n| n.engaged).collect();
        let idle: Vec<&RelayNode> = self.nodes().iter().filter(|n| !n.engaged).collect();
        let mean_idle_energy = if idle.is_empty() {
            0.0
        } else {
            idle.iter().map(|n| n.energy as f64).sum::<f64>() / idle.len() as f64
        };

        RelayStats {
            current_tick: self.current_tick,
            engaged_count: engaged.len(),
            idle_count: idle.len(),
            site_count: self.sites.len(),
            relays_failed: self.relays_failed,
            replacement_count: self.replacement_count,
            unprotected_count: self.unprotected_count,
            delivered_count: self.delivered_count,
            unreachable_count: self.unreachable_count,
            total_hops: self.total_hops,
            min_engaged_energy: engaged.iter().map(|n| n.energy).min(),
            mean_idle_energy,
        }
    }

    /// Draw a uniformly random grid point from the simulation's own stream.
    pub fn random_point(&mut self) -> Point {
        use rand::Rng;
        let range = self.config.grid_min..=self.config.grid_max;
        Point::new(self.rng.gen_range(range.clone()), self.rng.gen_range(range))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_and_default_config_agree() {
        let a = RelaySimulation::seeded(5);
        let b = RelaySimulation::with_config(RelayConfig::default(), 5).unwrap();
        assert_eq!(a.pool(), b.pool());
    }

    #[test]
    fn invalid_config_rejected() {
        let config = RelayConfig { capacity: 0, ..RelayConfig::default() };
        assert!(RelaySimulation::with_config(config, 1).is_err());
    }

    #[test]
    fn out_of_grid_requests_rejected() {
        let mut sim = RelaySimulation::seeded(1);
        assert_eq!(
            sim.register_site(Point::new(0, 50)),
            Err(RelayError::InvalidCoordinate { x: 0, y: 50 })
        );
        assert_eq!(
            sim.send_packet(Point::new(50, 101)),
            Err(RelayError::InvalidCoordinate { x: 50, y: 101 })
        );
        assert!(sim.sites().is_empty());
    }

    #[test]
    fn failed_site_does_not_consume_id() {
        let config = RelayConfig { capacity: 5, ..RelayConfig::default() };
        let mut sim = RelaySimulation::with_config(config, 3).unwrap();
        sim.register_site(Point::new(50, 50)).unwrap();
        assert!(sim.register_site(Point::new(100, 100)).is_err());
        sim.register_site(Point::new(40, 40)).unwrap();
        let ids: Vec<SiteId> = sim.sites().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![SiteId(0), SiteId(1)]);
        assert_eq!(sim.stats().relays_failed, 1);
    }

    #[test]
    fn relay_table_lists_chains_and_covered_sites() {
        let mut sim = RelaySimulation::seeded(11);
        sim.register_site(Point::new(50, 50)).unwrap();
        sim.register_site(Point::new(40, 40)).unwrap();
        let table = sim.relay_table();
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].nodes.len(), 3);
        assert!(table[0].nodes[0].is_head);
        assert!(table[1].covered_by_other());
    }

    #[test]
    fn tick_counter_is_global() {
        let mut sim = RelaySimulation::seeded(2);
        sim.advance_time(3);
        let report = sim.advance_tick();
        assert_eq!(report.tick, 3);
        assert_eq!(sim.current_tick(), 4);
    }

    #[test]
    fn stats_track_traffic() {
        let mut sim = RelaySimulation::seeded(9);
        sim.register_site(Point::new(50, 50)).unwrap();
        let delivery = sim.send_packet(Point::new(40, 40)).unwrap();
        assert!(sim.send_packet(Point::new(95, 5)).is_err());
        let stats = sim.stats();
        assert_eq!(stats.delivered_count, 1);
        assert_eq!(stats.unreachable_count, 1);
        assert_eq!(stats.total_hops, delivery.path.len() as u64);
        assert_eq!(stats.engaged_count + stats.idle_count, 20);
    }
}
