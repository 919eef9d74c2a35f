// Scenario Definitions - relay construction, drain and traffic workloads
// All scenario logic lives in site lists, rate curves and setup/event closures

use relay_engine::{Point, RelaySimulation, SiteId};

// ─── Scenario Configuration ─────────────────────────────────────────────────

pub struct Scenario {
    pub name: &'static str,
    pub label: &'static str,
    pub category: &'static str,
    pub ticks: u64,
    /// Sites registered, in order, before the first tick.
    pub sites: &'static [(i32, i32)],
    /// Expected packets per tick.
    pub packet_rate: f64,
    pub rate_curve: Option<fn(u64) -> f64>,
    /// Share of packets originating next to an engaged relay.
    pub hotspot_share: f64,
    pub criteria: PassCriteria,
    /// Pre-run setup, after `sites` are registered
    pub setup: Option<Box<dyn Fn(&mut RelaySimulation) + Send + Sync>>,
    /// Mid-simulation events, run before traffic at the given tick
    pub mid_event: Option<Box<dyn Fn(&mut RelaySimulation, u64) + Send + Sync>>,
}

impl Scenario {
    pub fn rate_at(&self, tick: u64) -> f64 {
        self.rate_curve.map_or(self.packet_rate, |curve| curve(tick))
    }

    pub fn matches(&self, filter: &str) -> bool {
        let f = filter.to_lowercase();
        [self.name, self.label, self.category]
            .iter()
            .any(|s| s.to_lowercase().contains(&f))
    }
}

pub struct PassCriteria {
    pub require_reserve: bool,
    pub require_link_integrity: bool,
    pub require_idle_energy_bound: bool,
    pub min_delivery_rate: Option<f64>,
    pub max_unprotected: Option<u32>,
    pub min_replacements: Option<u32>,
    pub max_peak_engaged: Option<usize>,
    /// The workload is sized to exceed the reserve at least once.
    pub expect_relay_failure: bool,
}

impl Default for PassCriteria {
    fn default() -> Self {
        Self {
            require_reserve: true,
            require_link_integrity: true,
            require_idle_energy_bound: true,
            min_delivery_rate: None,
            max_unprotected: None,
            min_replacements: None,
            max_peak_engaged: None,
            expect_relay_failure: false,
        }
    }
}

// ─── Curve Functions ────────────────────────────────────────────────────────

fn storm_rate(tick: u64) -> f64 {
    match tick {
        0..=39 => 2.0,
        40..=69 => 12.0,
        _ => 4.0 + 2.0 * (tick as f64 / 10.0).sin(),
    }
}

fn evening_rate(tick: u64) -> f64 {
    // One busy hour in every four.
    if (tick / 60) % 4 == 3 { 3.0 } else { 0.5 }
}

// ─── Scenario Definitions ───────────────────────────────────────────────────

const CORNERS: [(i32, i32); 7] = [
    (100, 1), (1, 100), (100, 100), (60, 1), (1, 60), (80, 40), (40, 80),
];

pub fn scenarios() -> Vec<Scenario> {
    let mut s = vec![
        // ─── Construction ───────────────────────────────────────────────
        Scenario { name: "SINGLE_SITE", label: "Single Site", category: "construction",
            ticks: 60, sites: &[(50, 50)], packet_rate: 0.5, rate_curve: None, hotspot_share: 1.0,
            criteria: PassCriteria { min_delivery_rate: Some(99.0), max_peak_engaged: Some(4), ..Default::default() },
            setup: None, mid_event: None },
        Scenario { name: "COVERED_SITE", label: "Covered Site", category: "construction",
            ticks: 60, sites: &[(50, 50), (40, 40), (30, 30)], packet_rate: 0.5, rate_curve: None, hotspot_share: 1.0,
            criteria: PassCriteria { min_delivery_rate: Some(99.0), max_peak_engaged: Some(3), ..Default::default() },
            setup: None, mid_event: None },
        Scenario { name: "CORNER_SITES", label: "Corner Sites", category: "construction",
            ticks: 120, sites: &[(95, 5), (5, 95), (60, 60)], packet_rate: 1.0, rate_curve: None, hotspot_share: 0.8,
            criteria: PassCriteria { min_delivery_rate: Some(75.0), ..Default::default() },
            setup: None, mid_event: None },

        // ─── Energy ─────────────────────────────────────────────────────
        Scenario { name: "LONG_DRAIN", label: "Long Drain", category: "energy",
            ticks: 300, sites: &[(50, 50), (20, 80)], packet_rate: 0.5, rate_curve: None, hotspot_share: 1.0,
            criteria: PassCriteria { min_replacements: Some(6), max_unprotected: Some(0), ..Default::default() },
            setup: None, mid_event: None },
        Scenario { name: "DAILY_CYCLE", label: "Daily Cycle", category: "energy",
            ticks: 480, sites: &[(50, 50), (80, 20)], packet_rate: 0.5, rate_curve: Some(evening_rate), hotspot_share: 0.9,
            criteria: PassCriteria { min_delivery_rate: Some(85.0), max_unprotected: Some(0), ..Default::default() },
            setup: None, mid_event: None },

        // ─── Traffic ────────────────────────────────────────────────────
        Scenario { name: "PACKET_STORM", label: "Packet Storm", category: "traffic",
            ticks: 150, sites: &[(50, 50), (80, 20), (20, 80)], packet_rate: 2.0, rate_curve: Some(storm_rate), hotspot_share: 0.9,
            criteria: PassCriteria { min_delivery_rate: Some(80.0), ..Default::default() },
            setup: None, mid_event: None },
    ];

    // ─── Reserve Exhaustion ─────────────────────────────────────────────
    s.push(Scenario {
        name: "RESERVE_EXHAUSTION", label: "Reserve Exhaustion", category: "construction",
        ticks: 100, sites: &[], packet_rate: 1.0, rate_curve: None, hotspot_share: 1.0,
        criteria: PassCriteria { expect_relay_failure: true, max_peak_engaged: Some(16), ..Default::default() },
        setup: Some(Box::new(|sim: &mut RelaySimulation| {
            for _ in 0..3 {
                for &(x, y) in &CORNERS {
                    // Failures are the point of this workload.
                    let _ = sim.register_site(Point::new(x, y));
                }
            }
        })),
        mid_event: None,
    });

    // ─── Rolling Disasters ──────────────────────────────────────────────
    s.push(Scenario {
        name: "ROLLING_DISASTERS", label: "Rolling Disasters", category: "traffic",
        ticks: 400, sites: &[(50, 50)], packet_rate: 1.0, rate_curve: None, hotspot_share: 0.9,
        criteria: PassCriteria { min_delivery_rate: Some(80.0), ..Default::default() },
        setup: None,
        mid_event: Some(Box::new(|sim: &mut RelaySimulation, tick: u64| {
            if tick > 0 && tick % 50 == 0 {
                let p = sim.random_point();
                let _ = sim.register_site(p);
            }
            if tick > 0 && tick % 75 == 0 {
                // Planned maintenance on the first relay's head.
                if let Some(head) = sim.pool().head_of(SiteId(0)) {
                    let _ = sim.replace_node(head);
                }
            }
        })),
    });

    s
}
