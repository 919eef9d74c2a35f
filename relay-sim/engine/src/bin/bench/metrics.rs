// Per-Tick Metric Trackers - Pool Invariants, Energy Floor

use relay_engine::{RelaySimulation, RelayStats};

// ─── Invariant Tracker ──────────────────────────────────────────────────────

/// Checks the pool invariants after every tick:
/// engaged count within the reserve cap, symmetric links, idle energy within
/// the battery maximum.
pub struct InvariantTracker {
    pub engaged_cap: usize,
    pub max_energy: i32,
    pub ticks: u64,
    pub peak_engaged: usize,
    pub reserve_breaches: u32,
    pub link_fault_ticks: u32,
    pub energy_breaches: u32,
}

impl InvariantTracker {
    pub fn new(sim: &RelaySimulation) -> Self {
        Self {
            engaged_cap: sim.config().engaged_cap(),
            max_energy: sim.config().max_energy,
            ticks: 0,
            peak_engaged: 0,
            reserve_breaches: 0,
            link_fault_ticks: 0,
            energy_breaches: 0,
        }
    }

    pub fn record_tick(&mut self, sim: &RelaySimulation) {
        self.ticks += 1;

        let engaged = sim.pool().engaged_count();
        self.peak_engaged = self.peak_engaged.max(engaged);
        if engaged > self.engaged_cap {
            self.reserve_breaches += 1;
        }

        if let Err(faults) = sim.verify_links() {
            self.link_fault_ticks += 1;
            log::warn!("tick {}: {} link fault(s), first {:?}", sim.current_tick(), faults.len(), faults.first());
        }

        self.energy_breaches += sim
            .nodes()
            .iter()
            .filter(|n| !n.engaged && n.energy > self.max_energy)
            .count() as u32;
    }

    pub fn reserve_held(&self) -> bool {
        self.reserve_breaches == 0
    }

    pub fn links_intact(&self) -> bool {
        self.link_fault_ticks == 0
    }

    pub fn idle_energy_bounded(&self) -> bool {
        self.energy_breaches == 0
    }
}

// ─── Energy Tracker ─────────────────────────────────────────────────────────

/// Lowest engaged energy seen and the running idle-energy average.
pub struct EnergyTracker {
    pub min_engaged: Option<i32>,
    idle_sum: f64,
    samples: u64,
}

impl EnergyTracker {
    pub fn new() -> Self {
        Self { min_engaged: None, idle_sum: 0.0, samples: 0 }
    }

    pub fn record_tick(&mut self, stats: &RelayStats) {
        if let Some(e) = stats.min_engaged_energy {
            self.min_engaged = Some(self.min_engaged.map_or(e, |m| m.min(e)));
        }
        self.idle_sum += stats.mean_idle_energy;
        self.samples += 1;
    }

    pub fn mean_idle(&self) -> f64 {
        if self.samples == 0 { return 0.0; }
        self.idle_sum / self.samples as f64
    }
}
