// Per-Tick JSONL Time Series Recorder
// Outputs one JSON line per tick for independent analysis

use relay_engine::{RelaySimulation, TickReport};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
pub struct TickSnapshot {
    pub tick: u64,
    pub engaged_count: usize,
    pub idle_count: usize,
    pub site_count: usize,
    pub min_engaged_energy: Option<i32>,
    pub mean_idle_energy: f64,
    pub packets: u32,
    pub replacements: usize,
    pub unprotected: usize,
    pub delivered_cumulative: u32,
    pub unreachable_cumulative: u32,
    pub relays_failed_cumulative: u32,
}

impl TickSnapshot {
    pub fn capture(sim: &RelaySimulation, report: &TickReport, packets: u32) -> Self {
        let stats = sim.stats();
        Self {
            tick: report.tick,
            engaged_count: stats.engaged_count,
            idle_count: stats.idle_count,
            site_count: stats.site_count,
            min_engaged_energy: stats.min_engaged_energy,
            mean_idle_energy: stats.mean_idle_energy,
            packets,
            replacements: report.replacements.len(),
            unprotected: report.unprotected.len(),
            delivered_cumulative: stats.delivered_count,
            unreachable_cumulative: stats.unreachable_count,
            relays_failed_cumulative: stats.relays_failed,
        }
    }
}

/// Time series recorder that accumulates snapshots and writes JSONL
pub struct TimeSeriesRecorder {
    snapshots: Vec<TickSnapshot>,
}

impl TimeSeriesRecorder {
    pub fn new() -> Self {
        Self { snapshots: Vec::new() }
    }

    pub fn record(&mut self, sim: &RelaySimulation, report: &TickReport, packets: u32) {
        self.snapshots.push(TickSnapshot::capture(sim, report, packets));
    }

    /// Write all snapshots to a JSONL file
    pub fn write_jsonl(&self, path: &std::path::Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::File::create(path)?;
        for snapshot in &self.snapshots {
            let line = serde_json::to_string(snapshot)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            writeln!(file, "{}", line)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }
}
