// Benchmark Report Types
// Structured output for independent analysis of relay behaviour

use relay_engine::RelayConfig;
use serde::Serialize;

// ─── Statistics (per-metric Monte Carlo aggregation) ────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub mean: f64,
    pub std_dev: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub min: f64,
    pub max: f64,
    pub n: usize,
}

impl Stats {
    pub fn from_samples(samples: &[f64]) -> Self {
        let n = samples.len();
        if n == 0 {
            return Self { mean: 0.0, std_dev: 0.0, ci_lower: 0.0, ci_upper: 0.0, min: 0.0, max: 0.0, n: 0 };
        }
        let mean = samples.iter().sum::<f64>() / n as f64;
        let variance = if n > 1 {
            samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };
        let std_dev = variance.sqrt();
        let half_width = 1.96 * std_dev / (n as f64).sqrt(); // 95% CI
        Self {
            mean,
            std_dev,
            ci_lower: mean - half_width,
            ci_upper: mean + half_width,
            min: samples.iter().cloned().fold(f64::INFINITY, f64::min),
            max: samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            n,
        }
    }

    /// Aggregate one field across a set of runs.
    pub fn of<T>(runs: &[T], field: impl Fn(&T) -> f64) -> Self {
        Self::from_samples(&runs.iter().map(field).collect::<Vec<_>>())
    }

    pub fn half_width(&self) -> f64 {
        (self.ci_upper - self.ci_lower) / 2.0
    }
}

// ─── Single-Run Result ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct BenchResult {
    pub scenario: String,
    pub name: String,
    pub category: String,
    pub seed: u64,
    pub pass: bool,
    pub ticks: u64,
    pub sites_requested: u32,
    pub sites_registered: usize,
    pub relays_failed: u32,
    pub engaged_cap: usize,
    pub peak_engaged: usize,
    pub packets_sent: u32,
    pub delivered: u32,
    pub unreachable: u32,
    pub delivery_rate: f64,
    pub mean_hops: f64,
    pub replacements: u32,
    pub unprotected: u32,
    /// Warning events drained from the simulation log.
    pub warnings: u32,
    pub min_engaged_energy: i32,
    pub mean_idle_energy: f64,
    pub reserve_held: bool,
    pub links_intact: bool,
    pub idle_energy_bounded: bool,
    pub elapsed_ms: u128,
    pub ticks_per_sec: f64,
}

// ─── Monte Carlo Report (per-scenario aggregation) ──────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct MonteCarloReport {
    pub scenario_name: String,
    pub label: String,
    pub category: String,
    pub n_runs: usize,
    pub pass_rate: f64,
    pub delivery_rate: Stats,
    pub mean_hops: Stats,
    pub replacements: Stats,
    pub unprotected: Stats,
    pub relays_failed: Stats,
    pub peak_engaged: Stats,
    pub min_engaged_energy: Stats,
    pub elapsed_ms: Stats,
    pub individual_runs: Vec<BenchResult>,
}

// ─── Invariant Summary ──────────────────────────────────────────────────────

/// Pool invariants checked at every tick of every run.
#[derive(Debug, Clone, Serialize)]
pub struct InvariantSummary {
    pub reserve_held: bool,
    pub links_intact: bool,
    pub idle_energy_bounded: bool,
    pub peak_engaged: usize,
}

impl InvariantSummary {
    pub fn from_reports(reports: &[MonteCarloReport]) -> Self {
        let runs = || reports.iter().flat_map(|r| r.individual_runs.iter());
        Self {
            reserve_held: runs().all(|r| r.reserve_held),
            links_intact: runs().all(|r| r.links_intact),
            idle_energy_bounded: runs().all(|r| r.idle_energy_bounded),
            peak_engaged: runs().map(|r| r.peak_engaged).max().unwrap_or(0),
        }
    }

    pub fn all_pass(&self) -> bool {
        self.reserve_held && self.links_intact && self.idle_energy_bounded
    }
}

// ─── Top-Level Report ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct BenchReport {
    pub timestamp: String,
    pub version: &'static str,
    pub prng: &'static str,
    pub n_runs_per_scenario: usize,
    pub config: RelayConfig,
    pub summary: Summary,
    pub invariants: InvariantSummary,
    pub scenarios: Vec<MonteCarloReport>,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_of_constant_samples() {
        let s = Stats::from_samples(&[4.0, 4.0, 4.0]);
        assert_eq!(s.mean, 4.0);
        assert_eq!(s.std_dev, 0.0);
        assert_eq!(s.half_width(), 0.0);
        assert_eq!((s.min, s.max, s.n), (4.0, 4.0, 3));
    }

    #[test]
    fn stats_ci_brackets_mean() {
        let s = Stats::from_samples(&[1.0, 2.0, 3.0, 4.0]);
        assert!((s.mean - 2.5).abs() < 1e-12);
        assert!(s.ci_lower < s.mean && s.mean < s.ci_upper);
    }

    #[test]
    fn empty_samples_are_zero() {
        let s = Stats::from_samples(&[]);
        assert_eq!(s.n, 0);
        assert_eq!(s.mean, 0.0);
    }
}
