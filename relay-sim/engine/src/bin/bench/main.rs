// Relay Benchmark Runner v0.2.0
// Monte Carlo (N=30), Poisson traffic, seedable PRNG, per-tick audit trail
//
// Usage:
//   cargo run --release --bin bench                          # Run all scenarios (30 runs each)
//   cargo run --release --bin bench -- --runs 5              # Quick mode (5 runs each)
//   cargo run --release --bin bench -- PACKET_STORM          # Filter by name, label or category
//   cargo run --release --bin bench -- --time-series         # Enable JSONL output
//   cargo run --release --bin bench -- --seed 42             # Custom base seed
//   cargo run --release --bin bench -- --config relay.toml   # Override relay constants

mod metrics;
mod monte_carlo;
mod report;
mod scenarios;
mod time_series;
mod traffic;

use log::LevelFilter;
use relay_engine::RelayConfig;
use report::*;
use scenarios::*;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// A scenario passes the suite when at least this share of its runs pass.
const PASS_THRESHOLD: f64 = 0.933;

// ─── CLI Parsing ────────────────────────────────────────────────────────────

struct CliArgs {
    runs: usize,
    seed: u64,
    time_series: bool,
    config: Option<PathBuf>,
    filter: Option<String>,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut cli = CliArgs {
        runs: 30,
        seed: 0,
        time_series: false,
        config: None,
        filter: None,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--runs" => {
                i += 1;
                if i < args.len() {
                    cli.runs = args[i].parse().unwrap_or(30);
                }
            }
            "--seed" => {
                i += 1;
                if i < args.len() {
                    cli.seed = args[i].parse().unwrap_or(0);
                }
            }
            "--config" => {
                i += 1;
                if i < args.len() {
                    cli.config = Some(PathBuf::from(&args[i]));
                }
            }
            "--time-series" => {
                cli.time_series = true;
            }
            arg if !arg.starts_with('-') => {
                cli.filter = Some(arg.to_string());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
            }
        }
        i += 1;
    }

    cli
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() {
    // Per-event logging would drown the table; RUST_LOG opts back in.
    env_logger::Builder::new()
        .filter_level(LevelFilter::Error)
        .parse_default_env()
        .init();

    match run(parse_args()) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("  Error: {}", e);
            std::process::exit(2);
        }
    }
}

/// Run the suite; `Ok(false)` when any scenario or invariant fails.
fn run(cli: CliArgs) -> Result<bool, Box<dyn Error>> {
    let config = match &cli.config {
        Some(path) => RelayConfig::load(path)?,
        None => RelayConfig::default(),
    };

    let all_scenarios = scenarios();
    let to_run: Vec<&Scenario> = match &cli.filter {
        Some(f) => all_scenarios.iter().filter(|s| s.matches(f)).collect(),
        None => all_scenarios.iter().collect(),
    };

    if to_run.is_empty() {
        return Err(format!("no scenarios match filter {:?}", cli.filter).into());
    }

    let ts_dir = cli.time_series.then(|| Path::new("benchmark-results/time-series").to_path_buf());

    println!("\n  Relay Benchmark Runner v0.2.0");
    println!("  PRNG: ChaCha8Rng | Runs/scenario: {} | Base seed: {}", cli.runs, cli.seed);
    println!("  Pool: {} nodes | Engaged cap: {} | Range: {}",
        config.capacity, config.engaged_cap(), config.max_range);
    println!("  Running {} scenario(s)...\n", to_run.len());
    println!("  {:<24} {:>5} {:>11} {:>6} {:>7} {:>7} {:>5} {:>7}",
        "Scenario", "Pass%", "Deliv%", "Hops", "Swaps", "Unprot", "Peak", "Time");
    println!("  {}", "-".repeat(82));

    let suite_start = Instant::now();
    let mut mc_reports = Vec::new();

    for scenario in &to_run {
        let report = monte_carlo::run_monte_carlo(scenario, &config, cli.runs, cli.seed, ts_dir.as_deref())?;

        let pass_pct = report.pass_rate * 100.0;
        let status = if report.pass_rate >= PASS_THRESHOLD { "PASS" } else { "FAIL" };

        println!("  {:<24} {:>4}% {:>6.1}±{:<4.1} {:>6.2} {:>7.1} {:>7.1} {:>5.0} {:>5.0}ms  {}",
            report.label,
            pass_pct as u32,
            report.delivery_rate.mean, report.delivery_rate.half_width(),
            report.mean_hops.mean,
            report.replacements.mean,
            report.unprotected.mean,
            report.peak_engaged.max,
            report.elapsed_ms.mean,
            status,
        );

        mc_reports.push(report);
    }

    let suite_elapsed = suite_start.elapsed();
    let invariants = InvariantSummary::from_reports(&mc_reports);

    // ─── Summary ────────────────────────────────────────────────────────

    let total = mc_reports.len();
    let passed = mc_reports.iter().filter(|r| r.pass_rate >= PASS_THRESHOLD).count();
    let failed = total - passed;

    println!("  {}", "-".repeat(82));
    println!("  Total: {}  Passed: {}  Failed: {}  Suite time: {:.1}s\n",
        total, passed, failed, suite_elapsed.as_secs_f64());

    let verdict = |ok: bool| if ok { "PASS" } else { "FAIL" };
    println!("  Pool Invariants:");
    println!("    Standby reserve held:  {} (peak engaged {})", verdict(invariants.reserve_held), invariants.peak_engaged);
    println!("    Links symmetric:       {}", verdict(invariants.links_intact));
    println!("    Idle energy bounded:   {}\n", verdict(invariants.idle_energy_bounded));

    // ─── Write JSON Report ──────────────────────────────────────────────

    let ts = SystemTime::now().duration_since(UNIX_EPOCH)?.as_millis();
    let timestamp = format!("{}", ts);
    let all_pass = failed == 0 && invariants.all_pass();

    let report = BenchReport {
        timestamp: timestamp.clone(),
        version: env!("CARGO_PKG_VERSION"),
        prng: "ChaCha8Rng",
        n_runs_per_scenario: cli.runs,
        config,
        summary: Summary {
            total,
            passed,
            failed,
            pass_rate: passed as f64 / total as f64,
        },
        invariants,
        scenarios: mc_reports,
    };

    let dir = Path::new("benchmark-results");
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("bench-{}.json", timestamp));
    std::fs::write(&path, serde_json::to_string_pretty(&report)?)?;
    println!("  Results saved to: {}\n", path.display());

    Ok(all_pass)
}
