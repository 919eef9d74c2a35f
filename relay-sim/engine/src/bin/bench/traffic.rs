// Poisson Traffic Generator - seedable packet origins
// Most packets originate near an engaged relay (people at a site); the rest
// are scattered uniformly over the grid and may fall outside coverage.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use relay_engine::{Point, RelayConfig, RelayNode};

/// Maximum per-axis offset of a hotspot packet from its relay.
const HOTSPOT_SPREAD: i32 = 8;

pub struct TrafficGenerator {
    rng: ChaCha8Rng,
    grid_min: i32,
    grid_max: i32,
    /// Share of packets drawn around engaged relays.
    hotspot_share: f64,
    hotspots: Vec<Point>,
    pub spawn_count: u32,
}

impl TrafficGenerator {
    pub fn new(rng: ChaCha8Rng, config: &RelayConfig, hotspot_share: f64) -> Self {
        Self {
            rng,
            grid_min: config.grid_min,
            grid_max: config.grid_max,
            hotspot_share: hotspot_share.clamp(0.0, 1.0),
            hotspots: Vec::new(),
            spawn_count: 0,
        }
    }

    /// Refresh hotspots from the current engaged relays.
    pub fn track_relays(&mut self, nodes: &[RelayNode]) {
        self.hotspots.clear();
        self.hotspots.extend(nodes.iter().filter(|n| n.engaged).map(|n| n.position));
    }

    /// Generate Poisson-distributed packet origins for one tick.
    /// `lambda` is the expected number of packets per tick.
    pub fn generate_tick(&mut self, lambda: f64) -> Vec<Point> {
        if lambda <= 0.0 {
            return Vec::new();
        }

        let n_packets = poisson_sample(&mut self.rng, lambda);
        let mut origins = Vec::with_capacity(n_packets as usize);

        for _ in 0..n_packets {
            let origin = if !self.hotspots.is_empty() && self.rng.gen::<f64>() < self.hotspot_share {
                let hub = self.hotspots[self.rng.gen_range(0..self.hotspots.len())];
                let dx = self.rng.gen_range(-HOTSPOT_SPREAD..=HOTSPOT_SPREAD);
                let dy = self.rng.gen_range(-HOTSPOT_SPREAD..=HOTSPOT_SPREAD);
                Point::new(self.clamp(hub.x + dx), self.clamp(hub.y + dy))
            } else {
                Point::new(
                    self.rng.gen_range(self.grid_min..=self.grid_max),
                    self.rng.gen_range(self.grid_min..=self.grid_max),
                )
            };
            origins.push(origin);
            self.spawn_count += 1;
        }

        origins
    }

    fn clamp(&self, v: i32) -> i32 {
        v.clamp(self.grid_min, self.grid_max)
    }
}

/// Poisson sampling via Knuth algorithm.
/// For λ < 30, uses direct method. For larger λ, uses normal approximation.
fn poisson_sample(rng: &mut ChaCha8Rng, lambda: f64) -> u32 {
    if lambda < 30.0 {
        let l = (-lambda).exp();
        let mut k: u32 = 0;
        let mut p: f64 = 1.0;
        loop {
            k += 1;
            p *= rng.gen::<f64>();
            if p <= l {
                return k - 1;
            }
        }
    } else {
        let u1: f64 = rng.gen();
        let u2: f64 = rng.gen();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        let result = lambda + lambda.sqrt() * z;
        result.round().max(0.0) as u32
    }
}
