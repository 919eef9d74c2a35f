// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Relay Chain Simulation Suite

pub mod config;
pub mod error;
pub mod types;
pub mod geometry;
pub mod pool;
pub mod events;
pub mod topology;
pub mod lifecycle;
pub mod routing;
pub mod simulation;

#[cfg(test)]
mod testing;

pub use config::RelayConfig;
pub use error::{ConfigError, RelayError};
pub use events::{EventLog, RelayEvent};
pub use pool::{LinkFault, NodePool};
pub use simulation::RelaySimulation;
pub use types::*;

use serde::Serialize;
use wasm_bindgen::prelude::*;

// ─── WASM Interface ──────────────────────────────────────────────────────────

/// Result envelope handed to the JS display layer.
#[derive(Serialize)]
struct JsOutcome<T: Serialize> {
    ok: bool,
    value: Option<T>,
    error: Option<String>,
}

fn outcome_to_js<T: Serialize>(result: Result<T, RelayError>) -> JsValue {
    let outcome = match result {
        Ok(value) => JsOutcome { ok: true, value: Some(value), error: None },
        Err(e) => JsOutcome { ok: false, value: None, error: Some(e.to_string()) },
    };
    serde_wasm_bindgen::to_value(&outcome).unwrap_or(JsValue::NULL)
}

#[wasm_bindgen]
impl RelaySimulation {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> Self {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        RelaySimulation::seeded(seed)
    }

    pub fn add_site(&mut self, x: i32, y: i32) -> JsValue {
        outcome_to_js(self.register_site(Point::new(x, y)))
    }

    /// Run N simulated minutes and return the per-tick reports.
    pub fn simulate_minutes(&mut self, minutes: u32) -> JsValue {
        let reports = self.advance_time(minutes as u64);
        serde_wasm_bindgen::to_value(&reports).unwrap_or(JsValue::NULL)
    }

    pub fn send_from(&mut self, x: i32, y: i32) -> JsValue {
        outcome_to_js(self.send_packet(Point::new(x, y)))
    }

    /// Send a message from a random grid point.
    pub fn send_random(&mut self) -> JsValue {
        let origin = self.random_point();
        outcome_to_js(self.send_packet(origin))
    }

    pub fn get_nodes(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.nodes()).unwrap_or(JsValue::NULL)
    }

    pub fn get_sites(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.sites()).unwrap_or(JsValue::NULL)
    }

    pub fn get_relay_table(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.relay_table()).unwrap_or(JsValue::NULL)
    }

    pub fn get_stats(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.stats()).unwrap_or(JsValue::NULL)
    }

    /// Drain the event stream as display strings.
    pub fn take_event_log(&mut self) -> Vec<String> {
        self.drain_events().iter().map(|e| e.to_string()).collect()
    }

    /// Reset simulation to its initial state, keeping config and seed.
    pub fn reset(&mut self) {
        *self = RelaySimulation::build(self.config.clone(), self.seed);
    }
}
