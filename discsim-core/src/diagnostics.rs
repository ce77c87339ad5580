//! Diagnostics and error reporting
//!
//! The energy figure is purely observational: nothing feeds it back into
//! the physics.

use crate::engine::Particle;

/// Tracks total kinetic energy against its value at frame 0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyMonitor {
    baseline: f64,
    last: f64,
}

impl EnergyMonitor {
    pub fn new(baseline: f64) -> Self {
        Self {
            baseline,
            last: baseline,
        }
    }

    pub fn record(&mut self, energy: f64) {
        self.last = energy;
    }

    pub fn baseline(&self) -> f64 {
        self.baseline
    }

    pub fn last(&self) -> f64 {
        self.last
    }

    /// Relative change since frame 0; zero when the system started at rest
    pub fn drift(&self) -> f64 {
        if self.baseline == 0.0 {
            0.0
        } else {
            (self.last - self.baseline) / self.baseline
        }
    }
}

/// Largest distance between corresponding particles of two runs
pub fn max_position_divergence(a: &[Particle], b: &[Particle]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(p, q)| p.pos.distance(q.pos))
        .fold(0.0, f32::max)
}

/// Format an error and its sources on one line
pub fn format_runtime_error(error: &dyn std::error::Error) -> String {
    let mut msg = format!("Runtime error: {}", error);
    let mut source = error.source();
    while let Some(cause) = source {
        msg.push_str(&format!(": {}", cause));
        source = cause.source();
    }
    msg
}
