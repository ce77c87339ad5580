pub mod collision;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod grid;
pub mod integrator;
pub mod placement;
pub mod runtime;

pub use collision::{overlaps, resolve_pair, CollisionStats, PairSet};
pub use config::{BroadPhaseKind, ConfigError, OutOfRangePolicy, SimConfig};
pub use diagnostics::{format_runtime_error, max_position_divergence, EnergyMonitor};
pub use engine::{Particle, Viewport, World};
pub use grid::{CellRange, GridError, UniformGrid};
pub use placement::{place_particles, seeded_rng, PlacementError};
pub use runtime::{step_simulation, FrameReport, SimError, Simulation};

// Test helpers module (public for integration tests)
// Always compiled - integration tests are separate crates and need access
pub mod tests;
