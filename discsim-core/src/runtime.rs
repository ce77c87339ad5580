use crate::collision::{resolve_grid, resolve_naive, CollisionStats, PairSet};
use crate::config::{BroadPhaseKind, ConfigError, SimConfig};
use crate::diagnostics::EnergyMonitor;
use crate::engine::{Particle, Viewport, World};
use crate::grid::{GridError, UniformGrid};
use crate::integrator::{bounce_off_walls, integrate};
use crate::placement::{place_particles, seeded_rng, PlacementError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Placement(#[from] PlacementError),
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// What one frame produced, besides the updated positions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Frames completed so far, this one included
    pub frame: u64,
    /// Sum of squared speeds after the frame
    pub energy: f64,
    pub candidates: usize,
    pub collisions: usize,
    /// Particles folded into the grid under `OutOfRangePolicy::Clamp`
    pub clamped: usize,
}

/// Particle store plus the grid built from its positions at the end of the
/// last frame
#[derive(Debug)]
pub struct Simulation {
    pub world: World,
    pub grid: UniformGrid,
    pub config: SimConfig,
    pub current_frame: u64,
    pub energy: EnergyMonitor,
    pairs: PairSet,
}

impl Simulation {
    /// Place `config.particle_count` discs and index them
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        let viewport = Viewport::new(config.width, config.height);
        let mut rng = seeded_rng(config.seed);
        let particles = place_particles(
            &mut rng,
            viewport,
            config.particle_count,
            config.radius,
            config.speed,
            config.max_placement_attempts,
        )?;
        Self::from_particles(particles, config)
    }

    /// Start from an explicit particle set. `config.particle_count`,
    /// `radius` and `speed` are not used for placement but must still be valid.
    pub fn from_particles(particles: Vec<Particle>, config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        let viewport = Viewport::new(config.width, config.height);
        let world = World::new(particles, viewport);
        let mut grid = UniformGrid::new(config.grid_rows, config.grid_cols, viewport);
        grid.rebuild(&world.particles, config.out_of_range)?;
        let energy = EnergyMonitor::new(world.kinetic_energy());

        tracing::info!(
            particles = world.len(),
            width = viewport.width,
            height = viewport.height,
            rows = config.grid_rows,
            cols = config.grid_cols,
            broad_phase = ?config.broad_phase,
            "simulation ready"
        );

        Ok(Self {
            world,
            grid,
            config,
            current_frame: 0,
            energy,
            pairs: PairSet::new(),
        })
    }

    pub fn particles(&self) -> &[Particle] {
        &self.world.particles
    }

    /// Adopt a new viewport: particles are pulled inside it and the grid is
    /// resized and rebuilt. Returns the number of clamped particles.
    pub fn resize(&mut self, viewport: Viewport) -> Result<usize, SimError> {
        if viewport == self.world.viewport {
            return Ok(0);
        }
        tracing::debug!(width = viewport.width, height = viewport.height, "viewport resized");
        self.world.confine(viewport);
        self.config.width = viewport.width;
        self.config.height = viewport.height;
        self.grid.resize(viewport);
        Ok(self.grid.rebuild(&self.world.particles, self.config.out_of_range)?)
    }
}

/// Advance the simulation by `dt` seconds.
///
/// Order within a frame: wall bounce, collision resolution against the grid
/// from the previous frame, integration, energy, grid rebuild. The naive
/// broad phase keeps no grid and skips the rebuild.
pub fn step_simulation(sim: &mut Simulation, dt: f32) -> Result<FrameReport, SimError> {
    let viewport = sim.world.viewport;
    for particle in &mut sim.world.particles {
        bounce_off_walls(particle, viewport);
    }

    let stats: CollisionStats = match sim.config.broad_phase {
        BroadPhaseKind::Grid => resolve_grid(&mut sim.world.particles, &sim.grid, &mut sim.pairs),
        BroadPhaseKind::Naive => resolve_naive(&mut sim.world.particles),
    };

    integrate(&mut sim.world.particles, dt);
    let energy = sim.world.kinetic_energy();

    let clamped = match sim.config.broad_phase {
        BroadPhaseKind::Grid => sim
            .grid
            .rebuild(&sim.world.particles, sim.config.out_of_range)?,
        BroadPhaseKind::Naive => 0,
    };

    sim.current_frame += 1;
    sim.energy.record(energy);
    tracing::debug!(
        frame = sim.current_frame,
        energy,
        collisions = stats.collisions,
        candidates = stats.candidates,
        "frame"
    );
    if energy_log_due(sim.current_frame, sim.config.energy_log_interval) {
        tracing::info!(
            frame = sim.current_frame,
            energy,
            drift = sim.energy.drift(),
            "energy"
        );
    }

    Ok(FrameReport {
        frame: sim.current_frame,
        energy,
        candidates: stats.candidates,
        collisions: stats.collisions,
        clamped,
    })
}

fn energy_log_due(frame: u64, interval: u64) -> bool {
    interval != 0 && frame % interval == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutOfRangePolicy;
    use crate::tests::test_helpers::{approx_eq_f32, first_overlap, small_config};
    use glam::Vec2;

    #[test]
    fn test_new_places_requested_count() {
        let sim = Simulation::new(small_config(120, 11)).unwrap();
        assert_eq!(sim.particles().len(), 120);
        assert_eq!(sim.current_frame, 0);
        assert!(sim.energy.baseline() > 0.0);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = small_config(10, 1);
        config.grid_rows = 0;
        assert!(matches!(Simulation::new(config), Err(SimError::Config(_))));
    }

    #[test]
    fn test_from_particles_rejects_invalid_config() {
        let particles = vec![Particle::new(Vec2::new(50.0, 50.0), Vec2::ZERO, 3.0)];
        for config in [
            SimConfig { grid_rows: 0, ..small_config(0, 1) },
            SimConfig { grid_cols: 0, ..small_config(0, 1) },
            SimConfig { width: 0, ..small_config(0, 1) },
        ] {
            assert!(matches!(
                Simulation::from_particles(particles.clone(), config),
                Err(SimError::Config(ConfigError::Invalid(_)))
            ));
        }
    }

    #[test]
    fn test_placing_into_resized_viewport_keeps_discs_apart() {
        let config = small_config(150, 1);
        let canvas = Viewport::new(200, 70);

        // Shrinking after placement squeezes discs onto the new wall.
        let mut squeezed = Simulation::new(config.clone()).unwrap();
        squeezed.resize(canvas).unwrap();
        assert!(first_overlap(squeezed.particles()).is_some());

        let sim = Simulation::new(config.with_viewport(canvas)).unwrap();
        assert_eq!(sim.world.viewport, canvas);
        assert_eq!(first_overlap(sim.particles()), None);
        assert!(sim.particles().iter().all(|p| canvas.contains_disc(p)));
    }

    #[test]
    fn test_energy_log_interval() {
        assert!(energy_log_due(60, 60));
        assert!(energy_log_due(120, 60));
        assert!(!energy_log_due(59, 60));
        assert!(!energy_log_due(60, 0));
        assert!(energy_log_due(1, 1));
    }

    #[test]
    fn test_new_reports_infeasible_packing() {
        let mut config = small_config(10_000, 1);
        config.width = 40;
        config.height = 40;
        config.max_placement_attempts = 50;
        assert!(matches!(
            Simulation::new(config),
            Err(SimError::Placement(PlacementError::Infeasible { .. }))
        ));
    }

    #[test]
    fn test_step_counts_frames_and_moves_particles() {
        let config = small_config(0, 1);
        let particles = vec![Particle::new(Vec2::new(50.0, 50.0), Vec2::new(10.0, 0.0), 3.0)];
        let mut sim = Simulation::from_particles(particles, config).unwrap();
        let report = step_simulation(&mut sim, 0.5).unwrap();
        assert_eq!(report.frame, 1);
        assert_eq!(report.energy, 100.0);
        assert_eq!(sim.particles()[0].pos, Vec2::new(55.0, 50.0));
    }

    #[test]
    fn test_escape_fails_under_fail_policy() {
        let config = small_config(0, 1);
        let particles = vec![Particle::new(Vec2::new(50.0, 50.0), Vec2::new(1.0e6, 0.0), 3.0)];
        let mut sim = Simulation::from_particles(particles, config).unwrap();
        let err = step_simulation(&mut sim, 1.0 / 60.0).unwrap_err();
        assert!(matches!(err, SimError::Grid(GridError::CellOutOfRange { particle: 0, .. })));
    }

    #[test]
    fn test_escape_is_clamped_under_clamp_policy() {
        let mut config = small_config(0, 1);
        config.out_of_range = OutOfRangePolicy::Clamp;
        let particles = vec![Particle::new(Vec2::new(50.0, 50.0), Vec2::new(1.0e6, 0.0), 3.0)];
        let mut sim = Simulation::from_particles(particles, config).unwrap();
        let report = step_simulation(&mut sim, 1.0 / 60.0).unwrap();
        assert_eq!(report.clamped, 1);
        assert_eq!(sim.grid.cell(sim.grid.rows() / 2, sim.grid.cols() - 1), &[0]);
    }

    #[test]
    fn test_resize_confines_and_reindexes() {
        let config = small_config(0, 1);
        let particles = vec![Particle::new(Vec2::new(180.0, 90.0), Vec2::ZERO, 3.0)];
        let mut sim = Simulation::from_particles(particles, config).unwrap();
        let clamped = sim.resize(Viewport::new(100, 50)).unwrap();
        assert_eq!(clamped, 0);
        let p = sim.particles()[0];
        assert!(approx_eq_f32(p.pos.x, 97.0, 1e-6));
        assert!(approx_eq_f32(p.pos.y, 47.0, 1e-6));
        assert_eq!(sim.config.width, 100);
        let range = sim.grid.cells_for(0, &p).unwrap();
        assert!(range.iter().all(|(row, col)| sim.grid.cell(row, col) == [0]));
    }
}
