//! Test helper utilities for discsim tests

use crate::collision::overlaps;
use crate::config::{BroadPhaseKind, SimConfig};
use crate::engine::Particle;
use crate::runtime::{step_simulation, FrameReport, SimError, Simulation};
use glam::Vec2;

/// Check if two floating point values are approximately equal within tolerance
pub fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

/// Check if two f32 values are approximately equal within tolerance
pub fn approx_eq_f32(a: f32, b: f32, tol: f32) -> bool {
    (a - b).abs() <= tol
}

/// A 200x100 viewport with a 10x10 grid (20x10 cells) and radius-3 discs
pub fn small_config(particle_count: usize, seed: u64) -> SimConfig {
    SimConfig {
        width: 200,
        height: 100,
        particle_count,
        radius: 3.0,
        speed: 30.0,
        grid_rows: 10,
        grid_cols: 10,
        seed: Some(seed),
        max_placement_attempts: 10_000,
        ..SimConfig::default()
    }
}

/// Two radius-3 discs touching at (13, 10), closing at 10 units/s
pub fn head_on_pair() -> Vec<Particle> {
    vec![
        Particle::new(Vec2::new(10.0, 10.0), Vec2::new(5.0, 0.0), 3.0),
        Particle::new(Vec2::new(16.0, 10.0), Vec2::new(-5.0, 0.0), 3.0),
    ]
}

/// First pair of discs that overlap or touch, if any
pub fn first_overlap(particles: &[Particle]) -> Option<(usize, usize)> {
    for i in 0..particles.len() {
        for j in i + 1..particles.len() {
            if overlaps(&particles[i], &particles[j]) {
                return Some((i, j));
            }
        }
    }
    None
}

/// Step `frames` times with a fixed `dt`
pub fn run_frames(
    sim: &mut Simulation,
    frames: usize,
    dt: f32,
) -> Result<Vec<FrameReport>, SimError> {
    (0..frames).map(|_| step_simulation(sim, dt)).collect()
}

/// Positions after each frame of a run built from `particles`
pub fn trajectory(
    particles: Vec<Particle>,
    config: SimConfig,
    broad_phase: BroadPhaseKind,
    frames: usize,
    dt: f32,
) -> Result<Vec<Vec<Vec2>>, SimError> {
    let mut sim = Simulation::from_particles(
        particles,
        SimConfig {
            broad_phase,
            ..config
        },
    )?;
    let mut positions = Vec::with_capacity(frames);
    for _ in 0..frames {
        step_simulation(&mut sim, dt)?;
        positions.push(sim.particles().iter().map(|p| p.pos).collect());
    }
    Ok(positions)
}
