//! Rejection-sampling initial placement
//!
//! Each candidate disc gets a uniformly random center inside the viewport
//! interior and a uniformly random heading at a fixed speed. A candidate is
//! kept only if it overlaps none of the discs accepted before it, so the cost
//! is O(n) per attempt. Callers pick `n` and `r` so that a packing is
//! plausible; a hopeless combination surfaces as `PlacementError::Infeasible`
//! once a single disc exhausts its attempt budget.

use crate::collision::overlaps;
use crate::engine::{Particle, Viewport};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PlacementError {
    #[error(
        "could not place particle {placed} of {requested} after {attempts} attempts; \
         the viewport is too crowded for this count and radius"
    )]
    Infeasible {
        placed: usize,
        requested: usize,
        attempts: u32,
    },
    #[error("viewport {width}x{height} has no room for a disc of radius {radius}")]
    ViewportTooSmall { width: u32, height: u32, radius: f32 },
}

/// Deterministic generator for a seed, OS entropy otherwise
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Place `count` non-overlapping discs of radius `radius` moving at `speed`
pub fn place_particles<R: Rng>(
    rng: &mut R,
    viewport: Viewport,
    count: usize,
    radius: f32,
    speed: f32,
    max_attempts: u32,
) -> Result<Vec<Particle>, PlacementError> {
    let size = viewport.size();
    let max = size - Vec2::splat(radius);
    if max.x < radius || max.y < radius {
        return Err(PlacementError::ViewportTooSmall {
            width: viewport.width,
            height: viewport.height,
            radius,
        });
    }

    let mut particles: Vec<Particle> = Vec::with_capacity(count);
    let mut total_attempts: u64 = 0;

    for index in 0..count {
        let mut accepted = None;
        for _ in 0..max_attempts {
            total_attempts += 1;
            let candidate = sample_candidate(rng, radius, max, speed);
            if !particles.iter().any(|other| overlaps(&candidate, other)) {
                accepted = Some(candidate);
                break;
            }
        }

        match accepted {
            Some(particle) => particles.push(particle),
            None => {
                tracing::warn!(
                    placed = index,
                    requested = count,
                    max_attempts,
                    "placement gave up"
                );
                return Err(PlacementError::Infeasible {
                    placed: index,
                    requested: count,
                    attempts: max_attempts,
                });
            }
        }
    }

    tracing::info!(count, total_attempts, "placed particles");
    Ok(particles)
}

fn sample_candidate<R: Rng>(rng: &mut R, radius: f32, max: Vec2, speed: f32) -> Particle {
    let pos = Vec2::new(
        rng.gen_range(radius..=max.x),
        rng.gen_range(radius..=max.y),
    );
    let heading: f32 = rng.gen_range(0.0..TAU);
    Particle::new(pos, Vec2::from_angle(heading) * speed, radius)
}
