//! Narrow phase and pair resolution
//!
//! Both broad phases feed the same resolver, in ascending `(i, j)` order, so a
//! grid run and a naive run agree whenever the grid finds every overlapping
//! pair.

use crate::engine::Particle;
use crate::grid::UniformGrid;
use glam::Vec2;

/// Counters for one resolution pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionStats {
    /// Pairs handed to the narrow phase
    pub candidates: usize,
    /// Pairs that overlapped and were resolved
    pub collisions: usize,
}

/// Set of unordered particle pairs collected during one frame.
///
/// A pair that shares several grid cells is inserted once per shared cell;
/// `finish` collapses those so each pair is resolved at most once.
#[derive(Debug, Clone, Default)]
pub struct PairSet {
    pairs: Vec<(usize, usize)>,
}

impl PairSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, a: usize, b: usize) {
        if a != b {
            self.pairs.push((a.min(b), a.max(b)));
        }
    }

    pub fn clear(&mut self) {
        self.pairs.clear();
    }

    /// Sort and deduplicate, returning the distinct pairs in ascending order
    pub fn finish(&mut self) -> &[(usize, usize)] {
        self.pairs.sort_unstable();
        self.pairs.dedup();
        &self.pairs
    }
}

/// Circles overlap or touch
pub fn overlaps(a: &Particle, b: &Particle) -> bool {
    let reach = a.radius + b.radius;
    a.pos.distance_squared(b.pos) <= reach * reach
}

/// Separate and bounce an overlapping pair. Returns false if they don't touch.
///
/// Each disc is pushed back by half the overlap along the line of centers,
/// then the normal components of their velocities are exchanged (equal-mass
/// elastic collision). The impulse is applied whatever the sign of the
/// normal velocity.
pub fn resolve_pair(a: &mut Particle, b: &mut Particle) -> bool {
    if !overlaps(a, b) {
        return false;
    }

    let delta = b.pos - a.pos;
    let distance = delta.length();
    // Coincident centers have no contact direction; pick +X.
    let normal = if distance > 0.0 { delta / distance } else { Vec2::X };

    let overlap = (a.radius + b.radius) - distance;
    let correction = normal * (overlap * 0.5);
    a.pos -= correction;
    b.pos += correction;

    let velocity_along_normal = (a.vel - b.vel).dot(normal);
    let impulse = normal * velocity_along_normal;
    a.vel -= impulse;
    b.vel += impulse;

    true
}

/// Resolve pair `(i, j)` in place; `i` must be less than `j`
pub fn resolve_indices(particles: &mut [Particle], i: usize, j: usize) -> bool {
    debug_assert!(i < j, "pair ({i}, {j}) out of order");
    let (head, tail) = particles.split_at_mut(j);
    resolve_pair(&mut head[i], &mut tail[0])
}

/// All-pairs baseline
pub fn resolve_naive(particles: &mut [Particle]) -> CollisionStats {
    let mut stats = CollisionStats::default();
    let n = particles.len();
    for i in 0..n {
        for j in i + 1..n {
            stats.candidates += 1;
            if resolve_indices(particles, i, j) {
                stats.collisions += 1;
            }
        }
    }
    stats
}

/// Resolve every distinct pair that shares a cell in `grid`.
///
/// `pairs` is scratch space reused across frames.
pub fn resolve_grid(
    particles: &mut [Particle],
    grid: &UniformGrid,
    pairs: &mut PairSet,
) -> CollisionStats {
    pairs.clear();
    grid.candidate_pairs(pairs);

    let mut stats = CollisionStats::default();
    for &(i, j) in pairs.finish() {
        stats.candidates += 1;
        if resolve_indices(particles, i, j) {
            stats.collisions += 1;
        }
    }
    stats
}
