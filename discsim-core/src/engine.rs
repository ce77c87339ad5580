use glam::Vec2;

/// A disc in the simulation, identified by its index in `World::particles`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

impl Particle {
    pub fn new(pos: Vec2, vel: Vec2, radius: f32) -> Self {
        Self { pos, vel, radius }
    }

    /// Axis-aligned bounding square as (min, max) corners
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let extent = Vec2::splat(self.radius);
        (self.pos - extent, self.pos + extent)
    }
}

/// Simulated area in viewport pixels, origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// True when the whole disc lies inside the viewport
    pub fn contains_disc(&self, particle: &Particle) -> bool {
        let (min, max) = particle.bounds();
        let size = self.size();
        min.x >= 0.0 && min.y >= 0.0 && max.x <= size.x && max.y <= size.y
    }
}

/// The particle store. Its length is fixed once the simulation is built.
#[derive(Debug, Clone)]
pub struct World {
    pub particles: Vec<Particle>,
    pub viewport: Viewport,
}

impl World {
    pub fn new(particles: Vec<Particle>, viewport: Viewport) -> Self {
        Self {
            particles,
            viewport,
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Sum of squared speeds (unit mass, no 1/2 factor)
    pub fn kinetic_energy(&self) -> f64 {
        self.particles
            .iter()
            .map(|p| p.vel.length_squared() as f64)
            .sum()
    }

    /// Switch to a new viewport, pulling every center back into
    /// `[r, W-r] x [r, H-r]`.
    pub fn confine(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        let size = viewport.size();
        for particle in &mut self.particles {
            let r = particle.radius;
            // A viewport narrower than a diameter pins the disc to its center line.
            let max = (size - Vec2::splat(r)).max(Vec2::splat(r));
            particle.pos = particle.pos.clamp(Vec2::splat(r), max);
        }
    }
}
