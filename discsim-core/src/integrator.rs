use crate::engine::{Particle, Viewport};

/// Point the velocity back inside the viewport for every wall the disc has
/// crossed.
///
/// The component's sign is forced rather than flipped, so a disc that is
/// still embedded in a wall on the next frame keeps heading inwards instead
/// of oscillating, and the tangential component is never touched.
pub fn bounce_off_walls(particle: &mut Particle, viewport: Viewport) {
    let (min, max) = particle.bounds();
    let size = viewport.size();

    if min.x < 0.0 {
        particle.vel.x = particle.vel.x.abs();
    }
    if min.y < 0.0 {
        particle.vel.y = particle.vel.y.abs();
    }
    if max.x > size.x {
        particle.vel.x = -particle.vel.x.abs();
    }
    if max.y > size.y {
        particle.vel.y = -particle.vel.y.abs();
    }
}

/// Advance every position by one explicit Euler step
pub fn integrate(particles: &mut [Particle], dt: f32) {
    for particle in particles {
        particle.pos += particle.vel * dt;
    }
}
