//! Wall bounce keeps every disc in the viewport, up to one frame of overshoot

use discsim_core::tests::test_helpers::small_config;
use discsim_core::{step_simulation, OutOfRangePolicy, SimConfig, Simulation};

#[test]
fn test_particles_stay_inside_viewport() {
    let config = SimConfig {
        width: 400,
        height: 300,
        speed: 60.0,
        ..small_config(300, 12)
    };
    assert_eq!(config.out_of_range, OutOfRangePolicy::Fail);
    let (w, h, r) = (config.width as f32, config.height as f32, config.radius);
    let dt = 1.0 / 60.0;
    let mut sim = Simulation::new(config).unwrap();

    for _ in 0..600 {
        let report = step_simulation(&mut sim, dt).expect("no particle should escape the grid");
        assert_eq!(report.clamped, 0);

        // One step of travel plus a de-penetration push.
        let tol = report.energy.sqrt() as f32 * dt + 2.0 * r;
        for p in sim.particles() {
            assert!(p.pos.x >= r - tol && p.pos.x <= w - r + tol, "x = {}", p.pos.x);
            assert!(p.pos.y >= r - tol && p.pos.y <= h - r + tol, "y = {}", p.pos.y);
        }
    }
}

#[test]
fn test_tangential_slide_along_wall() {
    use discsim_core::Particle;
    use glam::Vec2;

    // Embedded in the top wall, sliding right.
    let particles = vec![Particle::new(Vec2::new(50.0, 2.0), Vec2::new(20.0, 0.0), 3.0)];
    let mut sim = Simulation::from_particles(particles, small_config(0, 1)).unwrap();
    step_simulation(&mut sim, 0.1).unwrap();
    let p = sim.particles()[0];
    assert_eq!(p.vel, Vec2::new(20.0, 0.0));
    assert_eq!(p.pos, Vec2::new(52.0, 2.0));
}
