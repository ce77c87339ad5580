//! Initial placement: non-overlap, containment, infeasible packings

use discsim_core::tests::test_helpers::first_overlap;
use discsim_core::{place_particles, seeded_rng, PlacementError, Viewport};

#[test]
fn test_placement_has_no_overlaps() {
    let viewport = Viewport::new(400, 300);
    let particles = place_particles(&mut seeded_rng(Some(2024)), viewport, 500, 3.0, 180.0, 10_000)
        .expect("placement should succeed");

    assert_eq!(particles.len(), 500);
    assert_eq!(first_overlap(&particles), None);
    for (i, p) in particles.iter().enumerate() {
        for q in &particles[i + 1..] {
            assert!(p.pos.distance(q.pos) >= p.radius + q.radius);
        }
    }
}

#[test]
fn test_placement_stays_inside_interior() {
    let viewport = Viewport::new(120, 80);
    let particles = place_particles(&mut seeded_rng(Some(9)), viewport, 60, 4.0, 50.0, 10_000)
        .expect("placement should succeed");

    for p in &particles {
        assert!(p.pos.x >= 4.0 && p.pos.x <= 116.0, "x out of range: {}", p.pos.x);
        assert!(p.pos.y >= 4.0 && p.pos.y <= 76.0, "y out of range: {}", p.pos.y);
        assert!(viewport.contains_disc(p));
    }
}

#[test]
fn test_different_seeds_differ() {
    let viewport = Viewport::new(200, 100);
    let a = place_particles(&mut seeded_rng(Some(1)), viewport, 20, 3.0, 30.0, 1000).unwrap();
    let b = place_particles(&mut seeded_rng(Some(2)), viewport, 20, 3.0, 30.0, 1000).unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_overcrowded_viewport_is_infeasible() {
    // A 30x30 box holds far fewer than 100 discs of radius 3.
    let err = place_particles(&mut seeded_rng(Some(5)), Viewport::new(30, 30), 100, 3.0, 10.0, 200)
        .unwrap_err();
    match err {
        PlacementError::Infeasible {
            placed,
            requested,
            attempts,
        } => {
            assert!(placed < 100);
            assert_eq!(requested, 100);
            assert_eq!(attempts, 200);
        }
        other => panic!("expected Infeasible, got {other:?}"),
    }
}
