use super::*;

use rand::{rngs::SmallRng, SeedableRng};

fn populated_surface(seed: u64) -> ParticleSurface {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut surface = ParticleSurface::new(800, 600);
    surface.populate(&mut rng);
    surface
}

#[test]
fn populate_fills_the_fixed_particle_count() {
    let surface = populated_surface(7);
    assert_eq!(surface.particles().len(), PARTICLE_COUNT);
}

#[test]
fn spawned_particles_start_above_the_fold() {
    let surface = populated_surface(7);
    for particle in surface.particles() {
        assert!(particle.y <= 0.0, "spawned below the top edge: {particle:?}");
        assert!(particle.x >= 0.0 && particle.x < 800.0);
        assert!(particle.size >= 6.0 && particle.size < 14.0);
        assert!(particle.vy >= 3.0 && particle.vy < 7.0);
        assert!(PALETTE.contains(&particle.color));
    }
}

#[test]
fn advance_applies_velocity_and_spin() {
    let mut rng = SmallRng::seed_from_u64(11);
    let mut surface = ParticleSurface::new(800, 600);
    surface.populate(&mut rng);
    let before = surface.particles().to_vec();

    surface.advance(&mut rng);

    // Every particle spawns at or above the top edge, so none can wrap on
    // the first frame.
    for (prev, now) in before.iter().zip(surface.particles()) {
        assert_eq!(now.x, prev.x + prev.vx);
        assert_eq!(now.y, prev.y + prev.vy);
        assert_eq!(now.rotation, prev.rotation + prev.spin);
    }
}

#[test]
fn particles_past_the_bottom_edge_wrap_to_the_top() {
    let mut rng = SmallRng::seed_from_u64(23);
    let mut surface = ParticleSurface::new(800, 600);
    surface.populate(&mut rng);
    surface.particles_mut()[0].y = 601.0;

    surface.advance(&mut rng);

    let wrapped = &surface.particles()[0];
    assert_eq!(wrapped.y, -20.0);
    assert!(wrapped.x >= 0.0 && wrapped.x < 800.0);
}

#[test]
fn resize_tracks_the_viewport_without_dropping_particles() {
    let mut surface = populated_surface(31);
    surface.resize(1920, 1080);
    assert_eq!(surface.size(), (1920, 1080));
    assert_eq!(surface.particles().len(), PARTICLE_COUNT);
}

#[test]
fn clear_empties_the_surface() {
    let mut surface = populated_surface(31);
    surface.clear();
    assert!(surface.particles().is_empty());
}

#[test]
fn triggers_fire_once_and_stay_spent() {
    let mut trigger = ParticleTrigger::default();
    assert!(!trigger.triggered());
    trigger.mark_triggered();
    trigger.mark_triggered();
    assert!(trigger.triggered());
}
