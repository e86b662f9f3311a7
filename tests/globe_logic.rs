//! End-to-end tests for the headless globe.
//!
//! These drive [`SnowGlobe`](snowglobe::SnowGlobe) through the public API
//! alone, in the same call order the windowed viewer uses, and follow whole
//! interactions across many frames: the celebration story, the party
//! pulse, snow containment, and camera handling.

use snowglobe::interaction::PARTY_TICK;
use snowglobe::scene::BODY_NODE;
use snowglobe::{DomeMaterial, Phase, SkyVariant, SnowGlobe, Vec2, Vec3};
use std::time::{Duration, Instant};

const FRAME: Duration = Duration::from_millis(16);

fn seeded_globe() -> SnowGlobe {
    SnowGlobe::new(5_000, Some(99))
}

/// Project a world point through the globe's camera to its screen pixel.
fn pixel_over(globe: &SnowGlobe, point: Vec3) -> Vec2 {
    let ndc = globe.camera().view_projection().project_point3(point);
    let (width, height) = globe.surface_size();
    Vec2::new(
        (ndc.x + 1.0) * 0.5 * width as f32,
        (1.0 - ndc.y) * 0.5 * height as f32,
    )
}

/// Screen pixel over the snowman's base sphere, located through the scene
/// graph rather than hard-coded.
fn snowman_pixel(globe: &SnowGlobe) -> Vec2 {
    let mut base = None;
    globe.world().visit(&mut |node, world| {
        if node.name == BODY_NODE {
            base = Some(world.transform_point3(Vec3::ZERO));
        }
    });
    pixel_over(globe, base.expect("snowman base sphere present"))
}

// ============================================================================
// Celebration Flow
// ============================================================================

#[test]
fn test_click_on_snowman_fires_the_full_celebration() {
    let mut globe = seeded_globe();
    let now = Instant::now();

    assert!(globe.pointer_clicked(snowman_pixel(&globe), now));
    assert_eq!(globe.phase(), Phase::Celebrating);
    assert!(globe.party_active());
    assert_eq!(globe.sky(), SkyVariant::Night);

    // The recolor is flagged exactly once for the renderer to pick up.
    assert!(globe.take_colors_dirty());
    assert!(!globe.take_colors_dirty());
    assert!(globe.field().colors().iter().any(|c| *c != Vec3::ONE));
}

#[test]
fn test_party_pulse_walks_the_bloom_strength() {
    let mut globe = seeded_globe();
    let t0 = Instant::now();
    assert!(globe.pointer_clicked(snowman_pixel(&globe), t0));

    // From the default 0.5, each 100 ms tick applies (s + 3) % 4.
    let mut observed = Vec::new();
    for tick in 1..=4 {
        globe.advance_frame(t0 + PARTY_TICK * tick);
        observed.push(globe.bloom().strength);
    }
    assert_eq!(observed, vec![3.5, 2.5, 1.5, 0.5]);
}

#[test]
fn test_second_click_calms_the_party_and_a_third_revives_it() {
    let mut globe = seeded_globe();
    let pixel = snowman_pixel(&globe);
    let t0 = Instant::now();

    assert!(globe.pointer_clicked(pixel, t0));
    globe.advance_frame(t0 + PARTY_TICK);
    assert!((globe.bloom().strength - 3.5).abs() < 1e-6);

    // Second qualifying click: the celebration refires, the pulse stops.
    assert!(globe.pointer_clicked(pixel, t0 + Duration::from_millis(150)));
    assert!(!globe.party_active());
    assert_eq!(globe.phase(), Phase::Celebrating);
    assert_eq!(globe.sky(), SkyVariant::Night);
    assert!(globe.take_colors_dirty());

    globe.advance_frame(t0 + Duration::from_secs(2));
    assert!((globe.bloom().strength - 3.5).abs() < 1e-6);

    // Third click re-arms the pulse from the frozen strength.
    let t1 = t0 + Duration::from_secs(3);
    assert!(globe.pointer_clicked(pixel, t1));
    assert!(globe.party_active());
    globe.advance_frame(t1 + PARTY_TICK);
    assert!((globe.bloom().strength - 2.5).abs() < 1e-6);
}

#[test]
fn test_celebration_hops_the_snowman_and_settles() {
    let mut globe = seeded_globe();
    let rest = globe
        .world()
        .find(BODY_NODE)
        .expect("snowman base sphere present")
        .transform;

    let t0 = Instant::now();
    assert!(globe.pointer_clicked(snowman_pixel(&globe), t0));

    // Thirty frames in, the first hop has the body off the ground.
    for i in 1..=30 {
        globe.advance_frame(t0 + FRAME * i);
    }
    let lifted = globe.world().find(BODY_NODE).unwrap().transform;
    assert!(lifted.translation.y > rest.translation.y + 1.0);

    // Long after the clip's two seconds, the body is back at rest. The
    // poses compare as matrices since the final full turn lands on the
    // opposite quaternion cover.
    for i in 31..=230 {
        globe.advance_frame(t0 + FRAME * i);
    }
    let settled = globe.world().find(BODY_NODE).unwrap().transform;
    let settled_m = settled.matrix().to_cols_array();
    let rest_m = rest.matrix().to_cols_array();
    for (a, b) in settled_m.iter().zip(rest_m.iter()) {
        assert!((a - b).abs() < 1e-3);
    }
}

#[test]
fn test_click_into_empty_space_changes_nothing() {
    let mut globe = seeded_globe();

    assert!(!globe.pointer_clicked(Vec2::new(4.0, 4.0), Instant::now()));
    assert_eq!(globe.phase(), Phase::Idle);
    assert_eq!(globe.sky(), SkyVariant::Sunset);
    assert!(!globe.party_active());
    assert!(!globe.take_colors_dirty());
    assert!(globe.field().colors().iter().all(|c| *c == Vec3::ONE));
}

// ============================================================================
// Hover
// ============================================================================

#[test]
fn test_hover_swaps_the_dome_material_in_any_phase() {
    let mut globe = seeded_globe();
    let (width, height) = globe.surface_size();
    let center = Vec2::new(width as f32 / 2.0, height as f32 / 2.0);
    let corner = Vec2::ZERO;

    globe.pointer_moved(center);
    assert_eq!(globe.dome_material(), DomeMaterial::Shimmer);
    assert_eq!(globe.phase(), Phase::Hovering);

    globe.pointer_moved(corner);
    assert_eq!(globe.dome_material(), DomeMaterial::Glass);
    assert_eq!(globe.phase(), Phase::Idle);

    // Hover keeps working after the celebration without leaving the phase.
    assert!(globe.pointer_clicked(snowman_pixel(&globe), Instant::now()));
    globe.pointer_moved(center);
    assert_eq!(globe.dome_material(), DomeMaterial::Shimmer);
    assert_eq!(globe.phase(), Phase::Celebrating);

    globe.pointer_moved(corner);
    assert_eq!(globe.dome_material(), DomeMaterial::Glass);
    assert_eq!(globe.phase(), Phase::Celebrating);
}

// ============================================================================
// Snow Containment
// ============================================================================

#[test]
fn test_snow_never_escapes_the_dome() {
    let mut globe = seeded_globe();
    let radius = globe.field().radius();
    let count = globe.field().len();
    assert!(count > 0);

    let t0 = Instant::now();
    for i in 1..=300 {
        globe.advance_frame(t0 + FRAME * i);
        for position in globe.field().positions() {
            assert!(position.length() <= radius);
        }
    }
    assert_eq!(globe.field().len(), count);
}

#[test]
fn test_snowfall_keeps_moving_with_fixed_speeds() {
    let mut globe = seeded_globe();
    let before = globe.field().positions().to_vec();
    let speeds = globe.field().velocities().to_vec();

    let t0 = Instant::now();
    for i in 1..=10 {
        globe.advance_frame(t0 + FRAME * i);
    }
    assert_ne!(globe.field().positions(), &before[..]);
    assert_eq!(globe.field().velocities(), &speeds[..]);
}

// ============================================================================
// Camera, Resize and Determinism
// ============================================================================

#[test]
fn test_orbit_and_zoom_change_the_view() {
    let mut globe = seeded_globe();

    let framed = globe.camera().view_projection();
    globe.orbit(Vec2::new(35.0, 10.0));
    let orbited = globe.camera().view_projection();
    assert_ne!(framed, orbited);

    globe.zoom(3.0);
    assert_ne!(orbited, globe.camera().view_projection());
}

#[test]
fn test_click_still_lands_after_resize() {
    let mut globe = seeded_globe();
    globe.resize(1920, 1080);

    assert!(globe.pointer_clicked(snowman_pixel(&globe), Instant::now()));
    assert_eq!(globe.phase(), Phase::Celebrating);
}

#[test]
fn test_zero_size_resize_is_harmless() {
    // A minimized window reports a zero surface; pointer math degrades to
    // misses instead of panicking.
    let mut globe = seeded_globe();
    globe.resize(0, 0);

    globe.pointer_moved(Vec2::new(10.0, 10.0));
    assert!(!globe.pointer_clicked(Vec2::new(10.0, 10.0), Instant::now()));
    globe.advance_frame(Instant::now());
    assert_eq!(globe.phase(), Phase::Idle);
    assert_eq!(globe.dome_material(), DomeMaterial::Glass);
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let mut a = SnowGlobe::new(3_000, Some(5));
    let mut b = SnowGlobe::new(3_000, Some(5));
    assert_eq!(a.field().positions(), b.field().positions());

    let t0 = Instant::now();
    for i in 1..=50 {
        a.advance_frame(t0 + FRAME * i);
        b.advance_frame(t0 + FRAME * i);
    }
    assert_eq!(a.field().positions(), b.field().positions());
    assert_eq!(a.field().velocities(), b.field().velocities());
}
