//! The headless snow globe core.
//!
//! [`SnowGlobe`] owns everything about the running scene that is not GPU
//! state: the node graph, the snow field, the interaction machine,
//! animation, audio, camera and frame clock. The windowed viewer forwards
//! pointer events here and steps it once per redraw; integration tests
//! drive it the same way without opening a window.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Instant;
//!
//! let mut globe = SnowGlobe::new(10_000, None);
//! globe.pointer_moved(Vec2::new(400.0, 300.0));
//! globe.advance_frame(Instant::now());
//! ```

use std::time::Instant;

use glam::Vec2;

use crate::animation::{celebration_clip, star_spin_clip, Mixer, CELEBRATION_CLIP, MIXER_STEP, STAR_SPIN_CLIP};
use crate::audio::Jingle;
use crate::camera::OrbitCamera;
use crate::interaction::{Interaction, Phase};
use crate::picking;
use crate::scene::{build_world, dome_for, Node, Sphere, BODY_NODE, SCENERY_NODE, SNOWMAN_NODE, STAR_NODE};
use crate::snow::SnowField;
use crate::time::FrameClock;
use crate::visuals::{BloomSettings, DomeMaterial, SkyVariant};

/// Snow shell radius used when the scenery has no bounds to derive a
/// dome from.
pub const DEFAULT_SNOW_RADIUS: f32 = 30.0;
/// Dome shimmer time added per rendered frame.
pub const SHIMMER_STEP: f32 = 0.05;

/// Radians of orbit per pixel of drag.
const ORBIT_SENSITIVITY: f32 = 0.005;
/// World units of zoom per scroll line.
const ZOOM_SENSITIVITY: f32 = 3.0;

/// Owned state of the whole scene, independent of any window or GPU.
pub struct SnowGlobe {
    world: Node,
    dome: Option<Sphere>,
    field: SnowField,
    camera: OrbitCamera,
    interaction: Interaction,
    bloom: BloomSettings,
    sky: SkyVariant,
    mixer: Mixer,
    jingle: Jingle,
    clock: FrameClock,
    shimmer_phase: f32,
    surface_size: (u32, u32),
    colors_dirty: bool,
}

impl SnowGlobe {
    /// Build the scene and seed the snow field from entropy.
    ///
    /// `candidates` is the number of snow placement attempts; the accepted
    /// count is lower. Pass a `seed` for reproducible flurries.
    pub fn new(candidates: usize, seed: Option<u64>) -> Self {
        let world = build_world();
        let dome = world.find(SCENERY_NODE).and_then(dome_for);
        let radius = dome.as_ref().map_or(DEFAULT_SNOW_RADIUS, |d| d.radius);

        let field = match seed {
            Some(seed) => SnowField::with_seed(candidates, radius, seed),
            None => SnowField::new(candidates, radius),
        };

        let mut mixer = Mixer::new();
        if let Some(body) = world.find(BODY_NODE) {
            mixer.add(celebration_clip(BODY_NODE, body.transform));
        }
        if let Some(star) = world.find(STAR_NODE) {
            mixer.add(star_spin_clip(STAR_NODE, star.transform));
        }
        mixer.play(STAR_SPIN_CLIP);

        let surface_size = (800, 600);
        let mut camera = OrbitCamera::new();
        camera.set_aspect(surface_size.0, surface_size.1);

        Self {
            world,
            dome,
            field,
            camera,
            interaction: Interaction::new(),
            bloom: BloomSettings::default(),
            sky: SkyVariant::default(),
            mixer,
            jingle: Jingle::new(),
            clock: FrameClock::new(),
            shimmer_phase: 0.0,
            surface_size,
            colors_dirty: false,
        }
    }

    /// Route a pointer movement: hover-test the glass dome and update the
    /// interaction state.
    pub fn pointer_moved(&mut self, pixel: Vec2) {
        let (width, height) = self.surface_size;
        let over = picking::test_hover(pixel, width, height, &self.camera, self.dome.as_ref());
        self.interaction.update_hover(over);
    }

    /// Route a click: hit-test the snowman and, when the click lands and
    /// the celebration clip is ready, fire the whole response. Returns
    /// whether it fired.
    pub fn pointer_clicked(&mut self, pixel: Vec2, now: Instant) -> bool {
        let (width, height) = self.surface_size;
        let hit = picking::test_click(
            pixel,
            width,
            height,
            &self.camera,
            self.world.find(SNOWMAN_NODE),
        );
        let clip_ready = self.mixer.has_clip(CELEBRATION_CLIP);

        if !self.interaction.register_click(hit, clip_ready, now) {
            return false;
        }
        self.mixer.play(CELEBRATION_CLIP);
        self.jingle.play();
        self.field.recolor_all();
        self.colors_dirty = true;
        self.sky = SkyVariant::Night;
        true
    }

    /// Advance one frame of scene time: shimmer, party pulse, snowfall
    /// and animation, in that order.
    pub fn advance_frame(&mut self, now: Instant) {
        self.clock.update();
        self.shimmer_phase += SHIMMER_STEP;
        self.interaction.poll_party(now, &mut self.bloom);
        self.field.advance();

        let world = &mut self.world;
        self.mixer.advance(MIXER_STEP, |target, pose| {
            if let Some(node) = world.find_mut(target) {
                node.transform = pose;
            }
        });
    }

    /// Apply a drag to the orbit camera, in pixels.
    pub fn orbit(&mut self, drag: Vec2) {
        self.camera
            .orbit(-drag.x * ORBIT_SENSITIVITY, -drag.y * ORBIT_SENSITIVITY);
    }

    /// Apply scroll wheel zoom, in lines.
    pub fn zoom(&mut self, scroll: f32) {
        self.camera.zoom(scroll * ZOOM_SENSITIVITY);
    }

    /// Track a surface resize for picking and the camera aspect.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface_size = (width, height);
        self.camera.set_aspect(width, height);
    }

    /// Whether the snow colors changed since the last call.
    pub fn take_colors_dirty(&mut self) -> bool {
        std::mem::take(&mut self.colors_dirty)
    }

    #[inline]
    pub fn world(&self) -> &Node {
        &self.world
    }

    #[inline]
    pub fn dome(&self) -> Option<&Sphere> {
        self.dome.as_ref()
    }

    #[inline]
    pub fn field(&self) -> &SnowField {
        &self.field
    }

    #[inline]
    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    #[inline]
    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.interaction.phase()
    }

    #[inline]
    pub fn party_active(&self) -> bool {
        self.interaction.party_active()
    }

    #[inline]
    pub fn dome_material(&self) -> DomeMaterial {
        self.interaction.dome_material()
    }

    #[inline]
    pub fn bloom(&self) -> BloomSettings {
        self.bloom
    }

    #[inline]
    pub fn bloom_mut(&mut self) -> &mut BloomSettings {
        &mut self.bloom
    }

    #[inline]
    pub fn sky(&self) -> SkyVariant {
        self.sky
    }

    /// Select the sky variant directly, as the control panel does.
    pub fn set_sky(&mut self, sky: SkyVariant) {
        self.sky = sky;
    }

    #[inline]
    pub fn shimmer_phase(&self) -> f32 {
        self.shimmer_phase
    }

    #[inline]
    pub fn surface_size(&self) -> (u32, u32) {
        self.surface_size
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.clock.fps()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use std::time::Duration;

    fn test_globe() -> SnowGlobe {
        SnowGlobe::new(2_000, Some(7))
    }

    /// Screen pixel that projects onto the given world point.
    fn pixel_over(globe: &SnowGlobe, point: Vec3) -> Vec2 {
        let ndc = globe.camera().view_projection().project_point3(point);
        let (width, height) = globe.surface_size();
        Vec2::new(
            (ndc.x + 1.0) * 0.5 * width as f32,
            (1.0 - ndc.y) * 0.5 * height as f32,
        )
    }

    /// World center of the snowman's base sphere.
    fn snowman_pixel(globe: &SnowGlobe) -> Vec2 {
        pixel_over(globe, Vec3::new(0.0, -16.0, 5.0))
    }

    #[test]
    fn test_new_globe_starts_idle_at_sunset() {
        let mut globe = test_globe();
        assert_eq!(globe.phase(), Phase::Idle);
        assert_eq!(globe.sky(), SkyVariant::Sunset);
        assert_eq!(globe.dome_material(), DomeMaterial::Glass);
        assert!(!globe.party_active());
        assert!(!globe.take_colors_dirty());
        assert!(globe.dome().is_some());
        assert!(globe.field().len() > 0);
    }

    #[test]
    fn test_snow_shell_matches_dome() {
        let globe = test_globe();
        let dome = globe.dome().copied();
        assert!(dome.is_some());
        if let Some(dome) = dome {
            assert_eq!(globe.field().radius(), dome.radius);
        }
    }

    #[test]
    fn test_click_on_snowman_celebrates() {
        let mut globe = test_globe();
        let pixel = snowman_pixel(&globe);
        let now = Instant::now();

        assert!(globe.pointer_clicked(pixel, now));
        assert_eq!(globe.phase(), Phase::Celebrating);
        assert!(globe.party_active());
        assert_eq!(globe.sky(), SkyVariant::Night);
        assert!(globe.take_colors_dirty());
    }

    #[test]
    fn test_click_into_empty_space_is_ignored() {
        let mut globe = test_globe();
        let now = Instant::now();

        assert!(!globe.pointer_clicked(Vec2::new(5.0, 5.0), now));
        assert_eq!(globe.phase(), Phase::Idle);
        assert_eq!(globe.sky(), SkyVariant::Sunset);
        assert!(!globe.take_colors_dirty());
    }

    #[test]
    fn test_second_click_stops_party_but_keeps_night() {
        let mut globe = test_globe();
        let pixel = snowman_pixel(&globe);
        let t0 = Instant::now();

        assert!(globe.pointer_clicked(pixel, t0));
        globe.advance_frame(t0 + Duration::from_millis(150));
        assert!((globe.bloom().strength - 3.5).abs() < 1e-6);

        // The second click re-fires everything except the pulse, which
        // toggles off and freezes the strength where it stands.
        assert!(globe.pointer_clicked(pixel, t0 + Duration::from_millis(200)));
        assert!(!globe.party_active());
        assert_eq!(globe.sky(), SkyVariant::Night);
        assert!(globe.take_colors_dirty());

        globe.advance_frame(t0 + Duration::from_millis(500));
        assert!((globe.bloom().strength - 3.5).abs() < 1e-6);
    }

    #[test]
    fn test_hover_over_dome_swaps_material() {
        let mut globe = test_globe();

        // Center of the view looks straight at the origin-centered dome.
        globe.pointer_moved(Vec2::new(400.0, 300.0));
        assert_eq!(globe.dome_material(), DomeMaterial::Shimmer);
        assert_eq!(globe.phase(), Phase::Hovering);

        // The screen corner looks past it.
        globe.pointer_moved(Vec2::new(0.0, 0.0));
        assert_eq!(globe.dome_material(), DomeMaterial::Glass);
        assert_eq!(globe.phase(), Phase::Idle);
    }

    #[test]
    fn test_ambient_star_spin_runs_from_startup() {
        let mut globe = test_globe();
        let initial = globe
            .world()
            .find(STAR_NODE)
            .map(|node| node.transform.rotation);

        let now = Instant::now();
        for i in 0..60 {
            globe.advance_frame(now + Duration::from_millis(i * 16));
        }
        let spun = globe
            .world()
            .find(STAR_NODE)
            .map(|node| node.transform.rotation);
        assert!(initial.is_some());
        assert_ne!(initial, spun);
    }

    #[test]
    fn test_shimmer_phase_advances_per_frame() {
        let mut globe = test_globe();
        let now = Instant::now();
        globe.advance_frame(now);
        globe.advance_frame(now);
        assert!((globe.shimmer_phase() - 2.0 * SHIMMER_STEP).abs() < 1e-6);
    }

    #[test]
    fn test_resize_reaches_the_camera() {
        let mut globe = test_globe();
        globe.resize(1600, 900);
        assert!((globe.camera().aspect - 1600.0 / 900.0).abs() < 1e-6);
        assert_eq!(globe.surface_size(), (1600, 900));
    }
}
