//! # Snowglobe
//!
//! An interactive 3D snow globe: a winter scene sealed under glass, ten
//! thousand snowflakes, and a snowman who throws a party when clicked.
//!
//! The crate splits into a headless core and a windowed viewer. The core
//! ([`SnowGlobe`]) owns the scene graph, the snow field, the orbit camera
//! and the interaction state machine, and is driven entirely by plain
//! method calls, so it runs (and tests) without a GPU. The viewer wraps it
//! in a winit window and a wgpu renderer with a bloom post-process.
//!
//! ## Quick Start
//!
//! ```ignore
//! use snowglobe::prelude::*;
//!
//! fn main() -> Result<(), ViewerError> {
//!     Viewer::new()
//!         .with_title("Snow Globe")
//!         .with_snow_candidates(10_000)
//!         .run()
//! }
//! ```
//!
//! Drag orbits the camera, the scroll wheel zooms, hovering the glass dome
//! makes it shimmer, and clicking the snowman starts the celebration:
//! jingle, confetti-colored snow, a night sky and pulsing bloom. Clicking
//! him again calms the party back down.
//!
//! ## Core Concepts
//!
//! ### The globe
//!
//! [`SnowGlobe`] is the frame-loop facade. Feed it pointer movement,
//! clicks, drags and scrolls, call [`SnowGlobe::advance_frame`] once per
//! frame, and read the resulting state back out: node transforms, snow
//! positions and colors, bloom settings, the active sky.
//!
//! ### The scene
//!
//! [`scene`] holds a small named-node hierarchy ([`Node`], [`Transform`],
//! [`TriMesh`]) plus the procedural builders for the winter scenery and
//! the snowman. Picking walks the same hierarchy, so whatever the scene
//! shows is what the pointer can hit.
//!
//! ### The snow
//!
//! [`SnowField`] keeps positions, velocities and colors in parallel
//! arrays. Flakes fall inside a spherical shell around the scenery and
//! reseed to a fresh spot in the shell when they drop out the bottom, so
//! the snowfall never ends and never escapes the glass.
//!
//! ## Headless Use
//!
//! Everything except the actual drawing works without a window:
//!
//! ```ignore
//! use snowglobe::SnowGlobe;
//! use std::time::Instant;
//!
//! let mut globe = SnowGlobe::new(10_000, Some(42));
//! globe.resize(1280, 720);
//! globe.pointer_clicked(glam::Vec2::new(640.0, 360.0), Instant::now());
//! globe.advance_frame(Instant::now());
//! ```
//!
//! ## Cargo Features
//!
//! | Feature | Effect |
//! |---------|--------|
//! | `egui`  | In-window control panel: bloom sliders, sky selector, FPS |
//! | `audio` | Celebration jingle through the default output device |
//!
//! Both are off by default; the viewer works without them.

pub mod animation;
pub mod audio;
pub mod camera;
pub mod error;
pub mod globe;
mod gpu;
pub mod input;
pub mod interaction;
pub mod picking;
pub mod scene;
pub mod sky;
pub mod snow;
pub mod time;
mod viewer;
pub mod visuals;

pub use camera::OrbitCamera;
pub use error::{GpuError, TextureError, ViewerError};
pub use glam::{Vec2, Vec3, Vec4};
pub use globe::SnowGlobe;
pub use gpu::GpuState;
pub use interaction::Phase;
pub use scene::{Node, Sphere, Transform, TriMesh};
pub use snow::SnowField;
pub use viewer::Viewer;
pub use visuals::{BloomSettings, DomeMaterial, SkyVariant};

#[cfg(feature = "egui")]
pub use gpu::{EguiFrameOutput, EguiIntegration};

/// Convenient re-exports for common usage.
///
/// # Usage
///
/// ```ignore
/// use snowglobe::prelude::*;
/// ```
pub mod prelude {
    pub use crate::camera::OrbitCamera;
    pub use crate::error::ViewerError;
    pub use crate::globe::SnowGlobe;
    pub use crate::input::{Input, MouseButton};
    pub use crate::interaction::Phase;
    pub use crate::scene::{Node, Sphere, Transform, TriMesh};
    pub use crate::snow::SnowField;
    pub use crate::time::FrameClock;
    pub use crate::viewer::Viewer;
    pub use crate::visuals::{BloomSettings, DomeMaterial, SkyVariant};
    pub use crate::{Vec2, Vec3, Vec4};
    #[cfg(feature = "egui")]
    pub use egui;
}
