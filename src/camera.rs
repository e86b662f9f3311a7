//! Orbit camera for the 3D scene view.

use glam::{Mat4, Vec3};

/// Vertical field of view in radians (60 degrees).
pub const DEFAULT_FOV_Y: f32 = std::f32::consts::FRAC_PI_3;
/// Near clip plane distance.
pub const NEAR_PLANE: f32 = 0.1;
/// Far clip plane distance.
pub const FAR_PLANE: f32 = 600.0;
/// Closest the camera may zoom to its target.
pub const MIN_DISTANCE: f32 = 1.0;
/// Farthest the camera may zoom from its target.
pub const MAX_DISTANCE: f32 = 1000.0;
/// Pitch clamp keeping the orbit off the poles, in radians.
const PITCH_LIMIT: f32 = 1.5;

/// Orbit camera for viewing the scene.
///
/// The eye circles `target` at `distance`, parameterized by yaw and pitch.
/// Projection is right-handed with 0..1 depth to match the render pipeline.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    /// Horizontal rotation angle in radians.
    pub yaw: f32,
    /// Vertical rotation angle in radians.
    pub pitch: f32,
    /// Distance from the target point.
    pub distance: f32,
    /// Point the camera orbits around.
    pub target: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Viewport width over height.
    pub aspect: f32,
    /// Near clip plane.
    pub near: f32,
    /// Far clip plane.
    pub far: f32,
}

impl OrbitCamera {
    /// Create a camera with the default scene framing: eye at
    /// `(10, 5, 60)` looking at the origin.
    pub fn new() -> Self {
        Self::looking_from(Vec3::new(10.0, 5.0, 60.0), Vec3::ZERO)
    }

    /// Create a camera whose orbit parameters reproduce the given eye
    /// position and target.
    pub fn looking_from(eye: Vec3, target: Vec3) -> Self {
        let offset = eye - target;
        let distance = offset.length().max(f32::EPSILON);
        Self {
            yaw: offset.x.atan2(offset.z),
            pitch: (offset.y / distance).asin(),
            distance,
            target,
            fov_y: DEFAULT_FOV_Y,
            aspect: 1.0,
            near: NEAR_PLANE,
            far: FAR_PLANE,
        }
    }

    /// Calculate the camera's world position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    /// Calculate the projection matrix for rendering.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    /// Combined projection * view matrix.
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Update the aspect ratio after a viewport resize.
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Apply a drag rotation. Pitch is clamped short of the poles.
    pub fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw += delta_yaw;
        self.pitch = (self.pitch + delta_pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Move the eye toward (positive delta) or away from the target,
    /// clamped to `[MIN_DISTANCE, MAX_DISTANCE]`.
    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance - delta).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_framing() {
        let camera = OrbitCamera::new();
        let position = camera.position();
        assert!((position - Vec3::new(10.0, 5.0, 60.0)).length() < 1e-3);
        assert_eq!(camera.target, Vec3::ZERO);
    }

    #[test]
    fn test_looking_from_roundtrip() {
        let eye = Vec3::new(-3.0, 8.0, 12.0);
        let target = Vec3::new(1.0, -2.0, 0.5);
        let camera = OrbitCamera::looking_from(eye, target);
        assert!((camera.position() - eye).length() < 1e-3);
    }

    #[test]
    fn test_orbit_clamps_pitch() {
        let mut camera = OrbitCamera::new();
        camera.orbit(0.0, 10.0);
        assert!(camera.pitch <= 1.5);
        camera.orbit(0.0, -20.0);
        assert!(camera.pitch >= -1.5);
    }

    #[test]
    fn test_zoom_clamps_distance() {
        let mut camera = OrbitCamera::new();
        camera.zoom(1e6);
        assert_eq!(camera.distance, MIN_DISTANCE);
        camera.zoom(-1e7);
        assert_eq!(camera.distance, MAX_DISTANCE);
    }

    #[test]
    fn test_set_aspect_ignores_zero_sizes() {
        let mut camera = OrbitCamera::new();
        camera.set_aspect(1280, 720);
        let aspect = camera.aspect;
        camera.set_aspect(0, 720);
        assert_eq!(camera.aspect, aspect);
    }

    #[test]
    fn test_view_matrix_centers_target() {
        let camera = OrbitCamera::new();
        let view_target = camera.view_matrix().project_point3(camera.target);
        // The look-at target sits on the view axis, straight ahead.
        assert!(view_target.x.abs() < 1e-4);
        assert!(view_target.y.abs() < 1e-4);
        assert!(view_target.z < 0.0);
    }
}
