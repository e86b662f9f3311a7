//! Pointer hit testing.
//!
//! Turns pointer pixels into world-space rays through the camera and
//! answers the two questions the viewer asks: is the cursor over the glass
//! dome (analytic sphere test), and did a click land on the character
//! (recursive triangle test over its subtree)? Hit tests only report; they
//! never mutate scene state.

use glam::{Vec2, Vec3};

use crate::camera::OrbitCamera;
use crate::scene::{Node, Sphere, TriMesh};

/// Determinant cutoff below which a triangle counts as edge-on.
const TRIANGLE_EPSILON: f32 = 1e-7;

/// A world-space ray.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Point at parameter `t` along the ray.
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Convert a pixel position to normalized device coordinates.
///
/// X maps left(-1) to right(+1); Y maps top(+1) to bottom(-1).
pub fn ndc_from_pixels(pixel: Vec2, width: u32, height: u32) -> Vec2 {
    Vec2::new(
        (pixel.x / width as f32) * 2.0 - 1.0,
        -(pixel.y / height as f32) * 2.0 + 1.0,
    )
}

/// Build the picking ray for a pointer position in NDC.
///
/// The origin is the camera eye; the direction goes through the pointer's
/// unprojection at mid depth, normalized.
pub fn ray_from_ndc(camera: &OrbitCamera, ndc: Vec2) -> Ray {
    let origin = camera.position();
    let inverse = camera.view_projection().inverse();
    let through = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 0.5));
    Ray {
        origin,
        direction: (through - origin).normalize(),
    }
}

/// Nearest non-negative ray parameter hitting the sphere, or `None`.
///
/// Expects a unit-length direction. A ray starting inside the sphere hits
/// the far wall, so hovering still works with the camera zoomed into the
/// dome.
pub fn ray_sphere(ray: &Ray, sphere: &Sphere) -> Option<f32> {
    let to_origin = ray.origin - sphere.center;
    let b = to_origin.dot(ray.direction);
    let c = to_origin.length_squared() - sphere.radius * sphere.radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrt_d = discriminant.sqrt();
    let near = -b - sqrt_d;
    if near >= 0.0 {
        return Some(near);
    }
    let far = -b + sqrt_d;
    if far >= 0.0 {
        return Some(far);
    }
    None
}

/// Möller-Trumbore ray/triangle intersection.
///
/// Accepts hits on either face and only in front of the origin. Works with
/// non-unit directions; `t` is then in direction lengths.
pub fn ray_triangle(ray: &Ray, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
    let edge_ab = b - a;
    let edge_ac = c - a;
    let p = ray.direction.cross(edge_ac);
    let det = edge_ab.dot(p);
    if det.abs() < TRIANGLE_EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let to_origin = ray.origin - a;
    let u = to_origin.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = to_origin.cross(edge_ab);
    let v = ray.direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge_ac.dot(q) * inv_det;
    (t > TRIANGLE_EPSILON).then_some(t)
}

fn mesh_hit(ray: &Ray, mesh: &TriMesh) -> bool {
    mesh.indices.chunks_exact(3).any(|triangle| {
        ray_triangle(
            ray,
            mesh.positions[triangle[0] as usize],
            mesh.positions[triangle[1] as usize],
            mesh.positions[triangle[2] as usize],
        )
        .is_some()
    })
}

/// True when the ray hits any triangle of the node's own mesh or,
/// recursively, any descendant's.
///
/// The ray is carried into each node's local space, so triangles are
/// tested untransformed.
pub fn ray_hits_node(ray: &Ray, node: &Node) -> bool {
    let mut hit = false;
    node.visit(&mut |node, world| {
        if hit {
            return;
        }
        if let Some(mesh) = &node.mesh {
            let inverse = world.inverse();
            let local = Ray {
                origin: inverse.transform_point3(ray.origin),
                direction: inverse.transform_vector3(ray.direction),
            };
            if mesh_hit(&local, mesh) {
                hit = true;
            }
        }
    });
    hit
}

/// Dome hover test for a pointer position in pixels.
///
/// A dome that does not exist yet is simply not hovered.
pub fn test_hover(
    pixel: Vec2,
    width: u32,
    height: u32,
    camera: &OrbitCamera,
    dome: Option<&Sphere>,
) -> bool {
    let Some(dome) = dome else {
        return false;
    };
    let ray = ray_from_ndc(camera, ndc_from_pixels(pixel, width, height));
    ray_sphere(&ray, dome).is_some()
}

/// Character click test for a pointer position in pixels, recursive over
/// the character's subtree.
///
/// A character that has not been built yet cannot be clicked.
pub fn test_click(
    pixel: Vec2,
    width: u32,
    height: u32,
    camera: &OrbitCamera,
    character: Option<&Node>,
) -> bool {
    let Some(character) = character else {
        return false;
    };
    let ray = ray_from_ndc(camera, ndc_from_pixels(pixel, width, height));
    ray_hits_node(&ray, character)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    fn axis_camera() -> OrbitCamera {
        // Eye on +Z looking straight at a unit sphere at the origin.
        OrbitCamera::looking_from(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO)
    }

    #[test]
    fn test_ndc_mapping() {
        assert_eq!(
            ndc_from_pixels(Vec2::new(400.0, 300.0), 800, 600),
            Vec2::new(0.0, 0.0)
        );
        assert_eq!(
            ndc_from_pixels(Vec2::new(0.0, 0.0), 800, 600),
            Vec2::new(-1.0, 1.0)
        );
        assert_eq!(
            ndc_from_pixels(Vec2::new(800.0, 600.0), 800, 600),
            Vec2::new(1.0, -1.0)
        );
    }

    #[test]
    fn test_center_ray_points_at_target() {
        let ray = ray_from_ndc(&axis_camera(), Vec2::ZERO);
        assert!((ray.origin - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-3);
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-3);
    }

    #[test]
    fn test_center_ndc_hits_unit_sphere() {
        let sphere = Sphere {
            center: Vec3::ZERO,
            radius: 1.0,
        };
        let ray = ray_from_ndc(&axis_camera(), Vec2::ZERO);
        let t = ray_sphere(&ray, &sphere).unwrap();
        // First contact is the front of the sphere, four units out.
        assert!((t - 4.0).abs() < 1e-2);
    }

    #[test]
    fn test_corner_ndc_misses_unit_sphere() {
        let sphere = Sphere {
            center: Vec3::ZERO,
            radius: 1.0,
        };
        let ray = ray_from_ndc(&axis_camera(), Vec2::new(0.9, 0.9));
        assert!(ray_sphere(&ray, &sphere).is_none());
    }

    #[test]
    fn test_sphere_behind_origin_is_not_hit() {
        let sphere = Sphere {
            center: Vec3::new(0.0, 0.0, 12.0),
            radius: 1.0,
        };
        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, 5.0),
            direction: Vec3::NEG_Z,
        };
        assert!(ray_sphere(&ray, &sphere).is_none());
    }

    #[test]
    fn test_ray_inside_sphere_hits_far_wall() {
        let sphere = Sphere {
            center: Vec3::ZERO,
            radius: 10.0,
        };
        let ray = Ray {
            origin: Vec3::ZERO,
            direction: Vec3::X,
        };
        let t = ray_sphere(&ray, &sphere).unwrap();
        assert!((t - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_triangle_hit_and_miss() {
        let a = Vec3::new(-1.0, -1.0, 0.0);
        let b = Vec3::new(1.0, -1.0, 0.0);
        let c = Vec3::new(0.0, 1.0, 0.0);
        let toward = Ray {
            origin: Vec3::new(0.0, 0.0, 5.0),
            direction: Vec3::NEG_Z,
        };
        assert!(ray_triangle(&toward, a, b, c).is_some());

        let wide = Ray {
            origin: Vec3::new(5.0, 0.0, 5.0),
            direction: Vec3::NEG_Z,
        };
        assert!(ray_triangle(&wide, a, b, c).is_none());

        let away = Ray {
            origin: Vec3::new(0.0, 0.0, 5.0),
            direction: Vec3::Z,
        };
        assert!(ray_triangle(&away, a, b, c).is_none());
    }

    #[test]
    fn test_triangle_back_face_hits() {
        let a = Vec3::new(-1.0, -1.0, 0.0);
        let b = Vec3::new(1.0, -1.0, 0.0);
        let c = Vec3::new(0.0, 1.0, 0.0);
        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, -5.0),
            direction: Vec3::Z,
        };
        // Winding does not matter; the reverse side intersects too.
        assert!(ray_triangle(&ray, a, c, b).is_some());
        assert!(ray_triangle(&ray, a, b, c).is_some());
    }

    #[test]
    fn test_node_hit_through_child_mesh() {
        // Parent carries no mesh; only the offset child can be hit.
        let node = Node::empty("parent").with_child(
            Node::with_mesh("leaf", TriMesh::cuboid(Vec3::ONE), Vec3::ONE)
                .with_translation(Vec3::new(10.0, 0.0, 0.0)),
        );

        let at_child = Ray {
            origin: Vec3::new(10.0, 0.0, 5.0),
            direction: Vec3::NEG_Z,
        };
        assert!(ray_hits_node(&at_child, &node));

        let at_parent_origin = Ray {
            origin: Vec3::new(0.0, 0.0, 5.0),
            direction: Vec3::NEG_Z,
        };
        assert!(!ray_hits_node(&at_parent_origin, &node));
    }

    #[test]
    fn test_node_hit_respects_rotation() {
        // A thin slab rotated a quarter turn around Y is hit along X, not Z.
        let node = Node::with_mesh(
            "slab",
            TriMesh::cuboid(Vec3::new(2.0, 2.0, 0.1)),
            Vec3::ONE,
        )
        .with_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));

        let along_x = Ray {
            origin: Vec3::new(5.0, 0.0, 0.0),
            direction: Vec3::NEG_X,
        };
        assert!(ray_hits_node(&along_x, &node));

        let along_z_offset = Ray {
            origin: Vec3::new(1.0, 0.0, 5.0),
            direction: Vec3::NEG_Z,
        };
        assert!(!ray_hits_node(&along_z_offset, &node));
    }

    #[test]
    fn test_missing_targets_never_hit() {
        let camera = axis_camera();
        let pixel = Vec2::new(400.0, 300.0);
        assert!(!test_hover(pixel, 800, 600, &camera, None));
        assert!(!test_click(pixel, 800, 600, &camera, None));
    }

    #[test]
    fn test_click_hits_snowman_center() {
        let snowman = crate::scene::build_snowman();
        // Frame the figure straight on through its torso.
        let camera = OrbitCamera::looking_from(Vec3::new(0.0, -10.0, 40.0), Vec3::new(0.0, -10.0, 5.0));
        let hit = test_click(Vec2::new(400.0, 300.0), 800, 600, &camera, Some(&snowman));
        assert!(hit);

        // Aim at empty sky instead.
        let miss = test_click(Vec2::new(60.0, 40.0), 800, 600, &camera, Some(&snowman));
        assert!(!miss);
    }
}
