//! Scene graph and procedural geometry.
//!
//! The world is a small tree of [`Node`]s, each carrying an optional
//! triangle mesh, a base color and a local TRS transform. Geometry is
//! generated, not loaded: a snowy ground disc, a few conifers with a
//! tree-top star, and the snowman character the pointer interacts with.
//! The glass dome is sized from the scenery's bounding sphere and lives
//! outside the graph so it never influences bounds or mesh picking.

use glam::{Mat4, Quat, Vec3};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_3, FRAC_PI_4, PI, TAU};

/// Node name of the clickable character.
pub const SNOWMAN_NODE: &str = "snowman";
/// Node name of the snowman's base sphere, the part the celebration
/// animation moves.
pub const BODY_NODE: &str = "body";
/// Node name of the scenery subtree the dome is sized from.
pub const SCENERY_NODE: &str = "scenery";
/// Node name of the spinning tree-top star.
pub const STAR_NODE: &str = "tree_star";
/// Dome radius as a fraction of the scenery bounding-sphere radius.
pub const DOME_SCALE: f32 = 0.7;

/// Local translation/rotation/scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Pure translation.
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    /// The local matrix for this transform.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// An indexed triangle mesh with per-vertex normals.
#[derive(Debug, Clone)]
pub struct TriMesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    /// Triangle list; length is a multiple of three.
    pub indices: Vec<u32>,
}

impl TriMesh {
    /// Number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Latitude/longitude sphere centered at the origin.
    pub fn uv_sphere(radius: f32, segments: u32, rings: u32) -> Self {
        let mut positions = Vec::new();
        let mut normals = Vec::new();
        let mut indices = Vec::new();

        for ring in 0..=rings {
            let phi = ring as f32 / rings as f32 * PI;
            for seg in 0..=segments {
                let theta = seg as f32 / segments as f32 * TAU;
                let dir = Vec3::new(
                    phi.sin() * theta.cos(),
                    phi.cos(),
                    phi.sin() * theta.sin(),
                );
                positions.push(dir * radius);
                normals.push(dir);
            }
        }

        let stride = segments + 1;
        for ring in 0..rings {
            for seg in 0..segments {
                let a = ring * stride + seg;
                let b = a + 1;
                let c = a + stride;
                let d = c + 1;
                indices.extend_from_slice(&[a, c, b, b, c, d]);
            }
        }

        Self {
            positions,
            normals,
            indices,
        }
    }

    /// Flat disc in the XZ plane, facing +Y, centered at the origin.
    pub fn disc(radius: f32, segments: u32) -> Self {
        let mut positions = vec![Vec3::ZERO];
        let mut normals = vec![Vec3::Y];
        let mut indices = Vec::new();

        for seg in 0..=segments {
            let theta = seg as f32 / segments as f32 * TAU;
            positions.push(Vec3::new(radius * theta.cos(), 0.0, radius * theta.sin()));
            normals.push(Vec3::Y);
        }
        for seg in 1..=segments {
            indices.extend_from_slice(&[0, seg + 1, seg]);
        }

        Self {
            positions,
            normals,
            indices,
        }
    }

    /// Capped cone centered at the origin, apex up, spanning
    /// `y in [-height/2, height/2]`.
    pub fn cone(radius: f32, height: f32, segments: u32) -> Self {
        let half = height / 2.0;
        let apex = Vec3::new(0.0, half, 0.0);
        let mut positions = Vec::new();
        let mut normals = Vec::new();
        let mut indices = Vec::new();

        // Side: one apex copy per segment so slant normals stay sharp.
        for seg in 0..=segments {
            let theta = seg as f32 / segments as f32 * TAU;
            let (sin, cos) = theta.sin_cos();
            let slant = Vec3::new(cos * height, radius, sin * height).normalize();
            positions.push(Vec3::new(radius * cos, -half, radius * sin));
            normals.push(slant);
            positions.push(apex);
            normals.push(slant);
        }
        for seg in 0..segments {
            let a = seg * 2;
            indices.extend_from_slice(&[a, a + 1, a + 2]);
        }

        // Base cap.
        let base_center = positions.len() as u32;
        positions.push(Vec3::new(0.0, -half, 0.0));
        normals.push(Vec3::NEG_Y);
        for seg in 0..=segments {
            let theta = seg as f32 / segments as f32 * TAU;
            positions.push(Vec3::new(radius * theta.cos(), -half, radius * theta.sin()));
            normals.push(Vec3::NEG_Y);
        }
        for seg in 0..segments {
            let rim = base_center + 1 + seg;
            indices.extend_from_slice(&[base_center, rim, rim + 1]);
        }

        Self {
            positions,
            normals,
            indices,
        }
    }

    /// Capped cylinder centered at the origin, axis along Y.
    pub fn cylinder(radius: f32, height: f32, segments: u32) -> Self {
        let half = height / 2.0;
        let mut positions = Vec::new();
        let mut normals = Vec::new();
        let mut indices = Vec::new();

        // Side wall.
        for seg in 0..=segments {
            let theta = seg as f32 / segments as f32 * TAU;
            let (sin, cos) = theta.sin_cos();
            let radial = Vec3::new(cos, 0.0, sin);
            positions.push(Vec3::new(radius * cos, -half, radius * sin));
            normals.push(radial);
            positions.push(Vec3::new(radius * cos, half, radius * sin));
            normals.push(radial);
        }
        for seg in 0..segments {
            let a = seg * 2;
            indices.extend_from_slice(&[a, a + 1, a + 2, a + 2, a + 1, a + 3]);
        }

        // Caps.
        for &(y, normal) in &[(half, Vec3::Y), (-half, Vec3::NEG_Y)] {
            let center = positions.len() as u32;
            positions.push(Vec3::new(0.0, y, 0.0));
            normals.push(normal);
            for seg in 0..=segments {
                let theta = seg as f32 / segments as f32 * TAU;
                positions.push(Vec3::new(radius * theta.cos(), y, radius * theta.sin()));
                normals.push(normal);
            }
            for seg in 0..segments {
                let rim = center + 1 + seg;
                indices.extend_from_slice(&[center, rim, rim + 1]);
            }
        }

        Self {
            positions,
            normals,
            indices,
        }
    }

    /// Axis-aligned box with the given half extents, face normals.
    pub fn cuboid(half: Vec3) -> Self {
        let faces: [(Vec3, Vec3, Vec3); 6] = [
            (Vec3::X, Vec3::Y, Vec3::Z),
            (Vec3::NEG_X, Vec3::Y, Vec3::NEG_Z),
            (Vec3::Y, Vec3::Z, Vec3::X),
            (Vec3::NEG_Y, Vec3::NEG_Z, Vec3::X),
            (Vec3::Z, Vec3::Y, Vec3::NEG_X),
            (Vec3::NEG_Z, Vec3::Y, Vec3::X),
        ];

        let mut positions = Vec::with_capacity(24);
        let mut normals = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);

        for (normal, up, right) in faces {
            let base = positions.len() as u32;
            let face_center = normal * half;
            let u = right * half;
            let v = up * half;
            for corner in [-v - u, -v + u, v + u, v - u] {
                positions.push(face_center + corner);
                normals.push(normal);
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self {
            positions,
            normals,
            indices,
        }
    }
}

/// Bounding sphere of a node subtree in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

/// Analytic sphere, used for the glass dome hit test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

/// A scene-graph node: name, local transform, optional mesh, children.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub mesh: Option<TriMesh>,
    /// Base color fed to the mesh shader.
    pub color: Vec3,
    pub children: Vec<Node>,
}

impl Node {
    /// A meshless grouping node.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::IDENTITY,
            mesh: None,
            color: Vec3::ONE,
            children: Vec::new(),
        }
    }

    /// A leaf node carrying a mesh.
    pub fn with_mesh(name: impl Into<String>, mesh: TriMesh, color: Vec3) -> Self {
        Self {
            name: name.into(),
            transform: Transform::IDENTITY,
            mesh: Some(mesh),
            color,
            children: Vec::new(),
        }
    }

    /// Builder: set the local translation.
    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.transform.translation = translation;
        self
    }

    /// Builder: set the local rotation.
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.transform.rotation = rotation;
        self
    }

    /// Builder: append a child node.
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Depth-first search for a node by name.
    pub fn find(&self, name: &str) -> Option<&Node> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    /// Depth-first search for a node by name, mutable.
    pub fn find_mut(&mut self, name: &str) -> Option<&mut Node> {
        if self.name == name {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.find_mut(name))
    }

    /// Visit every node in the subtree with its world matrix.
    pub fn visit<F: FnMut(&Node, Mat4)>(&self, f: &mut F) {
        self.visit_from(Mat4::IDENTITY, f);
    }

    fn visit_from<F: FnMut(&Node, Mat4)>(&self, parent: Mat4, f: &mut F) {
        let world = parent * self.transform.matrix();
        f(self, world);
        for child in &self.children {
            child.visit_from(world, f);
        }
    }

    /// Bounding sphere of every mesh vertex in the subtree: center of the
    /// world axis-aligned box, radius half its diagonal. `None` when the
    /// subtree carries no geometry.
    pub fn bounding_sphere(&self) -> Option<BoundingSphere> {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        let mut any = false;

        self.visit(&mut |node, world| {
            if let Some(mesh) = &node.mesh {
                for position in &mesh.positions {
                    let world_position = world.transform_point3(*position);
                    min = min.min(world_position);
                    max = max.max(world_position);
                    any = true;
                }
            }
        });

        if !any {
            return None;
        }
        Some(BoundingSphere {
            center: (min + max) * 0.5,
            radius: (max - min).length() * 0.5,
        })
    }
}

/// Ambient plus one directional light, matching the viewer's dusk look.
#[derive(Debug, Clone, Copy)]
pub struct Lighting {
    pub ambient_color: Vec3,
    pub ambient_intensity: f32,
    /// Unit vector pointing from the scene toward the sun.
    pub sun_direction: Vec3,
    pub sun_color: Vec3,
    pub sun_intensity: f32,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient_color: Vec3::splat(0.25),
            ambient_intensity: 15.0,
            sun_direction: Vec3::new(2.0, 60.0, 10.0).normalize(),
            sun_color: Vec3::ONE,
            sun_intensity: 1.0,
        }
    }
}

/// Ground elevation of the set piece.
const GROUND_Y: f32 = -20.0;

fn conifer(name: &str, position: Vec3) -> Node {
    let trunk_color = Vec3::new(0.35, 0.22, 0.12);
    let foliage_color = Vec3::new(0.10, 0.35, 0.18);

    Node::empty(name)
        .with_translation(position)
        .with_child(
            Node::with_mesh("trunk", TriMesh::cylinder(0.8, 3.0, 12), trunk_color)
                .with_translation(Vec3::new(0.0, 1.5, 0.0)),
        )
        .with_child(
            Node::with_mesh("tier_low", TriMesh::cone(5.5, 6.0, 16), foliage_color)
                .with_translation(Vec3::new(0.0, 6.0, 0.0)),
        )
        .with_child(
            Node::with_mesh("tier_mid", TriMesh::cone(4.2, 5.0, 16), foliage_color)
                .with_translation(Vec3::new(0.0, 8.5, 0.0)),
        )
        .with_child(
            Node::with_mesh("tier_top", TriMesh::cone(3.0, 4.5, 16), foliage_color)
                .with_translation(Vec3::new(0.0, 10.8, 0.0)),
        )
}

/// The wintry set piece: snowy ground, three conifers, a star on the
/// tallest tree. The dome is sized from this subtree's bounds.
pub fn build_scenery() -> Node {
    let snow_white = Vec3::new(0.92, 0.93, 0.96);
    let star_gold = Vec3::new(1.0, 0.85, 0.3);

    let starred_tree = conifer("tree_1", Vec3::new(-18.0, GROUND_Y, -8.0)).with_child(
        Node::with_mesh(STAR_NODE, TriMesh::cuboid(Vec3::splat(0.9)), star_gold)
            .with_translation(Vec3::new(0.0, 14.2, 0.0))
            .with_rotation(Quat::from_rotation_y(FRAC_PI_4)),
    );

    Node::empty(SCENERY_NODE)
        .with_child(
            Node::with_mesh("ground", TriMesh::disc(35.0, 48), snow_white)
                .with_translation(Vec3::new(0.0, GROUND_Y, 0.0)),
        )
        .with_child(starred_tree)
        .with_child(conifer("tree_2", Vec3::new(14.0, GROUND_Y, -14.0)))
        .with_child(conifer("tree_3", Vec3::new(-6.0, GROUND_Y, -22.0)))
}

/// The clickable snowman: three stacked spheres with face and hat parts
/// nested underneath, so the whole figure answers a recursive hit test.
pub fn build_snowman() -> Node {
    let body_white = Vec3::new(0.96, 0.96, 0.98);
    let coal = Vec3::splat(0.05);
    let felt = Vec3::splat(0.08);
    let carrot = Vec3::new(0.95, 0.45, 0.1);

    let head = Node::with_mesh("head", TriMesh::uv_sphere(2.0, 24, 16), body_white)
        .with_translation(Vec3::new(0.0, 4.2, 0.0))
        .with_child(
            Node::with_mesh("nose", TriMesh::cone(0.35, 1.6, 12), carrot)
                .with_translation(Vec3::new(0.0, 0.2, 2.6))
                .with_rotation(Quat::from_rotation_x(FRAC_PI_2)),
        )
        .with_child(
            Node::with_mesh("eye_left", TriMesh::uv_sphere(0.22, 8, 6), coal)
                .with_translation(Vec3::new(-0.7, 0.62, 1.8)),
        )
        .with_child(
            Node::with_mesh("eye_right", TriMesh::uv_sphere(0.22, 8, 6), coal)
                .with_translation(Vec3::new(0.7, 0.62, 1.8)),
        )
        .with_child(
            Node::with_mesh("hat_brim", TriMesh::cylinder(2.0, 0.3, 20), felt)
                .with_translation(Vec3::new(0.0, 1.45, 0.0)),
        )
        .with_child(
            Node::with_mesh("hat_crown", TriMesh::cylinder(1.3, 1.8, 20), felt)
                .with_translation(Vec3::new(0.0, 2.3, 0.0)),
        );

    let torso = Node::with_mesh("torso", TriMesh::uv_sphere(2.8, 24, 16), body_white)
        .with_translation(Vec3::new(0.0, 5.8, 0.0))
        .with_child(head);

    Node::empty(SNOWMAN_NODE)
        .with_translation(Vec3::new(0.0, GROUND_Y, 5.0))
        .with_rotation(Quat::from_rotation_y(-FRAC_PI_3))
        .with_child(
            Node::with_mesh(BODY_NODE, TriMesh::uv_sphere(4.0, 24, 16), body_white)
                .with_translation(Vec3::new(0.0, 4.0, 0.0))
                .with_child(torso),
        )
}

/// Assemble the full world: scenery plus the snowman character.
pub fn build_world() -> Node {
    Node::empty("world")
        .with_child(build_scenery())
        .with_child(build_snowman())
}

/// The glass dome enclosing the scene.
///
/// Matches how the viewer frames it: radius comes from the scenery bounds
/// scaled by [`DOME_SCALE`], but the dome itself is centered at the world
/// origin.
pub fn dome_for(scenery: &Node) -> Option<Sphere> {
    scenery.bounding_sphere().map(|bounds| Sphere {
        center: Vec3::ZERO,
        radius: bounds.radius * DOME_SCALE,
    })
}
