//! WGSL sources for every pass the renderer runs.
//!
//! Each shader is assembled from shared fragments so the uniform layouts
//! stay in lockstep with the `bytemuck` structs in the parent module. The
//! dome shimmer is a fractal-noise effect driven by the scene clock; the
//! bloom chain is a threshold pass, a separable gaussian blur and an
//! additive composite.

/// Shared scene-level uniforms, bound at group 0 across the 3D passes.
const SCENE_UNIFORMS: &str = r#"
struct SceneUniforms {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    camera_right: vec4<f32>,
    camera_up: vec4<f32>,
    ambient: vec4<f32>,
    sun_dir: vec4<f32>,
    sun_color: vec4<f32>,
    time: f32,
    _pad0: f32,
    _pad1: f32,
    _pad2: f32,
};

@group(0) @binding(0)
var<uniform> scene: SceneUniforms;
"#;

/// Fullscreen oversized-triangle vertex stage shared by the bloom passes.
const FULLSCREEN_VS: &str = r#"
struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {
    var positions = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(3.0, -1.0),
        vec2<f32>(-1.0, 3.0),
    );
    var uvs = array<vec2<f32>, 3>(
        vec2<f32>(0.0, 1.0),
        vec2<f32>(2.0, 1.0),
        vec2<f32>(0.0, -1.0),
    );

    var out: VertexOutput;
    out.clip_position = vec4<f32>(positions[vertex_index], 0.0, 1.0);
    out.uv = uvs[vertex_index];
    return out;
}
"#;

/// Bloom settings plus the blur direction for the separable passes.
const BLOOM_PARAMS: &str = r#"
struct BloomParams {
    direction: vec2<f32>,
    strength: f32,
    radius: f32,
    threshold: f32,
    _pad0: f32,
    _pad1: f32,
    _pad2: f32,
};
"#;

/// Lambert-lit scene meshes with a per-node model matrix and base color.
pub(crate) fn mesh_shader() -> String {
    format!(
        r#"{SCENE_UNIFORMS}
struct ModelUniforms {{
    model: mat4x4<f32>,
    color: vec4<f32>,
}};

@group(1) @binding(0)
var<uniform> node: ModelUniforms;

struct VertexOutput {{
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_normal: vec3<f32>,
}};

@vertex
fn vs_main(
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
) -> VertexOutput {{
    let world_pos = node.model * vec4<f32>(position, 1.0);
    var out: VertexOutput;
    out.clip_position = scene.view_proj * world_pos;
    out.world_normal = (node.model * vec4<f32>(normal, 0.0)).xyz;
    return out;
}}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {{
    let n = normalize(in.world_normal);
    let diffuse = max(dot(n, scene.sun_dir.xyz), 0.0);
    let light = scene.ambient.rgb + scene.sun_color.rgb * diffuse;
    return vec4<f32>(node.color.rgb * light, 1.0);
}}
"#
    )
}

/// Camera-facing snow flake quads, one instance per flake.
pub(crate) fn snow_shader() -> String {
    format!(
        r#"{SCENE_UNIFORMS}
struct VertexOutput {{
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec3<f32>,
    @location(1) uv: vec2<f32>,
}};

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) flake_pos: vec3<f32>,
    @location(1) flake_color: vec3<f32>,
) -> VertexOutput {{
    var quad_vertices = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
    );

    let quad_pos = quad_vertices[vertex_index];
    let flake_radius = 0.3;

    let world_pos = flake_pos
        + scene.camera_right.xyz * quad_pos.x * flake_radius
        + scene.camera_up.xyz * quad_pos.y * flake_radius;

    var out: VertexOutput;
    out.clip_position = scene.view_proj * vec4<f32>(world_pos, 1.0);
    out.color = flake_color;
    out.uv = quad_pos;
    return out;
}}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {{
    let dist = length(in.uv);
    if dist > 1.0 {{
        discard;
    }}
    let alpha = 1.0 - smoothstep(0.5, 1.0, dist);
    return vec4<f32>(in.color, alpha);
}}
"#
    )
}

/// Plain glass dome: a fresnel-weighted tint, nearly clear face-on.
pub(crate) fn dome_glass_shader() -> String {
    format!(
        r#"{SCENE_UNIFORMS}
struct VertexOutput {{
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
}};

@vertex
fn vs_main(
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
) -> VertexOutput {{
    var out: VertexOutput;
    out.clip_position = scene.view_proj * vec4<f32>(position, 1.0);
    out.world_pos = position;
    out.normal = normal;
    return out;
}}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {{
    let view_dir = normalize(scene.camera_pos.xyz - in.world_pos);
    let facing = abs(dot(normalize(in.normal), view_dir));
    let fresnel = pow(1.0 - facing, 3.0);
    let tint = vec3<f32>(0.65, 0.78, 0.92);
    let alpha = 0.06 + 0.5 * fresnel;
    return vec4<f32>(tint, alpha);
}}
"#
    )
}

/// Hovered dome: drifting fractal noise blended between ice blue and
/// warm pink, advancing with the scene clock.
pub(crate) fn dome_shimmer_shader() -> String {
    format!(
        r#"{SCENE_UNIFORMS}
fn random2(st: vec2<f32>) -> f32 {{
    return fract(sin(dot(st, vec2<f32>(12.9898, 78.233))) * 43758.5453123);
}}

fn value_noise(st: vec2<f32>) -> f32 {{
    let i = floor(st);
    let f = fract(st);
    let a = random2(i);
    let b = random2(i + vec2<f32>(1.0, 0.0));
    let c = random2(i + vec2<f32>(0.0, 1.0));
    let d = random2(i + vec2<f32>(1.0, 1.0));
    let u = f * f * (3.0 - 2.0 * f);
    return mix(a, b, u.x) + (c - a) * u.y * (1.0 - u.x) + (d - b) * u.x * u.y;
}}

fn fbm(st_in: vec2<f32>) -> f32 {{
    var st = st_in;
    var value = 0.0;
    var amplitude = 0.5;
    for (var i = 0; i < 5; i = i + 1) {{
        value = value + amplitude * value_noise(st);
        st = st * 2.0;
        amplitude = amplitude * 0.5;
    }}
    return value;
}}

struct VertexOutput {{
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
}};

@vertex
fn vs_main(
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
) -> VertexOutput {{
    let dir = normalize(position);
    var out: VertexOutput;
    out.clip_position = scene.view_proj * vec4<f32>(position, 1.0);
    out.uv = vec2<f32>(
        atan2(dir.z, dir.x) / 6.28318530718 + 0.5,
        acos(clamp(dir.y, -1.0, 1.0)) / 3.14159265359,
    );
    return out;
}}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {{
    var st = in.uv;
    st.x = st.x + sin(st.y * 10.0 + scene.time) * 0.2;
    st = st * 10.0;
    let n = fbm(st + scene.time * 0.5);
    let color = mix(vec3<f32>(0.5, 0.8, 1.0), vec3<f32>(1.0, 0.6, 0.8), n);
    return vec4<f32>(color, 0.2);
}}
"#
    )
}

/// Sky sphere sampled by view direction, spherical mapping.
pub(crate) fn sky_shader() -> String {
    format!(
        r#"{SCENE_UNIFORMS}
@group(1) @binding(0)
var sky_texture: texture_2d<f32>;
@group(1) @binding(1)
var sky_sampler: sampler;

struct VertexOutput {{
    @builtin(position) clip_position: vec4<f32>,
    @location(0) dir: vec3<f32>,
}};

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> VertexOutput {{
    var out: VertexOutput;
    out.clip_position = scene.view_proj * vec4<f32>(position, 1.0);
    out.dir = position;
    return out;
}}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {{
    let dir = normalize(in.dir);
    let uv = vec2<f32>(
        atan2(dir.z, dir.x) / 6.28318530718 + 0.5,
        acos(clamp(dir.y, -1.0, 1.0)) / 3.14159265359,
    );
    return textureSample(sky_texture, sky_sampler, uv);
}}
"#
    )
}

/// Bright-pass: keep only what exceeds the bloom threshold.
pub(crate) fn bloom_bright_shader() -> String {
    format!(
        r#"{BLOOM_PARAMS}
@group(0) @binding(0)
var source: texture_2d<f32>;
@group(0) @binding(1)
var source_sampler: sampler;
@group(0) @binding(2)
var<uniform> params: BloomParams;
{FULLSCREEN_VS}
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {{
    let color = textureSampleLevel(source, source_sampler, in.uv, 0.0).rgb;
    let luminance = dot(color, vec3<f32>(0.2126, 0.7152, 0.0722));
    let cutoff = max(luminance - params.threshold, 0.0) / max(luminance, 1e-4);
    return vec4<f32>(color * cutoff, 1.0);
}}
"#
    )
}

/// One direction of the separable gaussian blur; the radius setting
/// widens the tap spacing.
pub(crate) fn bloom_blur_shader() -> String {
    format!(
        r#"{BLOOM_PARAMS}
@group(0) @binding(0)
var source: texture_2d<f32>;
@group(0) @binding(1)
var source_sampler: sampler;
@group(0) @binding(2)
var<uniform> params: BloomParams;
{FULLSCREEN_VS}
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {{
    var weights = array<f32, 5>(0.227027, 0.1945946, 0.1216216, 0.054054, 0.016216);

    let spread = 1.0 + params.radius * 3.0;
    let texel = params.direction * spread / vec2<f32>(textureDimensions(source));

    var result = textureSampleLevel(source, source_sampler, in.uv, 0.0).rgb * weights[0];
    for (var i = 1; i < 5; i = i + 1) {{
        let offset = texel * f32(i);
        result = result + textureSampleLevel(source, source_sampler, in.uv + offset, 0.0).rgb * weights[i];
        result = result + textureSampleLevel(source, source_sampler, in.uv - offset, 0.0).rgb * weights[i];
    }}
    return vec4<f32>(result, 1.0);
}}
"#
    )
}

/// Final composite: scene plus strength-scaled bloom.
pub(crate) fn bloom_composite_shader() -> String {
    format!(
        r#"{BLOOM_PARAMS}
@group(0) @binding(0)
var scene_texture: texture_2d<f32>;
@group(0) @binding(1)
var bloom_texture: texture_2d<f32>;
@group(0) @binding(2)
var composite_sampler: sampler;
@group(0) @binding(3)
var<uniform> params: BloomParams;
{FULLSCREEN_VS}
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {{
    let base = textureSampleLevel(scene_texture, composite_sampler, in.uv, 0.0).rgb;
    let glow = textureSampleLevel(bloom_texture, composite_sampler, in.uv, 0.0).rgb;
    return vec4<f32>(base + glow * params.strength, 1.0);
}}
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate_wgsl(code: &str) -> Result<(), String> {
        let module = naga::front::wgsl::parse_str(code)
            .map_err(|e| format!("WGSL parse error: {:?}", e))?;

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator
            .validate(&module)
            .map_err(|e| format!("WGSL validation error: {:?}", e))?;

        Ok(())
    }

    #[test]
    fn test_mesh_shader_validates() {
        validate_wgsl(&mesh_shader()).expect("mesh shader should be valid");
    }

    #[test]
    fn test_snow_shader_validates() {
        validate_wgsl(&snow_shader()).expect("snow shader should be valid");
    }

    #[test]
    fn test_dome_glass_shader_validates() {
        validate_wgsl(&dome_glass_shader()).expect("glass shader should be valid");
    }

    #[test]
    fn test_dome_shimmer_shader_validates() {
        validate_wgsl(&dome_shimmer_shader()).expect("shimmer shader should be valid");
    }

    #[test]
    fn test_sky_shader_validates() {
        validate_wgsl(&sky_shader()).expect("sky shader should be valid");
    }

    #[test]
    fn test_bloom_shaders_validate() {
        validate_wgsl(&bloom_bright_shader()).expect("bright pass should be valid");
        validate_wgsl(&bloom_blur_shader()).expect("blur pass should be valid");
        validate_wgsl(&bloom_composite_shader()).expect("composite pass should be valid");
    }
}
