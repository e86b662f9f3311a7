//! wgpu renderer: surface setup, the scene passes and frame submission.

mod post_process;
mod shaders;

#[cfg(feature = "egui")]
mod egui_integration;

use std::path::Path;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use wgpu::util::DeviceExt;
use winit::window::Window;

#[cfg(feature = "egui")]
pub use egui_integration::{EguiFrameOutput, EguiIntegration};

use crate::error::GpuError;
use crate::globe::SnowGlobe;
use crate::scene::{Lighting, TriMesh};
use crate::sky::SkyBackdrop;
use crate::snow::SnowField;
use crate::visuals::{DomeMaterial, SkyVariant};
use post_process::BloomState;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Radius of the sky sphere, inside the camera's far plane.
const SKY_RADIUS: f32 = 500.0;

/// Per-frame uniforms shared by every 3D pass.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct SceneUniforms {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    camera_right: [f32; 4],
    camera_up: [f32; 4],
    ambient: [f32; 4],
    sun_dir: [f32; 4],
    sun_color: [f32; 4],
    time: f32,
    _padding: [f32; 3],
}

/// Per-node uniforms: world matrix and base color.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct ModelUniforms {
    model: [[f32; 4]; 4],
    color: [f32; 4],
}

/// Interleaved vertex for the lit scene meshes, the dome and the sky.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct MeshVertex {
    position: [f32; 3],
    normal: [f32; 3],
}

impl MeshVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

const SNOW_POSITION_ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const SNOW_COLOR_ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];

fn snow_position_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vec3>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &SNOW_POSITION_ATTRIBS,
    }
}

fn snow_color_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vec3>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &SNOW_COLOR_ATTRIBS,
    }
}

/// GPU resources for one mesh node, updated positionally each frame in
/// the same depth-first order the graph is visited in.
struct MeshDraw {
    color: [f32; 4],
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Geometry of the glass dome; the material pipeline is chosen per frame.
struct DomeDraw {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

/// Everything the renderer owns: surface, pipelines and scene buffers.
pub struct GpuState {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    lighting: Lighting,
    scene_uniform_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    mesh_pipeline: wgpu::RenderPipeline,
    meshes: Vec<MeshDraw>,
    snow_pipeline: wgpu::RenderPipeline,
    snow_position_buffer: wgpu::Buffer,
    snow_color_buffer: wgpu::Buffer,
    snow_count: u32,
    dome_glass_pipeline: wgpu::RenderPipeline,
    dome_shimmer_pipeline: wgpu::RenderPipeline,
    dome: Option<DomeDraw>,
    sky_pipeline: wgpu::RenderPipeline,
    sky_vertex_buffer: wgpu::Buffer,
    sky_index_buffer: wgpu::Buffer,
    sky_index_count: u32,
    sky_sunset_bind_group: wgpu::BindGroup,
    sky_night_bind_group: wgpu::BindGroup,
    bloom: BloomState,
}

impl GpuState {
    /// Initialize the surface, device and every pipeline for the scene
    /// the globe currently holds.
    pub async fn new(
        window: Arc<Window>,
        globe: &SnowGlobe,
        sunset_sky: Option<&Path>,
        night_sky: Option<&Path>,
    ) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let bloom = BloomState::new(&device, &config);
        let lighting = Lighting::default();

        let scene_uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Scene Uniform Buffer"),
            contents: bytemuck::bytes_of(&scene_uniforms(globe, &lighting)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let scene_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: &scene_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_uniform_buffer.as_entire_binding(),
            }],
        });

        let model_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Model Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let sky_texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Sky Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let mesh_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::mesh_shader().into()),
        });
        let snow_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Snow Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::snow_shader().into()),
        });
        let glass_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Dome Glass Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::dome_glass_shader().into()),
        });
        let shimmer_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Dome Shimmer Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::dome_shimmer_shader().into()),
        });
        let sky_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Sky Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::sky_shader().into()),
        });

        let mesh_pipeline = scene_pipeline(
            &device,
            "Mesh Pipeline",
            &mesh_shader,
            &[&scene_layout, &model_layout],
            &[MeshVertex::layout()],
            None,
            true,
            wgpu::CompareFunction::Less,
            config.format,
        );
        let snow_pipeline = scene_pipeline(
            &device,
            "Snow Pipeline",
            &snow_shader,
            &[&scene_layout],
            &[snow_position_layout(), snow_color_layout()],
            Some(wgpu::BlendState::ALPHA_BLENDING),
            false,
            wgpu::CompareFunction::Less,
            config.format,
        );
        let dome_glass_pipeline = scene_pipeline(
            &device,
            "Dome Glass Pipeline",
            &glass_shader,
            &[&scene_layout],
            &[MeshVertex::layout()],
            Some(wgpu::BlendState::ALPHA_BLENDING),
            false,
            wgpu::CompareFunction::Less,
            config.format,
        );
        let dome_shimmer_pipeline = scene_pipeline(
            &device,
            "Dome Shimmer Pipeline",
            &shimmer_shader,
            &[&scene_layout],
            &[MeshVertex::layout()],
            Some(wgpu::BlendState::ALPHA_BLENDING),
            false,
            wgpu::CompareFunction::Less,
            config.format,
        );
        let sky_pipeline = scene_pipeline(
            &device,
            "Sky Pipeline",
            &sky_shader,
            &[&scene_layout, &sky_texture_layout],
            &[MeshVertex::layout()],
            None,
            false,
            wgpu::CompareFunction::Always,
            config.format,
        );

        // One draw and one uniform buffer per mesh node, in visit order.
        let mut meshes = Vec::new();
        globe.world().visit(&mut |node, world| {
            let Some(mesh) = &node.mesh else {
                return;
            };
            let (vertex_buffer, index_buffer, index_count) =
                mesh_buffers(&device, mesh, "Scene Mesh");
            let color = vec4(node.color, 1.0);
            let uniforms = ModelUniforms {
                model: world.to_cols_array_2d(),
                color,
            };
            let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Model Uniform Buffer"),
                contents: bytemuck::bytes_of(&uniforms),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Model Bind Group"),
                layout: &model_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });
            meshes.push(MeshDraw {
                color,
                vertex_buffer,
                index_buffer,
                index_count,
                uniform_buffer,
                bind_group,
            });
        });

        let field = globe.field();
        let snow_position_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Snow Position Buffer"),
            contents: bytemuck::cast_slice(field.positions()),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let snow_color_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Snow Color Buffer"),
            contents: bytemuck::cast_slice(field.colors()),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let snow_count = field.len() as u32;

        let dome = globe.dome().map(|sphere| {
            let mesh = TriMesh::uv_sphere(sphere.radius, 80, 80);
            let (vertex_buffer, index_buffer, index_count) =
                mesh_buffers(&device, &mesh, "Dome Mesh");
            DomeDraw {
                vertex_buffer,
                index_buffer,
                index_count,
            }
        });

        let sky_mesh = TriMesh::uv_sphere(SKY_RADIUS, 48, 32);
        let (sky_vertex_buffer, sky_index_buffer, sky_index_count) =
            mesh_buffers(&device, &sky_mesh, "Sky Mesh");

        let sky_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Sky Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let sunset = SkyBackdrop::load_or_fallback(SkyVariant::Sunset, sunset_sky);
        let night = SkyBackdrop::load_or_fallback(SkyVariant::Night, night_sky);
        let sunset_view = upload_backdrop(&device, &queue, &sunset, "Sunset Sky Texture");
        let night_view = upload_backdrop(&device, &queue, &night, "Night Sky Texture");

        let sky_sunset_bind_group = sky_group(
            &device,
            &sky_texture_layout,
            &sunset_view,
            &sky_sampler,
            "Sunset Sky Bind Group",
        );
        let sky_night_bind_group = sky_group(
            &device,
            &sky_texture_layout,
            &night_view,
            &sky_sampler,
            "Night Sky Bind Group",
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            lighting,
            scene_uniform_buffer,
            scene_bind_group,
            mesh_pipeline,
            meshes,
            snow_pipeline,
            snow_position_buffer,
            snow_color_buffer,
            snow_count,
            dome_glass_pipeline,
            dome_shimmer_pipeline,
            dome,
            sky_pipeline,
            sky_vertex_buffer,
            sky_index_buffer,
            sky_index_count,
            sky_sunset_bind_group,
            sky_night_bind_group,
            bloom,
        })
    }

    #[inline]
    pub fn window(&self) -> &Window {
        &self.window
    }

    #[inline]
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    #[inline]
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Reconfigure the surface and the offscreen targets.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.bloom.resize(&self.device, &self.config);
        }
    }

    /// Re-upload the per-flake colors after a recolor.
    pub fn write_snow_colors(&self, field: &SnowField) {
        self.queue
            .write_buffer(&self.snow_color_buffer, 0, bytemuck::cast_slice(field.colors()));
    }

    /// Render one frame of the globe's current state.
    #[cfg(not(feature = "egui"))]
    pub fn render(&mut self, globe: &SnowGlobe) -> Result<(), wgpu::SurfaceError> {
        self.update_scene(globe);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.encode_passes(&mut encoder, globe, &view);

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    /// Render one frame of the globe's current state, with the control
    /// panel painted on top when one is supplied.
    #[cfg(feature = "egui")]
    pub fn render(
        &mut self,
        globe: &SnowGlobe,
        overlay: Option<(&mut EguiIntegration, EguiFrameOutput)>,
    ) -> Result<(), wgpu::SurfaceError> {
        self.update_scene(globe);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.encode_passes(&mut encoder, globe, &view);

        if let Some((egui, frame)) = overlay {
            let screen_descriptor = egui_wgpu::ScreenDescriptor {
                size_in_pixels: [self.config.width, self.config.height],
                pixels_per_point: frame.pixels_per_point,
            };
            egui.prepare(&self.device, &self.queue, &mut encoder, &frame, &screen_descriptor);

            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Egui Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                })
                .forget_lifetime();
            egui.render(&mut pass, &frame, &screen_descriptor);
            drop(pass);

            egui.cleanup(&frame);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    /// Upload everything that changes per frame: scene uniforms, node
    /// matrices, flake positions and bloom settings.
    fn update_scene(&self, globe: &SnowGlobe) {
        self.queue.write_buffer(
            &self.scene_uniform_buffer,
            0,
            bytemuck::bytes_of(&scene_uniforms(globe, &self.lighting)),
        );

        let mut index = 0;
        globe.world().visit(&mut |node, world| {
            if node.mesh.is_none() {
                return;
            }
            if let Some(draw) = self.meshes.get(index) {
                let uniforms = ModelUniforms {
                    model: world.to_cols_array_2d(),
                    color: draw.color,
                };
                self.queue
                    .write_buffer(&draw.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
            }
            index += 1;
        });

        self.queue.write_buffer(
            &self.snow_position_buffer,
            0,
            bytemuck::cast_slice(globe.field().positions()),
        );

        self.bloom.update(&self.queue, globe.bloom());
    }

    /// Record the 3D passes into the offscreen target, then the bloom
    /// chain into `destination`. Order: sky, meshes, snow, dome.
    fn encode_passes(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        globe: &SnowGlobe,
        destination: &wgpu::TextureView,
    ) {
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.bloom.scene_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.02,
                            g: 0.02,
                            b: 0.05,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.bloom.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_bind_group(0, &self.scene_bind_group, &[]);

            pass.set_pipeline(&self.sky_pipeline);
            let sky_bind_group = match globe.sky() {
                SkyVariant::Sunset => &self.sky_sunset_bind_group,
                SkyVariant::Night => &self.sky_night_bind_group,
            };
            pass.set_bind_group(1, sky_bind_group, &[]);
            pass.set_vertex_buffer(0, self.sky_vertex_buffer.slice(..));
            pass.set_index_buffer(self.sky_index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..self.sky_index_count, 0, 0..1);

            pass.set_pipeline(&self.mesh_pipeline);
            for mesh in &self.meshes {
                pass.set_bind_group(1, &mesh.bind_group, &[]);
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }

            if self.snow_count > 0 {
                pass.set_pipeline(&self.snow_pipeline);
                pass.set_vertex_buffer(0, self.snow_position_buffer.slice(..));
                pass.set_vertex_buffer(1, self.snow_color_buffer.slice(..));
                pass.draw(0..6, 0..self.snow_count);
            }

            if let Some(dome) = &self.dome {
                let pipeline = match globe.dome_material() {
                    DomeMaterial::Glass => &self.dome_glass_pipeline,
                    DomeMaterial::Shimmer => &self.dome_shimmer_pipeline,
                };
                pass.set_pipeline(pipeline);
                pass.set_vertex_buffer(0, dome.vertex_buffer.slice(..));
                pass.set_index_buffer(dome.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..dome.index_count, 0, 0..1);
            }
        }

        self.bloom.run(encoder, destination);
    }
}

fn vec4(v: Vec3, w: f32) -> [f32; 4] {
    [v.x, v.y, v.z, w]
}

fn scene_uniforms(globe: &SnowGlobe, lighting: &Lighting) -> SceneUniforms {
    let camera = globe.camera();
    let view = camera.view_matrix();
    // Rows of the view rotation are the camera basis in world space.
    let right = view.row(0).truncate().normalize();
    let up = view.row(1).truncate().normalize();

    SceneUniforms {
        view_proj: camera.view_projection().to_cols_array_2d(),
        camera_pos: vec4(camera.position(), 1.0),
        camera_right: vec4(right, 0.0),
        camera_up: vec4(up, 0.0),
        ambient: vec4(lighting.ambient_color * lighting.ambient_intensity, 1.0),
        sun_dir: vec4(lighting.sun_direction, 0.0),
        sun_color: vec4(lighting.sun_color * lighting.sun_intensity, 1.0),
        time: globe.shimmer_phase(),
        _padding: [0.0; 3],
    }
}

fn mesh_buffers(
    device: &wgpu::Device,
    mesh: &TriMesh,
    label: &str,
) -> (wgpu::Buffer, wgpu::Buffer, u32) {
    let vertices: Vec<MeshVertex> = mesh
        .positions
        .iter()
        .zip(&mesh.normals)
        .map(|(position, normal)| MeshVertex {
            position: position.to_array(),
            normal: normal.to_array(),
        })
        .collect();

    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(&vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(&mesh.indices),
        usage: wgpu::BufferUsages::INDEX,
    });

    (vertex_buffer, index_buffer, mesh.indices.len() as u32)
}

fn upload_backdrop(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    backdrop: &SkyBackdrop,
    label: &str,
) -> wgpu::TextureView {
    let size = wgpu::Extent3d {
        width: backdrop.width,
        height: backdrop.height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &backdrop.pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * backdrop.width),
            rows_per_image: Some(backdrop.height),
        },
        size,
    );

    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn sky_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

#[allow(clippy::too_many_arguments)]
fn scene_pipeline(
    device: &wgpu::Device,
    label: &str,
    shader: &wgpu::ShaderModule,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
    vertex_buffers: &[wgpu::VertexBufferLayout],
    blend: Option<wgpu::BlendState>,
    depth_write_enabled: bool,
    depth_compare: wgpu::CompareFunction,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts,
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: vertex_buffers,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled,
            depth_compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}
