//! Bloom post-processing chain.
//!
//! The 3D passes render into an offscreen color target. A bright-pass
//! keeps what exceeds the threshold, a separable gaussian blur spreads
//! it over two passes, and a composite pass adds the glow back while
//! blitting to the surface.

use wgpu::util::DeviceExt;

use crate::visuals::BloomSettings;

use super::{shaders, DEPTH_FORMAT};

/// Uniforms shared by the bloom passes. `direction` selects the blur
/// axis; the remaining fields mirror [`BloomSettings`].
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct BloomParams {
    direction: [f32; 2],
    strength: f32,
    radius: f32,
    threshold: f32,
    _padding: [f32; 3],
}

impl BloomParams {
    fn from_settings(settings: BloomSettings, direction: [f32; 2]) -> Self {
        Self {
            direction,
            strength: settings.strength,
            radius: settings.radius,
            threshold: settings.threshold,
            _padding: [0.0; 3],
        }
    }
}

/// GPU resources for the bloom chain.
#[allow(dead_code)]
pub struct BloomState {
    /// Offscreen scene color target the 3D passes draw into.
    pub scene_texture: wgpu::Texture,
    /// View into the scene color target.
    pub scene_view: wgpu::TextureView,
    /// Offscreen depth buffer paired with the scene target.
    pub depth_texture: wgpu::Texture,
    /// View into the depth buffer.
    pub depth_view: wgpu::TextureView,
    bright_texture: wgpu::Texture,
    bright_view: wgpu::TextureView,
    blur_a_texture: wgpu::Texture,
    blur_a_view: wgpu::TextureView,
    blur_b_texture: wgpu::Texture,
    blur_b_view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    filter_layout: wgpu::BindGroupLayout,
    composite_layout: wgpu::BindGroupLayout,
    bright_pipeline: wgpu::RenderPipeline,
    blur_pipeline: wgpu::RenderPipeline,
    composite_pipeline: wgpu::RenderPipeline,
    params_bright: wgpu::Buffer,
    params_blur_h: wgpu::Buffer,
    params_blur_v: wgpu::Buffer,
    params_composite: wgpu::Buffer,
    bright_bind_group: wgpu::BindGroup,
    blur_h_bind_group: wgpu::BindGroup,
    blur_v_bind_group: wgpu::BindGroup,
    composite_bind_group: wgpu::BindGroup,
}

impl BloomState {
    /// Create the bloom chain for the given surface configuration.
    pub fn new(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> Self {
        let (scene_texture, scene_view) = color_target(device, config, "Scene Color Texture");
        let (depth_texture, depth_view) = depth_target(device, config);
        let (bright_texture, bright_view) = color_target(device, config, "Bloom Bright Texture");
        let (blur_a_texture, blur_a_view) = color_target(device, config, "Bloom Blur A Texture");
        let (blur_b_texture, blur_b_view) = color_target(device, config, "Bloom Blur B Texture");

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Bloom Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        // Bright and blur passes read one texture; the composite reads
        // the scene and the blurred glow.
        let filter_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Bloom Filter Bind Group Layout"),
            entries: &[
                texture_layout_entry(0),
                sampler_layout_entry(1),
                uniform_layout_entry(2),
            ],
        });
        let composite_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Bloom Composite Bind Group Layout"),
            entries: &[
                texture_layout_entry(0),
                texture_layout_entry(1),
                sampler_layout_entry(2),
                uniform_layout_entry(3),
            ],
        });

        let bright_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Bloom Bright Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::bloom_bright_shader().into()),
        });
        let blur_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Bloom Blur Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::bloom_blur_shader().into()),
        });
        let composite_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Bloom Composite Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::bloom_composite_shader().into()),
        });

        let bright_pipeline = fullscreen_pipeline(
            device,
            "Bloom Bright Pipeline",
            &filter_layout,
            &bright_shader,
            config.format,
        );
        let blur_pipeline = fullscreen_pipeline(
            device,
            "Bloom Blur Pipeline",
            &filter_layout,
            &blur_shader,
            config.format,
        );
        let composite_pipeline = fullscreen_pipeline(
            device,
            "Bloom Composite Pipeline",
            &composite_layout,
            &composite_shader,
            config.format,
        );

        let settings = BloomSettings::default();
        let params_bright = params_buffer(
            device,
            "Bloom Bright Params",
            BloomParams::from_settings(settings, [0.0, 0.0]),
        );
        let params_blur_h = params_buffer(
            device,
            "Bloom Blur H Params",
            BloomParams::from_settings(settings, [1.0, 0.0]),
        );
        let params_blur_v = params_buffer(
            device,
            "Bloom Blur V Params",
            BloomParams::from_settings(settings, [0.0, 1.0]),
        );
        let params_composite = params_buffer(
            device,
            "Bloom Composite Params",
            BloomParams::from_settings(settings, [0.0, 0.0]),
        );

        let bright_bind_group = filter_group(
            device,
            &filter_layout,
            &scene_view,
            &sampler,
            &params_bright,
            "Bloom Bright Bind Group",
        );
        let blur_h_bind_group = filter_group(
            device,
            &filter_layout,
            &bright_view,
            &sampler,
            &params_blur_h,
            "Bloom Blur H Bind Group",
        );
        let blur_v_bind_group = filter_group(
            device,
            &filter_layout,
            &blur_a_view,
            &sampler,
            &params_blur_v,
            "Bloom Blur V Bind Group",
        );
        let composite_bind_group = composite_group(
            device,
            &composite_layout,
            &scene_view,
            &blur_b_view,
            &sampler,
            &params_composite,
        );

        Self {
            scene_texture,
            scene_view,
            depth_texture,
            depth_view,
            bright_texture,
            bright_view,
            blur_a_texture,
            blur_a_view,
            blur_b_texture,
            blur_b_view,
            sampler,
            filter_layout,
            composite_layout,
            bright_pipeline,
            blur_pipeline,
            composite_pipeline,
            params_bright,
            params_blur_h,
            params_blur_v,
            params_composite,
            bright_bind_group,
            blur_h_bind_group,
            blur_v_bind_group,
            composite_bind_group,
        }
    }

    /// Upload the current bloom settings to every pass.
    pub fn update(&self, queue: &wgpu::Queue, settings: BloomSettings) {
        queue.write_buffer(
            &self.params_bright,
            0,
            bytemuck::bytes_of(&BloomParams::from_settings(settings, [0.0, 0.0])),
        );
        queue.write_buffer(
            &self.params_blur_h,
            0,
            bytemuck::bytes_of(&BloomParams::from_settings(settings, [1.0, 0.0])),
        );
        queue.write_buffer(
            &self.params_blur_v,
            0,
            bytemuck::bytes_of(&BloomParams::from_settings(settings, [0.0, 1.0])),
        );
        queue.write_buffer(
            &self.params_composite,
            0,
            bytemuck::bytes_of(&BloomParams::from_settings(settings, [0.0, 0.0])),
        );
    }

    /// Record the four bloom passes, compositing into `destination`.
    pub fn run(&self, encoder: &mut wgpu::CommandEncoder, destination: &wgpu::TextureView) {
        fullscreen_pass(
            encoder,
            "Bloom Bright Pass",
            &self.bright_pipeline,
            &self.bright_bind_group,
            &self.bright_view,
        );
        fullscreen_pass(
            encoder,
            "Bloom Blur H Pass",
            &self.blur_pipeline,
            &self.blur_h_bind_group,
            &self.blur_a_view,
        );
        fullscreen_pass(
            encoder,
            "Bloom Blur V Pass",
            &self.blur_pipeline,
            &self.blur_v_bind_group,
            &self.blur_b_view,
        );
        fullscreen_pass(
            encoder,
            "Bloom Composite Pass",
            &self.composite_pipeline,
            &self.composite_bind_group,
            destination,
        );
    }

    /// Recreate render targets and bind groups after a surface resize.
    pub fn resize(&mut self, device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) {
        let (scene_texture, scene_view) = color_target(device, config, "Scene Color Texture");
        let (depth_texture, depth_view) = depth_target(device, config);
        let (bright_texture, bright_view) = color_target(device, config, "Bloom Bright Texture");
        let (blur_a_texture, blur_a_view) = color_target(device, config, "Bloom Blur A Texture");
        let (blur_b_texture, blur_b_view) = color_target(device, config, "Bloom Blur B Texture");

        self.scene_texture = scene_texture;
        self.scene_view = scene_view;
        self.depth_texture = depth_texture;
        self.depth_view = depth_view;
        self.bright_texture = bright_texture;
        self.bright_view = bright_view;
        self.blur_a_texture = blur_a_texture;
        self.blur_a_view = blur_a_view;
        self.blur_b_texture = blur_b_texture;
        self.blur_b_view = blur_b_view;

        self.bright_bind_group = filter_group(
            device,
            &self.filter_layout,
            &self.scene_view,
            &self.sampler,
            &self.params_bright,
            "Bloom Bright Bind Group",
        );
        self.blur_h_bind_group = filter_group(
            device,
            &self.filter_layout,
            &self.bright_view,
            &self.sampler,
            &self.params_blur_h,
            "Bloom Blur H Bind Group",
        );
        self.blur_v_bind_group = filter_group(
            device,
            &self.filter_layout,
            &self.blur_a_view,
            &self.sampler,
            &self.params_blur_v,
            "Bloom Blur V Bind Group",
        );
        self.composite_bind_group = composite_group(
            device,
            &self.composite_layout,
            &self.scene_view,
            &self.blur_b_view,
            &self.sampler,
            &self.params_composite,
        );
    }
}

fn color_target(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    label: &str,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: config.format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

fn depth_target(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Scene Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

fn texture_layout_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_layout_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

fn uniform_layout_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn params_buffer(device: &wgpu::Device, label: &str, params: BloomParams) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::bytes_of(&params),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

fn filter_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    source: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
    params: &wgpu::Buffer,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(source),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: params.as_entire_binding(),
            },
        ],
    })
}

fn composite_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    scene: &wgpu::TextureView,
    bloom: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
    params: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Bloom Composite Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(scene),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(bloom),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: params.as_entire_binding(),
            },
        ],
    })
}

fn fullscreen_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn fullscreen_pass(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
    target: &wgpu::TextureView,
) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });
    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, bind_group, &[]);
    pass.draw(0..3, 0..1);
}
