//! WGPU render surface adapter for the backdrop
//!
//! Wraps surface, device and queue management, the depth buffer and the
//! three pipelines the backdrop needs: lit meshes, additive particle
//! billboards and helper lines for the debug overlay.
//!
//! Construction fails when no drawable surface or device is available;
//! callers treat that as "backdrop disabled", never as a fatal error.

use std::sync::Arc;
use wgpu::{Device, TextureFormat};

use crate::driver::FrameSink;
use crate::error::BackdropError;
use crate::gfx::camera::CameraUniform;
use crate::gfx::gizmos::{axes_helper, grid_helper, LineSet};
use crate::gfx::scene::Scene;
use crate::gfx::vertex::{LineVertex, Vertex3D};
use crate::wgpu_utils::UniformBuffer;

/// Global per-frame uniform: camera matrices, light rig and fog.
///
/// Layout mirrors the `GlobalUniform` struct in the WGSL sources.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUniform {
    pub view_position: [f32; 4],
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub view_proj: [[f32; 4]; 4],
    /// rgb color, intensity
    pub ambient: [f32; 4],
    /// xyz direction toward the light, w unused
    pub light_dirs: [[f32; 4]; 3],
    /// rgb color, intensity
    pub light_colors: [[f32; 4]; 3],
    pub fog_color: [f32; 4],
    /// fog near, fog far, unused, unused
    pub fog_params: [f32; 4],
}

impl Default for GlobalUniform {
    fn default() -> Self {
        let camera = CameraUniform::default();
        Self {
            view_position: camera.view_position,
            view: camera.view,
            proj: camera.proj,
            view_proj: camera.view_proj,
            ambient: [1.0, 1.0, 1.0, 0.0],
            light_dirs: [[0.0; 4]; 3],
            light_colors: [[0.0; 4]; 3],
            fog_color: [0.0; 4],
            fog_params: [10.0, 50.0, 0.0, 0.0],
        }
    }
}

/// A helper line batch uploaded once at startup.
struct LineBatch {
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
}

/// Core rendering adapter managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    format: TextureFormat,

    global_ubo: UniformBuffer<GlobalUniform>,
    global_bind_group: wgpu::BindGroup,
    node_layout: wgpu::BindGroupLayout,
    particle_layout: wgpu::BindGroupLayout,

    mesh_pipeline: wgpu::RenderPipeline,
    particle_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,

    // Overlay batches are built up front; whether they draw is decided per
    // frame by the scene's overlay flag.
    overlay_axes: LineBatch,
    overlay_grid: LineBatch,

    // Lighting and fog environment, captured from the scene at prepare time
    environment: GlobalUniform,
    clear_color: wgpu::Color,
}

impl RenderEngine {
    /// Creates a render engine for the given window.
    ///
    /// # Errors
    /// Returns [`BackdropError`] when the surface, adapter or device cannot
    /// be created. Callers log this and carry on without a backdrop.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<RenderEngine, BackdropError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| BackdropError::AdapterUnavailable)?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Backdrop Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .unwrap_or(surface_capabilities.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_capabilities.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_view = create_depth_texture(&device, &config);

        // Bind group layouts: group 0 globals, group 1 per-draw data
        let global_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("global bind group layout"),
            entries: &[uniform_layout_entry(
                0,
                wgpu::ShaderStages::VERTEX_FRAGMENT,
            )],
        });

        let node_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("node bind group layout"),
            entries: &[uniform_layout_entry(
                0,
                wgpu::ShaderStages::VERTEX_FRAGMENT,
            )],
        });

        let particle_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("particle bind group layout"),
            entries: &[
                uniform_layout_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let global_ubo = UniformBuffer::new_with_data(&device, &GlobalUniform::default());
        let global_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("global bind group"),
            layout: &global_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: global_ubo.binding_resource(),
            }],
        });

        let mesh_pipeline = create_mesh_pipeline(&device, format, &global_layout, &node_layout);
        let particle_pipeline =
            create_particle_pipeline(&device, format, &global_layout, &particle_layout);
        let line_pipeline = create_line_pipeline(&device, format, &global_layout);

        let overlay_axes = create_line_batch(&device, &axes_helper(5.0));
        let overlay_grid = create_line_batch(&device, &grid_helper(20.0, 20));

        log::info!("render engine ready, surface format {format:?}");

        Ok(RenderEngine {
            surface,
            device: Arc::new(device),
            queue: Arc::new(queue),
            config,
            depth_view,
            format,
            global_ubo,
            global_bind_group,
            node_layout,
            particle_layout,
            mesh_pipeline,
            particle_pipeline,
            line_pipeline,
            overlay_axes,
            overlay_grid,
            environment: GlobalUniform::default(),
            clear_color: wgpu::Color::BLACK,
        })
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> TextureFormat {
        self.format
    }

    /// Reconfigures the surface and depth buffer for a new size.
    ///
    /// Safe to call at any time; zero-sized dimensions are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_texture(&self.device, &self.config);
    }

    /// Uploads scene resources and captures the lighting environment.
    ///
    /// Must be called once after scene construction, before the first frame.
    pub fn prepare_scene(&mut self, scene: &mut Scene) {
        scene.init_gpu_resources(&self.device, &self.node_layout, &self.particle_layout);

        self.environment.ambient = [
            scene.ambient.color[0],
            scene.ambient.color[1],
            scene.ambient.color[2],
            scene.ambient.intensity,
        ];
        for (i, light) in scene.lights.iter().take(3).enumerate() {
            self.environment.light_dirs[i] = [
                light.position[0],
                light.position[1],
                light.position[2],
                0.0,
            ];
            self.environment.light_colors[i] = [
                light.color[0],
                light.color[1],
                light.color[2],
                light.intensity,
            ];
        }
        self.environment.fog_color = [
            scene.fog.color[0],
            scene.fog.color[1],
            scene.fog.color[2],
            1.0,
        ];
        self.environment.fog_params = [scene.fog.near, scene.fog.far, 0.0, 0.0];

        // The clear color matches the fog so distant geometry fades into the
        // background instead of against it.
        self.clear_color = wgpu::Color {
            r: scene.fog.color[0] as f64,
            g: scene.fog.color[1] as f64,
            b: scene.fog.color[2] as f64,
            a: 1.0,
        };
    }

    fn draw(&mut self, scene: &Scene, camera: &CameraUniform) {
        scene.update_gpu(&self.queue);

        let mut globals = self.environment;
        globals.view_position = camera.view_position;
        globals.view = camera.view;
        globals.proj = camera.proj;
        globals.view_proj = camera.view_proj;
        self.global_ubo.update_content(&self.queue, globals);

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                // Reconfigure and pick the frame up next tick
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("surface out of memory, skipping frame");
                return;
            }
            Err(err) => {
                log::warn!("dropped frame: {err}");
                return;
            }
        };

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("backdrop encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("backdrop pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.global_bind_group, &[]);

            // Architecture
            render_pass.set_pipeline(&self.mesh_pipeline);
            for node in &scene.nodes {
                if let Some(gpu) = &node.gpu_resources {
                    render_pass.set_bind_group(1, &gpu.model_bind_group, &[]);
                    render_pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
                    render_pass
                        .set_index_buffer(gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    render_pass.draw_indexed(0..gpu.index_count, 0, 0..1);
                }
            }

            // Particle field, six vertices per particle
            if let Some(gpu) = &scene.particles.gpu_resources {
                render_pass.set_pipeline(&self.particle_pipeline);
                render_pass.set_bind_group(1, &gpu.bind_group, &[]);
                render_pass.draw(0..(scene.particles.len() as u32 * 6), 0..1);
            }

            // Debug overlay
            if scene.overlay_enabled() {
                render_pass.set_pipeline(&self.line_pipeline);
                render_pass.set_vertex_buffer(0, self.overlay_axes.vertex_buffer.slice(..));
                render_pass.draw(0..self.overlay_axes.vertex_count, 0..1);
                render_pass.set_vertex_buffer(0, self.overlay_grid.vertex_buffer.slice(..));
                render_pass.draw(0..self.overlay_grid.vertex_count, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
    }
}

impl FrameSink for RenderEngine {
    fn render_frame(&mut self, scene: &Scene, camera: &CameraUniform) {
        self.draw(scene, camera);
    }
}

fn uniform_layout_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn create_depth_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Depth32Float,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn create_line_batch(device: &wgpu::Device, lines: &LineSet) -> LineBatch {
    let vertex_buffer = wgpu::util::DeviceExt::create_buffer_init(
        device,
        &wgpu::util::BufferInitDescriptor {
            label: Some(lines.name),
            contents: bytemuck::cast_slice(&lines.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        },
    );
    LineBatch {
        vertex_buffer,
        vertex_count: lines.vertices.len() as u32,
    }
}

fn depth_stencil_state(depth_write_enabled: bool) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: wgpu::TextureFormat::Depth32Float,
        depth_write_enabled,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

fn create_mesh_pipeline(
    device: &wgpu::Device,
    format: TextureFormat,
    global_layout: &wgpu::BindGroupLayout,
    node_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("mesh shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("mesh pipeline layout"),
        bind_group_layouts: &[global_layout, node_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("mesh pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex3D::desc()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: Some(wgpu::Face::Back),
            ..Default::default()
        },
        depth_stencil: Some(depth_stencil_state(true)),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn create_particle_pipeline(
    device: &wgpu::Device,
    format: TextureFormat,
    global_layout: &wgpu::BindGroupLayout,
    particle_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("particle shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("particles.wgsl").into()),
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("particle pipeline layout"),
        bind_group_layouts: &[global_layout, particle_layout],
        push_constant_ranges: &[],
    });

    // Additive blending for the soft glow. Depth is read but not written so
    // particles never occlude each other or the architecture.
    let additive = wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        },
    };

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("particle pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(additive),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(depth_stencil_state(false)),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn create_line_pipeline(
    device: &wgpu::Device,
    format: TextureFormat,
    global_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("line shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("lines.wgsl").into()),
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("line pipeline layout"),
        bind_group_layouts: &[global_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("line pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[LineVertex::desc()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::LineList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(depth_stencil_state(true)),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}
