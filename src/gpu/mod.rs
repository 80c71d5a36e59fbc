//! wgpu renderer for a window surface.
//!
//! A frame is recorded into a [`GpuFrame`] through the [`Surface`](crate::Surface)
//! trait, then [`GpuState::render`] uploads it and draws it in a single render
//! pass: instanced anti-aliased discs first, then a triangle list for lines
//! and polygons.

mod frame;
mod shaders;

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec4};
use tracing::info;
use wgpu::util::DeviceExt;
use winit::window::Window;

pub use frame::{CircleInstance, GpuFrame, MeshVertex};
pub use shaders::SHADER_SOURCE;

use crate::error::GpuError;

/// Smallest vertex buffer we bother allocating, in elements.
const MIN_CAPACITY: usize = 256;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    viewport: [f32; 2],
    _padding: [f32; 2],
}

/// Growable vertex buffer.
struct VertexBuffer {
    label: &'static str,
    buffer: wgpu::Buffer,
    capacity: usize,
}

impl VertexBuffer {
    fn new<T: Pod>(device: &wgpu::Device, label: &'static str, capacity: usize) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: (capacity * std::mem::size_of::<T>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self {
            label,
            buffer,
            capacity,
        }
    }

    fn upload<T: Pod>(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, data: &[T]) {
        if data.len() > self.capacity {
            *self = Self::new::<T>(device, self.label, data.len().next_power_of_two());
        }
        if !data.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(data));
        }
    }

    fn slice<T>(&self, len: usize) -> wgpu::BufferSlice<'_> {
        self.buffer
            .slice(..(len * std::mem::size_of::<T>()) as wgpu::BufferAddress)
    }
}

pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    circle_pipeline: wgpu::RenderPipeline,
    mesh_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    circles: VertexBuffer,
    mesh: VertexBuffer,
    /// Logical size the geometry is expressed in.
    viewport: Vec2,
    clear_color: wgpu::Color,
}

impl GpuState {
    pub async fn new(window: Arc<Window>, background: Vec4) -> Result<Self, GpuError> {
        let size = window.inner_size();
        let logical = size.to_logical::<f32>(window.scale_factor());

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        info!(adapter = %adapter.get_info().name, "gpu device ready");

        // Colours are authored as sRGB values and blended as-is, like a 2D canvas.
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
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

        let uniforms = Uniforms {
            viewport: [logical.width.max(1.0), logical.height.max(1.0)],
            _padding: [0.0; 2],
        };
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Uniform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Backdrop Shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER_SOURCE.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Backdrop Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });

        let circle_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            "Circle Pipeline",
            ("vs_circle", "fs_circle"),
            CircleInstance::layout(),
            config.format,
        );
        let mesh_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            "Mesh Pipeline",
            ("vs_mesh", "fs_mesh"),
            MeshVertex::layout(),
            config.format,
        );

        let circles = VertexBuffer::new::<CircleInstance>(&device, "Circle Buffer", MIN_CAPACITY);
        let mesh = VertexBuffer::new::<MeshVertex>(&device, "Mesh Buffer", MIN_CAPACITY * 6);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            circle_pipeline,
            mesh_pipeline,
            uniform_buffer,
            uniform_bind_group,
            circles,
            mesh,
            viewport: Vec2::new(uniforms.viewport[0], uniforms.viewport[1]),
            clear_color: to_wgpu_color(background),
        })
    }

    /// Reconfigure for a new physical size; `logical` is the size geometry is
    /// drawn in.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>, logical: Vec2) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
        if logical.x > 0.0 && logical.y > 0.0 {
            self.viewport = logical;
        }
    }

    /// Reconfigure at the current size, after the surface was lost.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn render(&mut self, frame: &GpuFrame) -> Result<(), wgpu::SurfaceError> {
        let uniforms = Uniforms {
            viewport: self.viewport.to_array(),
            _padding: [0.0; 2],
        };
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
        self.circles
            .upload(&self.device, &self.queue, frame.circles());
        self.mesh.upload(&self.device, &self.queue, frame.vertices());

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let load = if frame.is_cleared() {
                wgpu::LoadOp::Clear(self.clear_color)
            } else {
                wgpu::LoadOp::Load
            };
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);

            let circle_count = frame.circles().len();
            if circle_count > 0 {
                render_pass.set_pipeline(&self.circle_pipeline);
                render_pass.set_vertex_buffer(0, self.circles.slice::<CircleInstance>(circle_count));
                render_pass.draw(0..6, 0..circle_count as u32);
            }

            let vertex_count = frame.vertices().len();
            if vertex_count > 0 {
                render_pass.set_pipeline(&self.mesh_pipeline);
                render_pass.set_vertex_buffer(0, self.mesh.slice::<MeshVertex>(vertex_count));
                render_pass.draw(0..vertex_count as u32, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    label: &str,
    (vs, fs): (&str, &str),
    buffer: wgpu::VertexBufferLayout<'static>,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(vs),
            buffers: &[buffer],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fs),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn to_wgpu_color(c: Vec4) -> wgpu::Color {
    wgpu::Color {
        r: c.x as f64,
        g: c.y as f64,
        b: c.z as f64,
        a: c.w as f64,
    }
}
