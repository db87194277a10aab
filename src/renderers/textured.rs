use std::collections::HashMap;

#[allow(unused_imports)]
use log::{debug, error, info, warn};

use crate::{
    assets::TextureStore,
    backend::{RenderBackend, RenderTarget},
    components::OPENGL_TO_WGPU_MATRIX,
    config::ExperienceConfig,
    device::Device,
    math::{srgb_to_linear, Mat4f, Rect},
    mesh::{Mesh, MeshKind, ModelVertex},
    texture::Texture,
};

use super::shader_utils::{load_shader, ShaderLibrary};


/// `rgba` is given in display (sRGB) terms. An sRGB target encodes on write,
/// so the clear value has to be linear for it to show up unchanged.
fn clear_color_for(format: wgpu::TextureFormat, [r, g, b, a]: [f64; 4]) -> wgpu::Color {
    if format.is_srgb() {
        wgpu::Color { r: srgb_to_linear(r), g: srgb_to_linear(g), b: srgb_to_linear(b), a }
    } else {
        wgpu::Color { r, g, b, a }
    }
}


// Two eyes times two objects is the usual frame; leave headroom for more views
const MAX_DRAWS_PER_FRAME: u64 = 16;

#[repr(C)]
#[derive(Copy, Clone, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    projection: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
}

struct DrawCall {
    viewport: Option<Rect>,
    uniform: SceneUniform,
    texture: String,
    mesh: MeshKind,
    index_count: u32,
}

/// State recorded between `bind_target` and `present`.
#[derive(Default)]
struct FrameCommands {
    target: Option<RenderTarget>,
    clear: bool,
    viewport: Option<Rect>,
    projection: Mat4f,
    view: Mat4f,
    model: Mat4f,
    texture: Option<String>,
    mesh: Option<MeshKind>,
    draws: Vec<DrawCall>,
}

/// The wgpu `RenderBackend`: draws textured meshes into the window surface or
/// into the immersive session's layer framebuffer.
pub struct TexturedPass {
    device: Device,
    textures: TextureStore,
    meshes: HashMap<MeshKind, Mesh>,
    uniform_buffer: wgpu::Buffer,
    uniform_stride: u64,
    uniform_bind_group: wgpu::BindGroup,
    window_pipeline: wgpu::RenderPipeline,
    session_pipeline: wgpu::RenderPipeline,
    session_layer: Option<wgpu::Texture>,
    session_depth: Option<Texture>,
    clear_color: wgpu::Color,
    frame: FrameCommands,
}

impl TexturedPass {
    pub fn new(device: Device, config: &ExperienceConfig) -> anyhow::Result<Self> {
        let mut textures = TextureStore::new(&device);
        for source in config.textures() {
            textures.request(&device, device.queue(), &source.name, &source.file);
        }

        let meshes = [MeshKind::Plane, MeshKind::Cube]
            .into_iter()
            .map(|kind| (kind, Mesh::new(&device, kind)))
            .collect();

        // One uniform slot per draw, addressed with a dynamic offset
        let uniform_size = std::mem::size_of::<SceneUniform>() as wgpu::BufferAddress;
        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let uniform_stride = wgpu::util::align_to(uniform_size, alignment);
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("[Textured] Scene"),
            size: uniform_stride * MAX_DRAWS_PER_FRAME,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("[Textured] Globals"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: wgpu::BufferSize::new(uniform_size),
                    },
                    count: None,
                }],
            });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("[Textured] Globals"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &uniform_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(uniform_size),
                }),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("[Textured] Pipeline"),
            bind_group_layouts: &[&uniform_bind_group_layout, textures.layout()],
            push_constant_ranges: &[],
        });

        let color_format = device.surface_texture_format();
        let window_pipeline = Self::create_pipeline(&device, &pipeline_layout, color_format, false)?;
        let session_pipeline = Self::create_pipeline(&device, &pipeline_layout, color_format, true)?;

        Ok(Self {
            device,
            textures,
            meshes,
            uniform_buffer,
            uniform_stride,
            uniform_bind_group,
            window_pipeline,
            session_pipeline,
            session_layer: None,
            session_depth: None,
            clear_color: clear_color_for(color_format, config.clear_color),
            frame: FrameCommands::default(),
        })
    }

    fn create_pipeline(
        device: &Device,
        layout: &wgpu::PipelineLayout,
        color_format: wgpu::TextureFormat,
        webxr: bool,
    ) -> anyhow::Result<wgpu::RenderPipeline> {
        let mut shaders = ShaderLibrary::new();
        let module = load_shader!(shaders, "textured.wgsl", webxr)?;
        let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Textured Shader"),
            source: wgpu::ShaderSource::Naga(std::borrow::Cow::Owned(module)),
        });

        Ok(device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(if webxr { "[Textured] XR Pipeline" } else { "[Textured] Pipeline" }),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: &shader_module,
                entry_point: "vs_main",
                buffers: &[ModelVertex::desc()],
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: Texture::DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader_module,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            multiview: None,
        }))
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn color_format(&self) -> wgpu::TextureFormat {
        self.device.surface_texture_format()
    }

    pub fn resize(&mut self, new_size: crate::device::SurfaceSize) {
        self.device.resize(new_size);
    }

    /// Colour texture wrapping this frame's session layer framebuffer.
    /// Consumed by the next `present` on `RenderTarget::SessionLayer`, and
    /// released by `end_session_frame` if nothing was drawn.
    #[allow(dead_code)]
    pub fn set_session_layer(&mut self, texture: wgpu::Texture) {
        self.session_layer = Some(texture);
    }

    /// Pick up textures whose images finished loading.
    pub fn poll_textures(&mut self) {
        self.textures.poll_uploads(&self.device, self.device.queue());
    }

    fn write_uniforms(&self, draws: &[DrawCall]) {
        for (slot, draw) in draws.iter().enumerate() {
            self.device.queue().write_buffer(
                &self.uniform_buffer,
                slot as u64 * self.uniform_stride,
                bytemuck::bytes_of(&draw.uniform),
            );
        }
    }

    fn encode(
        &self,
        frame: &FrameCommands,
        color_view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
        pipeline: &wgpu::RenderPipeline,
    ) -> wgpu::CommandBuffer {
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("[Textured] Encoder"),
        });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("[Textured] Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: if frame.clear { wgpu::LoadOp::Clear(self.clear_color) }
                            else { wgpu::LoadOp::Load },
                        store: true,
                    }
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: true
                    }),
                    stencil_ops: None,
                }),
            });

            render_pass.set_pipeline(pipeline);
            for (slot, draw) in frame.draws.iter().enumerate() {
                let (Some(bind_group), Some(mesh)) =
                    (self.textures.bind_group(&draw.texture), self.meshes.get(&draw.mesh))
                else {
                    warn!("Skipping draw of {:?} with unknown texture {}", draw.mesh, draw.texture);
                    continue;
                };
                if let Some(v) = &draw.viewport {
                    render_pass.set_viewport(v.x, v.y, v.w, v.h, 0.0, 1.0);
                }
                let offset = (slot as u64 * self.uniform_stride) as wgpu::DynamicOffset;
                render_pass.set_bind_group(0, &self.uniform_bind_group, &[offset]);
                render_pass.set_bind_group(1, bind_group, &[]);
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                render_pass.draw_indexed(0..draw.index_count.min(mesh.num_elements), 0, 0..1);
            }
        }
        encoder.finish()
    }

    fn present_to_window(&mut self, frame: FrameCommands) {
        let output = match self.device.surface().get_current_texture() {
            Ok(output) => output,
            // Reconfigure the surface if it's lost or outdated
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.device.reconfigure();
                return;
            }
            Err(e) => {
                warn!("Dropping window frame: {e:?}");
                return;
            }
        };
        let color_view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.write_uniforms(&frame.draws);
        let command_buffer = self.encode(
            &frame,
            &color_view,
            &self.device.depth_tex().view,
            &self.window_pipeline,
        );
        self.device.queue().submit(std::iter::once(command_buffer));
        output.present();
    }

    fn present_to_session(&mut self, frame: FrameCommands) {
        let Some(color_texture) = self.session_layer.take() else {
            warn!("No session layer bound, dropping immersive frame");
            return;
        };
        let size = (color_texture.width(), color_texture.height());
        // Not using the WebXR depth buffer; keep our own at the layer's size
        let depth_stale = self.session_depth.as_ref().map_or(true, |d| d.size() != size);
        if depth_stale {
            self.session_depth = Some(Texture::create_depth_texture(
                &self.device, size.0, size.1, "session_depth_texture"));
        }
        let Some(depth) = self.session_depth.as_ref() else {
            return;
        };
        let color_view = color_texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.write_uniforms(&frame.draws);
        let command_buffer = self.encode(&frame, &color_view, &depth.view, &self.session_pipeline);
        self.device.queue().submit(std::iter::once(command_buffer));
    }
}

impl RenderBackend for TexturedPass {
    fn bind_target(&mut self, target: RenderTarget) {
        self.frame = FrameCommands {
            target: Some(target),
            ..Default::default()
        };
    }

    fn drawing_buffer_size(&self) -> (u32, u32) {
        let size = self.device.surface_size();
        (size.width, size.height)
    }

    fn clear(&mut self) {
        self.frame.clear = true;
    }

    fn set_viewport(&mut self, viewport: Rect) {
        self.frame.viewport = Some(viewport);
    }

    fn upload_camera(&mut self, projection: &Mat4f, view: &Mat4f) {
        // Incoming projections use GL clip space
        self.frame.projection = OPENGL_TO_WGPU_MATRIX * projection;
        self.frame.view = *view;
    }

    fn upload_model(&mut self, model: &Mat4f) {
        self.frame.model = *model;
    }

    fn bind_texture(&mut self, name: &str) {
        self.frame.texture = Some(name.to_string());
    }

    fn bind_mesh(&mut self, mesh: MeshKind) {
        self.frame.mesh = Some(mesh);
    }

    fn draw_indexed(&mut self, index_count: u32) {
        let frame = &mut self.frame;
        if frame.draws.len() as u64 >= MAX_DRAWS_PER_FRAME {
            warn!("More than {MAX_DRAWS_PER_FRAME} draws this frame, dropping the rest");
            return;
        }
        let (Some(texture), Some(mesh)) = (frame.texture.clone(), frame.mesh) else {
            warn!("draw_indexed without a bound texture and mesh");
            return;
        };
        frame.draws.push(DrawCall {
            viewport: frame.viewport,
            uniform: SceneUniform {
                projection: frame.projection.into(),
                view: frame.view.into(),
                model: frame.model.into(),
            },
            texture,
            mesh,
            index_count,
        });
    }

    fn present(&mut self) {
        let frame = std::mem::take(&mut self.frame);
        match frame.target {
            Some(RenderTarget::Window) => self.present_to_window(frame),
            Some(RenderTarget::SessionLayer) => self.present_to_session(frame),
            None => warn!("present without bind_target"),
        }
    }

    fn end_session_frame(&mut self) {
        self.session_layer = None;
    }
}
