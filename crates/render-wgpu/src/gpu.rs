use crate::shaders;
use bytemuck::{Pod, Zeroable};
use image::RgbaImage;
use rapidframe_common::{SpriteUniforms, SpriteVertex, TileUniforms, TileVertex};
use rapidframe_render::{
    DrawPass, FilterMode, Frame, RasterConfig, RenderError, Renderer, Texture, WrapMode,
};
use wgpu::util::DeviceExt;

const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub(crate) struct GpuTileUniforms {
    mvp: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub(crate) struct GpuSpriteUniforms {
    mvp: [[f32; 4]; 4],
    viewport: [f32; 2],
    size_mul: f32,
    inv_uv_mul: f32,
    max_point_size: f32,
    _pad: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct GpuTileVertex {
    position: [f32; 3],
    uv: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct GpuSpriteInstance {
    position: [f32; 3],
    size: f32,
    atlas_uv: [f32; 2],
}

impl From<&TileVertex> for GpuTileVertex {
    fn from(v: &TileVertex) -> Self {
        Self {
            position: v.position.to_array(),
            uv: v.uv.to_array(),
        }
    }
}

impl From<&SpriteVertex> for GpuSpriteInstance {
    fn from(v: &SpriteVertex) -> Self {
        Self {
            position: v.position.to_array(),
            size: v.size,
            atlas_uv: v.atlas_uv.to_array(),
        }
    }
}

impl GpuTileUniforms {
    fn new(u: &TileUniforms) -> Self {
        Self {
            mvp: u.mvp.to_cols_array_2d(),
        }
    }
}

impl GpuSpriteUniforms {
    fn new(u: &SpriteUniforms, width: u32, height: u32, max_point_size: f32) -> Self {
        Self {
            mvp: u.mvp.to_cols_array_2d(),
            viewport: [width as f32, height as f32],
            size_mul: u.size_mul,
            inv_uv_mul: u.inv_uv_mul,
            max_point_size,
            _pad: [0.0; 3],
        }
    }
}

/// Errors from the wgpu backend.
#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    #[error("no suitable GPU adapter found")]
    NoAdapter,
    #[error("device request failed: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("readback buffer map failed: {0}")]
    Map(#[from] wgpu::BufferAsyncError),
    #[error("readback did not complete")]
    ReadbackLost,
    #[error("render target has zero size ({width}x{height})")]
    ZeroSize { width: u32, height: u32 },
}

/// Bytes per row of a readback buffer, padded to wgpu's copy alignment.
pub(crate) fn padded_bytes_per_row(width: u32) -> u32 {
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    (width * 4).div_ceil(align) * align
}

enum PreparedPass {
    Tiles {
        bind_group: wgpu::BindGroup,
        vertices: wgpu::Buffer,
        count: u32,
    },
    Sprites {
        bind_group: wgpu::BindGroup,
        instances: wgpu::Buffer,
        count: u32,
    },
}

/// Offscreen wgpu renderer for both draw paths.
pub struct WgpuRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    tile_pipeline: wgpu::RenderPipeline,
    sprite_pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    color_texture: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
    width: u32,
    height: u32,
    max_point_size: f32,
}

impl WgpuRenderer {
    /// Request an adapter and device without a surface and build the renderer.
    pub fn new_headless(width: u32, height: u32) -> Result<Self, GpuError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .ok_or(GpuError::NoAdapter)?;
        tracing::info!(adapter = ?adapter.get_info().name, "adapter selected");

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("rapidframe_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        Self::new(device, queue, width, height)
    }

    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        width: u32,
        height: u32,
    ) -> Result<Self, GpuError> {
        if width == 0 || height == 0 {
            return Err(GpuError::ZeroSize { width, height });
        }

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("draw_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let depth_stencil = Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        });
        let targets = [Some(wgpu::ColorTargetState {
            format: COLOR_FORMAT,
            blend: Some(wgpu::BlendState::REPLACE),
            write_mask: wgpu::ColorWrites::ALL,
        })];

        // Tile pipeline
        let tile_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("tile_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::TILE_SHADER.into()),
        });

        let tile_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("tile_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &tile_shader,
                entry_point: Some("vs_tile"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<GpuTileVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x2,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &tile_shader,
                entry_point: Some("fs_tile"),
                compilation_options: Default::default(),
                targets: &targets,
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: depth_stencil.clone(),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        // Sprite pipeline
        let sprite_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sprite_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SPRITE_SHADER.into()),
        });

        let sprite_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sprite_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &sprite_shader,
                entry_point: Some("vs_sprite"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<GpuSpriteInstance>() as u64,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32,
                        2 => Float32x2,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &sprite_shader,
                entry_point: Some("fs_sprite"),
                compilation_options: Default::default(),
                targets: &targets,
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil,
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let (color_texture, color_view, depth_view) = Self::create_targets(&device, width, height);

        Ok(Self {
            device,
            queue,
            tile_pipeline,
            sprite_pipeline,
            bind_group_layout,
            color_texture,
            color_view,
            depth_view,
            width,
            height,
            max_point_size: RasterConfig::default().max_point_size,
        })
    }

    /// Render one frame into the offscreen target and read it back.
    pub fn draw(&self, frame: &Frame<'_>) -> Result<RgbaImage, GpuError> {
        let _span = tracing::info_span!("wgpu_frame", passes = frame.passes.len()).entered();

        let prepared: Vec<PreparedPass> = frame
            .passes
            .iter()
            .filter_map(|pass| self.prepare(pass))
            .collect();

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        {
            let c = frame.clear_color;
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: c.x as f64,
                            g: c.y as f64,
                            b: c.z as f64,
                            a: c.w as f64,
                        }),
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
                ..Default::default()
            });

            for p in &prepared {
                match p {
                    PreparedPass::Tiles {
                        bind_group,
                        vertices,
                        count,
                    } => {
                        pass.set_pipeline(&self.tile_pipeline);
                        pass.set_bind_group(0, bind_group, &[]);
                        pass.set_vertex_buffer(0, vertices.slice(..));
                        pass.draw(0..*count, 0..1);
                    }
                    PreparedPass::Sprites {
                        bind_group,
                        instances,
                        count,
                    } => {
                        pass.set_pipeline(&self.sprite_pipeline);
                        pass.set_bind_group(0, bind_group, &[]);
                        pass.set_vertex_buffer(0, instances.slice(..));
                        pass.draw(0..6, 0..*count);
                    }
                }
            }
        }

        let padded = padded_bytes_per_row(self.width);
        let readback = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("readback_buffer"),
            size: padded as u64 * self.height as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.color_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(self.height),
                },
            },
            self.extent(),
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        self.read_back(&readback, padded)
    }

    fn prepare(&self, pass: &DrawPass<'_>) -> Option<PreparedPass> {
        match pass {
            DrawPass::Tiles(b) => {
                if b.vertices.len() < 3 {
                    return None;
                }
                let verts: Vec<GpuTileVertex> = b.vertices.iter().map(Into::into).collect();
                let count = (verts.len() - verts.len() % 3) as u32;
                let uniforms = GpuTileUniforms::new(&b.uniforms);
                Some(PreparedPass::Tiles {
                    bind_group: self.bind_group(bytemuck::bytes_of(&uniforms), b.texture),
                    vertices: self
                        .vertex_buffer("tile_vertex_buffer", bytemuck::cast_slice(&verts)),
                    count,
                })
            }
            DrawPass::Sprites(b) => {
                if b.vertices.is_empty() {
                    return None;
                }
                let instances: Vec<GpuSpriteInstance> =
                    b.vertices.iter().map(Into::into).collect();
                let uniforms = GpuSpriteUniforms::new(
                    &b.uniforms,
                    self.width,
                    self.height,
                    self.max_point_size,
                );
                Some(PreparedPass::Sprites {
                    bind_group: self.bind_group(bytemuck::bytes_of(&uniforms), b.texture),
                    instances: self
                        .vertex_buffer("sprite_instance_buffer", bytemuck::cast_slice(&instances)),
                    count: instances.len() as u32,
                })
            }
        }
    }

    fn vertex_buffer(&self, label: &str, contents: &[u8]) -> wgpu::Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage: wgpu::BufferUsages::VERTEX,
            })
    }

    fn bind_group(&self, uniforms: &[u8], texture: &Texture) -> wgpu::BindGroup {
        let uniform_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("uniform_buffer"),
                contents: uniforms,
                usage: wgpu::BufferUsages::UNIFORM,
            });

        let size = wgpu::Extent3d {
            width: texture.width(),
            height: texture.height(),
            depth_or_array_layers: 1,
        };
        let gpu_texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("atlas_texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &gpu_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &texture.to_rgba8(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(texture.width() * 4),
                rows_per_image: Some(texture.height()),
            },
            size,
        );
        let view = gpu_texture.create_view(&Default::default());

        let filter = match texture.filter {
            FilterMode::Nearest => wgpu::FilterMode::Nearest,
            FilterMode::Linear => wgpu::FilterMode::Linear,
        };
        let address = match texture.wrap {
            WrapMode::Repeat => wgpu::AddressMode::Repeat,
            WrapMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
        };
        let sampler = self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("atlas_sampler"),
            address_mode_u: address,
            address_mode_v: address,
            address_mode_w: address,
            mag_filter: filter,
            min_filter: filter,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("draw_bind_group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        })
    }

    fn read_back(&self, readback: &wgpu::Buffer, padded: u32) -> Result<RgbaImage, GpuError> {
        let slice = readback.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = self.device.poll(wgpu::Maintain::Wait);
        rx.recv().map_err(|_| GpuError::ReadbackLost)??;

        let row = self.width as usize * 4;
        let mut pixels = Vec::with_capacity(row * self.height as usize);
        {
            let data = slice.get_mapped_range();
            for chunk in data.chunks(padded as usize) {
                pixels.extend_from_slice(&chunk[..row]);
            }
        }
        readback.unmap();

        RgbaImage::from_raw(self.width, self.height, pixels).ok_or(GpuError::ReadbackLost)
    }

    fn extent(&self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        }
    }

    fn create_targets(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> (wgpu::Texture, wgpu::TextureView, wgpu::TextureView) {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("color_target"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: COLOR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let color_view = color.create_view(&Default::default());
        let depth_view = depth.create_view(&Default::default());
        (color, color_view, depth_view)
    }
}

impl Renderer for WgpuRenderer {
    type Output = RgbaImage;

    fn render(&mut self, frame: &Frame<'_>) -> Result<RgbaImage, RenderError> {
        self.draw(frame)
            .map_err(|e| RenderError::Backend(Box::new(e)))
    }
}
