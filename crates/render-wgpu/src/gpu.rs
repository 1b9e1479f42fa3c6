use crate::config::{PipelineConfig, TextureSpec};
use crate::error::SceneError;
use crate::shaders::{self, ShaderProvider};
use crate::textures::TextureData;
use bytemuck::{Pod, Zeroable};
use voxelview_render::{UniformBlock, UniformLayout, UniformValue};
use wgpu::util::DeviceExt;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Background colour, shared with the sky in the fragment stages.
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.65,
    g: 0.77,
    b: 1.0,
    a: 1.0,
};

/// Device handles a scene needs to create resources and submit work.
pub struct GpuContext {
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    /// Format of the colour targets frames are rendered into.
    pub target_format: wgpu::TextureFormat,
}

impl GpuContext {
    /// Open a device on `adapter` with the adapter's own limits.
    pub fn open(
        adapter: wgpu::Adapter,
        target_format: wgpu::TextureFormat,
    ) -> Result<Self, SceneError> {
        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("voxelview_device"),
                required_features: wgpu::Features::empty(),
                required_limits: adapter.limits(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .map_err(|e| SceneError::Resource(format!("request device: {e}")))?;
        Ok(Self {
            adapter,
            device,
            queue,
            target_format,
        })
    }

    pub fn downlevel_capabilities(&self) -> wgpu::DownlevelCapabilities {
        self.adapter.get_downlevel_capabilities()
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
}

impl QuadVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Full-screen quad as two counter-clockwise triangles in clip space.
#[rustfmt::skip]
pub const QUAD_VERTICES: [QuadVertex; 6] = [
    QuadVertex { position: [-1.0, -1.0] },
    QuadVertex { position: [ 1.0, -1.0] },
    QuadVertex { position: [ 1.0,  1.0] },
    QuadVertex { position: [-1.0, -1.0] },
    QuadVertex { position: [ 1.0,  1.0] },
    QuadVertex { position: [-1.0,  1.0] },
];

struct DepthTarget {
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

/// Every GPU object one pipeline variant needs to draw a frame.
///
/// Created in one go by [`GpuResourceBundle::create`]; nothing is created
/// lazily except the depth target, which follows the colour target size.
pub struct GpuResourceBundle {
    label: &'static str,
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    uniforms: UniformBlock,
    uniform_buffer: wgpu::Buffer,
    vertex_buffer: Option<wgpu::Buffer>,
    // Bound through `bind_group`; held so they outlive it.
    _textures: Vec<wgpu::Texture>,
    depth: Option<DepthTarget>,
}

impl GpuResourceBundle {
    pub fn create(
        ctx: &GpuContext,
        config: &PipelineConfig,
        provider: &dyn ShaderProvider,
    ) -> Result<Self, SceneError> {
        let device = &ctx.device;
        let layout = UniformLayout::new(config.program.uniforms);
        let texture_data: Vec<TextureData> =
            config.textures.iter().map(|t| t.source.data()).collect();
        for (spec, data) in config.textures.iter().zip(&texture_data) {
            if data.texels.len() != data.expected_len() {
                return Err(SceneError::Resource(format!(
                    "texture {}: {} bytes of texels, expected {}",
                    spec.name,
                    data.texels.len(),
                    data.expected_len()
                )));
            }
        }

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene_bind_group_layout"),
            entries: &bind_group_layout_entries(&layout, &texture_data),
        });

        let vertex_module = compile_stage(device, provider, config.program.vertex)?;
        let fragment_module = compile_stage(device, provider, config.program.fragment)?;

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let vertex_layouts = if config.use_vertex_array {
            vec![QuadVertex::layout()]
        } else {
            Vec::new()
        };

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(config.label),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some(shaders::VERTEX_ENTRY),
                compilation_options: Default::default(),
                buffers: &vertex_layouts,
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some(shaders::FRAGMENT_ENTRY),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.target_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });
        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(SceneError::ShaderLink(err.to_string()));
        }

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let uniforms = UniformBlock::new(layout);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("scene_uniforms"),
            contents: uniforms.bytes(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let mut textures = Vec::with_capacity(texture_data.len());
        let mut views = Vec::with_capacity(texture_data.len());
        let mut samplers = Vec::with_capacity(texture_data.len());
        for (spec, data) in config.textures.iter().zip(&texture_data) {
            let texture = upload_texture(ctx, spec, data);
            views.push(texture.create_view(&wgpu::TextureViewDescriptor::default()));
            samplers.push(device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some(spec.name),
                address_mode_u: spec.wrap.address_mode(),
                address_mode_v: spec.wrap.address_mode(),
                address_mode_w: spec.wrap.address_mode(),
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                mipmap_filter: wgpu::FilterMode::Nearest,
                ..Default::default()
            }));
            textures.push(texture);
        }

        let mut entries = vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: uniform_buffer.as_entire_binding(),
        }];
        for (i, (view, sampler)) in views.iter().zip(&samplers).enumerate() {
            let (texture_binding, sampler_binding) = TextureSpec::bindings(i);
            entries.push(wgpu::BindGroupEntry {
                binding: texture_binding,
                resource: wgpu::BindingResource::TextureView(view),
            });
            entries.push(wgpu::BindGroupEntry {
                binding: sampler_binding,
                resource: wgpu::BindingResource::Sampler(sampler),
            });
        }
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene_bind_group"),
            layout: &bind_group_layout,
            entries: &entries,
        });

        let vertex_buffer = config.use_vertex_array.then(|| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("quad_vertices"),
                contents: bytemuck::cast_slice(&QUAD_VERTICES[..]),
                usage: wgpu::BufferUsages::VERTEX,
            })
        });

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(SceneError::Resource(err.to_string()));
        }

        tracing::info!(
            pipeline = config.label,
            uniform_bytes = uniforms.bytes().len(),
            textures = textures.len(),
            vertex_buffer = vertex_buffer.is_some(),
            "GPU resources created"
        );

        Ok(Self {
            label: config.label,
            pipeline,
            bind_group,
            uniforms,
            uniform_buffer,
            vertex_buffer,
            _textures: textures,
            depth: None,
        })
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Stage a named uniform for the next upload. Returns false if the program
    /// does not declare it or the type differs.
    pub fn set_uniform(&mut self, name: &str, value: impl Into<UniformValue>) -> bool {
        self.uniforms.set(name, value)
    }

    /// Copy staged uniforms to the GPU if anything changed since the last upload.
    pub fn upload(&mut self, queue: &wgpu::Queue) {
        if let Some(bytes) = self.uniforms.take_dirty() {
            queue.write_buffer(&self.uniform_buffer, 0, bytes);
        }
    }

    /// (Re)create the depth target when the colour target size changes.
    pub fn ensure_depth_target(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        if let Some(depth) = &self.depth {
            if depth.width == width && depth.height == height {
                return;
            }
        }
        tracing::debug!(width, height, "creating depth target");
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        self.depth = Some(DepthTarget {
            view: texture.create_view(&Default::default()),
            width,
            height,
        });
    }

    /// Bind pipeline, bind group and vertex buffer, then draw the quad.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        if let Some(buffer) = &self.vertex_buffer {
            pass.set_vertex_buffer(0, buffer.slice(..));
        }
        pass.draw(0..QUAD_VERTICES.len() as u32, 0..1);
    }

    /// Upload uniforms, clear `target` and its depth target, and draw one frame.
    pub fn render_frame(&mut self, ctx: &GpuContext, target: &wgpu::Texture) {
        self.ensure_depth_target(&ctx.device, target.width(), target.height());
        self.upload(&ctx.queue);

        let view = target.create_view(&wgpu::TextureViewDescriptor::default());
        let Some(depth) = &self.depth else {
            return;
        };

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("scene_encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });
            self.draw(&mut pass);
        }
        ctx.queue.submit(std::iter::once(encoder.finish()));
    }
}

fn bind_group_layout_entries(
    uniforms: &UniformLayout,
    textures: &[TextureData],
) -> Vec<wgpu::BindGroupLayoutEntry> {
    let mut entries = vec![wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(uniforms.size() as u64),
        },
        count: None,
    }];
    for (i, data) in textures.iter().enumerate() {
        let (texture_binding, sampler_binding) = TextureSpec::bindings(i);
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: texture_binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: data.view_dimension(),
                multisampled: false,
            },
            count: None,
        });
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: sampler_binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        });
    }
    entries
}

fn compile_stage(
    device: &wgpu::Device,
    provider: &dyn ShaderProvider,
    name: &str,
) -> Result<wgpu::ShaderModule, SceneError> {
    let source = provider
        .stage_source(name)
        .ok_or_else(|| SceneError::ShaderNotFound(name.to_string()))?;

    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(name),
        source: wgpu::ShaderSource::Wgsl(source),
    });
    if let Some(err) = pollster::block_on(device.pop_error_scope()) {
        return Err(SceneError::ShaderCompile {
            stage: name.to_string(),
            message: err.to_string(),
        });
    }
    tracing::debug!(stage = name, "shader stage compiled");
    Ok(module)
}

fn upload_texture(ctx: &GpuContext, spec: &TextureSpec, data: &TextureData) -> wgpu::Texture {
    let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
        label: Some(spec.name),
        size: data.size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: data.dimension,
        format: data.format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    ctx.queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &data.texels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(data.size.width * data.bytes_per_texel()),
            rows_per_image: Some(data.size.height),
        },
        data.size,
    );
    texture
}
