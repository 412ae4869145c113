use anyhow::{anyhow, Context, Result};
use wgpu::util::DeviceExt;

use crate::linker::ProgramLinker;
use crate::uniform::UniformStore;
use crate::variant::overlay::{OverlayVertex, OVERLAY};

use super::{create_shader, depth_state};

struct OverlayQuad {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    material_bind_group: wgpu::BindGroup,
}

/// Pipeline for UI-plane geometry: alpha-blended, drawn over the scene with
/// the depth test disabled.
pub struct OverlayPipeline {
    pipeline: wgpu::RenderPipeline,
    uniform_bind_group: wgpu::BindGroup,
    material_layout: wgpu::BindGroupLayout,
    sampler_binding: u32,
    texture_binding: u32,
    quads: Vec<OverlayQuad>,
}

impl OverlayPipeline {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        linker: &ProgramLinker,
        uniforms: &UniformStore,
    ) -> Result<Self> {
        let program = linker
            .link(&OVERLAY)
            .context("failed to link overlay program")?;
        let shader = create_shader(device, &program);
        let (uniform_layout, uniform_bind_group) = uniforms.bind_group_for(device, &program)?;

        let (_, sampler_binding) = program
            .binding("s_diffuse")
            .ok_or_else(|| anyhow!("overlay program has no sampler slot"))?;
        let (_, texture_binding) = program
            .binding("t_diffuse")
            .ok_or_else(|| anyhow!("overlay program has no texture slot"))?;

        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("overlay-material-layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: sampler_binding,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: texture_binding,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("overlay-pipeline-layout"),
            bind_group_layouts: &[&uniform_layout, &material_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("overlay-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[OverlayVertex::desc()],
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
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(depth_state(false, wgpu::CompareFunction::Always)),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Ok(Self {
            pipeline,
            uniform_bind_group,
            material_layout,
            sampler_binding,
            texture_binding,
            quads: Vec::new(),
        })
    }

    /// Uploads one textured plane.
    pub fn add_quad(
        &mut self,
        device: &wgpu::Device,
        texture_view: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
        vertices: &[OverlayVertex],
        indices: &[u16],
    ) {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("overlay-vertices"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("overlay-indices"),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let material_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("overlay-material"),
            layout: &self.material_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: self.sampler_binding,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: self.texture_binding,
                    resource: wgpu::BindingResource::TextureView(texture_view),
                },
            ],
        });
        self.quads.push(OverlayQuad {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
            material_bind_group,
        });
    }

    pub fn record(&self, pass: &mut wgpu::RenderPass) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        for quad in &self.quads {
            pass.set_bind_group(1, &quad.material_bind_group, &[]);
            pass.set_vertex_buffer(0, quad.vertex_buffer.slice(..));
            pass.set_index_buffer(quad.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            pass.draw_indexed(0..quad.index_count, 0, 0..1);
        }
    }
}
