use anyhow::{Context, Result};

use crate::linker::ProgramLinker;
use crate::uniform::UniformStore;
use crate::variant::background::BACKGROUND;

use super::{create_shader, depth_state};

/// Pipeline for the full-screen fog gradient.  Draws three vertices with no
/// vertex buffer and never touches the depth buffer.
pub struct BackgroundPipeline {
    pipeline: wgpu::RenderPipeline,
    uniform_bind_group: wgpu::BindGroup,
}

impl BackgroundPipeline {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        linker: &ProgramLinker,
        uniforms: &UniformStore,
    ) -> Result<Self> {
        let program = linker
            .link(&BACKGROUND)
            .context("failed to link background program")?;
        let shader = create_shader(device, &program);
        let (uniform_layout, uniform_bind_group) = uniforms.bind_group_for(device, &program)?;

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("background-pipeline-layout"),
            bind_group_layouts: &[&uniform_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("background-pipeline"),
            layout: Some(&pipeline_layout),
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
                    blend: Some(wgpu::BlendState::REPLACE),
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
        })
    }

    pub fn record(&self, pass: &mut wgpu::RenderPass) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}
