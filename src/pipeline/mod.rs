//! Host-side render pipeline builders, one per linked program.
//!
//! Each builder links its program, creates the shader module from the
//! emitted WGSL and derives its bind group layouts from the program's slot
//! table.  Geometry, instance matrices and textures are handed in by the
//! caller; the builders only own GPU residency and draw recording.

pub mod background;
pub mod instanced;
pub mod overlay;
pub mod solid;
pub mod textured;

use anyhow::{Context, Result};
use log::info;

use crate::linker::{LinkedProgram, ProgramLinker};
use crate::shading;
use crate::uniform::{FogState, UniformStore};

pub use background::BackgroundPipeline;
pub use instanced::InstancedPipeline;
pub use overlay::OverlayPipeline;
pub use solid::SolidPipeline;
pub use textured::TexturedPipeline;

/// Depth attachment format shared by every pipeline.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Depth attachment sized to the render target.
pub struct DepthBuffer {
    _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl DepthBuffer {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth-buffer"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
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
        Self {
            _texture: texture,
            view,
        }
    }
}

pub(crate) fn create_shader(device: &wgpu::Device, program: &LinkedProgram) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(program.name()),
        source: wgpu::ShaderSource::Wgsl(program.source().into()),
    })
}

pub(crate) fn depth_state(
    depth_write_enabled: bool,
    depth_compare: wgpu::CompareFunction,
) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled,
        depth_compare,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

/// One pipeline per linked program, sharing a single uniform store.
pub struct Pipelines {
    pub background: BackgroundPipeline,
    pub solid: SolidPipeline,
    pub instanced: InstancedPipeline,
    pub textured: TexturedPipeline,
    pub overlay: OverlayPipeline,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        linker: &ProgramLinker,
        uniforms: &UniformStore,
    ) -> Result<Self> {
        info!("building pipelines for all programs");
        Ok(Self {
            background: BackgroundPipeline::new(device, format, linker, uniforms)
                .context("failed to build background pipeline")?,
            solid: SolidPipeline::new(device, format, linker, uniforms)
                .context("failed to build solid pipeline")?,
            instanced: InstancedPipeline::new(device, format, linker, uniforms)
                .context("failed to build instanced pipeline")?,
            textured: TexturedPipeline::new(device, format, linker, uniforms)
                .context("failed to build textured pipeline")?,
            overlay: OverlayPipeline::new(device, format, linker, uniforms)
                .context("failed to build overlay pipeline")?,
        })
    }

    /// Clear color matching the top of the fog gradient, so geometry that
    /// escapes the background triangle still fades into the same sky.
    pub fn clear_color(fog: &FogState) -> wgpu::Color {
        let sample = shading::fog_sample(
            1.0,
            crate::variant::background::BACKGROUND_DEPTH,
            &fog.to_uniform(),
        );
        wgpu::Color {
            r: sample.color.x as f64,
            g: sample.color.y as f64,
            b: sample.color.z as f64,
            a: sample.color.w as f64,
        }
    }

    /// Records every program's draws in the fixed order: background first,
    /// lit geometry, then the UI plane.
    pub fn record(&self, pass: &mut wgpu::RenderPass) {
        self.background.record(pass);
        self.solid.record(pass);
        self.instanced.record(pass);
        self.textured.record(pass);
        self.overlay.record(pass);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_color_matches_the_upper_gradient_stop() {
        let fog = FogState::default();
        let color = Pipelines::clear_color(&fog);
        assert!((color.r - 1.0).abs() < 1e-6);
        assert!((color.g - 0.765).abs() < 1e-6);
        assert!((color.b - 0.443).abs() < 1e-6);
    }
}
