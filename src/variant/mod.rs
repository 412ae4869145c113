//! The five program variants: vertex input layouts, stage sources and the
//! composition metadata the linker checks them against.
//!
//! Every vertex stage writes a subset of the canonical fragment-input fields
//! and every fragment stage declares which of them it reads; the linker
//! rejects a pairing whose reads are not covered by its writes.  The stage
//! sources refer to the imported contracts through their fixed variable
//! names (`u_camera`, `u_light`, `u_fog`); the concrete binding slots are
//! assigned per program at link time.

pub mod background;
pub mod instanced;
pub mod overlay;
pub mod solid;
pub mod textured;

use bytemuck::{Pod, Zeroable};

/// Fields of the canonical fragment input a vertex stage can populate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CanonicalField {
    WorldPosition,
    WorldNormal,
    Color,
    TexCoords,
    ScreenT,
    ViewDepth,
}

/// A program-local resource that needs a binding slot but is not an
/// imported contract (texture and sampler bindings).
#[derive(Clone, Copy, Debug)]
pub struct LocalResource {
    pub var_name: &'static str,
    pub wgsl_ty: &'static str,
}

/// One vertex/fragment variant pairing plus everything the linker needs to
/// compose it into an executable program.
#[derive(Clone, Copy, Debug)]
pub struct ProgramDesc {
    pub name: &'static str,
    /// Contract names, in binding-slot order.
    pub imports: &'static [&'static str],
    pub locals: &'static [LocalResource],
    pub vertex_provides: &'static [CanonicalField],
    pub fragment_requires: &'static [CanonicalField],
    pub vertex_source: &'static str,
    pub fragment_source: &'static str,
}

/// All five programs, in draw order.
pub static ALL: [&ProgramDesc; 5] = [
    &background::BACKGROUND,
    &solid::SOLID,
    &instanced::INSTANCED,
    &textured::TEXTURED,
    &overlay::OVERLAY,
];

/// Per-instance model matrix and normal matrix, decomposed into column
/// vectors for attribute binding.  The normal matrix must be the
/// inverse-transpose of the model's upper-left 3x3; it is computed by the
/// instance producer, never derived here.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct InstanceRecord {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 3]; 3],
}

impl InstanceRecord {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<InstanceRecord>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 7,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 8,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 16]>() as wgpu::BufferAddress,
                    shader_location: 9,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 19]>() as wgpu::BufferAddress,
                    shader_location: 10,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 22]>() as wgpu::BufferAddress,
                    shader_location: 11,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }

    /// An identity transform instance.
    pub fn identity() -> Self {
        Self {
            model: glam::Mat4::IDENTITY.to_cols_array_2d(),
            normal: glam::Mat3::IDENTITY.to_cols_array_2d(),
        }
    }

    /// Packs a model matrix with the matching inverse-transpose normal
    /// matrix already computed by the caller.
    pub fn new(model: glam::Mat4, normal: glam::Mat3) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal: normal.to_cols_array_2d(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_stride_covers_both_matrices() {
        let desc = InstanceRecord::desc();
        assert_eq!(desc.array_stride, (16 + 9) * 4);
        assert_eq!(desc.step_mode, wgpu::VertexStepMode::Instance);
        assert_eq!(desc.attributes.len(), 7);
    }

    #[test]
    fn every_fragment_read_is_provided_by_its_vertex_stage() {
        for program in ALL {
            for field in program.fragment_requires {
                assert!(
                    program.vertex_provides.contains(field),
                    "{}: {field:?} not provided",
                    program.name
                );
            }
        }
    }

    #[test]
    fn programs_declare_unique_names() {
        for (index, program) in ALL.iter().enumerate() {
            for other in &ALL[index + 1..] {
                assert_ne!(program.name, other.name);
            }
        }
    }
}
