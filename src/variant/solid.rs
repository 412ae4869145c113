use bytemuck::{Pod, Zeroable};

use super::{CanonicalField, ProgramDesc};

/// Static colored geometry: one vertex stream, identity model transform,
/// halfway-vector illumination, no fog.
pub static SOLID: ProgramDesc = ProgramDesc {
    name: "solid",
    imports: &["Camera", "Light"],
    locals: &[],
    vertex_provides: &[
        CanonicalField::WorldPosition,
        CanonicalField::WorldNormal,
        CanonicalField::Color,
    ],
    fragment_requires: &[
        CanonicalField::WorldPosition,
        CanonicalField::WorldNormal,
        CanonicalField::Color,
    ],
    vertex_source: VERTEX,
    fragment_source: FRAGMENT,
};

/// Per-vertex input for the colored programs.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct ColorVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub normal: [f32; 3],
}

impl ColorVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ColorVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

const VERTEX: &str = r#"
struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) color: vec3<f32>,
    @location(2) normal: vec3<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) color: vec3<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var output: VertexOutput;
    output.world_position = input.position;
    output.clip_position = u_camera.view_projection * vec4<f32>(input.position, 1.0);
    output.world_normal = normalize(input.normal);
    output.color = input.color;
    return output;
}
"#;

const FRAGMENT: &str = r#"
@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    let lit = illuminate(input.world_position, normalize(input.world_normal), u_camera, u_light);
    return vec4<f32>(lit * input.color, 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_stride_packs_three_vec3_attributes() {
        let desc = ColorVertex::desc();
        assert_eq!(desc.array_stride, 9 * 4);
        assert_eq!(desc.attributes.len(), 3);
        assert_eq!(desc.attributes[2].offset, 24);
    }

    #[test]
    fn solid_does_not_import_fog() {
        assert!(!SOLID.imports.contains(&"Fog"));
    }
}
