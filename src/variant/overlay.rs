use bytemuck::{Pod, Zeroable};

use super::{CanonicalField, LocalResource, ProgramDesc};

/// UI-plane geometry: a textured quad in world space with no lighting and no
/// fog.  Texture coordinates pass through unmodified; this is the deliberate
/// contrast to the textured program's V flip.
pub static OVERLAY: ProgramDesc = ProgramDesc {
    name: "overlay",
    imports: &["Camera"],
    locals: &[
        LocalResource {
            var_name: "s_diffuse",
            wgsl_ty: "sampler",
        },
        LocalResource {
            var_name: "t_diffuse",
            wgsl_ty: "texture_2d<f32>",
        },
    ],
    vertex_provides: &[CanonicalField::TexCoords],
    fragment_requires: &[CanonicalField::TexCoords],
    vertex_source: VERTEX,
    fragment_source: FRAGMENT,
};

/// Per-vertex input for the UI-plane program.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct OverlayVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl OverlayVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<OverlayVertex>() as wgpu::BufferAddress,
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
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

const VERTEX: &str = r#"
struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) tex_coords: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) tex_coords: vec2<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var output: VertexOutput;
    output.clip_position = u_camera.view_projection * vec4<f32>(input.position, 1.0);
    output.tex_coords = input.tex_coords;
    return output;
}
"#;

const FRAGMENT: &str = r#"
@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(t_diffuse, s_diffuse, input.tex_coords);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texture_coordinates_pass_through_unmodified() {
        assert!(OVERLAY
            .vertex_source
            .contains("output.tex_coords = input.tex_coords;"));
        assert!(!OVERLAY.vertex_source.contains("1.0 -"));
    }

    #[test]
    fn overlay_needs_neither_light_nor_fog() {
        assert_eq!(OVERLAY.imports, ["Camera"]);
    }
}
