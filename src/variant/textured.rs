use bytemuck::{Pod, Zeroable};

use super::{CanonicalField, LocalResource, ProgramDesc};

/// Textured instanced geometry.  Two behaviors belong to this variant's
/// contract and to no other: the V coordinate is flipped to bridge the asset
/// source's origin convention, and the specular term uses the reflect-vector
/// formulation instead of the halfway vector.
pub static TEXTURED: ProgramDesc = ProgramDesc {
    name: "textured",
    imports: &["Camera", "Light", "Fog"],
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
    vertex_provides: &[
        CanonicalField::WorldPosition,
        CanonicalField::WorldNormal,
        CanonicalField::TexCoords,
        CanonicalField::ScreenT,
        CanonicalField::ViewDepth,
    ],
    fragment_requires: &[
        CanonicalField::WorldPosition,
        CanonicalField::WorldNormal,
        CanonicalField::TexCoords,
        CanonicalField::ScreenT,
        CanonicalField::ViewDepth,
    ],
    vertex_source: VERTEX,
    fragment_source: FRAGMENT,
};

/// Per-vertex input for the textured program.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct TexturedVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
}

impl TexturedVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<TexturedVertex>() as wgpu::BufferAddress,
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
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 5]>() as wgpu::BufferAddress,
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
    @location(1) tex_coords: vec2<f32>,
    @location(2) normal: vec3<f32>,
}

struct InstanceInput {
    @location(5) model_0: vec4<f32>,
    @location(6) model_1: vec4<f32>,
    @location(7) model_2: vec4<f32>,
    @location(8) model_3: vec4<f32>,
    @location(9) normal_0: vec3<f32>,
    @location(10) normal_1: vec3<f32>,
    @location(11) normal_2: vec3<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) tex_coords: vec2<f32>,
    @location(3) fog_coords: vec2<f32>,
}

@vertex
fn vs_main(input: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(instance.model_0, instance.model_1, instance.model_2, instance.model_3);
    let normal_matrix = mat3x3<f32>(instance.normal_0, instance.normal_1, instance.normal_2);

    var output: VertexOutput;
    let world_position = model * vec4<f32>(input.position, 1.0);
    output.world_position = world_position.xyz;
    output.clip_position = u_camera.view_projection * world_position;
    output.world_normal = normalize(normal_matrix * input.normal);
    output.tex_coords = vec2<f32>(input.tex_coords.x, 1.0 - input.tex_coords.y);
    output.fog_coords = vec2<f32>(
        output.clip_position.y / output.clip_position.w * 0.5 + 0.5,
        output.clip_position.w,
    );
    return output;
}
"#;

const FRAGMENT: &str = r#"
@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    let base = textureSample(t_diffuse, s_diffuse, input.tex_coords);
    let lit = illuminate_reflect(input.world_position, normalize(input.world_normal), u_camera, u_light)
        * base.rgb;
    let fog = fog_sample(input.fog_coords.x, input.fog_coords.y, u_fog);
    return vec4<f32>(mix(lit, fog.color.rgb, fog.factor), base.a);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_stride_packs_position_uv_normal() {
        let desc = TexturedVertex::desc();
        assert_eq!(desc.array_stride, 8 * 4);
        assert_eq!(desc.attributes[1].offset, 12);
        assert_eq!(desc.attributes[2].offset, 20);
    }

    #[test]
    fn vertex_stage_flips_the_v_coordinate() {
        assert!(TEXTURED
            .vertex_source
            .contains("1.0 - input.tex_coords.y"));
    }

    #[test]
    fn fragment_stage_uses_the_reflect_formulation() {
        assert!(TEXTURED.fragment_source.contains("illuminate_reflect("));
        assert!(!TEXTURED.fragment_source.contains("illuminate ("));
    }
}
