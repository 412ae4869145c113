use super::{CanonicalField, ProgramDesc};

/// Instanced colored geometry: the model and normal matrices arrive as
/// per-instance attributes; fogged, halfway-vector illumination.
pub static INSTANCED: ProgramDesc = ProgramDesc {
    name: "instanced",
    imports: &["Camera", "Light", "Fog"],
    locals: &[],
    vertex_provides: &[
        CanonicalField::WorldPosition,
        CanonicalField::WorldNormal,
        CanonicalField::Color,
        CanonicalField::ScreenT,
        CanonicalField::ViewDepth,
    ],
    fragment_requires: &[
        CanonicalField::WorldPosition,
        CanonicalField::WorldNormal,
        CanonicalField::Color,
        CanonicalField::ScreenT,
        CanonicalField::ViewDepth,
    ],
    vertex_source: VERTEX,
    fragment_source: FRAGMENT,
};

const VERTEX: &str = r#"
struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) color: vec3<f32>,
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
    @location(2) color: vec3<f32>,
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
    output.color = input.color;
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
    let lit = illuminate(input.world_position, normalize(input.world_normal), u_camera, u_light)
        * input.color;
    let fog = fog_sample(input.fog_coords.x, input.fog_coords.y, u_fog);
    return vec4<f32>(mix(lit, fog.color.rgb, fog.factor), 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imports_follow_the_canonical_slot_order() {
        assert_eq!(INSTANCED.imports, ["Camera", "Light", "Fog"]);
    }

    #[test]
    fn fog_inputs_travel_from_the_vertex_stage() {
        assert!(INSTANCED.vertex_provides.contains(&CanonicalField::ScreenT));
        assert!(INSTANCED
            .vertex_provides
            .contains(&CanonicalField::ViewDepth));
    }
}
