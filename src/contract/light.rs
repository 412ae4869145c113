use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use super::{Contract, ContractField, WgslType};

/// Single point light.  There is deliberately no array or count field; one
/// light per program instance is part of the contract.
pub const LIGHT: Contract = Contract {
    name: "Light",
    var_name: "u_light",
    fields: &[
        ContractField {
            name: "position",
            ty: WgslType::Vec3,
        },
        ContractField {
            name: "color",
            ty: WgslType::Vec3,
        },
    ],
    requires: &["Camera"],
    functions: ILLUMINATION_FUNCTIONS,
};

/// Host-side payload matching [`LIGHT`] byte for byte.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct LightUniform {
    pub position: [f32; 3],
    _padding: u32,
    pub color: [f32; 3],
    _padding2: u32,
}

impl LightUniform {
    pub fn new(position: Vec3, color: Vec3) -> Self {
        Self {
            position: position.into(),
            _padding: 0,
            color: color.into(),
            _padding2: 0,
        }
    }
}

/// Both specular formulations are kept: the halfway-vector form used by the
/// color programs and the reflect-vector form used by the textured program.
/// They are distinct algorithms sharing the ambient and diffuse terms and
/// must not be unified.
const ILLUMINATION_FUNCTIONS: &str = r#"
fn illuminate(world_position: vec3<f32>, world_normal: vec3<f32>, camera: Camera, light: Light) -> vec3<f32> {
    let ambient = 0.1 * light.color;
    let light_dir = normalize(light.position - world_position);
    let diffuse = max(dot(world_normal, light_dir), 0.0) * light.color;
    let view_dir = normalize(camera.view_position.xyz - world_position);
    let halfway = normalize(light_dir + view_dir);
    let specular = pow(max(dot(world_normal, halfway), 0.0), 32.0) * light.color;
    return ambient + diffuse + specular;
}

fn illuminate_reflect(world_position: vec3<f32>, world_normal: vec3<f32>, camera: Camera, light: Light) -> vec3<f32> {
    let ambient = 0.1 * light.color;
    let light_dir = normalize(light.position - world_position);
    let diffuse = max(dot(world_normal, light_dir), 0.0) * light.color;
    let view_dir = normalize(camera.view_position.xyz - world_position);
    let reflect_dir = reflect(-light_dir, world_normal);
    let specular = pow(max(dot(view_dir, reflect_dir), 0.0), 32.0) * light.color;
    return ambient + diffuse + specular;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_matches_contract_layout() {
        assert_eq!(std::mem::size_of::<LightUniform>() as u32, LIGHT.byte_size());
        assert_eq!(LIGHT.byte_size(), 32);
    }

    #[test]
    fn illumination_needs_the_camera_contract() {
        assert_eq!(LIGHT.requires, ["Camera"]);
    }
}
