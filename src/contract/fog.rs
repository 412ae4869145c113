use bytemuck::{Pod, Zeroable};
use glam::Vec4;

use super::{Contract, ContractField, WgslType};

/// Screen-gradient atmospheric fog.  `density == 0` is a valid degenerate
/// configuration: the factor is zero everywhere.
pub const FOG: Contract = Contract {
    name: "Fog",
    var_name: "u_fog",
    fields: &[
        ContractField {
            name: "lower_color",
            ty: WgslType::Vec4,
        },
        ContractField {
            name: "upper_color",
            ty: WgslType::Vec4,
        },
        ContractField {
            name: "density",
            ty: WgslType::F32,
        },
        ContractField {
            name: "start",
            ty: WgslType::F32,
        },
    ],
    requires: &[],
    functions: FOG_FUNCTIONS,
};

/// Host-side payload matching [`FOG`] byte for byte.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct FogUniform {
    pub lower_color: [f32; 4],
    pub upper_color: [f32; 4],
    pub density: f32,
    pub start: f32,
    _padding: [f32; 2],
}

impl FogUniform {
    pub fn new(lower_color: Vec4, upper_color: Vec4, density: f32, start: f32) -> Self {
        Self {
            lower_color: lower_color.into(),
            upper_color: upper_color.into(),
            density,
            start,
            _padding: [0.0; 2],
        }
    }
}

/// The squared-exponential falloff grows smoothly from zero at
/// `depth <= start`.  Blending the result over the base color is the
/// caller's job; fog is one of several optional modifiers.
const FOG_FUNCTIONS: &str = r#"
struct FogResult {
    color: vec4<f32>,
    factor: f32,
}

fn fog_sample(screen_t: f32, depth: f32, fog: Fog) -> FogResult {
    let color = mix(fog.lower_color, fog.upper_color, screen_t);
    let reach = max(depth - fog.start, 0.0);
    let falloff = fog.density * reach;
    let factor = 1.0 - exp(-0.5 * falloff * falloff);
    return FogResult(color, factor);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_matches_contract_layout() {
        assert_eq!(std::mem::size_of::<FogUniform>() as u32, FOG.byte_size());
        assert_eq!(FOG.byte_size(), 48);
    }
}
