//! Uniform contracts shared across shader programs.
//!
//! A contract is declared exactly once, as a list of typed fields.  Both the
//! WGSL struct declaration emitted into every importing program and the
//! uniform-buffer byte layout checked against host uploads are derived from
//! that single declaration, so the two can never drift apart.  Programs refer
//! to a contract by name; the linker assigns the concrete binding slot per
//! program.

pub mod camera;
pub mod fog;
pub mod light;

/// Scalar, vector and matrix types permitted in a uniform contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WgslType {
    F32,
    Vec2,
    Vec3,
    Vec4,
    Mat3,
    Mat4,
}

impl WgslType {
    /// Alignment of the type in the WGSL uniform address space.
    pub fn align(self) -> u32 {
        match self {
            WgslType::F32 => 4,
            WgslType::Vec2 => 8,
            WgslType::Vec3 | WgslType::Vec4 | WgslType::Mat3 | WgslType::Mat4 => 16,
        }
    }

    /// Size in bytes, including the internal row padding of matrices.
    pub fn size(self) -> u32 {
        match self {
            WgslType::F32 => 4,
            WgslType::Vec2 => 8,
            WgslType::Vec3 => 12,
            WgslType::Vec4 => 16,
            WgslType::Mat3 => 48,
            WgslType::Mat4 => 64,
        }
    }

    /// WGSL spelling of the type.
    pub fn wgsl(self) -> &'static str {
        match self {
            WgslType::F32 => "f32",
            WgslType::Vec2 => "vec2<f32>",
            WgslType::Vec3 => "vec3<f32>",
            WgslType::Vec4 => "vec4<f32>",
            WgslType::Mat3 => "mat3x3<f32>",
            WgslType::Mat4 => "mat4x4<f32>",
        }
    }
}

/// One named field of a uniform contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContractField {
    pub name: &'static str,
    pub ty: WgslType,
}

/// A uniform data shape importable into any program under a
/// program-assigned binding slot.
#[derive(Clone, Debug)]
pub struct Contract {
    /// WGSL struct name; also the registry key and import name.
    pub name: &'static str,
    /// Module-scope variable the stage sources refer to.
    pub var_name: &'static str,
    pub fields: &'static [ContractField],
    /// Names of other contracts the carried functions depend on.
    pub requires: &'static [&'static str],
    /// WGSL functions carried with the contract, emitted once per importing
    /// program.  Parameters only; no hidden module-scope reads.
    pub functions: &'static str,
}

impl Contract {
    /// Renders the canonical WGSL struct declaration.
    pub fn struct_decl(&self) -> String {
        let mut decl = format!("struct {} {{\n", self.name);
        for field in self.fields {
            decl.push_str(&format!("    {}: {},\n", field.name, field.ty.wgsl()));
        }
        decl.push_str("}\n");
        decl
    }

    /// Byte size of the contract under the uniform-buffer ABI.
    pub fn byte_size(&self) -> u32 {
        let mut offset = 0u32;
        for field in self.fields {
            offset = round_up(offset, field.ty.align()) + field.ty.size();
        }
        round_up(offset, 16)
    }

    /// True when `other` declares a structurally identical layout.
    pub fn matches(&self, other: &Contract) -> bool {
        self.name == other.name && self.var_name == other.var_name && self.fields == other.fields
    }
}

fn round_up(value: u32, align: u32) -> u32 {
    value.next_multiple_of(align)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec3_fields_pad_to_vector_alignment() {
        let contract = Contract {
            name: "Probe",
            var_name: "u_probe",
            fields: &[
                ContractField {
                    name: "a",
                    ty: WgslType::Vec3,
                },
                ContractField {
                    name: "b",
                    ty: WgslType::Vec3,
                },
            ],
            requires: &[],
            functions: "",
        };
        // a at 0..12, b at 16..28, struct rounded to 32
        assert_eq!(contract.byte_size(), 32);
    }

    #[test]
    fn struct_decl_lists_fields_in_order() {
        let decl = super::camera::CAMERA.struct_decl();
        let view_position = decl.find("view_position").unwrap();
        let view_projection = decl.find("view_projection:").unwrap();
        let inverse = decl.find("inverse_view_projection").unwrap();
        assert!(view_position < view_projection);
        assert!(view_projection < inverse);
    }

    #[test]
    fn mismatched_field_order_is_not_structurally_equal() {
        let reversed = Contract {
            name: "Light",
            var_name: "u_light",
            fields: &[
                ContractField {
                    name: "color",
                    ty: WgslType::Vec3,
                },
                ContractField {
                    name: "position",
                    ty: WgslType::Vec3,
                },
            ],
            requires: &[],
            functions: "",
        };
        assert!(!super::light::LIGHT.matches(&reversed));
        assert!(super::light::LIGHT.matches(&super::light::LIGHT.clone()));
    }
}
