use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use super::{Contract, ContractField, WgslType};

/// Canonical camera contract.  Every importing program sees this exact
/// layout; the inverse matrix is always carried so that no two importers can
/// disagree on the struct shape.
pub const CAMERA: Contract = Contract {
    name: "Camera",
    var_name: "u_camera",
    fields: &[
        ContractField {
            name: "view_position",
            ty: WgslType::Vec4,
        },
        ContractField {
            name: "view_projection",
            ty: WgslType::Mat4,
        },
        ContractField {
            name: "inverse_view_projection",
            ty: WgslType::Mat4,
        },
    ],
    requires: &[],
    functions: "",
};

/// Host-side payload matching [`CAMERA`] byte for byte.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_position: [f32; 4],
    pub view_projection: [[f32; 4]; 4],
    pub inverse_view_projection: [[f32; 4]; 4],
}

impl CameraUniform {
    /// Packs a view position and view-projection matrix.  The position's w
    /// component is the 1.0 padding convention and is never read by shaders.
    pub fn new(position: Vec3, view_projection: Mat4) -> Self {
        Self {
            view_position: position.extend(1.0).into(),
            view_projection: view_projection.to_cols_array_2d(),
            inverse_view_projection: view_projection.inverse().to_cols_array_2d(),
        }
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Mat4::IDENTITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_matches_contract_layout() {
        assert_eq!(std::mem::size_of::<CameraUniform>() as u32, CAMERA.byte_size());
        assert_eq!(CAMERA.byte_size(), 144);
    }

    #[test]
    fn view_position_carries_padding_one() {
        let uniform = CameraUniform::new(Vec3::new(1.0, 2.0, 3.0), Mat4::IDENTITY);
        assert_eq!(uniform.view_position, [1.0, 2.0, 3.0, 1.0]);
    }
}
