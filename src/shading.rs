//! CPU reference implementations of the shading contract functions.
//!
//! These mirror the WGSL carried by the light and fog contracts term for
//! term, so the illumination and fog behavior can be pinned without a GPU.
//! The host side also uses them where the same math is needed outside a
//! shader, e.g. deriving the clear color from the fog gradient.

use glam::{Vec2, Vec3, Vec4};

use crate::contract::camera::CameraUniform;
use crate::contract::fog::FogUniform;
use crate::contract::light::LightUniform;

/// Fog color and blend factor for one fragment.  The factor lies in [0, 1);
/// compositing over the base color is the caller's job.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FogResult {
    pub color: Vec4,
    pub factor: f32,
}

/// Blinn-Phong illumination with the halfway-vector specular term.
///
/// `world_normal` must be unit length; only the halfway vector is
/// renormalized here.  The result is the unclamped ambient + diffuse +
/// specular sum; the caller multiplies by the base color.
pub fn illuminate(
    world_position: Vec3,
    world_normal: Vec3,
    camera: &CameraUniform,
    light: &LightUniform,
) -> Vec3 {
    let light_position = Vec3::from(light.position);
    let light_color = Vec3::from(light.color);

    let ambient = 0.1 * light_color;
    let light_dir = (light_position - world_position).normalize();
    let diffuse = world_normal.dot(light_dir).max(0.0) * light_color;

    let view_position = Vec3::new(
        camera.view_position[0],
        camera.view_position[1],
        camera.view_position[2],
    );
    let view_dir = (view_position - world_position).normalize();
    let halfway = (light_dir + view_dir).normalize();
    let specular = world_normal.dot(halfway).max(0.0).powf(32.0) * light_color;

    ambient + diffuse + specular
}

/// The reflect-vector specular formulation used by the textured program.
///
/// Shares the ambient and diffuse terms with [`illuminate`] but is a
/// distinct algorithm with its own numeric behavior; the two are never
/// reconciled.
pub fn illuminate_reflect(
    world_position: Vec3,
    world_normal: Vec3,
    camera: &CameraUniform,
    light: &LightUniform,
) -> Vec3 {
    let light_position = Vec3::from(light.position);
    let light_color = Vec3::from(light.color);

    let ambient = 0.1 * light_color;
    let light_dir = (light_position - world_position).normalize();
    let diffuse = world_normal.dot(light_dir).max(0.0) * light_color;

    let view_position = Vec3::new(
        camera.view_position[0],
        camera.view_position[1],
        camera.view_position[2],
    );
    let view_dir = (view_position - world_position).normalize();
    // reflect(-l, n) = 2 * dot(n, l) * n - l
    let reflect_dir = 2.0 * world_normal.dot(light_dir) * world_normal - light_dir;
    let specular = view_dir.dot(reflect_dir).max(0.0).powf(32.0) * light_color;

    ambient + diffuse + specular
}

/// Samples the fog gradient at a screen-vertical parameter and view depth.
///
/// `screen_t` is expected in [0, 1] but is not clamped; out-of-range values
/// extrapolate the gradient.
pub fn fog_sample(screen_t: f32, depth: f32, fog: &FogUniform) -> FogResult {
    let color = Vec4::from(fog.lower_color).lerp(Vec4::from(fog.upper_color), screen_t);
    let reach = (depth - fog.start).max(0.0);
    let falloff = fog.density * reach;
    FogResult {
        color,
        factor: 1.0 - (-0.5 * falloff * falloff).exp(),
    }
}

/// The caller-side fog composition rule: base color blended toward the fog
/// color by the fog factor.
pub fn apply_fog(base: Vec3, fog: &FogResult) -> Vec3 {
    base * (1.0 - fog.factor) + fog.color.truncate() * fog.factor
}

/// The textured program's texture-coordinate correction: the asset source
/// and the sampling convention disagree on the V origin, so V is flipped.
/// This is that variant's contract only; other variants pass UVs through.
pub fn flip_v(uv: Vec2) -> Vec2 {
    Vec2::new(uv.x, 1.0 - uv.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;

    fn scene() -> (CameraUniform, LightUniform) {
        (
            CameraUniform::new(Vec3::new(0.0, 0.0, 5.0), Mat4::IDENTITY),
            LightUniform::new(Vec3::new(0.0, 5.0, 0.0), Vec3::ONE),
        )
    }

    fn fog_state(density: f32, start: f32) -> FogUniform {
        FogUniform::new(
            Vec4::new(1.0, 0.294, 0.361, 1.0),
            Vec4::new(1.0, 0.765, 0.443, 1.0),
            density,
            start,
        )
    }

    #[test]
    fn illumination_is_deterministic() {
        let (camera, light) = scene();
        let position = Vec3::new(0.3, -0.2, 0.9);
        let normal = Vec3::new(0.0, 1.0, 0.0);
        let first = illuminate(position, normal, &camera, &light);
        let second = illuminate(position, normal, &camera, &light);
        assert_eq!(first, second);
    }

    #[test]
    fn result_never_drops_below_the_ambient_floor() {
        let (camera, light) = scene();
        let positions = [
            Vec3::ZERO,
            Vec3::new(1.0, 0.0, -3.0),
            Vec3::new(-2.0, -4.0, 1.0),
        ];
        for position in positions {
            let lit = illuminate(position, Vec3::Y, &camera, &light);
            let floor = 0.1 * Vec3::from(light.color);
            assert!(lit.x >= floor.x && lit.y >= floor.y && lit.z >= floor.z);
        }
    }

    #[test]
    fn end_to_end_scenario_matches_hand_computation() {
        let (camera, light) = scene();
        let lit = illuminate(Vec3::ZERO, Vec3::Y, &camera, &light);

        // ambient 0.1, diffuse dot((0,1,0), (0,1,0)) = 1, specular
        // dot(n, normalize((0,1,0) + (0,0,1)))^32 = (1/sqrt(2))^32 = 2^-16
        let expected = 0.1 + 1.0 + 2.0f32.powi(-16);
        assert!((lit.x - expected).abs() < 1e-6);
        assert!((lit.y - expected).abs() < 1e-6);
        assert!((lit.z - expected).abs() < 1e-6);

        let shaded = lit * Vec3::splat(0.5);
        assert!((shaded.x - 0.5 * expected).abs() < 1e-6);
    }

    #[test]
    fn halfway_and_reflect_formulations_diverge() {
        // off the mirror direction the two specular terms differ visibly
        let camera = CameraUniform::new(Vec3::new(0.0, 5.0, 5.0), Mat4::IDENTITY);
        let light = LightUniform::new(Vec3::new(0.0, 5.0, 0.0), Vec3::ONE);
        let halfway = illuminate(Vec3::ZERO, Vec3::Y, &camera, &light);
        let reflect = illuminate_reflect(Vec3::ZERO, Vec3::Y, &camera, &light);
        assert!((halfway.x - reflect.x).abs() > 0.01);
    }

    #[test]
    fn reflect_specular_vanishes_perpendicular_to_the_mirror_direction() {
        let (camera, light) = scene();
        // view (0,0,1) is perpendicular to reflect(-l, n) = (0,1,0)
        let lit = illuminate_reflect(Vec3::ZERO, Vec3::Y, &camera, &light);
        assert!((lit.x - 1.1).abs() < 1e-6);
    }

    #[test]
    fn fog_factor_is_monotonic_beyond_start() {
        let fog = fog_state(0.05, 5.0);
        let mut last = 0.0;
        for step in 0..200 {
            let depth = 5.0 + step as f32 * 0.5;
            let factor = fog_sample(0.5, depth, &fog).factor;
            assert!(factor >= last);
            assert!((0.0..1.0).contains(&factor));
            last = factor;
        }
    }

    #[test]
    fn fog_is_transparent_before_start() {
        let fog = fog_state(0.05, 5.0);
        for depth in [-3.0, 0.0, 2.5, 5.0] {
            assert_eq!(fog_sample(0.5, depth, &fog).factor, 0.0);
        }
    }

    #[test]
    fn zero_density_is_a_valid_degenerate_configuration() {
        let fog = fog_state(0.0, 5.0);
        for depth in [0.0, 10.0, 1000.0] {
            assert_eq!(fog_sample(0.5, depth, &fog).factor, 0.0);
        }
    }

    #[test]
    fn gradient_endpoints_hit_the_configured_colors() {
        let fog = fog_state(0.05, 5.0);
        let bottom = fog_sample(0.0, 20.0, &fog).color;
        let top = fog_sample(1.0, 20.0, &fog).color;
        assert!((bottom - Vec4::from(fog.lower_color)).abs().max_element() < 1e-6);
        assert!((top - Vec4::from(fog.upper_color)).abs().max_element() < 1e-6);
    }

    #[test]
    fn fog_composition_interpolates_toward_the_fog_color() {
        let fog = fog_state(0.2, 0.0);
        let sample = fog_sample(0.5, 50.0, &fog);
        assert!(sample.factor > 0.99);
        let composed = apply_fog(Vec3::ZERO, &sample);
        assert!((composed - sample.color.truncate()).abs().max_element() < 0.01);
    }

    #[test]
    fn v_flip_mirrors_the_vertical_coordinate() {
        let flipped = flip_v(Vec2::new(0.3, 0.8));
        assert!((flipped.x - 0.3).abs() < 1e-6);
        assert!((flipped.y - 0.2).abs() < 1e-6);
    }
}
