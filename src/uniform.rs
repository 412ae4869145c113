//! Host-side uniform state and GPU residency for the three contracts.
//!
//! The discipline is single-writer-before-frame: host code recomputes the
//! state and calls [`UniformStore::upload`] once per frame, before any
//! shading invocation reads the buffers.  Bind groups are built per linked
//! program from its own slot table.

use std::num::NonZeroU64;

use anyhow::{anyhow, Result};
use glam::{Mat4, Vec3, Vec4};
use log::info;
use wgpu::util::DeviceExt;

use crate::contract::camera::CameraUniform;
use crate::contract::fog::FogUniform;
use crate::contract::light::LightUniform;
use crate::linker::LinkedProgram;

/// Free-look camera recomputed once per frame by host code.
pub struct CameraState {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    aspect: f32,
    fovy: f32,
    znear: f32,
    zfar: f32,
}

impl CameraState {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Vec3::new(0.0, 1.0, 2.0),
            yaw: -90.0f32.to_radians(),
            pitch: 0.0,
            aspect: width as f32 / height as f32,
            fovy: 45.0,
            znear: 0.1,
            zfar: 100.0,
        }
    }

    pub fn view_dir(&self) -> Vec3 {
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        Vec3::new(cos_pitch * cos_yaw, sin_pitch, cos_pitch * sin_yaw).normalize()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.view_dir(), Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy.to_radians(), self.aspect, self.znear, self.zfar)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height as f32;
    }

    pub fn to_uniform(&self) -> CameraUniform {
        CameraUniform::new(self.position, self.projection_matrix() * self.view_matrix())
    }
}

/// Single point light, constant for the duration of a frame.
pub struct LightState {
    pub position: Vec3,
    pub color: Vec3,
}

impl Default for LightState {
    fn default() -> Self {
        Self {
            position: Vec3::new(2.0, 2.0, 2.0),
            color: Vec3::ONE,
        }
    }
}

impl LightState {
    pub fn to_uniform(&self) -> LightUniform {
        LightUniform::new(self.position, self.color)
    }
}

/// Fog gradient parameters.  The default palette is a warm sunset: pink at
/// the bottom of the screen, amber at the top.
pub struct FogState {
    pub lower_color: Vec4,
    pub upper_color: Vec4,
    pub density: f32,
    pub start: f32,
}

impl Default for FogState {
    fn default() -> Self {
        Self {
            lower_color: Vec4::new(1.0, 0.294, 0.361, 1.0),
            upper_color: Vec4::new(1.0, 0.765, 0.443, 1.0),
            density: 0.05,
            start: 5.0,
        }
    }
}

impl FogState {
    pub fn to_uniform(&self) -> FogUniform {
        FogUniform::new(self.lower_color, self.upper_color, self.density, self.start)
    }
}

/// GPU residency for the three shared uniform buffers.
pub struct UniformStore {
    pub camera: CameraState,
    pub light: LightState,
    pub fog: FogState,
    camera_buffer: wgpu::Buffer,
    light_buffer: wgpu::Buffer,
    fog_buffer: wgpu::Buffer,
}

impl UniformStore {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        info!("creating uniform store ({width}x{height})");
        let camera = CameraState::new(width, height);
        let light = LightState::default();
        let fog = FogState::default();

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("camera-uniform"),
            contents: bytemuck::bytes_of(&camera.to_uniform()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let light_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("light-uniform"),
            contents: bytemuck::bytes_of(&light.to_uniform()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let fog_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("fog-uniform"),
            contents: bytemuck::bytes_of(&fog.to_uniform()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            camera,
            light,
            fog,
            camera_buffer,
            light_buffer,
            fog_buffer,
        }
    }

    /// Writes the current frame's state; call before recording any pass
    /// that samples these buffers.
    pub fn upload(&self, queue: &wgpu::Queue) {
        queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&self.camera.to_uniform()),
        );
        queue.write_buffer(
            &self.light_buffer,
            0,
            bytemuck::bytes_of(&self.light.to_uniform()),
        );
        queue.write_buffer(&self.fog_buffer, 0, bytemuck::bytes_of(&self.fog.to_uniform()));
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.resize(width, height);
    }

    fn buffer_for(&self, contract_name: &str) -> Option<&wgpu::Buffer> {
        match contract_name {
            "Camera" => Some(&self.camera_buffer),
            "Light" => Some(&self.light_buffer),
            "Fog" => Some(&self.fog_buffer),
            _ => None,
        }
    }

    /// Builds the bind group layout and bind group matching a linked
    /// program's import slots.
    pub fn bind_group_for(
        &self,
        device: &wgpu::Device,
        program: &LinkedProgram,
    ) -> Result<(wgpu::BindGroupLayout, wgpu::BindGroup)> {
        let mut layout_entries = Vec::new();
        let mut entries = Vec::new();
        for assignment in program.uniform_bindings() {
            let buffer = self.buffer_for(&assignment.name).ok_or_else(|| {
                anyhow!(
                    "program `{}` imports `{}` but no uniform buffer backs it",
                    program.name(),
                    assignment.name
                )
            })?;
            layout_entries.push(wgpu::BindGroupLayoutEntry {
                binding: assignment.binding,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: assignment
                        .byte_size
                        .and_then(|size| NonZeroU64::new(size as u64)),
                },
                count: None,
            });
            entries.push(wgpu::BindGroupEntry {
                binding: assignment.binding,
                resource: buffer.as_entire_binding(),
            });
        }

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{}-uniforms-layout", program.name())),
            entries: &layout_entries,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{}-uniforms", program.name())),
            layout: &layout,
            entries: &entries,
        });
        Ok((layout, bind_group))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_uniform_keeps_the_padding_convention() {
        let camera = CameraState::new(800, 600);
        assert_eq!(camera.to_uniform().view_position[3], 1.0);
    }

    #[test]
    fn resize_changes_the_projection() {
        let mut camera = CameraState::new(800, 600);
        let before = camera.projection_matrix();
        camera.resize(1600, 600);
        assert_ne!(before, camera.projection_matrix());
    }

    #[test]
    fn inverse_view_projection_round_trips() {
        let camera = CameraState::new(800, 600);
        let uniform = camera.to_uniform();
        let forward = Mat4::from_cols_array_2d(&uniform.view_projection);
        let inverse = Mat4::from_cols_array_2d(&uniform.inverse_view_projection);
        let identity = forward * inverse;
        for (index, column) in Mat4::IDENTITY.to_cols_array().iter().enumerate() {
            assert!((identity.to_cols_array()[index] - column).abs() < 1e-4);
        }
    }

    #[test]
    fn fog_defaults_are_a_valid_gradient() {
        let fog = FogState::default();
        assert!(fog.density >= 0.0);
        assert_eq!(fog.to_uniform().lower_color, [1.0, 0.294, 0.361, 1.0]);
        assert_eq!(fog.to_uniform().upper_color, [1.0, 0.765, 0.443, 1.0]);
    }
}
