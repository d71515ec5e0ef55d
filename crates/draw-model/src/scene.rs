use bevy_math::Mat4;
use bevy_math::Vec3;
use bytemuck::Pod;
use bytemuck::Zeroable;

use crate::model_asset::MaterialData;

/// `cbuffer SceneParameters : register(b0)`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SceneParameters {
    pub view: [f32; 16],
    pub proj: [f32; 16],
    /// Direction light travels, world space.
    pub light_dir: [f32; 4],
    pub eye_position: [f32; 3],
    pub time: f32,
}

/// `cbuffer DrawParameters : register(b1)`, one per mesh.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DrawParameters {
    pub world: [f32; 16],
    pub base_color: [f32; 4],
    pub specular: [f32; 4],
    pub ambient: [f32; 4],
    pub mode: u32,
    pub pad: [u32; 3],
}

pub const LIGHT_DIR: [f32; 4] = [0.0, -1.0, -1.0, 0.0];
pub const CLEAR_COLOR: [f32; 4] = [0.75, 0.9, 1.0, 1.0];

/// Radians per second about Y.
const ROTATION_SPEED: f32 = 0.5;

/// Replaces every material's specular and ambient terms while enabled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialOverride {
    pub enabled: bool,
    pub specular: [f32; 4],
    pub ambient: [f32; 4],
}

impl Default for MaterialOverride {
    fn default() -> Self {
        Self {
            enabled: false,
            specular: [1.0, 1.0, 1.0, 30.0],
            ambient: [0.15, 0.15, 0.15, 0.0],
        }
    }
}

impl MaterialOverride {
    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }

    pub fn draw_parameters(&self, world: Mat4, material: &MaterialData) -> DrawParameters {
        let (specular, ambient) = if self.enabled {
            (self.specular, self.ambient)
        } else {
            (material.specular, material.ambient)
        };
        DrawParameters {
            world: world.to_cols_array(),
            base_color: material.diffuse,
            specular,
            ambient,
            mode: material.alpha_mode.shader_mode(),
            pad: [0; 3],
        }
    }
}

/// Frames a model of the given bounds and spins it about its centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelCamera {
    center: Vec3,
    radius: f32,
}

impl ModelCamera {
    pub fn fit((min, max): (Vec3, Vec3)) -> Self {
        Self {
            center: (min + max) * 0.5,
            radius: ((max - min).length() * 0.5).max(0.01),
        }
    }

    pub fn eye(&self) -> Vec3 {
        Vec3::new(0.0, self.radius * 0.5, self.radius * 2.5)
    }

    /// Model to world: centred on the origin, rotated by `time`.
    pub fn world(&self, time: f32) -> Mat4 {
        Mat4::from_rotation_y(time * ROTATION_SPEED) * Mat4::from_translation(-self.center)
    }

    pub fn scene_parameters(&self, aspect_ratio: f32, time: f32) -> SceneParameters {
        let eye = self.eye();
        let view = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh(
            std::f32::consts::FRAC_PI_4,
            aspect_ratio,
            self.radius * 0.01,
            self.radius * 10.0,
        );
        SceneParameters {
            view: view.to_cols_array(),
            proj: proj.to_cols_array(),
            light_dir: LIGHT_DIR,
            eye_position: eye.to_array(),
            time,
        }
    }
}

#[cfg(test)]
mod tests {
    use bevy_math::Vec4;

    use super::*;
    use crate::model_asset::AlphaMode;

    #[test]
    fn constant_layouts() {
        assert_eq!(std::mem::size_of::<SceneParameters>(), 160);
        assert_eq!(std::mem::offset_of!(SceneParameters, eye_position), 144);
        assert_eq!(std::mem::size_of::<DrawParameters>(), 128);
        assert_eq!(std::mem::offset_of!(DrawParameters, mode), 112);
        assert_eq!(gfx_device::alignment::constant_buffer_size::<DrawParameters>(), 256);
    }

    #[test]
    fn override_replaces_lighting_terms_only() {
        let material = MaterialData {
            alpha_mode: AlphaMode::Mask,
            diffuse: [0.2, 0.4, 0.6, 0.5],
            ..MaterialData::default()
        };
        let mut material_override = MaterialOverride::default();
        let plain = material_override.draw_parameters(Mat4::IDENTITY, &material);
        assert_eq!(plain.specular, material.specular);
        assert_eq!(plain.ambient, material.ambient);
        assert_eq!(plain.mode, 1);

        material_override.toggle();
        let replaced = material_override.draw_parameters(Mat4::IDENTITY, &material);
        assert_eq!(replaced.specular, [1.0, 1.0, 1.0, 30.0]);
        assert_eq!(replaced.ambient, [0.15, 0.15, 0.15, 0.0]);
        assert_eq!(replaced.base_color, material.diffuse);
    }

    #[test]
    fn camera_frames_model_centre() {
        let camera = ModelCamera::fit((Vec3::new(9.0, 0.0, 0.0), Vec3::new(11.0, 2.0, 2.0)));
        let world = camera.world(0.0);
        assert!(world.transform_point3(Vec3::new(10.0, 1.0, 1.0)).length() < 1e-5);

        let params = camera.scene_parameters(16.0 / 9.0, 0.0);
        let clip = Mat4::from_cols_array(&params.proj)
            * Mat4::from_cols_array(&params.view)
            * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!((0.0..1.0).contains(&ndc.z));
    }

    #[test]
    fn model_spins_about_y() {
        let camera = ModelCamera::fit((Vec3::splat(-1.0), Vec3::splat(1.0)));
        let quarter_turn = std::f32::consts::FRAC_PI_2 / ROTATION_SPEED;
        let rotated = camera.world(quarter_turn).transform_point3(Vec3::X);
        assert!((rotated - Vec3::NEG_Z).length() < 1e-5);
    }
}
