use bevy_math::Mat4;
use bevy_math::Vec3;
use bytemuck::Pod;
use bytemuck::Zeroable;
use gfx_device::KeyCode;
use gfx_device::keys;

/// `cbuffer SceneParameters : register(b0)`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SceneParameters {
    pub view: [f32; 16],
    pub proj: [f32; 16],
    /// x: inner factor, y: outer factor, z: 1 when filled.
    pub tess_params: [f32; 4],
    pub time: f32,
    pub reserved: [f32; 3],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
}

/// One quad patch on the XZ plane.
pub const PLANE_VERTICES: [Vertex; 4] = [
    Vertex {
        position: [-4.0, 0.0, -4.0],
    },
    Vertex {
        position: [-4.0, 0.0, 4.0],
    },
    Vertex {
        position: [4.0, 0.0, 4.0],
    },
    Vertex {
        position: [4.0, 0.0, -4.0],
    },
];

pub const PLANE_INDICES: [u32; 4] = [0, 1, 2, 3];

pub const CLEAR_COLOR: [f32; 4] = [0.75, 0.9, 1.0, 1.0];

pub const MIN_TESS_FACTOR: f32 = 1.0;
pub const MAX_TESS_FACTOR: f32 = 64.0;
const TESS_STEP: f32 = 1.0;

const EYE: Vec3 = Vec3::new(0.0, 5.0, 10.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TessSettings {
    pub inner: f32,
    pub outer: f32,
    pub fill: bool,
}

impl Default for TessSettings {
    fn default() -> Self {
        Self {
            inner: 32.0,
            outer: 32.0,
            fill: false,
        }
    }
}

impl TessSettings {
    /// `F` toggles fill, `+`/`-` step the inner factor and `]`/`[` the
    /// outer one. Returns whether the key was used.
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        match key {
            b'F' => self.fill = !self.fill,
            keys::VK_OEM_PLUS | keys::VK_ADD => self.inner = step(self.inner, TESS_STEP),
            keys::VK_OEM_MINUS | keys::VK_SUBTRACT => self.inner = step(self.inner, -TESS_STEP),
            keys::VK_OEM_6 => self.outer = step(self.outer, TESS_STEP),
            keys::VK_OEM_4 => self.outer = step(self.outer, -TESS_STEP),
            _ => return false,
        }
        true
    }

    pub fn tess_params(&self) -> [f32; 4] {
        [self.inner, self.outer, if self.fill { 1.0 } else { 0.0 }, 0.0]
    }
}

fn step(value: f32, delta: f32) -> f32 {
    (value + delta).clamp(MIN_TESS_FACTOR, MAX_TESS_FACTOR)
}

pub fn scene_parameters(settings: &TessSettings, aspect_ratio: f32, time: f32) -> SceneParameters {
    let view = Mat4::look_at_rh(EYE, Vec3::ZERO, Vec3::Y);
    let proj = Mat4::perspective_rh(std::f32::consts::FRAC_PI_4, aspect_ratio, 0.1, 100.0);
    SceneParameters {
        view: view.to_cols_array(),
        proj: proj.to_cols_array(),
        tess_params: settings.tess_params(),
        time,
        reserved: [0.0; 3],
    }
}

#[cfg(test)]
mod tests {
    use bevy_math::Vec4;

    use super::*;

    #[test]
    fn constant_layout() {
        assert_eq!(std::mem::size_of::<SceneParameters>(), 160);
        assert_eq!(std::mem::offset_of!(SceneParameters, tess_params), 128);
        assert_eq!(std::mem::offset_of!(SceneParameters, time), 144);
        assert_eq!(gfx_device::alignment::constant_buffer_size::<SceneParameters>(), 256);
    }

    #[test]
    fn factors_clamp_to_hardware_range() {
        let mut settings = TessSettings::default();
        for _ in 0..100 {
            settings.handle_key(keys::VK_OEM_PLUS);
            settings.handle_key(keys::VK_OEM_6);
        }
        assert_eq!((settings.inner, settings.outer), (64.0, 64.0));
        for _ in 0..100 {
            settings.handle_key(keys::VK_SUBTRACT);
            settings.handle_key(keys::VK_OEM_4);
        }
        assert_eq!((settings.inner, settings.outer), (1.0, 1.0));
        settings.handle_key(keys::VK_ADD);
        assert_eq!(settings.inner, 2.0);
    }

    #[test]
    fn fill_toggle_drives_tess_params() {
        let mut settings = TessSettings::default();
        assert_eq!(settings.tess_params(), [32.0, 32.0, 0.0, 0.0]);
        assert!(settings.handle_key(b'F'));
        assert_eq!(settings.tess_params()[2], 1.0);
        assert!(!settings.handle_key(b'Q'));
    }

    #[test]
    fn plane_centre_is_in_view() {
        let params = scene_parameters(&TessSettings::default(), 16.0 / 9.0, 0.0);
        let view = Mat4::from_cols_array(&params.view);
        let proj = Mat4::from_cols_array(&params.proj);
        let clip = proj * view * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip / clip.w;
        assert!(ndc.x.abs() < 1e-5);
        assert!(ndc.y.abs() < 1e-5);
        assert!((0.0..1.0).contains(&ndc.z));
    }

    #[test]
    fn plane_is_a_single_quad_patch() {
        assert_eq!(PLANE_INDICES.len(), 4);
        assert!(PLANE_VERTICES.iter().all(|v| v.position[1] == 0.0));
    }
}
