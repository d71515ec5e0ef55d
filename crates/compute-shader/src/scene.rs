use bevy_math::Mat4;
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
    /// x: filter mode, y: hue offset.
    pub mode_params: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub texcoord: [f32; 2],
}

pub const TEXCOORD_OFFSET: u32 = 12;

pub const QUAD_WIDTH: f32 = 480.0;
pub const QUAD_HEIGHT: f32 = 270.0;
/// Half the gap between the two quads.
pub const QUAD_OFFSET: f32 = 10.0;

pub const VERTICES_PER_QUAD: u32 = 4;

/// Compute thread group edge, matching `[numthreads(16, 16, 1)]`.
pub const FILTER_GROUP_SIZE: u32 = 16;

pub const CLEAR_COLOR: [f32; 4] = [0.75, 0.9, 1.0, 1.0];

/// Size of the generated image when no file is found.
pub const PLACEHOLDER_SIZE: (u32, u32) = (512, 512);

const HUE_STEP: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Sepia = 0,
    HueShift = 1,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSettings {
    pub mode: FilterMode,
    pub hue_offset: f32,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            mode: FilterMode::Sepia,
            hue_offset: 0.5,
        }
    }
}

impl FilterSettings {
    /// `M` toggles the mode, Up/Down move the hue offset within `[0, 1]`.
    /// Returns whether the key was used.
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        match key {
            b'M' => {
                self.mode = match self.mode {
                    FilterMode::Sepia => FilterMode::HueShift,
                    FilterMode::HueShift => FilterMode::Sepia,
                };
            }
            keys::VK_UP => self.hue_offset = (self.hue_offset + HUE_STEP).min(1.0),
            keys::VK_DOWN => self.hue_offset = (self.hue_offset - HUE_STEP).max(0.0),
            _ => return false,
        }
        true
    }

    pub fn mode_params(&self) -> [f32; 4] {
        [self.mode as i32 as f32, self.hue_offset, 0.0, 0.0]
    }
}

/// Pixel-space orthographic camera covering a 1280x720 canvas centred on
/// the origin.
pub fn scene_parameters(settings: &FilterSettings) -> SceneParameters {
    SceneParameters {
        view: Mat4::IDENTITY.to_cols_array(),
        proj: Mat4::orthographic_rh(-640.0, 640.0, -360.0, 360.0, -100.0, 100.0).to_cols_array(),
        mode_params: settings.mode_params(),
    }
}

/// Two triangle-strip quads: source on the left, filtered on the right.
pub fn quad_vertices() -> [Vertex; 8] {
    let half_height = QUAD_HEIGHT / 2.0;
    let quad = |left: f32| {
        let right = left + QUAD_WIDTH;
        [
            Vertex {
                position: [left, -half_height, 0.0],
                texcoord: [0.0, 1.0],
            },
            Vertex {
                position: [right, -half_height, 0.0],
                texcoord: [1.0, 1.0],
            },
            Vertex {
                position: [left, half_height, 0.0],
                texcoord: [0.0, 0.0],
            },
            Vertex {
                position: [right, half_height, 0.0],
                texcoord: [1.0, 0.0],
            },
        ]
    };
    let [a, b, c, d] = quad(-QUAD_WIDTH - QUAD_OFFSET);
    let [e, f, g, h] = quad(QUAD_OFFSET);
    [a, b, c, d, e, f, g, h]
}

#[cfg(test)]
mod tests {
    use bevy_math::Vec4;

    use super::*;

    #[test]
    fn constant_layout() {
        assert_eq!(std::mem::size_of::<SceneParameters>(), 144);
        assert_eq!(gfx_device::alignment::constant_buffer_size::<SceneParameters>(), 256);
        assert_eq!(std::mem::offset_of!(Vertex, texcoord), TEXCOORD_OFFSET as usize);
    }

    #[test]
    fn starts_in_sepia_at_half_hue_turn() {
        let settings = FilterSettings::default();
        assert_eq!(settings.mode, FilterMode::Sepia);
        assert_eq!(settings.mode_params(), [0.0, 0.5, 0.0, 0.0]);
    }

    #[test]
    fn keys_drive_filter_settings() {
        let mut settings = FilterSettings::default();
        assert!(settings.handle_key(b'M'));
        assert_eq!(settings.mode, FilterMode::HueShift);
        assert_eq!(settings.mode_params()[0], 1.0);

        for _ in 0..30 {
            settings.handle_key(keys::VK_UP);
        }
        assert_eq!(settings.hue_offset, 1.0);
        settings.handle_key(keys::VK_DOWN);
        assert!((settings.hue_offset - 0.95).abs() < 1e-6);
        for _ in 0..30 {
            settings.handle_key(keys::VK_DOWN);
        }
        assert_eq!(settings.hue_offset, 0.0);

        assert!(settings.handle_key(b'M'));
        assert_eq!(settings.mode, FilterMode::Sepia);
        assert!(!settings.handle_key(b'X'));
    }

    #[test]
    fn quads_sit_either_side_of_centre() {
        let vertices = quad_vertices();
        let xs: Vec<f32> = vertices.iter().map(|v| v.position[0]).collect();
        assert_eq!(xs, vec![-490.0, -10.0, -490.0, -10.0, 10.0, 490.0, 10.0, 490.0]);
        assert!(vertices.iter().all(|v| v.position[1].abs() == 135.0));
    }

    #[test]
    fn strip_front_faces_are_counter_clockwise() {
        let v = quad_vertices();
        let (a, b, c) = (v[0].position, v[1].position, v[2].position);
        let signed_area = (b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1]);
        assert!(signed_area > 0.0);
    }

    #[test]
    fn projection_maps_canvas_corners_to_clip_edges() {
        let params = scene_parameters(&FilterSettings::default());
        let proj = Mat4::from_cols_array(&params.proj);
        let corner = proj * Vec4::new(640.0, 360.0, 0.0, 1.0);
        assert!((corner.x - 1.0).abs() < 1e-5);
        assert!((corner.y - 1.0).abs() < 1e-5);
        assert!((0.0..=1.0).contains(&corner.z));
    }

    #[test]
    fn dispatch_covers_odd_sizes() {
        use gfx_device::alignment::dispatch_group_count;
        assert_eq!(dispatch_group_count(500, FILTER_GROUP_SIZE), 32);
        assert_eq!(dispatch_group_count(512, FILTER_GROUP_SIZE), 32);
    }
}
