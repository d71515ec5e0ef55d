use bytemuck::Pod;
use bytemuck::Zeroable;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// Byte offset of `color`, matching the `COLOR` input element.
pub const COLOR_OFFSET: u32 = 12;

/// Counter-clockwise in clip space, so it survives back face culling.
pub const TRIANGLE: [Vertex; 3] = [
    Vertex {
        position: [0.5, -0.5, 0.0],
        color: [1.0, 0.0, 0.0, 1.0],
    },
    Vertex {
        position: [0.0, 0.5, 0.0],
        color: [0.0, 1.0, 0.0, 1.0],
    },
    Vertex {
        position: [-0.5, -0.5, 0.0],
        color: [0.0, 0.0, 1.0, 1.0],
    },
];

pub const CLEAR_COLOR: [f32; 4] = [0.75, 0.9, 1.0, 1.0];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_input_elements() {
        assert_eq!(std::mem::size_of::<Vertex>(), 28);
        assert_eq!(std::mem::offset_of!(Vertex, color), COLOR_OFFSET as usize);
        assert_eq!(bytemuck::cast_slice::<Vertex, u8>(&TRIANGLE).len(), 84);
    }

    #[test]
    fn triangle_winds_counter_clockwise() {
        let [a, b, c] = TRIANGLE.map(|v| v.position);
        let signed_area = (b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1]);
        assert!(signed_area > 0.0);
    }
}
