/// Constant buffer views must cover a multiple of 256 bytes.
pub const CONSTANT_BUFFER_ALIGNMENT: u64 = 256;

/// Rounds `value` up to `alignment`, which must be a power of two.
pub const fn align_up(value: u64, alignment: u64) -> u64 {
    debug_assert!(alignment.is_power_of_two());
    (value + alignment - 1) & !(alignment - 1)
}

pub const fn constant_buffer_size<T>() -> u64 {
    align_up(std::mem::size_of::<T>() as u64, CONSTANT_BUFFER_ALIGNMENT)
}

/// Thread groups needed to cover `extent` items with groups of `group_size`.
pub const fn dispatch_group_count(extent: u32, group_size: u32) -> u32 {
    extent.div_ceil(group_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_up_rounds_to_next_multiple() {
        assert_eq!(align_up(0, 256), 0);
        assert_eq!(align_up(1, 256), 256);
        assert_eq!(align_up(256, 256), 256);
        assert_eq!(align_up(257, 256), 512);
    }

    #[test]
    fn constant_buffers_are_256_aligned() {
        #[repr(C)]
        struct Scene {
            _view: [f32; 16],
            _proj: [f32; 16],
            _params: [f32; 4],
        }
        assert_eq!(std::mem::size_of::<Scene>(), 144);
        assert_eq!(constant_buffer_size::<Scene>(), 256);
        assert_eq!(constant_buffer_size::<[f32; 64]>(), 256);
        assert_eq!(constant_buffer_size::<[f32; 65]>(), 512);
    }

    #[test]
    fn dispatch_covers_partial_groups() {
        assert_eq!(dispatch_group_count(1920, 16), 120);
        assert_eq!(dispatch_group_count(1921, 16), 121);
        assert_eq!(dispatch_group_count(1, 16), 1);
    }
}
