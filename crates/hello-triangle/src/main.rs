#[cfg_attr(not(windows), allow(dead_code))]
mod vertex;

#[cfg(windows)]
mod hello_triangle;

use gfx_device::GfxResult;

pub const TITLE: &str = "D3D12 Hello Triangle";

#[cfg(windows)]
fn main() -> GfxResult<()> {
    gfx_device::run_demo::<hello_triangle::HelloTriangle>(env!("CARGO_MANIFEST_DIR"))
}

#[cfg(not(windows))]
fn main() -> GfxResult<()> {
    gfx_device::unsupported_platform(TITLE)
}
