#[cfg_attr(not(windows), allow(dead_code))]
mod plane;

#[cfg(windows)]
mod tessellation;

use gfx_device::GfxResult;

pub const TITLE: &str = "D3D12 Tessellation";

#[cfg(windows)]
fn main() -> GfxResult<()> {
    gfx_device::run_demo::<tessellation::Tessellation>(env!("CARGO_MANIFEST_DIR"))
}

#[cfg(not(windows))]
fn main() -> GfxResult<()> {
    gfx_device::unsupported_platform(TITLE)
}
