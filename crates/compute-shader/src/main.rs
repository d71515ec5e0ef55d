#[cfg_attr(not(windows), allow(dead_code))]
mod scene;

#[cfg(windows)]
mod compute_shader;

use std::path::PathBuf;

use clap::Args;
use gfx_device::GfxResult;

pub const TITLE: &str = "D3D12 Compute Shader Filter";

#[cfg_attr(not(windows), allow(dead_code))]
#[derive(Debug, Clone, Args)]
pub struct FilterArgs {
    /// Image to filter. Defaults to `res/texture/image.png`.
    #[arg(long)]
    pub image: Option<PathBuf>,
}

#[cfg(windows)]
fn main() -> GfxResult<()> {
    gfx_device::run_demo::<compute_shader::ComputeShader>(env!("CARGO_MANIFEST_DIR"))
}

#[cfg(not(windows))]
fn main() -> GfxResult<()> {
    gfx_device::unsupported_platform(TITLE)
}
