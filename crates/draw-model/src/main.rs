#[cfg_attr(not(windows), allow(dead_code))]
mod model_asset;
#[cfg_attr(not(windows), allow(dead_code))]
mod scene;

#[cfg(windows)]
mod draw_model;

use std::path::PathBuf;

use clap::Args;
use gfx_device::GfxResult;

pub const TITLE: &str = "D3D12 Draw Model";

#[cfg_attr(not(windows), allow(dead_code))]
#[derive(Debug, Clone, Args)]
pub struct ModelArgs {
    /// glTF or GLB file to show. Defaults to `res/model/model.glb`, then a
    /// generated cube.
    #[arg(long)]
    pub model: Option<PathBuf>,
}

#[cfg(windows)]
fn main() -> GfxResult<()> {
    gfx_device::run_demo::<draw_model::DrawModel>(env!("CARGO_MANIFEST_DIR"))
}

#[cfg(not(windows))]
fn main() -> GfxResult<()> {
    gfx_device::unsupported_platform(TITLE)
}
