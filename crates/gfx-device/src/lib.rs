//! Shared Direct3D 12 device layer for the technique demos.
//!
//! Bookkeeping (descriptor slots, fence values, timing, asset lookup) builds
//! everywhere; everything that talks to D3D12, DXGI or Win32 is Windows only.

pub mod alignment;
pub mod assets;
pub mod command_line;
pub mod descriptor_slots;
pub mod fence_schedule;
pub mod frame_timer;
pub mod gfx_error;
pub mod image_data;
pub mod input;
pub mod logging;

#[cfg(windows)]
pub mod adapter;
#[cfg(windows)]
pub mod barrier;
#[cfg(windows)]
pub mod debug_layer;
#[cfg(windows)]
pub mod descriptor_heap;
#[cfg(windows)]
pub mod frame_fence;
#[cfg(windows)]
pub mod gfx_device;
#[cfg(windows)]
pub mod pipeline;
#[cfg(windows)]
pub mod runner;
#[cfg(windows)]
pub mod shader;
#[cfg(windows)]
pub mod view_desc;

pub use assets::AssetLocator;
pub use assets::ShaderStage;
pub use command_line::NoArgs;
pub use frame_timer::FrameTime;
pub use gfx_error::GfxResult;
pub use image_data::ImageData;
pub use input::KeyCode;
pub use input::keys;

#[cfg(windows)]
pub use descriptor_heap::DescriptorHandle;
#[cfg(windows)]
pub use gfx_device::ConstantBuffers;
#[cfg(windows)]
pub use gfx_device::GfxDevice;
#[cfg(windows)]
pub use gfx_device::GfxDeviceParams;
#[cfg(windows)]
pub use runner::DemoApp;
#[cfg(windows)]
pub use runner::run_demo;
#[cfg(windows)]
pub use shader::ShaderLoader;

/// Swapchain images; also the number of command allocators and fence slots.
pub const BACK_BUFFER_COUNT: usize = 3;

pub const RTV_HEAP_CAPACITY: u32 = 64;
pub const DSV_HEAP_CAPACITY: u32 = 64;
pub const CBV_SRV_UAV_HEAP_CAPACITY: u32 = 2048;
pub const SAMPLER_HEAP_CAPACITY: u32 = 2048;

/// Entry point for the demo binaries on platforms without Direct3D 12.
#[cfg(not(windows))]
pub fn unsupported_platform(title: &str) -> GfxResult<()> {
    logging::init_logging()?;
    eyre::bail!("{title} renders with Direct3D 12, which is only available on Windows")
}
