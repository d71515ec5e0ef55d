use eyre::bail;
use tracing::debug;
use tracing::info;
use windows::Win32::Graphics::Direct3D::*;
use windows::Win32::Graphics::Direct3D12::D3D12CreateDevice;
use windows::Win32::Graphics::Direct3D12::ID3D12Device;
use windows::Win32::Graphics::Dxgi::*;

use crate::gfx_error::GfxResult;
use crate::gfx_error::HResultExt;

/// Feature levels tried in order when probing adapters.
pub const FEATURE_LEVELS: [D3D_FEATURE_LEVEL; 2] = [D3D_FEATURE_LEVEL_12_0, D3D_FEATURE_LEVEL_11_0];

/// Returns the first hardware adapter that can create a device, preferring
/// feature level 12_0 over 11_0.
pub fn get_hardware_adapter(
    factory: &IDXGIFactory4,
) -> GfxResult<(IDXGIAdapter1, D3D_FEATURE_LEVEL)> {
    for level in FEATURE_LEVELS {
        for i in 0.. {
            let adapter = match unsafe { factory.EnumAdapters1(i) } {
                Ok(a) => a,
                Err(e) if e.code() == DXGI_ERROR_NOT_FOUND => break,
                Err(e) => return Err(e).or_fail("EnumAdapters1"),
            };

            let desc = unsafe { adapter.GetDesc1() }.or_fail("IDXGIAdapter1::GetDesc1")?;
            let adapter_name = adapter_name(&desc.Description);

            if (DXGI_ADAPTER_FLAG(desc.Flags as i32) & DXGI_ADAPTER_FLAG_SOFTWARE)
                != DXGI_ADAPTER_FLAG_NONE
            {
                debug!("Adapter {i}: {adapter_name} (software, skipped)");
                continue;
            }

            let supported = unsafe {
                D3D12CreateDevice(
                    &adapter,
                    level,
                    std::ptr::null_mut::<Option<ID3D12Device>>(),
                )
            }
            .is_ok();
            if supported {
                info!("Using hardware adapter {i}: {adapter_name} ({level:?})");
                return Ok((adapter, level));
            }
            debug!("Adapter {i}: {adapter_name} does not support {level:?}");
        }
    }
    bail!("no hardware adapter supports Direct3D 12")
}

pub fn get_warp_adapter(factory: &IDXGIFactory4) -> GfxResult<(IDXGIAdapter1, D3D_FEATURE_LEVEL)> {
    info!("Using WARP adapter");
    let adapter = unsafe { factory.EnumWarpAdapter() }.or_fail("EnumWarpAdapter")?;
    Ok((adapter, D3D_FEATURE_LEVEL_11_0))
}

fn adapter_name(description: &[u16]) -> String {
    let len = description.iter().position(|&c| c == 0).unwrap_or(description.len());
    String::from_utf16_lossy(&description[..len])
}
