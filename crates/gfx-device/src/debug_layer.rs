use tracing::info;
use tracing::warn;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::*;

/// Result of trying to turn on the D3D12 debug layer.
pub struct DebugLayer {
    pub factory_flags: DXGI_CREATE_FACTORY_FLAGS,
    pub info_queue: Option<IDXGIInfoQueue>,
}

/// Enables the debug layer in debug builds.
///
/// Prefers `ID3D12Debug1` with GPU based validation and falls back to
/// `ID3D12Debug`. A missing debug layer is not an error.
pub fn enable_debug_layer() -> DebugLayer {
    let mut layer = DebugLayer {
        factory_flags: DXGI_CREATE_FACTORY_FLAGS(0),
        info_queue: None,
    };
    if !cfg!(debug_assertions) {
        return layer;
    }

    let enabled = unsafe {
        let mut debug1: Option<ID3D12Debug1> = None;
        let mut debug: Option<ID3D12Debug> = None;
        if let Some(debug1) = D3D12GetDebugInterface(&mut debug1).ok().and(debug1) {
            debug1.EnableDebugLayer();
            debug1.SetEnableGPUBasedValidation(true);
            info!("D3D12 debug layer enabled (GPU based validation)");
            true
        } else if let Some(debug) = D3D12GetDebugInterface(&mut debug).ok().and(debug) {
            debug.EnableDebugLayer();
            info!("D3D12 debug layer enabled");
            true
        } else {
            warn!("D3D12 debug layer unavailable");
            false
        }
    };
    if !enabled {
        return layer;
    }

    layer.factory_flags |= DXGI_CREATE_FACTORY_DEBUG;
    match unsafe { DXGIGetDebugInterface1::<IDXGIInfoQueue>(0) } {
        Ok(queue) => layer.info_queue = Some(queue),
        Err(e) => warn!("DXGI info queue unavailable: {e}"),
    }
    layer
}

/// Forwards every stored DXGI debug message to `warn!` and clears the queue.
pub fn print_dxgi_debug_messages(info_queue: Option<&IDXGIInfoQueue>) {
    let Some(queue) = info_queue else {
        warn!("DXGI info queue not available");
        return;
    };
    let count = unsafe { queue.GetNumStoredMessages(DXGI_DEBUG_ALL) };
    if count == 0 {
        return;
    }
    warn!("--- {count} DXGI debug messages ---");
    for i in 0..count {
        let mut size: usize = 0;
        if unsafe { queue.GetMessage(DXGI_DEBUG_ALL, i, None, &mut size) }.is_err() {
            warn!("Failed to read size of DXGI message {i}");
            continue;
        }

        // u64 storage keeps the message header aligned
        let mut buffer = vec![0u64; size.div_ceil(8)];
        let message = buffer.as_mut_ptr() as *mut DXGI_INFO_QUEUE_MESSAGE;
        if unsafe { queue.GetMessage(DXGI_DEBUG_ALL, i, Some(message), &mut size) }.is_err() {
            warn!("Failed to read DXGI message {i}");
            continue;
        }

        let (severity, id, description) = unsafe {
            let message = &*message;
            let bytes = std::slice::from_raw_parts(
                message.pDescription as *const u8,
                message.DescriptionByteLength,
            );
            (
                message.Severity,
                message.ID,
                String::from_utf8_lossy(bytes).trim_end_matches('\0').trim().to_string(),
            )
        };
        warn!("DXGI [{} ID:{id}]: {description}", severity_name(severity));
    }
    unsafe { queue.ClearStoredMessages(DXGI_DEBUG_ALL) };
}

fn severity_name(severity: DXGI_INFO_QUEUE_MESSAGE_SEVERITY) -> &'static str {
    match severity {
        DXGI_INFO_QUEUE_MESSAGE_SEVERITY_CORRUPTION => "CORRUPTION",
        DXGI_INFO_QUEUE_MESSAGE_SEVERITY_ERROR => "ERROR",
        DXGI_INFO_QUEUE_MESSAGE_SEVERITY_WARNING => "WARNING",
        DXGI_INFO_QUEUE_MESSAGE_SEVERITY_INFO => "INFO",
        DXGI_INFO_QUEUE_MESSAGE_SEVERITY_MESSAGE => "MESSAGE",
        _ => "UNKNOWN",
    }
}
