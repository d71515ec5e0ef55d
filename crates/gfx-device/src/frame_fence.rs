use eyre::bail;
use windows::Win32::Foundation::CloseHandle;
use windows::Win32::Foundation::GetLastError;
use windows::Win32::Foundation::HANDLE;
use windows::Win32::Foundation::WAIT_EVENT;
use windows::Win32::Foundation::WAIT_FAILED;
use windows::Win32::Foundation::WAIT_OBJECT_0;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::System::Threading::CreateEventA;
use windows::Win32::System::Threading::INFINITE;
use windows::Win32::System::Threading::WaitForSingleObjectEx;

use crate::BACK_BUFFER_COUNT;
use crate::fence_schedule::FenceSchedule;
use crate::gfx_error::GfxResult;
use crate::gfx_error::HResultExt;

/// The single frame fence, its wait event and the per image values.
pub struct FrameFence {
    fence: ID3D12Fence,
    event: HANDLE,
    schedule: FenceSchedule<BACK_BUFFER_COUNT>,
}

impl FrameFence {
    pub fn new(device: &ID3D12Device, frame_index: usize) -> GfxResult<Self> {
        let fence: ID3D12Fence =
            unsafe { device.CreateFence(0, D3D12_FENCE_FLAG_NONE) }.or_fail("CreateFence")?;
        let event = unsafe { CreateEventA(None, false, false, None) }.or_fail("CreateEventA")?;
        Ok(Self {
            fence,
            event,
            schedule: FenceSchedule::starting_at(frame_index),
        })
    }

    /// Signals the value for `current`, then blocks until the work last
    /// submitted through `next` has finished.
    pub fn move_to_next_frame(
        &mut self,
        queue: &ID3D12CommandQueue,
        current: usize,
        next: usize,
    ) -> GfxResult<()> {
        let step = self.schedule.advance(current, next);
        unsafe { queue.Signal(&self.fence, step.signal) }.or_fail("ID3D12CommandQueue::Signal")?;
        self.wait_for(step.wait_for)
    }

    /// Blocks until everything submitted to `queue` so far has finished.
    pub fn flush(&mut self, queue: &ID3D12CommandQueue, current: usize) -> GfxResult<()> {
        let value = self.schedule.flush(current);
        unsafe { queue.Signal(&self.fence, value) }.or_fail("ID3D12CommandQueue::Signal")?;
        self.wait_for(value)
    }

    fn wait_for(&self, value: u64) -> GfxResult<()> {
        if unsafe { self.fence.GetCompletedValue() } < value {
            unsafe { self.fence.SetEventOnCompletion(value, self.event) }
                .or_fail("ID3D12Fence::SetEventOnCompletion")?;
            let result = unsafe { WaitForSingleObjectEx(self.event, INFINITE, false) };
            check_wait(result, value)?;
        }
        Ok(())
    }
}

/// Anything but a signalled event leaves the GPU possibly still using the
/// allocator about to be reset.
fn check_wait(result: WAIT_EVENT, value: u64) -> GfxResult<()> {
    if result == WAIT_OBJECT_0 {
        return Ok(());
    }
    if result == WAIT_FAILED {
        let error = unsafe { GetLastError() };
        bail!("WaitForSingleObjectEx failed waiting for fence value {value}: {error:?}");
    }
    bail!(
        "WaitForSingleObjectEx returned {:#x} waiting for fence value {value}",
        result.0
    )
}

impl Drop for FrameFence {
    fn drop(&mut self) {
        if !self.event.is_invalid() {
            _ = unsafe { CloseHandle(self.event) };
        }
    }
}

#[cfg(test)]
mod tests {
    use windows::Win32::Foundation::WAIT_ABANDONED;
    use windows::Win32::Foundation::WAIT_TIMEOUT;

    use super::*;

    #[test]
    fn only_a_signalled_event_completes_the_wait() {
        assert!(check_wait(WAIT_OBJECT_0, 3).is_ok());
        for result in [WAIT_FAILED, WAIT_TIMEOUT, WAIT_ABANDONED] {
            let error = check_wait(result, 3).unwrap_err();
            assert!(error.to_string().contains("fence value 3"));
        }
    }
}
