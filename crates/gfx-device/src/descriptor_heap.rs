use eyre::WrapErr;
use eyre::bail;
use tracing::debug;
use windows::Win32::Graphics::Direct3D12::*;

use crate::descriptor_slots::DescriptorSlots;
use crate::descriptor_slots::slot_offset;
use crate::gfx_error::GfxResult;
use crate::gfx_error::HResultExt;

/// One descriptor slot handed out by a [`DescriptorHeap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorHandle {
    pub heap_type: D3D12_DESCRIPTOR_HEAP_TYPE,
    pub index: u32,
    pub cpu: D3D12_CPU_DESCRIPTOR_HANDLE,
    /// Only set for shader visible heaps.
    pub gpu: Option<D3D12_GPU_DESCRIPTOR_HANDLE>,
}

impl DescriptorHandle {
    /// GPU handle for binding a descriptor table.
    pub fn gpu_handle(&self) -> GfxResult<D3D12_GPU_DESCRIPTOR_HANDLE> {
        match self.gpu {
            Some(gpu) => Ok(gpu),
            None => bail!(
                "descriptor {} in {} heap is not shader visible",
                self.index,
                heap_type_name(self.heap_type)
            ),
        }
    }
}

/// A native descriptor heap plus its slot bookkeeping.
pub struct DescriptorHeap {
    heap: ID3D12DescriptorHeap,
    heap_type: D3D12_DESCRIPTOR_HEAP_TYPE,
    increment: u32,
    cpu_start: D3D12_CPU_DESCRIPTOR_HANDLE,
    gpu_start: Option<D3D12_GPU_DESCRIPTOR_HANDLE>,
    slots: DescriptorSlots,
}

impl DescriptorHeap {
    pub fn new(
        device: &ID3D12Device,
        heap_type: D3D12_DESCRIPTOR_HEAP_TYPE,
        capacity: u32,
        shader_visible: bool,
    ) -> GfxResult<Self> {
        let heap: ID3D12DescriptorHeap = unsafe {
            device.CreateDescriptorHeap(&D3D12_DESCRIPTOR_HEAP_DESC {
                Type: heap_type,
                NumDescriptors: capacity,
                Flags: if shader_visible {
                    D3D12_DESCRIPTOR_HEAP_FLAG_SHADER_VISIBLE
                } else {
                    D3D12_DESCRIPTOR_HEAP_FLAG_NONE
                },
                NodeMask: 0,
            })
        }
        .or_fail("CreateDescriptorHeap")?;

        let increment = unsafe { device.GetDescriptorHandleIncrementSize(heap_type) };
        let cpu_start = unsafe { heap.GetCPUDescriptorHandleForHeapStart() };
        let gpu_start =
            shader_visible.then(|| unsafe { heap.GetGPUDescriptorHandleForHeapStart() });
        debug!(
            "Created {} descriptor heap: {capacity} slots, increment {increment}, \
             shader visible {shader_visible}",
            heap_type_name(heap_type)
        );

        Ok(Self {
            heap,
            heap_type,
            increment,
            cpu_start,
            gpu_start,
            slots: DescriptorSlots::new(capacity),
        })
    }

    pub fn allocate(&mut self) -> GfxResult<DescriptorHandle> {
        let index = self
            .slots
            .allocate()
            .wrap_err_with(|| format!("allocating from {} heap", heap_type_name(self.heap_type)))?;
        let offset = slot_offset(index, self.increment);
        Ok(DescriptorHandle {
            heap_type: self.heap_type,
            index,
            cpu: D3D12_CPU_DESCRIPTOR_HANDLE {
                ptr: self.cpu_start.ptr + offset,
            },
            gpu: self.gpu_start.map(|start| D3D12_GPU_DESCRIPTOR_HANDLE {
                ptr: start.ptr + offset as u64,
            }),
        })
    }

    pub fn release(&mut self, handle: DescriptorHandle) -> GfxResult<()> {
        if handle.heap_type != self.heap_type {
            bail!(
                "descriptor from {} heap released into {} heap",
                heap_type_name(handle.heap_type),
                heap_type_name(self.heap_type)
            );
        }
        self.slots
            .release(handle.index)
            .wrap_err_with(|| format!("releasing into {} heap", heap_type_name(self.heap_type)))?;
        Ok(())
    }

    pub fn native(&self) -> &ID3D12DescriptorHeap {
        &self.heap
    }

    pub fn live_count(&self) -> u32 {
        self.slots.live_count()
    }
}

pub fn heap_type_name(heap_type: D3D12_DESCRIPTOR_HEAP_TYPE) -> &'static str {
    match heap_type {
        D3D12_DESCRIPTOR_HEAP_TYPE_RTV => "RTV",
        D3D12_DESCRIPTOR_HEAP_TYPE_DSV => "DSV",
        D3D12_DESCRIPTOR_HEAP_TYPE_CBV_SRV_UAV => "CBV/SRV/UAV",
        D3D12_DESCRIPTOR_HEAP_TYPE_SAMPLER => "Sampler",
        _ => "unknown",
    }
}
