use std::marker::PhantomData;

use bytemuck::Pod;
use eyre::bail;
use tracing::debug;
use tracing::info;
use tracing::warn;
use windows::Win32::Foundation::HWND;
use windows::Win32::Graphics::Direct3D::*;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;
use windows::Win32::Graphics::Dxgi::*;
use windows::core::Interface;

use crate::BACK_BUFFER_COUNT;
use crate::CBV_SRV_UAV_HEAP_CAPACITY;
use crate::DSV_HEAP_CAPACITY;
use crate::RTV_HEAP_CAPACITY;
use crate::SAMPLER_HEAP_CAPACITY;
use crate::adapter::get_hardware_adapter;
use crate::adapter::get_warp_adapter;
use crate::alignment::constant_buffer_size;
use crate::barrier::transition_barrier;
use crate::command_line::SampleCommandLine;
use crate::debug_layer::enable_debug_layer;
use crate::descriptor_heap::DescriptorHandle;
use crate::descriptor_heap::DescriptorHeap;
use crate::descriptor_heap::heap_type_name;
use crate::frame_fence::FrameFence;
use crate::gfx_error::GfxResult;
use crate::gfx_error::HResultExt;
use crate::gfx_error::WrappedWindowsError;
use crate::image_data::ImageData;
use crate::shader::blob_to_string;
use crate::view_desc::*;

#[derive(Debug, Clone)]
pub struct GfxDeviceParams {
    pub width: u32,
    pub height: u32,
    pub use_warp: bool,
    pub swapchain_format: DXGI_FORMAT,
    pub sync_interval: u32,
}

impl From<&SampleCommandLine> for GfxDeviceParams {
    fn from(command_line: &SampleCommandLine) -> Self {
        Self {
            width: command_line.width,
            height: command_line.height,
            use_warp: command_line.warp,
            swapchain_format: DXGI_FORMAT_R8G8B8A8_UNORM,
            sync_interval: command_line.sync_interval(),
        }
    }
}

/// Owns the device, queue, swapchain, descriptor heaps and frame
/// synchronization shared by every demo.
pub struct GfxDevice {
    command_list: ID3D12GraphicsCommandList,
    command_allocators: Vec<ID3D12CommandAllocator>,
    render_targets: Vec<ID3D12Resource>,
    render_target_views: Vec<DescriptorHandle>,
    fence: FrameFence,
    rtv_heap: DescriptorHeap,
    dsv_heap: DescriptorHeap,
    cbv_srv_uav_heap: DescriptorHeap,
    sampler_heap: DescriptorHeap,
    swapchain: IDXGISwapChain3,
    queue: ID3D12CommandQueue,
    device: ID3D12Device,
    info_queue: Option<IDXGIInfoQueue>,
    _factory: IDXGIFactory4,
    frame_index: u32,
    width: u32,
    height: u32,
    swapchain_format: DXGI_FORMAT,
    sync_interval: u32,
    shut_down: bool,
}

impl GfxDevice {
    pub fn new(params: &GfxDeviceParams, hwnd: HWND) -> GfxResult<Self> {
        let debug = enable_debug_layer();
        let factory: IDXGIFactory4 =
            unsafe { CreateDXGIFactory2(debug.factory_flags) }.or_fail("CreateDXGIFactory2")?;

        let (adapter, feature_level) = if params.use_warp {
            get_warp_adapter(&factory)?
        } else {
            get_hardware_adapter(&factory)?
        };

        let mut device: Option<ID3D12Device> = None;
        unsafe { D3D12CreateDevice(&adapter, feature_level, &mut device) }
            .or_fail("D3D12CreateDevice")?;
        let Some(device) = device else {
            bail!("D3D12CreateDevice returned no device");
        };

        let queue: ID3D12CommandQueue = unsafe {
            device.CreateCommandQueue(&D3D12_COMMAND_QUEUE_DESC {
                Type: D3D12_COMMAND_LIST_TYPE_DIRECT,
                ..Default::default()
            })
        }
        .or_fail("CreateCommandQueue")?;

        let mut rtv_heap =
            DescriptorHeap::new(&device, D3D12_DESCRIPTOR_HEAP_TYPE_RTV, RTV_HEAP_CAPACITY, false)?;
        let dsv_heap =
            DescriptorHeap::new(&device, D3D12_DESCRIPTOR_HEAP_TYPE_DSV, DSV_HEAP_CAPACITY, false)?;
        let cbv_srv_uav_heap = DescriptorHeap::new(
            &device,
            D3D12_DESCRIPTOR_HEAP_TYPE_CBV_SRV_UAV,
            CBV_SRV_UAV_HEAP_CAPACITY,
            true,
        )?;
        let sampler_heap = DescriptorHeap::new(
            &device,
            D3D12_DESCRIPTOR_HEAP_TYPE_SAMPLER,
            SAMPLER_HEAP_CAPACITY,
            true,
        )?;

        let swapchain_desc = DXGI_SWAP_CHAIN_DESC1 {
            Width: params.width,
            Height: params.height,
            Format: params.swapchain_format,
            SampleDesc: DXGI_SAMPLE_DESC {
                Count: 1,
                Quality: 0,
            },
            BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
            BufferCount: BACK_BUFFER_COUNT as u32,
            Scaling: DXGI_SCALING_STRETCH,
            SwapEffect: DXGI_SWAP_EFFECT_FLIP_DISCARD,
            AlphaMode: DXGI_ALPHA_MODE_UNSPECIFIED,
            ..Default::default()
        };
        let factory2: IDXGIFactory2 = factory.cast().or_fail("cast to IDXGIFactory2")?;
        let swapchain: IDXGISwapChain1 =
            unsafe { factory2.CreateSwapChainForHwnd(&queue, hwnd, &swapchain_desc, None, None) }
                .or_fail("CreateSwapChainForHwnd")?;
        let swapchain: IDXGISwapChain3 = swapchain.cast().or_fail("cast to IDXGISwapChain3")?;
        unsafe { factory.MakeWindowAssociation(hwnd, DXGI_MWA_NO_ALT_ENTER) }
            .or_fail("MakeWindowAssociation")?;
        let frame_index = unsafe { swapchain.GetCurrentBackBufferIndex() };

        let mut render_targets = Vec::with_capacity(BACK_BUFFER_COUNT);
        let mut render_target_views = Vec::with_capacity(BACK_BUFFER_COUNT);
        for i in 0..BACK_BUFFER_COUNT as u32 {
            let resource: ID3D12Resource =
                unsafe { swapchain.GetBuffer(i) }.or_fail("IDXGISwapChain::GetBuffer")?;
            let view = rtv_heap.allocate()?;
            unsafe { device.CreateRenderTargetView(&resource, None, view.cpu) };
            render_targets.push(resource);
            render_target_views.push(view);
        }

        let command_allocators = (0..BACK_BUFFER_COUNT)
            .map(|_| {
                unsafe { device.CreateCommandAllocator(D3D12_COMMAND_LIST_TYPE_DIRECT) }
                    .or_fail("CreateCommandAllocator")
            })
            .collect::<GfxResult<Vec<ID3D12CommandAllocator>>>()?;

        let fence = FrameFence::new(&device, frame_index as usize)?;

        let command_list: ID3D12GraphicsCommandList = unsafe {
            device.CreateCommandList(
                0,
                D3D12_COMMAND_LIST_TYPE_DIRECT,
                &command_allocators[frame_index as usize],
                None,
            )
        }
        .or_fail("CreateCommandList")?;
        unsafe { command_list.Close() }.or_fail("ID3D12GraphicsCommandList::Close")?;

        info!(
            "Device ready: {}x{}, {BACK_BUFFER_COUNT} back buffers, {feature_level:?}",
            params.width, params.height
        );

        Ok(Self {
            command_list,
            command_allocators,
            render_targets,
            render_target_views,
            fence,
            rtv_heap,
            dsv_heap,
            cbv_srv_uav_heap,
            sampler_heap,
            swapchain,
            queue,
            device,
            info_queue: debug.info_queue,
            _factory: factory,
            frame_index,
            width: params.width,
            height: params.height,
            swapchain_format: params.swapchain_format,
            sync_interval: params.sync_interval,
            shut_down: false,
        })
    }

    // --- descriptors ---

    fn heap_mut(
        &mut self,
        heap_type: D3D12_DESCRIPTOR_HEAP_TYPE,
    ) -> GfxResult<&mut DescriptorHeap> {
        Ok(match heap_type {
            D3D12_DESCRIPTOR_HEAP_TYPE_RTV => &mut self.rtv_heap,
            D3D12_DESCRIPTOR_HEAP_TYPE_DSV => &mut self.dsv_heap,
            D3D12_DESCRIPTOR_HEAP_TYPE_CBV_SRV_UAV => &mut self.cbv_srv_uav_heap,
            D3D12_DESCRIPTOR_HEAP_TYPE_SAMPLER => &mut self.sampler_heap,
            other => bail!("unsupported descriptor heap type {}", other.0),
        })
    }

    pub fn allocate_descriptor(
        &mut self,
        heap_type: D3D12_DESCRIPTOR_HEAP_TYPE,
    ) -> GfxResult<DescriptorHandle> {
        self.heap_mut(heap_type)?.allocate()
    }

    pub fn deallocate_descriptor(&mut self, handle: DescriptorHandle) -> GfxResult<()> {
        self.heap_mut(handle.heap_type)?.release(handle)
    }

    pub fn descriptor_heap(
        &self,
        heap_type: D3D12_DESCRIPTOR_HEAP_TYPE,
    ) -> GfxResult<&ID3D12DescriptorHeap> {
        Ok(match heap_type {
            D3D12_DESCRIPTOR_HEAP_TYPE_RTV => self.rtv_heap.native(),
            D3D12_DESCRIPTOR_HEAP_TYPE_DSV => self.dsv_heap.native(),
            D3D12_DESCRIPTOR_HEAP_TYPE_CBV_SRV_UAV => self.cbv_srv_uav_heap.native(),
            D3D12_DESCRIPTOR_HEAP_TYPE_SAMPLER => self.sampler_heap.native(),
            other => bail!("unsupported descriptor heap type {}", other.0),
        })
    }

    /// Binds the two shader visible heaps on `list`.
    pub fn bind_shader_visible_heaps(&self, list: &ID3D12GraphicsCommandList) {
        let heaps = [
            Some(self.cbv_srv_uav_heap.native().clone()),
            Some(self.sampler_heap.native().clone()),
        ];
        unsafe { list.SetDescriptorHeaps(&heaps) };
    }

    // --- per frame flow ---

    /// Resets the current image's command allocator. The fence wait in
    /// `present` guarantees the GPU is done with it.
    pub fn new_frame(&mut self) -> GfxResult<()> {
        unsafe { self.command_allocators[self.frame_index as usize].Reset() }
            .or_fail("ID3D12CommandAllocator::Reset")
    }

    pub fn begin_command_list(&mut self) -> GfxResult<ID3D12GraphicsCommandList> {
        let allocator = &self.command_allocators[self.frame_index as usize];
        unsafe { self.command_list.Reset(allocator, None) }
            .or_fail("ID3D12GraphicsCommandList::Reset")?;
        Ok(self.command_list.clone())
    }

    /// Closes and executes `list` on the direct queue.
    pub fn submit(&self, list: &ID3D12GraphicsCommandList) -> GfxResult<()> {
        unsafe { list.Close() }.or_fail("ID3D12GraphicsCommandList::Close")?;
        let lists = [Some(list.cast::<ID3D12CommandList>().or_fail("cast to ID3D12CommandList")?)];
        unsafe { self.queue.ExecuteCommandLists(&lists) };
        Ok(())
    }

    pub fn present(&mut self, sync_interval: u32) -> GfxResult<()> {
        unsafe { self.swapchain.Present(sync_interval, DXGI_PRESENT(0)) }
            .ok()
            .or_fail("IDXGISwapChain::Present")?;
        let current = self.frame_index as usize;
        self.frame_index = unsafe { self.swapchain.GetCurrentBackBufferIndex() };
        self.fence
            .move_to_next_frame(&self.queue, current, self.frame_index as usize)
    }

    pub fn wait_for_gpu(&mut self) -> GfxResult<()> {
        self.fence.flush(&self.queue, self.frame_index as usize)
    }

    /// Records commands on a throwaway list, executes it and waits for it.
    fn execute_one_shot(
        &mut self,
        record: impl FnOnce(&ID3D12GraphicsCommandList),
    ) -> GfxResult<()> {
        let allocator: ID3D12CommandAllocator =
            unsafe { self.device.CreateCommandAllocator(D3D12_COMMAND_LIST_TYPE_DIRECT) }
                .or_fail("CreateCommandAllocator")?;
        let list: ID3D12GraphicsCommandList = unsafe {
            self.device.CreateCommandList(
                0,
                D3D12_COMMAND_LIST_TYPE_DIRECT,
                &allocator,
                None,
            )
        }
        .or_fail("CreateCommandList")?;
        record(&list);
        self.submit(&list)?;
        self.wait_for_gpu()
    }

    // --- resources ---

    fn create_committed(
        &self,
        heap_type: D3D12_HEAP_TYPE,
        desc: &D3D12_RESOURCE_DESC,
        state: D3D12_RESOURCE_STATES,
        clear_value: Option<&D3D12_CLEAR_VALUE>,
    ) -> GfxResult<ID3D12Resource> {
        self.create_image_2d(desc, &heap_properties(heap_type), state, clear_value)
    }

    /// Committed buffer. Upload heap buffers are written through a mapping;
    /// default heap buffers with data go through a staging buffer and end in
    /// `initial_state`.
    pub fn create_buffer(
        &mut self,
        size: u64,
        heap_type: D3D12_HEAP_TYPE,
        initial_state: D3D12_RESOURCE_STATES,
        initial_data: Option<&[u8]>,
    ) -> GfxResult<ID3D12Resource> {
        let desc = buffer_desc(size);
        match (heap_type, initial_data) {
            (D3D12_HEAP_TYPE_UPLOAD, data) => {
                let buffer = self.create_committed(heap_type, &desc, initial_state, None)?;
                if let Some(data) = data {
                    write_buffer(&buffer, 0, data)?;
                }
                Ok(buffer)
            }
            (_, None) => self.create_committed(heap_type, &desc, initial_state, None),
            (_, Some(data)) => {
                let buffer =
                    self.create_committed(heap_type, &desc, D3D12_RESOURCE_STATE_COPY_DEST, None)?;
                let staging = self.create_committed(
                    D3D12_HEAP_TYPE_UPLOAD,
                    &desc,
                    D3D12_RESOURCE_STATE_GENERIC_READ,
                    None,
                )?;
                write_buffer(&staging, 0, data)?;
                self.execute_one_shot(|list| unsafe {
                    list.CopyBufferRegion(&buffer, 0, &staging, 0, data.len() as u64);
                    if initial_state != D3D12_RESOURCE_STATE_COPY_DEST {
                        list.ResourceBarrier(&[transition_barrier(
                            &buffer,
                            D3D12_RESOURCE_STATE_COPY_DEST,
                            initial_state,
                        )]);
                    }
                })?;
                debug!("Uploaded {} bytes into default heap buffer", data.len());
                Ok(buffer)
            }
        }
    }

    /// One 256-byte aligned upload buffer and CBV per swapchain image.
    pub fn create_constant_buffers<T: Pod>(&mut self) -> GfxResult<ConstantBuffers<T>> {
        self.constant_buffers(true)
    }

    /// Like [`Self::create_constant_buffers`] but without CBVs, for buffers
    /// only ever bound as root constant buffer views.
    pub fn create_root_constant_buffers<T: Pod>(&mut self) -> GfxResult<ConstantBuffers<T>> {
        self.constant_buffers(false)
    }

    fn constant_buffers<T: Pod>(&mut self, with_views: bool) -> GfxResult<ConstantBuffers<T>> {
        let size = constant_buffer_size::<T>();
        let mut buffers = Vec::with_capacity(BACK_BUFFER_COUNT);
        let mut views = Vec::new();
        for _ in 0..BACK_BUFFER_COUNT {
            let buffer = self.create_buffer(
                size,
                D3D12_HEAP_TYPE_UPLOAD,
                D3D12_RESOURCE_STATE_GENERIC_READ,
                None,
            )?;
            if with_views {
                views.push(self.create_constant_buffer_view(&buffer, size as u32)?);
            }
            buffers.push(buffer);
        }
        debug!(
            "Created {BACK_BUFFER_COUNT} constant buffers of {size} bytes for {} ({} views)",
            std::any::type_name::<T>(),
            views.len()
        );
        Ok(ConstantBuffers {
            buffers,
            views,
            _marker: PhantomData,
        })
    }

    pub fn create_image_2d(
        &self,
        desc: &D3D12_RESOURCE_DESC,
        heap_props: &D3D12_HEAP_PROPERTIES,
        state: D3D12_RESOURCE_STATES,
        clear_value: Option<&D3D12_CLEAR_VALUE>,
    ) -> GfxResult<ID3D12Resource> {
        let mut resource: Option<ID3D12Resource> = None;
        unsafe {
            self.device.CreateCommittedResource(
                heap_props,
                D3D12_HEAP_FLAG_NONE,
                desc,
                state,
                clear_value.map(|c| c as *const D3D12_CLEAR_VALUE),
                &mut resource,
            )
        }
        .or_fail("CreateCommittedResource")?;
        match resource {
            Some(resource) => Ok(resource),
            None => bail!("CreateCommittedResource returned no resource"),
        }
    }

    /// RGBA8 texture in the default heap, optionally with a CPU built mip
    /// chain, left in `state`.
    pub fn create_texture_from_image(
        &mut self,
        image: &ImageData,
        generate_mips: bool,
        state: D3D12_RESOURCE_STATES,
        flags: D3D12_RESOURCE_FLAGS,
    ) -> GfxResult<ID3D12Resource> {
        let levels = if generate_mips {
            image.mip_chain()
        } else {
            vec![image.clone()]
        };
        let desc = texture_2d_desc(
            image.width,
            image.height,
            levels.len() as u16,
            DXGI_FORMAT_R8G8B8A8_UNORM,
            flags,
        );
        let texture = self.create_committed(
            D3D12_HEAP_TYPE_DEFAULT,
            &desc,
            D3D12_RESOURCE_STATE_COPY_DEST,
            None,
        )?;

        let count = levels.len();
        let mut layouts = vec![D3D12_PLACED_SUBRESOURCE_FOOTPRINT::default(); count];
        let mut rows = vec![0u32; count];
        let mut row_sizes = vec![0u64; count];
        let mut total_bytes = 0u64;
        unsafe {
            self.device.GetCopyableFootprints(
                &desc,
                0,
                count as u32,
                0,
                Some(layouts.as_mut_ptr()),
                Some(rows.as_mut_ptr()),
                Some(row_sizes.as_mut_ptr()),
                Some(&mut total_bytes),
            )
        };

        let staging = self.create_committed(
            D3D12_HEAP_TYPE_UPLOAD,
            &buffer_desc(total_bytes),
            D3D12_RESOURCE_STATE_GENERIC_READ,
            None,
        )?;
        with_mapped(&staging, total_bytes as usize, |mapped| {
            for (level, layout) in levels.iter().zip(&layouts) {
                let offset = layout.Offset as usize;
                level.write_pitched(&mut mapped[offset..], layout.Footprint.RowPitch as usize);
            }
        })?;

        self.execute_one_shot(|list| unsafe {
            for (subresource, layout) in layouts.iter().enumerate() {
                let dst = D3D12_TEXTURE_COPY_LOCATION {
                    pResource: std::mem::transmute_copy(&texture),
                    Type: D3D12_TEXTURE_COPY_TYPE_SUBRESOURCE_INDEX,
                    Anonymous: D3D12_TEXTURE_COPY_LOCATION_0 {
                        SubresourceIndex: subresource as u32,
                    },
                };
                let src = D3D12_TEXTURE_COPY_LOCATION {
                    pResource: std::mem::transmute_copy(&staging),
                    Type: D3D12_TEXTURE_COPY_TYPE_PLACED_FOOTPRINT,
                    Anonymous: D3D12_TEXTURE_COPY_LOCATION_0 {
                        PlacedFootprint: *layout,
                    },
                };
                list.CopyTextureRegion(&dst, 0, 0, 0, &src, None);
            }
            if state != D3D12_RESOURCE_STATE_COPY_DEST {
                list.ResourceBarrier(&[transition_barrier(
                    &texture,
                    D3D12_RESOURCE_STATE_COPY_DEST,
                    state,
                )]);
            }
        })?;
        debug!(
            "Uploaded {}x{} texture with {count} mip level(s)",
            image.width, image.height
        );
        Ok(texture)
    }

    /// D32 depth buffer matching the swapchain size, with its DSV.
    pub fn create_depth_buffer(&mut self) -> GfxResult<(ID3D12Resource, DescriptorHandle)> {
        let format = DXGI_FORMAT_D32_FLOAT;
        let desc = texture_2d_desc(
            self.width,
            self.height,
            1,
            format,
            D3D12_RESOURCE_FLAG_ALLOW_DEPTH_STENCIL,
        );
        let clear = depth_clear_value(format);
        let resource = self.create_image_2d(
            &desc,
            &heap_properties(D3D12_HEAP_TYPE_DEFAULT),
            D3D12_RESOURCE_STATE_DEPTH_WRITE,
            Some(&clear),
        )?;
        let view = self.create_depth_stencil_view(&resource, format)?;
        Ok((resource, view))
    }

    // --- views ---

    pub fn create_constant_buffer_view(
        &mut self,
        buffer: &ID3D12Resource,
        size: u32,
    ) -> GfxResult<DescriptorHandle> {
        let handle = self.allocate_descriptor(D3D12_DESCRIPTOR_HEAP_TYPE_CBV_SRV_UAV)?;
        let desc = D3D12_CONSTANT_BUFFER_VIEW_DESC {
            BufferLocation: unsafe { buffer.GetGPUVirtualAddress() },
            SizeInBytes: size,
        };
        unsafe { self.device.CreateConstantBufferView(Some(&desc), handle.cpu) };
        Ok(handle)
    }

    pub fn create_shader_resource_view(
        &mut self,
        resource: &ID3D12Resource,
        desc: &D3D12_SHADER_RESOURCE_VIEW_DESC,
    ) -> GfxResult<DescriptorHandle> {
        let handle = self.allocate_descriptor(D3D12_DESCRIPTOR_HEAP_TYPE_CBV_SRV_UAV)?;
        unsafe {
            self.device
                .CreateShaderResourceView(resource, Some(desc), handle.cpu)
        };
        Ok(handle)
    }

    pub fn create_unordered_access_view(
        &mut self,
        resource: &ID3D12Resource,
        desc: &D3D12_UNORDERED_ACCESS_VIEW_DESC,
    ) -> GfxResult<DescriptorHandle> {
        let handle = self.allocate_descriptor(D3D12_DESCRIPTOR_HEAP_TYPE_CBV_SRV_UAV)?;
        unsafe {
            self.device.CreateUnorderedAccessView(
                resource,
                None,
                Some(desc),
                handle.cpu,
            )
        };
        Ok(handle)
    }

    pub fn create_depth_stencil_view(
        &mut self,
        resource: &ID3D12Resource,
        format: DXGI_FORMAT,
    ) -> GfxResult<DescriptorHandle> {
        let handle = self.allocate_descriptor(D3D12_DESCRIPTOR_HEAP_TYPE_DSV)?;
        let desc = texture_2d_dsv_desc(format);
        unsafe {
            self.device
                .CreateDepthStencilView(resource, Some(&desc), handle.cpu)
        };
        Ok(handle)
    }

    pub fn create_sampler(&mut self, desc: &D3D12_SAMPLER_DESC) -> GfxResult<DescriptorHandle> {
        let handle = self.allocate_descriptor(D3D12_DESCRIPTOR_HEAP_TYPE_SAMPLER)?;
        unsafe { self.device.CreateSampler(desc, handle.cpu) };
        Ok(handle)
    }

    // --- pipelines ---

    pub fn create_root_signature(
        &self,
        desc: &D3D12_ROOT_SIGNATURE_DESC,
    ) -> GfxResult<ID3D12RootSignature> {
        let mut signature_blob: Option<ID3DBlob> = None;
        let mut error_blob: Option<ID3DBlob> = None;
        let serialized = unsafe {
            D3D12SerializeRootSignature(
                desc,
                D3D_ROOT_SIGNATURE_VERSION_1,
                &mut signature_blob,
                Some(&mut error_blob),
            )
        };
        if let Err(e) = serialized {
            let message = error_blob.as_ref().map(blob_to_string).unwrap_or_default();
            warn!("Root signature serialization error: {message}");
            return Err(eyre::Report::new(WrappedWindowsError::from(e))
                .wrap_err(format!("D3D12SerializeRootSignature: {message}")));
        }
        let Some(signature_blob) = signature_blob else {
            bail!("D3D12SerializeRootSignature returned no blob");
        };
        let signature = unsafe {
            std::slice::from_raw_parts(
                signature_blob.GetBufferPointer() as *const u8,
                signature_blob.GetBufferSize(),
            )
        };
        unsafe { self.device.CreateRootSignature(0, signature) }.or_fail("CreateRootSignature")
    }

    pub fn create_graphics_pipeline_state(
        &self,
        desc: &D3D12_GRAPHICS_PIPELINE_STATE_DESC,
    ) -> GfxResult<ID3D12PipelineState> {
        unsafe { self.device.CreateGraphicsPipelineState(desc) }
            .or_fail("CreateGraphicsPipelineState")
    }

    pub fn create_compute_pipeline_state(
        &self,
        desc: &D3D12_COMPUTE_PIPELINE_STATE_DESC,
    ) -> GfxResult<ID3D12PipelineState> {
        unsafe { self.device.CreateComputePipelineState(desc) }
            .or_fail("CreateComputePipelineState")
    }

    // --- accessors ---

    pub fn d3d12_device(&self) -> &ID3D12Device {
        &self.device
    }

    pub fn info_queue(&self) -> Option<&IDXGIInfoQueue> {
        self.info_queue.as_ref()
    }

    pub fn swapchain_format(&self) -> DXGI_FORMAT {
        self.swapchain_format
    }

    pub fn frame_index(&self) -> usize {
        self.frame_index as usize
    }

    pub fn swapchain_buffer_resource(&self) -> &ID3D12Resource {
        &self.render_targets[self.frame_index as usize]
    }

    pub fn swapchain_buffer_descriptor(&self) -> D3D12_CPU_DESCRIPTOR_HANDLE {
        self.render_target_views[self.frame_index as usize].cpu
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Sync interval requested on the command line.
    pub fn sync_interval(&self) -> u32 {
        self.sync_interval
    }

    pub fn live_descriptors(&self, heap_type: D3D12_DESCRIPTOR_HEAP_TYPE) -> u32 {
        match heap_type {
            D3D12_DESCRIPTOR_HEAP_TYPE_RTV => self.rtv_heap.live_count(),
            D3D12_DESCRIPTOR_HEAP_TYPE_DSV => self.dsv_heap.live_count(),
            D3D12_DESCRIPTOR_HEAP_TYPE_CBV_SRV_UAV => self.cbv_srv_uav_heap.live_count(),
            D3D12_DESCRIPTOR_HEAP_TYPE_SAMPLER => self.sampler_heap.live_count(),
            _ => 0,
        }
    }

    /// Waits for the GPU and returns the swapchain RTVs. The native objects
    /// are released when `self` drops.
    pub fn shutdown(&mut self) -> GfxResult<()> {
        if self.shut_down {
            return Ok(());
        }
        self.shut_down = true;
        self.wait_for_gpu()?;
        for view in std::mem::take(&mut self.render_target_views) {
            self.rtv_heap.release(view)?;
        }
        for heap_type in [
            D3D12_DESCRIPTOR_HEAP_TYPE_RTV,
            D3D12_DESCRIPTOR_HEAP_TYPE_DSV,
            D3D12_DESCRIPTOR_HEAP_TYPE_CBV_SRV_UAV,
            D3D12_DESCRIPTOR_HEAP_TYPE_SAMPLER,
        ] {
            let live = self.live_descriptors(heap_type);
            if live > 0 {
                warn!(
                    "{live} {} descriptor(s) still allocated at shutdown",
                    heap_type_name(heap_type)
                );
            }
        }
        info!("Device shut down");
        Ok(())
    }
}

impl Drop for GfxDevice {
    fn drop(&mut self) {
        if !self.shut_down {
            if let Err(e) = self.wait_for_gpu() {
                warn!("Failed to wait for the GPU while dropping the device: {e}");
            }
        }
    }
}

/// Per swapchain image constant buffers holding one `T` each.
pub struct ConstantBuffers<T> {
    buffers: Vec<ID3D12Resource>,
    views: Vec<DescriptorHandle>,
    _marker: PhantomData<T>,
}

impl<T: Pod> ConstantBuffers<T> {
    pub fn write(&self, frame_index: usize, value: &T) -> GfxResult<()> {
        write_buffer(&self.buffers[frame_index], 0, bytemuck::bytes_of(value))
    }

    pub fn gpu_address(&self, frame_index: usize) -> u64 {
        unsafe { self.buffers[frame_index].GetGPUVirtualAddress() }
    }

    /// Returns the CBV descriptors to the device heap.
    pub fn release(self, device: &mut GfxDevice) -> GfxResult<()> {
        for view in self.views {
            device.deallocate_descriptor(view)?;
        }
        Ok(())
    }
}

/// Maps subresource 0 of an upload heap resource and hands the bytes to `f`.
fn with_mapped(
    resource: &ID3D12Resource,
    len: usize,
    f: impl FnOnce(&mut [u8]),
) -> GfxResult<()> {
    let mut data = std::ptr::null_mut();
    let read_range = D3D12_RANGE { Begin: 0, End: 0 };
    unsafe { resource.Map(0, Some(&read_range), Some(&mut data)) }.or_fail("ID3D12Resource::Map")?;
    if data.is_null() {
        bail!("ID3D12Resource::Map returned a null pointer");
    }
    let mapped = unsafe { std::slice::from_raw_parts_mut(data as *mut u8, len) };
    f(mapped);
    unsafe { resource.Unmap(0, None) };
    Ok(())
}

/// Copies `data` to `offset` in an upload heap buffer.
pub fn write_buffer(resource: &ID3D12Resource, offset: usize, data: &[u8]) -> GfxResult<()> {
    with_mapped(resource, offset + data.len(), |mapped| {
        mapped[offset..].copy_from_slice(data);
    })
}
