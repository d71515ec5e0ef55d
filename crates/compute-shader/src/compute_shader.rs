use gfx_device::AssetLocator;
use gfx_device::ConstantBuffers;
use gfx_device::DescriptorHandle;
use gfx_device::FrameTime;
use gfx_device::GfxDevice;
use gfx_device::GfxResult;
use gfx_device::ImageData;
use gfx_device::KeyCode;
use gfx_device::ShaderLoader;
use gfx_device::ShaderStage;
use gfx_device::alignment::dispatch_group_count;
use gfx_device::barrier::transition_barrier;
use gfx_device::pipeline::*;
use gfx_device::runner::DemoApp;
use gfx_device::view_desc::*;
use tracing::debug;
use tracing::info;
use windows::Win32::Foundation::RECT;
use windows::Win32::Graphics::Direct3D::*;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;
use windows::core::s;

use crate::FilterArgs;
use crate::scene::*;

pub struct ComputeShader {
    draw_root_signature: ID3D12RootSignature,
    draw_pipeline: ID3D12PipelineState,
    filter_root_signature: ID3D12RootSignature,
    filter_pipeline: ID3D12PipelineState,
    _vertex_buffer: ID3D12Resource,
    vertex_buffer_view: D3D12_VERTEX_BUFFER_VIEW,
    source_image: ID3D12Resource,
    filtered_image: ID3D12Resource,
    source_srv: DescriptorHandle,
    filtered_srv: DescriptorHandle,
    filtered_uav: DescriptorHandle,
    sampler: DescriptorHandle,
    scene_constants: Option<ConstantBuffers<SceneParameters>>,
    dispatch_size: (u32, u32),
    settings: FilterSettings,
    viewport: D3D12_VIEWPORT,
    scissor_rect: RECT,
}

impl ComputeShader {
    fn create_draw_pipeline(
        device: &GfxDevice,
        shaders: &ShaderLoader,
    ) -> GfxResult<(ID3D12RootSignature, ID3D12PipelineState)> {
        let srv_ranges = [descriptor_range(D3D12_DESCRIPTOR_RANGE_TYPE_SRV, 0, 1)];
        let sampler_ranges = [descriptor_range(D3D12_DESCRIPTOR_RANGE_TYPE_SAMPLER, 0, 1)];
        let parameters = [
            root_cbv(0, D3D12_SHADER_VISIBILITY_ALL),
            root_table(&srv_ranges, D3D12_SHADER_VISIBILITY_PIXEL),
            root_table(&sampler_ranges, D3D12_SHADER_VISIBILITY_PIXEL),
        ];
        let root_signature = device.create_root_signature(&root_signature_desc(
            &parameters,
            D3D12_ROOT_SIGNATURE_FLAG_ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT,
        ))?;

        let vertex_shader = shaders.load("VSMain", ShaderStage::Vertex)?;
        let pixel_shader = shaders.load("PSMain", ShaderStage::Pixel)?;
        let input_elements = [
            input_element(s!("POSITION"), DXGI_FORMAT_R32G32B32_FLOAT, 0, 0),
            input_element(s!("TEXCOORD"), DXGI_FORMAT_R32G32_FLOAT, 0, TEXCOORD_OFFSET),
        ];
        let desc = D3D12_GRAPHICS_PIPELINE_STATE_DESC {
            pRootSignature: borrow_root_signature(&root_signature),
            VS: vertex_shader.bytecode(),
            PS: pixel_shader.bytecode(),
            InputLayout: input_layout(&input_elements),
            RasterizerState: rasterizer_state(D3D12_FILL_MODE_SOLID),
            BlendState: blend_state(BlendMode::Opaque),
            DepthStencilState: depth_stencil_state(DepthMode::Disabled),
            SampleMask: u32::MAX,
            PrimitiveTopologyType: D3D12_PRIMITIVE_TOPOLOGY_TYPE_TRIANGLE,
            NumRenderTargets: 1,
            RTVFormats: rtv_formats(device.swapchain_format()),
            SampleDesc: single_sample(),
            ..Default::default()
        };
        let pipeline = device.create_graphics_pipeline_state(&desc)?;
        Ok((root_signature, pipeline))
    }

    fn create_filter_pipeline(
        device: &GfxDevice,
        shaders: &ShaderLoader,
    ) -> GfxResult<(ID3D12RootSignature, ID3D12PipelineState)> {
        let srv_ranges = [descriptor_range(D3D12_DESCRIPTOR_RANGE_TYPE_SRV, 0, 1)];
        let uav_ranges = [descriptor_range(D3D12_DESCRIPTOR_RANGE_TYPE_UAV, 0, 1)];
        let parameters = [
            root_cbv(0, D3D12_SHADER_VISIBILITY_ALL),
            root_table(&srv_ranges, D3D12_SHADER_VISIBILITY_ALL),
            root_table(&uav_ranges, D3D12_SHADER_VISIBILITY_ALL),
        ];
        let root_signature = device.create_root_signature(&root_signature_desc(
            &parameters,
            D3D12_ROOT_SIGNATURE_FLAG_NONE,
        ))?;

        let compute_shader = shaders.load("CSMain", ShaderStage::Compute)?;
        let desc = D3D12_COMPUTE_PIPELINE_STATE_DESC {
            pRootSignature: borrow_root_signature(&root_signature),
            CS: compute_shader.bytecode(),
            NodeMask: 0,
            Flags: D3D12_PIPELINE_STATE_FLAG_NONE,
            ..Default::default()
        };
        let pipeline = device.create_compute_pipeline_state(&desc)?;
        Ok((root_signature, pipeline))
    }
}

impl DemoApp for ComputeShader {
    const TITLE: &'static str = crate::TITLE;
    type Args = FilterArgs;

    fn initialize(
        device: &mut GfxDevice,
        args: &FilterArgs,
        assets: &AssetLocator,
    ) -> GfxResult<Self> {
        let shaders = ShaderLoader::new(assets);
        let (draw_root_signature, draw_pipeline) = Self::create_draw_pipeline(device, &shaders)?;
        let (filter_root_signature, filter_pipeline) =
            Self::create_filter_pipeline(device, &shaders)?;

        let image = match &args.image {
            Some(path) => ImageData::load(path)?,
            None => {
                let (width, height) = PLACEHOLDER_SIZE;
                ImageData::load_or_placeholder(&assets.texture("image.png"), width, height)?
            }
        };
        info!("Filtering a {}x{} image", image.width, image.height);

        let source_image = device.create_texture_from_image(
            &image,
            false,
            D3D12_RESOURCE_STATE_NON_PIXEL_SHADER_RESOURCE,
            D3D12_RESOURCE_FLAG_NONE,
        )?;
        let filtered_image = device.create_texture_from_image(
            &image,
            false,
            D3D12_RESOURCE_STATE_UNORDERED_ACCESS,
            D3D12_RESOURCE_FLAG_ALLOW_UNORDERED_ACCESS,
        )?;

        let srv_desc = texture_2d_srv_desc(DXGI_FORMAT_R8G8B8A8_UNORM, 1);
        let source_srv = device.create_shader_resource_view(&source_image, &srv_desc)?;
        let filtered_srv = device.create_shader_resource_view(&filtered_image, &srv_desc)?;
        let filtered_uav = device.create_unordered_access_view(
            &filtered_image,
            &texture_2d_uav_desc(DXGI_FORMAT_R8G8B8A8_UNORM),
        )?;
        let sampler = device.create_sampler(&linear_sampler_desc(D3D12_TEXTURE_ADDRESS_MODE_WRAP))?;

        let vertices = quad_vertices();
        let vertex_bytes: &[u8] = bytemuck::cast_slice(&vertices);
        let vertex_buffer = device.create_buffer(
            vertex_bytes.len() as u64,
            D3D12_HEAP_TYPE_DEFAULT,
            D3D12_RESOURCE_STATE_VERTEX_AND_CONSTANT_BUFFER,
            Some(vertex_bytes),
        )?;
        let vertex_buffer_view = D3D12_VERTEX_BUFFER_VIEW {
            BufferLocation: unsafe { vertex_buffer.GetGPUVirtualAddress() },
            StrideInBytes: std::mem::size_of::<Vertex>() as u32,
            SizeInBytes: vertex_bytes.len() as u32,
        };

        let scene_constants = device.create_constant_buffers::<SceneParameters>()?;
        let dispatch_size = (
            dispatch_group_count(image.width, FILTER_GROUP_SIZE),
            dispatch_group_count(image.height, FILTER_GROUP_SIZE),
        );
        debug!("Filter dispatch {}x{} groups", dispatch_size.0, dispatch_size.1);

        Ok(Self {
            draw_root_signature,
            draw_pipeline,
            filter_root_signature,
            filter_pipeline,
            _vertex_buffer: vertex_buffer,
            vertex_buffer_view,
            source_image,
            filtered_image,
            source_srv,
            filtered_srv,
            filtered_uav,
            sampler,
            scene_constants: Some(scene_constants),
            dispatch_size,
            settings: FilterSettings::default(),
            viewport: viewport(device.width(), device.height()),
            scissor_rect: scissor_rect(device.width(), device.height()),
        })
    }

    fn on_key_down(&mut self, key: KeyCode) {
        if self.settings.handle_key(key) {
            debug!("Filter settings: {:?}", self.settings);
        }
    }

    fn update(&mut self, device: &mut GfxDevice, _time: FrameTime) -> GfxResult<()> {
        let frame = device.frame_index();
        let Some(scene_constants) = &self.scene_constants else {
            eyre::bail!("update called after shutdown");
        };
        scene_constants.write(frame, &scene_parameters(&self.settings))?;
        let constants_address = scene_constants.gpu_address(frame);

        device.new_frame()?;
        let list = device.begin_command_list()?;
        device.bind_shader_visible_heaps(&list);
        let back_buffer = device.swapchain_buffer_resource();
        let rtv = device.swapchain_buffer_descriptor();

        unsafe {
            list.SetComputeRootSignature(&self.filter_root_signature);
            list.SetPipelineState(&self.filter_pipeline);
            list.SetComputeRootConstantBufferView(0, constants_address);
            list.SetComputeRootDescriptorTable(1, self.source_srv.gpu_handle()?);
            list.SetComputeRootDescriptorTable(2, self.filtered_uav.gpu_handle()?);
            list.Dispatch(self.dispatch_size.0, self.dispatch_size.1, 1);

            list.ResourceBarrier(&[
                transition_barrier(
                    &self.filtered_image,
                    D3D12_RESOURCE_STATE_UNORDERED_ACCESS,
                    D3D12_RESOURCE_STATE_PIXEL_SHADER_RESOURCE,
                ),
                transition_barrier(
                    &self.source_image,
                    D3D12_RESOURCE_STATE_NON_PIXEL_SHADER_RESOURCE,
                    D3D12_RESOURCE_STATE_PIXEL_SHADER_RESOURCE,
                ),
                transition_barrier(
                    back_buffer,
                    D3D12_RESOURCE_STATE_PRESENT,
                    D3D12_RESOURCE_STATE_RENDER_TARGET,
                ),
            ]);

            list.SetGraphicsRootSignature(&self.draw_root_signature);
            list.SetPipelineState(&self.draw_pipeline);
            list.RSSetViewports(&[self.viewport]);
            list.RSSetScissorRects(&[self.scissor_rect]);
            list.OMSetRenderTargets(1, Some(&rtv), false, None);
            list.ClearRenderTargetView(rtv, &CLEAR_COLOR, None);

            list.IASetPrimitiveTopology(D3D_PRIMITIVE_TOPOLOGY_TRIANGLESTRIP);
            list.IASetVertexBuffers(0, Some(&[self.vertex_buffer_view]));
            list.SetGraphicsRootConstantBufferView(0, constants_address);
            list.SetGraphicsRootDescriptorTable(2, self.sampler.gpu_handle()?);

            list.SetGraphicsRootDescriptorTable(1, self.source_srv.gpu_handle()?);
            list.DrawInstanced(VERTICES_PER_QUAD, 1, 0, 0);
            list.SetGraphicsRootDescriptorTable(1, self.filtered_srv.gpu_handle()?);
            list.DrawInstanced(VERTICES_PER_QUAD, 1, VERTICES_PER_QUAD, 0);

            list.ResourceBarrier(&[
                transition_barrier(
                    back_buffer,
                    D3D12_RESOURCE_STATE_RENDER_TARGET,
                    D3D12_RESOURCE_STATE_PRESENT,
                ),
                transition_barrier(
                    &self.filtered_image,
                    D3D12_RESOURCE_STATE_PIXEL_SHADER_RESOURCE,
                    D3D12_RESOURCE_STATE_UNORDERED_ACCESS,
                ),
                transition_barrier(
                    &self.source_image,
                    D3D12_RESOURCE_STATE_PIXEL_SHADER_RESOURCE,
                    D3D12_RESOURCE_STATE_NON_PIXEL_SHADER_RESOURCE,
                ),
            ]);
        }

        device.submit(&list)?;
        let sync_interval = device.sync_interval();
        device.present(sync_interval)
    }

    fn shutdown(&mut self, device: &mut GfxDevice) -> GfxResult<()> {
        if let Some(scene_constants) = self.scene_constants.take() {
            scene_constants.release(device)?;
        }
        for handle in [self.source_srv, self.filtered_srv, self.filtered_uav, self.sampler] {
            device.deallocate_descriptor(handle)?;
        }
        Ok(())
    }
}
