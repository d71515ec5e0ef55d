use gfx_device::AssetLocator;
use gfx_device::ConstantBuffers;
use gfx_device::DescriptorHandle;
use gfx_device::FrameTime;
use gfx_device::GfxDevice;
use gfx_device::GfxResult;
use gfx_device::KeyCode;
use gfx_device::NoArgs;
use gfx_device::ShaderLoader;
use gfx_device::ShaderStage;
use gfx_device::barrier::transition_barrier;
use gfx_device::pipeline::*;
use gfx_device::runner::DemoApp;
use tracing::debug;
use tracing::info;
use windows::Win32::Foundation::RECT;
use windows::Win32::Graphics::Direct3D::*;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;
use windows::core::s;

use crate::plane::*;

pub struct Tessellation {
    root_signature: ID3D12RootSignature,
    wireframe_pipeline: ID3D12PipelineState,
    solid_pipeline: ID3D12PipelineState,
    _depth_buffer: ID3D12Resource,
    depth_view: DescriptorHandle,
    _vertex_buffer: ID3D12Resource,
    _index_buffer: ID3D12Resource,
    vertex_buffer_view: D3D12_VERTEX_BUFFER_VIEW,
    index_buffer_view: D3D12_INDEX_BUFFER_VIEW,
    scene_constants: Option<ConstantBuffers<SceneParameters>>,
    settings: TessSettings,
    viewport: D3D12_VIEWPORT,
    scissor_rect: RECT,
}

impl DemoApp for Tessellation {
    const TITLE: &'static str = crate::TITLE;
    type Args = NoArgs;

    fn initialize(
        device: &mut GfxDevice,
        _args: &NoArgs,
        assets: &AssetLocator,
    ) -> GfxResult<Self> {
        let (depth_buffer, depth_view) = device.create_depth_buffer()?;

        let vertices: &[u8] = bytemuck::cast_slice(&PLANE_VERTICES);
        let vertex_buffer = device.create_buffer(
            vertices.len() as u64,
            D3D12_HEAP_TYPE_DEFAULT,
            D3D12_RESOURCE_STATE_VERTEX_AND_CONSTANT_BUFFER,
            Some(vertices),
        )?;
        let indices: &[u8] = bytemuck::cast_slice(&PLANE_INDICES);
        let index_buffer = device.create_buffer(
            indices.len() as u64,
            D3D12_HEAP_TYPE_DEFAULT,
            D3D12_RESOURCE_STATE_INDEX_BUFFER,
            Some(indices),
        )?;
        let vertex_buffer_view = D3D12_VERTEX_BUFFER_VIEW {
            BufferLocation: unsafe { vertex_buffer.GetGPUVirtualAddress() },
            StrideInBytes: std::mem::size_of::<Vertex>() as u32,
            SizeInBytes: vertices.len() as u32,
        };
        let index_buffer_view = D3D12_INDEX_BUFFER_VIEW {
            BufferLocation: unsafe { index_buffer.GetGPUVirtualAddress() },
            SizeInBytes: indices.len() as u32,
            Format: DXGI_FORMAT_R32_UINT,
        };

        let root_signature = device.create_root_signature(&root_signature_desc(
            &[root_cbv(0, D3D12_SHADER_VISIBILITY_ALL)],
            D3D12_ROOT_SIGNATURE_FLAG_ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT,
        ))?;

        let shaders = ShaderLoader::new(assets);
        let vertex_shader = shaders.load("VSMain", ShaderStage::Vertex)?;
        let hull_shader = shaders.load("HSMain", ShaderStage::Hull)?;
        let domain_shader = shaders.load("DSMain", ShaderStage::Domain)?;
        let pixel_shader = shaders.load("PSMain", ShaderStage::Pixel)?;

        let input_elements = [input_element(s!("POSITION"), DXGI_FORMAT_R32G32B32_FLOAT, 0, 0)];
        // The plane is seen from both sides once displaced.
        let rasterizer = |fill_mode| D3D12_RASTERIZER_DESC {
            CullMode: D3D12_CULL_MODE_NONE,
            ..rasterizer_state(fill_mode)
        };
        let mut pipeline_desc = D3D12_GRAPHICS_PIPELINE_STATE_DESC {
            pRootSignature: borrow_root_signature(&root_signature),
            VS: vertex_shader.bytecode(),
            HS: hull_shader.bytecode(),
            DS: domain_shader.bytecode(),
            PS: pixel_shader.bytecode(),
            InputLayout: input_layout(&input_elements),
            RasterizerState: rasterizer(D3D12_FILL_MODE_WIREFRAME),
            BlendState: blend_state(BlendMode::Opaque),
            DepthStencilState: depth_stencil_state(DepthMode::ReadWrite),
            SampleMask: u32::MAX,
            PrimitiveTopologyType: D3D12_PRIMITIVE_TOPOLOGY_TYPE_PATCH,
            NumRenderTargets: 1,
            RTVFormats: rtv_formats(device.swapchain_format()),
            DSVFormat: DXGI_FORMAT_D32_FLOAT,
            SampleDesc: single_sample(),
            ..Default::default()
        };
        let wireframe_pipeline = device.create_graphics_pipeline_state(&pipeline_desc)?;
        pipeline_desc.RasterizerState = rasterizer(D3D12_FILL_MODE_SOLID);
        let solid_pipeline = device.create_graphics_pipeline_state(&pipeline_desc)?;

        let scene_constants = device.create_constant_buffers::<SceneParameters>()?;
        info!("Tessellated plane ready");

        Ok(Self {
            root_signature,
            wireframe_pipeline,
            solid_pipeline,
            _depth_buffer: depth_buffer,
            depth_view,
            _vertex_buffer: vertex_buffer,
            _index_buffer: index_buffer,
            vertex_buffer_view,
            index_buffer_view,
            scene_constants: Some(scene_constants),
            settings: TessSettings::default(),
            viewport: viewport(device.width(), device.height()),
            scissor_rect: scissor_rect(device.width(), device.height()),
        })
    }

    fn on_key_down(&mut self, key: KeyCode) {
        if self.settings.handle_key(key) {
            debug!(
                "Tessellation inner {} outer {} fill {}",
                self.settings.inner, self.settings.outer, self.settings.fill
            );
        }
    }

    fn update(&mut self, device: &mut GfxDevice, time: FrameTime) -> GfxResult<()> {
        let frame = device.frame_index();
        let Some(scene_constants) = &self.scene_constants else {
            eyre::bail!("update called after shutdown");
        };
        let aspect_ratio = self.viewport.Width / self.viewport.Height;
        scene_constants.write(
            frame,
            &scene_parameters(&self.settings, aspect_ratio, time.total),
        )?;
        let constants_address = scene_constants.gpu_address(frame);
        let pipeline = if self.settings.fill {
            &self.solid_pipeline
        } else {
            &self.wireframe_pipeline
        };

        device.new_frame()?;
        let list = device.begin_command_list()?;
        let back_buffer = device.swapchain_buffer_resource();
        let rtv = device.swapchain_buffer_descriptor();
        let dsv = self.depth_view.cpu;

        unsafe {
            list.SetGraphicsRootSignature(&self.root_signature);
            list.SetPipelineState(pipeline);
            list.RSSetViewports(&[self.viewport]);
            list.RSSetScissorRects(&[self.scissor_rect]);

            list.ResourceBarrier(&[transition_barrier(
                back_buffer,
                D3D12_RESOURCE_STATE_PRESENT,
                D3D12_RESOURCE_STATE_RENDER_TARGET,
            )]);
            list.OMSetRenderTargets(1, Some(&rtv), false, Some(&dsv));
            list.ClearRenderTargetView(rtv, &CLEAR_COLOR, None);
            list.ClearDepthStencilView(dsv, D3D12_CLEAR_FLAG_DEPTH, 1.0, 0, None);

            list.IASetPrimitiveTopology(D3D_PRIMITIVE_TOPOLOGY_4_CONTROL_POINT_PATCHLIST);
            list.IASetVertexBuffers(0, Some(&[self.vertex_buffer_view]));
            list.IASetIndexBuffer(Some(&self.index_buffer_view));
            list.SetGraphicsRootConstantBufferView(0, constants_address);
            list.DrawIndexedInstanced(PLANE_INDICES.len() as u32, 1, 0, 0, 0);

            list.ResourceBarrier(&[transition_barrier(
                back_buffer,
                D3D12_RESOURCE_STATE_RENDER_TARGET,
                D3D12_RESOURCE_STATE_PRESENT,
            )]);
        }

        device.submit(&list)?;
        let sync_interval = device.sync_interval();
        device.present(sync_interval)
    }

    fn shutdown(&mut self, device: &mut GfxDevice) -> GfxResult<()> {
        if let Some(scene_constants) = self.scene_constants.take() {
            scene_constants.release(device)?;
        }
        device.deallocate_descriptor(self.depth_view)
    }
}
