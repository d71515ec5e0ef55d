use gfx_device::AssetLocator;
use gfx_device::FrameTime;
use gfx_device::GfxDevice;
use gfx_device::GfxResult;
use gfx_device::NoArgs;
use gfx_device::ShaderLoader;
use gfx_device::ShaderStage;
use gfx_device::barrier::transition_barrier;
use gfx_device::pipeline::*;
use gfx_device::runner::DemoApp;
use tracing::info;
use windows::Win32::Foundation::RECT;
use windows::Win32::Graphics::Direct3D::*;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;
use windows::core::s;

use crate::vertex::CLEAR_COLOR;
use crate::vertex::COLOR_OFFSET;
use crate::vertex::TRIANGLE;
use crate::vertex::Vertex;

pub struct HelloTriangle {
    root_signature: ID3D12RootSignature,
    pipeline_state: ID3D12PipelineState,
    _vertex_buffer: ID3D12Resource,
    vertex_buffer_view: D3D12_VERTEX_BUFFER_VIEW,
    viewport: D3D12_VIEWPORT,
    scissor_rect: RECT,
}

impl DemoApp for HelloTriangle {
    const TITLE: &'static str = crate::TITLE;
    type Args = NoArgs;

    fn initialize(
        device: &mut GfxDevice,
        _args: &NoArgs,
        assets: &AssetLocator,
    ) -> GfxResult<Self> {
        let root_signature = device.create_root_signature(&root_signature_desc(
            &[],
            D3D12_ROOT_SIGNATURE_FLAG_ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT,
        ))?;

        let shaders = ShaderLoader::new(assets);
        let vertex_shader = shaders.load("VSMain", ShaderStage::Vertex)?;
        let pixel_shader = shaders.load("PSMain", ShaderStage::Pixel)?;

        let input_elements = [
            input_element(s!("POSITION"), DXGI_FORMAT_R32G32B32_FLOAT, 0, 0),
            input_element(s!("COLOR"), DXGI_FORMAT_R32G32B32A32_FLOAT, 0, COLOR_OFFSET),
        ];
        let pipeline_desc = D3D12_GRAPHICS_PIPELINE_STATE_DESC {
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
        let pipeline_state = device.create_graphics_pipeline_state(&pipeline_desc)?;

        let vertices: &[u8] = bytemuck::cast_slice(&TRIANGLE);
        let vertex_buffer = device.create_buffer(
            vertices.len() as u64,
            D3D12_HEAP_TYPE_UPLOAD,
            D3D12_RESOURCE_STATE_GENERIC_READ,
            Some(vertices),
        )?;
        let vertex_buffer_view = D3D12_VERTEX_BUFFER_VIEW {
            BufferLocation: unsafe { vertex_buffer.GetGPUVirtualAddress() },
            StrideInBytes: std::mem::size_of::<Vertex>() as u32,
            SizeInBytes: vertices.len() as u32,
        };
        info!("Triangle ready");

        Ok(Self {
            root_signature,
            pipeline_state,
            _vertex_buffer: vertex_buffer,
            vertex_buffer_view,
            viewport: viewport(device.width(), device.height()),
            scissor_rect: scissor_rect(device.width(), device.height()),
        })
    }

    fn update(&mut self, device: &mut GfxDevice, _time: FrameTime) -> GfxResult<()> {
        device.new_frame()?;
        let list = device.begin_command_list()?;
        let back_buffer = device.swapchain_buffer_resource();
        let rtv = device.swapchain_buffer_descriptor();

        unsafe {
            list.SetGraphicsRootSignature(&self.root_signature);
            list.SetPipelineState(&self.pipeline_state);
            list.RSSetViewports(&[self.viewport]);
            list.RSSetScissorRects(&[self.scissor_rect]);

            list.ResourceBarrier(&[transition_barrier(
                back_buffer,
                D3D12_RESOURCE_STATE_PRESENT,
                D3D12_RESOURCE_STATE_RENDER_TARGET,
            )]);
            list.OMSetRenderTargets(1, Some(&rtv), false, None);
            list.ClearRenderTargetView(rtv, &CLEAR_COLOR, None);
            list.IASetPrimitiveTopology(D3D_PRIMITIVE_TOPOLOGY_TRIANGLELIST);
            list.IASetVertexBuffers(0, Some(&[self.vertex_buffer_view]));
            list.DrawInstanced(TRIANGLE.len() as u32, 1, 0, 0);
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

    fn shutdown(&mut self, _device: &mut GfxDevice) -> GfxResult<()> {
        Ok(())
    }
}
