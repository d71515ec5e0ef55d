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
use gfx_device::barrier::transition_barrier;
use gfx_device::image_data::mip_level_count;
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

use crate::ModelArgs;
use crate::model_asset::AlphaMode;
use crate::model_asset::MaterialData;
use crate::model_asset::MeshData;
use crate::model_asset::ModelAsset;
use crate::scene::*;

/// Root parameter slots.
const ROOT_SCENE: u32 = 0;
const ROOT_DRAW: u32 = 1;
const ROOT_DIFFUSE: u32 = 2;
const ROOT_SAMPLER: u32 = 3;

struct GpuTexture {
    _resource: ID3D12Resource,
    srv: DescriptorHandle,
}

struct GpuMaterial {
    data: MaterialData,
    diffuse: DescriptorHandle,
    sampler: DescriptorHandle,
}

struct GpuMesh {
    _buffers: [ID3D12Resource; 4],
    vertex_buffer_views: [D3D12_VERTEX_BUFFER_VIEW; 3],
    index_buffer_view: D3D12_INDEX_BUFFER_VIEW,
    index_count: u32,
    material: usize,
    constants: ConstantBuffers<DrawParameters>,
}

impl GpuMesh {
    fn upload(device: &mut GfxDevice, mesh: &MeshData) -> GfxResult<Self> {
        let (position, position_view) = vertex_stream(device, &mesh.positions)?;
        let (normal, normal_view) = vertex_stream(device, &mesh.normals)?;
        let (texcoord, texcoord_view) = vertex_stream(device, &mesh.texcoords)?;
        let index_bytes: &[u8] = bytemuck::cast_slice(&mesh.indices);
        let indices = device.create_buffer(
            index_bytes.len() as u64,
            D3D12_HEAP_TYPE_DEFAULT,
            D3D12_RESOURCE_STATE_INDEX_BUFFER,
            Some(index_bytes),
        )?;
        let index_buffer_view = D3D12_INDEX_BUFFER_VIEW {
            BufferLocation: unsafe { indices.GetGPUVirtualAddress() },
            SizeInBytes: index_bytes.len() as u32,
            Format: DXGI_FORMAT_R32_UINT,
        };
        Ok(Self {
            _buffers: [position, normal, texcoord, indices],
            vertex_buffer_views: [position_view, normal_view, texcoord_view],
            index_buffer_view,
            index_count: mesh.indices.len() as u32,
            material: mesh.material,
            constants: device.create_root_constant_buffers::<DrawParameters>()?,
        })
    }
}

/// One tightly packed vertex stream in the default heap.
fn vertex_stream<T: bytemuck::Pod>(
    device: &mut GfxDevice,
    data: &[T],
) -> GfxResult<(ID3D12Resource, D3D12_VERTEX_BUFFER_VIEW)> {
    let bytes: &[u8] = bytemuck::cast_slice(data);
    let buffer = device.create_buffer(
        bytes.len() as u64,
        D3D12_HEAP_TYPE_DEFAULT,
        D3D12_RESOURCE_STATE_VERTEX_AND_CONSTANT_BUFFER,
        Some(bytes),
    )?;
    let view = D3D12_VERTEX_BUFFER_VIEW {
        BufferLocation: unsafe { buffer.GetGPUVirtualAddress() },
        StrideInBytes: std::mem::size_of::<T>() as u32,
        SizeInBytes: bytes.len() as u32,
    };
    Ok((buffer, view))
}

fn upload_texture(device: &mut GfxDevice, image: &ImageData) -> GfxResult<GpuTexture> {
    let resource = device.create_texture_from_image(
        image,
        true,
        D3D12_RESOURCE_STATE_PIXEL_SHADER_RESOURCE,
        D3D12_RESOURCE_FLAG_NONE,
    )?;
    let srv = device.create_shader_resource_view(
        &resource,
        &texture_2d_srv_desc(
            DXGI_FORMAT_R8G8B8A8_UNORM,
            mip_level_count(image.width, image.height),
        ),
    )?;
    Ok(GpuTexture {
        _resource: resource,
        srv,
    })
}

pub struct DrawModel {
    root_signature: ID3D12RootSignature,
    opaque_pipeline: ID3D12PipelineState,
    blend_pipeline: ID3D12PipelineState,
    _depth_buffer: ID3D12Resource,
    depth_view: DescriptorHandle,
    scene_constants: Option<ConstantBuffers<SceneParameters>>,
    textures: Vec<Option<GpuTexture>>,
    white_texture: Option<GpuTexture>,
    materials: Vec<GpuMaterial>,
    meshes: Vec<GpuMesh>,
    draw_order: Vec<usize>,
    camera: ModelCamera,
    material_override: MaterialOverride,
    viewport: D3D12_VIEWPORT,
    scissor_rect: RECT,
}

impl DrawModel {
    fn create_pipelines(
        device: &GfxDevice,
        shaders: &ShaderLoader,
    ) -> GfxResult<(ID3D12RootSignature, ID3D12PipelineState, ID3D12PipelineState)> {
        let srv_ranges = [descriptor_range(D3D12_DESCRIPTOR_RANGE_TYPE_SRV, 0, 1)];
        let sampler_ranges = [descriptor_range(D3D12_DESCRIPTOR_RANGE_TYPE_SAMPLER, 0, 1)];
        let parameters = [
            root_cbv(0, D3D12_SHADER_VISIBILITY_ALL),
            root_cbv(1, D3D12_SHADER_VISIBILITY_ALL),
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
            input_element(s!("NORMAL"), DXGI_FORMAT_R32G32B32_FLOAT, 1, 0),
            input_element(s!("TEXCOORD"), DXGI_FORMAT_R32G32_FLOAT, 2, 0),
        ];
        let mut desc = D3D12_GRAPHICS_PIPELINE_STATE_DESC {
            pRootSignature: borrow_root_signature(&root_signature),
            VS: vertex_shader.bytecode(),
            PS: pixel_shader.bytecode(),
            InputLayout: input_layout(&input_elements),
            RasterizerState: rasterizer_state(D3D12_FILL_MODE_SOLID),
            BlendState: blend_state(BlendMode::Opaque),
            DepthStencilState: depth_stencil_state(DepthMode::ReadWrite),
            SampleMask: u32::MAX,
            PrimitiveTopologyType: D3D12_PRIMITIVE_TOPOLOGY_TYPE_TRIANGLE,
            NumRenderTargets: 1,
            RTVFormats: rtv_formats(device.swapchain_format()),
            DSVFormat: DXGI_FORMAT_D32_FLOAT,
            SampleDesc: single_sample(),
            ..Default::default()
        };
        let opaque = device.create_graphics_pipeline_state(&desc)?;

        desc.BlendState = blend_state(BlendMode::Alpha);
        desc.DepthStencilState = depth_stencil_state(DepthMode::ReadOnly);
        let blend = device.create_graphics_pipeline_state(&desc)?;
        Ok((root_signature, opaque, blend))
    }

    fn scene_constants(&self) -> GfxResult<&ConstantBuffers<SceneParameters>> {
        match &self.scene_constants {
            Some(constants) => Ok(constants),
            None => eyre::bail!("update called after shutdown"),
        }
    }

    fn draw_meshes(
        &self,
        list: &ID3D12GraphicsCommandList,
        frame: usize,
        blended: bool,
    ) -> GfxResult<()> {
        let pipeline = if blended {
            &self.blend_pipeline
        } else {
            &self.opaque_pipeline
        };
        unsafe { list.SetPipelineState(pipeline) };
        for mesh in self.draw_order.iter().map(|&i| &self.meshes[i]) {
            let material = &self.materials[mesh.material];
            if (material.data.alpha_mode == AlphaMode::Blend) != blended {
                continue;
            }
            unsafe {
                list.SetGraphicsRootConstantBufferView(
                    ROOT_DRAW,
                    mesh.constants.gpu_address(frame),
                );
                list.SetGraphicsRootDescriptorTable(ROOT_DIFFUSE, material.diffuse.gpu_handle()?);
                list.SetGraphicsRootDescriptorTable(ROOT_SAMPLER, material.sampler.gpu_handle()?);
                list.IASetVertexBuffers(0, Some(&mesh.vertex_buffer_views));
                list.IASetIndexBuffer(Some(&mesh.index_buffer_view));
                list.DrawIndexedInstanced(mesh.index_count, 1, 0, 0, 0);
            }
        }
        Ok(())
    }
}

impl DemoApp for DrawModel {
    const TITLE: &'static str = crate::TITLE;
    type Args = ModelArgs;

    fn initialize(
        device: &mut GfxDevice,
        args: &ModelArgs,
        assets: &AssetLocator,
    ) -> GfxResult<Self> {
        let model = ModelAsset::load_or_cube(args.model.as_deref(), &assets.model("model.glb"))?;
        model.descriptor_usage().check_fits()?;

        let shaders = ShaderLoader::new(assets);
        let (root_signature, opaque_pipeline, blend_pipeline) =
            Self::create_pipelines(device, &shaders)?;
        let (depth_buffer, depth_view) = device.create_depth_buffer()?;

        let textures = model
            .images
            .iter()
            .map(|image| image.as_ref().map(|image| upload_texture(device, image)).transpose())
            .collect::<GfxResult<Vec<_>>>()?;
        let white_texture = upload_texture(device, &ImageData::solid(1, 1, [255; 4]))?;

        let mut materials = Vec::with_capacity(model.materials.len());
        for data in &model.materials {
            let diffuse = match data.image.and_then(|index| textures.get(index)?.as_ref()) {
                Some(texture) => texture.srv,
                None => white_texture.srv,
            };
            let sampler =
                device.create_sampler(&trilinear_sampler_desc(D3D12_TEXTURE_ADDRESS_MODE_WRAP))?;
            materials.push(GpuMaterial {
                data: data.clone(),
                diffuse,
                sampler,
            });
        }

        let meshes = model
            .meshes
            .iter()
            .map(|mesh| GpuMesh::upload(device, mesh))
            .collect::<GfxResult<Vec<_>>>()?;
        info!(
            "Model uploaded: {} meshes, {} materials, {} textures",
            meshes.len(),
            materials.len(),
            textures.iter().flatten().count()
        );

        Ok(Self {
            root_signature,
            opaque_pipeline,
            blend_pipeline,
            _depth_buffer: depth_buffer,
            depth_view,
            scene_constants: Some(device.create_constant_buffers::<SceneParameters>()?),
            textures,
            white_texture: Some(white_texture),
            materials,
            meshes,
            draw_order: model.draw_order(),
            camera: ModelCamera::fit(model.bounds()),
            material_override: MaterialOverride::default(),
            viewport: viewport(device.width(), device.height()),
            scissor_rect: scissor_rect(device.width(), device.height()),
        })
    }

    fn on_key_down(&mut self, key: KeyCode) {
        if key == b'O' {
            self.material_override.toggle();
            debug!("Material override {}", self.material_override.enabled);
        }
    }

    fn update(&mut self, device: &mut GfxDevice, time: FrameTime) -> GfxResult<()> {
        let frame = device.frame_index();
        let aspect_ratio = self.viewport.Width / self.viewport.Height;
        let scene_constants = self.scene_constants()?;
        scene_constants.write(frame, &self.camera.scene_parameters(aspect_ratio, time.total))?;
        let world = self.camera.world(time.total);
        for mesh in &self.meshes {
            let material = &self.materials[mesh.material].data;
            mesh.constants
                .write(frame, &self.material_override.draw_parameters(world, material))?;
        }

        device.new_frame()?;
        let list = device.begin_command_list()?;
        device.bind_shader_visible_heaps(&list);
        let back_buffer = device.swapchain_buffer_resource();
        let rtv = device.swapchain_buffer_descriptor();
        let dsv = self.depth_view.cpu;

        unsafe {
            list.SetGraphicsRootSignature(&self.root_signature);
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
            list.IASetPrimitiveTopology(D3D_PRIMITIVE_TOPOLOGY_TRIANGLELIST);
            list.SetGraphicsRootConstantBufferView(ROOT_SCENE, scene_constants.gpu_address(frame));
        }

        self.draw_meshes(&list, frame, false)?;
        self.draw_meshes(&list, frame, true)?;

        unsafe {
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
        for mesh in self.meshes.drain(..) {
            mesh.constants.release(device)?;
        }
        for material in self.materials.drain(..) {
            device.deallocate_descriptor(material.sampler)?;
        }
        for texture in self.textures.drain(..).flatten().chain(self.white_texture.take()) {
            device.deallocate_descriptor(texture.srv)?;
        }
        if let Some(scene_constants) = self.scene_constants.take() {
            scene_constants.release(device)?;
        }
        device.deallocate_descriptor(self.depth_view)
    }
}
