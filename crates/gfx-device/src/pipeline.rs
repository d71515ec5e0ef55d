//! Fixed-function state and root signature building blocks shared by the demos.

use std::mem::ManuallyDrop;

use windows::Win32::Foundation::*;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;
use windows::core::PCSTR;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    Opaque,
    /// Straight alpha: `src * a + dst * (1 - a)`.
    Alpha,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthMode {
    Disabled,
    /// Test with LESS and write.
    ReadWrite,
    /// Test with LESS without writing.
    ReadOnly,
}

pub fn blend_state(mode: BlendMode) -> D3D12_BLEND_DESC {
    let target = match mode {
        BlendMode::Opaque => D3D12_RENDER_TARGET_BLEND_DESC {
            BlendEnable: FALSE,
            LogicOpEnable: FALSE,
            SrcBlend: D3D12_BLEND_ONE,
            DestBlend: D3D12_BLEND_ZERO,
            BlendOp: D3D12_BLEND_OP_ADD,
            SrcBlendAlpha: D3D12_BLEND_ONE,
            DestBlendAlpha: D3D12_BLEND_ZERO,
            BlendOpAlpha: D3D12_BLEND_OP_ADD,
            LogicOp: D3D12_LOGIC_OP_NOOP,
            RenderTargetWriteMask: D3D12_COLOR_WRITE_ENABLE_ALL.0 as u8,
        },
        BlendMode::Alpha => D3D12_RENDER_TARGET_BLEND_DESC {
            BlendEnable: TRUE,
            LogicOpEnable: FALSE,
            SrcBlend: D3D12_BLEND_SRC_ALPHA,
            DestBlend: D3D12_BLEND_INV_SRC_ALPHA,
            BlendOp: D3D12_BLEND_OP_ADD,
            SrcBlendAlpha: D3D12_BLEND_ONE,
            DestBlendAlpha: D3D12_BLEND_INV_SRC_ALPHA,
            BlendOpAlpha: D3D12_BLEND_OP_ADD,
            LogicOp: D3D12_LOGIC_OP_NOOP,
            RenderTargetWriteMask: D3D12_COLOR_WRITE_ENABLE_ALL.0 as u8,
        },
    };
    D3D12_BLEND_DESC {
        AlphaToCoverageEnable: FALSE,
        IndependentBlendEnable: FALSE,
        RenderTarget: [target; 8],
    }
}

/// Back face culling with counter-clockwise front faces.
pub fn rasterizer_state(fill_mode: D3D12_FILL_MODE) -> D3D12_RASTERIZER_DESC {
    D3D12_RASTERIZER_DESC {
        FillMode: fill_mode,
        CullMode: D3D12_CULL_MODE_BACK,
        FrontCounterClockwise: TRUE,
        DepthBias: 0,
        DepthBiasClamp: 0.0,
        SlopeScaledDepthBias: 0.0,
        DepthClipEnable: TRUE,
        MultisampleEnable: FALSE,
        AntialiasedLineEnable: FALSE,
        ForcedSampleCount: 0,
        ConservativeRaster: D3D12_CONSERVATIVE_RASTERIZATION_MODE_OFF,
    }
}

pub fn depth_stencil_state(mode: DepthMode) -> D3D12_DEPTH_STENCIL_DESC {
    let keep = D3D12_DEPTH_STENCILOP_DESC {
        StencilFailOp: D3D12_STENCIL_OP_KEEP,
        StencilDepthFailOp: D3D12_STENCIL_OP_KEEP,
        StencilPassOp: D3D12_STENCIL_OP_KEEP,
        StencilFunc: D3D12_COMPARISON_FUNC_ALWAYS,
    };
    D3D12_DEPTH_STENCIL_DESC {
        DepthEnable: if mode == DepthMode::Disabled { FALSE } else { TRUE },
        DepthWriteMask: if mode == DepthMode::ReadWrite {
            D3D12_DEPTH_WRITE_MASK_ALL
        } else {
            D3D12_DEPTH_WRITE_MASK_ZERO
        },
        DepthFunc: D3D12_COMPARISON_FUNC_LESS,
        StencilEnable: FALSE,
        StencilReadMask: 0xff,
        StencilWriteMask: 0xff,
        FrontFace: keep,
        BackFace: keep,
    }
}

pub fn rtv_formats(format: DXGI_FORMAT) -> [DXGI_FORMAT; 8] {
    let mut formats = [DXGI_FORMAT_UNKNOWN; 8];
    formats[0] = format;
    formats
}

pub fn single_sample() -> DXGI_SAMPLE_DESC {
    DXGI_SAMPLE_DESC {
        Count: 1,
        Quality: 0,
    }
}

/// Per-vertex element. `semantic` must be a static NUL terminated string
/// such as `s!("POSITION")`.
pub fn input_element(
    semantic: PCSTR,
    format: DXGI_FORMAT,
    input_slot: u32,
    offset: u32,
) -> D3D12_INPUT_ELEMENT_DESC {
    D3D12_INPUT_ELEMENT_DESC {
        SemanticName: semantic,
        SemanticIndex: 0,
        Format: format,
        InputSlot: input_slot,
        AlignedByteOffset: offset,
        InputSlotClass: D3D12_INPUT_CLASSIFICATION_PER_VERTEX_DATA,
        InstanceDataStepRate: 0,
    }
}

pub fn input_layout(elements: &[D3D12_INPUT_ELEMENT_DESC]) -> D3D12_INPUT_LAYOUT_DESC {
    D3D12_INPUT_LAYOUT_DESC {
        pInputElementDescs: elements.as_ptr(),
        NumElements: elements.len() as u32,
    }
}

pub fn descriptor_range(
    range_type: D3D12_DESCRIPTOR_RANGE_TYPE,
    base_register: u32,
    count: u32,
) -> D3D12_DESCRIPTOR_RANGE {
    D3D12_DESCRIPTOR_RANGE {
        RangeType: range_type,
        NumDescriptors: count,
        BaseShaderRegister: base_register,
        RegisterSpace: 0,
        OffsetInDescriptorsFromTableStart: D3D12_DESCRIPTOR_RANGE_OFFSET_APPEND,
    }
}

pub fn root_cbv(register: u32, visibility: D3D12_SHADER_VISIBILITY) -> D3D12_ROOT_PARAMETER {
    D3D12_ROOT_PARAMETER {
        ParameterType: D3D12_ROOT_PARAMETER_TYPE_CBV,
        Anonymous: D3D12_ROOT_PARAMETER_0 {
            Descriptor: D3D12_ROOT_DESCRIPTOR {
                ShaderRegister: register,
                RegisterSpace: 0,
            },
        },
        ShaderVisibility: visibility,
    }
}

/// Descriptor table parameter. The returned value points into `ranges`,
/// which has to outlive the root signature serialization.
pub fn root_table(
    ranges: &[D3D12_DESCRIPTOR_RANGE],
    visibility: D3D12_SHADER_VISIBILITY,
) -> D3D12_ROOT_PARAMETER {
    D3D12_ROOT_PARAMETER {
        ParameterType: D3D12_ROOT_PARAMETER_TYPE_DESCRIPTOR_TABLE,
        Anonymous: D3D12_ROOT_PARAMETER_0 {
            DescriptorTable: D3D12_ROOT_DESCRIPTOR_TABLE {
                NumDescriptorRanges: ranges.len() as u32,
                pDescriptorRanges: ranges.as_ptr(),
            },
        },
        ShaderVisibility: visibility,
    }
}

pub fn root_signature_desc(
    parameters: &[D3D12_ROOT_PARAMETER],
    flags: D3D12_ROOT_SIGNATURE_FLAGS,
) -> D3D12_ROOT_SIGNATURE_DESC {
    D3D12_ROOT_SIGNATURE_DESC {
        NumParameters: parameters.len() as u32,
        pParameters: if parameters.is_empty() {
            std::ptr::null()
        } else {
            parameters.as_ptr()
        },
        NumStaticSamplers: 0,
        pStaticSamplers: std::ptr::null(),
        Flags: flags,
    }
}

/// Non-owning root signature pointer for pipeline state descriptions.
pub fn borrow_root_signature(
    root_signature: &ID3D12RootSignature,
) -> ManuallyDrop<Option<ID3D12RootSignature>> {
    unsafe { std::mem::transmute_copy(root_signature) }
}

pub fn viewport(width: u32, height: u32) -> D3D12_VIEWPORT {
    D3D12_VIEWPORT {
        TopLeftX: 0.0,
        TopLeftY: 0.0,
        Width: width as f32,
        Height: height as f32,
        MinDepth: 0.0,
        MaxDepth: 1.0,
    }
}

pub fn scissor_rect(width: u32, height: u32) -> RECT {
    RECT {
        left: 0,
        top: 0,
        right: width as i32,
        bottom: height as i32,
    }
}
