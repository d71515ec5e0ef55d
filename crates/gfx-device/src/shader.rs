use std::ffi::CString;
use std::path::Path;
use std::path::PathBuf;

use eyre::WrapErr;
use eyre::bail;
use tracing::debug;
use tracing::error;
use windows::Win32::Graphics::Direct3D::Fxc::*;
use windows::Win32::Graphics::Direct3D::ID3DBlob;
use windows::Win32::Graphics::Direct3D12::D3D12_SHADER_BYTECODE;
use windows::core::HSTRING;
use windows::core::PCSTR;

use crate::assets::AssetLocator;
use crate::assets::ShaderSource;
use crate::assets::ShaderStage;
use crate::assets::locate_shader;
use crate::gfx_error::GfxResult;
use crate::gfx_error::WrappedWindowsError;

/// Compiled shader bytecode owned on the CPU side.
#[derive(Debug, Clone)]
pub struct ShaderBytecode {
    bytes: Vec<u8>,
}

impl ShaderBytecode {
    /// Borrowed view for pipeline state descriptions. `self` must outlive
    /// the pipeline creation call.
    pub fn bytecode(&self) -> D3D12_SHADER_BYTECODE {
        D3D12_SHADER_BYTECODE {
            pShaderBytecode: self.bytes.as_ptr() as *const _,
            BytecodeLength: self.bytes.len(),
        }
    }
}

pub struct ShaderLoader {
    shader_dir: PathBuf,
    compile_flags: u32,
}

impl ShaderLoader {
    pub fn new(assets: &AssetLocator) -> Self {
        let compile_flags = if cfg!(debug_assertions) {
            D3DCOMPILE_DEBUG | D3DCOMPILE_SKIP_OPTIMIZATION
        } else {
            0
        };
        Self {
            shader_dir: assets.shader_dir(),
            compile_flags,
        }
    }

    pub fn load(&self, entry_point: &str, stage: ShaderStage) -> GfxResult<ShaderBytecode> {
        match locate_shader(&self.shader_dir, entry_point)? {
            ShaderSource::Precompiled(path) => {
                let bytes = std::fs::read(&path)
                    .wrap_err_with(|| format!("failed to read {}", path.display()))?;
                debug!("Loaded precompiled shader {}", path.display());
                Ok(ShaderBytecode { bytes })
            }
            ShaderSource::Hlsl(path) => self.compile(&path, entry_point, stage),
        }
    }

    fn compile(
        &self,
        path: &Path,
        entry_point: &str,
        stage: ShaderStage,
    ) -> GfxResult<ShaderBytecode> {
        let file = HSTRING::from(path.to_string_lossy().as_ref());
        let entry = CString::new(entry_point)?;
        let target = CString::new(stage.target())?;

        let mut shader_blob: Option<ID3DBlob> = None;
        let mut error_blob: Option<ID3DBlob> = None;
        let result = unsafe {
            D3DCompileFromFile(
                &file,
                None,
                None,
                PCSTR(entry.as_ptr() as *const u8),
                PCSTR(target.as_ptr() as *const u8),
                self.compile_flags,
                0,
                &mut shader_blob,
                Some(&mut error_blob),
            )
        };

        if let Err(e) = result {
            let message = error_blob
                .as_ref()
                .map(blob_to_string)
                .unwrap_or_default();
            error!(
                "Shader compile error ({entry_point} {}): {message}",
                stage.target()
            );
            return Err(eyre::Report::new(WrappedWindowsError::from(e)).wrap_err(format!(
                "compiling {entry_point} ({}) from {}: {message}",
                stage.target(),
                path.display()
            )));
        }
        let Some(blob) = shader_blob else {
            bail!("D3DCompileFromFile returned no bytecode for {entry_point}");
        };
        debug!("Compiled {entry_point} ({}) from {}", stage.target(), path.display());
        Ok(ShaderBytecode {
            bytes: blob_bytes(&blob).to_vec(),
        })
    }
}

pub fn blob_bytes(blob: &ID3DBlob) -> &[u8] {
    unsafe {
        std::slice::from_raw_parts(blob.GetBufferPointer() as *const u8, blob.GetBufferSize())
    }
}

pub fn blob_to_string(blob: &ID3DBlob) -> String {
    String::from_utf8_lossy(blob_bytes(blob))
        .trim_end_matches('\0')
        .trim()
        .to_string()
}
