use std::path::Path;
use std::path::PathBuf;

use eyre::bail;
use tracing::warn;

use crate::gfx_error::GfxResult;

/// Locates a demo's `res/` directory.
///
/// Lookup order: explicit `--asset-dir`, `res/` next to the executable, then
/// the crate's own `res/` so `cargo run` works from a checkout.
#[derive(Debug, Clone)]
pub struct AssetLocator {
    root: PathBuf,
}

impl AssetLocator {
    pub fn resolve(
        override_dir: Option<&Path>,
        exe_dir: Option<&Path>,
        manifest_dir: &Path,
    ) -> GfxResult<Self> {
        if let Some(dir) = override_dir {
            if !dir.is_dir() {
                bail!("asset directory {} does not exist", dir.display());
            }
            return Ok(Self {
                root: dir.to_path_buf(),
            });
        }
        if let Some(exe_dir) = exe_dir {
            let candidate = exe_dir.join("res");
            if candidate.is_dir() {
                return Ok(Self { root: candidate });
            }
        }
        let fallback = manifest_dir.join("res");
        if fallback.is_dir() {
            warn!(
                "res/ not found next to executable, using {}",
                fallback.display()
            );
            return Ok(Self { root: fallback });
        }
        bail!(
            "no asset directory found next to executable ({:?}) or in {}",
            exe_dir.map(|d| d.join("res")),
            fallback.display()
        )
    }

    pub fn from_command_line(override_dir: Option<&Path>, manifest_dir: &str) -> GfxResult<Self> {
        let exe = std::env::current_exe().ok();
        let exe_dir = exe.as_deref().and_then(Path::parent);
        Self::resolve(override_dir, exe_dir, Path::new(manifest_dir))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn shader_dir(&self) -> PathBuf {
        self.root.join("shader")
    }

    pub fn texture(&self, name: &str) -> PathBuf {
        self.root.join("texture").join(name)
    }

    pub fn model(&self, name: &str) -> PathBuf {
        self.root.join("model").join(name)
    }
}

/// Shader stage targets understood by the FXC compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Hull,
    Domain,
    Pixel,
    Compute,
}

impl ShaderStage {
    pub fn target(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vs_5_0",
            ShaderStage::Hull => "hs_5_0",
            ShaderStage::Domain => "ds_5_0",
            ShaderStage::Pixel => "ps_5_0",
            ShaderStage::Compute => "cs_5_0",
        }
    }
}

/// Where the bytecode for one entry point comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderSource {
    Precompiled(PathBuf),
    Hlsl(PathBuf),
}

/// Prefers `<entry>.cso`, otherwise compiles `shaders.hlsl`.
pub fn locate_shader(shader_dir: &Path, entry_point: &str) -> GfxResult<ShaderSource> {
    let precompiled = shader_dir.join(format!("{entry_point}.cso"));
    if precompiled.is_file() {
        return Ok(ShaderSource::Precompiled(precompiled));
    }
    let hlsl = shader_dir.join("shaders.hlsl");
    if hlsl.is_file() {
        return Ok(ShaderSource::Hlsl(hlsl));
    }
    bail!(
        "neither {} nor {} exists",
        precompiled.display(),
        hlsl.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_and_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let assets =
            AssetLocator::resolve(Some(dir.path()), None, Path::new("/nonexistent")).unwrap();
        assert_eq!(assets.root(), dir.path());

        let missing = dir.path().join("missing");
        assert!(AssetLocator::resolve(Some(&missing), None, Path::new("/nonexistent")).is_err());
    }

    #[test]
    fn exe_dir_before_manifest_dir() {
        let exe_dir = tempfile::tempdir().unwrap();
        let manifest_dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(exe_dir.path().join("res")).unwrap();
        std::fs::create_dir(manifest_dir.path().join("res")).unwrap();

        let assets =
            AssetLocator::resolve(None, Some(exe_dir.path()), manifest_dir.path()).unwrap();
        assert_eq!(assets.root(), exe_dir.path().join("res"));
    }

    #[test]
    fn falls_back_to_manifest_dir() {
        let exe_dir = tempfile::tempdir().unwrap();
        let manifest_dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(manifest_dir.path().join("res")).unwrap();

        let assets =
            AssetLocator::resolve(None, Some(exe_dir.path()), manifest_dir.path()).unwrap();
        assert_eq!(assets.shader_dir(), manifest_dir.path().join("res").join("shader"));
        assert_eq!(
            assets.texture("image.png"),
            manifest_dir.path().join("res").join("texture").join("image.png")
        );
    }

    #[test]
    fn nothing_found_is_an_error() {
        let empty = tempfile::tempdir().unwrap();
        assert!(AssetLocator::resolve(None, Some(empty.path()), empty.path()).is_err());
    }

    #[test]
    fn precompiled_shader_preferred() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("shaders.hlsl"), "// hlsl").unwrap();
        assert_eq!(
            locate_shader(dir.path(), "VSMain").unwrap(),
            ShaderSource::Hlsl(dir.path().join("shaders.hlsl"))
        );

        std::fs::write(dir.path().join("VSMain.cso"), [0x44, 0x58, 0x42, 0x43]).unwrap();
        assert_eq!(
            locate_shader(dir.path(), "VSMain").unwrap(),
            ShaderSource::Precompiled(dir.path().join("VSMain.cso"))
        );
        assert_eq!(
            locate_shader(dir.path(), "PSMain").unwrap(),
            ShaderSource::Hlsl(dir.path().join("shaders.hlsl"))
        );
    }

    #[test]
    fn missing_shader_sources() {
        let dir = tempfile::tempdir().unwrap();
        assert!(locate_shader(dir.path(), "CSMain").is_err());
    }

    #[test]
    fn stage_targets() {
        assert_eq!(ShaderStage::Hull.target(), "hs_5_0");
        assert_eq!(ShaderStage::Compute.target(), "cs_5_0");
    }
}
