//! CPU side model data: one mesh per glTF primitive, flattened into world
//! space, with Phong style materials and decoded RGBA8 images.

use std::path::Path;

use bevy_math::Mat4;
use bevy_math::Vec3;
use eyre::WrapErr;
use eyre::bail;
use gfx_device::BACK_BUFFER_COUNT;
use gfx_device::CBV_SRV_UAV_HEAP_CAPACITY;
use gfx_device::GfxResult;
use gfx_device::ImageData;
use gfx_device::SAMPLER_HEAP_CAPACITY;
use gltf::image::Format;
use gltf::mesh::Mode;
use tracing::debug;
use tracing::info;
use tracing::warn;

const DEFAULT_NORMAL: [f32; 3] = [0.0, 1.0, 0.0];
const DEFAULT_TEXCOORD: [f32; 2] = [0.0, 0.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlphaMode {
    Opaque,
    Mask,
    Blend,
}

impl AlphaMode {
    /// Value of `DrawParameters::mode` in the shader.
    pub fn shader_mode(self) -> u32 {
        match self {
            AlphaMode::Opaque => 0,
            AlphaMode::Mask => 1,
            AlphaMode::Blend => 2,
        }
    }
}

impl From<gltf::material::AlphaMode> for AlphaMode {
    fn from(mode: gltf::material::AlphaMode) -> Self {
        match mode {
            gltf::material::AlphaMode::Opaque => AlphaMode::Opaque,
            gltf::material::AlphaMode::Mask => AlphaMode::Mask,
            gltf::material::AlphaMode::Blend => AlphaMode::Blend,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialData {
    pub alpha_mode: AlphaMode,
    /// rgb colour, a alpha.
    pub diffuse: [f32; 4],
    /// rgb colour, a specular power.
    pub specular: [f32; 4],
    pub ambient: [f32; 4],
    /// Index into [`ModelAsset::images`].
    pub image: Option<usize>,
}

impl Default for MaterialData {
    fn default() -> Self {
        Self {
            alpha_mode: AlphaMode::Opaque,
            diffuse: [0.8, 0.8, 0.8, 1.0],
            specular: [0.5, 0.5, 0.5, 20.0],
            ambient: [0.1, 0.1, 0.1, 0.0],
            image: None,
        }
    }
}

impl MaterialData {
    fn from_gltf(material: &gltf::Material<'_>) -> Self {
        let pbr = material.pbr_metallic_roughness();
        Self {
            alpha_mode: material.alpha_mode().into(),
            diffuse: pbr.base_color_factor(),
            specular: specular_from_roughness(pbr.roughness_factor()),
            ambient: [0.1, 0.1, 0.1, 0.0],
            image: pbr
                .base_color_texture()
                .map(|info| info.texture().source().index()),
        }
    }
}

/// Smooth surfaces get a bright, tight highlight; rough ones a dim, wide one.
pub fn specular_from_roughness(roughness: f32) -> [f32; 4] {
    let smoothness = 1.0 - roughness.clamp(0.0, 1.0);
    let intensity = 0.04 + 0.96 * smoothness * smoothness;
    let power = 2.0 + 126.0 * smoothness * smoothness;
    [intensity, intensity, intensity, power]
}

/// Separate vertex streams for one primitive plus its triangle list.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub texcoords: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    /// Index into [`ModelAsset::materials`].
    pub material: usize,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

#[derive(Debug, Clone)]
pub struct ModelAsset {
    pub meshes: Vec<MeshData>,
    pub materials: Vec<MaterialData>,
    /// Indexed like the glTF images; `None` for images no material samples.
    pub images: Vec<Option<ImageData>>,
}

impl ModelAsset {
    /// `--model` if given, then `default_path` when it exists, else a cube.
    pub fn load_or_cube(explicit: Option<&Path>, default_path: &Path) -> GfxResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        if default_path.is_file() {
            return Self::load(default_path);
        }
        info!("No model file, drawing a generated cube");
        Ok(Self::cube())
    }

    pub fn load(path: &Path) -> GfxResult<Self> {
        let (document, buffers, images) = gltf::import(path)
            .wrap_err_with(|| format!("failed to import glTF {}", path.display()))?;
        let model = Self::from_gltf(&document, &buffers, &images)?;
        info!(
            "Loaded {}: {} meshes, {} materials, {} images",
            path.display(),
            model.meshes.len(),
            model.materials.len(),
            model.images.len()
        );
        Ok(model)
    }

    fn from_gltf(
        document: &gltf::Document,
        buffers: &[gltf::buffer::Data],
        images: &[gltf::image::Data],
    ) -> GfxResult<Self> {
        let mut materials: Vec<MaterialData> =
            document.materials().map(|m| MaterialData::from_gltf(&m)).collect();
        let default_material = materials.len();
        let mut needs_default_material = false;

        let mut meshes = Vec::new();
        let mut visit = |node: gltf::Node<'_>, world: Mat4| -> GfxResult<()> {
            let Some(mesh) = node.mesh() else {
                return Ok(());
            };
            for primitive in mesh.primitives() {
                if primitive.mode() != Mode::Triangles {
                    warn!(
                        "Skipping primitive {} of mesh {:?}: {:?} is not supported",
                        primitive.index(),
                        mesh.name(),
                        primitive.mode()
                    );
                    continue;
                }
                let material = match primitive.material().index() {
                    Some(index) => index,
                    None => {
                        needs_default_material = true;
                        default_material
                    }
                };
                let reader = primitive.reader(|buffer| Some(buffers[buffer.index()].0.as_slice()));
                let Some(positions) = reader.read_positions() else {
                    bail!(
                        "primitive {} of mesh {:?} has no positions",
                        primitive.index(),
                        mesh.name()
                    );
                };
                let positions: Vec<[f32; 3]> = positions.collect();
                let normals = reader.read_normals().map(|n| n.collect());
                let texcoords = reader.read_tex_coords(0).map(|t| t.into_f32().collect());
                let indices = reader.read_indices().map(|i| i.into_u32().collect());
                let mesh_data =
                    build_mesh(positions, normals, texcoords, indices, material, world)?;
                debug!(
                    "Mesh {:?} primitive {}: {} vertices, {} indices",
                    mesh.name(),
                    primitive.index(),
                    mesh_data.vertex_count(),
                    mesh_data.indices.len()
                );
                meshes.push(mesh_data);
            }
            Ok(())
        };

        match document.default_scene().or_else(|| document.scenes().next()) {
            Some(scene) => {
                let mut stack: Vec<(gltf::Node<'_>, Mat4)> =
                    scene.nodes().map(|node| (node, Mat4::IDENTITY)).collect();
                while let Some((node, parent)) = stack.pop() {
                    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());
                    stack.extend(node.children().map(|child| (child, world)));
                    visit(node, world)?;
                }
            }
            None => {
                for node in document.nodes() {
                    visit(node, Mat4::IDENTITY)?;
                }
            }
        }

        if needs_default_material {
            materials.push(MaterialData::default());
        }
        if meshes.is_empty() {
            bail!("model has no triangle meshes");
        }

        // Only base colour textures are sampled; normal and occlusion maps stay undecoded.
        let images = images
            .iter()
            .enumerate()
            .map(|(index, image)| {
                if materials.iter().any(|material| material.image == Some(index)) {
                    image_to_rgba8(image)
                        .wrap_err_with(|| format!("glTF image {index}"))
                        .map(Some)
                } else {
                    Ok(None)
                }
            })
            .collect::<GfxResult<Vec<_>>>()?;

        Ok(Self {
            meshes,
            materials,
            images,
        })
    }

    /// Unit cube with outward normals and a placeholder texture.
    pub fn cube() -> Self {
        // (normal, u axis, v axis) with u x v == normal so the quads wind CCW.
        let faces: [(Vec3, Vec3, Vec3); 6] = [
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        ];
        let mut mesh = MeshData {
            positions: Vec::with_capacity(24),
            normals: Vec::with_capacity(24),
            texcoords: Vec::with_capacity(24),
            indices: Vec::with_capacity(36),
            material: 0,
        };
        for (normal, u, v) in faces {
            let base = mesh.positions.len() as u32;
            let corners = [
                (normal - u - v, [0.0, 1.0]),
                (normal + u - v, [1.0, 1.0]),
                (normal + u + v, [1.0, 0.0]),
                (normal - u + v, [0.0, 0.0]),
            ];
            for (position, texcoord) in corners {
                mesh.positions.push((position * 0.5).to_array());
                mesh.normals.push(normal.to_array());
                mesh.texcoords.push(texcoord);
            }
            mesh.indices
                .extend([base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        Self {
            meshes: vec![mesh],
            materials: vec![MaterialData {
                image: Some(0),
                ..MaterialData::default()
            }],
            images: vec![Some(ImageData::placeholder(256, 256))],
        }
    }

    /// Axis aligned bounds over every mesh.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        for position in self.meshes.iter().flat_map(|m| &m.positions) {
            let p = Vec3::from_array(*position);
            min = min.min(p);
            max = max.max(p);
        }
        if min.x > max.x {
            return (Vec3::ZERO, Vec3::ZERO);
        }
        (min, max)
    }

    /// Mesh indices with every opaque or masked mesh ahead of blended ones.
    pub fn draw_order(&self) -> Vec<usize> {
        let is_blend = |mesh: &MeshData| {
            self.materials
                .get(mesh.material)
                .is_some_and(|m| m.alpha_mode == AlphaMode::Blend)
        };
        let (mut order, blended): (Vec<usize>, Vec<usize>) =
            (0..self.meshes.len()).partition(|&i| !is_blend(&self.meshes[i]));
        order.extend(blended);
        order
    }

    /// Shader visible descriptors the renderer allocates for this model.
    /// Per-mesh constants are bound as root views and take none.
    pub fn descriptor_usage(&self) -> DescriptorUsage {
        let textures = self.images.iter().flatten().count() as u32;
        DescriptorUsage {
            // textures, the white fallback and the scene CBVs
            views: textures + 1 + BACK_BUFFER_COUNT as u32,
            samplers: self.materials.len() as u32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorUsage {
    pub views: u32,
    pub samplers: u32,
}

impl DescriptorUsage {
    pub fn check_fits(&self) -> GfxResult<()> {
        if self.views > CBV_SRV_UAV_HEAP_CAPACITY || self.samplers > SAMPLER_HEAP_CAPACITY {
            bail!(
                "model needs {} views and {} samplers, heaps hold {} and {}",
                self.views,
                self.samplers,
                CBV_SRV_UAV_HEAP_CAPACITY,
                SAMPLER_HEAP_CAPACITY
            );
        }
        Ok(())
    }
}

/// Fills missing streams with defaults and bakes `world` into the vertices.
fn build_mesh(
    positions: Vec<[f32; 3]>,
    normals: Option<Vec<[f32; 3]>>,
    texcoords: Option<Vec<[f32; 2]>>,
    indices: Option<Vec<u32>>,
    material: usize,
    world: Mat4,
) -> GfxResult<MeshData> {
    let count = positions.len();
    let normals = normals
        .filter(|n| n.len() == count)
        .unwrap_or_else(|| vec![DEFAULT_NORMAL; count]);
    let texcoords = texcoords
        .filter(|t| t.len() == count)
        .unwrap_or_else(|| vec![DEFAULT_TEXCOORD; count]);
    let mut indices = indices.unwrap_or_else(|| (0..count as u32).collect());
    if indices.len() % 3 != 0 {
        bail!("triangle list has {} indices", indices.len());
    }
    if let Some(bad) = indices.iter().find(|&&i| i as usize >= count) {
        bail!("index {bad} out of range for {count} vertices");
    }

    let normal_matrix = world.inverse().transpose();
    let positions = positions
        .into_iter()
        .map(|p| world.transform_point3(Vec3::from_array(p)).to_array())
        .collect();
    let normals = normals
        .into_iter()
        .map(|n| {
            normal_matrix
                .transform_vector3(Vec3::from_array(n))
                .normalize_or(Vec3::Y)
                .to_array()
        })
        .collect();
    // A mirroring transform flips the winding.
    if world.determinant() < 0.0 {
        for triangle in indices.chunks_exact_mut(3) {
            triangle.swap(1, 2);
        }
    }

    Ok(MeshData {
        positions,
        normals,
        texcoords,
        indices,
        material,
    })
}

fn image_to_rgba8(image: &gltf::image::Data) -> GfxResult<ImageData> {
    let pixel_count = (image.width * image.height) as usize;
    let pixels: Vec<u8> = match image.format {
        Format::R8G8B8A8 => image.pixels.clone(),
        Format::R8G8B8 => image
            .pixels
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        Format::R8G8 => image
            .pixels
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        Format::R8 => image.pixels.iter().flat_map(|&l| [l, l, l, 255]).collect(),
        Format::R16G16B16A16 => high_bytes(&image.pixels).collect(),
        Format::R16G16B16 => high_bytes(&image.pixels)
            .collect::<Vec<_>>()
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        Format::R16G16 => high_bytes(&image.pixels)
            .collect::<Vec<_>>()
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        Format::R16 => high_bytes(&image.pixels).flat_map(|l| [l, l, l, 255]).collect(),
        other => bail!("unsupported glTF image format {other:?}"),
    };
    if pixels.len() != pixel_count * 4 {
        bail!(
            "{}x{} image has {} bytes of RGBA data",
            image.width,
            image.height,
            pixels.len()
        );
    }
    Ok(ImageData {
        width: image.width,
        height: image.height,
        pixels,
    })
}

/// Native endian 16 bit samples reduced to their top 8 bits.
fn high_bytes(pixels: &[u8]) -> impl Iterator<Item = u8> + '_ {
    pixels
        .chunks_exact(2)
        .map(|sample| (u16::from_ne_bytes([sample[0], sample[1]]) >> 8) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Three `f32` positions then three `u32` indices.
    const TRIANGLE_BUFFER: &str =
        "AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAAAAAEAAAACAAAA";

    const TRIANGLE_GLTF: &str = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "mesh": 0, "translation": [2.0, 0.0, 0.0] }],
        "meshes": [{
            "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1, "material": 0 }]
        }],
        "materials": [{
            "alphaMode": "BLEND",
            "pbrMetallicRoughness": { "baseColorFactor": [1.0, 0.0, 0.0, 0.5] }
        }],
        "buffers": [{
            "byteLength": 48,
            "uri": "data:application/octet-stream;base64,TRIANGLE_BUFFER"
        }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 },
            { "buffer": 0, "byteOffset": 36, "byteLength": 12, "target": 34963 }
        ],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
              "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
            { "bufferView": 1, "componentType": 5125, "count": 3, "type": "SCALAR" }
        ]
    }"#;

    fn triangle_gltf() -> String {
        TRIANGLE_GLTF.replace("TRIANGLE_BUFFER", TRIANGLE_BUFFER)
    }

    fn triangle_normal(mesh: &MeshData, triangle: &[u32]) -> Vec3 {
        let [a, b, c] = [0, 1, 2].map(|i| Vec3::from_array(mesh.positions[triangle[i] as usize]));
        (b - a).cross(c - a)
    }

    #[test]
    fn cube_faces_wind_counter_clockwise_outward() {
        let cube = ModelAsset::cube();
        let mesh = &cube.meshes[0];
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.indices.len(), 36);
        for triangle in mesh.indices.chunks_exact(3) {
            let outward = Vec3::from_array(mesh.normals[triangle[0] as usize]);
            assert!(triangle_normal(mesh, triangle).dot(outward) > 0.0);
        }
        assert_eq!(cube.bounds(), (Vec3::splat(-0.5), Vec3::splat(0.5)));
        assert_eq!(cube.materials[0].image, Some(0));
    }

    #[test]
    fn missing_streams_get_defaults() {
        let mesh = build_mesh(
            vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            None,
            None,
            None,
            0,
            Mat4::IDENTITY,
        )
        .unwrap();
        assert_eq!(mesh.normals, vec![DEFAULT_NORMAL; 3]);
        assert_eq!(mesh.texcoords, vec![DEFAULT_TEXCOORD; 3]);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
    }

    #[test]
    fn out_of_range_indices_are_rejected() {
        let result = build_mesh(
            vec![[0.0; 3]; 3],
            None,
            None,
            Some(vec![0, 1, 3]),
            0,
            Mat4::IDENTITY,
        );
        assert!(result.is_err());
    }

    #[test]
    fn mirrored_transform_keeps_front_faces() {
        let positions = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let plain = build_mesh(positions.clone(), None, None, None, 0, Mat4::IDENTITY).unwrap();
        let mirror = Mat4::from_scale(Vec3::new(-1.0, 1.0, 1.0));
        let mirrored = build_mesh(positions, None, None, None, 0, mirror).unwrap();
        assert_eq!(mirrored.indices, vec![0, 2, 1]);
        let before = triangle_normal(&plain, &plain.indices);
        let after = triangle_normal(&mirrored, &mirrored.indices);
        assert!(before.z > 0.0 && after.z > 0.0);
    }

    #[test]
    fn blended_meshes_draw_last() {
        let mut model = ModelAsset::cube();
        model.materials.push(MaterialData {
            alpha_mode: AlphaMode::Blend,
            ..MaterialData::default()
        });
        model.materials.push(MaterialData {
            alpha_mode: AlphaMode::Mask,
            ..MaterialData::default()
        });
        let base = model.meshes[0].clone();
        model.meshes = vec![
            MeshData { material: 1, ..base.clone() },
            MeshData { material: 0, ..base.clone() },
            MeshData { material: 2, ..base },
        ];
        assert_eq!(model.draw_order(), vec![1, 2, 0]);
        assert_eq!(AlphaMode::Mask.shader_mode(), 1);
    }

    #[test]
    fn rougher_surfaces_have_dimmer_wider_highlights() {
        let smooth = specular_from_roughness(0.0);
        let rough = specular_from_roughness(1.0);
        assert!(smooth[0] > rough[0]);
        assert!(smooth[3] > rough[3]);
        assert_eq!(rough[3], 2.0);
    }

    #[test]
    fn imports_gltf_with_node_transform_and_material() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("triangle.gltf");
        std::fs::write(&path, triangle_gltf()).unwrap();

        let model = ModelAsset::load(&path).unwrap();
        assert_eq!(model.meshes.len(), 1);
        let mesh = &model.meshes[0];
        assert_eq!(mesh.positions[1], [3.0, 0.0, 0.0]);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.normals, vec![DEFAULT_NORMAL; 3]);
        assert_eq!(model.materials[mesh.material].alpha_mode, AlphaMode::Blend);
        assert_eq!(model.materials[mesh.material].diffuse, [1.0, 0.0, 0.0, 0.5]);
        assert!(model.images.is_empty());
    }

    #[test]
    fn falls_back_to_cube_without_a_model_file() {
        let dir = tempfile::tempdir().unwrap();
        let model = ModelAsset::load_or_cube(None, &dir.path().join("model.glb")).unwrap();
        assert_eq!(model.meshes[0].vertex_count(), 24);
        let missing = dir.path().join("missing.glb");
        assert!(ModelAsset::load_or_cube(Some(&missing), Path::new("")).is_err());
    }

    #[test]
    fn expands_rgb_images() {
        let image = gltf::image::Data {
            pixels: vec![10, 20, 30, 40, 50, 60],
            format: Format::R8G8B8,
            width: 2,
            height: 1,
        };
        let rgba = image_to_rgba8(&image).unwrap();
        assert_eq!(rgba.pixels, vec![10, 20, 30, 255, 40, 50, 60, 255]);
    }

    #[test]
    fn mesh_count_does_not_consume_descriptors() {
        let cube = ModelAsset::cube();
        let mut large = cube.clone();
        large.meshes = vec![cube.meshes[0].clone(); 5000];

        let usage = large.descriptor_usage();
        assert_eq!(usage, cube.descriptor_usage());
        assert_eq!(usage.views, 1 + 1 + BACK_BUFFER_COUNT as u32);
        assert_eq!(usage.samplers, 1);
        assert!(usage.check_fits().is_ok());

        large.materials = vec![MaterialData::default(); SAMPLER_HEAP_CAPACITY as usize + 1];
        assert!(large.descriptor_usage().check_fits().is_err());
    }

    #[test]
    fn narrows_sixteen_bit_images() {
        let samples: [u16; 8] = [0x1234, 0xff00, 0x0080, 0xabcd, 0, 0x7fff, 0x8000, 0xffff];
        let image = gltf::image::Data {
            pixels: samples.iter().flat_map(|s| s.to_ne_bytes()).collect(),
            format: Format::R16G16B16A16,
            width: 2,
            height: 1,
        };
        let rgba = image_to_rgba8(&image).unwrap();
        assert_eq!(rgba.pixels, vec![0x12, 0xff, 0x00, 0xab, 0x00, 0x7f, 0x80, 0xff]);

        let grey = gltf::image::Data {
            pixels: 0x4000u16.to_ne_bytes().to_vec(),
            format: Format::R16,
            width: 1,
            height: 1,
        };
        assert_eq!(image_to_rgba8(&grey).unwrap().pixels, vec![0x40, 0x40, 0x40, 255]);
    }

    #[test]
    fn decodes_only_base_color_images() {
        let textured = triangle_gltf().replace(
            r#""baseColorFactor": [1.0, 0.0, 0.0, 0.5] }"#,
            r#""baseColorFactor": [1.0, 0.0, 0.0, 0.5], "baseColorTexture": { "index": 0 } },
            "normalTexture": { "index": 1 }"#,
        );
        let textured = textured.replace(
            r#""buffers": ["#,
            r#""images": [{ "uri": "normal.png" }, { "uri": "albedo.png" }],
        "textures": [{ "source": 1 }, { "source": 0 }],
        "buffers": ["#,
        );
        let document = gltf::Gltf::from_slice(textured.as_bytes()).unwrap().document;
        let buffers = gltf::import_buffers(&document, None, None).unwrap();
        // A float normal map would fail to convert if it were decoded.
        let images = [
            gltf::image::Data {
                pixels: vec![0; 12],
                format: Format::R32G32B32FLOAT,
                width: 1,
                height: 1,
            },
            gltf::image::Data {
                pixels: [0xffffu16; 4].iter().flat_map(|s| s.to_ne_bytes()).collect(),
                format: Format::R16G16B16A16,
                width: 1,
                height: 1,
            },
        ];

        let model = ModelAsset::from_gltf(&document, &buffers, &images).unwrap();
        assert_eq!(model.materials[0].image, Some(1));
        assert!(model.images[0].is_none());
        assert_eq!(model.images[1].as_ref().unwrap().pixels, vec![255; 4]);
    }
}
