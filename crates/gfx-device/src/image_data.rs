use std::path::Path;

use eyre::WrapErr;
use image::RgbaImage;
use image::imageops::FilterType;
use tracing::debug;
use tracing::warn;

use crate::gfx_error::GfxResult;

/// Tightly packed RGBA8 pixels ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl ImageData {
    pub const BYTES_PER_PIXEL: u32 = 4;

    pub fn load(path: &Path) -> GfxResult<Self> {
        let image = image::open(path)
            .wrap_err_with(|| format!("failed to decode image {}", path.display()))?;
        let image = image.to_rgba8();
        debug!(
            "Loaded {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        Ok(Self::from(image))
    }

    /// Loads `path`, or builds a `width` x `height` placeholder when the file
    /// does not exist. Decode errors of an existing file are still errors.
    pub fn load_or_placeholder(path: &Path, width: u32, height: u32) -> GfxResult<Self> {
        if path.is_file() {
            return Self::load(path);
        }
        warn!(
            "{} not found, using a {width}x{height} placeholder",
            path.display()
        );
        Ok(Self::placeholder(width, height))
    }

    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self::from(RgbaImage::from_pixel(width, height, image::Rgba(rgba)))
    }

    /// Colour wheel over a checkerboard, used when a demo image is missing.
    pub fn placeholder(width: u32, height: u32) -> Self {
        let image = RgbaImage::from_fn(width, height, |x, y| {
            let u = x as f32 / width.max(1) as f32;
            let v = y as f32 / height.max(1) as f32;
            let checker = ((x / 32) + (y / 32)) % 2 == 0;
            let shade = if checker { 1.0 } else { 0.8 };
            let r = (u * 255.0 * shade) as u8;
            let g = (v * 255.0 * shade) as u8;
            let b = ((1.0 - u) * 255.0 * shade) as u8;
            image::Rgba([r, g, b, 255])
        });
        Self::from(image)
    }

    pub fn row_bytes(&self) -> usize {
        (self.width * Self::BYTES_PER_PIXEL) as usize
    }

    /// Copies rows into `dst` where each row starts `row_pitch` bytes after
    /// the previous one.
    pub fn write_pitched(&self, dst: &mut [u8], row_pitch: usize) {
        let row_bytes = self.row_bytes();
        debug_assert!(row_pitch >= row_bytes);
        let last_row = (self.height as usize).saturating_sub(1);
        debug_assert!(dst.len() >= row_pitch * last_row + row_bytes);
        for (y, row) in self.pixels.chunks_exact(row_bytes).enumerate() {
            let start = y * row_pitch;
            dst[start..start + row_bytes].copy_from_slice(row);
        }
    }

    /// Full mip chain starting with a copy of `self`.
    pub fn mip_chain(&self) -> Vec<ImageData> {
        let levels = mip_level_count(self.width, self.height);
        let mut chain = Vec::with_capacity(levels as usize);
        chain.push(self.clone());
        let Some(base) = RgbaImage::from_raw(self.width, self.height, self.pixels.clone()) else {
            return chain;
        };
        let (mut width, mut height) = (self.width, self.height);
        for _ in 1..levels {
            width = (width / 2).max(1);
            height = (height / 2).max(1);
            let level = image::imageops::resize(&base, width, height, FilterType::Triangle);
            chain.push(Self::from(level));
        }
        chain
    }
}

impl From<RgbaImage> for ImageData {
    fn from(image: RgbaImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            pixels: image.into_raw(),
        }
    }
}

pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mip_counts() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(256, 256), 9);
        assert_eq!(mip_level_count(640, 480), 10);
        assert_eq!(mip_level_count(1, 300), 9);
    }

    #[test]
    fn mip_chain_halves_down_to_one_pixel() {
        let image = ImageData::placeholder(64, 16);
        let chain = image.mip_chain();
        let sizes: Vec<_> = chain.iter().map(|m| (m.width, m.height)).collect();
        assert_eq!(
            sizes,
            vec![(64, 16), (32, 8), (16, 4), (8, 2), (4, 1), (2, 1), (1, 1)]
        );
        for level in &chain {
            assert_eq!(level.pixels.len(), (level.width * level.height * 4) as usize);
        }
    }

    #[test]
    fn pitched_rows_leave_padding_untouched() {
        let image = ImageData::solid(3, 2, [1, 2, 3, 4]);
        let mut dst = vec![0xAA; 256 + 12];
        image.write_pitched(&mut dst, 256);
        assert_eq!(&dst[..12], &[1, 2, 3, 4, 1, 2, 3, 4, 1, 2, 3, 4]);
        assert!(dst[12..256].iter().all(|&b| b == 0xAA));
        assert_eq!(&dst[256..260], &[1, 2, 3, 4]);
    }

    #[test]
    fn missing_file_falls_back_to_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let image = ImageData::load_or_placeholder(&dir.path().join("image.png"), 32, 16).unwrap();
        assert_eq!((image.width, image.height), (32, 16));

        let png = dir.path().join("solid.png");
        RgbaImage::from_pixel(2, 2, image::Rgba([10, 20, 30, 255])).save(&png).unwrap();
        let decoded = ImageData::load_or_placeholder(&png, 32, 16).unwrap();
        assert_eq!((decoded.width, decoded.height), (2, 2));
        assert_eq!(&decoded.pixels[..4], &[10, 20, 30, 255]);

        let broken = dir.path().join("broken.png");
        std::fs::write(&broken, b"not a png").unwrap();
        assert!(ImageData::load_or_placeholder(&broken, 32, 16).is_err());
    }

    #[test]
    fn placeholder_is_opaque() {
        let image = ImageData::placeholder(16, 8);
        assert!(image.pixels.chunks_exact(4).all(|px| px[3] == 255));
    }
}
