//! Source map fixtures written to temporary directories.

use std::path::{Path, PathBuf};

use ormtool_pack::{write_grayscale, GrayscaleImage, PackRequest, PngConfig};

/// Write a grayscale PNG named `name` under `dir`.
pub fn write_map(dir: &Path, name: &str, width: u32, height: u32, data: Vec<u8>) -> PathBuf {
    let path = dir.join(name);
    let img = GrayscaleImage::new(width, height, data).expect("fixture buffer size");
    write_grayscale(&img, &path, &PngConfig::fast()).expect("Failed to write fixture map");
    path
}

/// Row-major ramp `(x * 7 + y * 13 + seed) mod 256`.
pub fn ramp(width: u32, height: u32, seed: u8) -> Vec<u8> {
    let mut data = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height {
        for x in 0..width {
            data.push((x.wrapping_mul(7) + y.wrapping_mul(13) + seed as u32) as u8);
        }
    }
    data
}

/// Paths of one AO/roughness/metallic set on disk.
#[derive(Debug, Clone)]
pub struct SourceSet {
    pub ao: PathBuf,
    pub roughness: PathBuf,
    pub metallic: PathBuf,
}

impl SourceSet {
    /// The 2x2 set used throughout the docs:
    /// AO `[10,20,30,40]`, roughness `[1,2,3,4]`, metallic `[200,210,220,230]`.
    pub fn scenario_2x2(dir: &Path) -> Self {
        Self {
            ao: write_map(dir, "ao.png", 2, 2, vec![10, 20, 30, 40]),
            roughness: write_map(dir, "roughness.png", 2, 2, vec![1, 2, 3, 4]),
            metallic: write_map(dir, "metallic.png", 2, 2, vec![200, 210, 220, 230]),
        }
    }

    /// Three distinct ramps of the same size.
    pub fn ramps(dir: &Path, width: u32, height: u32) -> Self {
        Self {
            ao: write_map(dir, "ao.png", width, height, ramp(width, height, 0)),
            roughness: write_map(dir, "roughness.png", width, height, ramp(width, height, 85)),
            metallic: write_map(dir, "metallic.png", width, height, ramp(width, height, 170)),
        }
    }

    /// Same as [`SourceSet::ramps`] but the roughness map has other dimensions.
    pub fn mismatched(dir: &Path) -> Self {
        Self {
            ao: write_map(dir, "ao.png", 8, 8, ramp(8, 8, 0)),
            roughness: write_map(dir, "roughness.png", 4, 4, ramp(4, 4, 1)),
            metallic: write_map(dir, "metallic.png", 8, 8, ramp(8, 8, 2)),
        }
    }

    /// Request for this set with both outputs under `out_dir`.
    pub fn request(&self, out_dir: &Path) -> PackRequest {
        PackRequest::new(&self.ao, &self.roughness, &self.metallic)
            .with_unreal(out_dir.join("orm_unreal.png"))
            .with_unity(out_dir.join("orm_unity.png"))
    }
}
