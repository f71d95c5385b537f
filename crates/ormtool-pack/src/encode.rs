//! Writing packed and grayscale buffers to disk.
//!
//! The format follows the destination extension. PNG goes through the
//! deterministic writer in [`crate::png`]; TGA, BMP and JPEG are handed to the
//! `image` crate.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat};

use crate::png::{color_type_for, write_raw, PngConfig};
use crate::texture::{GrayscaleImage, PackedImage, TextureError};

/// JPEG quality used for `.jpg`/`.jpeg` destinations.
pub const JPEG_QUALITY: u8 = 90;

/// On-disk format of an output texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Tga,
    Bmp,
    Jpeg,
}

impl OutputFormat {
    /// Pick a format from the path extension; anything unrecognised is PNG.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("tga") => OutputFormat::Tga,
            Some("bmp") => OutputFormat::Bmp,
            Some("jpg") | Some("jpeg") => OutputFormat::Jpeg,
            _ => OutputFormat::Png,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Tga => "tga",
            OutputFormat::Bmp => "bmp",
            OutputFormat::Jpeg => "jpeg",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Write a packed buffer to `path` in the format implied by its extension.
pub fn write_packed(image: &PackedImage, path: &Path, config: &PngConfig) -> Result<(), TextureError> {
    write_bytes(
        image.as_bytes(),
        image.width(),
        image.height(),
        image.channels(),
        path,
        config,
    )
}

/// Write a grayscale buffer to `path` in the format implied by its extension.
pub fn write_grayscale(
    image: &GrayscaleImage,
    path: &Path,
    config: &PngConfig,
) -> Result<(), TextureError> {
    write_bytes(
        image.as_bytes(),
        image.width(),
        image.height(),
        1,
        path,
        config,
    )
}

fn write_bytes(
    data: &[u8],
    width: u32,
    height: u32,
    channels: u8,
    path: &Path,
    config: &PngConfig,
) -> Result<(), TextureError> {
    ensure_parent_dir(path)?;

    match OutputFormat::from_path(path) {
        OutputFormat::Png => {
            let color_type = color_type_for(channels)?;
            write_raw(data, width, height, color_type, path, config)?;
        }
        OutputFormat::Tga => {
            image::save_buffer_with_format(
                path,
                data,
                width,
                height,
                extended_color_type(channels)?,
                ImageFormat::Tga,
            )?;
        }
        OutputFormat::Bmp => {
            image::save_buffer_with_format(
                path,
                data,
                width,
                height,
                extended_color_type(channels)?,
                ImageFormat::Bmp,
            )?;
        }
        OutputFormat::Jpeg => write_jpeg(data, width, height, channels, path)?,
    }

    Ok(())
}

/// JPEG has no alpha; RGBA input keeps its RGB part.
fn write_jpeg(
    data: &[u8],
    width: u32,
    height: u32,
    channels: u8,
    path: &Path,
) -> Result<(), TextureError> {
    let rgb;
    let (bytes, color) = match channels {
        4 => {
            rgb = data
                .chunks_exact(4)
                .flat_map(|px| px[..3].iter().copied())
                .collect::<Vec<u8>>();
            (rgb.as_slice(), ExtendedColorType::Rgb8)
        }
        n => (data, extended_color_type(n)?),
    };

    let file = fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY).write_image(bytes, width, height, color)?;
    writer.flush()?;
    Ok(())
}

fn extended_color_type(channels: u8) -> Result<ExtendedColorType, TextureError> {
    match channels {
        1 => Ok(ExtendedColorType::L8),
        2 => Ok(ExtendedColorType::La8),
        3 => Ok(ExtendedColorType::Rgb8),
        4 => Ok(ExtendedColorType::Rgba8),
        n => Err(TextureError::InvalidBuffer(format!(
            "Unsupported channel count {}",
            n
        ))),
    }
}

fn ensure_parent_dir(path: &Path) -> Result<(), TextureError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("a.png")), OutputFormat::Png);
        assert_eq!(OutputFormat::from_path(Path::new("a.TGA")), OutputFormat::Tga);
        assert_eq!(OutputFormat::from_path(Path::new("a.bmp")), OutputFormat::Bmp);
        assert_eq!(OutputFormat::from_path(Path::new("a.jpeg")), OutputFormat::Jpeg);
        assert_eq!(OutputFormat::from_path(Path::new("a.JPG")), OutputFormat::Jpeg);
        assert_eq!(OutputFormat::from_path(Path::new("noext")), OutputFormat::Png);
        assert_eq!(OutputFormat::from_path(Path::new("a.webp")), OutputFormat::Png);
    }

    #[test]
    fn test_write_packed_png_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/out/orm.png");
        let img = PackedImage::new(2, 1, 3, vec![1, 2, 3, 4, 5, 6]).unwrap();

        write_packed(&img, &path, &PngConfig::default()).unwrap();

        let decoded = image::open(&path).unwrap().into_rgb8();
        assert_eq!(decoded.as_raw(), &vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_write_rgba_tga_roundtrips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("orm.tga");
        let img = PackedImage::new(1, 2, 4, vec![9, 8, 7, 6, 5, 4, 3, 2]).unwrap();

        write_packed(&img, &path, &PngConfig::default()).unwrap();

        let decoded = image::open(&path).unwrap().into_rgba8();
        assert_eq!(decoded.as_raw(), &vec![9, 8, 7, 6, 5, 4, 3, 2]);
    }

    #[test]
    fn test_write_rgba_jpeg_drops_alpha() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("orm.jpg");
        let img = PackedImage::new(8, 8, 4, vec![200; 8 * 8 * 4]).unwrap();

        write_packed(&img, &path, &PngConfig::default()).unwrap();

        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.width(), 8);
        assert!(!decoded.color().has_alpha());
    }

    #[test]
    fn test_write_grayscale_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ao.png");
        let img = GrayscaleImage::new(2, 2, vec![0, 64, 128, 255]).unwrap();

        write_grayscale(&img, &path, &PngConfig::default()).unwrap();

        let decoded = image::open(&path).unwrap().into_luma8();
        assert_eq!(decoded.as_raw(), &vec![0, 64, 128, 255]);
    }
}
