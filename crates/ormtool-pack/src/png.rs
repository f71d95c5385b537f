//! Deterministic PNG writer.
//!
//! Uses fixed compression settings so that packing the same sources twice
//! produces byte-identical files.

use std::io::Write;
use std::path::Path;

use png::{BitDepth, ColorType, Compression, Encoder, FilterType};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from PNG operations.
#[derive(Debug, Error)]
pub enum PngError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PNG encoding error: {0}")]
    Encoding(#[from] png::EncodingError),

    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),
}

/// Named compression preset, as stored in settings files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PngPreset {
    #[default]
    Default,
    Fast,
    Best,
}

/// PNG export configuration for deterministic output.
#[derive(Debug, Clone)]
pub struct PngConfig {
    /// Compression level. Use a fixed value for determinism.
    pub compression: Compression,
    /// Filter type. Use a fixed value for determinism.
    pub filter: FilterType,
}

impl Default for PngConfig {
    fn default() -> Self {
        Self {
            compression: Compression::Default,
            filter: FilterType::NoFilter,
        }
    }
}

impl PngConfig {
    /// Smallest files, slowest encode.
    pub fn best_compression() -> Self {
        Self {
            compression: Compression::Best,
            filter: FilterType::Paeth,
        }
    }

    /// Fastest encode, larger files.
    pub fn fast() -> Self {
        Self {
            compression: Compression::Fast,
            filter: FilterType::NoFilter,
        }
    }
}

impl From<PngPreset> for PngConfig {
    fn from(preset: PngPreset) -> Self {
        match preset {
            PngPreset::Default => PngConfig::default(),
            PngPreset::Fast => PngConfig::fast(),
            PngPreset::Best => PngConfig::best_compression(),
        }
    }
}

/// PNG color type for an 8-bit buffer with `channels` interleaved channels.
pub fn color_type_for(channels: u8) -> Result<ColorType, PngError> {
    match channels {
        1 => Ok(ColorType::Grayscale),
        2 => Ok(ColorType::GrayscaleAlpha),
        3 => Ok(ColorType::Rgb),
        4 => Ok(ColorType::Rgba),
        n => Err(PngError::InvalidDimensions(format!(
            "Unsupported channel count {}",
            n
        ))),
    }
}

/// Write raw 8-bit bytes to a PNG file.
pub fn write_raw(
    data: &[u8],
    width: u32,
    height: u32,
    color_type: ColorType,
    path: &Path,
    config: &PngConfig,
) -> Result<(), PngError> {
    check_len(data, width, height, color_type)?;

    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);

    write_raw_to_writer(data, width, height, color_type, &mut writer, config)?;
    writer.flush()?;
    Ok(())
}

/// Write raw 8-bit bytes as PNG to any writer.
///
/// The stream is complete when this returns; flushing `writer` is up to the caller.
pub fn write_raw_to_writer<W: Write>(
    data: &[u8],
    width: u32,
    height: u32,
    color_type: ColorType,
    writer: W,
    config: &PngConfig,
) -> Result<(), PngError> {
    check_len(data, width, height, color_type)?;

    let mut encoder = Encoder::new(writer, width, height);
    encoder.set_color(color_type);
    encoder.set_depth(BitDepth::Eight);
    encoder.set_compression(config.compression);
    encoder.set_filter(config.filter);

    // The png crate doesn't add timestamps by default
    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(data)?;
    png_writer.finish()?;

    Ok(())
}

fn check_len(data: &[u8], width: u32, height: u32, color_type: ColorType) -> Result<(), PngError> {
    let pixels = width as usize * height as usize;
    let expected = match color_type {
        ColorType::Grayscale => pixels,
        ColorType::GrayscaleAlpha => pixels * 2,
        ColorType::Rgb => pixels * 3,
        ColorType::Rgba => pixels * 4,
        ColorType::Indexed => {
            return Err(PngError::InvalidDimensions(
                "Indexed color not supported".into(),
            ))
        }
    };

    if data.len() != expected {
        return Err(PngError::InvalidDimensions(format!(
            "Expected {} bytes for {}x{} {:?}, got {}",
            expected,
            width,
            height,
            color_type,
            data.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_rgb(width: u32, height: u32) -> Vec<u8> {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&[(x * 4) as u8, (y * 4) as u8, 128]);
            }
        }
        data
    }

    fn encode(data: &[u8], width: u32, height: u32, color_type: ColorType) -> Result<Vec<u8>, PngError> {
        let mut out = Vec::new();
        write_raw_to_writer(data, width, height, color_type, &mut out, &PngConfig::default())?;
        Ok(out)
    }

    #[test]
    fn test_rgb_deterministic() {
        let data = gradient_rgb(64, 64);
        let png1 = encode(&data, 64, 64, ColorType::Rgb).unwrap();
        let png2 = encode(&data, 64, 64, ColorType::Rgb).unwrap();
        assert_eq!(png1, png2, "PNG data should be identical");
    }

    #[test]
    fn test_stream_ends_with_iend() {
        let png = encode(&gradient_rgb(2, 2), 2, 2, ColorType::Rgb).unwrap();
        assert_eq!(&png[png.len() - 8..png.len() - 4], b"IEND");
    }

    #[test]
    fn test_rejects_short_buffer() {
        let result = encode(&[0; 10], 2, 2, ColorType::Rgba);
        assert!(matches!(result, Err(PngError::InvalidDimensions(_))));
    }

    #[test]
    fn test_indexed_not_supported() {
        assert!(encode(&[0; 4], 2, 2, ColorType::Indexed).is_err());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_full_device_is_io_error() {
        let result = write_raw(
            &gradient_rgb(2, 2),
            2,
            2,
            ColorType::Rgb,
            Path::new("/dev/full"),
            &PngConfig::default(),
        );
        assert!(matches!(result, Err(PngError::Io(_))), "{:?}", result);
    }

    #[test]
    fn test_color_type_for_channels() {
        assert_eq!(color_type_for(1).unwrap(), ColorType::Grayscale);
        assert_eq!(color_type_for(3).unwrap(), ColorType::Rgb);
        assert_eq!(color_type_for(4).unwrap(), ColorType::Rgba);
        assert!(color_type_for(5).is_err());
    }

    #[test]
    fn test_preset_maps_to_config() {
        let best: PngConfig = PngPreset::Best.into();
        assert!(matches!(best.compression, Compression::Best));
        assert!(matches!(best.filter, FilterType::Paeth));

        let default: PngConfig = PngPreset::default().into();
        assert!(matches!(default.compression, Compression::Default));
    }
}
