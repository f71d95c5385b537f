//! 8-bit texture buffers.
//!
//! - `GrayscaleImage`: one byte per pixel, used for the AO, roughness and
//!   metallic sources and for per-channel previews.
//! - `PackedImage`: interleaved 3- or 4-channel bytes produced by a layout.

use std::path::Path;

use thiserror::Error;

use crate::png::PngError;

/// Errors from loading, encoding, or constructing texture buffers.
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    #[error(transparent)]
    Png(#[from] PngError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid buffer: {0}")]
    InvalidBuffer(String),
}

/// Single-channel 8-bit image, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayscaleImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl GrayscaleImage {
    /// Wrap raw luma bytes. `data.len()` must equal `width * height`.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, TextureError> {
        let expected = pixel_count(width, height);
        if data.len() != expected {
            return Err(TextureError::InvalidBuffer(format!(
                "Expected {} bytes for {}x{} grayscale, got {}",
                expected,
                width,
                height,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Plane split out of a packed buffer of the same dimensions.
    pub(crate) fn from_plane(width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), pixel_count(width, height));
        Self {
            width,
            height,
            data,
        }
    }

    /// Create an image filled with a single value.
    pub fn filled(width: u32, height: u32, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; pixel_count(width, height)],
        }
    }

    /// Decode any supported format from disk and convert to 8-bit luma.
    pub fn load(path: &Path) -> Result<Self, TextureError> {
        let img = image::open(path)
            .map_err(|source| TextureError::Decode {
                path: path.display().to_string(),
                source,
            })?
            .into_luma8();
        let (width, height) = img.dimensions();
        Ok(Self {
            width,
            height,
            data: img.into_raw(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)` pair, handy for comparisons.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of pixels.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw luma bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Pixel value by linear index.
    #[inline]
    pub fn at(&self, index: usize) -> u8 {
        self.data[index]
    }
}

/// Interleaved multi-channel 8-bit image, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedImage {
    width: u32,
    height: u32,
    channels: u8,
    data: Vec<u8>,
}

impl PackedImage {
    /// Wrap interleaved bytes. `data.len()` must equal `width * height * channels`.
    pub fn new(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Result<Self, TextureError> {
        if !(1..=4).contains(&channels) {
            return Err(TextureError::InvalidBuffer(format!(
                "Unsupported channel count {}",
                channels
            )));
        }
        let expected = pixel_count(width, height) * channels as usize;
        if data.len() != expected {
            return Err(TextureError::InvalidBuffer(format!(
                "Expected {} bytes for {}x{}x{}, got {}",
                expected,
                width,
                height,
                channels,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Zeroed buffer for `channels` interleaved channels.
    pub(crate) fn zeroed(width: u32, height: u32, channels: u8) -> Self {
        Self {
            width,
            height,
            channels,
            data: vec![0; pixel_count(width, height) * channels as usize],
        }
    }

    /// Decode a file as 8-bit RGB.
    pub fn load_rgb(path: &Path) -> Result<Self, TextureError> {
        let img = image::open(path)
            .map_err(|source| TextureError::Decode {
                path: path.display().to_string(),
                source,
            })?
            .into_rgb8();
        let (width, height) = img.dimensions();
        Ok(Self {
            width,
            height,
            channels: 3,
            data: img.into_raw(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width as usize * self.channels as usize
    }

    pub fn pixel_count(&self) -> usize {
        pixel_count(self.width, self.height)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Channel values of one pixel.
    pub fn pixel(&self, index: usize) -> &[u8] {
        let c = self.channels as usize;
        &self.data[index * c..index * c + c]
    }

    /// Drop the alpha channel of an RGBA buffer. Other channel counts are cloned.
    pub fn to_rgb(&self) -> PackedImage {
        if self.channels != 4 {
            return self.clone();
        }
        let mut data = Vec::with_capacity(self.pixel_count() * 3);
        for px in self.data.chunks_exact(4) {
            data.extend_from_slice(&px[..3]);
        }
        Self {
            width: self.width,
            height: self.height,
            channels: 3,
            data,
        }
    }
}

/// Preset square resolutions offered by the texture pickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Resolution {
    R128,
    R256,
    R512,
    R1024,
    R2048,
    R4096,
}

impl Resolution {
    pub const ALL: [Resolution; 6] = [
        Resolution::R128,
        Resolution::R256,
        Resolution::R512,
        Resolution::R1024,
        Resolution::R2048,
        Resolution::R4096,
    ];

    pub fn pixels(self) -> u32 {
        match self {
            Resolution::R128 => 128,
            Resolution::R256 => 256,
            Resolution::R512 => 512,
            Resolution::R1024 => 1024,
            Resolution::R2048 => 2048,
            Resolution::R4096 => 4096,
        }
    }

    /// Preset whose size matches `width` exactly.
    pub fn from_width(width: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.pixels() == width)
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.pixels())
    }
}

#[inline]
fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grayscale_rejects_wrong_length() {
        let err = GrayscaleImage::new(2, 2, vec![0; 3]).unwrap_err();
        assert!(err.to_string().contains("Expected 4 bytes"));
    }

    #[test]
    fn test_packed_rejects_wrong_length() {
        assert!(PackedImage::new(2, 2, 3, vec![0; 11]).is_err());
        assert!(PackedImage::new(2, 2, 3, vec![0; 12]).is_ok());
    }

    #[test]
    fn test_packed_rejects_bad_channel_count() {
        assert!(PackedImage::new(1, 1, 5, vec![0; 5]).is_err());
        assert!(PackedImage::new(1, 1, 0, vec![]).is_err());
    }

    #[test]
    fn test_packed_stride_and_pixel() {
        let img = PackedImage::new(2, 1, 4, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        assert_eq!(img.stride(), 8);
        assert_eq!(img.pixel(1), &[5, 6, 7, 8]);
    }

    #[test]
    fn test_to_rgb_strips_alpha() {
        let img = PackedImage::new(2, 1, 4, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        let rgb = img.to_rgb();
        assert_eq!(rgb.channels(), 3);
        assert_eq!(rgb.as_bytes(), &[1, 2, 3, 5, 6, 7]);
    }

    #[test]
    fn test_load_missing_file() {
        let err = GrayscaleImage::load(Path::new("definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, TextureError::Decode { .. }));
    }

    #[test]
    fn test_resolution_from_width() {
        assert_eq!(Resolution::from_width(512), Some(Resolution::R512));
        assert_eq!(Resolution::from_width(4096), Some(Resolution::R4096));
        assert_eq!(Resolution::from_width(300), None);
        assert_eq!(Resolution::R1024.to_string(), "1024");
    }
}
