//! Per-channel inspection of packed results.
//!
//! De-interleaving is the exact inverse of the Unreal interleave:
//! `channel[k][i] = packed[3 * i + k]`.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::encode::{write_grayscale, write_packed};
use crate::layout::SourceMap;
use crate::png::PngConfig;
use crate::texture::{GrayscaleImage, PackedImage, TextureError};

/// Which part of a packed RGB texture to look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelView {
    #[default]
    All,
    Ao,
    Roughness,
    Metallic,
}

impl ChannelView {
    pub const ALL: [ChannelView; 4] = [
        ChannelView::All,
        ChannelView::Ao,
        ChannelView::Roughness,
        ChannelView::Metallic,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ChannelView::All => "All (RGB)",
            ChannelView::Ao => "AO (R)",
            ChannelView::Roughness => "Roughness (G)",
            ChannelView::Metallic => "Metallic (B)",
        }
    }

    /// Source map shown by this view, `None` for the full RGB view.
    pub fn source_map(&self) -> Option<SourceMap> {
        match self {
            ChannelView::All => None,
            ChannelView::Ao => Some(SourceMap::Ao),
            ChannelView::Roughness => Some(SourceMap::Roughness),
            ChannelView::Metallic => Some(SourceMap::Metallic),
        }
    }

    fn channel_index(&self) -> Option<usize> {
        match self {
            ChannelView::All => None,
            ChannelView::Ao => Some(0),
            ChannelView::Roughness => Some(1),
            ChannelView::Metallic => Some(2),
        }
    }
}

impl fmt::Display for ChannelView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ChannelView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" | "rgb" => Ok(ChannelView::All),
            "ao" | "r" => Ok(ChannelView::Ao),
            "roughness" | "g" => Ok(ChannelView::Roughness),
            "metallic" | "b" => Ok(ChannelView::Metallic),
            other => Err(format!(
                "unknown channel '{}' (expected all, ao, roughness or metallic)",
                other
            )),
        }
    }
}

/// Split an interleaved buffer into one grayscale image per channel.
pub fn deinterleave(packed: &PackedImage) -> Vec<GrayscaleImage> {
    let channels = packed.channels() as usize;
    let mut planes: Vec<Vec<u8>> = (0..channels)
        .map(|_| Vec::with_capacity(packed.pixel_count()))
        .collect();

    for px in packed.as_bytes().chunks_exact(channels) {
        for (plane, &value) in planes.iter_mut().zip(px) {
            plane.push(value);
        }
    }

    planes
        .into_iter()
        .map(|data| GrayscaleImage::from_plane(packed.width(), packed.height(), data))
        .collect()
}

/// Borrowed image selected by a [`ChannelView`].
#[derive(Debug, Clone, Copy)]
pub enum PreviewImage<'a> {
    Rgb(&'a PackedImage),
    Channel(&'a GrayscaleImage),
}

impl PreviewImage<'_> {
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            PreviewImage::Rgb(img) => (img.width(), img.height()),
            PreviewImage::Channel(img) => img.dimensions(),
        }
    }

    /// Write in the format implied by the extension of `path`.
    pub fn write(&self, path: &Path, config: &PngConfig) -> Result<(), TextureError> {
        match self {
            PreviewImage::Rgb(img) => write_packed(img, path, config),
            PreviewImage::Channel(img) => write_grayscale(img, path, config),
        }
    }
}

/// Cached preview of the most recent packed result.
#[derive(Debug, Clone)]
pub struct PackedPreview {
    rgb: PackedImage,
    channels: [GrayscaleImage; 3],
}

impl PackedPreview {
    /// Build from a 3- or 4-channel packed buffer. Alpha is not previewed.
    pub fn from_packed(packed: &PackedImage) -> Result<Self, TextureError> {
        if packed.channels() < 3 {
            return Err(TextureError::InvalidBuffer(format!(
                "Preview needs at least 3 channels, got {}",
                packed.channels()
            )));
        }

        let rgb = packed.to_rgb();
        let mut planes = deinterleave(&rgb).into_iter();
        let (Some(r), Some(g), Some(b)) = (planes.next(), planes.next(), planes.next()) else {
            return Err(TextureError::InvalidBuffer(
                "RGB buffer did not yield three planes".into(),
            ));
        };

        Ok(Self {
            rgb,
            channels: [r, g, b],
        })
    }

    /// Decode a packed file from disk and build its preview.
    pub fn load(path: &Path) -> Result<Self, TextureError> {
        let packed = PackedImage::load_rgb(path)?;
        log::debug!(
            "loaded preview {} ({}x{})",
            path.display(),
            packed.width(),
            packed.height()
        );
        Self::from_packed(&packed)
    }

    pub fn width(&self) -> u32 {
        self.rgb.width()
    }

    pub fn height(&self) -> u32 {
        self.rgb.height()
    }

    /// Height over width, 1.0 for empty images.
    pub fn aspect(&self) -> f32 {
        if self.rgb.width() == 0 {
            1.0
        } else {
            self.rgb.height() as f32 / self.rgb.width() as f32
        }
    }

    pub fn view(&self, view: ChannelView) -> PreviewImage<'_> {
        match view.channel_index() {
            None => PreviewImage::Rgb(&self.rgb),
            Some(k) => PreviewImage::Channel(&self.channels[k]),
        }
    }

    pub fn channel(&self, map: SourceMap) -> &GrayscaleImage {
        match map {
            SourceMap::Ao => &self.channels[0],
            SourceMap::Roughness => &self.channels[1],
            SourceMap::Metallic => &self.channels[2],
        }
    }
}
