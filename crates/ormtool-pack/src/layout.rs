//! Channel layouts for packed ORM textures.
//!
//! A layout is a fixed table saying where each output channel comes from:
//!
//! | layout | R | G | B | A |
//! |--------|---|---|---|---|
//! | Unreal | AO | Roughness | Metallic | - |
//! | Unity  | Metallic | AO | 255 | 255 - Roughness |
//!
//! # Example
//!
//! ```
//! use ormtool_pack::{GrayscaleImage, PackLayout, SourceImages};
//!
//! let sources = SourceImages::new(
//!     GrayscaleImage::new(1, 1, vec![10]).unwrap(),
//!     GrayscaleImage::new(1, 1, vec![1]).unwrap(),
//!     GrayscaleImage::new(1, 1, vec![200]).unwrap(),
//! )
//! .unwrap();
//!
//! let packed = PackLayout::Unity.interleave(&sources);
//! assert_eq!(packed.as_bytes(), &[200, 10, 255, 254]);
//! ```

use std::convert::Infallible;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::texture::{GrayscaleImage, PackedImage};

/// One of the three grayscale inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMap {
    Ao,
    Roughness,
    Metallic,
}

impl SourceMap {
    pub const ALL: [SourceMap; 3] = [SourceMap::Ao, SourceMap::Roughness, SourceMap::Metallic];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceMap::Ao => "ao",
            SourceMap::Roughness => "roughness",
            SourceMap::Metallic => "metallic",
        }
    }
}

impl fmt::Display for SourceMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a packed channel takes its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelSource {
    /// Copy the source byte.
    Map(SourceMap),
    /// `255 - source`.
    Inverted(SourceMap),
    /// Same byte for every pixel.
    Constant(u8),
}

impl ChannelSource {
    #[inline]
    fn resolve(self, sources: &SourceImages, index: usize) -> u8 {
        match self {
            ChannelSource::Map(map) => sources.get(map).at(index),
            ChannelSource::Inverted(map) => 255 - sources.get(map).at(index),
            ChannelSource::Constant(value) => value,
        }
    }
}

const UNREAL_CHANNELS: [ChannelSource; 3] = [
    ChannelSource::Map(SourceMap::Ao),
    ChannelSource::Map(SourceMap::Roughness),
    ChannelSource::Map(SourceMap::Metallic),
];

const UNITY_CHANNELS: [ChannelSource; 4] = [
    ChannelSource::Map(SourceMap::Metallic),
    ChannelSource::Map(SourceMap::Ao),
    ChannelSource::Constant(255),
    ChannelSource::Inverted(SourceMap::Roughness),
];

/// Target engine packing layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackLayout {
    /// RGB: AO, roughness, metallic.
    Unreal,
    /// RGBA: metallic, AO, 255, smoothness.
    Unity,
}

impl PackLayout {
    pub fn channel_sources(&self) -> &'static [ChannelSource] {
        match self {
            PackLayout::Unreal => &UNREAL_CHANNELS,
            PackLayout::Unity => &UNITY_CHANNELS,
        }
    }

    pub fn channels(&self) -> u8 {
        self.channel_sources().len() as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PackLayout::Unreal => "unreal",
            PackLayout::Unity => "unity",
        }
    }

    /// Interleave `sources` into a new packed buffer.
    pub fn interleave(&self, sources: &SourceImages) -> PackedImage {
        match self.interleave_with(sources, |_| Ok::<(), Infallible>(())) {
            Ok(packed) => packed,
            Err(never) => match never {},
        }
    }

    /// Interleave with a periodic callback receiving the fraction of pixels done.
    ///
    /// The callback runs at pixel 0 and then every `max(1, n / 100)` pixels, so
    /// it is called at least once per percent. An error from the callback stops
    /// the pass and is returned as is.
    pub fn interleave_with<E, F>(&self, sources: &SourceImages, mut on_progress: F) -> Result<PackedImage, E>
    where
        F: FnMut(f32) -> Result<(), E>,
    {
        let (width, height) = sources.dimensions();
        let table = self.channel_sources();
        let stride = table.len();
        let count = sources.pixel_count();
        let step = (count / 100).max(1);

        let mut packed = PackedImage::zeroed(width, height, self.channels());
        for (i, px) in packed.as_bytes_mut().chunks_exact_mut(stride).enumerate() {
            for (slot, source) in px.iter_mut().zip(table) {
                *slot = source.resolve(sources, i);
            }
            if i % step == 0 {
                on_progress(i as f32 / count as f32)?;
            }
        }

        Ok(packed)
    }
}

impl fmt::Display for PackLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three decoded inputs, guaranteed to share dimensions.
#[derive(Debug, Clone)]
pub struct SourceImages {
    ao: GrayscaleImage,
    roughness: GrayscaleImage,
    metallic: GrayscaleImage,
}

/// Returned by [`SourceImages::new`] when dimensions disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionMismatch {
    pub ao: (u32, u32),
    pub roughness: (u32, u32),
    pub metallic: (u32, u32),
}

impl SourceImages {
    pub fn new(
        ao: GrayscaleImage,
        roughness: GrayscaleImage,
        metallic: GrayscaleImage,
    ) -> Result<Self, DimensionMismatch> {
        if ao.dimensions() != roughness.dimensions() || ao.dimensions() != metallic.dimensions() {
            return Err(DimensionMismatch {
                ao: ao.dimensions(),
                roughness: roughness.dimensions(),
                metallic: metallic.dimensions(),
            });
        }
        Ok(Self {
            ao,
            roughness,
            metallic,
        })
    }

    pub fn get(&self, map: SourceMap) -> &GrayscaleImage {
        match map {
            SourceMap::Ao => &self.ao,
            SourceMap::Roughness => &self.roughness,
            SourceMap::Metallic => &self.metallic,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.ao.dimensions()
    }

    pub fn pixel_count(&self) -> usize {
        self.ao.len()
    }
}
