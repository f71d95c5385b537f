//! ORMTool channel packing
//!
//! Packs ambient-occlusion, roughness and metallic maps into the channel
//! layouts expected by real-time engines:
//!
//! - **Unreal** (RGB): R = AO, G = roughness, B = metallic
//! - **Unity** (RGBA): R = metallic, G = AO, B = 255, A = 255 - roughness
//!
//! # Example
//!
//! ```no_run
//! use ormtool_pack::{pack, PackRequest};
//!
//! let request = PackRequest::new("ao.png", "roughness.png", "metallic.png")
//!     .with_unreal("out/orm_unreal.png")
//!     .without_unity();
//!
//! let summary = pack(&request, &mut |p: f32| println!("{:.0}%", p * 100.0)).unwrap();
//! println!("{}x{}", summary.width, summary.height);
//! ```
//!
//! Long runs can be moved off the caller's thread with [`PackWorker`], which
//! exposes progress as an atomic value and refuses a second start while busy.

pub mod anim;
pub mod encode;
pub mod layout;
pub mod packer;
pub mod png;
pub mod preview;
pub mod progress;
pub mod settings;
pub mod texture;
pub mod worker;

pub use encode::{write_grayscale, write_packed, OutputFormat};
pub use layout::{ChannelSource, DimensionMismatch, PackLayout, SourceImages, SourceMap};
pub use packer::{
    load_sources, pack, pack_sources, PackError, PackRequest, PackSummary, PackedOutput,
    DEFAULT_UNITY_PATH, DEFAULT_UNREAL_PATH,
};
pub use self::png::{PngConfig, PngError, PngPreset};
pub use preview::{deinterleave, ChannelView, PackedPreview, PreviewImage};
pub use progress::{NoProgress, ProgressSink};
pub use settings::{Settings, SettingsError};
pub use texture::{GrayscaleImage, PackedImage, Resolution, TextureError};
pub use worker::{PackOutcome, PackWorker, WorkerError};
