//! The channel packer: load three maps, interleave, write.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::encode::{write_packed, OutputFormat};
use crate::layout::{PackLayout, SourceImages, SourceMap};
use crate::png::PngConfig;
use crate::progress::{ProgressSink, ProgressTracker};
use crate::texture::{GrayscaleImage, TextureError};

/// Default destination of the Unreal (RGB) output.
pub const DEFAULT_UNREAL_PATH: &str = "orm_unreal.png";
/// Default destination of the Unity (RGBA) output.
pub const DEFAULT_UNITY_PATH: &str = "orm_unity.png";

/// Errors that end a pack run. None of them are retried.
#[derive(Debug, Error)]
pub enum PackError {
    #[error("Failed to load {map} map from {}: {source}", .path.display())]
    LoadFailed {
        map: SourceMap,
        path: PathBuf,
        #[source]
        source: TextureError,
    },

    #[error("Size mismatch: ao {ao:?}, roughness {roughness:?}, metallic {metallic:?}")]
    SizeMismatch {
        ao: (u32, u32),
        roughness: (u32, u32),
        metallic: (u32, u32),
    },

    #[error("Failed to write {layout} output to {}: {source}", .path.display())]
    WriteFailed {
        layout: PackLayout,
        path: PathBuf,
        #[source]
        source: TextureError,
    },

    #[error("Pack cancelled")]
    Cancelled,
}

/// Inputs and destinations of one pack run.
#[derive(Debug, Clone)]
pub struct PackRequest {
    pub ao: PathBuf,
    pub roughness: PathBuf,
    pub metallic: PathBuf,
    pub unreal_path: PathBuf,
    pub unity_path: PathBuf,
    pub generate_unreal: bool,
    pub generate_unity: bool,
    pub png: PngConfig,
}

impl PackRequest {
    /// Request both layouts at their default destinations.
    pub fn new(
        ao: impl Into<PathBuf>,
        roughness: impl Into<PathBuf>,
        metallic: impl Into<PathBuf>,
    ) -> Self {
        Self {
            ao: ao.into(),
            roughness: roughness.into(),
            metallic: metallic.into(),
            unreal_path: PathBuf::from(DEFAULT_UNREAL_PATH),
            unity_path: PathBuf::from(DEFAULT_UNITY_PATH),
            generate_unreal: true,
            generate_unity: true,
            png: PngConfig::default(),
        }
    }

    pub fn with_unreal(mut self, path: impl Into<PathBuf>) -> Self {
        self.unreal_path = path.into();
        self.generate_unreal = true;
        self
    }

    pub fn with_unity(mut self, path: impl Into<PathBuf>) -> Self {
        self.unity_path = path.into();
        self.generate_unity = true;
        self
    }

    pub fn without_unreal(mut self) -> Self {
        self.generate_unreal = false;
        self
    }

    pub fn without_unity(mut self) -> Self {
        self.generate_unity = false;
        self
    }

    pub fn with_png_config(mut self, config: PngConfig) -> Self {
        self.png = config;
        self
    }

    fn source_path(&self, map: SourceMap) -> &Path {
        match map {
            SourceMap::Ao => &self.ao,
            SourceMap::Roughness => &self.roughness,
            SourceMap::Metallic => &self.metallic,
        }
    }

    /// Requested outputs in write order.
    pub fn outputs(&self) -> Vec<(PackLayout, &Path)> {
        let mut outputs = Vec::with_capacity(2);
        if self.generate_unreal {
            outputs.push((PackLayout::Unreal, self.unreal_path.as_path()));
        }
        if self.generate_unity {
            outputs.push((PackLayout::Unity, self.unity_path.as_path()));
        }
        outputs
    }
}

/// One written file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackedOutput {
    pub layout: PackLayout,
    pub path: PathBuf,
    pub format: String,
    pub channels: u8,
    /// Size of the interleaved buffer, not of the encoded file.
    pub bytes: usize,
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackSummary {
    pub width: u32,
    pub height: u32,
    pub outputs: Vec<PackedOutput>,
}

/// Load the three maps named by `request` and check they agree in size.
pub fn load_sources(request: &PackRequest) -> Result<SourceImages, PackError> {
    let ao = load_map(request, SourceMap::Ao)?;
    let roughness = load_map(request, SourceMap::Roughness)?;
    let metallic = load_map(request, SourceMap::Metallic)?;

    SourceImages::new(ao, roughness, metallic).map_err(|m| {
        log::warn!(
            "size mismatch: ao {:?}, roughness {:?}, metallic {:?}",
            m.ao,
            m.roughness,
            m.metallic
        );
        PackError::SizeMismatch {
            ao: m.ao,
            roughness: m.roughness,
            metallic: m.metallic,
        }
    })
}

fn load_map(request: &PackRequest, map: SourceMap) -> Result<GrayscaleImage, PackError> {
    let path = request.source_path(map);
    GrayscaleImage::load(path).map_err(|source| {
        log::warn!("failed to load {} map {}: {}", map, path.display(), source);
        PackError::LoadFailed {
            map,
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Run a full pack: load, validate, interleave and write each requested layout.
///
/// Progress is reported to `progress` as described in [`crate::progress`]; the
/// last report of a successful run is exactly `1.0`. Nothing is written unless
/// all three sources load and share dimensions. The sources are dropped before
/// returning on every path.
pub fn pack<S: ProgressSink + ?Sized>(
    request: &PackRequest,
    progress: &mut S,
) -> Result<PackSummary, PackError> {
    log::info!(
        "packing ao={} roughness={} metallic={}",
        request.ao.display(),
        request.roughness.display(),
        request.metallic.display()
    );

    let sources = load_sources(request)?;
    pack_sources(&sources, &request.outputs(), &request.png, progress)
}

/// Interleave and write already-loaded sources.
pub fn pack_sources<S: ProgressSink + ?Sized>(
    sources: &SourceImages,
    outputs: &[(PackLayout, &Path)],
    png: &PngConfig,
    progress: &mut S,
) -> Result<PackSummary, PackError> {
    let (width, height) = sources.dimensions();
    let mut tracker = ProgressTracker::new(progress, 2 * outputs.len() as u32);
    let mut written = Vec::with_capacity(outputs.len());

    for &(layout, path) in outputs {
        let packed = layout.interleave_with(sources, |f| tracker.report_fraction(f))?;
        tracker.finish_unit();
        tracker.check_cancelled()?;

        write_packed(&packed, path, png).map_err(|source| PackError::WriteFailed {
            layout,
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("wrote {} output {} ({}x{})", layout, path.display(), width, height);

        written.push(PackedOutput {
            layout,
            path: path.to_path_buf(),
            format: OutputFormat::from_path(path).to_string(),
            channels: packed.channels(),
            bytes: packed.as_bytes().len(),
        });
        tracker.finish_unit();
    }

    tracker.complete();
    Ok(PackSummary {
        width,
        height,
        outputs: written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::write_grayscale;
    use tempfile::tempdir;

    fn write_gray(dir: &Path, name: &str, w: u32, h: u32, data: &[u8]) -> PathBuf {
        let path = dir.join(name);
        let img = GrayscaleImage::new(w, h, data.to_vec()).unwrap();
        write_grayscale(&img, &path, &PngConfig::default()).unwrap();
        path
    }

    #[test]
    fn test_request_defaults() {
        let req = PackRequest::new("ao.png", "r.png", "m.png");
        assert_eq!(req.unreal_path, PathBuf::from("orm_unreal.png"));
        assert_eq!(req.unity_path, PathBuf::from("orm_unity.png"));
        assert_eq!(req.outputs().len(), 2);
    }

    #[test]
    fn test_request_outputs_order_and_flags() {
        let req = PackRequest::new("a", "b", "c").without_unreal();
        let outputs = req.outputs();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].0, PackLayout::Unity);

        let req = PackRequest::new("a", "b", "c").without_unity().without_unreal();
        assert!(req.outputs().is_empty());
    }

    #[test]
    fn test_pack_writes_both_layouts() {
        let dir = tempdir().unwrap();
        let ao = write_gray(dir.path(), "ao.png", 2, 2, &[10, 20, 30, 40]);
        let r = write_gray(dir.path(), "r.png", 2, 2, &[1, 2, 3, 4]);
        let m = write_gray(dir.path(), "m.png", 2, 2, &[200, 210, 220, 230]);

        let req = PackRequest::new(ao, r, m)
            .with_unreal(dir.path().join("unreal.png"))
            .with_unity(dir.path().join("unity.png"));

        let mut seen = Vec::new();
        let summary = pack(&req, &mut |p: f32| seen.push(p)).unwrap();

        assert_eq!((summary.width, summary.height), (2, 2));
        assert_eq!(summary.outputs.len(), 2);
        assert_eq!(summary.outputs[0].bytes, 12);
        assert_eq!(summary.outputs[1].bytes, 16);

        let unreal = image::open(dir.path().join("unreal.png")).unwrap().into_rgb8();
        assert_eq!(
            unreal.as_raw(),
            &vec![10, 1, 200, 20, 2, 210, 30, 3, 220, 40, 4, 230]
        );
        let unity = image::open(dir.path().join("unity.png")).unwrap().into_rgba8();
        assert_eq!(
            unity.as_raw(),
            &vec![200, 10, 255, 254, 210, 20, 255, 253, 220, 30, 255, 252, 230, 40, 255, 251]
        );

        assert_eq!(seen.last().copied(), Some(1.0));
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_missing_source_is_load_failed() {
        let dir = tempdir().unwrap();
        let ao = write_gray(dir.path(), "ao.png", 1, 1, &[0]);
        let m = write_gray(dir.path(), "m.png", 1, 1, &[0]);
        let req = PackRequest::new(ao, dir.path().join("missing.png"), m)
            .with_unreal(dir.path().join("unreal.png"))
            .with_unity(dir.path().join("unity.png"));

        let err = pack(&req, &mut crate::progress::NoProgress).unwrap_err();
        match err {
            PackError::LoadFailed { map, .. } => assert_eq!(map, SourceMap::Roughness),
            other => panic!("expected LoadFailed, got {other:?}"),
        }
        assert!(!dir.path().join("unreal.png").exists());
        assert!(!dir.path().join("unity.png").exists());
    }

    #[test]
    fn test_no_outputs_still_reports_completion() {
        let dir = tempdir().unwrap();
        let ao = write_gray(dir.path(), "ao.png", 1, 1, &[0]);
        let req = PackRequest::new(&ao, &ao, &ao).without_unreal().without_unity();

        let mut seen = Vec::new();
        let summary = pack(&req, &mut |p: f32| seen.push(p)).unwrap();
        assert!(summary.outputs.is_empty());
        assert_eq!(seen, vec![1.0]);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_unwritable_destination_is_write_failed() {
        let dir = tempdir().unwrap();
        let ao = write_gray(dir.path(), "ao.png", 2, 2, &[10, 20, 30, 40]);
        let req = PackRequest::new(&ao, &ao, &ao)
            .with_unreal("/dev/full")
            .without_unity();

        let mut seen = Vec::new();
        let err = pack(&req, &mut |p: f32| seen.push(p)).unwrap_err();
        match err {
            PackError::WriteFailed { layout, path, .. } => {
                assert_eq!(layout, PackLayout::Unreal);
                assert_eq!(path, PathBuf::from("/dev/full"));
            }
            other => panic!("expected WriteFailed, got {other:?}"),
        }
        assert_ne!(seen.last().copied(), Some(1.0));
    }

    #[test]
    fn test_size_mismatch_message() {
        let err = PackError::SizeMismatch {
            ao: (64, 64),
            roughness: (32, 32),
            metallic: (64, 64),
        };
        assert_eq!(
            err.to_string(),
            "Size mismatch: ao (64, 64), roughness (32, 32), metallic (64, 64)"
        );
    }
}
