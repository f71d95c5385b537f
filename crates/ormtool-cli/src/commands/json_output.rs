//! JSON output types for machine-readable CLI output.
//!
//! Used by the `--json` flag on `pack`, `preview` and `inspect`.

use ormtool_pack::{PackError, PackSummary, Resolution, SourceMap};
use serde::{Deserialize, Serialize};

/// Error codes for CLI operations.
///
/// These codes are stable and can be used for programmatic error handling.
pub mod error_codes {
    /// A source map could not be read or decoded
    pub const LOAD_FAILED: &str = "ORM_001";
    /// Source maps have different dimensions
    pub const SIZE_MISMATCH: &str = "ORM_002";
    /// A packed output could not be written
    pub const WRITE_FAILED: &str = "ORM_003";
    /// The pack was cancelled
    pub const CANCELLED: &str = "ORM_004";
    /// Settings file could not be read or parsed
    pub const SETTINGS: &str = "ORM_005";
    /// Preview could not be produced
    pub const PREVIEW: &str = "ORM_006";
}

/// A structured error in JSON output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonError {
    /// Stable error code (e.g., "ORM_001")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// File the error refers to (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Source map the error refers to (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map: Option<SourceMap>,
}

impl JsonError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            file: None,
            map: None,
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_map(mut self, map: SourceMap) -> Self {
        self.map = Some(map);
        self
    }
}

impl From<&PackError> for JsonError {
    fn from(err: &PackError) -> Self {
        match err {
            PackError::LoadFailed { map, path, .. } => {
                JsonError::new(error_codes::LOAD_FAILED, err.to_string())
                    .with_file(path.display().to_string())
                    .with_map(*map)
            }
            PackError::SizeMismatch { .. } => {
                JsonError::new(error_codes::SIZE_MISMATCH, err.to_string())
            }
            PackError::WriteFailed { path, .. } => {
                JsonError::new(error_codes::WRITE_FAILED, err.to_string())
                    .with_file(path.display().to_string())
            }
            PackError::Cancelled => JsonError::new(error_codes::CANCELLED, err.to_string()),
        }
    }
}

/// JSON output for the `pack` command.
#[derive(Debug, Clone, Serialize)]
pub struct PackOutput {
    pub success: bool,
    pub errors: Vec<JsonError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<PackSummary>,
}

impl PackOutput {
    pub fn success(summary: PackSummary) -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            result: Some(summary),
        }
    }

    pub fn failure(errors: Vec<JsonError>) -> Self {
        Self {
            success: false,
            errors,
            result: None,
        }
    }
}

/// One source map as seen by `inspect`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceInfo {
    pub map: SourceMap,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Matching square preset, if the map is one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<u32>,
}

impl SourceInfo {
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        Some((self.width?, self.height?))
    }

    pub(crate) fn loaded(map: SourceMap, path: String, width: u32, height: u32) -> Self {
        let preset = if width == height {
            Resolution::from_width(width).map(Resolution::pixels)
        } else {
            None
        };
        Self {
            map,
            path,
            width: Some(width),
            height: Some(height),
            preset,
        }
    }

    pub(crate) fn unreadable(map: SourceMap, path: String) -> Self {
        Self {
            map,
            path,
            width: None,
            height: None,
            preset: None,
        }
    }
}

/// JSON output for the `inspect` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectOutput {
    /// Whether all three maps loaded with matching dimensions
    pub packable: bool,
    pub errors: Vec<JsonError>,
    pub sources: Vec<SourceInfo>,
}

/// JSON output for the `preview` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewOutput {
    pub success: bool,
    pub errors: Vec<JsonError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<PreviewResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreviewResult {
    pub input: String,
    pub output: String,
    pub channel: String,
    pub width: u32,
    pub height: u32,
    pub aspect: f32,
}

impl PreviewOutput {
    pub fn success(result: PreviewResult) -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            result: Some(result),
        }
    }

    pub fn failure(errors: Vec<JsonError>) -> Self {
        Self {
            success: false,
            errors,
            result: None,
        }
    }
}
