//! User settings: default destinations, which layouts to produce, PNG preset.
//!
//! Settings are JSON. Lookup order when no explicit file is given:
//! `./ormtool.json`, then `<config dir>/ormtool/config.json`, then defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::packer::{PackRequest, DEFAULT_UNITY_PATH, DEFAULT_UNREAL_PATH};
use crate::png::PngPreset;

/// File name looked up in the working directory.
pub const LOCAL_SETTINGS_FILE: &str = "ormtool.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub unreal_path: PathBuf,
    pub unity_path: PathBuf,
    pub generate_unreal: bool,
    pub generate_unity: bool,
    pub png: PngPreset,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            unreal_path: PathBuf::from(DEFAULT_UNREAL_PATH),
            unity_path: PathBuf::from(DEFAULT_UNITY_PATH),
            generate_unreal: true,
            generate_unity: true,
            png: PngPreset::Default,
        }
    }
}

impl Settings {
    /// Parse settings from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `explicit` if given, otherwise the first settings file found, otherwise defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, SettingsError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        for candidate in Self::search_paths() {
            if candidate.is_file() {
                log::info!("using settings from {}", candidate.display());
                return Self::from_file(&candidate);
            }
        }
        Ok(Self::default())
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_SETTINGS_FILE)];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("ormtool").join("config.json"));
        }
        paths
    }

    /// Build a request for the given sources using these settings.
    pub fn request(
        &self,
        ao: impl Into<PathBuf>,
        roughness: impl Into<PathBuf>,
        metallic: impl Into<PathBuf>,
    ) -> PackRequest {
        let mut request = PackRequest::new(ao, roughness, metallic)
            .with_unreal(&self.unreal_path)
            .with_unity(&self.unity_path)
            .with_png_config(self.png.into());
        request.generate_unreal = self.generate_unreal;
        request.generate_unity = self.generate_unity;
        request
    }
}
