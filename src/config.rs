// SPDX-License-Identifier: GPL-3.0-only

//! Persistent configuration
//!
//! Stored as JSON in `<config dir>/nakama-booth/config.json`. Unknown or
//! missing fields fall back to their defaults, so older files keep working.

use crate::backends::camera::CameraBackendType;
use crate::constants::{APP_DIR_NAME, capture};
use crate::errors::{AppError, AppResult};
use crate::pipelines::poster::PosterLayout;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Camera backend to use (V4L2 or still image)
    pub backend: CameraBackendType,
    /// Image served by the still-image backend (test pattern when unset)
    pub still_image: Option<PathBuf>,
    /// Device path to prefer over the location ranking
    pub camera_path: Option<String>,
    /// Mirror captured stills like the preview (selfie mode)
    pub mirror_capture: bool,
    /// Countdown start value in seconds
    pub countdown_seconds: u32,
    /// Root of the frame, background and sticker assets
    pub asset_dir: PathBuf,
    /// Where downloads go; the user's download directory when unset
    pub output_dir: Option<PathBuf>,
    /// Poster geometry and typography
    pub layout: PosterLayout,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: CameraBackendType::default(),
            still_image: None,
            camera_path: None,
            mirror_capture: true,
            countdown_seconds: capture::COUNTDOWN_SECONDS,
            asset_dir: PathBuf::from("assets"),
            output_dir: None,
            layout: PosterLayout::default(),
        }
    }
}

impl Config {
    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load the config, falling back to defaults on any problem
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            warn!("No config directory available, using defaults");
            return Self::default();
        };
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable config");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self =
            serde_json::from_str(&text).map_err(|e| AppError::Config(e.to_string()))?;
        config.layout.validate().map_err(AppError::Config)?;
        info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text =
            serde_json::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, text)?;
        debug!(path = %path.display(), "Saved config");
        Ok(())
    }

    /// Resolved download directory
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .or_else(dirs::download_dir)
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
