// SPDX-License-Identifier: GPL-3.0-only

//! Application state management

use super::countdown::Countdown;
use super::photos::PhotoStore;
use crate::backends::camera::{CameraSessionManager, get_backend_for_type};
use crate::backends::camera::types::CameraFormat;
use crate::config::Config;
use crate::constants::{capture, name};
use crate::errors::{CameraError, ExportError, PhotoError, SceneError};
use crate::pipelines::photo::PhotoPipeline;
use crate::pipelines::poster::{
    AssetLibrary, BaseLayers, Point, PosterEditor, SavedPoster, display_font_size,
    font_size_for_name,
};
use image::RgbaImage;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Top-level view
///
/// `Camera → NameEntry → Edit`, with `NameEntry → Camera` (cancel) and
/// `Edit → Camera` (close) as the only ways back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Camera,
    NameEntry,
    Edit,
}

/// Main application state
pub struct AppModel {
    /// Configuration
    pub config: Config,
    /// Camera session (the one device handle)
    pub camera: CameraSessionManager,
    /// Whether a camera start is in flight
    pub camera_starting: bool,
    /// Poster assets
    pub assets: AssetLibrary,
    /// Still capture pipeline
    pub pipeline: PhotoPipeline,
    /// Current view
    pub mode: ViewMode,
    /// Capture countdown
    pub countdown: Countdown,
    /// Captured photos
    pub photos: PhotoStore,
    /// Name typed on the name entry view, always uppercase
    pub user_name: String,
    /// Poster surface, present exactly while in Edit
    pub editor: Option<PosterEditor>,
    /// Whether a poster download is running
    pub exporting: bool,
    /// Error banner text
    pub error: Option<String>,
    /// Blocking alert text; must be dismissed
    pub alert: Option<String>,
    /// Transient status line (saved file paths etc.)
    pub status: Option<String>,
    /// Last poster written to disk
    pub last_export: Option<SavedPoster>,
    /// Generation handed to the next poster surface
    pub(crate) next_generation: u64,
}

#[derive(Debug)]
pub enum Message {
    // ===== Camera =====
    /// Acquire the camera
    StartCamera,
    /// Camera start finished
    CameraStarted(Result<CameraFormat, CameraError>),
    /// Release the camera
    StopCamera,

    // ===== Capture =====
    /// Begin the capture countdown
    StartCountdown,
    /// One countdown step elapsed
    CountdownTick,
    /// Delete one captured photo
    DeletePhoto(usize),
    /// Delete all captured photos
    ClearPhotos,
    /// Save one captured photo to the output directory
    DownloadPhoto(usize),
    /// Photo download finished
    PhotoSaved(Result<PathBuf, PhotoError>),

    // ===== Name Entry =====
    /// Leave the camera view for name entry
    OpenNameEntry,
    /// Name field edited
    NameChanged(String),
    /// Back to the camera view, discarding the name
    CancelNameEntry,
    /// Continue to the poster editor
    SubmitName,

    // ===== Poster Editor =====
    /// Frame and/or photo finished loading
    BaseLayersLoaded {
        generation: u64,
        result: Result<BaseLayers, SceneError>,
    },
    /// Reload layers that failed
    RetryLayers,
    /// Add a catalog sticker
    AddSticker(usize),
    /// Sticker finished loading
    StickerLoaded {
        generation: u64,
        index: usize,
        result: Result<Arc<RgbaImage>, SceneError>,
    },
    /// Select the sticker under a point (authoring units)
    SelectAt(Point),
    /// Drag the selected sticker
    MoveSelected { dx: f32, dy: f32 },
    /// Resize the selected sticker
    ScaleSelected(f32),
    /// Remove the selected sticker
    RemoveSticker,
    /// Render and save the poster
    DownloadPoster,
    /// Poster download finished
    PosterSaved(Result<SavedPoster, ExportError>),
    /// Leave the editor
    CloseEditor,

    // ===== System =====
    /// Close the blocking alert
    DismissAlert,
    /// Clear the error banner
    DismissError,
    /// Release every resource before exit
    Shutdown,
}

impl AppModel {
    pub fn new(config: Config, camera: CameraSessionManager) -> Self {
        info!(backend = %camera.backend_type(), "Creating app model");
        Self {
            assets: AssetLibrary::new(config.asset_dir.clone()),
            pipeline: PhotoPipeline::with_mirror(config.mirror_capture),
            camera,
            camera_starting: false,
            mode: ViewMode::default(),
            countdown: Countdown::new(),
            photos: PhotoStore::new(),
            user_name: String::new(),
            editor: None,
            exporting: false,
            error: None,
            alert: None,
            status: None,
            last_export: None,
            next_generation: 1,
            config,
        }
    }

    /// Build the model with the backend named in the config
    pub fn from_config(config: Config) -> Self {
        let backend = get_backend_for_type(config.backend, config.still_image.as_deref());
        let camera = CameraSessionManager::new(backend)
            .with_preferred_device(config.camera_path.clone());
        Self::new(config, camera)
    }

    pub fn is_camera_active(&self) -> bool {
        self.camera.is_active()
    }

    /// Capture is allowed while the camera runs, no countdown is going and
    /// there is room for another photo
    pub fn capture_enabled(&self) -> bool {
        self.is_camera_active() && !self.countdown.is_running() && !self.photos.is_full()
    }

    pub fn capture_button_label(&self) -> String {
        match self.countdown.remaining() {
            Some(n) => format!("{}...", n),
            None => format!(
                "Capture ({}/{})",
                self.photos.len(),
                self.photos.capacity()
            ),
        }
    }

    pub fn photos_label(&self) -> String {
        format!("Photos ({}/{})", self.photos.len(), self.photos.capacity())
    }

    /// Name as shown on the poster preview
    pub fn name_preview(&self) -> &str {
        if self.user_name.is_empty() {
            name::PLACEHOLDER
        } else {
            &self.user_name
        }
    }

    /// Font size the name will have on the exported poster
    pub fn name_font_size(&self) -> u32 {
        font_size_for_name(&self.user_name)
    }

    /// Font size of the on-screen name preview
    pub fn name_display_size(&self) -> u32 {
        display_font_size(self.name_font_size(), self.config.layout.display_font_scale)
    }

    pub fn countdown_seconds(&self) -> u32 {
        if self.config.countdown_seconds == 0 {
            capture::COUNTDOWN_SECONDS
        } else {
            self.config.countdown_seconds
        }
    }

    /// Release the poster surface and the camera
    ///
    /// Called on close and from `Drop`; safe to call repeatedly.
    pub fn teardown(&mut self) {
        if let Some(mut editor) = self.editor.take() {
            editor.release();
        }
        if self.camera.stop() {
            info!("Camera released on teardown");
        }
    }
}

impl Drop for AppModel {
    fn drop(&mut self) {
        self.teardown();
    }
}
