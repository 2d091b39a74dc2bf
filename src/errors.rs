// SPDX-License-Identifier: MPL-2.0

//! Error types for the photo booth

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Camera-related errors
    Camera(CameraError),
    /// Photo capture errors
    Photo(PhotoError),
    /// Poster scene errors (asset loading, surface ownership)
    Scene(SceneError),
    /// Poster export errors
    Export(ExportError),
    /// Configuration errors
    Config(String),
    /// Storage/filesystem errors
    Storage(String),
    /// Generic error with message
    Other(String),
}

/// Camera session errors
#[derive(Debug, Clone)]
pub enum CameraError {
    /// No camera devices found
    NoCameraFound,
    /// Access to the camera was refused
    PermissionDenied(String),
    /// Camera initialization failed
    InitializationFailed(String),
    /// Operation needs an active camera session
    NotActive,
    /// Backend error
    BackendError(String),
}

/// Photo capture errors
#[derive(Debug, Clone)]
pub enum PhotoError {
    /// No frame available for capture
    NoFrameAvailable,
    /// Frame could not be converted to an image
    ConversionFailed(String),
    /// Encoding failed
    EncodingFailed(String),
    /// Stored photo could not be decoded
    DecodeFailed(String),
    /// Save failed
    SaveFailed(String),
}

/// Which part of the poster scene an error concerns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerRole {
    Frame,
    Photo,
    Sticker,
}

impl fmt::Display for LayerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerRole::Frame => write!(f, "frame"),
            LayerRole::Photo => write!(f, "photo"),
            LayerRole::Sticker => write!(f, "sticker"),
        }
    }
}

/// Poster scene errors
#[derive(Debug, Clone)]
pub enum SceneError {
    /// An image layer could not be loaded or decoded
    AssetLoad { role: LayerRole, detail: String },
    /// A rendering surface already exists and must be released first
    SurfaceInUse,
    /// No rendering surface exists
    NoSurface,
    /// The load was started for a scene that has since been released
    Cancelled,
}

/// Poster export errors
#[derive(Debug, Clone)]
pub enum ExportError {
    /// No scene to export
    NoScene,
    /// Font system failed to become ready
    Fonts(String),
    /// Rasterizing a scene failed
    Render(String),
    /// Encoding the final image failed
    Encoding(String),
    /// Writing the file failed
    Save(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Camera(e) => write!(f, "Camera error: {}", e),
            AppError::Photo(e) => write!(f, "Photo error: {}", e),
            AppError::Scene(e) => write!(f, "Scene error: {}", e),
            AppError::Export(e) => write!(f, "Export error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::NoCameraFound => write!(f, "No camera devices found"),
            CameraError::PermissionDenied(msg) => write!(f, "Permission denied: {}", msg),
            CameraError::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            CameraError::NotActive => write!(f, "Camera is not running"),
            CameraError::BackendError(msg) => write!(f, "Backend error: {}", msg),
        }
    }
}

impl fmt::Display for PhotoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhotoError::NoFrameAvailable => write!(f, "No frame available for capture"),
            PhotoError::ConversionFailed(msg) => write!(f, "Frame conversion failed: {}", msg),
            PhotoError::EncodingFailed(msg) => write!(f, "Encoding failed: {}", msg),
            PhotoError::DecodeFailed(msg) => write!(f, "Decoding failed: {}", msg),
            PhotoError::SaveFailed(msg) => write!(f, "Save failed: {}", msg),
        }
    }
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::AssetLoad { role, detail } => {
                write!(f, "Failed to load {} layer: {}", role, detail)
            }
            SceneError::SurfaceInUse => write!(f, "A poster surface is already open"),
            SceneError::NoSurface => write!(f, "No poster surface is open"),
            SceneError::Cancelled => write!(f, "Scene was released before loading finished"),
        }
    }
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::NoScene => write!(f, "Nothing to export"),
            ExportError::Fonts(msg) => write!(f, "Fonts not ready: {}", msg),
            ExportError::Render(msg) => write!(f, "Rendering failed: {}", msg),
            ExportError::Encoding(msg) => write!(f, "Encoding failed: {}", msg),
            ExportError::Save(msg) => write!(f, "Save failed: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for CameraError {}
impl std::error::Error for PhotoError {}
impl std::error::Error for SceneError {}
impl std::error::Error for ExportError {}

// Conversions from sub-errors to AppError
impl From<CameraError> for AppError {
    fn from(err: CameraError) -> Self {
        AppError::Camera(err)
    }
}

impl From<PhotoError> for AppError {
    fn from(err: PhotoError) -> Self {
        AppError::Photo(err)
    }
}

impl From<SceneError> for AppError {
    fn from(err: SceneError) -> Self {
        AppError::Scene(err)
    }
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        AppError::Export(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for PhotoError {
    fn from(err: std::io::Error) -> Self {
        PhotoError::SaveFailed(err.to_string())
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::Save(err.to_string())
    }
}

impl From<crate::backends::camera::BackendError> for CameraError {
    fn from(err: crate::backends::camera::BackendError) -> Self {
        use crate::backends::camera::BackendError;
        match err {
            BackendError::PermissionDenied(msg) => CameraError::PermissionDenied(msg),
            BackendError::DeviceNotFound(_) => CameraError::NoCameraFound,
            BackendError::NotInitialized => CameraError::NotActive,
            BackendError::InitializationFailed(msg) | BackendError::FormatNotSupported(msg) => {
                CameraError::InitializationFailed(msg)
            }
            other => CameraError::BackendError(other.to_string()),
        }
    }
}
