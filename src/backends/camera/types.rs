// SPDX-License-Identifier: GPL-3.0-only
// Shared types for camera backend abstraction

//! Shared types for camera backends

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Camera backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CameraBackendType {
    /// Direct V4L2 capture (Linux webcams)
    #[default]
    V4l2,
    /// A still image served as a live feed (demos, headless runs, tests)
    Still,
}

impl std::fmt::Display for CameraBackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CameraBackendType::V4l2 => write!(f, "V4L2"),
            CameraBackendType::Still => write!(f, "still image"),
        }
    }
}

/// Where a camera is mounted relative to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraLocation {
    /// Faces the user (selfie camera)
    Front,
    /// Faces away from the user
    Back,
    /// Unknown mounting, e.g. a USB webcam
    #[default]
    External,
}

impl CameraLocation {
    /// Location from a USB port's sysfs `removable` attribute
    ///
    /// A camera on a fixed (internal) port is the laptop's built-in webcam,
    /// which faces the user. Anything else is treated as external.
    pub fn from_usb_removable(value: &str) -> Self {
        match value.trim() {
            "fixed" => CameraLocation::Front,
            _ => CameraLocation::External,
        }
    }

    /// Selection priority for a user-facing request (lower is better).
    ///
    /// External webcams almost always point at the user, so they rank
    /// just behind an explicit front camera.
    pub fn user_facing_rank(&self) -> u8 {
        match self {
            CameraLocation::Front => 0,
            CameraLocation::External => 1,
            CameraLocation::Back => 2,
        }
    }
}

/// Represents a camera device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    pub name: String,
    pub path: String,                 // Capture node (e.g. /dev/video0) or still:<file>
    pub location: CameraLocation,     // Mounting relative to the user
    pub driver: Option<String>,       // V4L2 driver name (e.g. "uvcvideo")
}

/// Framerate as a fraction (numerator/denominator)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Framerate {
    pub num: u32,
    pub denom: u32,
}

impl Framerate {
    /// Create a new framerate from numerator and denominator
    pub fn new(num: u32, denom: u32) -> Self {
        Self {
            num,
            denom: if denom == 0 { 1 } else { denom },
        }
    }

    /// Get the rounded integer framerate
    pub fn as_int(&self) -> u32 {
        self.num / self.denom
    }
}

impl std::fmt::Display for Framerate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.denom != 1 {
            write!(f, "{:.2}", self.num as f64 / self.denom as f64)
        } else {
            write!(f, "{}", self.num)
        }
    }
}

/// Camera format specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraFormat {
    pub width: u32,
    pub height: u32,
    pub framerate: Option<Framerate>,
    pub pixel_format: String, // FourCC code (e.g., "MJPG", "YUYV")
}

impl std::fmt::Display for CameraFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(fps) = &self.framerate {
            write!(
                f,
                "{}x{} @ {}fps ({})",
                self.width, self.height, fps, self.pixel_format
            )
        } else {
            write!(f, "{}x{} ({})", self.width, self.height, self.pixel_format)
        }
    }
}

/// Pixel format for camera frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// RGBA - 32-bit with alpha (4 bytes per pixel)
    RGBA,
    /// BGRA - 32-bit with alpha (B G R A byte order)
    BGRA,
    /// RGB24 - 24-bit RGB (3 bytes per pixel, no alpha)
    RGB24,
    /// Gray8 - 8-bit grayscale (single channel)
    Gray8,
    /// YUYV - Packed 4:2:2 (Y0 U Y1 V interleaved)
    YUYV,
    /// UYVY - Packed 4:2:2 (U Y0 V Y1 interleaved)
    UYVY,
    /// Motion JPEG - every buffer is a complete JPEG image
    MJPEG,
}

impl PixelFormat {
    /// Map a V4L2 FourCC code to a pixel format we can convert
    pub fn from_fourcc(code: &str) -> Option<Self> {
        match code {
            "AB24" | "RGBA" => Some(PixelFormat::RGBA),
            "AR24" | "BGRA" => Some(PixelFormat::BGRA),
            "RGB3" => Some(PixelFormat::RGB24),
            "GREY" => Some(PixelFormat::Gray8),
            "YUYV" => Some(PixelFormat::YUYV),
            "UYVY" => Some(PixelFormat::UYVY),
            "MJPG" | "JPEG" => Some(PixelFormat::MJPEG),
            _ => None,
        }
    }

    /// FourCC code requested from the device for this format
    pub fn fourcc(&self) -> &'static str {
        match self {
            PixelFormat::RGBA => "AB24",
            PixelFormat::BGRA => "AR24",
            PixelFormat::RGB24 => "RGB3",
            PixelFormat::Gray8 => "GREY",
            PixelFormat::YUYV => "YUYV",
            PixelFormat::UYVY => "UYVY",
            PixelFormat::MJPEG => "MJPG",
        }
    }

    /// Bytes per pixel for packed formats (None for compressed formats)
    pub fn bytes_per_pixel(&self) -> Option<u32> {
        match self {
            PixelFormat::RGBA | PixelFormat::BGRA => Some(4),
            PixelFormat::RGB24 => Some(3),
            PixelFormat::YUYV | PixelFormat::UYVY => Some(2),
            PixelFormat::Gray8 => Some(1),
            PixelFormat::MJPEG => None,
        }
    }
}

/// A single frame delivered by a camera backend
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// Frame data in `format` layout
    pub data: Arc<[u8]>,
    /// Pixel format of the data
    pub format: PixelFormat,
    /// Row stride (bytes per row, may include padding). Zero for MJPEG.
    pub stride: u32,
    /// Timestamp when frame was captured
    pub captured_at: Instant,
}

impl CameraFrame {
    /// Wrap an RGBA image as a frame
    pub fn from_rgba(image: &image::RgbaImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            data: Arc::from(image.as_raw().as_slice()),
            format: PixelFormat::RGBA,
            stride: image.width() * 4,
            captured_at: Instant::now(),
        }
    }

    /// Raw frame bytes
    pub fn data_slice(&self) -> &[u8] {
        &self.data
    }
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Error types for backend operations
#[derive(Debug, Clone)]
pub enum BackendError {
    /// The user or system refused access to the device
    PermissionDenied(String),
    /// Failed to initialize backend
    InitializationFailed(String),
    /// Camera device not found
    DeviceNotFound(String),
    /// Requested format is not supported
    FormatNotSupported(String),
    /// Operation requires an initialized backend
    NotInitialized,
    /// Backend is running but has not delivered a frame yet
    NoFrame,
    /// I/O error
    IoError(String),
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::PermissionDenied(msg) => write!(f, "Permission denied: {}", msg),
            BackendError::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            BackendError::DeviceNotFound(msg) => write!(f, "Device not found: {}", msg),
            BackendError::FormatNotSupported(msg) => write!(f, "Format not supported: {}", msg),
            BackendError::NotInitialized => write!(f, "Backend not initialized"),
            BackendError::NoFrame => write!(f, "No frame received yet"),
            BackendError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => BackendError::PermissionDenied(err.to_string()),
            std::io::ErrorKind::NotFound => BackendError::DeviceNotFound(err.to_string()),
            _ => BackendError::IoError(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_rank_prefers_front() {
        let mut locations = vec![
            CameraLocation::Back,
            CameraLocation::External,
            CameraLocation::Front,
        ];
        locations.sort_by_key(|l| l.user_facing_rank());
        assert_eq!(locations[0], CameraLocation::Front);
        assert_eq!(locations[2], CameraLocation::Back);
    }

    #[test]
    fn test_fixed_usb_port_is_front_facing() {
        assert_eq!(
            CameraLocation::from_usb_removable("fixed\n"),
            CameraLocation::Front
        );
        assert_eq!(
            CameraLocation::from_usb_removable("removable"),
            CameraLocation::External
        );
        assert_eq!(
            CameraLocation::from_usb_removable("unknown"),
            CameraLocation::External
        );
    }

    #[test]
    fn test_fourcc_roundtrip_for_supported_formats() {
        for format in [
            PixelFormat::RGBA,
            PixelFormat::BGRA,
            PixelFormat::RGB24,
            PixelFormat::Gray8,
            PixelFormat::YUYV,
            PixelFormat::UYVY,
            PixelFormat::MJPEG,
        ] {
            assert_eq!(PixelFormat::from_fourcc(format.fourcc()), Some(format));
        }
        assert_eq!(PixelFormat::from_fourcc("H264"), None);
    }

    #[test]
    fn test_permission_io_error_maps_to_permission_denied() {
        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        assert!(matches!(
            BackendError::from(err),
            BackendError::PermissionDenied(_)
        ));
    }
}
