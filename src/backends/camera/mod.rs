// SPDX-License-Identifier: MPL-2.0

//! Camera backend abstraction
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │   Booth controller   │
//! └──────────┬───────────┘
//!            │
//!            ▼
//! ┌──────────────────────┐
//! │ CameraSessionManager │  ← Exclusive device ownership, start/stop
//! └──────────┬───────────┘
//!            │
//!            ▼
//! ┌──────────────────────┐
//! │  CameraBackend Trait │  ← Common interface
//! └──────────┬───────────┘
//!            │
//!       ┌────┴─────┐
//!       ▼          ▼
//!   ┌──────┐   ┌───────┐
//!   │ V4L2 │   │ Still │
//!   └──────┘   └───────┘
//! ```

pub mod format_converters;
pub mod manager;
pub mod still;
pub mod types;
pub mod v4l2;

pub use manager::CameraSessionManager;
pub use types::*;

use std::path::Path;

/// Camera backend trait
///
/// A backend owns at most one open device at a time. `initialize` acquires
/// it, `shutdown` releases it; preview and capture only work in between.
pub trait CameraBackend: Send + Sync {
    // ===== Enumeration =====

    /// Enumerate available cameras on this backend
    fn enumerate_cameras(&self) -> Vec<CameraDevice>;

    /// Get supported formats for a specific camera device
    fn get_formats(&self, device: &CameraDevice) -> Vec<CameraFormat>;

    // ===== Lifecycle =====

    /// Open the device and start streaming video (never audio)
    ///
    /// # Returns
    /// * `Ok(())` - Device acquired and streaming
    /// * `Err(BackendError::PermissionDenied)` - Access refused
    /// * `Err(BackendError)` - Any other failure; the backend stays uninitialized
    fn initialize(&mut self, device: &CameraDevice, format: &CameraFormat) -> BackendResult<()>;

    /// Stop every stream and release the device
    fn shutdown(&mut self) -> BackendResult<()>;

    /// Check if the backend currently holds a device
    fn is_initialized(&self) -> bool;

    // ===== Frames =====

    /// Copy of the most recent frame, for still capture
    fn capture_photo(&self) -> BackendResult<CameraFrame>;

    /// Most recent frame for live preview, if any has arrived
    fn preview_frame(&self) -> Option<CameraFrame>;

    // ===== Metadata =====

    /// Get the backend type identifier
    fn backend_type(&self) -> CameraBackendType;

    /// Get the currently active camera device (if initialized)
    fn current_device(&self) -> Option<&CameraDevice>;

    /// Get the currently active format (if initialized)
    fn current_format(&self) -> Option<&CameraFormat>;
}

/// Create a backend instance for the given type
///
/// `still_source` is only used by the still-image backend; without one it
/// serves a generated test pattern.
pub fn get_backend_for_type(
    backend_type: CameraBackendType,
    still_source: Option<&Path>,
) -> Box<dyn CameraBackend> {
    match backend_type {
        CameraBackendType::V4l2 => Box::new(v4l2::V4l2Backend::new()),
        CameraBackendType::Still => Box::new(still::StillImageBackend::new(
            still_source.map(Path::to_path_buf),
        )),
    }
}

/// Pick the device that best matches a user-facing request
///
/// A preferred path wins when present; otherwise front cameras beat
/// external ones, which beat back cameras. Ties keep enumeration order.
pub fn select_user_facing<'a>(
    devices: &'a [CameraDevice],
    preferred_path: Option<&str>,
) -> Option<&'a CameraDevice> {
    if let Some(path) = preferred_path
        && let Some(device) = devices.iter().find(|d| d.path == path)
    {
        return Some(device);
    }
    devices.iter().min_by_key(|d| d.location.user_facing_rank())
}

/// Pick a preview-friendly format
///
/// A booth only needs a modest resolution; 640x480 keeps conversion and
/// PNG encoding fast. Formats we cannot convert are never chosen.
pub fn select_preview_format(formats: &[CameraFormat]) -> Option<CameraFormat> {
    let target_pixels = 640 * 480;

    formats
        .iter()
        .filter(|f| PixelFormat::from_fourcc(&f.pixel_format).is_some())
        .min_by_key(|f| {
            let pixels = f.width * f.height;
            let diff = (pixels as i64 - target_pixels as i64).abs();
            // Uncompressed formats avoid a JPEG decode per frame
            let mjpeg_penalty = if f.pixel_format == "MJPG" { 1 } else { 0 };
            (diff, mjpeg_penalty)
        })
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(path: &str, location: CameraLocation) -> CameraDevice {
        CameraDevice {
            name: path.to_string(),
            path: path.to_string(),
            location,
            driver: None,
        }
    }

    fn format(width: u32, height: u32, fourcc: &str) -> CameraFormat {
        CameraFormat {
            width,
            height,
            framerate: None,
            pixel_format: fourcc.to_string(),
        }
    }

    #[test]
    fn test_select_user_facing_prefers_front() {
        let devices = vec![
            device("/dev/video2", CameraLocation::Back),
            device("/dev/video0", CameraLocation::Front),
        ];
        let chosen = select_user_facing(&devices, None).unwrap();
        assert_eq!(chosen.path, "/dev/video0");
    }

    #[test]
    fn test_select_user_facing_honours_preference() {
        let devices = vec![
            device("/dev/video0", CameraLocation::Front),
            device("/dev/video2", CameraLocation::Back),
        ];
        let chosen = select_user_facing(&devices, Some("/dev/video2")).unwrap();
        assert_eq!(chosen.path, "/dev/video2");

        // Unknown preference falls back to ranking
        let chosen = select_user_facing(&devices, Some("/dev/video9")).unwrap();
        assert_eq!(chosen.path, "/dev/video0");
    }

    #[test]
    fn test_select_preview_format() {
        let formats = vec![
            format(1920, 1080, "YUYV"),
            format(640, 480, "MJPG"),
            format(640, 480, "YUYV"),
            format(320, 240, "H264"),
        ];
        let chosen = select_preview_format(&formats).unwrap();
        assert_eq!((chosen.width, chosen.height), (640, 480));
        assert_eq!(chosen.pixel_format, "YUYV");

        assert!(select_preview_format(&[format(640, 480, "H264")]).is_none());
    }
}
