// SPDX-License-Identifier: GPL-3.0-only

//! Still-image camera backend
//!
//! Serves a single image as if it were a live camera feed. Used for demos
//! on machines without a webcam, for the headless CLI and for tests.

use super::CameraBackend;
use super::types::*;
use image::{Rgba, RgbaImage};
use std::path::PathBuf;
use tracing::{debug, info};

/// Width of the generated test pattern
const PATTERN_WIDTH: u32 = 640;
/// Height of the generated test pattern
const PATTERN_HEIGHT: u32 = 480;

/// Backend that streams a fixed image
pub struct StillImageBackend {
    source: Option<PathBuf>,
    device: Option<CameraDevice>,
    format: Option<CameraFormat>,
    frame: Option<CameraFrame>,
}

impl StillImageBackend {
    /// Create a backend serving `source`, or a test pattern when `None`
    pub fn new(source: Option<PathBuf>) -> Self {
        Self {
            source,
            device: None,
            format: None,
            frame: None,
        }
    }

    fn device_path(&self) -> String {
        match &self.source {
            Some(path) => format!("still:{}", path.display()),
            None => "still:pattern".to_string(),
        }
    }

    fn load_image(&self, format: &CameraFormat) -> BackendResult<RgbaImage> {
        match &self.source {
            Some(path) => {
                let img = image::open(path).map_err(|e| {
                    BackendError::InitializationFailed(format!(
                        "Failed to load {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                Ok(img.to_rgba8())
            }
            None => Ok(test_pattern(format.width, format.height)),
        }
    }
}

impl CameraBackend for StillImageBackend {
    fn enumerate_cameras(&self) -> Vec<CameraDevice> {
        vec![CameraDevice {
            name: "Still image".to_string(),
            path: self.device_path(),
            location: CameraLocation::Front,
            driver: None,
        }]
    }

    fn get_formats(&self, _device: &CameraDevice) -> Vec<CameraFormat> {
        let (width, height) = match &self.source {
            Some(path) => image::image_dimensions(path).unwrap_or((PATTERN_WIDTH, PATTERN_HEIGHT)),
            None => (PATTERN_WIDTH, PATTERN_HEIGHT),
        };
        vec![CameraFormat {
            width,
            height,
            framerate: Some(Framerate::new(30, 1)),
            pixel_format: PixelFormat::RGBA.fourcc().to_string(),
        }]
    }

    fn initialize(&mut self, device: &CameraDevice, format: &CameraFormat) -> BackendResult<()> {
        if device.path != self.device_path() {
            return Err(BackendError::DeviceNotFound(device.path.clone()));
        }

        let image = self.load_image(format)?;
        info!(
            width = image.width(),
            height = image.height(),
            "Still image backend streaming"
        );

        self.frame = Some(CameraFrame::from_rgba(&image));
        self.format = Some(CameraFormat {
            width: image.width(),
            height: image.height(),
            framerate: format.framerate,
            pixel_format: PixelFormat::RGBA.fourcc().to_string(),
        });
        self.device = Some(device.clone());
        Ok(())
    }

    fn shutdown(&mut self) -> BackendResult<()> {
        if self.device.take().is_some() {
            debug!("Still image backend released");
        }
        self.format = None;
        self.frame = None;
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.device.is_some()
    }

    fn capture_photo(&self) -> BackendResult<CameraFrame> {
        if !self.is_initialized() {
            return Err(BackendError::NotInitialized);
        }
        self.preview_frame().ok_or(BackendError::NoFrame)
    }

    fn preview_frame(&self) -> Option<CameraFrame> {
        self.frame.clone()
    }

    fn backend_type(&self) -> CameraBackendType {
        CameraBackendType::Still
    }

    fn current_device(&self) -> Option<&CameraDevice> {
        self.device.as_ref()
    }

    fn current_format(&self) -> Option<&CameraFormat> {
        self.format.as_ref()
    }
}

/// Diagonal color gradient with a bright left edge, so mirroring is visible
pub fn test_pattern(width: u32, height: u32) -> RgbaImage {
    let width = width.max(1);
    let height = height.max(1);
    RgbaImage::from_fn(width, height, |x, y| {
        if x < width / 16 {
            return Rgba([255, 255, 255, 255]);
        }
        let r = (x * 255 / width) as u8;
        let g = (y * 255 / height) as u8;
        Rgba([r, g, 160, 255])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_backend_lifecycle() {
        let mut backend = StillImageBackend::new(None);
        let devices = backend.enumerate_cameras();
        assert_eq!(devices.len(), 1);

        let formats = backend.get_formats(&devices[0]);
        assert!(!backend.is_initialized());
        assert!(matches!(
            backend.capture_photo(),
            Err(BackendError::NotInitialized)
        ));

        backend.initialize(&devices[0], &formats[0]).unwrap();
        assert!(backend.is_initialized());
        let frame = backend.capture_photo().unwrap();
        assert_eq!((frame.width, frame.height), (PATTERN_WIDTH, PATTERN_HEIGHT));

        backend.shutdown().unwrap();
        assert!(!backend.is_initialized());
        assert!(backend.preview_frame().is_none());
    }

    #[test]
    fn test_missing_source_fails_initialization() {
        let mut backend = StillImageBackend::new(Some(PathBuf::from("/nonexistent/booth.png")));
        let device = backend.enumerate_cameras().remove(0);
        let format = backend.get_formats(&device).remove(0);
        assert!(backend.initialize(&device, &format).is_err());
        assert!(!backend.is_initialized());
    }
}
