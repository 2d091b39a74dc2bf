// SPDX-License-Identifier: MPL-2.0

//! Still photo capture pipeline
//!
//! ```text
//! Camera Frame → RGBA conversion → Horizontal mirror → PNG → data URL
//! ```
//!
//! The live preview is shown mirrored, so the still is mirrored too: the
//! user gets exactly the picture they saw. Capture is synchronous; a
//! 640x480 frame converts and encodes in a few milliseconds.

pub mod encoding;

pub use encoding::{decode_data_url, encode_png, png_data_url};

use crate::backends::camera::format_converters::frame_to_rgba;
use crate::backends::camera::types::CameraFrame;
use crate::errors::PhotoError;
use chrono::{DateTime, Local};
use image::RgbaImage;
use tracing::{debug, info};

/// A captured still, encoded as a PNG data URL
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedPhoto {
    /// `data:image/png;base64,...`
    pub data_url: String,
    pub width: u32,
    pub height: u32,
    pub captured_at: DateTime<Local>,
}

impl CapturedPhoto {
    /// Encode an image as a captured photo
    pub fn from_image(image: &RgbaImage) -> Result<Self, PhotoError> {
        let png = encode_png(image)?;
        Ok(Self {
            data_url: png_data_url(&png),
            width: image.width(),
            height: image.height(),
            captured_at: Local::now(),
        })
    }

    /// Raw PNG bytes of the photo
    pub fn png_bytes(&self) -> Result<Vec<u8>, PhotoError> {
        encoding::data_url_bytes(&self.data_url)
    }

    /// Decode the photo back into pixels
    pub fn to_image(&self) -> Result<RgbaImage, PhotoError> {
        decode_data_url(&self.data_url)
    }
}

/// Photo capture pipeline
#[derive(Debug, Clone, Copy)]
pub struct PhotoPipeline {
    /// Mirror stills horizontally to match the mirrored preview
    mirror: bool,
}

impl PhotoPipeline {
    /// Create a pipeline that mirrors like the preview
    pub fn new() -> Self {
        Self { mirror: true }
    }

    /// Create a pipeline with explicit mirroring
    pub fn with_mirror(mirror: bool) -> Self {
        Self { mirror }
    }

    /// Turn a camera frame into a captured photo
    ///
    /// Every failure is reported; nothing is silently dropped.
    pub fn capture(&self, frame: &CameraFrame) -> Result<CapturedPhoto, PhotoError> {
        let mut image = frame_to_rgba(frame).map_err(PhotoError::ConversionFailed)?;

        if self.mirror {
            image::imageops::flip_horizontal_in_place(&mut image);
        }

        let photo = CapturedPhoto::from_image(&image)?;
        debug!(bytes = photo.data_url.len(), "Photo encoded");
        info!(
            width = photo.width,
            height = photo.height,
            mirrored = self.mirror,
            "Photo captured"
        );
        Ok(photo)
    }
}

impl Default for PhotoPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::still::test_pattern;
    use image::Rgba;

    #[test]
    fn test_capture_mirrors_horizontally() {
        let mut source = RgbaImage::from_pixel(4, 2, Rgba([0, 0, 0, 255]));
        source.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        let frame = CameraFrame::from_rgba(&source);

        let photo = PhotoPipeline::new().capture(&frame).unwrap();
        let image = photo.to_image().unwrap();
        assert_eq!((photo.width, photo.height), (4, 2));
        assert_eq!(image.get_pixel(3, 0).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0, 255]);
    }

    #[test]
    fn test_capture_without_mirror_keeps_orientation() {
        let source = test_pattern(32, 8);
        let frame = CameraFrame::from_rgba(&source);
        let photo = PhotoPipeline::with_mirror(false).capture(&frame).unwrap();
        assert_eq!(photo.to_image().unwrap(), source);
    }

    #[test]
    fn test_capture_reports_bad_frames() {
        let mut frame = CameraFrame::from_rgba(&test_pattern(8, 8));
        frame.height = 64;
        assert!(matches!(
            PhotoPipeline::new().capture(&frame),
            Err(PhotoError::ConversionFailed(_))
        ));
    }
}
