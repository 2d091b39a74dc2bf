// SPDX-License-Identifier: GPL-3.0-only
//! Pixel format conversion for camera frames
//!
//! Every backend hands frames over in the device's native layout; the
//! capture pipeline and the terminal preview both want tightly packed RGBA.

use super::types::{CameraFrame, PixelFormat};
use image::RgbaImage;

/// Convert a camera frame of any supported format into an RGBA image
pub fn frame_to_rgba(frame: &CameraFrame) -> Result<RgbaImage, String> {
    if frame.width == 0 || frame.height == 0 {
        return Err(format!(
            "Frame has empty dimensions {}x{}",
            frame.width, frame.height
        ));
    }

    if frame.format == PixelFormat::MJPEG {
        let decoded = image::load_from_memory_with_format(frame.data_slice(), image::ImageFormat::Jpeg)
            .map_err(|e| format!("MJPEG decode failed: {}", e))?;
        return Ok(decoded.to_rgba8());
    }

    let bpp = frame.format.bytes_per_pixel().unwrap_or(4);
    let row_bytes = (frame.width * bpp) as usize;
    let stride = if frame.stride == 0 {
        row_bytes
    } else {
        frame.stride as usize
    };
    let needed = stride * (frame.height as usize - 1) + row_bytes;
    let data = frame.data_slice();
    if data.len() < needed {
        return Err(format!(
            "Frame buffer too small: got {} bytes, need {}",
            data.len(),
            needed
        ));
    }

    let mut rgba = Vec::with_capacity((frame.width * frame.height * 4) as usize);
    for y in 0..frame.height as usize {
        let row = &data[y * stride..y * stride + row_bytes];
        match frame.format {
            PixelFormat::RGBA => rgba.extend_from_slice(row),
            PixelFormat::BGRA => {
                for px in row.chunks_exact(4) {
                    rgba.extend_from_slice(&[px[2], px[1], px[0], px[3]]);
                }
            }
            PixelFormat::RGB24 => {
                for px in row.chunks_exact(3) {
                    rgba.extend_from_slice(&[px[0], px[1], px[2], 255]);
                }
            }
            PixelFormat::Gray8 => {
                for &v in row {
                    rgba.extend_from_slice(&[v, v, v, 255]);
                }
            }
            PixelFormat::YUYV => {
                // Y0 U Y1 V - two pixels share chroma
                for chunk in row.chunks_exact(4) {
                    push_yuv_pair(&mut rgba, chunk[0], chunk[2], chunk[1], chunk[3]);
                }
            }
            PixelFormat::UYVY => {
                // U Y0 V Y1
                for chunk in row.chunks_exact(4) {
                    push_yuv_pair(&mut rgba, chunk[1], chunk[3], chunk[0], chunk[2]);
                }
            }
            // decoded as a whole above
            PixelFormat::MJPEG => {}
        }
    }

    RgbaImage::from_raw(frame.width, frame.height, rgba)
        .ok_or_else(|| "Converted buffer does not match frame size".to_string())
}

fn push_yuv_pair(rgba: &mut Vec<u8>, y0: u8, y1: u8, u: u8, v: u8) {
    for luma in [y0, y1] {
        let (r, g, b) = yuv_to_rgb(luma, u, v);
        rgba.extend_from_slice(&[r, g, b, 255]);
    }
}

/// Convert YUV (BT.601) to RGB
pub fn yuv_to_rgb(y: u8, u: u8, v: u8) -> (u8, u8, u8) {
    let y = y as f32;
    let u = u as f32 - 128.0;
    let v = v as f32 - 128.0;

    let r = (y + 1.402 * v).clamp(0.0, 255.0) as u8;
    let g = (y - 0.344136 * u - 0.714136 * v).clamp(0.0, 255.0) as u8;
    let b = (y + 1.772 * u).clamp(0.0, 255.0) as u8;

    (r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Instant;

    fn frame(format: PixelFormat, width: u32, height: u32, stride: u32, data: Vec<u8>) -> CameraFrame {
        CameraFrame {
            width,
            height,
            data: Arc::from(data),
            format,
            stride,
            captured_at: Instant::now(),
        }
    }

    #[test]
    fn test_bgra_swaps_channels() {
        let f = frame(PixelFormat::BGRA, 1, 1, 4, vec![10, 20, 30, 255]);
        let img = frame_to_rgba(&f).unwrap();
        assert_eq!(img.get_pixel(0, 0).0, [30, 20, 10, 255]);
    }

    #[test]
    fn test_stride_padding_is_skipped() {
        // 1x2 RGB24 with 2 bytes of padding per row
        let data = vec![1, 2, 3, 0, 0, 4, 5, 6, 0, 0];
        let f = frame(PixelFormat::RGB24, 1, 2, 5, data);
        let img = frame_to_rgba(&f).unwrap();
        assert_eq!(img.get_pixel(0, 0).0, [1, 2, 3, 255]);
        assert_eq!(img.get_pixel(0, 1).0, [4, 5, 6, 255]);
    }

    #[test]
    fn test_yuyv_neutral_chroma_is_gray() {
        let f = frame(PixelFormat::YUYV, 2, 1, 4, vec![100, 128, 200, 128]);
        let img = frame_to_rgba(&f).unwrap();
        assert_eq!(img.get_pixel(0, 0).0, [100, 100, 100, 255]);
        assert_eq!(img.get_pixel(1, 0).0, [200, 200, 200, 255]);
    }

    #[test]
    fn test_short_buffer_is_rejected() {
        let f = frame(PixelFormat::RGBA, 4, 4, 16, vec![0; 10]);
        assert!(frame_to_rgba(&f).is_err());
    }
}
