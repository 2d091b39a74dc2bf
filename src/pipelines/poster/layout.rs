// SPDX-License-Identifier: GPL-3.0-only

//! Poster layout configuration
//!
//! Every size and position the compositor uses lives here, expressed in
//! authoring units (the 500x735 editing surface) unless stated otherwise.

use serde::{Deserialize, Serialize};

/// A point in surface units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in surface units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle of the given size centered on `center`
    pub fn centered_on(center: Point, width: f32, height: f32) -> Self {
        Self::new(center.x - width / 2.0, center.y - height / 2.0, width, height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Scale every coordinate, e.g. from authoring to export units
    pub fn scaled(&self, factor: f32) -> Self {
        Self::new(
            self.x * factor,
            self.y * factor,
            self.width * factor,
            self.height * factor,
        )
    }
}

/// Pixel size of a rendering surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// The whole surface as a rectangle
    pub fn rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width as f32, self.height as f32)
    }
}

/// Geometry and typography of the wanted poster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PosterLayout {
    /// Interactive editing surface
    pub authoring_size: SurfaceSize,
    /// Where the captured photo sits (covers the frame's black cut-out)
    pub photo_rect: Rect,
    /// Size of the downloaded poster, in export pixels
    pub export_size: SurfaceSize,
    /// Stickers are placed at this fraction of their native size
    pub sticker_scale: f32,
    /// Center of the name text, in export pixels
    pub name_anchor: Point,
    /// Box the live name preview is drawn into
    pub name_box: Rect,
    /// Extra space after each name character, in em
    pub letter_spacing_em: f32,
    /// Vertical stretch applied to the name text
    pub name_stretch_y: f32,
    /// Ratio between on-screen preview text and export text
    pub display_font_scale: f32,
    /// File name of the downloaded poster
    pub export_file_name: String,
}

impl PosterLayout {
    /// Factor that maps authoring units to export pixels (759 / 500)
    pub fn export_multiplier(&self) -> f32 {
        self.export_size.width as f32 / self.authoring_size.width as f32
    }

    /// Center of the authoring surface, where new stickers land
    pub fn authoring_center(&self) -> Point {
        self.authoring_size.rect().center()
    }

    /// Reject geometry that cannot be rendered
    pub fn validate(&self) -> Result<(), String> {
        for (label, size) in [
            ("authoring_size", self.authoring_size),
            ("export_size", self.export_size),
        ] {
            if size.width == 0 || size.height == 0 {
                return Err(format!(
                    "{} must be non-zero, got {}x{}",
                    label, size.width, size.height
                ));
            }
        }
        if !(self.sticker_scale > 0.0 && self.sticker_scale.is_finite()) {
            return Err(format!("sticker_scale must be positive, got {}", self.sticker_scale));
        }
        if !self.export_size.rect().contains(self.name_anchor) {
            return Err(format!(
                "name_anchor ({}, {}) lies outside the {}x{} poster",
                self.name_anchor.x,
                self.name_anchor.y,
                self.export_size.width,
                self.export_size.height
            ));
        }
        Ok(())
    }
}

impl Default for PosterLayout {
    fn default() -> Self {
        Self {
            authoring_size: SurfaceSize::new(500, 735),
            photo_rect: Rect::new(40.0, 154.5, 410.0, 308.5),
            export_size: SurfaceSize::new(759, 1117),
            sticker_scale: 0.5,
            name_anchor: Point::new(379.5, 865.0),
            name_box: Rect::new(39.5, 527.0, 402.0, 85.5),
            // charSpacing of 10 thousandths of an em
            letter_spacing_em: 0.01,
            name_stretch_y: 1.5,
            display_font_scale: 0.659,
            export_file_name: "wanted-poster.png".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_multiplier_maps_authoring_width() {
        let layout = PosterLayout::default();
        let m = layout.export_multiplier();
        assert!((m - 759.0 / 500.0).abs() < f32::EPSILON);
        assert_eq!((500.0 * m).round() as u32, layout.export_size.width);
    }

    #[test]
    fn test_rect_helpers() {
        let rect = Rect::centered_on(Point::new(250.0, 367.5), 100.0, 50.0);
        assert_eq!(rect, Rect::new(200.0, 342.5, 100.0, 50.0));
        assert!(rect.contains(Point::new(250.0, 367.5)));
        assert!(!rect.contains(Point::new(199.0, 367.5)));
        assert_eq!(rect.translated(10.0, -2.5).center(), Point::new(260.0, 365.0));
    }

    #[test]
    fn test_validate_rejects_unrenderable_geometry() {
        assert!(PosterLayout::default().validate().is_ok());

        let mut layout = PosterLayout::default();
        layout.authoring_size.width = 0;
        assert!(layout.validate().unwrap_err().contains("authoring_size"));

        let mut layout = PosterLayout::default();
        layout.export_size = SurfaceSize::new(759, 0);
        assert!(layout.validate().unwrap_err().contains("export_size"));

        let mut layout = PosterLayout::default();
        layout.name_anchor = Point::new(379.5, 2000.0);
        assert!(layout.validate().unwrap_err().contains("name_anchor"));

        let mut layout = PosterLayout::default();
        layout.sticker_scale = 0.0;
        assert!(layout.validate().is_err());
    }

    #[test]
    fn test_layout_deserializes_partial_json() {
        let layout: PosterLayout =
            serde_json::from_str(r#"{"export_file_name":"poster.png"}"#).unwrap();
        assert_eq!(layout.export_file_name, "poster.png");
        assert_eq!(layout.authoring_size, SurfaceSize::new(500, 735));
    }
}
