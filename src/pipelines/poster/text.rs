// SPDX-License-Identifier: GPL-3.0-only

//! Name text sizing and rasterization
//!
//! The name is drawn bold and serif, with a little tracking between the
//! characters, then stretched vertically. Shaping and glyph rasterization
//! use cosmic-text with one process-wide font system; loading the system
//! font database is slow, so it happens once, off the UI thread, in
//! [`fonts_ready`].

use cosmic_text::{Attrs, Buffer, Color, Family, FontSystem, Metrics, Shaping, SwashCache, Weight};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use once_cell::sync::Lazy;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, warn};

static FONT_SYSTEM: Lazy<Mutex<FontSystem>> = Lazy::new(|| Mutex::new(FontSystem::new()));
static SWASH_CACHE: Lazy<Mutex<SwashCache>> = Lazy::new(|| Mutex::new(SwashCache::new()));

/// (maximum character count, font size in px), checked in order
const NAME_FONT_STEPS: [(usize, u32); 7] = [
    (4, 120),
    (6, 100),
    (8, 80),
    (10, 75),
    (14, 55),
    (18, 40),
    (22, 32),
];

/// Font size for names longer than every step
const NAME_FONT_MIN: u32 = 28;

/// Line height relative to font size
const LINE_HEIGHT: f32 = 1.16;

/// Export font size for a name, chosen by its character count
pub fn font_size_for_name(name: &str) -> u32 {
    let len = name.chars().count();
    NAME_FONT_STEPS
        .iter()
        .find(|(max, _)| len <= *max)
        .map_or(NAME_FONT_MIN, |(_, size)| *size)
}

/// On-screen preview size derived from the export size
pub fn display_font_size(export_size: u32, scale: f32) -> u32 {
    (export_size as f64 * scale as f64).round() as u32
}

/// How the name is drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NameStyle {
    pub font_size: f32,
    /// Extra space after each character, in em
    pub letter_spacing_em: f32,
    pub stretch_y: f32,
    pub color: [u8; 4],
}

impl NameStyle {
    pub fn new(font_size: f32, letter_spacing_em: f32, stretch_y: f32) -> Self {
        Self {
            font_size,
            letter_spacing_em,
            stretch_y,
            color: [0, 0, 0, 255],
        }
    }
}

/// Make sure the shared font system has loaded the system fonts
///
/// Returns the number of font faces available. Having none is not an
/// error: the poster is still exported, just without a visible name.
pub async fn fonts_ready() -> Result<usize, String> {
    let faces = tokio::task::spawn_blocking(|| {
        let font_system = FONT_SYSTEM.lock().unwrap_or_else(PoisonError::into_inner);
        font_system.db().len()
    })
    .await
    .map_err(|e| e.to_string())?;

    if faces == 0 {
        warn!("No system fonts found, the name will not be drawn");
    } else {
        info!(faces, "Fonts ready");
    }
    Ok(faces)
}

/// One shaped character ready to be blitted
struct Glyph {
    pixels: Vec<(i32, i32, Rgba<u8>)>,
    advance: f32,
}

fn shape_char(
    font_system: &mut FontSystem,
    swash_cache: &mut SwashCache,
    ch: char,
    style: &NameStyle,
) -> Glyph {
    let metrics = Metrics::new(style.font_size, style.font_size * LINE_HEIGHT);
    let mut buffer = Buffer::new(font_system, metrics);
    buffer.set_size(font_system, Some(style.font_size * 4.0), None);

    let attrs = Attrs::new().family(Family::Serif).weight(Weight::BOLD);
    let text = ch.to_string();
    buffer.set_text(font_system, &text, &attrs, Shaping::Advanced, None);
    buffer.shape_until_scroll(font_system, false);

    let advance = buffer
        .layout_runs()
        .flat_map(|run| run.glyphs.iter())
        .map(|glyph| glyph.x + glyph.w)
        .fold(0.0f32, f32::max);

    let [r, g, b, a] = style.color;
    let mut pixels = Vec::new();
    buffer.draw(
        font_system,
        swash_cache,
        Color::rgba(r, g, b, a),
        |x, y, w, h, color| {
            if color.a() == 0 {
                return;
            }
            let px = Rgba([color.r(), color.g(), color.b(), color.a()]);
            for dy in 0..h as i32 {
                for dx in 0..w as i32 {
                    pixels.push((x + dx, y + dy, px));
                }
            }
        },
    );

    Glyph { pixels, advance }
}

/// Rasterize a name onto a transparent image sized to fit it
///
/// The returned image is already stretched vertically; callers only need
/// to center it on the anchor.
pub fn render_name(text: &str, style: &NameStyle) -> RgbaImage {
    let mut font_system = FONT_SYSTEM.lock().unwrap_or_else(PoisonError::into_inner);
    let mut swash_cache = SWASH_CACHE.lock().unwrap_or_else(PoisonError::into_inner);

    let tracking = style.font_size * style.letter_spacing_em;
    let glyphs: Vec<Glyph> = text
        .chars()
        .map(|ch| shape_char(&mut font_system, &mut swash_cache, ch, style))
        .collect();
    drop(swash_cache);
    drop(font_system);

    let width: f32 = glyphs.iter().map(|g| g.advance + tracking).sum::<f32>() - tracking;
    let width = width.ceil().max(1.0) as u32;
    let height = (style.font_size * LINE_HEIGHT).ceil().max(1.0) as u32;
    let mut canvas = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));

    let mut pen = 0.0f32;
    for glyph in &glyphs {
        let offset = pen.round() as i32;
        for &(x, y, px) in &glyph.pixels {
            let (x, y) = (x + offset, y);
            if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
                continue;
            }
            let dst = canvas.get_pixel_mut(x as u32, y as u32);
            // single fill colour, so coverage is all that accumulates
            if px.0[3] > dst.0[3] {
                *dst = px;
            }
        }
        pen += glyph.advance + tracking;
    }

    let stretched_height = (height as f32 * style.stretch_y).round().max(1.0) as u32;
    debug!(
        text,
        width,
        height = stretched_height,
        font_size = style.font_size,
        "Name rendered"
    );
    if stretched_height == height {
        canvas
    } else {
        imageops::resize(&canvas, width, stretched_height, FilterType::Triangle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_size_boundaries() {
        let cases = [
            (1, 120),
            (4, 120),
            (5, 100),
            (6, 100),
            (7, 80),
            (8, 80),
            (10, 75),
            (11, 55),
            (14, 55),
            (18, 40),
            (22, 32),
            (23, 28),
            (30, 28),
        ];
        for (len, expected) in cases {
            let name = "A".repeat(len);
            assert_eq!(font_size_for_name(&name), expected, "length {}", len);
        }
    }

    #[test]
    fn test_font_size_counts_characters_not_bytes() {
        // four characters, eight bytes
        assert_eq!(font_size_for_name("ÉÉÉÉ"), 120);
        assert_eq!(font_size_for_name(""), 120);
    }

    #[test]
    fn test_display_font_size_rounds() {
        assert_eq!(display_font_size(120, 0.659), 79);
        assert_eq!(display_font_size(100, 0.659), 66);
        assert_eq!(display_font_size(75, 0.659), 49);
        assert_eq!(display_font_size(55, 0.659), 36);
        assert_eq!(display_font_size(28, 0.659), 18);
    }

    #[test]
    fn test_empty_name_renders_stretched_blank() {
        let style = NameStyle::new(20.0, 0.01, 1.5);
        let image = render_name("", &style);
        assert_eq!(image.width(), 1);
        assert_eq!(image.height(), ((20.0f32 * LINE_HEIGHT).ceil() * 1.5).round() as u32);
        assert!(image.pixels().all(|p| p.0[3] == 0));
    }
}
