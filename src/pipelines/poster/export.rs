// SPDX-License-Identifier: GPL-3.0-only

//! Poster export
//!
//! ```text
//! fonts ready → flatten authoring scene ×(759/500) → export scene
//!   (flattened raster + name text) → PNG → output directory
//! ```
//!
//! The export scene is a temporary second surface. It lives in an
//! [`ExportScene`] guard, so it is released whether rendering succeeds or
//! fails partway through.

use super::layout::{PosterLayout, Rect};
use super::scene::{Layer, LayerKind, Scene};
use super::text::{NameStyle, font_size_for_name, fonts_ready, render_name};
use crate::errors::ExportError;
use crate::pipelines::photo::encode_png;
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info};

/// A rendered poster, not yet written anywhere
#[derive(Debug, Clone)]
pub struct PosterExport {
    pub image: RgbaImage,
    pub name_font_size: u32,
}

/// A poster written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedPoster {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub name_font_size: u32,
}

#[cfg(test)]
thread_local! {
    /// Export scenes alive on this thread
    static LIVE_EXPORT_SCENES: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

/// Export-resolution scene, released when dropped
struct ExportScene {
    scene: Scene,
}

impl ExportScene {
    fn new(width: u32, height: u32) -> Self {
        debug!(width, height, "Export scene created");
        #[cfg(test)]
        LIVE_EXPORT_SCENES.with(|live| live.set(live.get() + 1));
        Self {
            scene: Scene::new(width, height),
        }
    }
}

impl Drop for ExportScene {
    fn drop(&mut self) {
        let layers = self.scene.layers().len();
        self.scene.clear();
        #[cfg(test)]
        LIVE_EXPORT_SCENES.with(|live| live.set(live.get() - 1));
        debug!(layers, "Export scene released");
    }
}

/// Build the final poster raster from the authoring scene and a name
///
/// Blocking; call from a blocking context.
pub fn compose_poster(
    authoring: &Scene,
    name: &str,
    layout: &PosterLayout,
) -> Result<PosterExport, ExportError> {
    if authoring.is_empty() {
        return Err(ExportError::NoScene);
    }

    // 735 × 759/500 is not a whole number; the full-bleed layer stretches
    // the flattened raster onto the exact export size
    let flattened = authoring.flatten(layout.export_multiplier());
    let size = layout.export_size;
    debug!(
        width = flattened.width(),
        height = flattened.height(),
        "Authoring scene flattened"
    );

    let mut export = ExportScene::new(size.width, size.height);
    export.scene.push(Layer::new(
        LayerKind::Background,
        Arc::new(flattened),
        size.rect(),
    ));

    if !size.rect().contains(layout.name_anchor) {
        return Err(ExportError::Render(format!(
            "name anchor ({}, {}) is off the {}x{} poster",
            layout.name_anchor.x, layout.name_anchor.y, size.width, size.height
        )));
    }

    let name_font_size = font_size_for_name(name);
    let style = NameStyle::new(
        name_font_size as f32,
        layout.letter_spacing_em,
        layout.name_stretch_y,
    );
    let text = render_name(name, &style);
    let rect = Rect::centered_on(
        layout.name_anchor,
        text.width() as f32,
        text.height() as f32,
    );
    export.scene.push(Layer::new(LayerKind::Text, Arc::new(text), rect));

    let image = export.scene.flatten(1.0);
    info!(
        width = image.width(),
        height = image.height(),
        name_font_size,
        "Poster rendered"
    );
    Ok(PosterExport {
        image,
        name_font_size,
    })
}

/// Wait for fonts, then render the poster off the async runtime
pub async fn render_poster(
    authoring: Scene,
    name: String,
    layout: PosterLayout,
) -> Result<PosterExport, ExportError> {
    fonts_ready().await.map_err(ExportError::Fonts)?;

    tokio::task::spawn_blocking(move || compose_poster(&authoring, &name, &layout))
        .await
        .map_err(|e| ExportError::Render(e.to_string()))?
}

/// Encode an image as PNG and write it into `dir`
pub async fn save_png(
    image: RgbaImage,
    dir: &Path,
    file_name: &str,
) -> Result<PathBuf, ExportError> {
    let png = tokio::task::spawn_blocking(move || encode_png(&image))
        .await
        .map_err(|e| ExportError::Encoding(e.to_string()))?
        .map_err(|e| ExportError::Encoding(e.to_string()))?;

    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(file_name);
    tokio::fs::write(&path, &png).await?;
    info!(path = %path.display(), bytes = png.len(), "Saved PNG");
    Ok(path)
}

/// Render the poster and write it to `output_dir`
pub async fn export_poster(
    authoring: Scene,
    name: String,
    layout: PosterLayout,
    output_dir: PathBuf,
) -> Result<SavedPoster, ExportError> {
    let file_name = layout.export_file_name.clone();
    let result = async {
        let export = render_poster(authoring, name, layout).await?;
        let (width, height) = export.image.dimensions();
        let path = save_png(export.image, &output_dir, &file_name).await?;
        Ok(SavedPoster {
            path,
            width,
            height,
            name_font_size: export.name_font_size,
        })
    }
    .await;

    if let Err(e) = &result {
        error!(error = %e, "Poster export failed");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipelines::poster::Point;
    use image::Rgba;

    fn authoring_scene(layout: &PosterLayout) -> Scene {
        let size = layout.authoring_size;
        let mut scene = Scene::new(size.width, size.height);
        scene.push(Layer::new(
            LayerKind::Background,
            Arc::new(RgbaImage::from_pixel(50, 73, Rgba([240, 220, 180, 255]))),
            size.rect(),
        ));
        scene
    }

    #[test]
    fn test_compose_produces_export_size() {
        let layout = PosterLayout::default();
        let export = compose_poster(&authoring_scene(&layout), "ZORO", &layout).unwrap();
        assert_eq!(export.image.dimensions(), (759, 1117));
        assert_eq!(export.name_font_size, 120);
        // corners come from the flattened template
        assert_eq!(export.image.get_pixel(0, 0).0, [240, 220, 180, 255]);
    }

    fn live_export_scenes() -> usize {
        LIVE_EXPORT_SCENES.with(|live| live.get())
    }

    #[test]
    fn test_export_scene_released_after_success() {
        let layout = PosterLayout::default();
        compose_poster(&authoring_scene(&layout), "LUFFY", &layout).unwrap();
        assert_eq!(live_export_scenes(), 0);
    }

    #[test]
    fn test_export_scene_released_when_composition_fails_midway() {
        let mut layout = PosterLayout::default();
        let scene = authoring_scene(&layout);
        layout.name_anchor = Point::new(379.5, 5000.0);

        match compose_poster(&scene, "LUFFY", &layout) {
            Err(ExportError::Render(msg)) => assert!(msg.contains("name anchor")),
            other => panic!("unexpected result: {:?}", other.map(|e| e.name_font_size)),
        }
        assert_eq!(live_export_scenes(), 0);
    }

    #[test]
    fn test_compose_rejects_empty_scene() {
        let layout = PosterLayout::default();
        let size = layout.authoring_size;
        let empty = Scene::new(size.width, size.height);
        assert!(matches!(
            compose_poster(&empty, "ZORO", &layout),
            Err(ExportError::NoScene)
        ));
    }

    #[test]
    fn test_compose_honours_custom_export_size() {
        let mut layout = PosterLayout::default();
        let scene = authoring_scene(&layout);
        layout.export_size.height = 900;
        let export = compose_poster(&scene, "NAMI", &layout).unwrap();
        assert_eq!(export.image.dimensions(), (759, 900));
    }

    #[tokio::test]
    async fn test_save_png_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("out");
        let image = RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255]));
        let path = save_png(image.clone(), &target, "wanted-poster.png")
            .await
            .unwrap();
        assert_eq!(path, target.join("wanted-poster.png"));
        assert_eq!(image::open(&path).unwrap().to_rgba8(), image);
    }
}
