// SPDX-License-Identifier: GPL-3.0-only

//! Static poster assets
//!
//! ```text
//! <root>/frame/frame.png          poster template
//! <root>/images/background.png    screen background
//! <root>/stickers/Frame NN.png    sticker catalog (NN = 25..=38)
//! ```

use crate::errors::{LayerRole, SceneError};
use crate::pipelines::photo::{CapturedPhoto, decode_data_url};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Sticker file names, in palette order
pub const STICKER_FILES: [&str; 14] = [
    "Frame 25.png",
    "Frame 26.png",
    "Frame 27.png",
    "Frame 28.png",
    "Frame 29.png",
    "Frame 30.png",
    "Frame 31.png",
    "Frame 32.png",
    "Frame 33.png",
    "Frame 34.png",
    "Frame 35.png",
    "Frame 36.png",
    "Frame 37.png",
    "Frame 38.png",
];

/// Resolves asset paths below a root directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLibrary {
    root: PathBuf,
}

impl AssetLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn frame_path(&self) -> PathBuf {
        self.root.join("frame").join("frame.png")
    }

    pub fn background_path(&self) -> PathBuf {
        self.root.join("images").join("background.png")
    }

    pub fn sticker_count(&self) -> usize {
        STICKER_FILES.len()
    }

    /// Path of a catalog sticker, `None` past the end of the catalog
    pub fn sticker_path(&self, index: usize) -> Option<PathBuf> {
        STICKER_FILES
            .get(index)
            .map(|name| self.root.join("stickers").join(name))
    }

    /// Short label for palettes ("Frame 25")
    pub fn sticker_label(index: usize) -> Option<&'static str> {
        STICKER_FILES
            .get(index)
            .map(|name| name.trim_end_matches(".png"))
    }
}

/// Read and decode an image asset
pub async fn load_image(path: PathBuf, role: LayerRole) -> Result<Arc<RgbaImage>, SceneError> {
    let bytes = tokio::fs::read(&path).await.map_err(|e| SceneError::AssetLoad {
        role,
        detail: format!("{}: {}", path.display(), e),
    })?;

    let image = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
        .await
        .map_err(|e| SceneError::AssetLoad {
            role,
            detail: e.to_string(),
        })?
        .map_err(|e| SceneError::AssetLoad {
            role,
            detail: format!("{}: {}", path.display(), e),
        })?;

    let image = image.to_rgba8();
    debug!(path = %path.display(), %role, width = image.width(), height = image.height(), "Asset loaded");
    Ok(Arc::new(image))
}

/// Decode a captured photo for use as a scene layer
pub async fn load_photo(photo: CapturedPhoto) -> Result<Arc<RgbaImage>, SceneError> {
    tokio::task::spawn_blocking(move || decode_data_url(&photo.data_url))
        .await
        .map_err(|e| SceneError::AssetLoad {
            role: LayerRole::Photo,
            detail: e.to_string(),
        })?
        .map(Arc::new)
        .map_err(|e| SceneError::AssetLoad {
            role: LayerRole::Photo,
            detail: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_sticker_catalog() {
        let assets = AssetLibrary::new("/srv/booth");
        assert_eq!(assets.sticker_count(), 14);
        assert_eq!(
            assets.sticker_path(0),
            Some(PathBuf::from("/srv/booth/stickers/Frame 25.png"))
        );
        assert_eq!(
            assets.sticker_path(13),
            Some(PathBuf::from("/srv/booth/stickers/Frame 38.png"))
        );
        assert_eq!(assets.sticker_path(14), None);
        assert_eq!(AssetLibrary::sticker_label(3), Some("Frame 28"));
        assert_eq!(assets.frame_path(), PathBuf::from("/srv/booth/frame/frame.png"));
    }

    #[tokio::test]
    async fn test_load_image_reports_role() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.png");
        match load_image(missing, LayerRole::Sticker).await {
            Err(SceneError::AssetLoad { role, .. }) => assert_eq!(role, LayerRole::Sticker),
            other => panic!("unexpected result: {:?}", other),
        }

        let garbage = dir.path().join("garbage.png");
        std::fs::write(&garbage, b"not a png").unwrap();
        assert!(load_image(garbage, LayerRole::Frame).await.is_err());

        let good = dir.path().join("good.png");
        RgbaImage::from_pixel(3, 5, Rgba([1, 2, 3, 255]))
            .save(&good)
            .unwrap();
        let image = load_image(good, LayerRole::Frame).await.unwrap();
        assert_eq!(image.dimensions(), (3, 5));
    }

    #[tokio::test]
    async fn test_load_photo_decodes_data_url() {
        let source = RgbaImage::from_pixel(6, 4, Rgba([10, 20, 30, 255]));
        let photo = CapturedPhoto::from_image(&source).unwrap();
        let image = load_photo(photo).await.unwrap();
        assert_eq!(*image, source);
    }
}
