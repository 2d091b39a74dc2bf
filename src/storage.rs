// SPDX-License-Identifier: MPL-2.0

//! Storage utilities for downloaded photos

use crate::errors::PhotoError;
use crate::pipelines::photo::CapturedPhoto;
use std::path::{Path, PathBuf};
use tracing::info;

/// Write a captured photo into `dir` as PNG
///
/// The photo already holds PNG bytes, so this only decodes the data URL
/// and writes them.
pub async fn save_photo(
    photo: CapturedPhoto,
    dir: PathBuf,
    file_name: String,
) -> Result<PathBuf, PhotoError> {
    let bytes = tokio::task::spawn_blocking(move || photo.png_bytes())
        .await
        .map_err(|e| PhotoError::SaveFailed(e.to_string()))??;

    tokio::fs::create_dir_all(&dir).await?;
    let path = dir.join(&file_name);
    tokio::fs::write(&path, &bytes).await?;
    info!(path = %path.display(), bytes = bytes.len(), "Photo saved");
    Ok(path)
}

/// Create a directory if needed and check it is writable
pub fn ensure_dir(dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let metadata = std::fs::metadata(dir)?;
    if metadata.permissions().readonly() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            format!("{} is read-only", dir.display()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[tokio::test]
    async fn test_save_photo_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let image = RgbaImage::from_pixel(5, 3, Rgba([7, 8, 9, 255]));
        let photo = CapturedPhoto::from_image(&image).unwrap();

        let path = save_photo(photo, dir.path().to_path_buf(), "anime-lens-photo-1.png".into())
            .await
            .unwrap();
        assert_eq!(path, dir.path().join("anime-lens-photo-1.png"));
        assert_eq!(image::open(&path).unwrap().to_rgba8(), image);
    }

    #[tokio::test]
    async fn test_save_photo_rejects_corrupt_data_url() {
        let dir = tempfile::tempdir().unwrap();
        let photo = CapturedPhoto {
            data_url: "data:image/png;base64,!!!".to_string(),
            width: 1,
            height: 1,
            captured_at: chrono::Local::now(),
        };
        let result = save_photo(photo, dir.path().to_path_buf(), "x.png".into()).await;
        assert!(matches!(result, Err(PhotoError::DecodeFailed(_))));
    }
}
