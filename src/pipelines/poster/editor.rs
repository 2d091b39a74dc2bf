// SPDX-License-Identifier: GPL-3.0-only

//! Interactive poster editor
//!
//! A [`PosterEditor`] exists exactly while the Edit view is showing. It owns
//! the authoring [`Scene`] and a [`SceneToken`]; every asynchronous load is
//! handed a clone of the token and checks it before producing a result, and
//! the controller checks the generation before applying one. Releasing the
//! editor cancels the token, so loads that finish afterwards are dropped.

use super::assets::{AssetLibrary, load_image, load_photo};
use super::layout::PosterLayout;
use super::scene::{Layer, LayerId, LayerKind, Scene};
use crate::errors::{LayerRole, SceneError};
use crate::pipelines::photo::CapturedPhoto;
use image::RgbaImage;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// Cancellation token for one editor instance
#[derive(Debug, Clone)]
pub struct SceneToken {
    generation: u64,
    cancelled: Arc<AtomicBool>,
}

impl SceneToken {
    pub fn new(generation: u64) -> Self {
        Self {
            generation,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_live(&self) -> bool {
        !self.cancelled.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), SceneError> {
        if self.is_live() {
            Ok(())
        } else {
            Err(SceneError::Cancelled)
        }
    }
}

/// Load state of one base layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerLoad {
    Pending,
    Ready,
    Failed(String),
}

impl LayerLoad {
    /// `Pending` only counts while no base load is running
    fn needs_load(&self) -> bool {
        !matches!(self, LayerLoad::Ready)
    }
}

/// Result of loading the frame and photo
///
/// `None` means that layer was not requested by this load.
#[derive(Debug)]
pub struct BaseLayers {
    pub frame: Option<Result<Arc<RgbaImage>, SceneError>>,
    pub photo: Option<Result<Arc<RgbaImage>, SceneError>>,
}

/// Load the frame, then the photo
///
/// The two loads are sequenced so the stacking order never depends on which
/// decode finishes first.
pub async fn load_base_layers(
    assets: AssetLibrary,
    want_frame: bool,
    photo: Option<CapturedPhoto>,
    token: SceneToken,
) -> Result<BaseLayers, SceneError> {
    token.check()?;
    let frame = if want_frame {
        Some(load_image(assets.frame_path(), LayerRole::Frame).await)
    } else {
        None
    };

    token.check()?;
    let photo = match photo {
        Some(photo) => Some(load_photo(photo).await),
        None => None,
    };

    token.check()?;
    Ok(BaseLayers { frame, photo })
}

/// Load one catalog sticker
pub async fn load_sticker(
    assets: AssetLibrary,
    index: usize,
    token: SceneToken,
) -> Result<Arc<RgbaImage>, SceneError> {
    token.check()?;
    let path = assets.sticker_path(index).ok_or_else(|| SceneError::AssetLoad {
        role: LayerRole::Sticker,
        detail: format!("no sticker #{}", index),
    })?;
    let image = load_image(path, LayerRole::Sticker).await?;
    token.check()?;
    Ok(image)
}

/// Owner of the interactive poster surface
#[derive(Debug)]
pub struct PosterEditor {
    scene: Scene,
    layout: PosterLayout,
    token: SceneToken,
    frame: LayerLoad,
    /// `None` when there is no photo to place
    photo: Option<LayerLoad>,
    photo_source: Option<CapturedPhoto>,
    base_in_flight: bool,
    pending_stickers: usize,
    sticker_error: Option<String>,
    released: bool,
}

impl PosterEditor {
    /// Create the authoring surface; nothing is loaded yet
    pub fn open(generation: u64, layout: PosterLayout, photo: Option<CapturedPhoto>) -> Self {
        let size = layout.authoring_size;
        info!(
            generation,
            width = size.width,
            height = size.height,
            has_photo = photo.is_some(),
            "Poster surface created"
        );
        Self {
            scene: Scene::new(size.width, size.height),
            layout,
            token: SceneToken::new(generation),
            frame: LayerLoad::Pending,
            photo: photo.as_ref().map(|_| LayerLoad::Pending),
            photo_source: photo,
            base_in_flight: false,
            pending_stickers: 0,
            sticker_error: None,
            released: false,
        }
    }

    pub fn generation(&self) -> u64 {
        self.token.generation()
    }

    /// Whether a result tagged with `generation` may still be applied
    pub fn accepts(&self, generation: u64) -> bool {
        !self.released && self.token.is_live() && generation == self.token.generation()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn layout(&self) -> &PosterLayout {
        &self.layout
    }

    pub fn frame_status(&self) -> &LayerLoad {
        &self.frame
    }

    pub fn photo_status(&self) -> Option<&LayerLoad> {
        self.photo.as_ref()
    }

    pub fn sticker_error(&self) -> Option<&str> {
        self.sticker_error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.frame == LayerLoad::Pending
            || self.photo == Some(LayerLoad::Pending)
            || self.pending_stickers > 0
    }

    /// Messages for every layer that failed to load
    pub fn failures(&self) -> Vec<String> {
        let mut failures = Vec::new();
        if let LayerLoad::Failed(msg) = &self.frame {
            failures.push(msg.clone());
        }
        if let Some(LayerLoad::Failed(msg)) = &self.photo {
            failures.push(msg.clone());
        }
        if let Some(msg) = &self.sticker_error {
            failures.push(msg.clone());
        }
        failures
    }

    /// Start loading whichever base layers are not ready yet
    ///
    /// Used both for the initial load and for retries. Returns `None` when
    /// there is nothing left to load or a base load is still running.
    pub fn start_base_load(
        &mut self,
        assets: &AssetLibrary,
    ) -> Option<impl Future<Output = Result<BaseLayers, SceneError>> + Send + use<>> {
        if self.base_in_flight {
            debug!("Base layers already loading");
            return None;
        }
        let want_frame = self.frame.needs_load();
        let want_photo = self.photo.as_ref().is_some_and(LayerLoad::needs_load);
        if !want_frame && !want_photo {
            return None;
        }
        self.base_in_flight = true;

        if want_frame {
            self.frame = LayerLoad::Pending;
        }
        let photo = if want_photo {
            self.photo = Some(LayerLoad::Pending);
            self.photo_source.clone()
        } else {
            None
        };

        debug!(want_frame, want_photo, "Loading base layers");
        Some(load_base_layers(
            assets.clone(),
            want_frame,
            photo,
            self.token.clone(),
        ))
    }

    /// Place loaded base layers: frame at the bottom, photo right above it
    ///
    /// A layer that is already placed is never placed twice.
    pub fn apply_base_layers(&mut self, layers: BaseLayers) {
        self.base_in_flight = false;
        match layers.frame {
            None => {}
            Some(_) if self.frame == LayerLoad::Ready => debug!("Frame layer already placed"),
            Some(result) => match result {
                Ok(image) => {
                    let rect = self.layout.authoring_size.rect();
                    self.scene
                        .insert(0, Layer::new(LayerKind::Background, image, rect));
                    self.frame = LayerLoad::Ready;
                }
                Err(e) => {
                    warn!(error = %e, "Frame layer failed to load");
                    self.frame = LayerLoad::Failed(e.to_string());
                }
            }
        }

        self.apply_photo(layers.photo);
    }

    fn apply_photo(&mut self, result: Option<Result<Arc<RgbaImage>, SceneError>>) {
        if let Some(result) = result {
            if self.photo == Some(LayerLoad::Ready) {
                debug!("Photo layer already placed");
                return;
            }
            match result {
                Ok(image) => {
                    let index = self.scene.above_background();
                    self.scene.insert(
                        index,
                        Layer::new(LayerKind::Photo, image, self.layout.photo_rect),
                    );
                    self.photo = Some(LayerLoad::Ready);
                }
                Err(e) => {
                    warn!(error = %e, "Photo layer failed to load");
                    self.photo = Some(LayerLoad::Failed(e.to_string()));
                }
            }
        }
    }

    /// Mark every pending base layer as failed
    pub fn fail_base_load(&mut self, error: &SceneError) {
        warn!(error = %error, "Base layer load failed");
        self.base_in_flight = false;
        if self.frame == LayerLoad::Pending {
            self.frame = LayerLoad::Failed(error.to_string());
        }
        if self.photo == Some(LayerLoad::Pending) {
            self.photo = Some(LayerLoad::Failed(error.to_string()));
        }
    }

    /// Start loading a sticker from the catalog
    pub fn start_sticker_load(
        &mut self,
        assets: &AssetLibrary,
        index: usize,
    ) -> impl Future<Output = Result<Arc<RgbaImage>, SceneError>> + Send + use<> {
        self.pending_stickers += 1;
        load_sticker(assets.clone(), index, self.token.clone())
    }

    /// Place a loaded sticker centered on the surface and select it
    pub fn apply_sticker(
        &mut self,
        index: usize,
        result: Result<Arc<RgbaImage>, SceneError>,
    ) -> Option<LayerId> {
        self.pending_stickers = self.pending_stickers.saturating_sub(1);
        match result {
            Ok(image) => {
                let layer = Layer::sticker(
                    index,
                    image,
                    self.layout.authoring_center(),
                    self.layout.sticker_scale,
                );
                let id = self.scene.push(layer);
                self.scene.set_active(id);
                self.sticker_error = None;
                debug!(sticker = index, "Sticker placed");
                Some(id)
            }
            Err(e) => {
                warn!(sticker = index, error = %e, "Sticker failed to load");
                self.sticker_error = Some(e.to_string());
                None
            }
        }
    }

    /// Remove the selected sticker; anything else selected is left alone
    pub fn remove_selected(&mut self) -> bool {
        self.scene.remove_active().is_some()
    }

    /// Cancel in-flight loads and drop every layer
    ///
    /// Safe to call more than once. Never fails: problems are logged.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.token.cancel();

        if self.is_loading() {
            debug!(
                pending_stickers = self.pending_stickers,
                "Releasing poster surface with loads in flight"
            );
        }
        let layers = self.scene.layers().len();
        self.scene.clear();
        info!(generation = self.token.generation(), layers, "Poster surface released");
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl Drop for PosterEditor {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn asset_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("frame")).unwrap();
        std::fs::create_dir_all(dir.path().join("stickers")).unwrap();
        RgbaImage::from_pixel(50, 70, Rgba([200, 200, 200, 255]))
            .save(dir.path().join("frame/frame.png"))
            .unwrap();
        RgbaImage::from_pixel(40, 40, Rgba([255, 0, 0, 255]))
            .save(dir.path().join("stickers/Frame 25.png"))
            .unwrap();
        dir
    }

    fn photo() -> CapturedPhoto {
        CapturedPhoto::from_image(&RgbaImage::from_pixel(8, 6, Rgba([0, 0, 255, 255]))).unwrap()
    }

    #[tokio::test]
    async fn test_base_layers_stack_frame_then_photo() {
        let dir = asset_dir();
        let assets = AssetLibrary::new(dir.path());
        let mut editor = PosterEditor::open(1, PosterLayout::default(), Some(photo()));

        let load = editor.start_base_load(&assets).unwrap();
        assert!(editor.is_loading());
        let layers = load.await.unwrap();
        editor.apply_base_layers(layers);

        let kinds: Vec<_> = editor.scene().layers().iter().map(|l| l.kind).collect();
        assert_eq!(kinds, vec![LayerKind::Background, LayerKind::Photo]);
        assert_eq!(editor.frame_status(), &LayerLoad::Ready);
        assert_eq!(editor.photo_status(), Some(&LayerLoad::Ready));
        assert!(editor.start_base_load(&assets).is_none());

        let photo_rect = editor.scene().layers()[1].rect;
        assert_eq!(photo_rect, PosterLayout::default().photo_rect);
    }

    #[tokio::test]
    async fn test_missing_frame_is_retryable() {
        let dir = tempfile::tempdir().unwrap();
        let assets = AssetLibrary::new(dir.path());
        let mut editor = PosterEditor::open(1, PosterLayout::default(), Some(photo()));

        let layers = editor.start_base_load(&assets).unwrap().await.unwrap();
        editor.apply_base_layers(layers);
        assert!(matches!(editor.frame_status(), LayerLoad::Failed(_)));
        assert_eq!(editor.photo_status(), Some(&LayerLoad::Ready));
        assert_eq!(editor.failures().len(), 1);

        // asset shows up, retry loads only the frame
        let good = asset_dir();
        let assets = AssetLibrary::new(good.path());
        let layers = editor.start_base_load(&assets).unwrap().await.unwrap();
        assert!(layers.photo.is_none());
        editor.apply_base_layers(layers);

        let kinds: Vec<_> = editor.scene().layers().iter().map(|l| l.kind).collect();
        assert_eq!(kinds, vec![LayerKind::Background, LayerKind::Photo]);
        assert!(editor.failures().is_empty());
    }

    #[tokio::test]
    async fn test_retry_while_loading_starts_nothing() {
        let dir = asset_dir();
        let assets = AssetLibrary::new(dir.path());
        let mut editor = PosterEditor::open(1, PosterLayout::default(), Some(photo()));

        let load = editor.start_base_load(&assets).unwrap();
        assert!(editor.start_base_load(&assets).is_none());

        editor.apply_base_layers(load.await.unwrap());
        assert_eq!(editor.scene().layers().len(), 2);
        assert!(editor.start_base_load(&assets).is_none());
    }

    #[tokio::test]
    async fn test_duplicate_base_result_is_ignored() {
        let dir = asset_dir();
        let assets = AssetLibrary::new(dir.path());
        let mut editor = PosterEditor::open(1, PosterLayout::default(), Some(photo()));

        let first = editor.start_base_load(&assets).unwrap().await.unwrap();
        let second = load_base_layers(assets.clone(), true, Some(photo()), editor.token.clone())
            .await
            .unwrap();
        editor.apply_base_layers(first);
        editor.apply_base_layers(second);

        let kinds: Vec<_> = editor.scene().layers().iter().map(|l| l.kind).collect();
        assert_eq!(kinds, vec![LayerKind::Background, LayerKind::Photo]);
    }

    #[tokio::test]
    async fn test_sticker_is_centered_and_selected() {
        let dir = asset_dir();
        let assets = AssetLibrary::new(dir.path());
        let mut editor = PosterEditor::open(3, PosterLayout::default(), None);
        assert_eq!(editor.photo_status(), None);

        let result = editor.start_sticker_load(&assets, 0).await;
        let id = editor.apply_sticker(0, result).unwrap();

        let layer = editor.scene().active().unwrap();
        assert_eq!(layer.id(), id);
        assert_eq!(layer.rect.width, 20.0);
        assert_eq!(layer.rect.center(), editor.layout().authoring_center());

        assert!(editor.remove_selected());
        assert!(!editor.remove_selected());
    }

    #[tokio::test]
    async fn test_failed_sticker_is_reported() {
        let dir = asset_dir();
        let assets = AssetLibrary::new(dir.path());
        let mut editor = PosterEditor::open(1, PosterLayout::default(), None);
        let result = editor.start_sticker_load(&assets, 5).await;
        assert!(editor.apply_sticker(5, result).is_none());
        assert!(editor.sticker_error().is_some());
        assert!(!editor.is_loading());
    }

    #[tokio::test]
    async fn test_release_cancels_in_flight_loads() {
        let dir = asset_dir();
        let assets = AssetLibrary::new(dir.path());
        let mut editor = PosterEditor::open(7, PosterLayout::default(), None);
        let load = editor.start_base_load(&assets).unwrap();
        let token = editor.token.clone();

        editor.release();
        assert!(!token.is_live());
        assert!(!editor.accepts(7));
        assert!(matches!(load.await, Err(SceneError::Cancelled)));
        assert!(editor.scene().is_empty());

        // releasing twice is harmless
        editor.release();
        assert!(editor.is_released());
    }

    #[test]
    fn test_accepts_only_own_generation() {
        let editor = PosterEditor::open(4, PosterLayout::default(), None);
        assert!(editor.accepts(4));
        assert!(!editor.accepts(3));
    }
}
