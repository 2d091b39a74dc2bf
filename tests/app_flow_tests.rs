// SPDX-License-Identifier: GPL-3.0-only

//! End-to-end booth flows driven through `AppModel::run`

use image::{Rgba, RgbaImage};
use nakama_booth::app::{AppModel, Message, ViewMode};
use nakama_booth::backends::camera::still::test_pattern;
use nakama_booth::backends::camera::{
    BackendError, BackendResult, CameraBackend, CameraBackendType, CameraDevice, CameraFormat,
    CameraFrame, CameraLocation, CameraSessionManager, Framerate, PixelFormat,
};
use nakama_booth::config::Config;
use nakama_booth::constants::messages;
use nakama_booth::pipelines::photo::CapturedPhoto;
use nakama_booth::pipelines::poster::LayerKind;
use std::path::Path;
use tempfile::TempDir;

fn write_assets(root: &Path) {
    std::fs::create_dir_all(root.join("frame")).unwrap();
    std::fs::create_dir_all(root.join("stickers")).unwrap();
    RgbaImage::from_pixel(500, 735, Rgba([230, 210, 170, 255]))
        .save(root.join("frame").join("frame.png"))
        .unwrap();
    RgbaImage::from_pixel(120, 80, Rgba([200, 30, 30, 255]))
        .save(root.join("stickers").join("Frame 25.png"))
        .unwrap();
}

fn config(dir: &TempDir) -> Config {
    let assets = dir.path().join("assets");
    write_assets(&assets);
    Config {
        backend: CameraBackendType::Still,
        asset_dir: assets,
        output_dir: Some(dir.path().join("out")),
        ..Config::default()
    }
}

fn booth_with_photo(dir: &TempDir) -> AppModel {
    let mut model = AppModel::from_config(config(dir));
    let photo = CapturedPhoto::from_image(&test_pattern(64, 48)).unwrap();
    model.photos.insert(photo);
    model
}

#[tokio::test(start_paused = true)]
async fn test_zoro_poster_end_to_end() {
    let dir = TempDir::new().unwrap();
    let mut model = AppModel::from_config(config(&dir));

    model.run(Message::StartCamera).await;
    assert!(model.is_camera_active());
    assert!(model.error.is_none());

    model.run(Message::StartCountdown).await;
    assert_eq!(model.photos.len(), 1);
    assert!(!model.capture_enabled(), "booth holds a single photo");
    assert!(
        model
            .photos
            .latest()
            .unwrap()
            .data_url
            .starts_with("data:image/png;base64,")
    );

    model.run(Message::OpenNameEntry).await;
    assert_eq!(model.mode, ViewMode::NameEntry);
    assert!(!model.is_camera_active(), "camera released before editing");

    model.run(Message::NameChanged("zoro".into())).await;
    assert_eq!(model.user_name, "ZORO");

    model.run(Message::SubmitName).await;
    assert_eq!(model.mode, ViewMode::Edit);
    let editor = model.editor.as_ref().unwrap();
    assert!(!editor.is_loading());
    assert!(editor.failures().is_empty(), "{:?}", editor.failures());
    assert_eq!(editor.scene().layers().len(), 2);

    model.run(Message::AddSticker(0)).await;
    assert_eq!(model.editor.as_ref().unwrap().scene().sticker_count(), 1);

    model.run(Message::DownloadPoster).await;
    assert!(model.alert.is_none(), "{:?}", model.alert);
    assert!(!model.exporting);

    let saved = model.last_export.as_ref().unwrap();
    assert_eq!((saved.width, saved.height), (759, 1117));
    assert_eq!(saved.name_font_size, 120);
    assert_eq!(saved.path, dir.path().join("out").join("wanted-poster.png"));

    let written = image::open(&saved.path).unwrap();
    assert_eq!((written.width(), written.height()), (759, 1117));
}

#[tokio::test(start_paused = true)]
async fn test_countdown_fires_once_after_three_ticks() {
    let dir = TempDir::new().unwrap();
    let mut model = AppModel::from_config(config(&dir));
    model.run(Message::StartCamera).await;

    let mut task = model.update(Message::StartCountdown);
    assert_eq!(model.capture_button_label(), "3...");
    assert!(!model.capture_enabled());

    // A second press while counting does nothing
    assert!(model.update(Message::StartCountdown).is_none());

    let mut ticks = 0;
    while !task.is_none() {
        let produced = task.collect().await;
        assert_eq!(produced.len(), 1);
        task = nakama_booth::app::Task::none();
        for message in produced {
            assert!(matches!(message, Message::CountdownTick));
            ticks += 1;
            task = model.update(message);
        }
        if ticks < 3 {
            assert_eq!(model.capture_button_label(), format!("{}...", 3 - ticks));
            assert!(model.photos.is_empty());
        }
    }

    assert_eq!(ticks, 3);
    assert_eq!(model.photos.len(), 1);
    assert!(!model.countdown.is_running());
    assert_eq!(model.capture_button_label(), "Capture (1/1)");
}

#[tokio::test(start_paused = true)]
async fn test_deleting_photo_reenables_capture() {
    let dir = TempDir::new().unwrap();
    let mut model = AppModel::from_config(config(&dir));
    model.run(Message::StartCamera).await;
    model.run(Message::StartCountdown).await;
    assert!(!model.capture_enabled());

    model.run(Message::DeletePhoto(0)).await;
    assert!(model.photos.is_empty());
    assert!(model.capture_enabled());
    assert_eq!(model.photos_label(), "Photos (0/1)");
}

async fn open_editor(model: &mut AppModel, name: &str) {
    model.run(Message::OpenNameEntry).await;
    model.run(Message::NameChanged(name.into())).await;
    model.run(Message::SubmitName).await;
    assert_eq!(model.mode, ViewMode::Edit);
}

#[tokio::test]
async fn test_failed_download_alerts_and_keeps_editor() {
    let dir = TempDir::new().unwrap();
    let mut model = booth_with_photo(&dir);
    let blocker = dir.path().join("not-a-directory");
    std::fs::write(&blocker, b"occupied").unwrap();
    model.config.output_dir = Some(blocker.clone());

    open_editor(&mut model, "chopper").await;
    model.run(Message::AddSticker(0)).await;
    model.run(Message::DownloadPoster).await;

    let alert = model.alert.clone().unwrap();
    assert!(alert.starts_with(messages::EXPORT_FAILED_PREFIX), "{}", alert);
    assert!(alert.len() > messages::EXPORT_FAILED_PREFIX.len());
    assert!(!model.exporting);
    assert!(model.last_export.is_none());
    assert_eq!(model.mode, ViewMode::Edit);

    let editor = model.editor.as_ref().unwrap();
    assert_eq!(editor.scene().layers().len(), 3);
    assert_eq!(editor.scene().sticker_count(), 1);

    // fixing the destination lets the same poster download
    model.run(Message::DismissAlert).await;
    model.config.output_dir = Some(dir.path().join("out"));
    model.run(Message::DownloadPoster).await;
    assert!(model.alert.is_none(), "{:?}", model.alert);
    assert!(model.last_export.is_some());
}

#[tokio::test]
async fn test_selecting_a_sticker_raises_it() {
    let dir = TempDir::new().unwrap();
    let mut model = booth_with_photo(&dir);
    open_editor(&mut model, "franky").await;

    model.run(Message::AddSticker(0)).await;
    model.run(Message::AddSticker(0)).await;
    // move the upper sticker off the shared center
    model
        .run(Message::MoveSelected { dx: 150.0, dy: 0.0 })
        .await;

    let center = model.editor.as_ref().unwrap().layout().authoring_center();
    model.run(Message::SelectAt(center)).await;

    let scene = model.editor.as_ref().unwrap().scene();
    let top = scene.layers().last().unwrap();
    assert_eq!(top.kind, LayerKind::Sticker(0));
    assert_eq!(top.rect.center(), center);
    assert_eq!(scene.active().map(|l| l.id()), Some(top.id()));
}

#[tokio::test]
async fn test_whitespace_name_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mut model = booth_with_photo(&dir);

    model.run(Message::OpenNameEntry).await;
    model.run(Message::NameChanged("   ".into())).await;
    model.run(Message::SubmitName).await;

    assert_eq!(model.mode, ViewMode::NameEntry);
    assert_eq!(model.alert.as_deref(), Some(messages::EMPTY_NAME));
    assert!(model.editor.is_none());

    model.run(Message::DismissAlert).await;
    assert!(model.alert.is_none());
}

#[tokio::test]
async fn test_name_entry_needs_a_photo() {
    let dir = TempDir::new().unwrap();
    let mut model = AppModel::from_config(config(&dir));
    model.run(Message::OpenNameEntry).await;
    assert_eq!(model.mode, ViewMode::Camera);
}

#[tokio::test]
async fn test_editor_cycles_release_the_surface() {
    let dir = TempDir::new().unwrap();
    let mut model = booth_with_photo(&dir);
    let mut generations = Vec::new();

    for _ in 0..3 {
        model.run(Message::OpenNameEntry).await;
        model.run(Message::NameChanged("Luffy".into())).await;
        model.run(Message::SubmitName).await;
        assert_eq!(model.mode, ViewMode::Edit);
        let editor = model.editor.as_ref().unwrap();
        assert_eq!(editor.scene().layers().len(), 2);
        generations.push(editor.generation());

        model.run(Message::CloseEditor).await;
        assert_eq!(model.mode, ViewMode::Camera);
        assert!(model.editor.is_none());
        assert!(model.user_name.is_empty());
        assert_eq!(model.photos.len(), 1, "closing keeps the photo");
    }

    generations.dedup();
    assert_eq!(generations.len(), 3);
}

#[tokio::test]
async fn test_late_loads_from_a_closed_surface_are_ignored() {
    let dir = TempDir::new().unwrap();
    let mut model = booth_with_photo(&dir);

    model.run(Message::OpenNameEntry).await;
    model.run(Message::NameChanged("nami".into())).await;
    let stale = model.update(Message::SubmitName);
    model.run(Message::CloseEditor).await;

    model.run(Message::OpenNameEntry).await;
    model.run(Message::NameChanged("nami".into())).await;
    model.run(Message::SubmitName).await;
    assert_eq!(model.editor.as_ref().unwrap().scene().layers().len(), 2);

    for message in stale.collect().await {
        model.update(message);
    }
    assert_eq!(model.editor.as_ref().unwrap().scene().layers().len(), 2);
}

#[tokio::test]
async fn test_retry_during_initial_load_keeps_one_frame_and_photo() {
    let dir = TempDir::new().unwrap();
    let mut model = booth_with_photo(&dir);

    model.run(Message::OpenNameEntry).await;
    model.run(Message::NameChanged("robin".into())).await;
    let initial = model.update(Message::SubmitName);
    let retry = model.update(Message::RetryLayers);
    assert!(retry.is_none());

    for message in initial.collect().await {
        model.update(message);
    }
    for message in retry.collect().await {
        model.update(message);
    }

    let editor = model.editor.as_ref().unwrap();
    assert_eq!(editor.scene().layers().len(), 2);
    assert!(editor.failures().is_empty());
}

#[tokio::test]
async fn test_missing_frame_is_reported_and_retryable() {
    let dir = TempDir::new().unwrap();
    let mut model = booth_with_photo(&dir);
    let frame = model.config.asset_dir.join("frame").join("frame.png");
    std::fs::remove_file(&frame).unwrap();

    model.run(Message::OpenNameEntry).await;
    model.run(Message::NameChanged("usopp".into())).await;
    model.run(Message::SubmitName).await;

    let editor = model.editor.as_ref().unwrap();
    assert_eq!(editor.failures().len(), 1);
    assert_eq!(editor.scene().layers().len(), 1, "photo still placed");

    RgbaImage::from_pixel(500, 735, Rgba([230, 210, 170, 255]))
        .save(&frame)
        .unwrap();
    model.run(Message::RetryLayers).await;

    let editor = model.editor.as_ref().unwrap();
    assert!(editor.failures().is_empty());
    assert_eq!(editor.scene().layers().len(), 2);
}

/// Backend that always refuses access
struct DeniedBackend;

impl CameraBackend for DeniedBackend {
    fn enumerate_cameras(&self) -> Vec<CameraDevice> {
        vec![CameraDevice {
            name: "Locked webcam".into(),
            path: "/dev/video0".into(),
            location: CameraLocation::Front,
            driver: None,
        }]
    }

    fn get_formats(&self, _device: &CameraDevice) -> Vec<CameraFormat> {
        vec![CameraFormat {
            width: 640,
            height: 480,
            framerate: Some(Framerate::new(30, 1)),
            pixel_format: PixelFormat::RGBA.fourcc().to_string(),
        }]
    }

    fn initialize(&mut self, _device: &CameraDevice, _format: &CameraFormat) -> BackendResult<()> {
        Err(BackendError::PermissionDenied("access refused".into()))
    }

    fn shutdown(&mut self) -> BackendResult<()> {
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        false
    }

    fn capture_photo(&self) -> BackendResult<CameraFrame> {
        Err(BackendError::NotInitialized)
    }

    fn preview_frame(&self) -> Option<CameraFrame> {
        None
    }

    fn backend_type(&self) -> CameraBackendType {
        CameraBackendType::V4l2
    }

    fn current_device(&self) -> Option<&CameraDevice> {
        None
    }

    fn current_format(&self) -> Option<&CameraFormat> {
        None
    }
}

#[tokio::test]
async fn test_permission_failure_leaves_camera_off() {
    let dir = TempDir::new().unwrap();
    let camera = CameraSessionManager::new(Box::new(DeniedBackend));
    let mut model = AppModel::new(config(&dir), camera);

    model.run(Message::StartCamera).await;
    assert!(!model.is_camera_active());
    assert!(!model.camera_starting);
    assert_eq!(model.error.as_deref(), Some(messages::CAMERA_ACCESS_FAILED));

    model.run(Message::StartCountdown).await;
    assert!(!model.countdown.is_running());
    assert!(model.photos.is_empty());
}
