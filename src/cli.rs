// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for the photo booth
//!
//! This module provides command-line functionality for:
//! - Listing available cameras
//! - Taking a countdown photo
//! - Building a wanted poster from an existing photo, without a terminal UI

use nakama_booth::app::{AppModel, Countdown, CountdownStep, Message, PhotoStore, ViewMode};
use nakama_booth::backends::camera::CameraSessionManager;
use nakama_booth::backends::camera::get_backend_for_type;
use nakama_booth::config::Config;
use nakama_booth::constants::capture::COUNTDOWN_STEP;
use nakama_booth::pipelines::photo::{CapturedPhoto, PhotoPipeline};
use nakama_booth::storage;
use std::path::{Path, PathBuf};

/// List all available cameras
pub fn list_cameras(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let backend = get_backend_for_type(config.backend, config.still_image.as_deref());
    let manager = CameraSessionManager::new(backend);
    let cameras = manager.enumerate_cameras();

    if cameras.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    println!("Available cameras ({}):", manager.backend_type());
    println!();
    for (index, camera) in cameras.iter().enumerate() {
        println!("  [{}] {}  {}", index, camera.name, camera.path);

        let formats = manager.get_formats(camera);
        if !formats.is_empty() {
            // Group formats by resolution and show best framerate
            let mut resolutions: Vec<(u32, u32, u32)> = Vec::new();
            for format in &formats {
                let fps = format.framerate.map(|f| f.as_int()).unwrap_or(30);
                if let Some(existing) = resolutions
                    .iter_mut()
                    .find(|(w, h, _)| *w == format.width && *h == format.height)
                {
                    existing.2 = existing.2.max(fps);
                } else {
                    resolutions.push((format.width, format.height, fps));
                }
            }

            // Sort by resolution (highest first)
            resolutions.sort_by(|a, b| (b.0 * b.1).cmp(&(a.0 * a.1)));

            let res_strs: Vec<String> = resolutions
                .iter()
                .take(3)
                .map(|(w, h, fps)| format!("{}x{}@{}fps", w, h, fps))
                .collect();
            println!("      Formats: {}", res_strs.join(", "));
        }
        println!();
    }

    Ok(())
}

/// Count down, capture one mirrored still and save it as PNG
pub fn take_photo(
    config: &Config,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let backend = get_backend_for_type(config.backend, config.still_image.as_deref());
    let manager =
        CameraSessionManager::new(backend).with_preferred_device(config.camera_path.clone());

    let format = manager.start()?;
    println!("Capture format: {}x{}", format.width, format.height);

    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(async {
        let mut countdown = Countdown::new();
        countdown.start(config.countdown_seconds.max(1))?;
        if let Some(n) = countdown.remaining() {
            println!("{}...", n);
        }
        loop {
            tokio::time::sleep(COUNTDOWN_STEP).await;
            match countdown.tick() {
                Some(CountdownStep::Continue(n)) => println!("{}...", n),
                Some(CountdownStep::Fire) | None => break,
            }
        }

        let frame = manager.capture_frame()?;
        let photo = PhotoPipeline::with_mirror(config.mirror_capture).capture(&frame)?;

        let (dir, file_name) = output_location(output, config, PhotoStore::file_name(0));
        let path = storage::save_photo(photo, dir, file_name).await?;
        Ok::<_, Box<dyn std::error::Error>>(path)
    });

    manager.stop();
    let path = result?;
    println!("Photo saved: {}", path.display());
    Ok(())
}

/// Compose and download a wanted poster from a photo on disk
pub fn make_poster(
    mut config: Config,
    photo: &Path,
    name: &str,
    stickers: &[usize],
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let image = image::open(photo)
        .map_err(|e| format!("Failed to open {}: {}", photo.display(), e))?
        .to_rgba8();
    let photo = CapturedPhoto::from_image(&image)?;

    if let Some(dir) = output {
        config.output_dir = Some(dir);
    }
    storage::ensure_dir(&config.output_dir())?;

    let rt = tokio::runtime::Runtime::new()?;
    let result: Result<(), Box<dyn std::error::Error>> = rt.block_on(async {
        let mut model = AppModel::from_config(config);
        model.photos.insert(photo);

        model.run(Message::OpenNameEntry).await;
        model.run(Message::NameChanged(name.to_string())).await;
        model.run(Message::SubmitName).await;
        if let Some(alert) = model.alert.take() {
            return Err(alert.into());
        }
        if model.mode != ViewMode::Edit {
            return Err("Poster editor did not open".into());
        }

        if let Some(editor) = model.editor.as_ref() {
            for failure in editor.failures() {
                eprintln!("Warning: {}", failure);
            }
        }

        for &index in stickers {
            model.run(Message::AddSticker(index)).await;
        }
        if let Some(error) = model.editor.as_ref().and_then(|e| e.sticker_error()) {
            eprintln!("Warning: {}", error);
        }

        model.run(Message::DownloadPoster).await;
        if let Some(alert) = model.alert.take() {
            return Err(alert.into());
        }

        match model.last_export.as_ref() {
            Some(saved) => {
                println!(
                    "Poster saved: {} ({}x{}, name at {}px)",
                    saved.path.display(),
                    saved.width,
                    saved.height,
                    saved.name_font_size
                );
                Ok(())
            }
            None => Err("Poster was not saved".into()),
        }
    });
    result
}

/// Split a user-supplied output into directory and file name
fn output_location(
    output: Option<PathBuf>,
    config: &Config,
    default_name: String,
) -> (PathBuf, String) {
    match output {
        Some(path) if path.is_dir() => (path, default_name),
        Some(path) => {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or(default_name);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            (dir, file_name)
        }
        None => (config.output_dir(), default_name),
    }
}
