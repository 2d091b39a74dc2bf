// SPDX-License-Identifier: GPL-3.0-only

//! Message update handling
//!
//! This module handles all application messages by routing them to focused handler methods.
//! The main `update()` function acts as a dispatcher, while specific handlers are implemented
//! in the `handlers` submodules organized by functional domain.
//!
//! # Handler Modules
//!
//! - `handlers::camera`: Camera start/stop
//! - `handlers::capture`: Countdown, still capture, photo list
//! - `handlers::editor`: Name entry, poster surface, stickers
//! - `handlers::export`: Poster download

use crate::app::state::{AppModel, Message};
use crate::app::task::Task;
use tracing::info;

impl AppModel {
    /// Main message handler - routes messages to appropriate handler methods.
    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            // ===== Camera =====
            Message::StartCamera => self.handle_start_camera(),
            Message::CameraStarted(result) => self.handle_camera_started(result),
            Message::StopCamera => self.handle_stop_camera(),

            // ===== Capture =====
            Message::StartCountdown => self.handle_start_countdown(),
            Message::CountdownTick => self.handle_countdown_tick(),
            Message::DeletePhoto(index) => self.handle_delete_photo(index),
            Message::ClearPhotos => self.handle_clear_photos(),
            Message::DownloadPhoto(index) => self.handle_download_photo(index),
            Message::PhotoSaved(result) => self.handle_photo_saved(result),

            // ===== Name Entry =====
            Message::OpenNameEntry => self.handle_open_name_entry(),
            Message::NameChanged(value) => self.handle_name_changed(value),
            Message::CancelNameEntry => self.handle_cancel_name_entry(),
            Message::SubmitName => self.handle_submit_name(),

            // ===== Poster Editor =====
            Message::BaseLayersLoaded { generation, result } => {
                self.handle_base_layers_loaded(generation, result)
            }
            Message::RetryLayers => self.handle_retry_layers(),
            Message::AddSticker(index) => self.handle_add_sticker(index),
            Message::StickerLoaded {
                generation,
                index,
                result,
            } => self.handle_sticker_loaded(generation, index, result),
            Message::SelectAt(point) => self.handle_select_at(point),
            Message::MoveSelected { dx, dy } => self.handle_move_selected(dx, dy),
            Message::ScaleSelected(factor) => self.handle_scale_selected(factor),
            Message::RemoveSticker => self.handle_remove_sticker(),
            Message::DownloadPoster => self.handle_download_poster(),
            Message::PosterSaved(result) => self.handle_poster_saved(result),
            Message::CloseEditor => self.handle_close_editor(),

            // ===== System =====
            Message::DismissAlert => {
                self.alert = None;
                Task::none()
            }
            Message::DismissError => {
                self.error = None;
                Task::none()
            }
            Message::Shutdown => {
                info!("Shutting down");
                self.teardown();
                Task::none()
            }
        }
    }

    /// Apply a message and every message its tasks produce, until quiet
    ///
    /// Used by headless runs and tests; the terminal front end spawns tasks
    /// instead so it keeps drawing while they run.
    pub async fn run(&mut self, message: Message) {
        let mut queue = vec![message];
        while let Some(message) = queue.pop() {
            let task = self.update(message);
            let mut produced = task.collect().await;
            produced.reverse();
            queue.extend(produced);
        }
    }
}
