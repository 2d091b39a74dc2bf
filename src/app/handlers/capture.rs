// SPDX-License-Identifier: GPL-3.0-only

//! Capture operations handlers
//!
//! Handles the countdown, still capture and the captured photo list.

use crate::app::countdown::CountdownStep;
use crate::app::photos::PhotoStore;
use crate::app::state::{AppModel, Message};
use crate::app::task::Task;
use crate::constants::capture::COUNTDOWN_STEP;
use crate::errors::{AppError, PhotoError};
use crate::storage;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

impl AppModel {
    // =========================================================================
    // Capture Operations Handlers
    // =========================================================================

    /// Create a delayed task that sends a message after one countdown step
    pub(crate) fn delay_task(message: Message) -> Task<Message> {
        Task::perform(
            async move {
                tokio::time::sleep(COUNTDOWN_STEP).await;
                message
            },
            |message| message,
        )
    }

    pub(crate) fn handle_start_countdown(&mut self) -> Task<Message> {
        if !self.capture_enabled() {
            debug!(
                camera = self.is_camera_active(),
                counting = self.countdown.is_running(),
                photos = self.photos.len(),
                "Capture is disabled"
            );
            return Task::none();
        }

        if let Err(e) = self.countdown.start(self.countdown_seconds()) {
            warn!(error = %e, "Countdown not started");
            return Task::none();
        }
        info!(seconds = self.countdown_seconds(), "Countdown started");
        Self::delay_task(Message::CountdownTick)
    }

    pub(crate) fn handle_countdown_tick(&mut self) -> Task<Message> {
        match self.countdown.tick() {
            Some(CountdownStep::Continue(remaining)) => {
                debug!(remaining, "Countdown tick");
                Self::delay_task(Message::CountdownTick)
            }
            Some(CountdownStep::Fire) => {
                self.capture_now();
                Task::none()
            }
            None => Task::none(),
        }
    }

    /// Snapshot the current frame into the photo list
    ///
    /// Failures are shown in the error banner.
    pub(crate) fn capture_now(&mut self) {
        let result = self
            .camera
            .capture_frame()
            .map_err(AppError::from)
            .and_then(|frame| self.pipeline.capture(&frame).map_err(AppError::from));

        match result {
            Ok(photo) => {
                if self.photos.insert(photo).is_some() {
                    info!("Replaced the previous photo");
                }
                self.error = None;
            }
            Err(e) => {
                error!(error = %e, "Capture failed");
                self.error = Some(format!("Capture failed: {}", e));
            }
        }
    }

    pub(crate) fn handle_delete_photo(&mut self, index: usize) -> Task<Message> {
        if self.photos.delete(index).is_none() {
            warn!(index, "No photo to delete");
        }
        Task::none()
    }

    pub(crate) fn handle_clear_photos(&mut self) -> Task<Message> {
        self.photos.clear();
        info!("Cleared all photos");
        Task::none()
    }

    pub(crate) fn handle_download_photo(&mut self, index: usize) -> Task<Message> {
        let Some(photo) = self.photos.get(index).cloned() else {
            warn!(index, "No photo to download");
            return Task::none();
        };
        let dir = self.config.output_dir();
        let file_name = PhotoStore::file_name(index);
        Task::perform(
            storage::save_photo(photo, dir, file_name),
            Message::PhotoSaved,
        )
    }

    pub(crate) fn handle_photo_saved(
        &mut self,
        result: Result<PathBuf, PhotoError>,
    ) -> Task<Message> {
        match result {
            Ok(path) => {
                self.status = Some(format!("Saved {}", path.display()));
            }
            Err(e) => {
                error!(error = %e, "Photo download failed");
                self.error = Some(format!("Photo download failed: {}", e));
            }
        }
        Task::none()
    }
}
