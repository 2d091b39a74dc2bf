// SPDX-License-Identifier: GPL-3.0-only

//! Camera session handlers

use crate::app::state::{AppModel, Message, ViewMode};
use crate::app::task::Task;
use crate::backends::camera::types::CameraFormat;
use crate::constants::messages;
use crate::errors::CameraError;
use tracing::{error, info, warn};

impl AppModel {
    // =========================================================================
    // Camera Session Handlers
    // =========================================================================

    pub(crate) fn handle_start_camera(&mut self) -> Task<Message> {
        if self.mode != ViewMode::Camera {
            warn!(mode = ?self.mode, "Camera can only be started from the camera view");
            return Task::none();
        }
        if self.camera_starting || self.camera.is_active() {
            info!("Camera already active or starting");
            return Task::none();
        }

        self.camera_starting = true;
        let camera = self.camera.clone();
        Task::perform(
            async move {
                tokio::task::spawn_blocking(move || camera.start())
                    .await
                    .unwrap_or_else(|e| Err(CameraError::InitializationFailed(e.to_string())))
            },
            Message::CameraStarted,
        )
    }

    pub(crate) fn handle_camera_started(
        &mut self,
        result: Result<CameraFormat, CameraError>,
    ) -> Task<Message> {
        self.camera_starting = false;
        match result {
            Ok(format) => {
                if self.mode != ViewMode::Camera {
                    // The user moved on while the device was opening
                    info!("Camera came up after leaving the camera view, releasing");
                    self.camera.stop();
                    return Task::none();
                }
                info!(format = %format, "Camera started");
                self.error = None;
            }
            Err(e) => {
                error!(error = %e, "Failed to start camera");
                self.error = Some(messages::CAMERA_ACCESS_FAILED.to_string());
            }
        }
        Task::none()
    }

    pub(crate) fn handle_stop_camera(&mut self) -> Task<Message> {
        if !self.camera.stop() {
            info!("Camera already stopped");
        }
        Task::none()
    }
}
