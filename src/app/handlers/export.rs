// SPDX-License-Identifier: GPL-3.0-only

//! Poster download handlers

use crate::app::state::{AppModel, Message};
use crate::app::task::Task;
use crate::constants::messages;
use crate::errors::ExportError;
use crate::pipelines::poster::{SavedPoster, export_poster};
use tracing::{info, warn};

impl AppModel {
    pub(crate) fn handle_download_poster(&mut self) -> Task<Message> {
        if self.exporting {
            info!("Poster download already running");
            return Task::none();
        }
        let Some(editor) = self.editor.as_ref() else {
            warn!("No poster to download");
            return Task::none();
        };

        self.exporting = true;
        // The export works on a snapshot; editing can continue meanwhile
        let scene = editor.scene().clone();
        let layout = editor.layout().clone();
        Task::perform(
            export_poster(scene, self.user_name.clone(), layout, self.config.output_dir()),
            Message::PosterSaved,
        )
    }

    pub(crate) fn handle_poster_saved(
        &mut self,
        result: Result<SavedPoster, ExportError>,
    ) -> Task<Message> {
        self.exporting = false;
        match result {
            Ok(saved) => {
                info!(path = %saved.path.display(), "Poster downloaded");
                self.status = Some(format!("Saved {}", saved.path.display()));
                self.last_export = Some(saved);
            }
            Err(e) => {
                self.alert = Some(messages::export_failed(&e));
            }
        }
        Task::none()
    }
}
