// SPDX-License-Identifier: GPL-3.0-only

//! Name entry and poster editor handlers

use crate::app::state::{AppModel, Message, ViewMode};
use crate::app::task::Task;
use crate::constants::{messages, name};
use crate::errors::SceneError;
use crate::pipelines::poster::{BaseLayers, Point, PosterEditor};
use image::RgbaImage;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Uppercase and cap a typed name
pub fn normalize_name(input: &str) -> String {
    input.to_uppercase().chars().take(name::MAX_CHARS).collect()
}

impl AppModel {
    // =========================================================================
    // Name Entry Handlers
    // =========================================================================

    pub(crate) fn handle_open_name_entry(&mut self) -> Task<Message> {
        if self.mode != ViewMode::Camera {
            return Task::none();
        }
        if self.photos.is_empty() {
            warn!("Name entry needs a captured photo");
            return Task::none();
        }
        // Release the device before a potentially long editing session
        self.camera.stop();
        self.mode = ViewMode::NameEntry;
        info!("Entered name entry");
        Task::none()
    }

    pub(crate) fn handle_name_changed(&mut self, value: String) -> Task<Message> {
        if self.mode == ViewMode::NameEntry {
            self.user_name = normalize_name(&value);
        }
        Task::none()
    }

    pub(crate) fn handle_cancel_name_entry(&mut self) -> Task<Message> {
        if self.mode != ViewMode::NameEntry {
            return Task::none();
        }
        self.user_name.clear();
        self.mode = ViewMode::Camera;
        Task::none()
    }

    pub(crate) fn handle_submit_name(&mut self) -> Task<Message> {
        if self.mode != ViewMode::NameEntry {
            return Task::none();
        }
        if self.user_name.trim().is_empty() {
            self.alert = Some(messages::EMPTY_NAME.to_string());
            return Task::none();
        }

        match self.open_editor() {
            Ok(task) => {
                self.mode = ViewMode::Edit;
                info!(name = %self.user_name, "Entered poster editor");
                task
            }
            Err(e) => {
                warn!(error = %e, "Poster surface not created");
                self.mode = ViewMode::Edit;
                Task::none()
            }
        }
    }

    // =========================================================================
    // Poster Editor Handlers
    // =========================================================================

    /// Create the poster surface and start loading its base layers
    fn open_editor(&mut self) -> Result<Task<Message>, SceneError> {
        if self.editor.is_some() {
            return Err(SceneError::SurfaceInUse);
        }

        let generation = self.next_generation;
        self.next_generation += 1;
        let photo = self.photos.latest().cloned();
        let mut editor = PosterEditor::open(generation, self.config.layout.clone(), photo);
        let task = Self::base_load_task(&mut editor, &self.assets);
        self.editor = Some(editor);
        Ok(task)
    }

    fn base_load_task(
        editor: &mut PosterEditor,
        assets: &crate::pipelines::poster::AssetLibrary,
    ) -> Task<Message> {
        let generation = editor.generation();
        match editor.start_base_load(assets) {
            Some(load) => Task::perform(load, move |result| Message::BaseLayersLoaded {
                generation,
                result,
            }),
            None => Task::none(),
        }
    }

    pub(crate) fn handle_base_layers_loaded(
        &mut self,
        generation: u64,
        result: Result<BaseLayers, SceneError>,
    ) -> Task<Message> {
        let Some(editor) = self.editor.as_mut().filter(|e| e.accepts(generation)) else {
            debug!(generation, "Dropping base layers for a released surface");
            return Task::none();
        };
        match result {
            Ok(layers) => editor.apply_base_layers(layers),
            Err(e) => editor.fail_base_load(&e),
        }
        Task::none()
    }

    pub(crate) fn handle_retry_layers(&mut self) -> Task<Message> {
        let Some(editor) = self.editor.as_mut() else {
            return Task::none();
        };
        if editor.is_loading() {
            debug!("Retry ignored while layers are loading");
            return Task::none();
        }
        Self::base_load_task(editor, &self.assets)
    }

    pub(crate) fn handle_add_sticker(&mut self, index: usize) -> Task<Message> {
        let Some(editor) = self.editor.as_mut() else {
            warn!(index, "No poster surface for sticker");
            return Task::none();
        };
        let generation = editor.generation();
        let load = editor.start_sticker_load(&self.assets, index);
        Task::perform(load, move |result| Message::StickerLoaded {
            generation,
            index,
            result,
        })
    }

    pub(crate) fn handle_sticker_loaded(
        &mut self,
        generation: u64,
        index: usize,
        result: Result<Arc<RgbaImage>, SceneError>,
    ) -> Task<Message> {
        let Some(editor) = self.editor.as_mut().filter(|e| e.accepts(generation)) else {
            debug!(generation, index, "Dropping sticker for a released surface");
            return Task::none();
        };
        editor.apply_sticker(index, result);
        Task::none()
    }

    pub(crate) fn handle_select_at(&mut self, point: Point) -> Task<Message> {
        if let Some(editor) = self.editor.as_mut()
            && let Some(id) = editor.scene_mut().select_at(point)
        {
            // Picked stickers come up over their neighbours
            editor.scene_mut().bring_to_front(id);
        }
        Task::none()
    }

    pub(crate) fn handle_move_selected(&mut self, dx: f32, dy: f32) -> Task<Message> {
        if let Some(editor) = self.editor.as_mut() {
            editor.scene_mut().move_active(dx, dy);
        }
        Task::none()
    }

    pub(crate) fn handle_scale_selected(&mut self, factor: f32) -> Task<Message> {
        if let Some(editor) = self.editor.as_mut() {
            editor.scene_mut().scale_active(factor);
        }
        Task::none()
    }

    pub(crate) fn handle_remove_sticker(&mut self) -> Task<Message> {
        if let Some(editor) = self.editor.as_mut()
            && !editor.remove_selected()
        {
            debug!("Nothing removable selected");
        }
        Task::none()
    }

    pub(crate) fn handle_close_editor(&mut self) -> Task<Message> {
        if self.mode != ViewMode::Edit {
            return Task::none();
        }
        if let Some(mut editor) = self.editor.take() {
            editor.release();
        }
        self.user_name.clear();
        self.mode = ViewMode::Camera;
        info!("Closed poster editor");
        Task::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("zoro"), "ZORO");
        assert_eq!(normalize_name(&"a".repeat(40)).len(), name::MAX_CHARS);
        assert_eq!(normalize_name("straße"), "STRASSE");
    }
}
