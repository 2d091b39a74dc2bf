// SPDX-License-Identifier: GPL-3.0-only

//! Retained-mode layer scene
//!
//! Layers are stored bottom to top. Every layer carries a tag so the
//! editor can tell the template and the photo (fixed) apart from stickers
//! (selectable, movable, removable).

use super::layout::{Point, Rect};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Smallest edge a sticker may be resized to, in surface units
const MIN_LAYER_EDGE: f32 = 8.0;

/// Unique identity of a layer within a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(Uuid);

impl LayerId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// What a layer is, which decides how the editor may treat it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    /// Poster template or a flattened raster; never selectable
    Background,
    /// The captured photo; never selectable
    Photo,
    /// A decorative sticker, identified by its catalog index
    Sticker(usize),
    /// Rendered name text on the export surface
    Text,
}

impl LayerKind {
    pub fn is_sticker(&self) -> bool {
        matches!(self, LayerKind::Sticker(_))
    }
}

/// One image placed on the scene
#[derive(Debug, Clone)]
pub struct Layer {
    id: LayerId,
    pub kind: LayerKind,
    pub image: Arc<RgbaImage>,
    pub rect: Rect,
}

impl Layer {
    pub fn new(kind: LayerKind, image: Arc<RgbaImage>, rect: Rect) -> Self {
        Self {
            id: LayerId::new(),
            kind,
            image,
            rect,
        }
    }

    /// Sticker at `scale` of its native size, centered on `center`
    pub fn sticker(index: usize, image: Arc<RgbaImage>, center: Point, scale: f32) -> Self {
        let width = image.width() as f32 * scale;
        let height = image.height() as f32 * scale;
        Self::new(
            LayerKind::Sticker(index),
            image,
            Rect::centered_on(center, width, height),
        )
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    /// Only stickers respond to pointer input
    pub fn is_interactive(&self) -> bool {
        self.kind.is_sticker()
    }
}

/// Ordered collection of layers on a fixed-size surface
#[derive(Debug, Clone)]
pub struct Scene {
    width: u32,
    height: u32,
    layers: Vec<Layer>,
    active: Option<LayerId>,
    /// Bumped on every mutation so views know when to redraw
    revision: u64,
}

impl Scene {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            layers: Vec::new(),
            active: None,
            revision: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Layers from bottom to top
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn sticker_count(&self) -> usize {
        self.layers.iter().filter(|l| l.kind.is_sticker()).count()
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    fn index_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// Add a layer on top of everything else
    pub fn push(&mut self, layer: Layer) -> LayerId {
        let id = layer.id;
        self.layers.push(layer);
        self.touch();
        id
    }

    /// Insert a layer at a stacking position (0 is the bottom)
    pub fn insert(&mut self, index: usize, layer: Layer) -> LayerId {
        let id = layer.id;
        let index = index.min(self.layers.len());
        self.layers.insert(index, layer);
        self.touch();
        id
    }

    /// Stacking position just above the last background layer
    pub fn above_background(&self) -> usize {
        self.layers
            .iter()
            .rposition(|l| l.kind == LayerKind::Background)
            .map_or(0, |i| i + 1)
    }

    /// Move a layer to the top of the stack
    pub fn bring_to_front(&mut self, id: LayerId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let layer = self.layers.remove(index);
        self.layers.push(layer);
        self.touch();
        true
    }

    /// Currently selected layer
    pub fn active(&self) -> Option<&Layer> {
        self.active.and_then(|id| self.layer(id))
    }

    /// Select a layer; only interactive layers can be selected
    pub fn set_active(&mut self, id: LayerId) -> bool {
        match self.layer(id) {
            Some(layer) if layer.is_interactive() => {
                self.active = Some(id);
                self.touch();
                true
            }
            _ => false,
        }
    }

    pub fn clear_selection(&mut self) {
        if self.active.take().is_some() {
            self.touch();
        }
    }

    /// Topmost interactive layer under a point
    pub fn hit_test(&self, point: Point) -> Option<LayerId> {
        self.layers
            .iter()
            .rev()
            .find(|l| l.is_interactive() && l.rect.contains(point))
            .map(|l| l.id)
    }

    /// Select whatever sticker is under the point, or clear the selection
    pub fn select_at(&mut self, point: Point) -> Option<LayerId> {
        match self.hit_test(point) {
            Some(id) => {
                self.set_active(id);
                Some(id)
            }
            None => {
                self.clear_selection();
                None
            }
        }
    }

    fn active_mut(&mut self) -> Option<&mut Layer> {
        let id = self.active?;
        self.layers.iter_mut().find(|l| l.id == id)
    }

    /// Drag the selected layer by a delta
    pub fn move_active(&mut self, dx: f32, dy: f32) -> bool {
        let Some(layer) = self.active_mut() else {
            return false;
        };
        layer.rect = layer.rect.translated(dx, dy);
        self.touch();
        true
    }

    /// Resize the selected layer around its center
    pub fn scale_active(&mut self, factor: f32) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            return false;
        }
        let Some(layer) = self.active_mut() else {
            return false;
        };
        let rect = layer.rect;
        let shortest = rect.width.min(rect.height);
        let factor = if shortest * factor < MIN_LAYER_EDGE {
            MIN_LAYER_EDGE / shortest.max(f32::EPSILON)
        } else {
            factor
        };
        layer.rect = Rect::centered_on(rect.center(), rect.width * factor, rect.height * factor);
        self.touch();
        true
    }

    /// Remove the selected layer if it is a sticker
    ///
    /// The template and the photo can never be removed this way; with one of
    /// them (or nothing) selected this does nothing.
    pub fn remove_active(&mut self) -> Option<Layer> {
        let id = self.active?;
        let index = self.index_of(id)?;
        if !self.layers[index].kind.is_sticker() {
            return None;
        }
        self.active = None;
        let layer = self.layers.remove(index);
        self.touch();
        debug!(sticker = ?layer.kind, "Removed sticker layer");
        Some(layer)
    }

    /// Drop every layer
    pub fn clear(&mut self) {
        self.layers.clear();
        self.active = None;
        self.touch();
    }

    /// Rasterize all layers at `multiplier` times the scene size
    ///
    /// Uncovered areas stay transparent. Selection state is never drawn.
    pub fn flatten(&self, multiplier: f32) -> RgbaImage {
        let out_w = (self.width as f32 * multiplier).round().max(1.0) as u32;
        let out_h = (self.height as f32 * multiplier).round().max(1.0) as u32;
        let mut canvas = RgbaImage::from_pixel(out_w, out_h, Rgba([0, 0, 0, 0]));

        for layer in &self.layers {
            let target = layer.rect.scaled(multiplier);
            let w = target.width.round() as u32;
            let h = target.height.round() as u32;
            if w == 0 || h == 0 {
                continue;
            }

            let x = target.x.round() as i64;
            let y = target.y.round() as i64;
            if (layer.image.width(), layer.image.height()) == (w, h) {
                imageops::overlay(&mut canvas, layer.image.as_ref(), x, y);
            } else {
                let resized = imageops::resize(layer.image.as_ref(), w, h, FilterType::Triangle);
                imageops::overlay(&mut canvas, &resized, x, y);
            }
        }

        canvas
    }
}
