// SPDX-License-Identifier: GPL-3.0-only

//! Wanted-poster compositor
//!
//! ```text
//! z-order (bottom → top)
//!   Background  frame template, fills the 500x735 surface
//!   Photo       captured still, fixed rect over the template cut-out
//!   Sticker(n)  user decorations, selectable and movable
//!   Text        name, only on the 759x1117 export surface
//! ```

pub mod assets;
pub mod editor;
pub mod export;
pub mod layout;
pub mod scene;
pub mod text;

pub use assets::AssetLibrary;
pub use editor::{BaseLayers, LayerLoad, PosterEditor, SceneToken};
pub use export::{PosterExport, SavedPoster, compose_poster, export_poster, save_png};
pub use layout::{Point, PosterLayout, Rect, SurfaceSize};
pub use scene::{Layer, LayerId, LayerKind, Scene};
pub use text::{display_font_size, font_size_for_name};
