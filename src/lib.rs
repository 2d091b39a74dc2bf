// SPDX-License-Identifier: MPL-2.0

//! Nakama Booth - a wanted-poster photo booth
//!
//! This library provides the core functionality of the booth: camera
//! sessions, countdown capture, and the poster compositor with stickers
//! and name text.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: Booth state machine (`Camera → NameEntry → Edit`) and message handling
//! - [`backends`]: Camera backend abstraction and session ownership
//! - [`pipelines`]: Still capture and poster composition/export
//! - [`config`]: User configuration handling
//! - [`storage`]: Downloads to disk
//! - [`terminal`]: Terminal front end
//!
//! # Example
//!
//! ```ignore
//! let mut model = AppModel::from_config(Config::default());
//! model.run(Message::StartCamera).await;
//! model.run(Message::StartCountdown).await;
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod pipelines;
pub mod storage;
pub mod terminal;

// Re-export commonly used types
pub use app::{AppModel, Message, ViewMode};
pub use config::Config;
pub use pipelines::poster::{PosterLayout, SavedPoster};
