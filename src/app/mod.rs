// SPDX-License-Identifier: MPL-2.0

//! Booth controller
//!
//! Elm-style: all state lives in [`AppModel`], every input is a [`Message`]
//! and [`AppModel::update`] returns a [`Task`] whose futures resolve to more
//! messages. Front ends only translate input and draw the model.
//!
//! # Architecture
//!
//! - `state`: AppModel, Message, ViewMode
//! - `update`: Message dispatch
//! - `handlers`: Handlers by domain (camera, capture, editor, export)
//! - `countdown`: Capture countdown state machine
//! - `photos`: Captured photo list
//! - `task`: Deferred work returned from `update`

pub mod countdown;
mod handlers;
pub mod photos;
mod state;
pub mod task;
mod update;

pub use countdown::{Countdown, CountdownError, CountdownStep};
pub use handlers::editor::normalize_name;
pub use photos::PhotoStore;
pub use state::{AppModel, Message, ViewMode};
pub use task::Task;
