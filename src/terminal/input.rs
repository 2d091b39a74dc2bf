// SPDX-License-Identifier: GPL-3.0-only

//! Key and mouse bindings
//!
//! Translating input is kept free of terminal I/O so bindings can be tested
//! against a model directly.

use crate::app::{AppModel, Message, ViewMode};
use crate::constants::terminal::{NUDGE_STEP, SCALE_STEP};
use crate::pipelines::poster::{Point, SurfaceSize};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

/// What the run loop should do with an input event
#[derive(Debug)]
pub enum Action {
    Dispatch(Message),
    PaletteNext,
    PalettePrev,
    Quit,
}

/// Front-end state that is not part of the model
#[derive(Debug, Default)]
pub struct UiState {
    /// Highlighted sticker in the palette
    pub palette_cursor: usize,
    /// Cells the poster preview was last drawn into
    pub poster_rect: Option<Rect>,
    /// Last pointer position of an ongoing drag, in authoring units
    pub drag_from: Option<Point>,
}

fn dispatch(message: Message) -> Option<Action> {
    Some(Action::Dispatch(message))
}

pub fn handle_key(model: &AppModel, ui: &UiState, key: KeyEvent) -> Option<Action> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(Action::Quit);
    }

    // A blocking alert swallows everything until dismissed
    if model.alert.is_some() {
        return match key.code {
            KeyCode::Enter | KeyCode::Esc => dispatch(Message::DismissAlert),
            _ => None,
        };
    }

    match model.mode {
        ViewMode::Camera => camera_key(model, key),
        ViewMode::NameEntry => name_entry_key(model, key),
        ViewMode::Edit => edit_key(ui, key),
    }
}

fn camera_key(model: &AppModel, key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char('s') if !model.is_camera_active() => dispatch(Message::StartCamera),
        KeyCode::Char('t') => dispatch(Message::StopCamera),
        KeyCode::Char(' ') | KeyCode::Char('p') => dispatch(Message::StartCountdown),
        KeyCode::Char('n') | KeyCode::Enter if !model.photos.is_empty() => {
            dispatch(Message::OpenNameEntry)
        }
        KeyCode::Char('d') => dispatch(Message::DownloadPhoto(0)),
        KeyCode::Char('x') => dispatch(Message::DeletePhoto(0)),
        KeyCode::Char('c') => dispatch(Message::ClearPhotos),
        KeyCode::Esc if model.error.is_some() => dispatch(Message::DismissError),
        _ => None,
    }
}

fn name_entry_key(model: &AppModel, key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Enter => dispatch(Message::SubmitName),
        KeyCode::Esc => dispatch(Message::CancelNameEntry),
        KeyCode::Backspace => {
            let mut name = model.user_name.clone();
            name.pop();
            dispatch(Message::NameChanged(name))
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            let mut name = model.user_name.clone();
            name.push(c);
            dispatch(Message::NameChanged(name))
        }
        _ => None,
    }
}

fn edit_key(ui: &UiState, key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Esc => dispatch(Message::CloseEditor),
        KeyCode::Tab => Some(Action::PaletteNext),
        KeyCode::BackTab => Some(Action::PalettePrev),
        KeyCode::Enter | KeyCode::Char('a') => dispatch(Message::AddSticker(ui.palette_cursor)),
        KeyCode::Delete | KeyCode::Backspace | KeyCode::Char('x') => {
            dispatch(Message::RemoveSticker)
        }
        KeyCode::Left => dispatch(Message::MoveSelected {
            dx: -NUDGE_STEP,
            dy: 0.0,
        }),
        KeyCode::Right => dispatch(Message::MoveSelected {
            dx: NUDGE_STEP,
            dy: 0.0,
        }),
        KeyCode::Up => dispatch(Message::MoveSelected {
            dx: 0.0,
            dy: -NUDGE_STEP,
        }),
        KeyCode::Down => dispatch(Message::MoveSelected {
            dx: 0.0,
            dy: NUDGE_STEP,
        }),
        KeyCode::Char('+') | KeyCode::Char('=') => dispatch(Message::ScaleSelected(SCALE_STEP)),
        KeyCode::Char('-') => dispatch(Message::ScaleSelected(1.0 / SCALE_STEP)),
        KeyCode::Char('d') => dispatch(Message::DownloadPoster),
        KeyCode::Char('r') => dispatch(Message::RetryLayers),
        KeyCode::Char('q') => Some(Action::Quit),
        _ => None,
    }
}

/// Map a terminal cell to authoring units on the poster preview
pub fn cell_to_point(rect: Rect, surface: SurfaceSize, column: u16, row: u16) -> Option<Point> {
    if rect.width == 0
        || rect.height == 0
        || column < rect.x
        || row < rect.y
        || column >= rect.x + rect.width
        || row >= rect.y + rect.height
    {
        return None;
    }
    // Cell centers; each row covers two half-block pixels
    let fx = (column - rect.x) as f32 + 0.5;
    let fy = (row - rect.y) as f32 + 0.5;
    Some(Point::new(
        fx / rect.width as f32 * surface.width as f32,
        fy / rect.height as f32 * surface.height as f32,
    ))
}

pub fn handle_mouse(model: &AppModel, ui: &mut UiState, event: MouseEvent) -> Option<Action> {
    if model.mode != ViewMode::Edit || model.alert.is_some() {
        return None;
    }
    let rect = ui.poster_rect?;
    let surface = model.config.layout.authoring_size;

    match event.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let point = cell_to_point(rect, surface, event.column, event.row)?;
            ui.drag_from = Some(point);
            dispatch(Message::SelectAt(point))
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            let from = ui.drag_from?;
            let to = cell_to_point(rect, surface, event.column, event.row)?;
            ui.drag_from = Some(to);
            dispatch(Message::MoveSelected {
                dx: to.x - from.x,
                dy: to.y - from.y,
            })
        }
        MouseEventKind::Up(MouseButton::Left) => {
            ui.drag_from = None;
            None
        }
        MouseEventKind::ScrollUp => dispatch(Message::ScaleSelected(SCALE_STEP)),
        MouseEventKind::ScrollDown => dispatch(Message::ScaleSelected(1.0 / SCALE_STEP)),
        _ => None,
    }
}
