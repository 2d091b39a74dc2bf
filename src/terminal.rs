// SPDX-License-Identifier: GPL-3.0-only

//! Terminal photo booth
//!
//! Renders the booth to the terminal using Unicode half-block characters
//! for improved vertical resolution. Model updates happen on this thread;
//! the futures they return run on a tokio runtime and report back through
//! a channel that is drained between frames.

mod input;
mod widgets;

pub use input::{Action, UiState, cell_to_point, handle_key, handle_mouse};
pub use widgets::{AlertModal, ImageWidget, Placeholder, StatusBar, fit_rect};

use crate::app::{AppModel, Message, ViewMode};
use crate::backends::camera::format_converters::frame_to_rgba;
use crate::config::Config;
use crate::constants::{APP_TITLE, terminal::POLL_INTERVAL};
use crate::pipelines::photo::CapturedPhoto;
use crate::pipelines::poster::{AssetLibrary, Point, PosterEditor, SurfaceSize};
use chrono::{DateTime, Local};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use image::{Rgba, RgbaImage};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io::{self, stdout};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, info, warn};

const SIDEBAR_WIDTH: u16 = 32;
const POSTER_BACKDROP: Rgba<u8> = Rgba([40, 40, 40, 255]);

/// Run the terminal photo booth
pub fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let result = run_app(&mut terminal, runtime.handle(), config);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

/// Sends model updates out to the runtime
struct Dispatcher {
    handle: Handle,
    sender: UnboundedSender<Message>,
}

impl Dispatcher {
    fn dispatch(&self, model: &mut AppModel, message: Message) {
        let task = model.update(message);
        for future in task.into_futures() {
            let sender = self.sender.clone();
            self.handle.spawn(async move {
                // The receiver only goes away on shutdown
                let _ = sender.send(future.await);
            });
        }
    }
}

/// Decoded images kept between frames
#[derive(Default)]
struct RenderCache {
    preview: Option<RgbaImage>,
    thumbnail: Option<(DateTime<Local>, RgbaImage)>,
    /// Flattened poster keyed by surface generation and scene revision
    poster: Option<((u64, u64), RgbaImage)>,
    /// Page background shown around the poster
    backdrop: Option<RgbaImage>,
}

impl RenderCache {
    fn load_backdrop(&mut self, assets: &AssetLibrary) {
        let path = assets.background_path();
        match image::open(&path) {
            Ok(image) => self.backdrop = Some(image.to_rgba8()),
            Err(e) => debug!(path = %path.display(), error = %e, "No page background"),
        }
    }

    fn refresh_preview(&mut self, model: &AppModel) {
        if !model.is_camera_active() {
            self.preview = None;
            return;
        }
        let Some(frame) = model.camera.preview_frame() else {
            return;
        };
        match frame_to_rgba(&frame) {
            Ok(mut image) => {
                // Mirror preview, so the capture matches what the user sees
                image::imageops::flip_horizontal_in_place(&mut image);
                self.preview = Some(image);
            }
            Err(e) => debug!(error = %e, "Preview frame skipped"),
        }
    }

    fn thumbnail(&mut self, photo: &CapturedPhoto) -> Option<&RgbaImage> {
        let stale = self
            .thumbnail
            .as_ref()
            .is_none_or(|(at, _)| *at != photo.captured_at);
        if stale {
            match photo.to_image() {
                Ok(image) => self.thumbnail = Some((photo.captured_at, image)),
                Err(e) => {
                    warn!(error = %e, "Photo thumbnail could not be decoded");
                    self.thumbnail = None;
                }
            }
        }
        self.thumbnail.as_ref().map(|(_, image)| image)
    }

    fn poster(&mut self, editor: &PosterEditor) -> &RgbaImage {
        let key = (editor.generation(), editor.scene().revision());
        if self.poster.as_ref().is_some_and(|(cached, _)| *cached != key) {
            self.poster = None;
        }
        &self
            .poster
            .get_or_insert_with(|| (key, editor.scene().flatten(1.0)))
            .1
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    handle: &Handle,
    config: Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let (sender, mut receiver): (_, UnboundedReceiver<Message>) = unbounded_channel();
    let dispatcher = Dispatcher {
        handle: handle.clone(),
        sender,
    };

    let mut model = AppModel::from_config(config);
    let mut ui = UiState::default();
    let mut cache = RenderCache::default();
    cache.load_backdrop(&model.assets);

    info!(title = APP_TITLE, "Booth started");

    loop {
        // Apply everything finished tasks have produced
        while let Ok(message) = receiver.try_recv() {
            dispatcher.dispatch(&mut model, message);
        }

        if model.mode == ViewMode::Camera {
            cache.refresh_preview(&model);
        }

        terminal.draw(|f| draw(f, &model, &mut ui, &mut cache))?;

        // Handle input with timeout for frame updates
        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        let action = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                handle_key(&model, &ui, key)
            }
            Event::Mouse(mouse) => handle_mouse(&model, &mut ui, mouse),
            _ => None,
        };

        match action {
            Some(Action::Dispatch(message)) => dispatcher.dispatch(&mut model, message),
            Some(Action::PaletteNext) => {
                let count = model.assets.sticker_count();
                if count > 0 {
                    ui.palette_cursor = (ui.palette_cursor + 1) % count;
                }
            }
            Some(Action::PalettePrev) => {
                let count = model.assets.sticker_count();
                if count > 0 {
                    ui.palette_cursor = (ui.palette_cursor + count - 1) % count;
                }
            }
            Some(Action::Quit) => break,
            None => {}
        }
    }

    dispatcher.dispatch(&mut model, Message::Shutdown);
    Ok(())
}

fn draw(f: &mut Frame, model: &AppModel, ui: &mut UiState, cache: &mut RenderCache) {
    let [main, banner, status] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(u16::from(model.error.is_some())),
        Constraint::Length(1),
    ])
    .areas(f.area());

    ui.poster_rect = None;
    match model.mode {
        ViewMode::Camera => draw_camera(f, main, model, cache),
        ViewMode::NameEntry => draw_name_entry(f, main, model),
        ViewMode::Edit => draw_editor(f, main, model, ui, cache),
    }

    if let Some(error) = &model.error {
        f.render_widget(StatusBar::error(error), banner);
    }
    let status_message = status_line(model);
    f.render_widget(StatusBar::new(&status_message), status);

    if let Some(alert) = &model.alert {
        f.render_widget(AlertModal { message: alert }, f.area());
    }
}

fn status_line(model: &AppModel) -> String {
    let keys = match model.mode {
        ViewMode::Camera => {
            "'s' start | 't' stop | space capture | 'n' next | 'd' save | 'x' delete | 'q' quit"
        }
        ViewMode::NameEntry => "type your name | Enter continue | Esc back",
        ViewMode::Edit => {
            "Tab/Enter sticker | arrows/drag move | +/- size | 'x' remove | 'd' download | Esc close"
        }
    };
    match &model.status {
        Some(status) => format!("{} | {}", status, keys),
        None => keys.to_string(),
    }
}

fn draw_camera(f: &mut Frame, area: Rect, model: &AppModel, cache: &mut RenderCache) {
    let [preview, sidebar] =
        Layout::horizontal([Constraint::Min(1), Constraint::Length(SIDEBAR_WIDTH)]).areas(area);

    match &cache.preview {
        Some(image) if model.is_camera_active() => {
            f.render_widget(ImageWidget::new(image), preview);
            if let Some(n) = model.countdown.remaining() {
                let count = n.to_string();
                f.render_widget(
                    Placeholder {
                        message: &count,
                        background: Color::Yellow,
                    },
                    Rect::new(preview.x, preview.y + preview.height / 2, preview.width, 1),
                );
            }
        }
        _ => {
            let message = if model.camera_starting {
                "Starting camera..."
            } else {
                "Camera Off"
            };
            f.render_widget(
                Placeholder {
                    message,
                    background: Color::Gray,
                },
                preview,
            );
        }
    }

    let block = Block::default().borders(Borders::LEFT).title(APP_TITLE);
    let inner = block.inner(sidebar);
    f.render_widget(block, sidebar);

    let [info, thumb] =
        Layout::vertical([Constraint::Length(6), Constraint::Min(0)]).areas(inner);

    let capture_style = if model.capture_enabled() {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let camera_state = if model.is_camera_active() {
        "Stop Camera (t)"
    } else {
        "Start Camera (s)"
    };
    let lines = vec![
        Line::from(camera_state),
        Line::from(Span::styled(model.capture_button_label(), capture_style)),
        Line::from(""),
        Line::from(model.photos_label()),
    ];
    f.render_widget(Paragraph::new(lines), info);

    if let Some(photo) = model.photos.latest()
        && let Some(image) = cache.thumbnail(photo)
    {
        f.render_widget(ImageWidget::new(image), thumb);
    }
}

fn draw_name_entry(f: &mut Frame, area: Rect, model: &AppModel) {
    let width = area.width.min(48);
    let height = area.height.min(7);
    let rect = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    );

    let lines = vec![
        Line::from(Span::styled(
            format!("{}_", model.user_name),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("Poster text size: {}px", model.name_font_size()),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    f.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).block(
            Block::default()
                .borders(Borders::ALL)
                .title("What's your name?"),
        ),
        rect,
    );
}

fn draw_editor(
    f: &mut Frame,
    area: Rect,
    model: &AppModel,
    ui: &mut UiState,
    cache: &mut RenderCache,
) {
    let [canvas, sidebar] =
        Layout::horizontal([Constraint::Min(1), Constraint::Length(SIDEBAR_WIDTH)]).areas(area);

    let Some(editor) = model.editor.as_ref() else {
        f.render_widget(
            Placeholder {
                message: "Poster unavailable",
                background: Color::Gray,
            },
            canvas,
        );
        return;
    };

    if editor.scene().is_empty() {
        f.render_widget(
            Placeholder {
                message: "Loading poster...",
                background: Color::Gray,
            },
            canvas,
        );
    } else {
        if let Some(backdrop) = cache.backdrop.as_ref() {
            f.render_widget(ImageWidget::new(backdrop), canvas);
        }
        let image = cache.poster(editor);
        let rect = fit_rect(canvas, image.width(), image.height());
        f.render_widget(ImageWidget::new(image).backdrop(POSTER_BACKDROP), canvas);
        ui.poster_rect = Some(rect);
        draw_name_overlay(f, rect, editor, model.name_preview());
    }

    let block = Block::default().borders(Borders::LEFT).title("Stickers");
    let inner = block.inner(sidebar);
    f.render_widget(block, sidebar);

    let mut lines: Vec<Line> = (0..model.assets.sticker_count())
        .filter_map(|index| {
            let label = AssetLibrary::sticker_label(index)?;
            let style = if index == ui.palette_cursor {
                Style::default().fg(Color::Black).bg(Color::Yellow)
            } else {
                Style::default()
            };
            Some(Line::from(Span::styled(format!(" {} ", label), style)))
        })
        .collect();

    lines.push(Line::from(""));
    lines.push(Line::from(format!(
        "Name {}px (preview {}px)",
        model.name_font_size(),
        model.name_display_size()
    )));
    if editor.is_loading() {
        lines.push(Line::from("Loading..."));
    }
    let failures = editor.failures();
    if !failures.is_empty() {
        for failure in failures {
            lines.push(Line::from(Span::styled(
                failure,
                Style::default().fg(Color::Red),
            )));
        }
        lines.push(Line::from("[r] retry"));
    }
    if model.exporting {
        lines.push(Line::from("Downloading poster..."));
    }
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

/// Live name preview drawn over the poster at the name box
fn draw_name_overlay(f: &mut Frame, rect: Rect, editor: &PosterEditor, text: &str) {
    let layout = editor.layout();
    let Some((col, row)) = scale_to_cells(rect, layout.authoring_size, layout.name_box.center())
    else {
        return;
    };
    let len = text.chars().count() as u16;
    let x = col
        .saturating_sub(len / 2)
        .min((rect.x + rect.width).saturating_sub(len))
        .max(rect.x);
    f.buffer_mut().set_string(
        x,
        row,
        text,
        Style::default()
            .fg(Color::Rgb(0x1a, 0x12, 0x0a))
            .add_modifier(Modifier::BOLD),
    );
}

/// Inverse of `cell_to_point`
fn scale_to_cells(rect: Rect, surface: SurfaceSize, point: Point) -> Option<(u16, u16)> {
    if rect.width == 0 || rect.height == 0 || surface.width == 0 || surface.height == 0 {
        return None;
    }
    let col = rect.x as f32 + point.x / surface.width as f32 * rect.width as f32;
    let row = rect.y as f32 + point.y / surface.height as f32 * rect.height as f32;
    let row = (row as u16).min(rect.y + rect.height - 1);
    Some((col as u16, row))
}
