// SPDX-License-Identifier: GPL-3.0-only

//! Terminal widgets
//!
//! Images are drawn with Unicode half-block characters: each cell shows two
//! vertical pixels, the upper one as foreground and the lower as background.

use image::{Rgba, RgbaImage};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

/// Largest cell rectangle inside `area` that keeps the image aspect ratio
pub fn fit_rect(area: Rect, width: u32, height: u32) -> Rect {
    if width == 0 || height == 0 || area.width == 0 || area.height == 0 {
        return Rect::new(area.x, area.y, 0, 0);
    }
    let aspect = width as f64 / height as f64;
    let term_width = area.width as f64;
    // *2 because half-blocks
    let term_height = (area.height as f64) * 2.0;

    let (w, h) = if term_width / term_height > aspect {
        // Terminal is wider - fit to height
        (term_height * aspect, term_height)
    } else {
        // Terminal is taller - fit to width
        (term_width, term_width / aspect)
    };
    let cols = (w as u16).clamp(1, area.width);
    let rows = ((h / 2.0) as u16).clamp(1, area.height);

    Rect::new(
        area.x + (area.width - cols) / 2,
        area.y + (area.height - rows) / 2,
        cols,
        rows,
    )
}

/// Renders an RGBA image into the cells of `fit_rect(area, ..)`
pub struct ImageWidget<'a> {
    pub image: &'a RgbaImage,
    /// Colour behind transparent pixels
    pub backdrop: Rgba<u8>,
}

impl<'a> ImageWidget<'a> {
    pub fn new(image: &'a RgbaImage) -> Self {
        Self {
            image,
            backdrop: Rgba([0, 0, 0, 255]),
        }
    }

    pub fn backdrop(mut self, color: Rgba<u8>) -> Self {
        self.backdrop = color;
        self
    }

    fn sample(&self, x: f64, y: f64) -> Color {
        let px = (x as u32).min(self.image.width() - 1);
        let py = (y as u32).min(self.image.height() - 1);
        let [r, g, b, a] = self.image.get_pixel(px, py).0;
        let a = a as u16;
        let blend = |c: u8, bg: u8| ((c as u16 * a + bg as u16 * (255 - a)) / 255) as u8;
        let bg = self.backdrop.0;
        Color::Rgb(blend(r, bg[0]), blend(g, bg[1]), blend(b, bg[2]))
    }
}

impl Widget for ImageWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.image.width() == 0 || self.image.height() == 0 {
            return;
        }
        let target = fit_rect(area, self.image.width(), self.image.height());
        if target.width == 0 || target.height == 0 {
            return;
        }

        let x_scale = self.image.width() as f64 / target.width as f64;
        let y_scale = self.image.height() as f64 / (target.height as f64 * 2.0);

        for ty in 0..target.height {
            for tx in 0..target.width {
                let src_x = tx as f64 * x_scale;
                let top = self.sample(src_x, ty as f64 * 2.0 * y_scale);
                let bottom = self.sample(src_x, (ty as f64 * 2.0 + 1.0) * y_scale);

                if let Some(cell) = buf.cell_mut((target.x + tx, target.y + ty)) {
                    cell.set_char('▀');
                    cell.set_fg(top);
                    cell.set_bg(bottom);
                }
            }
        }
    }
}

/// Centered message for areas without an image
pub struct Placeholder<'a> {
    pub message: &'a str,
    pub background: Color,
}

impl Widget for Placeholder<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, Style::default().bg(self.background));
        let len = self.message.chars().count() as u16;
        let x = area.x + area.width.saturating_sub(len) / 2;
        let y = area.y + area.height / 2;
        if y < area.y + area.height && x < area.x + area.width {
            buf.set_string(
                x,
                y,
                self.message,
                Style::default()
                    .fg(Color::Black)
                    .bg(self.background)
                    .add_modifier(Modifier::BOLD),
            );
        }
    }
}

/// One-line bar across the full width
pub struct StatusBar<'a> {
    pub message: &'a str,
    pub style: Style,
}

impl<'a> StatusBar<'a> {
    pub fn new(message: &'a str) -> Self {
        Self {
            message,
            style: Style::default().fg(Color::White).bg(Color::DarkGray),
        }
    }

    pub fn error(message: &'a str) -> Self {
        Self {
            message,
            style: Style::default()
                .fg(Color::White)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
        }
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_style(self.style);
            }
        }
        let text: String = self.message.chars().take(area.width as usize).collect();
        buf.set_string(area.x, area.y, text, self.style);
    }
}

/// Blocking alert box drawn over everything else
pub struct AlertModal<'a> {
    pub message: &'a str,
}

impl Widget for AlertModal<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = (self.message.chars().count() as u16 + 4)
            .max(24)
            .min(area.width);
        let height = 5u16.min(area.height);
        let rect = Rect::new(
            area.x + area.width.saturating_sub(width) / 2,
            area.y + area.height.saturating_sub(height) / 2,
            width,
            height,
        );
        Clear.render(rect, buf);
        Paragraph::new(format!("{}\n\n[Enter] OK", self.message))
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(Color::Black).bg(Color::White))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Black).bg(Color::White)),
            )
            .render(rect, buf);
    }
}
