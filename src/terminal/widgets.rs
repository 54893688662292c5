// SPDX-License-Identifier: GPL-3.0-only

//! Widgets for the terminal screen

use crate::backends::camera::CameraFrame;
use crate::qr::QrPreview;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Placeholder shown until the first preview frame arrives
pub const WAITING_FOR_CAMERA: &str = "Waiting for camera...";

/// Widget that renders a camera frame using half-block characters
pub struct FrameWidget {
    pub(crate) frame: Option<CameraFrame>,
    mirror: bool,
    placeholder: String,
}

impl FrameWidget {
    pub fn new(mirror: bool) -> Self {
        Self {
            frame: None,
            mirror,
            placeholder: WAITING_FOR_CAMERA.to_string(),
        }
    }

    pub fn update_frame(&mut self, frame: CameraFrame) {
        self.frame = Some(frame);
    }

    /// Drop the current frame and show `message` instead
    pub fn clear(&mut self, message: impl Into<String>) {
        self.frame = None;
        self.placeholder = message.into();
    }
}

impl Widget for &FrameWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(frame) = self.frame.as_ref().filter(|f| f.width > 0 && f.height > 0) else {
            centered_text(area, buf, &self.placeholder, Style::default());
            return;
        };
        if area.width == 0 || area.height == 0 {
            return;
        }

        // Each terminal cell displays 2 vertical pixels using half-block characters
        let frame_aspect = frame.width as f64 / frame.height as f64;
        let term_width = area.width as f64;
        let term_height = (area.height * 2) as f64;

        let (display_width, display_height) = if term_width / term_height > frame_aspect {
            // Terminal is wider - fit to height
            let w = term_height * frame_aspect;
            (w as u16, area.height)
        } else {
            // Terminal is taller - fit to width
            let h = term_width / frame_aspect;
            (area.width, (h / 2.0) as u16)
        };
        if display_width == 0 || display_height == 0 {
            return;
        }

        let x_offset = area.x + (area.width.saturating_sub(display_width)) / 2;
        let y_offset = area.y + (area.height.saturating_sub(display_height)) / 2;

        let x_scale = frame.width as f64 / display_width as f64;
        let y_scale = frame.height as f64 / (display_height * 2) as f64;

        // Upper half (▀) colored with fg, lower half with bg
        for ty in 0..display_height {
            for tx in 0..display_width {
                let column = if self.mirror {
                    display_width - 1 - tx
                } else {
                    tx
                };
                let src_x = (column as f64 * x_scale) as u32;
                let src_y_top = (ty as f64 * 2.0 * y_scale) as u32;
                let src_y_bottom = ((ty as f64 * 2.0 + 1.0) * y_scale) as u32;

                let (r, g, b) = frame.rgb_at(src_x, src_y_top);
                let top = Color::Rgb(r, g, b);
                let (r, g, b) = frame.rgb_at(src_x, src_y_bottom);
                let bottom = Color::Rgb(r, g, b);

                if let Some(cell) = buf.cell_mut((x_offset + tx, y_offset + ty)) {
                    cell.set_char('▀');
                    cell.set_fg(top);
                    cell.set_bg(bottom);
                }
            }
        }
    }
}

/// Generator output
pub struct QrWidget<'a> {
    pub preview: &'a QrPreview,
}

impl Widget for QrWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.preview {
            QrPreview::Empty => {}
            QrPreview::TooLong => centered_text(
                area,
                buf,
                "Input too long for a QR code",
                Style::default().fg(Color::Yellow),
            ),
            QrPreview::Code(code) => {
                let lines = code.to_unicode_lines();
                let width = lines
                    .iter()
                    .map(|l| l.chars().count())
                    .max()
                    .unwrap_or(0);
                if width > area.width as usize || lines.len() > area.height as usize {
                    centered_text(
                        area,
                        buf,
                        "Enlarge the terminal to show the code",
                        Style::default().fg(Color::Yellow),
                    );
                    return;
                }

                let x = area.x + (area.width - width as u16) / 2;
                let y = area.y + (area.height - lines.len() as u16) / 2;
                let style = Style::default().fg(Color::White).bg(Color::Black);
                for (i, line) in lines.iter().enumerate() {
                    buf.set_string(x, y + i as u16, line, style);
                }
            }
        }
    }
}

/// Status bar widget
pub struct StatusBar<'a> {
    pub message: &'a str,
    pub color: Color,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = Style::default().fg(self.color).bg(Color::DarkGray);
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_style(style);
            }
        }

        let text: String = self.message.chars().take(area.width as usize).collect();
        buf.set_string(area.x, area.y, text, style);
    }
}

/// Write `text` in the middle of `area`, clipped to its width
fn centered_text(area: Rect, buf: &mut Buffer, text: &str, style: Style) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let text: String = text.chars().take(area.width as usize).collect();
    let len = text.chars().count() as u16;
    let x = area.x + (area.width.saturating_sub(len)) / 2;
    let y = area.y + area.height / 2;
    buf.set_string(x, y, text, style);
}
