// SPDX-License-Identifier: GPL-3.0-only

//! Screen layout
//!
//! The permission state picks one of three screens. The main screen puts the
//! camera preview next to the generator, with the confirmation prompt drawn
//! over everything while it is open.

use super::widgets::{FrameWidget, QrWidget, StatusBar};
use crate::app::{AppState, ConfirmPrompt, Focus, NoticeLevel, Screen};
use crate::constants::prompt;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style, Stylize},
    text::Line,
    widgets::{Block, Clear, Paragraph, Wrap},
};

pub const REQUESTING_CAMERA: &str = "Requesting camera permission...";
pub const NO_CAMERA_ACCESS: &str = "No access to camera";
pub const ALLOW_CAMERA: &str = "[a] Allow Camera";

/// Draw the whole screen
pub fn draw(f: &mut Frame, state: &AppState, preview: &FrameWidget) {
    let [body, status] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(f.area());

    match state.screen() {
        Screen::Loading => {
            f.render_widget(message_screen(vec![Line::from(REQUESTING_CAMERA)]), body);
        }
        Screen::PermissionDenied => {
            let lines = vec![
                Line::from(NO_CAMERA_ACCESS).bold(),
                Line::from(""),
                Line::from(ALLOW_CAMERA).fg(Color::Cyan),
            ];
            f.render_widget(message_screen(lines), body);
        }
        Screen::Main => draw_main(f, body, state, preview),
    }

    let (message, color) = status_line(state);
    f.render_widget(
        StatusBar {
            message: &message,
            color,
        },
        status,
    );

    if let Some(prompt) = &state.prompt {
        draw_prompt(f, body, prompt, state.focus == Focus::Controls);
    }
}

fn message_screen(lines: Vec<Line<'_>>) -> Paragraph<'_> {
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::bordered().title(" QR Scanner "))
}

fn draw_main(f: &mut Frame, area: Rect, state: &AppState, preview: &FrameWidget) {
    let [scanner, generator] =
        Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(area);

    // Scanner: preview above the last-scanned label
    let scanner_block = Block::bordered().title(" Scanner ");
    let inner = scanner_block.inner(scanner);
    f.render_widget(scanner_block, scanner);
    let [camera, label] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);
    f.render_widget(preview, camera);
    f.render_widget(
        Paragraph::new(Line::from(vec![
            "Last scanned: ".dark_gray(),
            state.scanned_text.as_str().into(),
        ])),
        label,
    );

    // Generator: input line above the QR preview
    let [input, code] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(1)]).areas(generator);
    let input_style = if state.focus == Focus::Input {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let mut text = state.generator.text.clone();
    if state.focus == Focus::Input {
        text.push('_');
    }
    f.render_widget(
        Paragraph::new(text).block(
            Block::bordered()
                .title(" Text to encode ")
                .border_style(input_style),
        ),
        input,
    );

    let code_block = Block::bordered().title(" QR Code ");
    let code_inner = code_block.inner(code);
    f.render_widget(code_block, code);
    f.render_widget(
        QrWidget {
            preview: &state.generator.preview,
        },
        code_inner,
    );
}

/// `answerable` is false while the text field holds focus
fn draw_prompt(f: &mut Frame, area: Rect, confirm: &ConfirmPrompt, answerable: bool) {
    let popup = centered_rect(area, 50, 8);
    let choices = if answerable {
        format!("[n] {}    [y] {}", prompt::CANCEL, prompt::OPEN)
    } else {
        format!("[Esc] {}    [Tab] answer", prompt::CANCEL)
    };
    let lines = vec![
        Line::from(confirm.message),
        Line::from(""),
        Line::from(confirm.payload.as_str()).fg(Color::Cyan),
        Line::from(""),
        Line::from(choices).bold(),
    ];
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false })
            .block(Block::bordered().title(format!(" {} ", confirm.title))),
        popup,
    );
}

/// Notice if one is showing, otherwise the keys that apply right now
fn status_line(state: &AppState) -> (String, Color) {
    if let Some(notice) = &state.notice {
        let color = match notice.level {
            NoticeLevel::Info => Color::Green,
            NoticeLevel::Error => Color::LightRed,
        };
        return (notice.text.clone(), color);
    }

    let hints = match (state.screen(), state.focus) {
        (_, Focus::Input) if state.prompt.is_some() => "Tab answer the prompt | Esc cancel",
        _ if state.prompt.is_some() => "y/Enter open | n/Esc cancel",
        (Screen::Loading, _) => "q quit",
        (Screen::PermissionDenied, _) => "a allow camera | q quit",
        (Screen::Main, Focus::Input) => "type to encode | Tab/Esc back to controls",
        (Screen::Main, Focus::Controls) if state.scanned => {
            "r scan again | g gallery | c capture | Tab edit text | q quit"
        }
        (Screen::Main, Focus::Controls) => "g gallery | c capture | Tab edit text | q quit",
    };
    (hints.to_string(), Color::White)
}

/// A `width` x `height` rectangle centered in `area`, clamped to it
fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
