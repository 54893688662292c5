// SPDX-License-Identifier: GPL-3.0-only

//! Terminal QR scanner
//!
//! Renders the camera feed to the terminal using Unicode half-block characters
//! and drives [`AppState`] from key presses, preview frames and finished
//! effects.

mod scanner;
mod view;
mod widgets;

pub use scanner::ScanSubscription;
pub use widgets::{FrameWidget, QrWidget, StatusBar};

use crate::app::{AppState, Capabilities, Effects, Focus, Message, Screen, run_effect};
use crate::backends::camera::{
    CameraFrame, CameraPipeline, FrameReceiver, LatestFrame, select_camera,
};
use crate::config::Config;
use crate::constants::timing;
use crate::errors::{AppResult, CameraError};
use crate::qr::QrDetector;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, stdout};
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{error, info, warn};

/// Run the terminal scanner
pub fn run(config: Config) -> AppResult<()> {
    gstreamer::init()?;
    let runtime = Runtime::new()?;

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &runtime, &config);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Running preview pipeline and its frames
struct Preview {
    _pipeline: CameraPipeline,
    receiver: FrameReceiver,
}

impl Preview {
    fn start(config: &Config) -> Result<Self, CameraError> {
        let device = select_camera(config.camera_device.as_deref(), None)?;
        info!(device = %device.name, "Starting camera preview");
        let (pipeline, receiver) = CameraPipeline::start(&device)?;
        Ok(Self {
            _pipeline: pipeline,
            receiver,
        })
    }

    fn try_get_frame(&mut self) -> Option<CameraFrame> {
        self.receiver.try_next().ok().flatten()
    }
}

/// Outcome of [`PreviewSlot::sync`]
#[derive(Debug, PartialEq, Eq)]
enum PreviewChange<E> {
    Unchanged,
    Started,
    Failed(E),
    Stopped,
}

/// A preview that runs only while the main screen shows
///
/// A failed start is not retried on the same visit; leaving the main screen
/// (for example through the permission screen) clears the failure.
struct PreviewSlot<P> {
    active: Option<P>,
    failed: bool,
}

impl<P> PreviewSlot<P> {
    fn new() -> Self {
        Self {
            active: None,
            failed: false,
        }
    }

    fn sync<E>(
        &mut self,
        on_main: bool,
        start: impl FnOnce() -> Result<P, E>,
    ) -> PreviewChange<E> {
        if !on_main {
            self.failed = false;
            return match self.active.take() {
                Some(_) => PreviewChange::Stopped,
                None => PreviewChange::Unchanged,
            };
        }
        if self.active.is_some() || self.failed {
            return PreviewChange::Unchanged;
        }
        match start() {
            Ok(preview) => {
                self.active = Some(preview);
                PreviewChange::Started
            }
            Err(e) => {
                self.failed = true;
                PreviewChange::Failed(e)
            }
        }
    }

    fn active_mut(&mut self) -> Option<&mut P> {
        self.active.as_mut()
    }
}

/// Owns the state and routes messages and effects
struct Shell<'a> {
    state: AppState,
    caps: Capabilities,
    runtime: &'a Runtime,
    replies: UnboundedSender<Message>,
}

impl Shell<'_> {
    fn dispatch(&mut self, message: Message) {
        let effects = self.state.update(message);
        self.spawn(effects);
    }

    fn spawn(&self, effects: Effects) {
        for effect in effects {
            let caps = self.caps.clone();
            let replies = self.replies.clone();
            self.runtime.spawn(async move {
                let message = run_effect(effect, &caps).await;
                // The UI loop is gone once the receiver drops
                let _ = replies.send(message);
            });
        }
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    runtime: &Runtime,
    config: &Config,
) -> AppResult<()> {
    let latest = LatestFrame::new();
    let (replies, mut inbox): (UnboundedSender<Message>, UnboundedReceiver<Message>) =
        unbounded_channel();

    let mut shell = Shell {
        state: AppState::new(config),
        caps: Capabilities::system(config, latest.clone()),
        runtime,
        replies,
    };
    let startup = shell.state.init();
    shell.spawn(startup);

    let mut subscription = ScanSubscription::new(
        QrDetector::with_max_dimension(config.max_detect_dimension),
        Duration::from_millis(config.scan_interval_ms),
    );
    let mut frame_widget = FrameWidget::new(config.mirror_preview);
    let mut preview: PreviewSlot<Preview> = PreviewSlot::new();

    while !shell.state.should_quit {
        // Results of finished effects
        while let Ok(message) = inbox.try_recv() {
            shell.dispatch(message);
        }

        let on_main = shell.state.screen() == Screen::Main;
        match preview.sync(on_main, || Preview::start(config)) {
            PreviewChange::Failed(e) => {
                error!(error = %e, "Failed to start camera preview");
                frame_widget.clear(format!("Camera unavailable: {e}"));
            }
            PreviewChange::Stopped => {
                latest.clear();
                frame_widget = FrameWidget::new(config.mirror_preview);
            }
            PreviewChange::Started | PreviewChange::Unchanged => {}
        }

        // Drain all available frames to get the latest
        subscription.sync(shell.state.scanner_attached());
        if let Some(active) = preview.active_mut() {
            while let Some(frame) = active.try_get_frame() {
                subscription.submit(&frame, runtime.handle());
                latest.store(frame.clone());
                frame_widget.update_frame(frame);
            }
        }
        for event in subscription.drain() {
            shell.dispatch(Message::Decoded(event));
            subscription.sync(shell.state.scanner_attached());
        }

        terminal.draw(|f| view::draw(f, &shell.state, &frame_widget))?;

        // Handle input with timeout for frame updates
        if event::poll(timing::INPUT_POLL)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && let Some(message) = key_to_message(key, &shell.state)
        {
            shell.dispatch(message);
        }
    }

    if preview.failed {
        warn!("Exited without a working camera preview");
    }
    Ok(())
}

/// Map a key press to a message for the current state
pub fn key_to_message(key: KeyEvent, state: &AppState) -> Option<Message> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(Message::Quit);
    }

    // The prompt takes every key while it is open. Keys typed into the text
    // field never answer it; Tab hands focus to the prompt first.
    if state.prompt.is_some() && state.focus == Focus::Input {
        return match key.code {
            KeyCode::Tab => Some(Message::ToggleFocus),
            KeyCode::Esc => Some(Message::ConfirmCancel),
            _ => None,
        };
    }
    if state.prompt.is_some() {
        return match key.code {
            KeyCode::Char('y') | KeyCode::Enter => Some(Message::ConfirmOpen),
            KeyCode::Char('n') | KeyCode::Esc => Some(Message::ConfirmCancel),
            _ => None,
        };
    }

    match state.screen() {
        Screen::Loading => match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            _ => None,
        },
        Screen::PermissionDenied => match key.code {
            KeyCode::Char('a') => Some(Message::AllowCamera),
            KeyCode::Char('q') => Some(Message::Quit),
            _ => None,
        },
        Screen::Main if state.focus == Focus::Input => {
            let mut text = state.generator.text.clone();
            match key.code {
                KeyCode::Tab | KeyCode::Esc => Some(Message::ToggleFocus),
                KeyCode::Backspace => {
                    text.pop()?;
                    Some(Message::InputChanged(text))
                }
                KeyCode::Char(c) => {
                    text.push(c);
                    Some(Message::InputChanged(text))
                }
                _ => None,
            }
        }
        Screen::Main => match key.code {
            KeyCode::Tab => Some(Message::ToggleFocus),
            KeyCode::Char('g') => Some(Message::ImportFromGallery),
            KeyCode::Char('c') => Some(Message::CaptureImage),
            KeyCode::Char('r') if state.scanned => Some(Message::ScanAgain),
            KeyCode::Esc if state.notice.is_some() => Some(Message::DismissNotice),
            KeyCode::Char('q') => Some(Message::Quit),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ScanResult;
    use crate::backends::{PermissionKind, PermissionState};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn main_screen() -> AppState {
        let mut state = AppState::new(&Config::default());
        state.update(Message::PermissionResolved(
            PermissionKind::Camera,
            PermissionState::Granted,
        ));
        state
    }

    #[test]
    fn test_ctrl_c_always_quits() {
        let mut state = main_screen();
        state.update(Message::ToggleFocus);
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(matches!(key_to_message(key, &state), Some(Message::Quit)));
    }

    #[test]
    fn test_prompt_keys() {
        let mut state = main_screen();
        state.update(Message::Decoded(ScanResult {
            payload_type: "qr".to_string(),
            payload_data: "https://example.com".to_string(),
        }));

        assert!(matches!(
            key_to_message(press(KeyCode::Enter), &state),
            Some(Message::ConfirmOpen)
        ));
        assert!(matches!(
            key_to_message(press(KeyCode::Esc), &state),
            Some(Message::ConfirmCancel)
        ));
        // 'q' is swallowed by the prompt
        assert!(key_to_message(press(KeyCode::Char('q')), &state).is_none());
    }

    #[test]
    fn test_denied_screen_offers_retry_only() {
        let mut state = AppState::new(&Config::default());
        state.update(Message::PermissionResolved(
            PermissionKind::Camera,
            PermissionState::Denied,
        ));

        assert!(matches!(
            key_to_message(press(KeyCode::Char('a')), &state),
            Some(Message::AllowCamera)
        ));
        assert!(key_to_message(press(KeyCode::Char('g')), &state).is_none());
    }

    #[test]
    fn test_input_focus_edits_text() {
        let mut state = main_screen();
        state.update(Message::ToggleFocus);
        state.update(Message::InputChanged("ab".to_string()));

        match key_to_message(press(KeyCode::Char('c')), &state) {
            Some(Message::InputChanged(text)) => assert_eq!(text, "abc"),
            other => panic!("unexpected message: {other:?}"),
        }
        match key_to_message(press(KeyCode::Backspace), &state) {
            Some(Message::InputChanged(text)) => assert_eq!(text, "a"),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_backspace_on_empty_input_is_ignored() {
        let mut state = main_screen();
        state.update(Message::ToggleFocus);
        assert!(key_to_message(press(KeyCode::Backspace), &state).is_none());
    }

    #[test]
    fn test_prompt_ignores_typing_in_text_field() {
        let mut state = main_screen();
        state.update(Message::ToggleFocus);
        state.update(Message::Decoded(ScanResult {
            payload_type: "qr".to_string(),
            payload_data: "https://example.com".to_string(),
        }));

        assert!(key_to_message(press(KeyCode::Char('y')), &state).is_none());
        assert!(key_to_message(press(KeyCode::Enter), &state).is_none());
        assert!(matches!(
            key_to_message(press(KeyCode::Esc), &state),
            Some(Message::ConfirmCancel)
        ));
        assert!(matches!(
            key_to_message(press(KeyCode::Tab), &state),
            Some(Message::ToggleFocus)
        ));

        state.update(Message::ToggleFocus);
        assert!(matches!(
            key_to_message(press(KeyCode::Char('y')), &state),
            Some(Message::ConfirmOpen)
        ));
    }

    #[test]
    fn test_failed_preview_retries_after_leaving_main() {
        let mut slot: PreviewSlot<u8> = PreviewSlot::new();
        let mut attempts = 0;

        let change = slot.sync(true, || {
            attempts += 1;
            Err("busy")
        });
        assert_eq!(change, PreviewChange::Failed("busy"));

        // Same visit: no retry
        let change = slot.sync(true, || {
            attempts += 1;
            Ok::<u8, &str>(1)
        });
        assert_eq!(change, PreviewChange::Unchanged);
        assert_eq!(attempts, 1);

        // Denied and allowed again
        assert_eq!(slot.sync(false, || Ok::<u8, &str>(1)), PreviewChange::Unchanged);
        let change = slot.sync(true, || {
            attempts += 1;
            Ok::<u8, &str>(1)
        });
        assert_eq!(change, PreviewChange::Started);
        assert_eq!(attempts, 2);
        assert!(slot.active_mut().is_some());

        assert_eq!(slot.sync(false, || Ok::<u8, &str>(1)), PreviewChange::Stopped);
        assert!(slot.active_mut().is_none());
    }

    #[test]
    fn test_scan_again_only_while_scanned() {
        let mut state = main_screen();
        assert!(key_to_message(press(KeyCode::Char('r')), &state).is_none());

        state.update(Message::Decoded(ScanResult {
            payload_type: "qr".to_string(),
            payload_data: "x".to_string(),
        }));
        state.update(Message::ConfirmOpen);
        assert!(matches!(
            key_to_message(press(KeyCode::Char('r')), &state),
            Some(Message::ScanAgain)
        ));
    }
}
