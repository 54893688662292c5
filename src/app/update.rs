// SPDX-License-Identifier: GPL-3.0-only

//! Message update handling
//!
//! This module handles all application messages by routing them to focused handler methods.
//! The main `update()` function acts as a dispatcher, while specific handlers are implemented
//! in the `handlers` submodules organized by functional domain.
//!
//! # Handler Modules
//!
//! - `handlers::permissions`: camera/library permission results and retry
//! - `handlers::scan`: decode events, confirmation prompt, link opening
//! - `handlers::gallery`: gallery import
//! - `handlers::capture`: photo capture and album saving
//! - `handlers::generator`: generator text input

use crate::app::state::{AppState, Effects, Focus, Message};
use tracing::debug;

impl AppState {
    /// Main message handler - routes messages to appropriate handler methods.
    ///
    /// Returns the side effects the caller must run; their results come back
    /// as further messages.
    pub fn update(&mut self, message: Message) -> Effects {
        match message {
            // ===== Permissions =====
            Message::PermissionResolved(kind, state) => {
                self.handle_permission_resolved(kind, state)
            }
            Message::AllowCamera => self.handle_allow_camera(),

            // ===== Scan & Confirm =====
            Message::Decoded(result) => self.handle_decoded(result),
            Message::ConfirmOpen => self.handle_confirm_open(),
            Message::ConfirmCancel => self.handle_confirm_cancel(),
            Message::ScanAgain => self.handle_scan_again(),
            Message::LinkOpened(result) => self.handle_link_opened(result),

            // ===== Gallery =====
            Message::ImportFromGallery => self.handle_import_from_gallery(),
            Message::GalleryImported(outcome) => self.handle_gallery_imported(outcome),

            // ===== Capture & Save =====
            Message::CaptureImage => self.handle_capture_image(),
            Message::Captured(result) => self.handle_captured(result),
            Message::ImageSaved(result) => self.handle_image_saved(result),

            // ===== Generator =====
            Message::InputChanged(text) => self.handle_input_changed(text),

            // ===== UI =====
            Message::ToggleFocus => {
                self.focus = match self.focus {
                    Focus::Controls => Focus::Input,
                    Focus::Input => Focus::Controls,
                };
                debug!(focus = ?self.focus, "Focus toggled");
                Vec::new()
            }
            Message::DismissNotice => {
                self.notice = None;
                Vec::new()
            }
            Message::Quit => {
                self.should_quit = true;
                Vec::new()
            }
        }
    }
}
