// SPDX-License-Identifier: GPL-3.0-only

//! Application state management

use crate::backends::camera::CaptureOutcome;
use crate::backends::{PermissionKind, PermissionState};
use crate::config::Config;
use crate::constants::{NOT_YET_SCANNED, prompt};
use crate::errors::{CameraError, DecodeError, LaunchError, StorageError};
use crate::qr::QrPreview;
use crate::storage::{PhotoAsset, SavedAsset};

/// A decoded code delivered by the scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    /// Symbology reported by the decoder (e.g. "qr")
    pub payload_type: String,
    pub payload_data: String,
}

/// Which screen the permission state selects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Camera permission not resolved yet
    Loading,
    /// Camera permission denied; offers a retry
    PermissionDenied,
    /// Scanner, generator and import/capture controls
    Main,
}

/// Where keyboard input goes on the main screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Controls,
    /// Generator text field
    Input,
}

/// The Open/Cancel prompt for a scanned payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPrompt {
    pub title: &'static str,
    pub message: &'static str,
    pub payload: String,
}

impl ConfirmPrompt {
    pub fn open_link(payload: String) -> Self {
        Self {
            title: prompt::TITLE,
            message: prompt::MESSAGE,
            payload,
        }
    }
}

/// Severity of a status notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Non-blocking message shown in the status area
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// Result of a gallery import
#[derive(Debug, Clone)]
pub enum GalleryOutcome {
    Cancelled,
    /// Library access was refused
    PermissionDenied,
    Decoded(Result<Vec<String>, DecodeError>),
}

/// Result of the capture half of Capture & Save
#[derive(Debug, Clone)]
pub enum CaptureResult {
    PermissionDenied,
    Finished(Result<CaptureOutcome, CameraError>),
}

/// Messages emitted by the terminal and by finished effects
#[derive(Debug, Clone)]
pub enum Message {
    // ===== Permissions =====
    PermissionResolved(PermissionKind, PermissionState),
    /// "Allow Camera" on the denied screen
    AllowCamera,

    // ===== Scan & Confirm =====
    Decoded(ScanResult),
    ConfirmOpen,
    ConfirmCancel,
    ScanAgain,
    LinkOpened(Result<(), LaunchError>),

    // ===== Gallery =====
    ImportFromGallery,
    GalleryImported(GalleryOutcome),

    // ===== Capture & Save =====
    CaptureImage,
    Captured(CaptureResult),
    ImageSaved(Result<SavedAsset, StorageError>),

    // ===== Generator =====
    InputChanged(String),

    // ===== UI =====
    ToggleFocus,
    DismissNotice,
    Quit,
}

/// Side effects requested by a state transition
#[derive(Debug, Clone)]
pub enum Effect {
    RequestPermission(PermissionKind),
    OpenLink(String),
    /// Pick an image and decode it
    ImportFromGallery,
    /// Ask for camera permission and take a still
    CaptureImage,
    SaveImage { asset: PhotoAsset, album: String },
}

pub type Effects = Vec<Effect>;

/// Generator text field and its preview
#[derive(Debug, Clone)]
pub struct GeneratorState {
    pub text: String,
    pub preview: QrPreview,
}

impl Default for GeneratorState {
    fn default() -> Self {
        Self {
            text: String::new(),
            preview: QrPreview::Empty,
        }
    }
}

/// The complete state of the single screen
///
/// Owned by the UI loop; every transition goes through [`AppState::update`].
#[derive(Debug, Clone)]
pub struct AppState {
    pub camera_permission: PermissionState,
    pub library_permission: PermissionState,
    /// True while a scanned payload awaits or has received confirmation
    pub scanned: bool,
    /// Latest decoded code
    pub last_scan: Option<ScanResult>,
    /// Label under the preview
    pub scanned_text: String,
    pub prompt: Option<ConfirmPrompt>,
    pub notice: Option<Notice>,
    pub generator: GeneratorState,
    pub focus: Focus,
    /// Album captured photos go into
    pub album_name: String,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            camera_permission: PermissionState::Unknown,
            library_permission: PermissionState::Unknown,
            scanned: false,
            last_scan: None,
            scanned_text: NOT_YET_SCANNED.to_string(),
            prompt: None,
            notice: None,
            generator: GeneratorState::default(),
            focus: Focus::default(),
            album_name: config.album_name.clone(),
            should_quit: false,
        }
    }

    /// Effects to run when the screen first appears
    pub fn init(&self) -> Effects {
        vec![
            Effect::RequestPermission(PermissionKind::Camera),
            Effect::RequestPermission(PermissionKind::Library),
        ]
    }

    /// Screen selected by the camera permission
    pub fn screen(&self) -> Screen {
        match self.camera_permission {
            PermissionState::Unknown => Screen::Loading,
            PermissionState::Denied => Screen::PermissionDenied,
            PermissionState::Granted => Screen::Main,
        }
    }

    /// Whether decode events should currently be delivered
    pub fn scanner_attached(&self) -> bool {
        self.screen() == Screen::Main && !self.scanned
    }
}
