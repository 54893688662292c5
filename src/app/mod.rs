// SPDX-License-Identifier: MPL-2.0

//! Main application module for the QR scanner
//!
//! This module contains the application state, message handling and the
//! effect runner. Presentation lives in [`crate::terminal`].
//!
//! # Architecture
//!
//! - `state`: Application state types (AppState, Message, Effect, etc.)
//! - `update`: Message dispatch
//! - `handlers`: Message handlers grouped by feature
//! - `effects`: Runs effects against the OS capabilities
//!
//! # Main Types
//!
//! - `AppState`: The single screen's state
//! - `Message`: All possible user interactions and system events
//! - `Effect`: Side effects a transition asks for

mod effects;
mod handlers;
mod state;
mod update;

pub use effects::{Capabilities, run_effect};
pub use state::{
    AppState, CaptureResult, ConfirmPrompt, Effect, Effects, Focus, GalleryOutcome,
    GeneratorState, Message, Notice, NoticeLevel, ScanResult, Screen,
};
