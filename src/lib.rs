// SPDX-License-Identifier: MPL-2.0

//! qrscan - scan, import and generate QR codes
//!
//! This library provides the core functionality of the qrscan application:
//! the screen state machine, the OS capabilities it drives, and the terminal
//! presentation.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: Application state, message handling and effect runner
//! - [`backends`]: Camera, permission, file picker and URL launcher backends
//! - [`qr`]: QR detection and generation
//! - [`storage`]: Photo albums
//! - [`config`]: User configuration handling
//! - [`terminal`]: Terminal screen
//!
//! # Example
//!
//! ```ignore
//! // Typically run via:
//! // qrscan
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod qr;
pub mod storage;
pub mod terminal;

// Re-export commonly used types
pub use app::{AppState, Effect, Message};
pub use config::Config;
pub use errors::{AppError, AppResult};
