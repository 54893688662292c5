// SPDX-License-Identifier: GPL-3.0-only

//! OS capabilities used by the scanner
//!
//! Each capability is a trait returning boxed futures so the state machine
//! can be driven by real backends or by fakes in tests.

pub mod camera;
pub mod launcher;
pub mod permissions;
pub mod picker;

pub use launcher::{SystemOpener, UrlOpener, open_link};
pub use permissions::{PermissionKind, PermissionProvider, PermissionState, SystemPermissions};
pub use picker::{DialogPicker, ImagePicker, PickOutcome};
