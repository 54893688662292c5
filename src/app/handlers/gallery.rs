// SPDX-License-Identifier: GPL-3.0-only

//! Gallery import handlers

use crate::app::state::{AppState, Effect, Effects, GalleryOutcome, Notice};
use crate::backends::PermissionState;
use crate::constants::notices;
use tracing::{debug, info, warn};

impl AppState {
    /// Library permission is (re)requested by the import itself
    pub(crate) fn handle_import_from_gallery(&mut self) -> Effects {
        vec![Effect::ImportFromGallery]
    }

    pub(crate) fn handle_gallery_imported(&mut self, outcome: GalleryOutcome) -> Effects {
        match outcome {
            GalleryOutcome::PermissionDenied => {
                self.library_permission = PermissionState::Denied;
                self.notice = Some(Notice::error(notices::NO_LIBRARY_ACCESS));
            }
            GalleryOutcome::Cancelled => {
                self.library_permission = PermissionState::Granted;
                debug!("Gallery import cancelled");
            }
            GalleryOutcome::Decoded(Ok(payloads)) => {
                self.library_permission = PermissionState::Granted;
                if let Some(first) = payloads.first() {
                    info!(count = payloads.len(), "QR codes found in imported image");
                    self.scanned_text = first.clone();
                    self.notice = Some(Notice::info(format!(
                        "Found {} QR code(s): {}",
                        payloads.len(),
                        payloads.join(", ")
                    )));
                } else {
                    self.notice = Some(Notice::info(notices::NO_QR_FOUND));
                }
            }
            GalleryOutcome::Decoded(Err(e)) => {
                self.library_permission = PermissionState::Granted;
                warn!(error = %e, "Failed to decode imported image");
                self.notice = Some(Notice::error(e.to_string()));
            }
        }
        Vec::new()
    }
}
