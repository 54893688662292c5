// SPDX-License-Identifier: GPL-3.0-only

//! Scan and confirmation handlers
//!
//! A decode event is accepted only while nothing is pending. It raises the
//! Open/Cancel prompt; Cancel resumes scanning, Open hands the payload to
//! the URL launcher and leaves the scanner paused until Scan Again.

use crate::app::state::{AppState, ConfirmPrompt, Effect, Effects, Notice, ScanResult};
use crate::errors::LaunchError;
use tracing::{debug, info, warn};

impl AppState {
    pub(crate) fn handle_decoded(&mut self, result: ScanResult) -> Effects {
        if self.scanned {
            debug!(payload = %result.payload_data, "Ignoring decode while a scan is pending");
            return Vec::new();
        }

        info!(
            payload_type = %result.payload_type,
            payload = %result.payload_data,
            "QR code scanned"
        );
        self.scanned = true;
        self.scanned_text = result.payload_data.clone();
        self.prompt = Some(ConfirmPrompt::open_link(result.payload_data.clone()));
        self.last_scan = Some(result);
        Vec::new()
    }

    pub(crate) fn handle_confirm_open(&mut self) -> Effects {
        let Some(prompt) = self.prompt.take() else {
            return Vec::new();
        };
        info!(url = %prompt.payload, "User chose to open scanned link");
        vec![Effect::OpenLink(prompt.payload)]
    }

    pub(crate) fn handle_confirm_cancel(&mut self) -> Effects {
        if self.prompt.take().is_some() {
            debug!("Scan prompt cancelled, resuming scanning");
            self.scanned = false;
        }
        Vec::new()
    }

    pub(crate) fn handle_scan_again(&mut self) -> Effects {
        // The prompt has to be answered first
        if !self.scanned || self.prompt.is_some() {
            return Vec::new();
        }
        debug!("Scanning again");
        self.scanned = false;
        Vec::new()
    }

    pub(crate) fn handle_link_opened(&mut self, result: Result<(), LaunchError>) -> Effects {
        if let Err(e) = result {
            warn!(error = %e, "Scanned link could not be opened");
            self.notice = Some(Notice::error(e.to_string()));
        }
        Vec::new()
    }
}
