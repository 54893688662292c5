// SPDX-License-Identifier: GPL-3.0-only

//! Capture & save handlers
//!
//! Capturing asks for camera access on its own, independent of the startup
//! gate. Saving needs library access; without it the photo is dropped with a
//! notice and access is requested again for the next attempt.

use crate::app::state::{AppState, CaptureResult, Effect, Effects, Notice};
use crate::backends::PermissionKind;
use crate::backends::camera::CaptureOutcome;
use crate::constants::notices;
use crate::errors::StorageError;
use crate::storage::SavedAsset;
use tracing::{debug, error, info, warn};

impl AppState {
    pub(crate) fn handle_capture_image(&mut self) -> Effects {
        vec![Effect::CaptureImage]
    }

    pub(crate) fn handle_captured(&mut self, result: CaptureResult) -> Effects {
        match result {
            CaptureResult::PermissionDenied => {
                warn!("Capture refused: no camera access");
                self.notice = Some(Notice::error(notices::NO_CAMERA_ACCESS));
                Vec::new()
            }
            CaptureResult::Finished(Ok(CaptureOutcome::Cancelled)) => {
                debug!("Capture cancelled, nothing to save");
                Vec::new()
            }
            CaptureResult::Finished(Ok(CaptureOutcome::Captured(asset))) => {
                if !self.library_permission.is_granted() {
                    warn!("Captured photo dropped: no library access");
                    self.notice = Some(Notice::error(notices::NO_LIBRARY_ACCESS));
                    return vec![Effect::RequestPermission(PermissionKind::Library)];
                }
                debug!(
                    bytes = asset.bytes.len(),
                    album = %self.album_name,
                    "Saving captured photo"
                );
                vec![Effect::SaveImage {
                    asset,
                    album: self.album_name.clone(),
                }]
            }
            CaptureResult::Finished(Err(e)) => {
                error!(error = %e, "Capture failed");
                self.notice = Some(Notice::error(format!("Failed to capture image: {e}")));
                Vec::new()
            }
        }
    }

    pub(crate) fn handle_image_saved(
        &mut self,
        result: Result<SavedAsset, StorageError>,
    ) -> Effects {
        match result {
            Ok(saved) => {
                info!(
                    path = %saved.path.display(),
                    created_album = saved.created_album,
                    "Image saved"
                );
                self.notice = Some(Notice::info(notices::SAVE_OK));
            }
            Err(e) => {
                error!(error = %e, "Failed to save image");
                self.notice = Some(Notice::error(notices::SAVE_FAILED));
            }
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::app::state::{AppState, CaptureResult, Effect, Message, NoticeLevel};
    use crate::backends::camera::CaptureOutcome;
    use crate::backends::{PermissionKind, PermissionState};
    use crate::config::Config;
    use crate::constants::notices;
    use crate::errors::{CameraError, StorageError};
    use crate::storage::{PhotoAsset, SavedAsset};
    use std::path::PathBuf;

    fn asset() -> PhotoAsset {
        PhotoAsset {
            bytes: vec![0xFF, 0xD8, 0xFF],
            extension: "jpg",
            captured_at: chrono::Local::now(),
        }
    }

    fn state_with_library(library: PermissionState) -> AppState {
        let config = Config {
            album_name: "Trips".to_string(),
            ..Config::default()
        };
        let mut state = AppState::new(&config);
        state.update(Message::PermissionResolved(PermissionKind::Library, library));
        state
    }

    #[test]
    fn test_capture_requests_effect() {
        let mut state = state_with_library(PermissionState::Granted);
        let effects = state.update(Message::CaptureImage);
        assert!(matches!(effects.as_slice(), [Effect::CaptureImage]));
    }

    #[test]
    fn test_captured_photo_saved_into_configured_album() {
        let mut state = state_with_library(PermissionState::Granted);
        let effects = state.update(Message::Captured(CaptureResult::Finished(Ok(
            CaptureOutcome::Captured(asset()),
        ))));

        match effects.as_slice() {
            [Effect::SaveImage { asset, album }] => {
                assert_eq!(album, "Trips");
                assert_eq!(asset.bytes, vec![0xFF, 0xD8, 0xFF]);
            }
            other => panic!("unexpected effects: {other:?}"),
        }
    }

    #[test]
    fn test_cancelled_capture_does_nothing() {
        let mut state = state_with_library(PermissionState::Granted);
        let effects = state.update(Message::Captured(CaptureResult::Finished(Ok(
            CaptureOutcome::Cancelled,
        ))));
        assert!(effects.is_empty());
        assert!(state.notice.is_none());
    }

    #[test]
    fn test_save_without_library_access() {
        let mut state = state_with_library(PermissionState::Denied);
        let effects = state.update(Message::Captured(CaptureResult::Finished(Ok(
            CaptureOutcome::Captured(asset()),
        ))));

        assert!(matches!(
            effects.as_slice(),
            [Effect::RequestPermission(PermissionKind::Library)]
        ));
        assert_eq!(
            state.notice.as_ref().map(|n| n.text.as_str()),
            Some(notices::NO_LIBRARY_ACCESS)
        );
    }

    #[test]
    fn test_capture_errors_are_reported() {
        let mut state = state_with_library(PermissionState::Granted);
        state.update(Message::Captured(CaptureResult::Finished(Err(
            CameraError::NoCameraFound,
        ))));
        assert_eq!(state.notice.as_ref().unwrap().level, NoticeLevel::Error);

        state.update(Message::Captured(CaptureResult::PermissionDenied));
        assert_eq!(
            state.notice.as_ref().map(|n| n.text.as_str()),
            Some(notices::NO_CAMERA_ACCESS)
        );
    }

    #[test]
    fn test_save_acknowledged_both_ways() {
        let mut state = state_with_library(PermissionState::Granted);

        state.update(Message::ImageSaved(Ok(SavedAsset {
            path: PathBuf::from("/tmp/Trips/IMG.jpg"),
            created_album: true,
        })));
        assert_eq!(
            state.notice.as_ref().map(|n| n.text.as_str()),
            Some(notices::SAVE_OK)
        );

        state.update(Message::ImageSaved(Err(StorageError::Io(
            "disk full".to_string(),
        ))));
        let notice = state.notice.as_ref().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.text, notices::SAVE_FAILED);
    }
}
