// SPDX-License-Identifier: GPL-3.0-only

//! Effect runner
//!
//! Effects returned by [`AppState::update`](super::AppState::update) are run
//! here against a set of capabilities. Every effect resolves to exactly one
//! message that is fed back into the state.

use super::state::{CaptureResult, Effect, GalleryOutcome, Message};
use crate::backends::camera::{LatestFrame, PreviewStill, StillCamera};
use crate::backends::{
    DialogPicker, ImagePicker, PermissionKind, PermissionProvider, PickOutcome, SystemOpener,
    SystemPermissions, UrlOpener, open_link,
};
use crate::config::Config;
use crate::qr::{ImageSource, QrDecoder, RqrrDecoder};
use crate::storage::{DirectoryPhotoStore, PhotoStore, save_to_album};
use std::sync::Arc;
use tracing::debug;

/// The OS services the screen talks to
#[derive(Clone)]
pub struct Capabilities {
    pub permissions: Arc<dyn PermissionProvider>,
    pub picker: Arc<dyn ImagePicker>,
    pub decoder: Arc<dyn QrDecoder>,
    pub launcher: Arc<dyn UrlOpener>,
    pub camera: Arc<dyn StillCamera>,
    pub photos: Arc<dyn PhotoStore>,
}

impl Capabilities {
    /// Real backends; stills come from the running preview
    pub fn system(config: &Config, latest_frame: LatestFrame) -> Self {
        let library_root = config.library_root();
        Self {
            permissions: Arc::new(SystemPermissions::new(
                config.permission_backend,
                library_root.clone(),
            )),
            picker: Arc::new(DialogPicker::new(library_root.clone())),
            decoder: Arc::new(RqrrDecoder),
            launcher: Arc::new(SystemOpener),
            camera: Arc::new(PreviewStill::new(latest_frame)),
            photos: Arc::new(DirectoryPhotoStore::new(library_root)),
        }
    }
}

/// Run one effect to completion
pub async fn run_effect(effect: Effect, caps: &Capabilities) -> Message {
    match effect {
        Effect::RequestPermission(kind) => {
            let state = caps.permissions.request(kind).await;
            Message::PermissionResolved(kind, state)
        }
        Effect::OpenLink(url) => {
            Message::LinkOpened(open_link(caps.launcher.as_ref(), &url).await)
        }
        Effect::ImportFromGallery => Message::GalleryImported(import_from_gallery(caps).await),
        Effect::CaptureImage => Message::Captured(capture_image(caps).await),
        Effect::SaveImage { asset, album } => {
            Message::ImageSaved(save_to_album(caps.photos.as_ref(), &asset, &album).await)
        }
    }
}

async fn import_from_gallery(caps: &Capabilities) -> GalleryOutcome {
    if !caps
        .permissions
        .request(PermissionKind::Library)
        .await
        .is_granted()
    {
        return GalleryOutcome::PermissionDenied;
    }

    match caps.picker.pick_image().await {
        PickOutcome::Cancelled => GalleryOutcome::Cancelled,
        PickOutcome::Selected(path) => {
            debug!(path = %path.display(), "Decoding picked image");
            GalleryOutcome::Decoded(caps.decoder.decode(ImageSource::Path(path)).await)
        }
    }
}

async fn capture_image(caps: &Capabilities) -> CaptureResult {
    if !caps
        .permissions
        .request(PermissionKind::Camera)
        .await
        .is_granted()
    {
        return CaptureResult::PermissionDenied;
    }
    CaptureResult::Finished(caps.camera.capture().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::{AppState, Effects, ScanResult};
    use crate::backends::camera::{CameraFrame, CaptureOutcome};
    use crate::backends::{PermissionState, PickOutcome};
    use crate::constants::notices;
    use crate::errors::{CameraError, LaunchError};
    use crate::qr::{QrPreview, generate};
    use futures::FutureExt;
    use futures::future::BoxFuture;
    use std::path::PathBuf;
    use std::sync::Mutex;

    struct FixedPermissions {
        camera: PermissionState,
        library: PermissionState,
    }

    impl PermissionProvider for FixedPermissions {
        fn request(&self, kind: PermissionKind) -> BoxFuture<'_, PermissionState> {
            let state = match kind {
                PermissionKind::Camera => self.camera,
                PermissionKind::Library => self.library,
            };
            futures::future::ready(state).boxed()
        }
    }

    struct FixedPicker(Option<PathBuf>);

    impl ImagePicker for FixedPicker {
        fn pick_image(&self) -> BoxFuture<'_, PickOutcome> {
            let outcome = match &self.0 {
                Some(path) => PickOutcome::Selected(path.clone()),
                None => PickOutcome::Cancelled,
            };
            futures::future::ready(outcome).boxed()
        }
    }

    #[derive(Default)]
    struct RecordingOpener {
        opened: Mutex<Vec<String>>,
    }

    impl RecordingOpener {
        fn opened(&self) -> Vec<String> {
            self.opened.lock().unwrap().clone()
        }
    }

    impl UrlOpener for RecordingOpener {
        fn can_open(&self, url: &str) -> bool {
            SystemOpener.can_open(url)
        }

        fn open(&self, url: &str) -> BoxFuture<'_, Result<(), LaunchError>> {
            self.opened.lock().unwrap().push(url.to_string());
            futures::future::ready(Ok(())).boxed()
        }
    }

    struct Fixture {
        caps: Capabilities,
        opener: Arc<RecordingOpener>,
        _library: tempfile::TempDir,
        library_root: PathBuf,
    }

    fn fixture(
        camera: PermissionState,
        library: PermissionState,
        pick: Option<PathBuf>,
    ) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let library_root = dir.path().to_path_buf();
        let opener = Arc::new(RecordingOpener::default());
        let latest = LatestFrame::new();
        latest.store(CameraFrame::from_rgba(4, 4, vec![200; 64]));

        let caps = Capabilities {
            permissions: Arc::new(FixedPermissions { camera, library }),
            picker: Arc::new(FixedPicker(pick)),
            decoder: Arc::new(RqrrDecoder),
            launcher: opener.clone(),
            camera: Arc::new(PreviewStill::new(latest)),
            photos: Arc::new(DirectoryPhotoStore::new(library_root.clone())),
        };
        Fixture {
            caps,
            opener,
            _library: dir,
            library_root,
        }
    }

    /// Feed a message and run the resulting effects until none are left
    async fn drive(state: &mut AppState, caps: &Capabilities, message: Message) {
        let mut pending: Effects = state.update(message);
        while let Some(effect) = pending.pop() {
            let reply = run_effect(effect, caps).await;
            pending.extend(state.update(reply));
        }
    }

    async fn started(fx: &Fixture) -> AppState {
        let mut state = AppState::new(&Config::default());
        for effect in state.init() {
            let reply = run_effect(effect, &fx.caps).await;
            state.update(reply);
        }
        state
    }

    fn decoded(payload: &str) -> Message {
        Message::Decoded(ScanResult {
            payload_type: "qr".to_string(),
            payload_data: payload.to_string(),
        })
    }

    #[tokio::test]
    async fn test_confirm_opens_exact_url() {
        let fx = fixture(PermissionState::Granted, PermissionState::Granted, None);
        let mut state = started(&fx).await;

        drive(&mut state, &fx.caps, decoded("https://example.com")).await;
        drive(&mut state, &fx.caps, Message::ConfirmOpen).await;

        assert_eq!(fx.opener.opened(), vec!["https://example.com".to_string()]);
        assert!(state.notice.is_none());
    }

    #[tokio::test]
    async fn test_cancel_never_opens() {
        let fx = fixture(PermissionState::Granted, PermissionState::Granted, None);
        let mut state = started(&fx).await;

        drive(&mut state, &fx.caps, decoded("https://example.com")).await;
        drive(&mut state, &fx.caps, Message::ConfirmCancel).await;

        assert!(fx.opener.opened().is_empty());
        assert!(!state.scanned);
    }

    #[tokio::test]
    async fn test_unopenable_payload_is_surfaced() {
        let fx = fixture(PermissionState::Granted, PermissionState::Granted, None);
        let mut state = started(&fx).await;

        drive(&mut state, &fx.caps, decoded("just words")).await;
        drive(&mut state, &fx.caps, Message::ConfirmOpen).await;

        assert!(fx.opener.opened().is_empty());
        assert!(state.notice.is_some());
    }

    #[tokio::test]
    async fn test_denied_camera_selects_denied_screen() {
        let fx = fixture(PermissionState::Denied, PermissionState::Granted, None);
        let state = started(&fx).await;
        assert_eq!(state.screen(), crate::app::Screen::PermissionDenied);
        assert!(!state.scanner_attached());
    }

    #[tokio::test]
    async fn test_gallery_decodes_picked_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("code.png");
        let QrPreview::Code(code) = generate("hello gallery") else {
            panic!("expected a code");
        };
        code.to_image(200).save(&path).unwrap();

        let fx = fixture(
            PermissionState::Granted,
            PermissionState::Granted,
            Some(path),
        );
        let mut state = started(&fx).await;
        drive(&mut state, &fx.caps, Message::ImportFromGallery).await;

        assert_eq!(state.scanned_text, "hello gallery");
        assert!(!state.scanned);
    }

    #[tokio::test]
    async fn test_gallery_blank_image_reports_nothing_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.png");
        image::GrayImage::from_pixel(64, 64, image::Luma([255]))
            .save(&path)
            .unwrap();

        let fx = fixture(
            PermissionState::Granted,
            PermissionState::Granted,
            Some(path),
        );
        let mut state = started(&fx).await;
        drive(&mut state, &fx.caps, Message::ImportFromGallery).await;

        assert_eq!(
            state.notice.as_ref().map(|n| n.text.as_str()),
            Some(notices::NO_QR_FOUND)
        );
    }

    #[tokio::test]
    async fn test_gallery_without_library_access() {
        let fx = fixture(
            PermissionState::Granted,
            PermissionState::Denied,
            Some(PathBuf::from("/nonexistent.png")),
        );
        let mut state = started(&fx).await;
        drive(&mut state, &fx.caps, Message::ImportFromGallery).await;

        assert_eq!(
            state.notice.as_ref().map(|n| n.text.as_str()),
            Some(notices::NO_LIBRARY_ACCESS)
        );
    }

    #[tokio::test]
    async fn test_capture_saves_into_album() {
        let fx = fixture(PermissionState::Granted, PermissionState::Granted, None);
        let mut state = started(&fx).await;

        drive(&mut state, &fx.caps, Message::CaptureImage).await;
        drive(&mut state, &fx.caps, Message::CaptureImage).await;

        assert_eq!(
            state.notice.as_ref().map(|n| n.text.as_str()),
            Some(notices::SAVE_OK)
        );
        let album = fx.library_root.join(&state.album_name);
        assert_eq!(std::fs::read_dir(album).unwrap().count(), 2);
    }

    struct BrokenCamera;

    impl StillCamera for BrokenCamera {
        fn capture(&self) -> BoxFuture<'_, Result<CaptureOutcome, CameraError>> {
            futures::future::ready(Err(CameraError::NoCameraFound)).boxed()
        }
    }

    #[tokio::test]
    async fn test_capture_failure_is_not_fatal() {
        let mut fx = fixture(PermissionState::Granted, PermissionState::Granted, None);
        fx.caps.camera = Arc::new(BrokenCamera);
        let mut state = started(&fx).await;

        drive(&mut state, &fx.caps, Message::CaptureImage).await;
        assert!(state.notice.is_some());
        assert!(!state.should_quit);
    }
}
