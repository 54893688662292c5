// SPDX-License-Identifier: GPL-3.0-only

//! Still capture from the camera

use super::pipeline::CameraPipeline;
use super::types::{CameraDevice, CameraFrame};
use crate::constants::timing;
use crate::errors::CameraError;
use crate::storage::PhotoAsset;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, info};

/// Result of asking the camera for a still
#[derive(Debug, Clone)]
pub enum CaptureOutcome {
    Captured(PhotoAsset),
    /// No frame was delivered; nothing to save
    Cancelled,
}

/// Something that can hand out a still photo
pub trait StillCamera: Send + Sync {
    fn capture(&self) -> BoxFuture<'_, Result<CaptureOutcome, CameraError>>;
}

/// Most recent preview frame, shared between the UI loop and capture tasks
#[derive(Clone, Default)]
pub struct LatestFrame {
    slot: Arc<Mutex<Option<CameraFrame>>>,
}

impl LatestFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self, frame: CameraFrame) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(frame);
        }
    }

    pub fn get(&self) -> Option<CameraFrame> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }

    pub fn clear(&self) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
    }
}

/// Takes the still from the running preview
pub struct PreviewStill {
    latest: LatestFrame,
}

impl PreviewStill {
    pub fn new(latest: LatestFrame) -> Self {
        Self { latest }
    }
}

impl StillCamera for PreviewStill {
    fn capture(&self) -> BoxFuture<'_, Result<CaptureOutcome, CameraError>> {
        async move {
            let Some(frame) = self.latest.get() else {
                debug!("No preview frame available, capture cancelled");
                return Ok(CaptureOutcome::Cancelled);
            };
            let asset = tokio::task::spawn_blocking(move || PhotoAsset::from_frame(&frame))
                .await
                .map_err(|e| CameraError::EncodingFailed(e.to_string()))??;
            Ok(CaptureOutcome::Captured(asset))
        }
        .boxed()
    }
}

/// Opens its own pipeline, waits for the camera to settle and takes a frame
pub struct PipelineStill {
    device: CameraDevice,
}

impl PipelineStill {
    pub fn new(device: CameraDevice) -> Self {
        Self { device }
    }
}

impl StillCamera for PipelineStill {
    fn capture(&self) -> BoxFuture<'_, Result<CaptureOutcome, CameraError>> {
        let device = self.device.clone();
        async move {
            let frame = tokio::task::spawn_blocking(move || grab_settled_frame(&device))
                .await
                .map_err(|e| CameraError::InitializationFailed(e.to_string()))??;

            let Some(frame) = frame else {
                return Ok(CaptureOutcome::Cancelled);
            };
            let asset = PhotoAsset::from_frame(&frame)?;
            Ok(CaptureOutcome::Captured(asset))
        }
        .boxed()
    }
}

/// Run a pipeline until the warm-up elapsed and return the next frame
fn grab_settled_frame(device: &CameraDevice) -> Result<Option<CameraFrame>, CameraError> {
    let (_pipeline, mut receiver) = CameraPipeline::start(device)?;

    let start = Instant::now();
    let mut frame: Option<CameraFrame> = None;

    while start.elapsed() < timing::CAPTURE_TIMEOUT {
        match receiver.try_next() {
            Ok(Some(f)) => {
                frame = Some(f);
                if start.elapsed() > timing::CAPTURE_WARMUP {
                    break;
                }
            }
            Ok(None) => break,
            Err(_) => std::thread::sleep(timing::INPUT_POLL),
        }
    }

    info!(captured = frame.is_some(), "Still capture finished");
    Ok(frame)
}
