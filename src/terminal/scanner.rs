// SPDX-License-Identifier: GPL-3.0-only

//! Decode subscription for the live preview
//!
//! While attached, preview frames are handed to the detector at most one at a
//! time and no more often than the scan interval. Detaching drops the event
//! channel, so detections still in flight have nowhere to deliver.

use crate::app::ScanResult;
use crate::backends::camera::CameraFrame;
use crate::constants::detection;
use crate::qr::QrDetector;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, trace};

pub struct ScanSubscription {
    detector: QrDetector,
    interval: Duration,
    channel: Option<(UnboundedSender<ScanResult>, UnboundedReceiver<ScanResult>)>,
    busy: Arc<AtomicBool>,
    last_submit: Option<Instant>,
}

impl ScanSubscription {
    pub fn new(detector: QrDetector, interval: Duration) -> Self {
        Self {
            detector,
            interval,
            channel: None,
            busy: Arc::new(AtomicBool::new(false)),
            last_submit: None,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.channel.is_some()
    }

    /// Attach or detach to match `attached`
    pub fn sync(&mut self, attached: bool) {
        match (attached, self.is_attached()) {
            (true, false) => {
                debug!("Decode subscription attached");
                self.channel = Some(unbounded_channel());
                self.last_submit = None;
            }
            (false, true) => {
                debug!("Decode subscription detached");
                self.channel = None;
            }
            _ => {}
        }
    }

    /// Start a detection on `frame` if one is due; returns whether it started
    pub fn submit(&mut self, frame: &CameraFrame, runtime: &Handle) -> bool {
        let Some((sender, _)) = &self.channel else {
            return false;
        };
        if self
            .last_submit
            .is_some_and(|last| last.elapsed() < self.interval)
        {
            return false;
        }
        if self.busy.swap(true, Ordering::AcqRel) {
            return false;
        }

        self.last_submit = Some(Instant::now());
        let sender = sender.clone();
        let busy = Arc::clone(&self.busy);
        let detector = self.detector;
        let frame = frame.clone();
        runtime.spawn(async move {
            let payloads = detector.detect(frame).await;
            if let Some(first) = payloads.into_iter().next() {
                trace!(payload = %first, "Detected QR code in preview");
                // Fails once detached
                let _ = sender.send(ScanResult {
                    payload_type: detection::PAYLOAD_TYPE_QR.to_string(),
                    payload_data: first,
                });
            }
            busy.store(false, Ordering::Release);
        });
        true
    }

    /// Decode events delivered since the last call
    pub fn drain(&mut self) -> Vec<ScanResult> {
        let mut events = Vec::new();
        if let Some((_, receiver)) = &mut self.channel {
            while let Ok(event) = receiver.try_recv() {
                events.push(event);
            }
        }
        events
    }
}
