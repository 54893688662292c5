// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for the camera backend

use std::sync::Arc;
use std::time::Instant;

/// Represents a camera device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    /// Human readable name (V4L2 card)
    pub name: String,
    /// Capture node (e.g. /dev/video0); empty lets GStreamer pick a source
    pub path: String,
}

impl CameraDevice {
    /// Device that lets the pipeline auto-select a source
    pub fn system_default() -> Self {
        Self {
            name: "Default Camera".to_string(),
            path: String::new(),
        }
    }
}

/// A single RGBA frame from the preview pipeline
#[derive(Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// RGBA pixel rows, `stride` bytes apart
    pub data: Arc<[u8]>,
    /// Bytes per row (may include padding)
    pub stride: u32,
    pub captured_at: Instant,
}

impl std::fmt::Debug for CameraFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl CameraFrame {
    /// Build a tightly packed frame from RGBA bytes
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data: Arc::from(data.into_boxed_slice()),
            stride: width * 4,
            captured_at: Instant::now(),
        }
    }

    /// RGB value at (x, y), clamped to the frame
    pub fn rgb_at(&self, x: u32, y: u32) -> (u8, u8, u8) {
        if self.width == 0 || self.height == 0 {
            return (0, 0, 0);
        }
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        let idx = (y * self.stride + x * 4) as usize;
        if idx + 2 < self.data.len() {
            (self.data[idx], self.data[idx + 1], self.data[idx + 2])
        } else {
            (0, 0, 0)
        }
    }

    /// Copy the pixels into an RGB image without stride padding
    pub fn to_rgb_image(&self) -> Option<image::RgbImage> {
        let mut rgb = Vec::with_capacity((self.width * self.height * 3) as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                let (r, g, b) = self.rgb_at(x, y);
                rgb.extend_from_slice(&[r, g, b]);
            }
        }
        image::RgbImage::from_raw(self.width, self.height, rgb)
    }
}

/// Channel used by pipelines to push frames to the UI
pub type FrameSender = futures::channel::mpsc::Sender<CameraFrame>;
pub type FrameReceiver = futures::channel::mpsc::Receiver<CameraFrame>;
