// SPDX-License-Identifier: GPL-3.0-only

//! Camera backend
//!
//! Device enumeration over V4L2, a GStreamer preview pipeline producing
//! RGBA frames, and still capture for the Capture & Save flow.

pub mod enumeration;
pub mod pipeline;
pub mod still;
pub mod types;

pub use enumeration::{enumerate_cameras, select_camera};
pub use pipeline::CameraPipeline;
pub use still::{CaptureOutcome, LatestFrame, PipelineStill, PreviewStill, StillCamera};
pub use types::{CameraDevice, CameraFrame, FrameReceiver};
