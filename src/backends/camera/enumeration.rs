// SPDX-License-Identifier: GPL-3.0-only

//! V4L2 camera enumeration

use super::types::CameraDevice;
use crate::errors::CameraError;
use std::io;
use tracing::{debug, info};
use v4l::capability::Flags;

/// Result of probing one capture node
#[derive(Debug)]
pub(crate) enum NodeProbe {
    /// Opened and reports video capture
    Capture(CameraDevice),
    /// Opened but is not a capture node (metadata, output, codec)
    NotCapture,
    /// Could not be opened
    Failed(io::Error),
}

/// Open a device node and check it can capture video
pub(crate) fn probe_node(path: &std::path::Path, fallback_name: Option<String>) -> NodeProbe {
    let device = match v4l::Device::with_path(path) {
        Ok(device) => device,
        Err(e) => return NodeProbe::Failed(e),
    };

    let caps = match device.query_caps() {
        Ok(caps) => caps,
        Err(e) => return NodeProbe::Failed(e),
    };

    if !caps.capabilities.contains(Flags::VIDEO_CAPTURE) {
        return NodeProbe::NotCapture;
    }

    let name = if caps.card.is_empty() {
        fallback_name.unwrap_or_else(|| path.display().to_string())
    } else {
        caps.card.clone()
    };

    NodeProbe::Capture(CameraDevice {
        name,
        path: path.display().to_string(),
    })
}

/// List all V4L2 capture devices the current user can open
pub fn enumerate_cameras() -> Vec<CameraDevice> {
    let mut nodes = v4l::context::enum_devices();
    nodes.sort_by_key(|node| node.index());

    let mut cameras = Vec::new();
    for node in nodes {
        match probe_node(node.path(), node.name()) {
            NodeProbe::Capture(device) => {
                debug!(name = %device.name, path = %device.path, "Found capture device");
                cameras.push(device);
            }
            NodeProbe::NotCapture => {
                debug!(path = %node.path().display(), "Skipping non-capture node");
            }
            NodeProbe::Failed(e) => {
                debug!(path = %node.path().display(), error = %e, "Cannot open device node");
            }
        }
    }

    info!(count = cameras.len(), "Enumerated cameras");
    cameras
}

/// Resolve the device the user asked for
///
/// A configured path always wins; otherwise the first enumerated camera,
/// falling back to the pipeline's own source selection.
pub fn select_camera(
    configured: Option<&str>,
    index: Option<usize>,
) -> Result<CameraDevice, CameraError> {
    if let Some(path) = configured.filter(|p| !p.is_empty()) {
        return Ok(CameraDevice {
            name: path.to_string(),
            path: path.to_string(),
        });
    }

    let cameras = enumerate_cameras();
    match index {
        Some(index) => cameras.get(index).cloned().ok_or(CameraError::InvalidIndex {
            index,
            count: cameras.len(),
        }),
        None => Ok(cameras
            .into_iter()
            .next()
            .unwrap_or_else(CameraDevice::system_default)),
    }
}
