// SPDX-License-Identifier: GPL-3.0-only

//! Camera and photo-library permission requests
//!
//! Inside Flatpak camera access goes through the XDG desktop portal, which
//! shows its own consent dialog. Natively the only gate is whether the
//! capture nodes can be opened. Library access is probed by writing into the
//! library root. A failing permission API always reads as denied.

use super::camera::enumeration::{NodeProbe, probe_node};
use crate::config::PermissionBackend;
use crate::constants::app_info;
use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use zbus::zvariant::{OwnedObjectPath, OwnedValue, Value};

/// Outcome of a permission request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PermissionState {
    /// Not asked yet, or the request is still pending
    #[default]
    Unknown,
    Granted,
    Denied,
}

impl PermissionState {
    pub fn from_granted(granted: bool) -> Self {
        if granted {
            PermissionState::Granted
        } else {
            PermissionState::Denied
        }
    }

    pub fn is_granted(self) -> bool {
        self == PermissionState::Granted
    }
}

/// Which permission is being requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionKind {
    Camera,
    Library,
}

/// Permission request capability
pub trait PermissionProvider: Send + Sync {
    /// Ask for a permission; resolves to `Granted` or `Denied`
    fn request(&self, kind: PermissionKind) -> BoxFuture<'_, PermissionState>;
}

/// Permissions backed by the desktop portal and the filesystem
pub struct SystemPermissions {
    backend: PermissionBackend,
    library_root: PathBuf,
}

impl SystemPermissions {
    pub fn new(backend: PermissionBackend, library_root: PathBuf) -> Self {
        Self {
            backend,
            library_root,
        }
    }

    fn use_portal(&self) -> bool {
        match self.backend {
            PermissionBackend::Portal => true,
            PermissionBackend::Device => false,
            PermissionBackend::Auto => app_info::is_flatpak(),
        }
    }

    async fn request_camera(&self) -> PermissionState {
        if self.use_portal() {
            match request_camera_via_portal().await {
                Ok(granted) => PermissionState::from_granted(granted),
                Err(e) => {
                    warn!(error = %e, "Camera portal request failed, treating as denied");
                    PermissionState::Denied
                }
            }
        } else {
            tokio::task::spawn_blocking(probe_camera_devices)
                .await
                .unwrap_or_else(|e| {
                    warn!(error = %e, "Camera probe task failed, treating as denied");
                    PermissionState::Denied
                })
        }
    }

    async fn request_library(&self) -> PermissionState {
        match probe_library(&self.library_root).await {
            Ok(()) => PermissionState::Granted,
            Err(e) => {
                warn!(
                    path = %self.library_root.display(),
                    error = %e,
                    "Photo library is not writable"
                );
                PermissionState::Denied
            }
        }
    }
}

impl PermissionProvider for SystemPermissions {
    fn request(&self, kind: PermissionKind) -> BoxFuture<'_, PermissionState> {
        async move {
            let state = match kind {
                PermissionKind::Camera => self.request_camera().await,
                PermissionKind::Library => self.request_library().await,
            };
            info!(?kind, ?state, "Permission resolved");
            state
        }
        .boxed()
    }
}

/// Granted if any V4L2 capture node can be opened
fn probe_camera_devices() -> PermissionState {
    let mut saw_capture_node = false;
    for node in v4l::context::enum_devices() {
        match probe_node(node.path(), node.name()) {
            NodeProbe::Capture(device) => {
                debug!(path = %device.path, "Capture device accessible");
                return PermissionState::Granted;
            }
            NodeProbe::NotCapture => {}
            NodeProbe::Failed(e) => {
                saw_capture_node = true;
                debug!(path = %node.path().display(), error = %e, "Cannot open device node");
            }
        }
    }

    if saw_capture_node {
        info!("Camera devices exist but none can be opened");
    } else {
        info!("No camera devices found");
    }
    PermissionState::Denied
}

/// Ensure the library root exists and accepts new files
async fn probe_library(root: &std::path::Path) -> std::io::Result<()> {
    tokio::fs::create_dir_all(root).await?;
    let probe = root.join(format!(".qrscan-probe-{}", uuid::Uuid::new_v4().simple()));
    tokio::fs::write(&probe, b"").await?;
    tokio::fs::remove_file(&probe).await?;
    Ok(())
}

/// Object path the portal will use for a request with `token`
///
/// The sender's unique bus name loses its leading ':' and has '.' replaced
/// by '_'.
pub(crate) fn portal_request_path(unique_name: &str, token: &str) -> String {
    let sender = unique_name.trim_start_matches(':').replace('.', "_");
    format!("/org/freedesktop/portal/desktop/request/{sender}/{token}")
}

/// Ask org.freedesktop.portal.Camera for access and wait for the answer
async fn request_camera_via_portal() -> zbus::Result<bool> {
    let connection = zbus::Connection::session().await?;

    let unique_name = connection
        .unique_name()
        .map(|name| name.as_str().to_string())
        .ok_or_else(|| zbus::Error::Failure("No unique bus name".to_string()))?;
    let token = format!("qrscan_{}", uuid::Uuid::new_v4().simple());
    let request_path = portal_request_path(&unique_name, &token);

    // Subscribe before calling so the response cannot be missed
    let request = zbus::Proxy::new(
        &connection,
        "org.freedesktop.portal.Desktop",
        request_path.as_str(),
        "org.freedesktop.portal.Request",
    )
    .await?;
    let mut responses = request.receive_signal("Response").await?;

    let camera = zbus::Proxy::new(
        &connection,
        "org.freedesktop.portal.Desktop",
        "/org/freedesktop/portal/desktop",
        "org.freedesktop.portal.Camera",
    )
    .await?;

    let present: bool = camera.get_property("IsCameraPresent").await.unwrap_or(true);
    if !present {
        info!("Portal reports no camera present");
        return Ok(false);
    }

    let mut options: HashMap<&str, Value> = HashMap::new();
    options.insert("handle_token", Value::new(token.as_str()));
    let handle: OwnedObjectPath = camera.call("AccessCamera", &(options,)).await?;
    debug!(handle = %handle, "Camera access requested via portal");

    let Some(message) = responses.next().await else {
        return Ok(false);
    };
    let body = message.body();
    let (code, _results): (u32, HashMap<String, OwnedValue>) = body.deserialize()?;
    info!(code, "Camera portal responded");

    Ok(code == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portal_request_path() {
        assert_eq!(
            portal_request_path(":1.42", "qrscan_abc"),
            "/org/freedesktop/portal/desktop/request/1_42/qrscan_abc"
        );
    }

    #[test]
    fn test_from_granted() {
        assert_eq!(PermissionState::from_granted(true), PermissionState::Granted);
        assert_eq!(PermissionState::from_granted(false), PermissionState::Denied);
        assert!(!PermissionState::Unknown.is_granted());
    }

    #[tokio::test]
    async fn test_library_granted_for_writable_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("Pictures");
        let permissions = SystemPermissions::new(PermissionBackend::Device, root.clone());

        let state = permissions.request(PermissionKind::Library).await;
        assert_eq!(state, PermissionState::Granted);
        assert!(root.is_dir());
        // The probe file is cleaned up
        assert_eq!(std::fs::read_dir(&root).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_library_denied_when_root_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("not-a-dir");
        std::fs::write(&root, b"x").unwrap();
        let permissions = SystemPermissions::new(PermissionBackend::Device, root);

        let state = permissions.request(PermissionKind::Library).await;
        assert_eq!(state, PermissionState::Denied);
    }
}
