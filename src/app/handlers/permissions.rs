// SPDX-License-Identifier: GPL-3.0-only

//! Permission handlers

use crate::app::state::{AppState, Effect, Effects};
use crate::backends::{PermissionKind, PermissionState};
use tracing::info;

impl AppState {
    pub(crate) fn handle_permission_resolved(
        &mut self,
        kind: PermissionKind,
        state: PermissionState,
    ) -> Effects {
        info!(?kind, ?state, "Permission updated");
        match kind {
            PermissionKind::Camera => self.camera_permission = state,
            PermissionKind::Library => self.library_permission = state,
        }
        Vec::new()
    }

    /// Re-ask for camera access; the screen shows loading until it resolves
    pub(crate) fn handle_allow_camera(&mut self) -> Effects {
        if self.camera_permission.is_granted() {
            return Vec::new();
        }
        self.camera_permission = PermissionState::Unknown;
        vec![Effect::RequestPermission(PermissionKind::Camera)]
    }
}
