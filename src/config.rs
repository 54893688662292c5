// SPDX-License-Identifier: GPL-3.0-only

use crate::constants::{DEFAULT_ALBUM_NAME, DEFAULT_QR_SIZE, detection};
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// How camera permission is obtained
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum PermissionBackend {
    /// Portal inside Flatpak, device probing otherwise
    #[default]
    Auto,
    /// Ask the XDG desktop portal (org.freedesktop.portal.Camera)
    Portal,
    /// Open the V4L2 capture nodes directly
    Device,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Album captured photos are appended to
    pub album_name: String,
    /// Photo library root (defaults to the XDG pictures directory)
    pub library_dir: Option<PathBuf>,
    /// Camera device path (e.g. /dev/video0); None picks the system default
    pub camera_device: Option<String>,
    /// How camera permission is requested
    pub permission_backend: PermissionBackend,
    /// Mirror camera preview horizontally (selfie mode)
    pub mirror_preview: bool,
    /// Edge length of generated QR rasters in pixels
    pub qr_size: u32,
    /// Minimum delay between live detections
    pub scan_interval_ms: u64,
    /// Frames are downscaled to this before detection
    pub max_detect_dimension: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            album_name: DEFAULT_ALBUM_NAME.to_string(),
            library_dir: None,
            camera_device: None,
            permission_backend: PermissionBackend::default(),
            mirror_preview: false,
            qr_size: DEFAULT_QR_SIZE,
            scan_interval_ms: detection::SCAN_INTERVAL_MS,
            max_detect_dimension: detection::MAX_DIMENSION,
        }
    }
}

impl Config {
    /// Location of the user config file
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("qrscan")
            .join("config.json")
    }

    /// Load the user config, falling back to defaults
    ///
    /// A missing file is normal. An unreadable or malformed file is logged
    /// and ignored so a bad edit never keeps the app from starting.
    pub fn load() -> Self {
        let path = Self::path();
        match Self::load_from(&path) {
            Ok(Some(config)) => {
                debug!(path = %path.display(), "Loaded config");
                config
            }
            Ok(None) => Self::default(),
            Err(e) => {
                warn!(error = %e, "Ignoring config file, using defaults");
                Self::default()
            }
        }
    }

    /// Load a config file; `Ok(None)` if it does not exist
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(ConfigError::Read {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                });
            }
        };

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| ConfigError::Parse {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
    }

    /// Root of the photo library that holds albums
    pub fn library_root(&self) -> PathBuf {
        self.library_dir.clone().unwrap_or_else(|| {
            dirs::picture_dir()
                .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        })
    }

    /// Directory for log files written in terminal mode
    pub fn log_dir() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("qrscan")
    }
}
