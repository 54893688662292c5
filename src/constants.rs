// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

/// Album that captured photos are saved into
pub const DEFAULT_ALBUM_NAME: &str = "MyAlbum";

/// Edge length of generated QR rasters in pixels
pub const DEFAULT_QR_SIZE: u32 = 200;

/// Label shown before anything has been scanned
pub const NOT_YET_SCANNED: &str = "Not yet scanned";

/// Strings of the scan confirmation prompt
pub mod prompt {
    pub const TITLE: &str = "Open Link";
    pub const MESSAGE: &str = "Do you want to open the scanned link?";
    pub const CANCEL: &str = "Cancel";
    pub const OPEN: &str = "Open";
}

/// User-visible acknowledgements
pub mod notices {
    pub const SAVE_OK: &str = "Image saved successfully!";
    pub const SAVE_FAILED: &str = "Failed to save image.";
    pub const NO_QR_FOUND: &str = "No QR code found in image";
    pub const NO_LIBRARY_ACCESS: &str = "No access to media library";
    pub const NO_CAMERA_ACCESS: &str = "No access to the camera";
}

/// QR detection tuning
pub mod detection {
    /// Frames are downscaled so neither edge exceeds this
    pub const MAX_DIMENSION: u32 = 640;
    /// Picked images are downscaled so neither edge exceeds this
    pub const IMAGE_MAX_DIMENSION: u32 = 1280;
    /// Minimum delay between two detections on the live preview
    pub const SCAN_INTERVAL_MS: u64 = 250;
    /// Symbology reported for codes found by the detector
    pub const PAYLOAD_TYPE_QR: &str = "qr";
}

/// Camera pipeline configuration
pub mod pipeline {
    /// Maximum buffers in appsink queue
    pub const MAX_BUFFERS: u32 = 2;
    /// Frames buffered between the pipeline and its consumer
    pub const FRAME_CHANNEL_CAPACITY: usize = 10;
}

/// Timing constants
pub mod timing {
    use std::time::Duration;

    /// Pipeline start timeout in seconds
    pub const START_TIMEOUT_SECS: u64 = 5;
    /// Pipeline stop timeout in seconds
    pub const STOP_TIMEOUT_SECS: u64 = 2;
    /// Camera warm-up before a still is taken from a fresh pipeline
    pub const CAPTURE_WARMUP: Duration = Duration::from_millis(500);
    /// Give up waiting for a still after this long
    pub const CAPTURE_TIMEOUT: Duration = Duration::from_secs(5);
    /// Terminal input poll interval (~60 FPS redraw)
    pub const INPUT_POLL: Duration = Duration::from_millis(16);
}

/// Application information utilities
pub mod app_info {
    use std::path::Path;

    /// Get the application version from build-time environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }

    /// Check if the application is running inside a Flatpak sandbox
    pub fn is_flatpak() -> bool {
        Path::new("/.flatpak-info").exists()
    }
}
