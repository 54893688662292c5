// SPDX-License-Identifier: MPL-2.0

//! Error types for the QR scanner

use thiserror::Error;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone, Error)]
pub enum AppError {
    /// Camera-related errors
    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),
    /// QR decoding errors
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
    /// Album/photo storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    /// URL launch errors
    #[error("Launch error: {0}")]
    Launch(#[from] LaunchError),
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    /// Terminal or filesystem I/O
    #[error("I/O error: {0}")]
    Io(String),
    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

/// Camera-specific errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    /// No camera devices found
    #[error("No camera devices found")]
    NoCameraFound,
    /// Camera index out of range
    #[error("Camera index {index} out of range ({count} available)")]
    InvalidIndex { index: usize, count: usize },
    /// Pipeline could not be created or started
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),
    /// Frame could not be encoded into a photo
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}

/// The single transport failure of a QR decode attempt
///
/// An image without any code is not an error; it decodes to an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not load image from {origin}: {reason}")]
pub struct DecodeError {
    /// Where the image came from (path or "memory")
    pub origin: String,
    /// Underlying I/O or format failure
    pub reason: String,
}

impl DecodeError {
    pub fn new(origin: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            origin: origin.into(),
            reason: reason.to_string(),
        }
    }
}

/// Album storage errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Album name would escape the photo library
    #[error("Invalid album name: {0:?}")]
    InvalidAlbumName(String),
    /// Photo library is not accessible
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::PermissionDenied {
            StorageError::PermissionDenied(err.to_string())
        } else {
            StorageError::Io(err.to_string())
        }
    }
}

/// URL launch errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LaunchError {
    /// Payload has no URI scheme a handler could be registered for
    #[error("Cannot open URL: {0}")]
    Unsupported(String),
    /// The OS handler could not be spawned
    #[error("Failed to open {url}: {reason}")]
    Failed { url: String, reason: String },
}

/// Configuration file errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {reason}")]
    Read { path: String, reason: String },
    #[error("failed to parse {path}: {reason}")]
    Parse { path: String, reason: String },
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<gstreamer::glib::Error> for AppError {
    fn from(err: gstreamer::glib::Error) -> Self {
        AppError::Camera(CameraError::InitializationFailed(err.to_string()))
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<ctrlc::Error> for AppError {
    fn from(err: ctrlc::Error) -> Self {
        AppError::Other(format!("Failed to install Ctrl+C handler: {err}"))
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_io_maps_to_permission_error() {
        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        assert!(matches!(
            StorageError::from(err),
            StorageError::PermissionDenied(_)
        ));

        let err = std::io::Error::other("disk full");
        assert!(matches!(StorageError::from(err), StorageError::Io(_)));
    }

    #[test]
    fn test_io_and_message_errors_convert() {
        let err: AppError = std::io::Error::other("terminal gone").into();
        assert!(matches!(err, AppError::Io(ref msg) if msg == "terminal gone"));

        let err: AppError = "Nothing to encode".into();
        assert_eq!(err.to_string(), "Nothing to encode");
    }

    #[test]
    fn test_app_error_display_wraps_source() {
        let err: AppError = DecodeError::new("/tmp/a.png", "not an image").into();
        assert_eq!(
            err.to_string(),
            "Decode error: could not load image from /tmp/a.png: not an image"
        );
    }
}
