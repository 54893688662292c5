// SPDX-License-Identifier: MPL-2.0

//! Photo library storage
//!
//! Albums are directories below the photo library root. An album is created
//! the first time an asset is saved into it; later saves only add files.

use crate::backends::camera::CameraFrame;
use crate::errors::{CameraError, StorageError};
use chrono::{DateTime, Local};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A captured still ready to be written into an album
#[derive(Debug, Clone)]
pub struct PhotoAsset {
    /// Encoded image bytes
    pub bytes: Vec<u8>,
    /// File extension matching the encoding
    pub extension: &'static str,
    pub captured_at: DateTime<Local>,
}

impl PhotoAsset {
    /// Encode a camera frame as JPEG
    pub fn from_frame(frame: &CameraFrame) -> Result<Self, CameraError> {
        let rgb = frame
            .to_rgb_image()
            .ok_or_else(|| CameraError::EncodingFailed("Frame size mismatch".to_string()))?;

        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(rgb)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Jpeg)
            .map_err(|e| CameraError::EncodingFailed(e.to_string()))?;

        Ok(Self {
            bytes,
            extension: "jpg",
            captured_at: Local::now(),
        })
    }

    /// File name for this asset; the suffix keeps same-second captures apart
    pub fn file_name(&self) -> String {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        format!(
            "IMG_{}_{}.{}",
            self.captured_at.format("%Y%m%d_%H%M%S"),
            &suffix[..8],
            self.extension
        )
    }
}

/// A named album in the photo library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Album {
    pub name: String,
    pub path: PathBuf,
}

/// Where an asset ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedAsset {
    pub path: PathBuf,
    /// True if this save created the album
    pub created_album: bool,
}

/// Photo library capability
pub trait PhotoStore: Send + Sync {
    /// Look up an album by name
    fn find_album<'a>(&'a self, name: &'a str)
    -> BoxFuture<'a, Result<Option<Album>, StorageError>>;

    /// Create an album containing exactly `asset`
    fn create_album<'a>(
        &'a self,
        name: &'a str,
        asset: &'a PhotoAsset,
    ) -> BoxFuture<'a, Result<(Album, PathBuf), StorageError>>;

    /// Add an asset to an existing album
    fn add_asset<'a>(
        &'a self,
        album: &'a Album,
        asset: &'a PhotoAsset,
    ) -> BoxFuture<'a, Result<PathBuf, StorageError>>;
}

/// Save an asset into the named album, creating the album on first use
pub async fn save_to_album(
    store: &dyn PhotoStore,
    asset: &PhotoAsset,
    album_name: &str,
) -> Result<SavedAsset, StorageError> {
    match store.find_album(album_name).await? {
        Some(album) => {
            let path = store.add_asset(&album, asset).await?;
            info!(album = %album.name, path = %path.display(), "Added photo to album");
            Ok(SavedAsset {
                path,
                created_album: false,
            })
        }
        None => {
            let (album, path) = store.create_album(album_name, asset).await?;
            info!(album = %album.name, path = %path.display(), "Created album with photo");
            Ok(SavedAsset {
                path,
                created_album: true,
            })
        }
    }
}

/// Albums as directories under a library root
#[derive(Debug, Clone)]
pub struct DirectoryPhotoStore {
    root: PathBuf,
}

impl DirectoryPhotoStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn album_path(&self, name: &str) -> Result<PathBuf, StorageError> {
        let trimmed = name.trim();
        if trimmed.is_empty()
            || trimmed == "."
            || trimmed == ".."
            || trimmed.contains(['/', '\\'])
        {
            return Err(StorageError::InvalidAlbumName(name.to_string()));
        }
        Ok(self.root.join(trimmed))
    }
}

/// Write an asset without ever replacing an existing file
fn write_asset(dir: &Path, asset: &PhotoAsset) -> Result<PathBuf, StorageError> {
    let path = dir.join(asset.file_name());
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)?;
    file.write_all(&asset.bytes)?;
    file.sync_all()?;
    debug!(path = %path.display(), bytes = asset.bytes.len(), "Wrote asset");
    Ok(path)
}

impl PhotoStore for DirectoryPhotoStore {
    fn find_album<'a>(
        &'a self,
        name: &'a str,
    ) -> BoxFuture<'a, Result<Option<Album>, StorageError>> {
        async move {
            let path = self.album_path(name)?;
            match tokio::fs::metadata(&path).await {
                Ok(meta) if meta.is_dir() => Ok(Some(Album {
                    name: name.trim().to_string(),
                    path,
                })),
                Ok(_) => {
                    warn!(path = %path.display(), "Album path exists but is not a directory");
                    Err(StorageError::Io(format!(
                        "{} is not a directory",
                        path.display()
                    )))
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e.into()),
            }
        }
        .boxed()
    }

    fn create_album<'a>(
        &'a self,
        name: &'a str,
        asset: &'a PhotoAsset,
    ) -> BoxFuture<'a, Result<(Album, PathBuf), StorageError>> {
        async move {
            let path = self.album_path(name)?;
            let album = Album {
                name: name.trim().to_string(),
                path: path.clone(),
            };
            let asset = asset.clone();
            let written = tokio::task::spawn_blocking(move || {
                std::fs::create_dir_all(&path)?;
                write_asset(&path, &asset)
            })
            .await
            .map_err(|e| StorageError::Io(e.to_string()))??;
            Ok((album, written))
        }
        .boxed()
    }

    fn add_asset<'a>(
        &'a self,
        album: &'a Album,
        asset: &'a PhotoAsset,
    ) -> BoxFuture<'a, Result<PathBuf, StorageError>> {
        async move {
            let dir = album.path.clone();
            let asset = asset.clone();
            tokio::task::spawn_blocking(move || write_asset(&dir, &asset))
                .await
                .map_err(|e| StorageError::Io(e.to_string()))?
        }
        .boxed()
    }
}
