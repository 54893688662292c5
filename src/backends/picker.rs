// SPDX-License-Identifier: GPL-3.0-only

//! Image picker for gallery import

use futures::FutureExt;
use futures::future::BoxFuture;
use std::path::PathBuf;
use tracing::info;

/// Extensions offered by the picker
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "webp", "tiff", "tif",
];

/// Result of showing the picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    Selected(PathBuf),
    Cancelled,
}

/// Image picker capability
pub trait ImagePicker: Send + Sync {
    fn pick_image(&self) -> BoxFuture<'_, PickOutcome>;
}

/// Native file dialog (portal-backed where available)
pub struct DialogPicker {
    start_dir: PathBuf,
}

impl DialogPicker {
    pub fn new(start_dir: PathBuf) -> Self {
        Self { start_dir }
    }
}

impl ImagePicker for DialogPicker {
    fn pick_image(&self) -> BoxFuture<'_, PickOutcome> {
        async move {
            let picked = rfd::AsyncFileDialog::new()
                .add_filter("Image", IMAGE_EXTENSIONS)
                .set_title("Select an image")
                .set_directory(&self.start_dir)
                .pick_file()
                .await;

            match picked {
                Some(handle) => {
                    let path = handle.path().to_path_buf();
                    info!(path = %path.display(), "User selected image");
                    PickOutcome::Selected(path)
                }
                None => {
                    info!("Image picker cancelled");
                    PickOutcome::Cancelled
                }
            }
        }
        .boxed()
    }
}
