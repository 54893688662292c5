// SPDX-License-Identifier: GPL-3.0-only

//! QR code detection
//!
//! Camera frames and picked images both end up as a grayscale buffer that is
//! handed to rqrr. Every grid that decodes becomes one payload; grids that
//! are found but fail to decode are skipped.

use crate::backends::camera::CameraFrame;
use crate::constants::detection;
use crate::errors::DecodeError;
use futures::FutureExt;
use futures::future::BoxFuture;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use std::path::PathBuf;
use tracing::{debug, trace, warn};

/// Image handed to the decoder
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Storage reference (file picked from the library)
    Path(PathBuf),
    /// Encoded image bytes held in memory
    Bytes(Vec<u8>),
}

impl ImageSource {
    fn origin(&self) -> String {
        match self {
            ImageSource::Path(path) => path.display().to_string(),
            ImageSource::Bytes(_) => "memory".to_string(),
        }
    }
}

/// QR decode capability
///
/// Returns zero or more payloads. An image without a code yields an empty
/// list; only I/O and format failures are errors.
pub trait QrDecoder: Send + Sync {
    fn decode(&self, source: ImageSource) -> BoxFuture<'_, Result<Vec<String>, DecodeError>>;
}

/// Grayscale pixels prepared for detection
struct LumaBuffer {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl LumaBuffer {
    fn decode(&self) -> Vec<String> {
        let start = std::time::Instant::now();
        let mut prepared =
            rqrr::PreparedImage::prepare_from_greyscale(self.width, self.height, |x, y| {
                self.pixels[y * self.width + x]
            });

        let grids = prepared.detect_grids();
        let mut payloads = Vec::with_capacity(grids.len());
        for grid in grids {
            match grid.decode() {
                Ok((meta, content)) => {
                    debug!(version = meta.version.0, content = %content, "Decoded QR code");
                    payloads.push(content);
                }
                Err(e) => debug!(error = ?e, "Failed to decode QR grid"),
            }
        }

        trace!(
            width = self.width,
            height = self.height,
            found = payloads.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "QR detection complete"
        );
        payloads
    }
}

/// Factor that brings both edges within `max_dimension` (1.0 if they already are)
fn downscale_factor(width: u32, height: u32, max_dimension: u32) -> f32 {
    if width > max_dimension || height > max_dimension {
        (width as f32 / max_dimension as f32).max(height as f32 / max_dimension as f32)
    } else {
        1.0
    }
}

/// Convert an RGBA frame to luma, downscaling so neither edge exceeds `max_dimension`
fn frame_to_luma(frame: &CameraFrame, max_dimension: u32) -> LumaBuffer {
    let scale = downscale_factor(frame.width, frame.height, max_dimension);
    let width = ((frame.width as f32 / scale) as u32).max(1);
    let height = ((frame.height as f32 / scale) as u32).max(1);

    let mut pixels = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        for x in 0..width {
            let src_x = (x as f32 * scale) as u32;
            let src_y = (y as f32 * scale) as u32;
            let (r, g, b) = frame.rgb_at(src_x, src_y);
            pixels.push(luma(r, g, b));
        }
    }

    LumaBuffer {
        width: width as usize,
        height: height as usize,
        pixels,
    }
}

/// BT.601 luma
fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * 299 + g as u32 * 587 + b as u32 * 114) / 1000) as u8
}

/// Live-preview detector
#[derive(Debug, Clone, Copy)]
pub struct QrDetector {
    /// Frames are downscaled to this before detection
    max_dimension: u32,
}

impl Default for QrDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl QrDetector {
    pub fn new() -> Self {
        Self {
            max_dimension: detection::MAX_DIMENSION,
        }
    }

    pub fn with_max_dimension(max_dimension: u32) -> Self {
        Self {
            max_dimension: max_dimension.max(1),
        }
    }

    /// Detect QR payloads in a frame (CPU bound, call from a blocking task)
    pub fn detect_sync(&self, frame: &CameraFrame) -> Vec<String> {
        frame_to_luma(frame, self.max_dimension).decode()
    }

    /// Detect QR payloads without blocking the async runtime
    pub async fn detect(&self, frame: CameraFrame) -> Vec<String> {
        let detector = *self;
        tokio::task::spawn_blocking(move || detector.detect_sync(&frame))
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "QR detection task panicked");
                Vec::new()
            })
    }
}

/// Decode every QR code in an image (blocking)
pub fn decode_image_blocking(source: &ImageSource) -> Result<Vec<String>, DecodeError> {
    let origin = source.origin();
    let img = match source {
        ImageSource::Path(path) => image::open(path),
        ImageSource::Bytes(bytes) => image::load_from_memory(bytes),
    }
    .map_err(|e| DecodeError::new(origin.clone(), e))?;

    let (width, height) = img.dimensions();
    debug!(origin = %origin, width, height, "Decoding image");

    Ok(image_to_luma(&img, detection::IMAGE_MAX_DIMENSION).decode())
}

/// Convert a decoded image to luma, downscaling so neither edge exceeds `max_dimension`
fn image_to_luma(img: &DynamicImage, max_dimension: u32) -> LumaBuffer {
    let (width, height) = img.dimensions();
    let scale = downscale_factor(width, height, max_dimension);
    let gray = if scale > 1.0 {
        let target_w = ((width as f32 / scale) as u32).max(1);
        let target_h = ((height as f32 / scale) as u32).max(1);
        trace!(width, height, target_w, target_h, "Downscaling image");
        img.resize_exact(target_w, target_h, FilterType::Triangle)
            .to_luma8()
    } else {
        img.to_luma8()
    };

    LumaBuffer {
        width: gray.width() as usize,
        height: gray.height() as usize,
        pixels: gray.into_raw(),
    }
}

/// rqrr-backed decoder for picked images
#[derive(Debug, Default, Clone, Copy)]
pub struct RqrrDecoder;

impl QrDecoder for RqrrDecoder {
    fn decode(&self, source: ImageSource) -> BoxFuture<'_, Result<Vec<String>, DecodeError>> {
        async move {
            let origin = source.origin();
            tokio::task::spawn_blocking(move || decode_image_blocking(&source))
                .await
                .map_err(|e| DecodeError::new(origin, e))?
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr::generator::{QrPreview, generate};

    fn qr_png(text: &str) -> Vec<u8> {
        let QrPreview::Code(code) = generate(text) else {
            panic!("expected a QR code for {text:?}");
        };
        let mut bytes = Vec::new();
        image::DynamicImage::ImageLuma8(code.to_image(200))
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_luma_weights() {
        assert_eq!(luma(255, 255, 255), 255);
        assert_eq!(luma(0, 0, 0), 0);
        assert!(luma(0, 255, 0) > luma(255, 0, 0));
    }

    #[test]
    fn test_frame_to_luma_downscales() {
        let frame = CameraFrame::from_rgba(1280, 720, vec![255; 1280 * 720 * 4]);
        let buffer = frame_to_luma(&frame, 640);
        assert_eq!(buffer.width, 640);
        assert_eq!(buffer.height, 360);
        assert!(buffer.pixels.iter().all(|&p| p == 255));
    }

    #[test]
    fn test_large_image_is_downscaled_before_decoding() {
        let photo = DynamicImage::ImageLuma8(image::GrayImage::new(4000, 3000));
        let buffer = image_to_luma(&photo, 1280);
        assert_eq!(buffer.width, 1280);
        assert_eq!(buffer.height, 960);

        let small = DynamicImage::ImageLuma8(image::GrayImage::new(300, 200));
        let buffer = image_to_luma(&small, 1280);
        assert_eq!((buffer.width, buffer.height), (300, 200));
    }

    #[test]
    fn test_code_in_large_image_still_decodes() {
        let QrPreview::Code(code) = generate("https://example.com/large") else {
            panic!("expected a QR code");
        };
        let mut bytes = Vec::new();
        DynamicImage::ImageLuma8(code.to_image(3000))
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let payloads = decode_image_blocking(&ImageSource::Bytes(bytes)).unwrap();
        assert_eq!(payloads, vec!["https://example.com/large".to_string()]);
    }

    #[test]
    fn test_blank_image_is_empty_not_error() {
        let blank = image::GrayImage::from_pixel(64, 64, image::Luma([255u8]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageLuma8(blank)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let payloads = decode_image_blocking(&ImageSource::Bytes(bytes)).unwrap();
        assert!(payloads.is_empty());
    }

    #[test]
    fn test_garbage_bytes_are_a_decode_error() {
        let err = decode_image_blocking(&ImageSource::Bytes(b"not an image".to_vec()))
            .unwrap_err();
        assert_eq!(err.origin, "memory");
    }

    #[test]
    fn test_missing_file_is_a_decode_error() {
        let source = ImageSource::Path("/nonexistent/qr.png".into());
        let err = decode_image_blocking(&source).unwrap_err();
        assert_eq!(err.origin, "/nonexistent/qr.png");
    }

    #[test]
    fn test_generated_code_decodes() {
        let payloads = decode_image_blocking(&ImageSource::Bytes(qr_png("hello qr"))).unwrap();
        assert_eq!(payloads, vec!["hello qr".to_string()]);
    }

    #[test]
    fn test_detector_finds_code_in_frame() {
        let QrPreview::Code(code) = generate("https://example.com") else {
            panic!("expected a QR code");
        };
        let gray = code.to_image(300);
        let (w, h) = gray.dimensions();
        let rgba: Vec<u8> = gray.pixels().flat_map(|p| [p.0[0], p.0[0], p.0[0], 255]).collect();
        let frame = CameraFrame::from_rgba(w, h, rgba);

        let payloads = QrDetector::new().detect_sync(&frame);
        assert_eq!(payloads, vec!["https://example.com".to_string()]);
    }

    #[tokio::test]
    async fn test_rqrr_decoder_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("code.png");
        std::fs::write(&path, qr_png("from the gallery")).unwrap();

        let payloads = RqrrDecoder.decode(ImageSource::Path(path)).await.unwrap();
        assert_eq!(payloads, vec!["from the gallery".to_string()]);
    }
}
