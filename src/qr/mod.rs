// SPDX-License-Identifier: GPL-3.0-only

//! QR decoding and generation

pub mod detector;
pub mod generator;

pub use detector::{ImageSource, QrDecoder, QrDetector, RqrrDecoder, decode_image_blocking};
pub use generator::{GeneratedQr, QrPreview, generate};
