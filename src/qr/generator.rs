// SPDX-License-Identifier: GPL-3.0-only

//! QR generator view model
//!
//! The preview is a pure function of the input text and is rebuilt on
//! every keystroke.

use image::{GrayImage, Luma};
use qrcode::render::unicode;
use qrcode::{Color, QrCode};
use tracing::debug;

/// Modules of light border around the symbol
const QUIET_ZONE: u32 = 4;

/// What the generator shows for the current input
#[derive(Debug, Clone)]
pub enum QrPreview {
    /// Input is empty after trimming
    Empty,
    Code(GeneratedQr),
    /// Input exceeds the capacity of the largest QR version
    TooLong,
}

impl QrPreview {
    pub fn is_empty(&self) -> bool {
        matches!(self, QrPreview::Empty)
    }
}

/// An encoded QR symbol together with the exact text it carries
#[derive(Clone)]
pub struct GeneratedQr {
    text: String,
    code: QrCode,
}

impl std::fmt::Debug for GeneratedQr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratedQr")
            .field("text", &self.text)
            .field("modules", &self.code.width())
            .finish()
    }
}

/// Build the preview for `text`
///
/// Whitespace only counts for the emptiness check; the encoded payload is
/// the input exactly as typed.
pub fn generate(text: &str) -> QrPreview {
    if text.trim().is_empty() {
        return QrPreview::Empty;
    }

    match QrCode::new(text.as_bytes()) {
        Ok(code) => QrPreview::Code(GeneratedQr {
            text: text.to_string(),
            code,
        }),
        Err(e) => {
            debug!(error = %e, len = text.len(), "Cannot encode generator input");
            QrPreview::TooLong
        }
    }
}

impl GeneratedQr {
    /// The encoded payload
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Modules per side, without quiet zone
    pub fn modules(&self) -> u32 {
        self.code.width() as u32
    }

    /// Unicode half-block rendering, one string per terminal row
    pub fn to_unicode_lines(&self) -> Vec<String> {
        self.code
            .render::<unicode::Dense1x2>()
            .dark_color(unicode::Dense1x2::Light)
            .light_color(unicode::Dense1x2::Dark)
            .quiet_zone(true)
            .build()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Square grayscale raster of `size` pixels per side
    ///
    /// Modules are scaled by whole pixels and centered. If the symbol does
    /// not fit at one pixel per module the image grows to fit it.
    pub fn to_image(&self, size: u32) -> GrayImage {
        let modules = self.modules();
        let total = modules + QUIET_ZONE * 2;
        let scale = (size / total).max(1);
        let side = size.max(total * scale);
        let offset = (side - modules * scale) / 2;

        let mut img = GrayImage::from_pixel(side, side, Luma([255u8]));
        for (i, color) in self.code.to_colors().iter().enumerate() {
            if *color != Color::Dark {
                continue;
            }
            let x = (i as u32) % modules;
            let y = (i as u32) / modules;
            for dy in 0..scale {
                for dx in 0..scale {
                    img.put_pixel(offset + x * scale + dx, offset + y * scale + dy, Luma([0u8]));
                }
            }
        }
        img
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_blank_render_nothing() {
        assert!(generate("").is_empty());
        assert!(generate("   \t\n").is_empty());
    }

    #[test]
    fn test_payload_is_untrimmed_input() {
        match generate("  padded  ") {
            QrPreview::Code(code) => assert_eq!(code.text(), "  padded  "),
            other => panic!("expected code, got {other:?}"),
        }
    }

    #[test]
    fn test_image_has_fixed_size() {
        let QrPreview::Code(code) = generate("https://example.com") else {
            panic!("expected code");
        };
        let img = code.to_image(200);
        assert_eq!(img.dimensions(), (200, 200));
        // Corners are quiet zone
        assert_eq!(img.get_pixel(0, 0).0, [255]);
        assert_eq!(img.get_pixel(199, 199).0, [255]);
    }

    #[test]
    fn test_image_grows_when_too_small() {
        let QrPreview::Code(code) = generate("x") else {
            panic!("expected code");
        };
        let img = code.to_image(4);
        assert_eq!(img.width(), code.modules() + QUIET_ZONE * 2);
    }

    #[test]
    fn test_unicode_rows_cover_two_module_rows() {
        let QrPreview::Code(code) = generate("hello") else {
            panic!("expected code");
        };
        let lines = code.to_unicode_lines();
        let expected_rows = (code.modules() + QUIET_ZONE * 2).div_ceil(2) as usize;
        assert_eq!(lines.len(), expected_rows);
    }

    #[test]
    fn test_oversized_input_is_too_long() {
        let text = "x".repeat(8000);
        assert!(matches!(generate(&text), QrPreview::TooLong));
    }
}
