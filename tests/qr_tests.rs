// SPDX-License-Identifier: MPL-2.0

//! Integration tests for QR generation and decoding

use qrscan::qr::{ImageSource, QrDecoder, QrPreview, RqrrDecoder, decode_image_blocking, generate};

fn png_bytes(text: &str, size: u32) -> Vec<u8> {
    let QrPreview::Code(code) = generate(text) else {
        panic!("expected a code for {text:?}");
    };
    let mut bytes = Vec::new();
    image::DynamicImage::ImageLuma8(code.to_image(size))
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

#[test]
fn test_generated_code_decodes_to_exact_input() {
    let text = "  https://example.com/?q=1  ";
    let payloads = decode_image_blocking(&ImageSource::Bytes(png_bytes(text, 200))).unwrap();
    assert_eq!(payloads, vec![text.to_string()]);
}

#[test]
fn test_empty_input_generates_nothing() {
    assert!(generate("").is_empty());
    assert!(generate(" \n ").is_empty());
}

#[test]
fn test_oversized_input_is_reported() {
    let text = "x".repeat(8000);
    assert!(matches!(generate(&text), QrPreview::TooLong));
}

#[tokio::test]
async fn test_decoder_reads_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("code.png");
    std::fs::write(&path, png_bytes("from disk", 300)).unwrap();

    let payloads = RqrrDecoder.decode(ImageSource::Path(path)).await.unwrap();
    assert_eq!(payloads, vec!["from disk".to_string()]);
}

#[tokio::test]
async fn test_image_without_code_is_empty_not_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blank.png");
    image::GrayImage::from_pixel(120, 80, image::Luma([255u8]))
        .save(&path)
        .unwrap();

    let payloads = RqrrDecoder.decode(ImageSource::Path(path)).await.unwrap();
    assert!(payloads.is_empty());
}

#[tokio::test]
async fn test_missing_file_is_a_decode_error() {
    let err = RqrrDecoder
        .decode(ImageSource::Path("/nonexistent/qrscan.png".into()))
        .await
        .unwrap_err();
    assert_eq!(err.origin, "/nonexistent/qrscan.png");
}
