// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! This module provides command-line functionality for:
//! - Listing available cameras
//! - Headless scanning from a camera
//! - Decoding image files
//! - Generating QR codes
//! - Capturing photos into an album

use qrscan::{AppResult, Config};
use qrscan::backends::camera::{
    CameraFrame, CameraPipeline, CaptureOutcome, PipelineStill, StillCamera, enumerate_cameras,
    select_camera,
};
use qrscan::backends::{
    PermissionKind, PermissionProvider, SystemOpener, SystemPermissions, open_link,
};
use qrscan::constants::{notices, prompt};
use qrscan::qr::{ImageSource, QrDetector, QrPreview, decode_image_blocking, generate};
use qrscan::storage::{DirectoryPhotoStore, save_to_album};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{error, warn};

/// List all available cameras
pub fn list_cameras() -> AppResult<()> {
    let cameras = enumerate_cameras();

    if cameras.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    println!("Available cameras:");
    println!();
    for (index, camera) in cameras.iter().enumerate() {
        println!("  [{}] {}", index, camera.name);
        println!("      Device: {}", camera.path);
    }

    Ok(())
}

/// Scan the camera until a QR code shows up and print it
pub fn scan(
    config: &Config,
    camera_index: Option<usize>,
    open: bool,
) -> AppResult<()> {
    gstreamer::init()?;

    let camera = select_camera(config.camera_device.as_deref(), camera_index)?;
    println!("Using camera: {}", camera.name);

    // Set up Ctrl+C handler
    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_flag_clone = stop_flag.clone();
    ctrlc::set_handler(move || {
        stop_flag_clone.store(true, Ordering::SeqCst);
    })?;

    let (_pipeline, mut receiver) = CameraPipeline::start(&camera)?;
    let detector = QrDetector::with_max_dimension(config.max_detect_dimension);
    let interval = Duration::from_millis(config.scan_interval_ms);

    println!("Scanning... (press Ctrl+C to stop)");
    let mut last_attempt: Option<Instant> = None;
    let payload = loop {
        if stop_flag.load(Ordering::SeqCst) {
            println!("Stopped.");
            return Ok(());
        }

        let frame: Option<CameraFrame> = match receiver.try_next() {
            Ok(Some(frame)) => Some(frame),
            Ok(None) => return Err("Camera stream ended".into()),
            Err(_) => None,
        };
        let due = last_attempt.is_none_or(|t| t.elapsed() >= interval);
        match frame {
            Some(frame) if due => {
                last_attempt = Some(Instant::now());
                if let Some(first) = detector.detect_sync(&frame).into_iter().next() {
                    break first;
                }
            }
            _ => std::thread::sleep(Duration::from_millis(16)),
        }
    };

    println!("{payload}");

    if open && confirm_on_stdin(&payload)? {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(open_link(&SystemOpener, &payload))?;
    }

    Ok(())
}

/// Ask the confirmation prompt on the terminal; anything but y/yes cancels
fn confirm_on_stdin(payload: &str) -> AppResult<bool> {
    println!();
    println!("{}", prompt::TITLE);
    println!("{}", prompt::MESSAGE);
    print!("  {payload} [y/N] ");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Decode QR codes in image files
pub fn decode(paths: &[PathBuf]) -> AppResult<()> {
    let mut failures = 0;

    for path in paths {
        let label = if paths.len() > 1 {
            format!("{}: ", path.display())
        } else {
            String::new()
        };

        match decode_image_blocking(&ImageSource::Path(path.clone())) {
            Ok(payloads) if payloads.is_empty() => {
                println!("{label}{}", notices::NO_QR_FOUND);
            }
            Ok(payloads) => {
                for payload in payloads {
                    println!("{label}{payload}");
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to decode image");
                eprintln!("{label}{e}");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        return Err(format!("{failures} image(s) could not be decoded").into());
    }
    Ok(())
}

/// Encode text as a QR code, printed to the terminal or written as PNG
pub fn generate_code(
    text: &str,
    output: Option<PathBuf>,
    size: u32,
) -> AppResult<()> {
    let code = match generate(text) {
        QrPreview::Code(code) => code,
        QrPreview::Empty => return Err("Nothing to encode".into()),
        QrPreview::TooLong => return Err("Text is too long for a QR code".into()),
    };

    match output {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)?;
            }
            code.to_image(size).save(&path)?;
            println!("QR code saved: {}", path.display());
        }
        None => {
            for line in code.to_unicode_lines() {
                println!("{line}");
            }
        }
    }
    Ok(())
}

/// Take a photo and save it into an album
pub fn capture(
    config: &Config,
    camera_index: Option<usize>,
    album: Option<String>,
) -> AppResult<()> {
    gstreamer::init()?;
    let runtime = tokio::runtime::Runtime::new()?;

    let library_root = config.library_root();
    let permissions = SystemPermissions::new(config.permission_backend, library_root.clone());

    if !runtime
        .block_on(permissions.request(PermissionKind::Camera))
        .is_granted()
    {
        return Err(notices::NO_CAMERA_ACCESS.into());
    }

    let camera = select_camera(config.camera_device.as_deref(), camera_index)?;
    println!("Using camera: {}", camera.name);
    println!("Capturing...");

    let asset = match runtime.block_on(PipelineStill::new(camera).capture())? {
        CaptureOutcome::Captured(asset) => asset,
        CaptureOutcome::Cancelled => {
            warn!("Camera delivered no frame");
            return Err("Failed to capture frame from camera".into());
        }
    };

    if !runtime
        .block_on(permissions.request(PermissionKind::Library))
        .is_granted()
    {
        return Err(notices::NO_LIBRARY_ACCESS.into());
    }

    let album = album.unwrap_or_else(|| config.album_name.clone());
    let store = DirectoryPhotoStore::new(library_root);
    match runtime.block_on(save_to_album(&store, &asset, &album)) {
        Ok(saved) => {
            println!("{}", notices::SAVE_OK);
            println!("Photo saved: {}", saved.path.display());
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Failed to save image");
            eprintln!("{}", notices::SAVE_FAILED);
            Err(e.into())
        }
    }
}
