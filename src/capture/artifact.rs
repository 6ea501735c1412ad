//! Capture artifacts: snapshot a rectangle and persist it as a PNG.
//!
//! Files are named from the capture instant with millisecond precision and
//! created with create-new semantics, so two captures never share a file.

use super::Rect;
use chrono::{DateTime, Local};
use image::{ImageFormat, RgbaImage};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Highest numeric suffix tried when several captures land in one millisecond.
const MAX_NAME_ATTEMPTS: u32 = 100;

/// Copies pixels from the live screen.
pub trait ScreenSource: Send + Sync {
    /// Returns an image exactly `rect.width` x `rect.height` pixels.
    fn grab(&self, rect: Rect) -> Result<RgbaImage, CaptureError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Capture region {0} is empty")]
    EmptyRegion(Rect),

    #[error("Screen capture failed: {0}")]
    Grab(String),

    #[error("PNG encoding failed: {0}")]
    Encode(String),

    #[error("Failed to write capture: {0}")]
    Io(#[from] io::Error),
}

/// `capture_<yyyy-MM-dd_HH-mm-ss-fff>.png`, with `_<n>` before the
/// extension for the n-th retry within the same millisecond.
pub fn artifact_file_name(at: DateTime<Local>, attempt: u32) -> String {
    let stamp = at.format("%Y-%m-%d_%H-%M-%S-%3f");
    if attempt == 0 {
        format!("capture_{}.png", stamp)
    } else {
        format!("capture_{}_{}.png", stamp, attempt)
    }
}

/// Grabs screen rectangles and writes them into the output directory.
pub struct ImageCapturer {
    screen: Arc<dyn ScreenSource>,
    output_dir: PathBuf,
}

impl ImageCapturer {
    pub fn new(screen: Arc<dyn ScreenSource>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            screen,
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Creates the output directory if absent. Called once at start-up.
    pub fn ensure_output_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.output_dir)
    }

    /// Snapshots `rect` now and writes it to a new PNG file.
    ///
    /// Returns the artifact path. Nothing is left on disk when this fails.
    pub fn capture(&self, rect: Rect) -> Result<PathBuf, CaptureError> {
        if rect.is_empty() {
            return Err(CaptureError::EmptyRegion(rect));
        }

        let image = self.screen.grab(rect)?;
        let (file, path) = self.create_artifact_file(Local::now())?;

        if let Err(e) = write_png(file, &image) {
            let _ = fs::remove_file(&path);
            return Err(e);
        }

        log::debug!(
            "[CAPTURE] Wrote {}x{} capture to {}",
            image.width(),
            image.height(),
            path.display()
        );
        Ok(path)
    }

    fn create_artifact_file(&self, at: DateTime<Local>) -> io::Result<(File, PathBuf)> {
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let path = self.output_dir.join(artifact_file_name(at, attempt));
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((file, path)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            }
        }
        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!(
                "no free capture file name for {} in {}",
                at.format("%H:%M:%S%.3f"),
                self.output_dir.display()
            ),
        ))
    }
}

fn write_png(file: File, image: &RgbaImage) -> Result<(), CaptureError> {
    let mut writer = BufWriter::new(file);
    image
        .write_to(&mut writer, ImageFormat::Png)
        .map_err(|e| CaptureError::Encode(e.to_string()))?;
    writer.flush()?;
    Ok(())
}
