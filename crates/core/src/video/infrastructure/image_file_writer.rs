use std::path::Path;

use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;
use crate::video::domain::image_writer::ImageWriter;

/// Writes a single frame to an image file using the `image` crate.
///
/// The format follows the path extension (PNG for the first-frame snapshot).
pub struct ImageFileWriter;

impl ImageFileWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageWriter for ImageFileWriter {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), PipelineError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mismatch = || PipelineError::encode(path, "frame data does not match its dimensions");
        let result = match frame.channels() {
            3 => image::RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
                .ok_or_else(mismatch)?
                .save(path),
            1 => image::GrayImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
                .ok_or_else(mismatch)?
                .save(path),
            n => {
                return Err(PipelineError::encode(
                    path,
                    format!("cannot write {n}-channel frame as an image"),
                ))
            }
        };

        result.map_err(|e| PipelineError::encode(path, e))
    }
}
