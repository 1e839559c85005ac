use std::path::Path;

use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;

/// Writes a single frame to an image file.
pub trait ImageWriter: Send {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), PipelineError>;
}
