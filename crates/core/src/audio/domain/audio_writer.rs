use std::path::Path;

use super::audio_buffer::AudioBuffer;
use crate::shared::error::PipelineError;

/// Domain interface for encoding a sample buffer to an uncompressed PCM file.
pub trait AudioWriter: Send + Sync {
    /// Writes at the buffer's own rate, channel count and bit depth.
    fn write(&self, path: &Path, audio: &AudioBuffer) -> Result<(), PipelineError>;
}
