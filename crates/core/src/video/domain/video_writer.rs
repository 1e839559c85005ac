use std::path::Path;

use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;
use crate::video::domain::codec_profile::CodecProfile;

/// Output stream parameters for a video artifact.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EncodeSettings {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// Channels of the frames handed to `write`: 3 (RGB24) or 1 (gray).
    pub channels: u8,
    pub profile: CodecProfile,
}

/// Abstracts video encoding so the pipeline can write output without
/// depending on a specific codec library.
pub trait VideoWriter: Send {
    /// Fails with `EncodeInitFailed` if the destination cannot be created
    /// or the profile is unsupported by the container.
    fn open(&mut self, path: &Path, settings: &EncodeSettings) -> Result<(), PipelineError>;

    fn write(&mut self, frame: &Frame) -> Result<(), PipelineError>;

    /// Flushes buffered packets and finalizes the container. Safe to call
    /// more than once; later calls are no-ops.
    fn close(&mut self) -> Result<(), PipelineError>;
}
