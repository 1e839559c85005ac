use std::path::Path;

use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;
use crate::shared::stream_properties::VideoProperties;

/// Reads frames from a single-stream video source.
///
/// Implementations handle I/O details (codec, container format, etc.)
/// while the pipeline works with the abstract `Frame` and `VideoProperties`
/// types. Frames are always yielded as packed RGB24.
pub trait VideoReader: Send {
    /// Opens the source. Fails with `SourceUnavailable` if it cannot be decoded.
    fn open(&mut self, path: &Path) -> Result<(), PipelineError>;

    /// Stream metadata of the opened source. Does not advance the read position.
    fn properties(&self) -> Result<VideoProperties, PipelineError>;

    /// Returns an iterator over frames in decode order, starting at frame 0.
    fn frames(&mut self) -> Box<dyn Iterator<Item = Result<Frame, PipelineError>> + '_>;

    /// Releases any resources held by the reader. Safe to call more than once.
    fn close(&mut self);
}
