use std::path::Path;

use super::audio_buffer::AudioBuffer;
use crate::shared::error::PipelineError;
use crate::shared::stream_properties::AudioProperties;

/// Domain interface for decoding a single uncompressed PCM stream.
pub trait AudioReader: Send + Sync {
    /// Reads the stream header only.
    fn inspect(&self, path: &Path) -> Result<AudioProperties, PipelineError>;

    /// Decodes at most `max_frames` sample frames from the start of the stream,
    /// or the whole stream when `None`.
    ///
    /// The buffer carries the `properties` captured by [`inspect`](Self::inspect);
    /// a stream whose header no longer matches them is rejected.
    fn read(
        &self,
        path: &Path,
        properties: AudioProperties,
        max_frames: Option<usize>,
    ) -> Result<AudioBuffer, PipelineError>;
}
