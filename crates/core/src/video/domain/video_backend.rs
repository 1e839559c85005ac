use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::VideoWriter;

/// Factory for the reader/writer pair each pipeline stage opens for itself.
///
/// Stages never share a handle, so every call must return a fresh, unopened
/// instance.
pub trait VideoBackend: Send + Sync {
    fn reader(&self) -> Box<dyn VideoReader>;
    fn writer(&self) -> Box<dyn VideoWriter>;
}
