use crate::video::domain::video_backend::VideoBackend;
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::VideoWriter;
use crate::video::infrastructure::ffmpeg_reader::FfmpegReader;
use crate::video::infrastructure::ffmpeg_writer::FfmpegWriter;

/// Hands out fresh ffmpeg readers and writers, one pair per pipeline stage.
#[derive(Default)]
pub struct FfmpegBackend;

impl VideoBackend for FfmpegBackend {
    fn reader(&self) -> Box<dyn VideoReader> {
        Box::new(FfmpegReader::new())
    }

    fn writer(&self) -> Box<dyn VideoWriter> {
        Box::new(FfmpegWriter::new())
    }
}
