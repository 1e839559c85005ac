use std::path::{Path, PathBuf};

use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;
use crate::shared::stream_properties::VideoProperties;
use crate::video::domain::video_reader::VideoReader;

/// Decodes video frames via ffmpeg-next (libavformat + libavcodec).
///
/// Converts each decoded frame to RGB24 and wraps it in a [`Frame`].
pub struct FfmpegReader {
    input_ctx: Option<ffmpeg_next::format::context::Input>,
    path: Option<PathBuf>,
    video_stream_index: usize,
    properties: Option<VideoProperties>,
}

// Safety: FfmpegReader is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegReader {}

impl FfmpegReader {
    pub fn new() -> Self {
        Self {
            input_ctx: None,
            path: None,
            video_stream_index: 0,
            properties: None,
        }
    }
}

impl Default for FfmpegReader {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoReader for FfmpegReader {
    fn open(&mut self, path: &Path) -> Result<(), PipelineError> {
        ffmpeg_next::init().map_err(|e| PipelineError::source_unavailable(path, e))?;

        let ictx = ffmpeg_next::format::input(path)
            .map_err(|e| PipelineError::source_unavailable(path, e))?;

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or_else(|| PipelineError::source_unavailable(path, "no video stream found"))?;

        let video_stream_index = stream.index();
        let decoder = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())
            .and_then(|ctx| ctx.decoder().video())
            .map_err(|e| PipelineError::source_unavailable(path, e))?;

        let rate = stream.avg_frame_rate();
        let rate = if rate.denominator() != 0 && rate.numerator() != 0 {
            rate
        } else {
            stream.rate()
        };
        let fps = if rate.denominator() != 0 {
            rate.numerator() as f64 / rate.denominator() as f64
        } else {
            0.0
        };

        let frame_count = stream.frames().max(0) as usize;
        if frame_count == 0 {
            log::warn!("{}: container does not report a frame count", path.display());
        }

        let properties = VideoProperties {
            width: decoder.width(),
            height: decoder.height(),
            fps,
            frame_count,
        };
        log::debug!(
            "opened {} ({}x{} @ {:.3} fps, {} frames, codec {})",
            path.display(),
            properties.width,
            properties.height,
            properties.fps,
            properties.frame_count,
            decoder.codec().map(|c| c.name().to_string()).unwrap_or_default()
        );

        self.video_stream_index = video_stream_index;
        self.properties = Some(properties);
        self.path = Some(path.to_path_buf());
        self.input_ctx = Some(ictx);

        Ok(())
    }

    fn properties(&self) -> Result<VideoProperties, PipelineError> {
        self.properties.ok_or_else(not_opened)
    }

    fn frames(&mut self) -> Box<dyn Iterator<Item = Result<Frame, PipelineError>> + '_> {
        let stream_index = self.video_stream_index;
        let (Some(ictx), Some(path)) = (self.input_ctx.as_mut(), self.path.clone()) else {
            return Box::new(std::iter::once(Err(not_opened())));
        };

        let setup = (|| {
            let stream = ictx
                .stream(stream_index)
                .ok_or(ffmpeg_next::Error::StreamNotFound)?;
            let decoder = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?
                .decoder()
                .video()?;
            let scaler = ffmpeg_next::software::scaling::Context::get(
                decoder.format(),
                decoder.width(),
                decoder.height(),
                ffmpeg_next::format::Pixel::RGB24,
                decoder.width(),
                decoder.height(),
                ffmpeg_next::software::scaling::Flags::BILINEAR,
            )?;
            Ok::<_, ffmpeg_next::Error>((decoder, scaler))
        })();

        let (decoder, scaler) = match setup {
            Ok(parts) => parts,
            Err(e) => return Box::new(std::iter::once(Err(PipelineError::decode(&path, e)))),
        };

        let width = decoder.width();
        let height = decoder.height();

        Box::new(FfmpegFrameIter {
            ictx,
            decoder,
            scaler,
            path,
            width,
            height,
            video_stream_index: stream_index,
            frame_index: 0,
            flushing: false,
            done: false,
        })
    }

    fn close(&mut self) {
        self.input_ctx = None;
        self.properties = None;
        self.path = None;
    }
}

fn not_opened() -> PipelineError {
    PipelineError::InvalidConfig("FfmpegReader: not opened".to_string())
}

/// Lazy iterator that decodes video frames one at a time, avoiding the need
/// to buffer the entire video in memory.
struct FfmpegFrameIter<'a> {
    ictx: &'a mut ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    path: PathBuf,
    width: u32,
    height: u32,
    video_stream_index: usize,
    frame_index: usize,
    flushing: bool,
    done: bool,
}

impl FfmpegFrameIter<'_> {
    fn try_receive(&mut self) -> Option<Result<Frame, PipelineError>> {
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        if let Err(e) = self.decoder.receive_frame(&mut decoded) {
            if is_drained(&e) {
                return None;
            }
            return Some(Err(self.fail(e)));
        }

        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::empty();
        if let Err(e) = self.scaler.run(&decoded, &mut rgb_frame) {
            return Some(Err(self.fail(e)));
        }

        let pixels = extract_packed_pixels(&rgb_frame, self.width, self.height, 3);
        let frame = Frame::new(pixels, self.width, self.height, 3, self.frame_index);
        self.frame_index += 1;
        Some(Ok(frame))
    }

    /// Ends the stream; nothing after a failed packet or frame is yielded.
    fn fail(&mut self, e: ffmpeg_next::Error) -> PipelineError {
        self.done = true;
        PipelineError::decode(&self.path, e)
    }
}

/// True when the decoder has no frame ready yet or has been fully flushed.
fn is_drained(e: &ffmpeg_next::Error) -> bool {
    match e {
        ffmpeg_next::Error::Eof => true,
        ffmpeg_next::Error::Other { errno } => *errno == ffmpeg_next::util::error::EAGAIN,
        _ => false,
    }
}

impl Iterator for FfmpegFrameIter<'_> {
    type Item = Result<Frame, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if let Some(result) = self.try_receive() {
            return Some(result);
        }

        if self.flushing {
            self.done = true;
            return None;
        }

        loop {
            let Some((stream, packet)) = self.ictx.packets().next() else {
                let _ = self.decoder.send_eof();
                self.flushing = true;
                if let Some(result) = self.try_receive() {
                    return Some(result);
                }
                self.done = true;
                return None;
            };

            if stream.index() != self.video_stream_index {
                continue;
            }

            if let Err(e) = self.decoder.send_packet(&packet) {
                log::error!("{}: undecodable packet: {e}", self.path.display());
                return Some(Err(self.fail(e)));
            }

            if let Some(result) = self.try_receive() {
                return Some(result);
            }
        }
    }
}

/// Copies pixel data from an ffmpeg frame into a contiguous buffer.
///
/// ffmpeg frames may have padding bytes at the end of each row (stride > width * channels).
/// This strips that padding to produce a tightly-packed pixel buffer.
pub(crate) fn extract_packed_pixels(
    frame: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
    channels: usize,
) -> Vec<u8> {
    let stride = frame.stride(0);
    let data = frame.data(0);
    let row = width as usize * channels;
    let h = height as usize;

    let mut pixels = Vec::with_capacity(row * h);
    for y in 0..h {
        let start = y * stride;
        pixels.extend_from_slice(&data[start..start + row]);
    }
    pixels
}
