use std::path::{Path, PathBuf};

use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;
use crate::video::domain::codec_profile::CodecProfile;
use crate::video::domain::video_writer::{EncodeSettings, VideoWriter};

/// Frame rate used for the encoder time base when the source reports none.
const FALLBACK_FPS: i32 = 30;

/// Encodes packed RGB24 or gray frames via ffmpeg-next into a single-stream container.
pub struct FfmpegWriter {
    output_path: Option<PathBuf>,
    octx: Option<ffmpeg_next::format::context::Output>,
    encoder: Option<ffmpeg_next::codec::encoder::video::Encoder>,
    scaler: Option<ffmpeg_next::software::scaling::Context>,
    source_format: ffmpeg_next::format::Pixel,
    width: u32,
    height: u32,
    channels: u8,
    fps_i: i32,
    frame_count: usize,
}

// Safety: FfmpegWriter is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegWriter {}

impl FfmpegWriter {
    pub fn new() -> Self {
        Self {
            output_path: None,
            octx: None,
            encoder: None,
            scaler: None,
            source_format: ffmpeg_next::format::Pixel::RGB24,
            width: 0,
            height: 0,
            channels: 3,
            fps_i: FALLBACK_FPS,
            frame_count: 0,
        }
    }

    fn flush_packets(&mut self) -> Result<(), ffmpeg_next::Error> {
        let (Some(encoder), Some(octx)) = (self.encoder.as_mut(), self.octx.as_mut()) else {
            return Ok(());
        };
        let ost_time_base = octx
            .stream(0)
            .ok_or(ffmpeg_next::Error::StreamNotFound)?
            .time_base();

        let mut encoded = ffmpeg_next::Packet::empty();
        while encoder.receive_packet(&mut encoded).is_ok() {
            encoded.set_stream(0);
            encoded.rescale_ts(ffmpeg_next::Rational(1, self.fps_i), ost_time_base);
            encoded.write_interleaved(octx)?;
        }
        Ok(())
    }
}

impl Default for FfmpegWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Encoder id and the pixel format it is fed for a given input channel count.
fn encoder_format(
    profile: CodecProfile,
    channels: u8,
) -> (ffmpeg_next::codec::Id, ffmpeg_next::format::Pixel) {
    use ffmpeg_next::format::Pixel;
    match profile {
        CodecProfile::Mpeg4 => (ffmpeg_next::codec::Id::MPEG4, Pixel::YUV420P),
        CodecProfile::Mjpeg => (ffmpeg_next::codec::Id::MJPEG, Pixel::YUVJ420P),
        CodecProfile::Ffv1 if channels == 1 => (ffmpeg_next::codec::Id::FFV1, Pixel::GRAY8),
        CodecProfile::Ffv1 => (ffmpeg_next::codec::Id::FFV1, Pixel::YUV444P),
    }
}

fn source_format(channels: u8) -> Option<ffmpeg_next::format::Pixel> {
    match channels {
        3 => Some(ffmpeg_next::format::Pixel::RGB24),
        1 => Some(ffmpeg_next::format::Pixel::GRAY8),
        _ => None,
    }
}

impl VideoWriter for FfmpegWriter {
    fn open(&mut self, path: &Path, settings: &EncodeSettings) -> Result<(), PipelineError> {
        let init_err = |e: ffmpeg_next::Error| PipelineError::encode_init(path, e);

        ffmpeg_next::init().map_err(init_err)?;

        let source_format = source_format(settings.channels).ok_or_else(|| {
            PipelineError::encode_init(path, format!("unsupported channel count {}", settings.channels))
        })?;
        if settings.width == 0 || settings.height == 0 {
            return Err(PipelineError::encode_init(
                path,
                format!("invalid dimensions {}x{}", settings.width, settings.height),
            ));
        }

        let (codec_id, pixel_format) = encoder_format(settings.profile, settings.channels);

        let mut octx = ffmpeg_next::format::output(path).map_err(init_err)?;

        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        let codec = ffmpeg_next::encoder::find(codec_id).ok_or_else(|| {
            PipelineError::encode_init(path, format!("{} encoder not found", settings.profile))
        })?;

        let mut ost = octx.add_stream(Some(codec)).map_err(init_err)?;

        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()
            .map_err(init_err)?;

        encoder_ctx.set_width(settings.width);
        encoder_ctx.set_height(settings.height);
        encoder_ctx.set_format(pixel_format);

        let fps_i = settings.fps.round() as i32;
        let fps_i = if fps_i <= 0 { FALLBACK_FPS } else { fps_i };

        encoder_ctx.set_time_base(ffmpeg_next::Rational(1, fps_i));
        encoder_ctx.set_frame_rate(Some(ffmpeg_next::Rational(fps_i, 1)));

        if global_header {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }

        let encoder = encoder_ctx
            .open_with(ffmpeg_next::Dictionary::new())
            .map_err(init_err)?;
        ost.set_parameters(&encoder);

        octx.write_header().map_err(init_err)?;

        let scaler = ffmpeg_next::software::scaling::Context::get(
            source_format,
            settings.width,
            settings.height,
            pixel_format,
            settings.width,
            settings.height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )
        .map_err(init_err)?;

        log::debug!(
            "writer opened {} ({}x{}, {} ch, {} @ {fps_i} fps)",
            path.display(),
            settings.width,
            settings.height,
            settings.channels,
            settings.profile
        );

        self.output_path = Some(path.to_path_buf());
        self.octx = Some(octx);
        self.encoder = Some(encoder);
        self.scaler = Some(scaler);
        self.source_format = source_format;
        self.width = settings.width;
        self.height = settings.height;
        self.channels = settings.channels;
        self.fps_i = fps_i;
        self.frame_count = 0;

        Ok(())
    }

    fn write(&mut self, frame: &Frame) -> Result<(), PipelineError> {
        let path = self
            .output_path
            .clone()
            .ok_or_else(|| PipelineError::InvalidConfig("FfmpegWriter: not opened".to_string()))?;

        if frame.width() != self.width
            || frame.height() != self.height
            || frame.channels() != self.channels
        {
            return Err(PipelineError::encode(
                &path,
                format!(
                    "frame {} is {}x{}x{}, writer expects {}x{}x{}",
                    frame.index(),
                    frame.width(),
                    frame.height(),
                    frame.channels(),
                    self.width,
                    self.height,
                    self.channels
                ),
            ));
        }

        let mut src_frame =
            ffmpeg_next::util::frame::video::Video::new(self.source_format, self.width, self.height);

        let stride = src_frame.stride(0);
        let row = frame.row_bytes();
        let data = src_frame.data_mut(0);
        let src = frame.data();

        // Copy pixel data, respecting stride
        for y in 0..self.height as usize {
            data[y * stride..y * stride + row].copy_from_slice(&src[y * row..(y + 1) * row]);
        }

        let mut enc_frame = ffmpeg_next::util::frame::video::Video::empty();
        if let Some(scaler) = self.scaler.as_mut() {
            scaler
                .run(&src_frame, &mut enc_frame)
                .map_err(|e| PipelineError::encode(&path, e))?;
        }
        enc_frame.set_pts(Some(self.frame_count as i64));

        if let Some(encoder) = self.encoder.as_mut() {
            encoder
                .send_frame(&enc_frame)
                .map_err(|e| PipelineError::encode(&path, e))?;
        }
        self.flush_packets()
            .map_err(|e| PipelineError::encode(&path, e))?;

        self.frame_count += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), PipelineError> {
        let Some(path) = self.output_path.clone() else {
            return Ok(());
        };

        let result = (|| {
            if let Some(encoder) = self.encoder.as_mut() {
                encoder.send_eof()?;
            }
            self.flush_packets()?;
            if let Some(octx) = self.octx.as_mut() {
                octx.write_trailer()?;
            }
            Ok::<_, ffmpeg_next::Error>(())
        })();

        self.octx = None;
        self.encoder = None;
        self.scaler = None;
        self.output_path = None;

        result.map_err(|e| PipelineError::encode(&path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::domain::video_reader::VideoReader;
    use crate::video::infrastructure::ffmpeg_reader::FfmpegReader;

    fn settings(w: u32, h: u32, channels: u8, profile: CodecProfile) -> EncodeSettings {
        EncodeSettings {
            width: w,
            height: h,
            fps: 30.0,
            channels,
            profile,
        }
    }

    fn solid_frame(index: usize, w: u32, h: u32, channels: u8, value: u8) -> Frame {
        let data = vec![value; (w * h * channels as u32) as usize];
        Frame::new(data, w, h, channels, index)
    }

    #[test]
    fn test_write_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp4");

        let mut writer = FfmpegWriter::new();
        writer
            .open(&path, &settings(160, 120, 3, CodecProfile::Mpeg4))
            .unwrap();
        for i in 0..3 {
            writer.write(&solid_frame(i, 160, 120, 3, 128)).unwrap();
        }
        writer.close().unwrap();

        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_gray_frames_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.mp4");

        let mut writer = FfmpegWriter::new();
        writer
            .open(&path, &settings(160, 120, 1, CodecProfile::Mpeg4))
            .unwrap();
        for i in 0..4 {
            writer.write(&solid_frame(i, 160, 120, 1, 100)).unwrap();
        }
        writer.close().unwrap();

        let mut reader = FfmpegReader::new();
        reader.open(&path).unwrap();
        let frames: Vec<_> = reader.frames().map(|f| f.unwrap()).collect();
        assert_eq!(frames.len(), 4);

        // Decoded back to RGB; gray means the three channels agree closely.
        let px = &frames[0].data()[..3];
        let spread = px.iter().max().unwrap() - px.iter().min().unwrap();
        assert!(spread < 10, "channels should be near-equal, got {px:?}");
    }

    #[test]
    fn test_mjpeg_avi_keeps_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.avi");

        let mut writer = FfmpegWriter::new();
        writer
            .open(&path, &settings(160, 120, 3, CodecProfile::Mjpeg))
            .unwrap();
        for i in 0..2 {
            writer.write(&solid_frame(i, 160, 120, 3, 200)).unwrap();
        }
        writer.close().unwrap();

        let mut reader = FfmpegReader::new();
        reader.open(&path).unwrap();
        let props = reader.properties().unwrap();
        assert_eq!((props.width, props.height), (160, 120));
        assert_eq!(reader.frames().count(), 2);
    }

    #[test]
    fn test_write_without_open_returns_error() {
        let mut writer = FfmpegWriter::new();
        assert!(writer.write(&solid_frame(0, 160, 120, 3, 128)).is_err());
    }

    #[test]
    fn test_mismatched_frame_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp4");

        let mut writer = FfmpegWriter::new();
        writer
            .open(&path, &settings(160, 120, 3, CodecProfile::Mpeg4))
            .unwrap();
        let err = writer.write(&solid_frame(0, 80, 60, 3, 0)).unwrap_err();
        assert!(matches!(err, PipelineError::Encode { .. }));
        writer.close().unwrap();
    }

    #[test]
    fn test_open_unwritable_path_is_encode_init_failed() {
        let mut writer = FfmpegWriter::new();
        let err = writer
            .open(
                Path::new("/nonexistent/dir/out.mp4"),
                &settings(160, 120, 3, CodecProfile::Mpeg4),
            )
            .unwrap_err();
        assert!(matches!(err, PipelineError::EncodeInitFailed { .. }));
    }

    #[test]
    fn test_unsupported_channels_is_encode_init_failed() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = FfmpegWriter::new();
        let err = writer
            .open(
                &dir.path().join("out.mp4"),
                &settings(160, 120, 4, CodecProfile::Mpeg4),
            )
            .unwrap_err();
        assert!(matches!(err, PipelineError::EncodeInitFailed { .. }));
    }

    #[test]
    fn test_close_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp4");

        let mut writer = FfmpegWriter::new();
        writer
            .open(&path, &settings(160, 120, 3, CodecProfile::Mpeg4))
            .unwrap();
        writer.write(&solid_frame(0, 160, 120, 3, 128)).unwrap();
        writer.close().unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn test_roundtrip_preserves_brightness() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roundtrip.mp4");

        let mut writer = FfmpegWriter::new();
        writer
            .open(&path, &settings(160, 120, 3, CodecProfile::Mpeg4))
            .unwrap();
        for i in 0..3 {
            writer.write(&solid_frame(i, 160, 120, 3, 128)).unwrap();
        }
        writer.close().unwrap();

        let mut reader = FfmpegReader::new();
        reader.open(&path).unwrap();
        let frames: Vec<_> = reader.frames().map(|f| f.unwrap()).collect();
        assert_eq!(frames.len(), 3);

        // Codec is lossy, but the overall brightness should be close
        let first = &frames[0];
        let avg: f64 =
            first.data().iter().map(|&b| b as f64).sum::<f64>() / first.data().len() as f64;
        assert!(
            (avg - 128.0).abs() < 40.0,
            "Average pixel value {avg} should be close to 128"
        );
    }
}
