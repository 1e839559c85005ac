use std::path::Path;
use std::sync::Arc;

use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::scoped::{ScopedReader, ScopedWriter};
use crate::shared::error::PipelineError;
use crate::shared::stream_properties::VideoProperties;
use crate::shared::variant_artifact::SegmentInfo;
use crate::video::domain::codec_profile::CodecProfile;
use crate::video::domain::video_backend::VideoBackend;
use crate::video::domain::video_writer::EncodeSettings;

/// Units (frames or sample frames) a segment of `duration_secs` should hold.
///
/// `round(duration * rate)`, capped by `total` when the source length is
/// known. `total == 0` means unknown.
pub fn target_unit_count(duration_secs: f64, rate: f64, total: usize) -> usize {
    let target = (duration_secs * rate).round().max(0.0) as usize;
    if total > 0 {
        target.min(total)
    } else {
        target
    }
}

/// Copies the first `duration` seconds of a video into a new file.
///
/// Frames are re-encoded unchanged: same dimensions, same rate.
pub struct ExtractSegmentUseCase {
    backend: Arc<dyn VideoBackend>,
    profile: CodecProfile,
}

impl ExtractSegmentUseCase {
    pub fn new(backend: Arc<dyn VideoBackend>, profile: CodecProfile) -> Self {
        Self { backend, profile }
    }

    pub fn execute(
        &self,
        source: &Path,
        properties: &VideoProperties,
        duration_secs: f64,
        output: &Path,
        logger: &mut dyn PipelineLogger,
    ) -> Result<SegmentInfo, PipelineError> {
        let target = target_unit_count(duration_secs, properties.fps, properties.frame_count);
        log::debug!(
            "extracting {target} frames ({duration_secs}s at {:.2} fps) from {}",
            properties.fps,
            source.display()
        );

        let mut reader = ScopedReader::open(self.backend.reader(), source)?;
        let settings = EncodeSettings {
            width: properties.width,
            height: properties.height,
            fps: properties.fps,
            channels: 3,
            profile: self.profile,
        };
        let mut writer = ScopedWriter::open(self.backend.writer(), output, &settings)?;

        for frame in reader.frames().take(target) {
            writer.write(&frame?)?;
            logger.progress(writer.written(), target);
        }

        let written = writer.finish()?;
        if written < target {
            log::warn!(
                "source ended after {written} of {target} frames; segment is shorter than requested"
            );
        }

        Ok(SegmentInfo {
            path: output.to_path_buf(),
            requested_units: target,
            units_written: written,
        })
    }
}
