use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::pipeline::scoped::{ScopedReader, ScopedWriter};
use crate::shared::error::PipelineError;
use crate::shared::stream_properties::VideoProperties;
use crate::shared::variant_artifact::{VariantArtifact, VariantParams};
use crate::video::domain::codec_profile::CodecProfile;
use crate::video::domain::frame_transform::FrameTransform;
use crate::video::domain::video_backend::VideoBackend;
use crate::video::domain::video_writer::EncodeSettings;

/// One video variant to derive from the segment.
pub struct VariantJob {
    pub name: String,
    pub output: PathBuf,
    pub profile: CodecProfile,
    pub transform: Box<dyn FrameTransform>,
    pub params: VariantParams,
}

/// Decodes the segment, passes every frame through a transform, and encodes
/// the result.
///
/// Each call opens its own reader and writer, so independent jobs may run
/// concurrently against the same segment file.
pub struct TranscodeVariantUseCase {
    backend: Arc<dyn VideoBackend>,
}

impl TranscodeVariantUseCase {
    pub fn new(backend: Arc<dyn VideoBackend>) -> Self {
        Self { backend }
    }

    /// `properties` are the source's; the segment is never re-inspected.
    pub fn execute(
        &self,
        segment: &Path,
        properties: &VideoProperties,
        job: &VariantJob,
    ) -> Result<VariantArtifact, PipelineError> {
        let (width, height) = job
            .transform
            .output_dimensions(properties.width, properties.height);
        let settings = EncodeSettings {
            width,
            height,
            fps: properties.fps,
            channels: job.transform.output_channels(3),
            profile: job.profile,
        };
        log::debug!(
            "{}: {}x{} -> {width}x{height}, {} ch, {}",
            job.name,
            properties.width,
            properties.height,
            settings.channels,
            job.profile
        );

        let mut reader = ScopedReader::open(self.backend.reader(), segment)?;
        let mut writer = ScopedWriter::open(self.backend.writer(), &job.output, &settings)?;

        for frame in reader.frames() {
            let out = job.transform.apply(frame?)?;
            writer.write(&out)?;
        }
        let written = writer.finish()?;

        log::info!("wrote {} ({written} frames)", job.output.display());

        Ok(VariantArtifact {
            name: job.name.clone(),
            path: job.output.clone(),
            params: job.params,
            units_written: written,
        })
    }
}
