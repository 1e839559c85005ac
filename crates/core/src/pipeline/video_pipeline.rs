use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::pipeline::extract_segment_use_case::ExtractSegmentUseCase;
use crate::pipeline::pipeline_executor::VariantExecutor;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::settings::VideoPipelineConfig;
use crate::pipeline::size_comparator::{self, SizeReport};
use crate::pipeline::source_loader::{ensure_not_source, inspect_video, open_video};
use crate::pipeline::transcode_variant_use_case::{TranscodeVariantUseCase, VariantJob};
use crate::shared::error::PipelineError;
use crate::shared::stream_properties::VideoProperties;
use crate::shared::variant_artifact::{SegmentInfo, VariantArtifact, VariantParams};
use crate::video::domain::frame_transform::PassthroughTransform;
use crate::video::domain::grayscale::GrayscaleTransform;
use crate::video::domain::image_writer::ImageWriter;
use crate::video::domain::resize::ResizeTransform;
use crate::video::domain::video_backend::VideoBackend;

/// Everything a video run produced.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoRunReport {
    pub properties: VideoProperties,
    pub snapshot: Option<PathBuf>,
    pub segment: SegmentInfo,
    /// Grayscale, resized, and recompressed variants, in that order.
    pub artifacts: Vec<VariantArtifact>,
    /// Source first, then the segment, then each variant.
    pub sizes: SizeReport,
}

/// Orchestrates inspect → snapshot → extract → variants → size report.
pub struct VideoPipeline {
    backend: Arc<dyn VideoBackend>,
    image_writer: Box<dyn ImageWriter>,
    executor: Box<dyn VariantExecutor>,
    logger: Box<dyn PipelineLogger>,
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

impl VideoPipeline {
    pub fn new(
        backend: Arc<dyn VideoBackend>,
        image_writer: Box<dyn ImageWriter>,
        executor: Box<dyn VariantExecutor>,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            backend,
            image_writer,
            executor,
            logger,
        }
    }

    pub fn run(
        &mut self,
        input: &Path,
        config: &VideoPipelineConfig,
    ) -> Result<VideoRunReport, PipelineError> {
        config.validate()?;
        for (name, profile) in config.mismatched_containers() {
            log::warn!(
                "{name}: container may not hold {profile}; a .{} name is safer",
                profile.preferred_extension()
            );
        }
        std::fs::create_dir_all(&config.output_dir)?;

        let start = Instant::now();
        let properties = inspect_video(self.backend.as_ref(), input)?;
        self.logger.timing("inspect", elapsed_ms(start));
        ensure_not_source(input, &config.artifact_paths())?;

        // Fail on a degenerate scale before any file is written.
        let resize = ResizeTransform::new(properties.width, properties.height, config.scale)?;
        let (resized_w, resized_h) = resize.target();

        let snapshot = match &config.snapshot {
            Some(name) => {
                let start = Instant::now();
                let path = config.output_dir.join(name);
                let saved = self.save_snapshot(input, &path)?;
                self.logger.timing("snapshot", elapsed_ms(start));
                saved.then_some(path)
            }
            None => None,
        };

        let start = Instant::now();
        let segment = ExtractSegmentUseCase::new(self.backend.clone(), config.segment_profile)
            .execute(
                input,
                &properties,
                config.duration_secs,
                &config.artifact_path(&config.names.segment),
                self.logger.as_mut(),
            )?;
        self.logger.timing("extract", elapsed_ms(start));
        self.logger.metric("segment_frames", segment.units_written as f64);
        self.logger.info(&format!(
            "Segment: {} frames -> {}",
            segment.units_written,
            segment.path.display()
        ));

        let jobs = vec![
            VariantJob {
                name: "grayscale".to_string(),
                output: config.artifact_path(&config.names.grayscale),
                profile: config.grayscale_profile,
                transform: Box::new(GrayscaleTransform),
                params: VariantParams::Grayscale {
                    profile: config.grayscale_profile,
                },
            },
            VariantJob {
                name: "resize".to_string(),
                output: config.artifact_path(&config.names.resized),
                profile: config.resize_profile,
                transform: Box::new(resize),
                params: VariantParams::Resize {
                    scale: config.scale,
                    width: resized_w,
                    height: resized_h,
                    profile: config.resize_profile,
                },
            },
            VariantJob {
                name: "recompress".to_string(),
                output: config.artifact_path(&config.names.recompressed),
                profile: config.recompress_profile,
                transform: Box::new(PassthroughTransform),
                params: VariantParams::Recompress {
                    profile: config.recompress_profile,
                },
            },
        ];

        let use_case = TranscodeVariantUseCase::new(self.backend.clone());
        let completed = self
            .executor
            .execute(&use_case, &segment.path, &properties, jobs)?;

        let mut artifacts = Vec::with_capacity(completed.len());
        for done in completed {
            self.logger.timing(&done.artifact.name, done.elapsed_ms);
            self.logger.info(&format!(
                "{}: {} -> {}",
                done.artifact.name,
                done.artifact.params,
                done.artifact.path.display()
            ));
            artifacts.push(done.artifact);
        }

        let mut paths = vec![input.to_path_buf(), segment.path.clone()];
        paths.extend(artifacts.iter().map(|a| a.path.clone()));
        let sizes = size_comparator::compare(&paths)?;

        self.logger.summary();

        Ok(VideoRunReport {
            properties,
            snapshot,
            segment,
            artifacts,
            sizes,
        })
    }

    /// Saves the first decoded frame. Returns `false` if the source has none.
    fn save_snapshot(&self, input: &Path, path: &Path) -> Result<bool, PipelineError> {
        let mut reader = open_video(self.backend.as_ref(), input)?;
        let first = reader.frames().next().transpose()?;
        let Some(frame) = first else {
            log::warn!("{} has no frames; snapshot skipped", input.display());
            return Ok(false);
        };
        self.image_writer.write(path, &frame)?;
        log::info!("saved first frame to {}", path.display());
        Ok(true)
    }
}
