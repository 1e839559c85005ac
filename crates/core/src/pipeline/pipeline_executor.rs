use std::path::Path;
use std::time::Instant;

use crate::pipeline::transcode_variant_use_case::{TranscodeVariantUseCase, VariantJob};
use crate::shared::error::PipelineError;
use crate::shared::stream_properties::VideoProperties;
use crate::shared::variant_artifact::VariantArtifact;

/// A variant that finished, with how long it took.
#[derive(Clone, Debug, PartialEq)]
pub struct CompletedVariant {
    pub artifact: VariantArtifact,
    pub elapsed_ms: f64,
}

/// Abstracts how the independent video variants are run.
///
/// Implementations must return results in the order `jobs` were given and
/// fail with the first error in that order, whatever order the jobs
/// actually finished in.
pub trait VariantExecutor: Send + Sync {
    fn execute(
        &self,
        use_case: &TranscodeVariantUseCase,
        segment: &Path,
        properties: &VideoProperties,
        jobs: Vec<VariantJob>,
    ) -> Result<Vec<CompletedVariant>, PipelineError>;
}

pub(crate) fn run_timed(
    use_case: &TranscodeVariantUseCase,
    segment: &Path,
    properties: &VideoProperties,
    job: &VariantJob,
) -> Result<CompletedVariant, PipelineError> {
    let start = Instant::now();
    let artifact = use_case.execute(segment, properties, job)?;
    Ok(CompletedVariant {
        artifact,
        elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
    })
}

/// Runs one variant after another; each releases its handles before the next opens.
#[derive(Default)]
pub struct SequentialExecutor;

impl VariantExecutor for SequentialExecutor {
    fn execute(
        &self,
        use_case: &TranscodeVariantUseCase,
        segment: &Path,
        properties: &VideoProperties,
        jobs: Vec<VariantJob>,
    ) -> Result<Vec<CompletedVariant>, PipelineError> {
        jobs.iter()
            .map(|job| run_timed(use_case, segment, properties, job))
            .collect()
    }
}
