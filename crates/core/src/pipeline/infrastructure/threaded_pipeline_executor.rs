use std::path::Path;

use crate::pipeline::pipeline_executor::{run_timed, CompletedVariant, VariantExecutor};
use crate::pipeline::transcode_variant_use_case::{TranscodeVariantUseCase, VariantJob};
use crate::shared::error::PipelineError;
use crate::shared::stream_properties::VideoProperties;

/// Runs every variant on its own scoped thread.
///
/// Each thread opens its own reader on the segment and its own writer, and
/// reports back over a channel tagged with the job's position. Results are
/// put back into job order before returning, so the outcome matches
/// `SequentialExecutor`.
#[derive(Default)]
pub struct ThreadedPipelineExecutor;

impl ThreadedPipelineExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl VariantExecutor for ThreadedPipelineExecutor {
    fn execute(
        &self,
        use_case: &TranscodeVariantUseCase,
        segment: &Path,
        properties: &VideoProperties,
        jobs: Vec<VariantJob>,
    ) -> Result<Vec<CompletedVariant>, PipelineError> {
        let count = jobs.len();
        let (result_tx, result_rx) =
            crossbeam_channel::bounded::<(usize, Result<CompletedVariant, PipelineError>)>(count);

        std::thread::scope(|scope| {
            for (position, job) in jobs.into_iter().enumerate() {
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    let result = run_timed(use_case, segment, properties, &job);
                    if let Err(e) = &result {
                        log::debug!("{} failed on worker thread: {e}", job.name);
                    }
                    // Receiver outlives the scope; send cannot fail.
                    let _ = result_tx.send((position, result));
                });
            }
        });
        drop(result_tx);

        reassemble(count, result_rx.try_iter())
    }
}

/// Puts results back in job order and surfaces the earliest failure.
fn reassemble(
    count: usize,
    results: impl Iterator<Item = (usize, Result<CompletedVariant, PipelineError>)>,
) -> Result<Vec<CompletedVariant>, PipelineError> {
    let mut slots: Vec<Option<Result<CompletedVariant, PipelineError>>> =
        (0..count).map(|_| None).collect();
    for (position, result) in results {
        slots[position] = Some(result);
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(position, slot)| {
            slot.unwrap_or_else(|| {
                Err(PipelineError::InvalidConfig(format!(
                    "variant {position} produced no result"
                )))
            })
        })
        .collect()
}
