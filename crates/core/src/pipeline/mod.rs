pub mod audio_pipeline;
pub mod extract_segment_use_case;
pub mod infrastructure;
pub mod pipeline_executor;
pub mod pipeline_logger;
pub mod scoped;
pub mod settings;
pub mod size_comparator;
pub mod source_loader;
#[cfg(test)]
pub(crate) mod test_support;
pub mod transcode_variant_use_case;
pub mod video_pipeline;
