use super::audio_buffer::AudioBuffer;
use crate::shared::variant_artifact::VariantParams;

/// Domain interface for a pure pass over a segment's sample buffer.
///
/// Implementations never mutate their input, so several transformers can
/// read the same segment without coordination.
pub trait AudioTransformer: Send + Sync {
    fn transform(&self, audio: &AudioBuffer) -> AudioBuffer;

    /// Parameters recorded on the artifact produced from `source`.
    fn params(&self, source: &AudioBuffer) -> VariantParams;
}
