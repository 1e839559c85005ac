use super::audio_buffer::AudioBuffer;
use super::audio_transformer::AudioTransformer;
use crate::shared::constants::DECIMATION_FACTOR;
use crate::shared::variant_artifact::VariantParams;

/// Keeps every `factor`-th sample frame, starting with frame 0.
///
/// No anti-alias filtering is applied. Whole interleaved frames are kept so
/// channels stay aligned. Output length is `ceil(frames / factor)`.
pub fn decimate_samples(samples: &[i32], channels: u16, factor: usize) -> Vec<i32> {
    let channels = channels.max(1) as usize;
    let factor = factor.max(1);
    samples
        .chunks_exact(channels)
        .step_by(factor)
        .flatten()
        .copied()
        .collect()
}

/// Halves the sample rate by nearest-neighbour decimation.
///
/// `new_rate = floor(rate / 2)`. Buffers shorter than two frames are valid
/// input and yield zero or one frame.
pub fn decimate(audio: &AudioBuffer) -> AudioBuffer {
    AudioBuffer::new(
        decimate_samples(audio.samples(), audio.channels(), DECIMATION_FACTOR),
        audio.sample_rate() / DECIMATION_FACTOR as u32,
        audio.channels(),
        audio.bit_depth(),
    )
}

pub struct Decimator;

impl AudioTransformer for Decimator {
    fn transform(&self, audio: &AudioBuffer) -> AudioBuffer {
        decimate(audio)
    }

    fn params(&self, source: &AudioBuffer) -> VariantParams {
        VariantParams::Decimate {
            factor: DECIMATION_FACTOR,
            sample_rate: source.sample_rate() / DECIMATION_FACTOR as u32,
        }
    }
}
