use thiserror::Error;

use super::audio_buffer::AudioBuffer;
use super::audio_transformer::AudioTransformer;
use crate::shared::constants::{QUANTIZED_BIT_DEPTH, QUANTIZED_MIDPOINT};
use crate::shared::variant_artifact::VariantParams;

const QUANTIZED_MAX: f64 = 255.0;

/// Why a buffer has no usable min–max range.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeError {
    #[error("buffer is empty")]
    Empty,
    #[error("degenerate range: every sample equals {value}")]
    DegenerateRange { value: i32 },
}

/// `(min, max)` over all samples, or why normalization is undefined.
pub fn sample_range(samples: &[i32]) -> Result<(i32, i32), RangeError> {
    let mut iter = samples.iter().copied();
    let first = iter.next().ok_or(RangeError::Empty)?;
    let (min, max) = iter.fold((first, first), |(lo, hi), s| (lo.min(s), hi.max(s)));
    if min == max {
        return Err(RangeError::DegenerateRange { value: min });
    }
    Ok((min, max))
}

/// Maps samples onto `0..=255` by min–max normalization.
///
/// `q = round((s - min) / (max - min) * 255)`, clamped. A constant buffer
/// has no range to normalize over and maps every sample to 128.
pub fn quantize_samples(samples: &[i32]) -> Vec<u8> {
    match sample_range(samples) {
        Ok((min, max)) => {
            let span = max as f64 - min as f64;
            samples
                .iter()
                .map(|&s| {
                    let q = (s as f64 - min as f64) / span * QUANTIZED_MAX;
                    q.round().clamp(0.0, QUANTIZED_MAX) as u8
                })
                .collect()
        }
        Err(RangeError::DegenerateRange { value }) => {
            log::warn!(
                "quantization: all {} samples equal {value}, emitting midpoint {QUANTIZED_MIDPOINT}",
                samples.len()
            );
            vec![QUANTIZED_MIDPOINT; samples.len()]
        }
        Err(RangeError::Empty) => Vec::new(),
    }
}

/// Re-maps a buffer to 8-bit unsigned depth at the same sample rate.
pub fn quantize(audio: &AudioBuffer) -> AudioBuffer {
    let samples = quantize_samples(audio.samples())
        .into_iter()
        .map(i32::from)
        .collect();
    AudioBuffer::new(
        samples,
        audio.sample_rate(),
        audio.channels(),
        QUANTIZED_BIT_DEPTH,
    )
}

pub struct Quantizer;

impl AudioTransformer for Quantizer {
    fn transform(&self, audio: &AudioBuffer) -> AudioBuffer {
        quantize(audio)
    }

    fn params(&self, _source: &AudioBuffer) -> VariantParams {
        VariantParams::Quantize {
            bit_depth: QUANTIZED_BIT_DEPTH,
        }
    }
}
