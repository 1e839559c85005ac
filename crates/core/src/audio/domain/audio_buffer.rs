/// Decoded integer PCM: interleaved samples at their native amplitude.
///
/// 8-bit audio is held as unsigned `0..=255` (the WAV convention); wider
/// depths are signed. Values are never normalized to floats in storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioBuffer {
    samples: Vec<i32>,
    sample_rate: u32,
    channels: u16,
    bit_depth: u16,
}

impl AudioBuffer {
    pub fn new(samples: Vec<i32>, sample_rate: u32, channels: u16, bit_depth: u16) -> Self {
        debug_assert!(channels > 0, "channel count must be positive");
        debug_assert_eq!(
            samples.len() % channels as usize,
            0,
            "sample count must be a multiple of the channel count"
        );
        Self {
            samples,
            sample_rate,
            channels,
            bit_depth,
        }
    }

    pub fn samples(&self) -> &[i32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn bit_depth(&self) -> u16 {
        self.bit_depth
    }

    /// Number of sample frames (one sample per channel).
    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

}
