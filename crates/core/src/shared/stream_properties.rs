/// Intrinsic properties of a video stream, captured once from the original source.
///
/// Passed by value into every downstream stage so that all variants are
/// derived from the same parameters even if the source changes on disk.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VideoProperties {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// Frame count reported by the container; 0 when the container doesn't say.
    pub frame_count: usize,
}

impl VideoProperties {
    pub fn duration_secs(&self) -> Option<f64> {
        if self.fps > 0.0 && self.frame_count > 0 {
            Some(self.frame_count as f64 / self.fps)
        } else {
            None
        }
    }
}

/// Intrinsic properties of a PCM audio stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AudioProperties {
    pub sample_rate: u32,
    /// Samples per channel (sample frames).
    pub sample_count: usize,
    pub bit_depth: u16,
    pub channels: u16,
}

impl AudioProperties {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.sample_count as f64 / self.sample_rate as f64
    }
}
