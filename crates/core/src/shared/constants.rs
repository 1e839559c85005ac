/// Segment length when none is configured.
pub const DEFAULT_SEGMENT_SECS: f64 = 5.0;

/// Spatial downscale factor for the resize variant.
pub const DEFAULT_SCALE: f64 = 0.5;

/// Audio decimation keeps one sample frame out of this many.
pub const DECIMATION_FACTOR: usize = 2;

/// Bit depth produced by the quantization variant.
pub const QUANTIZED_BIT_DEPTH: u16 = 8;

/// Value emitted for every sample when a buffer has no amplitude range.
pub const QUANTIZED_MIDPOINT: u8 = 128;

pub const DEFAULT_VIDEO_SEGMENT_NAME: &str = "segment_video.mp4";
pub const DEFAULT_GRAY_NAME: &str = "gray_video.mp4";
pub const DEFAULT_RESIZED_NAME: &str = "resized_segment.mp4";
pub const DEFAULT_COMPRESSED_NAME: &str = "compressed_segment.avi";

pub const DEFAULT_AUDIO_SEGMENT_NAME: &str = "segment.wav";
pub const DEFAULT_LOWRATE_NAME: &str = "compressed_lowrate.wav";
pub const DEFAULT_8BIT_NAME: &str = "compressed_8bit.wav";
