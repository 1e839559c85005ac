use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;

/// A per-frame pass applied between decoding a segment and encoding a variant.
///
/// Implementations must be deterministic: the same input frame always yields
/// the same output, and output geometry depends only on input geometry.
pub trait FrameTransform: Send {
    /// Dimensions of every frame this transform emits for the given input size.
    fn output_dimensions(&self, width: u32, height: u32) -> (u32, u32);

    /// Channel count of every frame this transform emits.
    fn output_channels(&self, input_channels: u8) -> u8;

    fn apply(&self, frame: Frame) -> Result<Frame, PipelineError>;
}

/// Leaves frames untouched; used when only the codec profile changes.
pub struct PassthroughTransform;

impl FrameTransform for PassthroughTransform {
    fn output_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        (width, height)
    }

    fn output_channels(&self, input_channels: u8) -> u8 {
        input_channels
    }

    fn apply(&self, frame: Frame) -> Result<Frame, PipelineError> {
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough_keeps_frame() {
        let frame = Frame::new(vec![1, 2, 3, 4, 5, 6], 2, 1, 3, 4);
        let out = PassthroughTransform.apply(frame.clone()).unwrap();
        assert_eq!(out, frame);
    }

    #[test]
    fn test_passthrough_geometry() {
        assert_eq!(PassthroughTransform.output_dimensions(640, 360), (640, 360));
        assert_eq!(PassthroughTransform.output_channels(3), 3);
    }
}
