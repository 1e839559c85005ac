use ndarray::Axis;

use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;
use crate::video::domain::frame_transform::FrameTransform;

/// ITU-R BT.601 luma weights.
const LUMA_R: f32 = 0.299;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

/// Perceptual luminance of one RGB pixel.
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let y = LUMA_R * r as f32 + LUMA_G * g as f32 + LUMA_B * b as f32;
    y.round().clamp(0.0, 255.0) as u8
}

/// Reduces an RGB frame to a single luminance channel, keeping size and index.
///
/// A frame that is already single-channel is returned unchanged.
pub fn to_grayscale(frame: &Frame) -> Frame {
    if frame.channels() == 1 {
        return frame.clone();
    }

    let gray = frame
        .as_ndarray()
        .map_axis(Axis(2), |px| luma(px[0], px[1], px[2]));
    let data: Vec<u8> = gray.iter().copied().collect();

    Frame::new(data, frame.width(), frame.height(), 1, frame.index())
}

pub struct GrayscaleTransform;

impl FrameTransform for GrayscaleTransform {
    fn output_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        (width, height)
    }

    fn output_channels(&self, _input_channels: u8) -> u8 {
        1
    }

    fn apply(&self, frame: Frame) -> Result<Frame, PipelineError> {
        Ok(to_grayscale(&frame))
    }
}
