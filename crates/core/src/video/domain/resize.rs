use image::imageops::{self, FilterType};
use image::{GrayImage, RgbImage};

use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;
use crate::video::domain::frame_transform::FrameTransform;

/// Target dimensions for a spatial downscale: `floor(w * scale) x floor(h * scale)`.
///
/// `scale` must lie in `(0, 1]` and both resulting dimensions must be non-zero.
pub fn scaled_dimensions(width: u32, height: u32, scale: f64) -> Result<(u32, u32), PipelineError> {
    if !(scale > 0.0 && scale <= 1.0) {
        return Err(PipelineError::InvalidConfig(format!(
            "scale must be in (0, 1], got {scale}"
        )));
    }

    let new_w = (width as f64 * scale).floor() as u32;
    let new_h = (height as f64 * scale).floor() as u32;
    if new_w == 0 || new_h == 0 {
        return Err(PipelineError::InvalidConfig(format!(
            "scale {scale} collapses {width}x{height} to {new_w}x{new_h}"
        )));
    }
    Ok((new_w, new_h))
}

/// Resamples a frame to exactly `width x height` with bilinear interpolation.
pub fn resize_frame(frame: &Frame, width: u32, height: u32) -> Result<Frame, PipelineError> {
    if frame.width() == width && frame.height() == height {
        return Ok(frame.clone());
    }

    let data = match frame.channels() {
        3 => {
            let img = RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
                .ok_or_else(|| invalid_buffer(frame))?;
            imageops::resize(&img, width, height, FilterType::Triangle).into_raw()
        }
        1 => {
            let img = GrayImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
                .ok_or_else(|| invalid_buffer(frame))?;
            imageops::resize(&img, width, height, FilterType::Triangle).into_raw()
        }
        n => {
            return Err(PipelineError::InvalidConfig(format!(
                "cannot resize frame with {n} channels"
            )))
        }
    };

    Ok(Frame::new(
        data,
        width,
        height,
        frame.channels(),
        frame.index(),
    ))
}

fn invalid_buffer(frame: &Frame) -> PipelineError {
    PipelineError::InvalidConfig(format!(
        "frame {} buffer does not match {}x{}x{}",
        frame.index(),
        frame.width(),
        frame.height(),
        frame.channels()
    ))
}

/// Downscales every frame by a fixed factor, computed once from the source size.
pub struct ResizeTransform {
    width: u32,
    height: u32,
}

impl ResizeTransform {
    pub fn new(source_width: u32, source_height: u32, scale: f64) -> Result<Self, PipelineError> {
        let (width, height) = scaled_dimensions(source_width, source_height, scale)?;
        Ok(Self { width, height })
    }

    pub fn target(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl FrameTransform for ResizeTransform {
    fn output_dimensions(&self, _width: u32, _height: u32) -> (u32, u32) {
        (self.width, self.height)
    }

    fn output_channels(&self, input_channels: u8) -> u8 {
        input_channels
    }

    fn apply(&self, frame: Frame) -> Result<Frame, PipelineError> {
        resize_frame(&frame, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::half_hd(1920, 1080, 0.5, (960, 540))]
    #[case::odd_floors(101, 51, 0.5, (50, 25))]
    #[case::unity(640, 480, 1.0, (640, 480))]
    #[case::quarter(300, 202, 0.25, (75, 50))]
    fn test_scaled_dimensions_floor(
        #[case] w: u32,
        #[case] h: u32,
        #[case] scale: f64,
        #[case] expected: (u32, u32),
    ) {
        assert_eq!(scaled_dimensions(w, h, scale).unwrap(), expected);
    }

    #[rstest]
    #[case::zero(0.0)]
    #[case::negative(-0.5)]
    #[case::upscale(1.5)]
    #[case::nan(f64::NAN)]
    fn test_scale_out_of_range_rejected(#[case] scale: f64) {
        assert!(matches!(
            scaled_dimensions(100, 100, scale),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_scale_collapsing_to_zero_rejected() {
        assert!(scaled_dimensions(1, 1, 0.5).is_err());
    }

    #[test]
    fn test_resize_rgb_dimensions_and_index() {
        let frame = Frame::new(vec![100; 8 * 6 * 3], 8, 6, 3, 3);
        let out = resize_frame(&frame, 4, 3).unwrap();
        assert_eq!((out.width(), out.height(), out.channels()), (4, 3, 3));
        assert_eq!(out.index(), 3);
        assert_eq!(out.data().len(), 4 * 3 * 3);
    }

    #[test]
    fn test_resize_solid_color_stays_solid() {
        let frame = Frame::new([10, 20, 30].repeat(16 * 16), 16, 16, 3, 0);
        let out = resize_frame(&frame, 8, 8).unwrap();
        for px in out.data().chunks_exact(3) {
            assert_eq!(px, &[10, 20, 30]);
        }
    }

    #[test]
    fn test_resize_gray_frame() {
        let frame = Frame::new(vec![50; 10 * 10], 10, 10, 1, 0);
        let out = resize_frame(&frame, 5, 5).unwrap();
        assert_eq!(out.channels(), 1);
        assert_eq!(out.data().len(), 25);
    }

    #[test]
    fn test_resize_is_deterministic() {
        let data: Vec<u8> = (0..(12 * 9 * 3)).map(|i| (i * 7 % 256) as u8).collect();
        let frame = Frame::new(data, 12, 9, 3, 0);
        let a = resize_frame(&frame, 6, 4).unwrap();
        let b = resize_frame(&frame, 6, 4).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_transform_uses_fixed_target() {
        let t = ResizeTransform::new(640, 480, 0.5).unwrap();
        assert_eq!(t.target(), (320, 240));
        assert_eq!(t.output_dimensions(640, 480), (320, 240));
        assert_eq!(t.output_channels(3), 3);
    }
}
