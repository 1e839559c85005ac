use std::fmt;
use std::path::PathBuf;

use crate::video::domain::codec_profile::CodecProfile;

/// The parameters a variant was derived with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VariantParams {
    Grayscale {
        profile: CodecProfile,
    },
    Resize {
        scale: f64,
        width: u32,
        height: u32,
        profile: CodecProfile,
    },
    Recompress {
        profile: CodecProfile,
    },
    Decimate {
        factor: usize,
        sample_rate: u32,
    },
    Quantize {
        bit_depth: u16,
    },
}

impl fmt::Display for VariantParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariantParams::Grayscale { profile } => write!(f, "grayscale ({profile})"),
            VariantParams::Resize {
                scale,
                width,
                height,
                profile,
            } => write!(f, "resize x{scale} to {width}x{height} ({profile})"),
            VariantParams::Recompress { profile } => write!(f, "recompress ({profile})"),
            VariantParams::Decimate {
                factor,
                sample_rate,
            } => write!(f, "decimate /{factor} to {sample_rate} Hz"),
            VariantParams::Quantize { bit_depth } => write!(f, "quantize to {bit_depth}-bit"),
        }
    }
}

/// One file produced by a pipeline run.
#[derive(Clone, Debug, PartialEq)]
pub struct VariantArtifact {
    pub name: String,
    pub path: PathBuf,
    pub params: VariantParams,
    /// Frames (video) or sample frames (audio) written to `path`.
    pub units_written: usize,
}

/// The extracted prefix every variant is derived from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegmentInfo {
    pub path: PathBuf,
    /// `round(duration * rate)`, capped by the source length when known.
    pub requested_units: usize,
    /// May fall short of `requested_units` when the source ends early.
    pub units_written: usize,
}

impl SegmentInfo {
    pub fn is_short(&self) -> bool {
        self.units_written < self.requested_units
    }
}
