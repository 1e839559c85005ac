use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Compression profile used when writing a video artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecProfile {
    /// MPEG-4 Part 2 ("mp4v"), inter-frame, 4:2:0.
    Mpeg4,
    /// Motion JPEG, intra-frame only.
    Mjpeg,
    /// FFV1 lossless; keeps single-channel input as gray.
    Ffv1,
}

impl CodecProfile {
    pub fn name(&self) -> &'static str {
        match self {
            CodecProfile::Mpeg4 => "mpeg4",
            CodecProfile::Mjpeg => "mjpeg",
            CodecProfile::Ffv1 => "ffv1",
        }
    }

    /// Container extension that can hold this profile.
    pub fn preferred_extension(&self) -> &'static str {
        match self {
            CodecProfile::Mpeg4 => "mp4",
            CodecProfile::Mjpeg => "avi",
            CodecProfile::Ffv1 => "mkv",
        }
    }

    /// Whether the container chosen by `path`'s extension can hold this
    /// profile. Matroska holds all of them.
    pub fn fits_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                ext == self.preferred_extension() || ext == "mkv"
            })
            .unwrap_or(false)
    }
}

impl fmt::Display for CodecProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CodecProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mpeg4" | "mp4v" => Ok(CodecProfile::Mpeg4),
            "mjpeg" | "mjpg" => Ok(CodecProfile::Mjpeg),
            "ffv1" => Ok(CodecProfile::Ffv1),
            other => Err(format!(
                "unknown codec profile '{other}', expected one of: mpeg4, mjpeg, ffv1"
            )),
        }
    }
}
