use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::shared::constants::{
    DEFAULT_8BIT_NAME, DEFAULT_AUDIO_SEGMENT_NAME, DEFAULT_COMPRESSED_NAME, DEFAULT_GRAY_NAME,
    DEFAULT_LOWRATE_NAME, DEFAULT_RESIZED_NAME, DEFAULT_SCALE, DEFAULT_SEGMENT_SECS,
    DEFAULT_VIDEO_SEGMENT_NAME,
};
use crate::shared::error::PipelineError;
use crate::video::domain::codec_profile::CodecProfile;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoArtifactNames {
    pub segment: String,
    pub grayscale: String,
    pub resized: String,
    pub recompressed: String,
}

impl Default for VideoArtifactNames {
    fn default() -> Self {
        Self {
            segment: DEFAULT_VIDEO_SEGMENT_NAME.to_string(),
            grayscale: DEFAULT_GRAY_NAME.to_string(),
            resized: DEFAULT_RESIZED_NAME.to_string(),
            recompressed: DEFAULT_COMPRESSED_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoPipelineConfig {
    pub duration_secs: f64,
    pub scale: f64,
    pub segment_profile: CodecProfile,
    pub grayscale_profile: CodecProfile,
    pub resize_profile: CodecProfile,
    pub recompress_profile: CodecProfile,
    pub output_dir: PathBuf,
    pub names: VideoArtifactNames,
    /// Where to save the first decoded frame, if anywhere.
    pub snapshot: Option<PathBuf>,
    pub parallel: bool,
}

impl Default for VideoPipelineConfig {
    fn default() -> Self {
        Self {
            duration_secs: DEFAULT_SEGMENT_SECS,
            scale: DEFAULT_SCALE,
            segment_profile: CodecProfile::Mpeg4,
            grayscale_profile: CodecProfile::Mpeg4,
            resize_profile: CodecProfile::Mpeg4,
            recompress_profile: CodecProfile::Mjpeg,
            output_dir: PathBuf::from("."),
            names: VideoArtifactNames::default(),
            snapshot: None,
            parallel: false,
        }
    }
}

impl VideoPipelineConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        validate_duration(self.duration_secs)?;
        if !(self.scale > 0.0 && self.scale <= 1.0) {
            return Err(PipelineError::InvalidConfig(format!(
                "scale must be in (0, 1], got {}",
                self.scale
            )));
        }
        validate_names(&[
            &self.names.segment,
            &self.names.grayscale,
            &self.names.resized,
            &self.names.recompressed,
        ])
    }

    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }

    /// Every file a run may write, snapshot included.
    pub fn artifact_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = [
            &self.names.segment,
            &self.names.grayscale,
            &self.names.resized,
            &self.names.recompressed,
        ]
        .into_iter()
        .map(|name| self.artifact_path(name))
        .collect();
        paths.extend(self.snapshot.as_ref().map(|name| self.output_dir.join(name)));
        paths
    }

    /// Artifact names whose extension selects a container that cannot hold
    /// the profile assigned to them.
    pub fn mismatched_containers(&self) -> Vec<(&str, CodecProfile)> {
        [
            (&self.names.segment, self.segment_profile),
            (&self.names.grayscale, self.grayscale_profile),
            (&self.names.resized, self.resize_profile),
            (&self.names.recompressed, self.recompress_profile),
        ]
        .into_iter()
        .filter(|(name, profile)| !profile.fits_extension(Path::new(name.as_str())))
        .map(|(name, profile)| (name.as_str(), profile))
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioArtifactNames {
    pub segment: String,
    pub decimated: String,
    pub quantized: String,
}

impl Default for AudioArtifactNames {
    fn default() -> Self {
        Self {
            segment: DEFAULT_AUDIO_SEGMENT_NAME.to_string(),
            decimated: DEFAULT_LOWRATE_NAME.to_string(),
            quantized: DEFAULT_8BIT_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioPipelineConfig {
    pub duration_secs: f64,
    pub output_dir: PathBuf,
    pub names: AudioArtifactNames,
}

impl Default for AudioPipelineConfig {
    fn default() -> Self {
        Self {
            duration_secs: DEFAULT_SEGMENT_SECS,
            output_dir: PathBuf::from("."),
            names: AudioArtifactNames::default(),
        }
    }
}

impl AudioPipelineConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        validate_duration(self.duration_secs)?;
        validate_names(&[
            &self.names.segment,
            &self.names.decimated,
            &self.names.quantized,
        ])
    }

    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }

    pub fn artifact_paths(&self) -> Vec<PathBuf> {
        [
            &self.names.segment,
            &self.names.decimated,
            &self.names.quantized,
        ]
        .into_iter()
        .map(|name| self.artifact_path(name))
        .collect()
    }
}

/// Both pipeline configurations, as stored in a JSON settings file.
///
/// Any field missing from the file keeps its default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub video: VideoPipelineConfig,
    pub audio: AudioPipelineConfig,
}

impl PipelineSettings {
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let json = fs::read_to_string(path).map_err(|e| {
            PipelineError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
            .map_err(|e| PipelineError::InvalidConfig(format!("{}: {e}", path.display())))
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn validate_duration(duration_secs: f64) -> Result<(), PipelineError> {
    if duration_secs.is_finite() && duration_secs > 0.0 {
        Ok(())
    } else {
        Err(PipelineError::InvalidConfig(format!(
            "duration must be a positive number of seconds, got {duration_secs}"
        )))
    }
}

fn validate_names(names: &[&String]) -> Result<(), PipelineError> {
    for (i, name) in names.iter().enumerate() {
        if name.trim().is_empty() {
            return Err(PipelineError::InvalidConfig(
                "artifact names must not be empty".to_string(),
            ));
        }
        if names[..i].contains(name) {
            return Err(PipelineError::InvalidConfig(format!(
                "artifact name '{name}' is used twice"
            )));
        }
    }
    Ok(())
}
