use std::path::Path;

use crate::audio::domain::audio_buffer::AudioBuffer;
use crate::audio::domain::audio_writer::AudioWriter;
use crate::shared::error::PipelineError;

/// Writes integer PCM WAV files via `hound`.
pub struct WavWriter;

impl AudioWriter for WavWriter {
    fn write(&self, path: &Path, audio: &AudioBuffer) -> Result<(), PipelineError> {
        let spec = hound::WavSpec {
            channels: audio.channels(),
            sample_rate: audio.sample_rate(),
            bits_per_sample: audio.bit_depth(),
            sample_format: hound::SampleFormat::Int,
        };
        let offset = if audio.bit_depth() == 8 { 128 } else { 0 };

        // Dropped on an early return, the writer still finalizes the header.
        let mut writer = hound::WavWriter::create(path, spec)
            .map_err(|e| PipelineError::encode_init(path, e))?;

        for &sample in audio.samples() {
            writer
                .write_sample(sample - offset)
                .map_err(|e| PipelineError::encode(path, e))?;
        }

        writer
            .finalize()
            .map_err(|e| PipelineError::encode(path, e))?;

        log::debug!(
            "wrote {} frames to {} ({} Hz, {}-bit)",
            audio.frame_count(),
            path.display(),
            audio.sample_rate(),
            audio.bit_depth()
        );
        Ok(())
    }
}
