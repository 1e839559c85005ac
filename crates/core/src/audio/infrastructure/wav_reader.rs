use std::io::Read;
use std::path::Path;

use crate::audio::domain::audio_buffer::AudioBuffer;
use crate::audio::domain::audio_reader::AudioReader;
use crate::shared::error::PipelineError;
use crate::shared::stream_properties::AudioProperties;

/// Reads integer PCM WAV files via `hound`.
///
/// 8-bit data is shifted back to its stored unsigned range; hound hands it
/// out as signed.
pub struct WavReader;

fn open(path: &Path) -> Result<hound::WavReader<std::io::BufReader<std::fs::File>>, PipelineError> {
    let reader =
        hound::WavReader::open(path).map_err(|e| PipelineError::source_unavailable(path, e))?;
    let spec = reader.spec();
    if spec.sample_format != hound::SampleFormat::Int {
        return Err(PipelineError::source_unavailable(
            path,
            format!("{}-bit float PCM is not supported", spec.bits_per_sample),
        ));
    }
    Ok(reader)
}

fn properties_of<R: Read>(reader: &hound::WavReader<R>) -> AudioProperties {
    let spec = reader.spec();
    AudioProperties {
        sample_rate: spec.sample_rate,
        sample_count: reader.duration() as usize,
        bit_depth: spec.bits_per_sample,
        channels: spec.channels,
    }
}

fn same_format(a: &AudioProperties, b: &AudioProperties) -> bool {
    a.sample_rate == b.sample_rate && a.channels == b.channels && a.bit_depth == b.bit_depth
}

impl AudioReader for WavReader {
    fn inspect(&self, path: &Path) -> Result<AudioProperties, PipelineError> {
        let reader = open(path)?;
        Ok(properties_of(&reader))
    }

    fn read(
        &self,
        path: &Path,
        props: AudioProperties,
        max_frames: Option<usize>,
    ) -> Result<AudioBuffer, PipelineError> {
        let mut reader = open(path)?;
        let current = properties_of(&reader);
        if !same_format(&current, &props) {
            return Err(PipelineError::source_unavailable(
                path,
                format!(
                    "header changed since inspection ({} Hz, {} ch, {}-bit; expected {} Hz, {} ch, {}-bit)",
                    current.sample_rate,
                    current.channels,
                    current.bit_depth,
                    props.sample_rate,
                    props.channels,
                    props.bit_depth
                ),
            ));
        }
        let channels = props.channels.max(1) as usize;
        let limit = max_frames
            .unwrap_or(props.sample_count)
            .saturating_mul(channels);
        let offset = if props.bit_depth == 8 { 128 } else { 0 };

        let samples = reader
            .samples::<i32>()
            .take(limit)
            .map(|s| s.map(|v| v + offset))
            .collect::<Result<Vec<i32>, _>>()
            .map_err(|e| PipelineError::decode(path, e))?;

        // A truncated final frame is dropped so channels stay aligned.
        let whole = samples.len() - samples.len() % channels;
        let mut samples = samples;
        samples.truncate(whole);

        log::debug!(
            "read {} frames from {} ({} Hz, {} ch, {}-bit)",
            whole / channels,
            path.display(),
            props.sample_rate,
            props.channels,
            props.bit_depth
        );

        Ok(AudioBuffer::new(
            samples,
            props.sample_rate,
            props.channels,
            props.bit_depth,
        ))
    }
}
