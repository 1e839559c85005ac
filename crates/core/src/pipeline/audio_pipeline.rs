use std::path::Path;
use std::time::Instant;

use crate::audio::domain::audio_reader::AudioReader;
use crate::audio::domain::audio_transformer::AudioTransformer;
use crate::audio::domain::audio_writer::AudioWriter;
use crate::audio::domain::decimation::Decimator;
use crate::audio::domain::quantization::Quantizer;
use crate::pipeline::extract_segment_use_case::target_unit_count;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::settings::AudioPipelineConfig;
use crate::pipeline::size_comparator::{self, SizeReport};
use crate::pipeline::source_loader::{ensure_not_source, inspect_audio};
use crate::shared::error::PipelineError;
use crate::shared::stream_properties::AudioProperties;
use crate::shared::variant_artifact::{SegmentInfo, VariantArtifact};

/// Everything an audio run produced.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioRunReport {
    pub properties: AudioProperties,
    pub segment: SegmentInfo,
    /// Decimated then quantized.
    pub artifacts: Vec<VariantArtifact>,
    /// Source first, then the segment, then each variant.
    pub sizes: SizeReport,
}

/// Orchestrates inspect → extract → decimate → quantize → size report.
///
/// The segment is decoded once and held in memory; both transformers read
/// the same immutable buffer.
pub struct AudioPipeline {
    reader: Box<dyn AudioReader>,
    writer: Box<dyn AudioWriter>,
    logger: Box<dyn PipelineLogger>,
}

impl AudioPipeline {
    pub fn new(
        reader: Box<dyn AudioReader>,
        writer: Box<dyn AudioWriter>,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            reader,
            writer,
            logger,
        }
    }

    pub fn run(
        &mut self,
        input: &Path,
        config: &AudioPipelineConfig,
    ) -> Result<AudioRunReport, PipelineError> {
        config.validate()?;
        std::fs::create_dir_all(&config.output_dir)?;

        let start = Instant::now();
        let properties = inspect_audio(self.reader.as_ref(), input)?;
        self.logger.timing("inspect", elapsed_ms(start));
        ensure_not_source(input, &config.artifact_paths())?;

        let start = Instant::now();
        let target = target_unit_count(
            config.duration_secs,
            properties.sample_rate as f64,
            properties.sample_count,
        );
        let segment = self.reader.read(input, properties, Some(target))?;
        let segment_path = config.artifact_path(&config.names.segment);
        self.writer.write(&segment_path, &segment)?;
        self.logger.timing("extract", elapsed_ms(start));

        let segment_info = SegmentInfo {
            path: segment_path,
            requested_units: target,
            units_written: segment.frame_count(),
        };
        if segment_info.is_short() {
            log::warn!(
                "source ended after {} of {target} samples; segment is shorter than requested",
                segment_info.units_written
            );
        }
        self.logger
            .metric("segment_samples", segment_info.units_written as f64);
        self.logger.info(&format!(
            "Segment: {} samples -> {}",
            segment_info.units_written,
            segment_info.path.display()
        ));

        let variants: [(&str, &str, &dyn AudioTransformer); 2] = [
            ("decimate", config.names.decimated.as_str(), &Decimator),
            ("quantize", config.names.quantized.as_str(), &Quantizer),
        ];

        let mut artifacts = Vec::with_capacity(variants.len());
        for (name, file_name, transformer) in variants {
            let start = Instant::now();
            let output = transformer.transform(&segment);
            let path = config.artifact_path(file_name);
            self.writer.write(&path, &output)?;
            self.logger.timing(name, elapsed_ms(start));

            let artifact = VariantArtifact {
                name: name.to_string(),
                path,
                params: transformer.params(&segment),
                units_written: output.frame_count(),
            };
            self.logger.info(&format!(
                "{name}: {} -> {}",
                artifact.params,
                artifact.path.display()
            ));
            artifacts.push(artifact);
        }

        let mut paths = vec![input.to_path_buf(), segment_info.path.clone()];
        paths.extend(artifacts.iter().map(|a| a.path.clone()));
        let sizes = size_comparator::compare(&paths)?;

        self.logger.summary();

        Ok(AudioRunReport {
            properties,
            segment: segment_info,
            artifacts,
            sizes,
        })
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::domain::audio_buffer::AudioBuffer;
    use crate::audio::infrastructure::wav_reader::WavReader;
    use crate::audio::infrastructure::wav_writer::WavWriter;
    use crate::pipeline::pipeline_logger::NullPipelineLogger;
    use crate::shared::variant_artifact::VariantParams;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    const RATE: u32 = 1000;

    fn write_source(dir: &Path, samples: Vec<i32>) -> PathBuf {
        let path = dir.join("input.wav");
        WavWriter
            .write(&path, &AudioBuffer::new(samples, RATE, 1, 16))
            .unwrap();
        path
    }

    fn read_wav(path: &Path) -> AudioBuffer {
        let props = WavReader.inspect(path).unwrap();
        WavReader.read(path, props, None).unwrap()
    }

    fn ramp(len: usize) -> Vec<i32> {
        (0..len as i32).map(|i| (i % 2000) - 1000).collect()
    }

    fn config(dir: &Path) -> AudioPipelineConfig {
        AudioPipelineConfig {
            output_dir: dir.join("out"),
            ..Default::default()
        }
    }

    fn pipeline() -> AudioPipeline {
        AudioPipeline::new(
            Box::new(WavReader),
            Box::new(WavWriter),
            Box::new(NullPipelineLogger),
        )
    }

    #[test]
    fn test_run_writes_segment_and_variants() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_source(dir.path(), ramp(8000));
        let config = config(dir.path());

        let report = pipeline().run(&input, &config).unwrap();

        assert_eq!(report.properties.sample_rate, RATE);
        assert_eq!(report.properties.sample_count, 8000);
        assert_eq!(report.segment.units_written, 5000);

        let segment = read_wav(&report.segment.path);
        assert_eq!(segment.samples(), &ramp(5000)[..]);

        let decimated = read_wav(&report.artifacts[0].path);
        assert_eq!(decimated.sample_rate(), 500);
        assert_eq!(decimated.frame_count(), 2500);
        assert_eq!(decimated.samples()[1], segment.samples()[2]);
        assert_eq!(
            report.artifacts[0].params,
            VariantParams::Decimate {
                factor: 2,
                sample_rate: 500
            }
        );

        let quantized = read_wav(&report.artifacts[1].path);
        assert_eq!(quantized.bit_depth(), 8);
        assert_eq!(quantized.sample_rate(), RATE);
        assert_eq!(quantized.frame_count(), 5000);
        assert_eq!(*quantized.samples().iter().min().unwrap(), 0);
        assert_eq!(*quantized.samples().iter().max().unwrap(), 255);
    }

    #[test]
    fn test_short_source_gives_short_segment() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_source(dir.path(), ramp(3000));

        let report = pipeline().run(&input, &config(dir.path())).unwrap();
        assert_eq!(report.segment.requested_units, 3000);
        assert_eq!(report.segment.units_written, 3000);
        assert_eq!(report.artifacts[0].units_written, 1500);
    }

    #[test]
    fn test_constant_source_quantizes_to_midpoint() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_source(dir.path(), vec![100; 200]);

        let report = pipeline().run(&input, &config(dir.path())).unwrap();
        let quantized = read_wav(&report.artifacts[1].path);
        assert!(quantized.samples().iter().all(|&s| s == 128));
    }

    #[test]
    fn test_size_report_order_and_shrinkage() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_source(dir.path(), ramp(8000));

        let report = pipeline().run(&input, &config(dir.path())).unwrap();
        let entries = report.sizes.entries();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].path, input);
        assert!(entries[1].bytes < entries[0].bytes);
        assert!(entries[2].bytes < entries[1].bytes);
        assert!(entries[3].bytes < entries[1].bytes);
    }

    #[test]
    fn test_segment_over_source_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_source(dir.path(), ramp(100));
        let before = std::fs::read(&input).unwrap();
        let mut config = AudioPipelineConfig {
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        config.names.segment = "input.wav".to_string();

        let err = pipeline().run(&input, &config).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfig(_)));
        assert_eq!(std::fs::read(&input).unwrap(), before);
    }

    #[test]
    fn test_empty_file_is_source_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.wav");
        std::fs::write(&input, b"").unwrap();

        let err = pipeline().run(&input, &config(dir.path())).unwrap_err();
        assert!(matches!(err, PipelineError::SourceUnavailable { .. }));
    }

    struct RecordingWriter {
        written: Arc<Mutex<Vec<(PathBuf, AudioBuffer)>>>,
    }

    impl AudioWriter for RecordingWriter {
        fn write(&self, path: &Path, audio: &AudioBuffer) -> Result<(), PipelineError> {
            std::fs::write(path, b"stub")?;
            self.written
                .lock()
                .unwrap()
                .push((path.to_path_buf(), audio.clone()));
            Ok(())
        }
    }

    #[test]
    fn test_transformers_share_the_segment() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_source(dir.path(), vec![10, 20, 30, 40]);
        let written = Arc::new(Mutex::new(Vec::new()));

        AudioPipeline::new(
            Box::new(WavReader),
            Box::new(RecordingWriter {
                written: written.clone(),
            }),
            Box::new(NullPipelineLogger),
        )
        .run(&input, &config(dir.path()))
        .unwrap();

        let written = written.lock().unwrap();
        assert_eq!(written.len(), 3);
        assert_eq!(written[0].1.samples(), &[10, 20, 30, 40]);
        assert_eq!(written[1].1.samples(), &[10, 30]);
        assert_eq!(written[1].1.sample_rate(), 500);
        assert_eq!(written[2].1.samples(), &[0, 85, 170, 255]);
    }

    /// Reports a different header on every inspect, like a file rewritten mid-run.
    struct ShiftingHeaderReader {
        inspects: Mutex<u32>,
        read_with: Arc<Mutex<Option<AudioProperties>>>,
    }

    impl AudioReader for ShiftingHeaderReader {
        fn inspect(&self, _path: &Path) -> Result<AudioProperties, PipelineError> {
            let mut inspects = self.inspects.lock().unwrap();
            *inspects += 1;
            Ok(AudioProperties {
                sample_rate: 1000 * *inspects,
                sample_count: 4,
                bit_depth: 16,
                channels: 1,
            })
        }

        fn read(
            &self,
            _path: &Path,
            properties: AudioProperties,
            _max_frames: Option<usize>,
        ) -> Result<AudioBuffer, PipelineError> {
            *self.read_with.lock().unwrap() = Some(properties);
            Ok(AudioBuffer::new(
                vec![10, 20, 30, 40],
                properties.sample_rate,
                properties.channels,
                properties.bit_depth,
            ))
        }
    }

    #[test]
    fn test_segment_uses_properties_captured_at_inspect() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_source(dir.path(), vec![10, 20, 30, 40]);
        let read_with = Arc::new(Mutex::new(None));

        let report = AudioPipeline::new(
            Box::new(ShiftingHeaderReader {
                inspects: Mutex::new(0),
                read_with: read_with.clone(),
            }),
            Box::new(WavWriter),
            Box::new(NullPipelineLogger),
        )
        .run(&input, &config(dir.path()))
        .unwrap();

        assert_eq!(*read_with.lock().unwrap(), Some(report.properties));
        assert_eq!(report.properties.sample_rate, 1000);
        assert_eq!(
            report.artifacts[0].params,
            VariantParams::Decimate {
                factor: 2,
                sample_rate: 500
            }
        );
    }
}
