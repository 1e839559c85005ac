use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use mediaslice_core::audio::infrastructure::wav_reader::WavReader;
use mediaslice_core::audio::infrastructure::wav_writer::WavWriter;
use mediaslice_core::pipeline::audio_pipeline::{AudioPipeline, AudioRunReport};
use mediaslice_core::pipeline::infrastructure::threaded_pipeline_executor::ThreadedPipelineExecutor;
use mediaslice_core::pipeline::pipeline_executor::{SequentialExecutor, VariantExecutor};
use mediaslice_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use mediaslice_core::pipeline::settings::{
    AudioPipelineConfig, PipelineSettings, VideoPipelineConfig,
};
use mediaslice_core::pipeline::size_comparator::SizeUnit;
use mediaslice_core::pipeline::video_pipeline::{VideoPipeline, VideoRunReport};
use mediaslice_core::video::domain::codec_profile::CodecProfile;
use mediaslice_core::video::infrastructure::ffmpeg_backend::FfmpegBackend;
use mediaslice_core::video::infrastructure::image_file_writer::ImageFileWriter;

/// Cut a fixed-length segment from a video or WAV file, derive smaller
/// variants, and compare their sizes.
#[derive(Parser)]
#[command(name = "mediaslice")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Segment a video and write grayscale, resized, and recompressed variants.
    Video(VideoArgs),
    /// Segment a PCM WAV file and write decimated and 8-bit variants.
    Audio(AudioArgs),
}

#[derive(Args)]
struct VideoArgs {
    /// Input video file.
    input: PathBuf,

    /// Directory for all output artifacts (default: current directory).
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Segment length in seconds (default: 5).
    #[arg(long)]
    duration: Option<f64>,

    /// Downscale factor for the resized variant, in (0, 1] (default: 0.5).
    #[arg(long)]
    scale: Option<f64>,

    /// Codec for the grayscale variant: mpeg4, mjpeg, or ffv1.
    #[arg(long)]
    gray_codec: Option<CodecProfile>,

    /// Codec for the recompressed variant: mpeg4, mjpeg, or ffv1.
    #[arg(long)]
    recompress_codec: Option<CodecProfile>,

    /// Save the first frame of the input as an image.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Encode the variants concurrently.
    #[arg(long)]
    parallel: bool,

    /// JSON settings file; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct AudioArgs {
    /// Input PCM WAV file.
    input: PathBuf,

    /// Directory for all output artifacts (default: current directory).
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Segment length in seconds (default: 5).
    #[arg(long)]
    duration: Option<f64>,

    /// JSON settings file; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Video(args) => {
            let config = video_config(&args, load_settings(args.config.as_deref())?.video);
            run_video(&args.input, &config)
        }
        Command::Audio(args) => {
            let config = audio_config(&args, load_settings(args.config.as_deref())?.audio);
            run_audio(&args.input, &config)
        }
    }
}

fn load_settings(path: Option<&Path>) -> Result<PipelineSettings, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(PipelineSettings::load(path)?),
        None => Ok(PipelineSettings::default()),
    }
}

fn video_config(args: &VideoArgs, mut config: VideoPipelineConfig) -> VideoPipelineConfig {
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(duration) = args.duration {
        config.duration_secs = duration;
    }
    if let Some(scale) = args.scale {
        config.scale = scale;
    }
    if let Some(profile) = args.gray_codec {
        config.grayscale_profile = profile;
    }
    if let Some(profile) = args.recompress_codec {
        config.recompress_profile = profile;
    }
    if let Some(snapshot) = &args.snapshot {
        config.snapshot = Some(snapshot.clone());
    }
    config.parallel |= args.parallel;
    config
}

fn audio_config(args: &AudioArgs, mut config: AudioPipelineConfig) -> AudioPipelineConfig {
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(duration) = args.duration {
        config.duration_secs = duration;
    }
    config
}

fn run_video(input: &Path, config: &VideoPipelineConfig) -> Result<(), Box<dyn std::error::Error>> {
    let executor: Box<dyn VariantExecutor> = if config.parallel {
        Box::new(ThreadedPipelineExecutor::new())
    } else {
        Box::new(SequentialExecutor)
    };

    let mut pipeline = VideoPipeline::new(
        Arc::new(FfmpegBackend),
        Box::new(ImageFileWriter::new()),
        executor,
        Box::new(StdoutPipelineLogger::default()),
    );
    let report = pipeline.run(input, config)?;
    print_video_report(&report);
    Ok(())
}

fn run_audio(input: &Path, config: &AudioPipelineConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut pipeline = AudioPipeline::new(
        Box::new(WavReader),
        Box::new(WavWriter),
        Box::new(StdoutPipelineLogger::default()),
    );
    let report = pipeline.run(input, config)?;
    print_audio_report(&report);
    Ok(())
}

fn print_video_report(report: &VideoRunReport) {
    let props = &report.properties;
    println!("Resolution: {}x{}", props.width, props.height);
    println!("FPS: {:.2}", props.fps);
    println!("Total frames: {}", props.frame_count);
    if let Some(secs) = props.duration_secs() {
        println!("Duration: {secs:.2} s");
    }
    if let Some(path) = &report.snapshot {
        println!("First frame saved to {}", path.display());
    }
    println!(
        "Segment: {} of {} frames",
        report.segment.units_written, report.segment.requested_units
    );
    println!();
    for line in report.sizes.lines(SizeUnit::Megabytes) {
        println!("{line}");
    }
}

fn print_audio_report(report: &AudioRunReport) {
    let props = &report.properties;
    println!("Sampling rate: {} Hz", props.sample_rate);
    println!("Number of samples: {}", props.sample_count);
    println!("Duration: {:.2} s", props.duration_secs());
    println!(
        "Segment: {} of {} samples",
        report.segment.units_written, report.segment.requested_units
    );
    println!();
    for line in report.sizes.lines(SizeUnit::Kilobytes) {
        println!("{line}");
    }
}
