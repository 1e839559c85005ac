use std::path::{Path, PathBuf};

use crate::audio::domain::audio_reader::AudioReader;
use crate::pipeline::scoped::ScopedReader;
use crate::shared::error::PipelineError;
use crate::shared::stream_properties::{AudioProperties, VideoProperties};
use crate::video::domain::video_backend::VideoBackend;

/// Checks that `path` names a non-empty regular file.
///
/// Returns its size in bytes.
pub fn ensure_readable(path: &Path) -> Result<u64, PipelineError> {
    let meta = std::fs::metadata(path).map_err(|e| PipelineError::source_unavailable(path, e))?;
    if !meta.is_file() {
        return Err(PipelineError::source_unavailable(path, "not a regular file"));
    }
    if meta.len() == 0 {
        return Err(PipelineError::source_unavailable(path, "file is empty"));
    }
    Ok(meta.len())
}

/// Rejects any output path that resolves to the source file itself.
///
/// Outputs need not exist yet; their parent directory must.
pub fn ensure_not_source(input: &Path, outputs: &[PathBuf]) -> Result<(), PipelineError> {
    let source = input
        .canonicalize()
        .map_err(|e| PipelineError::source_unavailable(input, e))?;
    for output in outputs {
        if resolve(output).as_deref() == Some(source.as_path()) {
            return Err(PipelineError::InvalidConfig(format!(
                "{} would overwrite the source",
                output.display()
            )));
        }
    }
    Ok(())
}

fn resolve(path: &Path) -> Option<PathBuf> {
    if let Ok(resolved) = path.canonicalize() {
        return Some(resolved);
    }
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Some(parent.canonicalize().ok()?.join(path.file_name()?))
}

/// Opens a video source with a fresh reader from `backend`.
pub fn open_video(backend: &dyn VideoBackend, path: &Path) -> Result<ScopedReader, PipelineError> {
    ensure_readable(path)?;
    ScopedReader::open(backend.reader(), path)
}

/// Reads the stream properties of a video source and releases the handle.
pub fn inspect_video(
    backend: &dyn VideoBackend,
    path: &Path,
) -> Result<VideoProperties, PipelineError> {
    let reader = open_video(backend, path)?;
    let props = reader.properties()?;
    log::debug!(
        "inspected {}: {}x{} @ {:.2} fps, {} frames",
        path.display(),
        props.width,
        props.height,
        props.fps,
        props.frame_count
    );
    Ok(props)
}

/// Reads the header of an audio source.
pub fn inspect_audio(reader: &dyn AudioReader, path: &Path) -> Result<AudioProperties, PipelineError> {
    ensure_readable(path)?;
    let props = reader.inspect(path)?;
    log::debug!(
        "inspected {}: {} Hz, {} ch, {}-bit, {} frames",
        path.display(),
        props.sample_rate,
        props.channels,
        props.bit_depth,
        props.sample_count
    );
    Ok(props)
}
