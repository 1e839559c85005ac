use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::{EncodeSettings, VideoWriter};

/// An opened reader that is closed when it goes out of scope.
pub struct ScopedReader {
    inner: Box<dyn VideoReader>,
}

impl ScopedReader {
    pub fn open(mut reader: Box<dyn VideoReader>, path: &Path) -> Result<Self, PipelineError> {
        if let Err(e) = reader.open(path) {
            reader.close();
            return Err(e);
        }
        Ok(Self { inner: reader })
    }
}

impl Deref for ScopedReader {
    type Target = dyn VideoReader;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}

impl DerefMut for ScopedReader {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.inner.as_mut()
    }
}

impl Drop for ScopedReader {
    fn drop(&mut self) {
        self.inner.close();
    }
}

/// An opened writer that must be finished explicitly.
///
/// Dropping an unfinished writer still flushes and closes it, so the
/// container trailer is written on error paths too.
pub struct ScopedWriter {
    inner: Box<dyn VideoWriter>,
    path: PathBuf,
    written: usize,
    finished: bool,
}

impl ScopedWriter {
    pub fn open(
        mut writer: Box<dyn VideoWriter>,
        path: &Path,
        settings: &EncodeSettings,
    ) -> Result<Self, PipelineError> {
        writer.open(path, settings)?;
        Ok(Self {
            inner: writer,
            path: path.to_path_buf(),
            written: 0,
            finished: false,
        })
    }

    pub fn write(&mut self, frame: &Frame) -> Result<(), PipelineError> {
        self.inner.write(frame)?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    /// Flushes and closes the writer, returning the number of frames written.
    pub fn finish(mut self) -> Result<usize, PipelineError> {
        self.finished = true;
        self.inner.close()?;
        Ok(self.written)
    }
}

impl Drop for ScopedWriter {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        log::warn!(
            "closing unfinished writer for {} after {} frames",
            self.path.display(),
            self.written
        );
        if let Err(e) = self.inner.close() {
            log::warn!("failed to close {}: {e}", self.path.display());
        }
    }
}
