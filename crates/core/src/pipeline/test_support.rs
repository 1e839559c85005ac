//! In-memory video backend for pipeline tests.
//!
//! Writers keep the frames they receive, keyed by output path, and also put
//! the raw pixel bytes on disk so size reports see real files. Readers opened
//! on a path that a stub writer produced replay those frames; any other path
//! replays the configured source frames.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;
use crate::shared::stream_properties::VideoProperties;
use crate::video::domain::image_writer::ImageWriter;
use crate::video::domain::video_backend::VideoBackend;
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::{EncodeSettings, VideoWriter};

type FileStore = Arc<Mutex<HashMap<PathBuf, Vec<Frame>>>>;

/// RGB frame whose pixels vary with position and index.
pub fn gradient_frame(width: u32, height: u32, index: usize) -> Frame {
    let mut data = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            data.push(((x * 37 + index as u32 * 11) % 256) as u8);
            data.push(((y * 53 + index as u32 * 7) % 256) as u8);
            data.push(((x * y + index as u32) % 256) as u8);
        }
    }
    Frame::new(data, width, height, 3, index)
}

pub fn gradient_frames(width: u32, height: u32, count: usize) -> Vec<Frame> {
    (0..count).map(|i| gradient_frame(width, height, i)).collect()
}

pub struct StubReader {
    source: Vec<Frame>,
    fps: f64,
    files: FileStore,
    fail_open: bool,
    current: Option<Vec<Frame>>,
    closed: Arc<Mutex<bool>>,
    live: Arc<Mutex<isize>>,
}

impl StubReader {
    pub fn new(source: Vec<Frame>, fps: f64) -> Self {
        Self {
            source,
            fps,
            files: FileStore::default(),
            fail_open: false,
            current: None,
            closed: Arc::new(Mutex::new(false)),
            live: Arc::new(Mutex::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_open: true,
            ..Self::new(Vec::new(), 0.0)
        }
    }

    pub fn closed_flag(&self) -> Arc<Mutex<bool>> {
        self.closed.clone()
    }
}

fn not_opened() -> PipelineError {
    PipelineError::InvalidConfig("StubReader: not opened".to_string())
}

impl VideoReader for StubReader {
    fn open(&mut self, path: &Path) -> Result<(), PipelineError> {
        if self.fail_open {
            return Err(PipelineError::source_unavailable(path, "stub refuses to open"));
        }
        let frames = self
            .files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_else(|| self.source.clone());
        self.current = Some(frames);
        *self.live.lock().unwrap() += 1;
        *self.closed.lock().unwrap() = false;
        Ok(())
    }

    fn properties(&self) -> Result<VideoProperties, PipelineError> {
        let frames = self.current.as_ref().ok_or_else(not_opened)?;
        let (width, height) = frames
            .first()
            .map(|f| (f.width(), f.height()))
            .unwrap_or((0, 0));
        Ok(VideoProperties {
            width,
            height,
            fps: self.fps,
            frame_count: frames.len(),
        })
    }

    fn frames(&mut self) -> Box<dyn Iterator<Item = Result<Frame, PipelineError>> + '_> {
        match self.current.clone() {
            Some(frames) => Box::new(frames.into_iter().map(Ok)),
            None => Box::new(std::iter::once(Err(not_opened()))),
        }
    }

    fn close(&mut self) {
        if self.current.take().is_some() {
            *self.live.lock().unwrap() -= 1;
        }
        *self.closed.lock().unwrap() = true;
    }
}

pub struct StubWriter {
    files: FileStore,
    fail_at: Option<PathBuf>,
    path: Option<PathBuf>,
    pending: Vec<Frame>,
    closes: Arc<Mutex<usize>>,
    opened: Arc<Mutex<Vec<(PathBuf, EncodeSettings)>>>,
}

impl StubWriter {
    pub fn new() -> Self {
        Self {
            files: FileStore::default(),
            fail_at: None,
            path: None,
            pending: Vec::new(),
            closes: Arc::new(Mutex::new(0)),
            opened: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn close_count(&self) -> Arc<Mutex<usize>> {
        self.closes.clone()
    }
}

impl VideoWriter for StubWriter {
    fn open(&mut self, path: &Path, settings: &EncodeSettings) -> Result<(), PipelineError> {
        if self.fail_at.as_deref() == Some(path) {
            return Err(PipelineError::encode_init(path, "stub refuses to open"));
        }
        std::fs::File::create(path).map_err(|e| PipelineError::encode_init(path, e))?;
        self.opened
            .lock()
            .unwrap()
            .push((path.to_path_buf(), *settings));
        self.path = Some(path.to_path_buf());
        self.pending.clear();
        Ok(())
    }

    fn write(&mut self, frame: &Frame) -> Result<(), PipelineError> {
        if self.path.is_none() {
            return Err(PipelineError::InvalidConfig(
                "StubWriter: not opened".to_string(),
            ));
        }
        self.pending.push(frame.clone());
        Ok(())
    }

    fn close(&mut self) -> Result<(), PipelineError> {
        let Some(path) = self.path.take() else {
            return Ok(());
        };
        let bytes: Vec<u8> = self
            .pending
            .iter()
            .flat_map(|f| f.data().iter().copied())
            .collect();
        std::fs::write(&path, bytes)?;
        self.files
            .lock()
            .unwrap()
            .insert(path, std::mem::take(&mut self.pending));
        *self.closes.lock().unwrap() += 1;
        Ok(())
    }
}

/// Backend whose readers and writers share one in-memory file store.
pub struct StubBackend {
    source: Vec<Frame>,
    fps: f64,
    files: FileStore,
    live_readers: Arc<Mutex<isize>>,
    opened: Arc<Mutex<Vec<(PathBuf, EncodeSettings)>>>,
    fail_writer_at: Option<PathBuf>,
}

impl StubBackend {
    pub fn new(source: Vec<Frame>, fps: f64) -> Self {
        Self {
            source,
            fps,
            files: FileStore::default(),
            live_readers: Arc::new(Mutex::new(0)),
            opened: Arc::new(Mutex::new(Vec::new())),
            fail_writer_at: None,
        }
    }

    pub fn with_failing_writer(mut self, path: &Path) -> Self {
        self.fail_writer_at = Some(path.to_path_buf());
        self
    }

    /// Readers opened and not yet closed.
    pub fn open_readers(&self) -> isize {
        *self.live_readers.lock().unwrap()
    }

    pub fn frames_at(&self, path: &Path) -> Option<Vec<Frame>> {
        self.files.lock().unwrap().get(path).cloned()
    }

    pub fn settings_for(&self, path: &Path) -> Option<EncodeSettings> {
        self.opened
            .lock()
            .unwrap()
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, s)| *s)
    }
}

impl VideoBackend for StubBackend {
    fn reader(&self) -> Box<dyn VideoReader> {
        Box::new(StubReader {
            files: self.files.clone(),
            live: self.live_readers.clone(),
            ..StubReader::new(self.source.clone(), self.fps)
        })
    }

    fn writer(&self) -> Box<dyn VideoWriter> {
        Box::new(StubWriter {
            files: self.files.clone(),
            fail_at: self.fail_writer_at.clone(),
            opened: self.opened.clone(),
            ..StubWriter::new()
        })
    }
}

/// Records every image it is asked to write.
#[derive(Default)]
pub struct StubImageWriter {
    pub written: Arc<Mutex<Vec<(PathBuf, Frame)>>>,
}

impl ImageWriter for StubImageWriter {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), PipelineError> {
        self.written
            .lock()
            .unwrap()
            .push((path.to_path_buf(), frame.clone()));
        Ok(())
    }
}
