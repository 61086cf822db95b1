use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::encode::export::{ExportFormat, write_frame};
use crate::foundation::error::FiberResult;
use crate::render::backend::FrameRGBA;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Number of frames that will be pushed.
    pub frame_count: u32,
}

/// Sink contract for consuming rendered frames in tick order.
///
/// `push_frame` is called with strictly increasing `index`, starting at 0.
pub trait FrameSink: Send {
    fn begin(&mut self, cfg: SinkConfig) -> FiberResult<()>;
    /// Push one frame rendered at animation `time`.
    fn push_frame(&mut self, index: u32, time: f64, frame: &FrameRGBA) -> FiberResult<()>;
    fn end(&mut self) -> FiberResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(f64, FrameRGBA)>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Captured `(time, frame)` pairs in push order.
    pub fn frames(&self) -> &[(f64, FrameRGBA)] {
        &self.frames
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> FiberResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        Ok(())
    }

    fn push_frame(&mut self, _index: u32, time: f64, frame: &FrameRGBA) -> FiberResult<()> {
        self.frames.push((time, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> FiberResult<()> {
        Ok(())
    }
}

/// Writes `frame_00000.png`, `frame_00001.png`, ... into a directory.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl PngSequenceSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths written so far, in frame order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn frame_path(&self, index: u32) -> PathBuf {
        self.dir.join(format!("frame_{index:05}.png"))
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> FiberResult<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create frame directory '{}'", self.dir.display()))?;
        self.written.clear();
        tracing::debug!(
            dir = %self.dir.display(),
            frames = cfg.frame_count,
            width = cfg.width,
            height = cfg.height,
            "writing png sequence"
        );
        Ok(())
    }

    fn push_frame(&mut self, index: u32, _time: f64, frame: &FrameRGBA) -> FiberResult<()> {
        let path = self.frame_path(index);
        write_frame(frame, &ExportFormat::Png, &path)?;
        self.written.push(path);
        Ok(())
    }

    fn end(&mut self) -> FiberResult<()> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
