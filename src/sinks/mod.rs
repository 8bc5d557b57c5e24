//! Sink implementations

pub mod console;
pub mod rotating_file;

pub use console::ConsoleSink;
pub use rotating_file::RotatingFileSink;

pub use crate::core::Sink;

use crate::core::Result;
use parking_lot::Mutex;
use std::sync::Arc;

/// In-memory sink that collects everything written to it. Used by the test
/// suites to observe encoded output without touching the filesystem.
#[derive(Clone, Default)]
pub struct BufferSink {
    buf: Arc<Mutex<Vec<u8>>>,
    flushes: Arc<Mutex<usize>>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    pub fn flush_count(&self) -> usize {
        *self.flushes.lock()
    }
}

impl Sink for BufferSink {
    fn write(&mut self, buf: &[u8]) -> Result<()> {
        self.buf.lock().extend_from_slice(buf);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        *self.flushes.lock() += 1;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "buffer"
    }
}
