//! Sink trait for encoded-byte destinations

use super::error::Result;

/// A destination accepting encoded record bytes. Implementations are driven
/// behind the engine's lock and need no internal synchronization.
pub trait Sink: Send {
    fn write(&mut self, buf: &[u8]) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &'static str;
}
