//! Console sink implementation

use std::io::Write;

use crate::core::{Result, Sink};

/// Writes structured records to a standard stream. Defaults to stderr so
/// structured output stays separable from program output; stdout is an
/// explicit opt-in.
pub struct ConsoleSink {
    use_stdout: bool,
}

impl ConsoleSink {
    pub fn stdout() -> Self {
        Self { use_stdout: true }
    }

    pub fn stderr() -> Self {
        Self { use_stdout: false }
    }
}

impl Sink for ConsoleSink {
    fn write(&mut self, buf: &[u8]) -> Result<()> {
        if self.use_stdout {
            std::io::stdout().lock().write_all(buf)?;
        } else {
            std::io::stderr().lock().write_all(buf)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if self.use_stdout {
            std::io::stdout().flush()?;
        } else {
            std::io::stderr().flush()?;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        if self.use_stdout {
            "stdout"
        } else {
            "stderr"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_track_target() {
        assert_eq!(ConsoleSink::stdout().name(), "stdout");
        assert_eq!(ConsoleSink::stderr().name(), "stderr");
    }
}
