//! Structured-encoding engine
//!
//! The engine owns the encoder configuration, the ordered sink list, and the
//! metadata fields computed once at construction. It is safe for concurrent
//! use: emissions from any number of threads serialize on the sink lock, and
//! the facade adds no further synchronization.

use parking_lot::Mutex;

use super::encoder::{EncoderConfig, Record};
use super::error::Result;
use super::field::Field;
use super::key::Key;
use super::level::Level;
use super::sink::Sink;

pub struct Engine {
    encoder: EncoderConfig,
    sinks: Mutex<Vec<Box<dyn Sink>>>,
    min_level: Level,
    base_fields: Vec<Field>,
}

impl Engine {
    pub fn new(
        encoder: EncoderConfig,
        sinks: Vec<Box<dyn Sink>>,
        min_level: Level,
        base_fields: Vec<Field>,
    ) -> Self {
        Self {
            encoder,
            sinks: Mutex::new(sinks),
            min_level,
            base_fields,
        }
    }

    pub fn enabled(&self, level: Level) -> bool {
        level >= self.min_level
    }

    pub fn min_level(&self) -> Level {
        self.min_level
    }

    pub fn includes(&self, key: Key) -> bool {
        self.encoder.includes(key)
    }

    /// Encode the record and write one line to every sink, in order. A sink
    /// failure is reported on stderr and the remaining sinks still receive
    /// the record; emission never fails the caller.
    pub fn write(&self, record: &Record<'_>) {
        if !self.enabled(record.level) {
            return;
        }

        let mut line = self.encoder.encode(record, &self.base_fields);
        line.push('\n');

        let mut sinks = self.sinks.lock();
        for sink in sinks.iter_mut() {
            if let Err(e) = sink.write(line.as_bytes()) {
                eprintln!("duolog: write to {} sink failed: {}", sink.name(), e);
            }
        }
    }

    /// Flush every sink, failing on the first error.
    pub fn sync(&self) -> Result<()> {
        let mut sinks = self.sinks.lock();
        for sink in sinks.iter_mut() {
            sink.flush()?;
        }
        Ok(())
    }

    /// Names of the configured sinks, in write order.
    pub fn sink_names(&self) -> Vec<&'static str> {
        self.sinks.lock().iter().map(|s| s.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::encoder::CallerEncoder;
    use crate::sinks::BufferSink;
    use chrono::Utc;

    fn record<'a>(level: Level, fields: &'a [Field]) -> Record<'a> {
        Record {
            level,
            message: "PING",
            time: Utc::now(),
            name: None,
            file: "src/lib.rs",
            line: 1,
            function: None,
            stacktrace: None,
            fields,
        }
    }

    fn engine_with(min_level: Level) -> (Engine, BufferSink) {
        let buffer = BufferSink::new();
        let engine = Engine::new(
            EncoderConfig::new(&[], CallerEncoder::Short),
            vec![Box::new(buffer.clone())],
            min_level,
            vec![Field::string("version", "test")],
        );
        (engine, buffer)
    }

    #[test]
    fn test_write_reaches_sink() {
        let (engine, buffer) = engine_with(Level::Debug);
        engine.write(&record(Level::Info, &[]));

        let lines = buffer.lines();
        assert_eq!(lines.len(), 1);
        let parsed: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(parsed["message"], "PING");
        assert_eq!(parsed["version"], "test");
    }

    #[test]
    fn test_level_filter_suppresses_record() {
        let (engine, buffer) = engine_with(Level::Warn);
        engine.write(&record(Level::Info, &[]));
        assert!(buffer.lines().is_empty());

        engine.write(&record(Level::Error, &[]));
        assert_eq!(buffer.lines().len(), 1);
    }

    #[test]
    fn test_ordered_multi_sink_write() {
        let first = BufferSink::new();
        let second = BufferSink::new();
        let engine = Engine::new(
            EncoderConfig::default(),
            vec![Box::new(first.clone()), Box::new(second.clone())],
            Level::Debug,
            Vec::new(),
        );

        engine.write(&record(Level::Info, &[]));
        assert_eq!(first.lines().len(), 1);
        assert_eq!(second.lines().len(), 1);
        assert_eq!(engine.sink_names(), vec!["buffer", "buffer"]);
    }

    #[test]
    fn test_sync_flushes_sinks() {
        let (engine, buffer) = engine_with(Level::Debug);
        engine.sync().unwrap();
        assert_eq!(buffer.flush_count(), 1);
    }
}
