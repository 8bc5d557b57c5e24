//! Core record model, encoder, and engine

pub mod encoder;
pub mod engine;
pub mod error;
pub mod field;
pub mod key;
pub mod level;
pub mod sink;

pub use encoder::{CallerEncoder, EncoderConfig, Record};
pub use engine::Engine;
pub use error::{LoggerError, Result};
pub use field::{Field, FieldValue, CONSOLE_FIELD};
pub use key::Key;
pub use level::Level;
pub use sink::Sink;
