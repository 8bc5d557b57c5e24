//! Structured record encoding
//!
//! Translates one emission into a single JSON line. The encoder
//! configuration decides which keys appear at all (the omission set clears
//! a key's wire name so the field is dropped entirely, never emitted empty)
//! and how the call site is rendered.

use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::HashMap;

use super::field::Field;
use super::key::Key;
use super::level::Level;

/// Renders a call site's file/line into the `caller` field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CallerEncoder {
    /// `dir/file.rs:42`
    #[default]
    Short,
    /// Rewrites the local source-root prefix to a browsable repository URL
    /// with a `#L<line>` anchor.
    Repository { src_root: String, url: String },
}

impl CallerEncoder {
    /// Build a repository caller encoder. `url_format` carries a `{}`
    /// placeholder for the revision or tag, e.g.
    /// `https://github.com/acme/app/blob/{}`. Returns `None` when
    /// `revision_or_tag` or `src_root` is empty.
    pub fn repository(url_format: &str, revision_or_tag: &str, src_root: &str) -> Option<Self> {
        if revision_or_tag.is_empty() || src_root.is_empty() {
            return None;
        }
        Some(CallerEncoder::Repository {
            src_root: src_root.to_string(),
            url: url_format.replacen("{}", revision_or_tag, 1),
        })
    }

    pub fn encode(&self, file: &str, line: u32) -> String {
        match self {
            CallerEncoder::Short => format!("{}:{}", short_path(file), line),
            CallerEncoder::Repository { src_root, url } => {
                format!("{}#L{}", file.replacen(src_root.as_str(), url, 1), line)
            }
        }
    }
}

/// Trim a source path to its last directory and file name.
fn short_path(file: &str) -> &str {
    let mut slashes = file.rmatch_indices(['/', '\\']).map(|(i, _)| i);
    slashes.next();
    match slashes.next() {
        Some(idx) => &file[idx + 1..],
        None => file,
    }
}

/// One emission, as handed to the encoder. Ephemeral: lives only for the
/// duration of a single write.
#[derive(Debug)]
pub struct Record<'a> {
    pub level: Level,
    pub message: &'a str,
    pub time: DateTime<Utc>,
    pub name: Option<&'a str>,
    pub file: &'a str,
    pub line: u32,
    pub function: Option<&'a str>,
    pub stacktrace: Option<String>,
    pub fields: &'a [Field],
}

/// Which keys a record carries and how level/time/caller render.
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    names: HashMap<Key, &'static str>,
    caller: CallerEncoder,
}

impl EncoderConfig {
    /// Build a configuration carrying every key except those in `omit`.
    pub fn new(omit: &[Key], caller: CallerEncoder) -> Self {
        let mut names = HashMap::new();
        for key in Key::ALL {
            if !omit.contains(&key) {
                names.insert(key, key.as_str());
            }
        }
        Self { names, caller }
    }

    pub fn includes(&self, key: Key) -> bool {
        self.names.contains_key(&key)
    }

    fn name_of(&self, key: Key) -> Option<&'static str> {
        self.names.get(&key).copied()
    }

    /// Encode one record plus the engine's base fields as a single JSON
    /// object, without trailing newline.
    pub fn encode(&self, record: &Record<'_>, base_fields: &[Field]) -> String {
        let mut obj = serde_json::Map::new();

        if let Some(name) = self.name_of(Key::Message) {
            obj.insert(name.to_string(), record.message.into());
        }
        if let Some(name) = self.name_of(Key::Level) {
            obj.insert(name.to_string(), record.level.severity_label().into());
        }
        if let Some(name) = self.name_of(Key::Time) {
            obj.insert(
                name.to_string(),
                record
                    .time
                    .to_rfc3339_opts(SecondsFormat::Nanos, true)
                    .into(),
            );
        }
        if let Some(name) = self.name_of(Key::Name) {
            if let Some(logger_name) = record.name {
                obj.insert(name.to_string(), logger_name.into());
            }
        }
        if let Some(name) = self.name_of(Key::Caller) {
            obj.insert(
                name.to_string(),
                self.caller.encode(record.file, record.line).into(),
            );
        }
        if let Some(name) = self.name_of(Key::Function) {
            if let Some(function) = record.function {
                obj.insert(name.to_string(), function.into());
            }
        }
        if let Some(name) = self.name_of(Key::Stacktrace) {
            if let Some(ref trace) = record.stacktrace {
                obj.insert(name.to_string(), trace.as_str().into());
            }
        }

        for field in record.fields.iter().chain(base_fields) {
            obj.insert(field.key.clone(), field.value.to_json_value());
        }

        serde_json::to_string(&serde_json::Value::Object(obj)).unwrap_or_default()
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self::new(&[], CallerEncoder::Short)
    }
}
