//! Logger facade
//!
//! Every emission is written twice when a pretty renderer is attached: the
//! condensed console line first, then the structured record to the engine's
//! sinks. Instances are cheap to clone; they share the engine handle.

use chrono::Utc;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use crate::core::{Engine, Field, FieldValue, Key, Level, Record};
use crate::pretty::PrettyLogger;

/// A handle to the logging engine plus per-instance persistent fields and an
/// optional hierarchical name.
///
/// Use [`new_logger`](crate::new_logger) to derive an instance with common
/// fields, e.g. for the scope of an API request:
///
/// ```no_run
/// use duolog::{Field, init};
///
/// init();
/// let logger = duolog::new_logger(vec![Field::string("request_id", "abc-123")])
///     .named("api");
/// logger.info("REQUEST_RECEIVED", vec![]);
/// ```
#[derive(Clone)]
pub struct Logger {
    engine: Arc<Engine>,
    pretty: Option<Arc<PrettyLogger>>,
    name: Option<String>,
    fields: Vec<Field>,
}

impl Logger {
    pub(crate) fn new(engine: Arc<Engine>, pretty: Option<Arc<PrettyLogger>>) -> Self {
        Self {
            engine,
            pretty,
            name: None,
            fields: Vec::new(),
        }
    }

    /// Attach a hierarchical name, used as the structured `name` field and
    /// as a console-line prefix. Repeated naming joins segments with a dot;
    /// persistent fields are untouched.
    #[must_use]
    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(match self.name {
            Some(existing) => format!("{}.{}", existing, name),
            None => name.to_string(),
        });
        self
    }

    /// Append persistent fields, attached to every subsequent emission from
    /// this instance.
    #[must_use]
    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    #[track_caller]
    pub fn debug(&self, message: impl Into<String>, fields: Vec<Field>) {
        self.emit(Level::Debug, message.into(), fields, None, None);
    }

    #[track_caller]
    pub fn info(&self, message: impl Into<String>, fields: Vec<Field>) {
        self.emit(Level::Info, message.into(), fields, None, None);
    }

    #[track_caller]
    pub fn warn(&self, message: impl Into<String>, fields: Vec<Field>) {
        self.emit(Level::Warn, message.into(), fields, None, None);
    }

    #[track_caller]
    pub fn error(&self, message: impl Into<String>, fields: Vec<Field>) {
        self.emit(Level::Error, message.into(), fields, None, None);
    }

    /// Emit at fatal severity, then terminate the process after flushing.
    #[track_caller]
    pub fn fatal(&self, message: impl Into<String>, fields: Vec<Field>) {
        self.emit(Level::Fatal, message.into(), fields, None, None);
    }

    #[track_caller]
    pub fn debug_err(&self, message: impl Into<String>, err: impl fmt::Display, fields: Vec<Field>) {
        self.emit(Level::Debug, message.into(), fields, Some(err.to_string()), None);
    }

    #[track_caller]
    pub fn info_err(&self, message: impl Into<String>, err: impl fmt::Display, fields: Vec<Field>) {
        self.emit(Level::Info, message.into(), fields, Some(err.to_string()), None);
    }

    #[track_caller]
    pub fn warn_err(&self, message: impl Into<String>, err: impl fmt::Display, fields: Vec<Field>) {
        self.emit(Level::Warn, message.into(), fields, Some(err.to_string()), None);
    }

    #[track_caller]
    pub fn error_err(&self, message: impl Into<String>, err: impl fmt::Display, fields: Vec<Field>) {
        self.emit(Level::Error, message.into(), fields, Some(err.to_string()), None);
    }

    /// Alias of [`Logger::error_err`].
    #[track_caller]
    pub fn err(&self, message: impl Into<String>, err: impl fmt::Display, fields: Vec<Field>) {
        self.emit(Level::Error, message.into(), fields, Some(err.to_string()), None);
    }

    /// Log at error severity and return the error unchanged, for the
    /// log-and-propagate idiom:
    ///
    /// ```no_run
    /// # use duolog::{init, new_logger};
    /// # fn fetch() -> Result<(), std::io::Error> { Ok(()) }
    /// # init();
    /// # let logger = new_logger(vec![]);
    /// fn load(logger: &duolog::Logger) -> Result<(), std::io::Error> {
    ///     fetch().map_err(|e| logger.err_ret("FETCH_FAILED", e, vec![]))
    /// }
    /// ```
    #[track_caller]
    pub fn err_ret<E: fmt::Display>(
        &self,
        message: impl Into<String>,
        err: E,
        fields: Vec<Field>,
    ) -> E {
        self.emit(Level::Error, message.into(), fields, Some(err.to_string()), None);
        err
    }

    /// Emit at fatal severity with an error field, then terminate the
    /// process after flushing.
    #[track_caller]
    pub fn fatal_err(&self, message: impl Into<String>, err: impl fmt::Display, fields: Vec<Field>) {
        self.emit(Level::Fatal, message.into(), fields, Some(err.to_string()), None);
    }

    /// Deep pretty-printer for arbitrary values. Active only when the
    /// console renderer is configured (`Pretty` output); a no-op otherwise.
    pub fn dump(&self, value: &dyn fmt::Debug) {
        if let Some(ref pretty) = self.pretty {
            pretty.dump(value);
        }
    }

    /// Entry point for the formatting macros; records `function` from the
    /// call site's module path.
    #[track_caller]
    pub fn log_at(&self, level: Level, message: impl Into<String>, function: &'static str) {
        self.emit(level, message.into(), Vec::new(), None, Some(function));
    }

    pub(crate) fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    /// Whether the console companion renderer is active for this instance.
    pub fn has_pretty(&self) -> bool {
        self.pretty.is_some()
    }

    #[track_caller]
    fn emit(
        &self,
        level: Level,
        message: String,
        mut fields: Vec<Field>,
        err: Option<String>,
        function: Option<&'static str>,
    ) {
        if !self.engine.enabled(level) {
            return;
        }
        let location = Location::caller();

        if let Some(ref e) = err {
            fields.push(Field::new("error", FieldValue::Error(e.clone())));
        }
        fields.extend(self.fields.iter().cloned());

        if let Some(ref pretty) = self.pretty {
            match err {
                Some(ref e) => {
                    pretty.log_with_error(self.name.as_deref(), &message, level, e, &fields)
                }
                None => pretty.log(self.name.as_deref(), &message, level, &fields),
            }
        }

        let stacktrace = if level >= Level::Error && self.engine.includes(Key::Stacktrace) {
            Some(std::backtrace::Backtrace::force_capture().to_string())
        } else {
            None
        };

        self.engine.write(&Record {
            level,
            message: &message,
            time: Utc::now(),
            name: self.name.as_deref(),
            file: location.file(),
            line: location.line(),
            function,
            stacktrace,
            fields: &fields,
        });

        if level == Level::Fatal {
            if let Err(e) = self.engine.sync() {
                eprintln!("duolog: {}", e);
            }
            crate::lifecycle::terminate(1);
        }
    }
}
