//! Lifecycle supervision and the process-scoped facade
//!
//! Owns the pending configuration, the once-guarded default logger, the
//! signal-triggered flush task, and the exit hook through which every
//! process-terminating path goes. The free emission functions operate on
//! the default logger and require [`init`] to have completed; calling them
//! earlier is a fatal precondition violation.

use parking_lot::RwLock;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use crate::config::{Config, Output};
use crate::core::{Field, Key, Level, LoggerError};
use crate::enrich;
use crate::logger::Logger;

/// Hook invoked for process termination: fatal-level emission, invalid
/// configuration, pre-init emission, and signal-triggered exit. The default
/// calls [`std::process::exit`]. A replacement that wants to observe
/// termination instead of dying must diverge (panic, or park its thread);
/// when the hook returns, the process still exits.
pub type ExitHook = Arc<dyn Fn(i32) + Send + Sync>;

struct State {
    config: Config,
    logger: Option<Logger>,
    active_output: Output,
    signal_flush: Option<SignalFlush>,
    exit_hook: Option<ExitHook>,
}

fn state() -> &'static RwLock<State> {
    static STATE: OnceLock<RwLock<State>> = OnceLock::new();
    STATE.get_or_init(|| {
        RwLock::new(State {
            config: Config::default(),
            logger: None,
            active_output: Output::Pretty,
            signal_flush: None,
            exit_hook: None,
        })
    })
}

/// Initialize the default logger from the pending configuration.
///
/// Guarded: concurrent callers block until the single initializing caller
/// completes; repeated calls have no further effect until [`cleanup`].
pub fn init() {
    let mut st = state().write();
    if st.logger.is_some() {
        return;
    }

    match crate::build::build_logger(&st.config) {
        Ok(logger) => {
            st.logger = Some(logger.clone());
            st.active_output = st.config.output;

            let pid_note = if st.config.is_omitted(Key::Pid) {
                String::new()
            } else {
                format!(", PID: {}", std::process::id())
            };
            let summary = format!(
                "Severity: {}, Output: {}, FileName: {}{}",
                st.config.level, st.config.output, st.config.file_name, pid_note
            );
            logger.debug("INIT_LOGGER", vec![Field::console(summary)]);
        }
        Err(e) => {
            drop(st);
            fail_config(e);
        }
    }
}

/// Replace the pending configuration wholesale, then [`init`].
pub fn init_with(config: Config) {
    state().write().config = config;
    init();
}

/// Drop the default logger, reset every setting to its built-in default,
/// clear the initialization guard, and stop the signal-flush task. Mainly
/// for repeated test runs within one process.
pub fn cleanup() {
    let task = {
        let mut st = state().write();
        st.logger = None;
        st.config = Config::default();
        st.active_output = Output::Pretty;
        st.exit_hook = None;
        st.signal_flush.take()
    };
    if let Some(mut task) = task {
        task.stop();
    }
}

/// Flush buffered structured output.
///
/// Deliberately a no-op when the active mode writes to a console
/// destination: console streams are line buffered and flushing them can
/// itself error. Flush failures are reported on stderr and never propagate.
pub fn sync() {
    let (logger, output) = {
        let st = state().read();
        match st.logger.clone() {
            Some(logger) => (logger, st.active_output),
            None => return,
        }
    };
    if matches!(output, Output::Console | Output::ConsoleAndFile) {
        return;
    }
    if let Err(e) = logger.engine().sync() {
        eprintln!("duolog: flush failed: {}", e);
    }
}

/// Start the background task that flushes the log buffer when the process
/// receives an interrupt or termination signal, then exits with the shell
/// convention code (130 for interrupt, 143 for terminated). Idempotent;
/// [`cleanup`] stops the task.
pub fn sync_when_stop() {
    let mut st = state().write();
    if st.signal_flush.is_some() {
        return;
    }
    match SignalFlush::spawn() {
        Ok(task) => st.signal_flush = Some(task),
        Err(e) => eprintln!("duolog: failed to register signal handler: {}", e),
    }
}

/// Exit code for a signal-induced exit, per shell conventions.
pub fn exit_code_for(signal: i32) -> i32 {
    128 + match signal {
        SIGINT => 2,
        SIGTERM => 15,
        _ => 0,
    }
}

/// Background task subscribing to SIGINT/SIGTERM. On receipt it logs a
/// marker record, flushes, and terminates the process.
pub struct SignalFlush {
    handle: signal_hook::iterator::backend::Handle,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl SignalFlush {
    pub fn spawn() -> std::io::Result<Self> {
        let mut signals = Signals::new([SIGINT, SIGTERM])?;
        let handle = signals.handle();
        let thread = std::thread::Builder::new()
            .name("duolog-signal-flush".to_string())
            .spawn(move || {
                for signal in signals.forever() {
                    let name = match signal {
                        SIGINT => "interrupt",
                        SIGTERM => "terminated",
                        _ => continue,
                    };
                    debug(format!("GOT_SIGNAL_{}", name.to_uppercase()), vec![]);
                    sync();
                    terminate(exit_code_for(signal));
                }
            })?;
        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }

    /// Stop listening and wait briefly for the task to wind down. The task
    /// never returns once a signal arrived; the bounded wait keeps teardown
    /// deterministic either way.
    pub fn stop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let deadline = Instant::now() + Duration::from_secs(1);
            while !thread.is_finished() && Instant::now() < deadline {
                std::thread::sleep(Duration::from_millis(10));
            }
            if thread.is_finished() {
                let _ = thread.join();
            }
        }
    }
}

/// Install a replacement exit hook. See [`ExitHook`].
pub fn set_exit_hook(hook: ExitHook) {
    state().write().exit_hook = Some(hook);
}

pub(crate) fn terminate(code: i32) -> ! {
    let hook = state().read().exit_hook.clone();
    if let Some(hook) = hook {
        hook(code);
    }
    std::process::exit(code)
}

fn fail_config(err: LoggerError) -> ! {
    eprintln!("duolog: {}", err);
    terminate(1)
}

fn default_logger() -> Logger {
    {
        let st = state().read();
        if let Some(logger) = &st.logger {
            return logger.clone();
        }
    }
    eprintln!("duolog: the logger is not initialized. init() must be called.");
    terminate(1)
}

// Configuration setters. Each mutates the pending configuration; after
// init() ran they take effect only after cleanup() and re-initialization.

pub fn set_output(output: Output) {
    state().write().config.output = output;
}

/// Set the output mode by name. Invalid names terminate the process with a
/// diagnostic; parse upfront via `str::parse::<Output>` to handle the error
/// instead.
pub fn set_output_str(output: &str) {
    match output.parse() {
        Ok(output) => set_output(output),
        Err(e) => fail_config(e),
    }
}

pub fn set_level(level: Level) {
    state().write().config.level = level;
}

/// Set the minimum level by name (DEBUG, INFO, WARN, ERROR, FATAL;
/// case-insensitive). Invalid names terminate the process with a
/// diagnostic.
pub fn set_level_str(level: &str) {
    match level.parse() {
        Ok(level) => set_level(level),
        Err(e) => fail_config(e),
    }
}

/// `revision_or_tag` should be a git revision or a tag, e.g. `e86b9a7` or
/// `v1.0.0`.
pub fn set_version(revision_or_tag: &str) {
    state().write().config.version = revision_or_tag.to_string();
}

/// Render the `caller` field as a browsable repository URL. No-op when
/// `revision_or_tag` or `src_root` is empty.
pub fn set_repository_caller_encoder(url_format: &str, revision_or_tag: &str, src_root: &str) {
    if let Some(encoder) =
        crate::core::CallerEncoder::repository(url_format, revision_or_tag, src_root)
    {
        state().write().config.caller_encoder = encoder;
    }
}

/// Add field keys to be displayed on the pretty console line.
pub fn add_console_fields(keys: &[&str]) {
    state()
        .write()
        .config
        .console_fields
        .extend(keys.iter().map(|k| k.to_string()));
}

/// Set the keys excluded from every emitted record.
pub fn set_omit_keys(keys: &[Key]) {
    state().write().config.omit_keys = keys.to_vec();
}

/// Change the console output from stderr to stdout.
pub fn set_stdout() {
    state().write().config.use_stdout = true;
}

pub fn set_separator(separator: &str) {
    state().write().config.separator = separator.to_string();
}

pub fn set_file_name(file_name: &str) {
    state().write().config.file_name = file_name.to_string();
}

/// Maximum size in megabytes of the log file before it gets rotated.
pub fn set_max_size(megabytes: u64) {
    state().write().config.max_size_mb = megabytes;
}

/// Maximum number of days to retain rotated backups.
pub fn set_max_age(days: u32) {
    state().write().config.max_age_days = days;
}

/// Maximum number of rotated backups to retain.
pub fn set_max_backups(count: usize) {
    state().write().config.max_backups = count;
}

/// Name rotated backups with local time instead of UTC.
pub fn set_local_time(local_time: bool) {
    state().write().config.local_time = local_time;
}

/// Gzip rotated backups.
pub fn set_compress(compress: bool) {
    state().write().config.compress = compress;
}

/// The version the enricher would attach: the configured override, else the
/// short revision of the current source checkout, else `"undefined"`.
pub fn get_version() -> String {
    enrich::resolve_version(&state().read().config.version)
}

// Free emission API against the default logger.

#[track_caller]
pub fn debug(message: impl Into<String>, fields: Vec<Field>) {
    default_logger().debug(message, fields);
}

#[track_caller]
pub fn info(message: impl Into<String>, fields: Vec<Field>) {
    default_logger().info(message, fields);
}

#[track_caller]
pub fn warn(message: impl Into<String>, fields: Vec<Field>) {
    default_logger().warn(message, fields);
}

#[track_caller]
pub fn error(message: impl Into<String>, fields: Vec<Field>) {
    default_logger().error(message, fields);
}

/// Emit at fatal severity, then terminate the process after flushing.
#[track_caller]
pub fn fatal(message: impl Into<String>, fields: Vec<Field>) {
    default_logger().fatal(message, fields);
}

#[track_caller]
pub fn debug_err(message: impl Into<String>, err: impl fmt::Display, fields: Vec<Field>) {
    default_logger().debug_err(message, err, fields);
}

#[track_caller]
pub fn info_err(message: impl Into<String>, err: impl fmt::Display, fields: Vec<Field>) {
    default_logger().info_err(message, err, fields);
}

#[track_caller]
pub fn warn_err(message: impl Into<String>, err: impl fmt::Display, fields: Vec<Field>) {
    default_logger().warn_err(message, err, fields);
}

#[track_caller]
pub fn error_err(message: impl Into<String>, err: impl fmt::Display, fields: Vec<Field>) {
    default_logger().error_err(message, err, fields);
}

/// Alias of [`error_err`].
#[track_caller]
pub fn err(message: impl Into<String>, err: impl fmt::Display, fields: Vec<Field>) {
    default_logger().err(message, err, fields);
}

/// Log at error severity and return the error unchanged.
#[track_caller]
pub fn err_ret<E: fmt::Display>(message: impl Into<String>, err: E, fields: Vec<Field>) -> E {
    default_logger().err_ret(message, err, fields)
}

/// Emit at fatal severity with an error field, then terminate the process
/// after flushing.
#[track_caller]
pub fn fatal_err(message: impl Into<String>, err: impl fmt::Display, fields: Vec<Field>) {
    default_logger().fatal_err(message, err, fields);
}

/// Deep pretty-printer for arbitrary values, active only under `Pretty`
/// output.
pub fn dump(value: &dyn fmt::Debug) {
    default_logger().dump(value);
}

/// Derive an owned logger from the default instance with additional
/// persistent fields, e.g. for the scope of an API request.
pub fn new_logger(fields: Vec<Field>) -> Logger {
    default_logger().with_fields(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_follows_shell_convention() {
        assert_eq!(exit_code_for(SIGINT), 130);
        assert_eq!(exit_code_for(SIGTERM), 143);
    }

    #[test]
    fn test_signal_flush_stops_cleanly() {
        let mut task = SignalFlush::spawn().expect("spawn signal task");
        task.stop();
        assert!(task.thread.is_none());
    }
}
