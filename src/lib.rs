//! # duolog
//!
//! A logging facade producing two synchronized views of one event stream:
//! a machine-parseable JSON record per emission plus, in `Pretty` mode, a
//! condensed colorized console line for interactive use.
//!
//! ## Features
//!
//! - **Dual output**: structured records for files and aggregation, pretty
//!   lines for the console, from the same call
//! - **Enrichment**: version, hostname, and pid attached once at
//!   initialization
//! - **Routing**: four output modes deciding which sinks each record
//!   reaches, with a rotating file sink
//! - **Error idioms**: an error-carrying emission family including
//!   log-and-propagate (`err_ret`)
//! - **Lifecycle**: exactly-once initialization, flush on interrupt and
//!   termination signals, teardown for test isolation
//!
//! ## Example
//!
//! ```no_run
//! use duolog::Field;
//!
//! duolog::set_level_str("DEBUG");
//! duolog::set_file_name("log/app.jsonl");
//! duolog::init();
//! duolog::sync_when_stop();
//!
//! duolog::info(
//!     "USER_CREATED",
//!     vec![
//!         Field::string("user_name", "Alice"),
//!         Field::int("user_age", 20),
//!     ],
//! );
//! duolog::sync();
//! ```

pub mod config;
pub mod core;
pub mod lifecycle;
pub mod logger;
pub mod macros;
pub mod pretty;
pub mod sinks;

mod build;
mod enrich;

pub use crate::core::{
    CallerEncoder, EncoderConfig, Engine, Field, FieldValue, Key, Level, LoggerError, Record,
    Result, Sink, CONSOLE_FIELD,
};
pub use config::{Config, Output};
pub use lifecycle::{
    add_console_fields, cleanup, debug, debug_err, dump, err, err_ret, error, error_err,
    exit_code_for, fatal, fatal_err, get_version, info, info_err, init, init_with, new_logger,
    set_compress, set_exit_hook, set_file_name, set_level, set_level_str, set_local_time,
    set_max_age, set_max_backups, set_max_size, set_omit_keys, set_output, set_output_str,
    set_repository_caller_encoder, set_separator, set_stdout, set_version, sync, sync_when_stop,
    warn, warn_err, ExitHook, SignalFlush,
};
pub use logger::Logger;

pub mod prelude {
    pub use crate::config::{Config, Output};
    pub use crate::core::{Field, FieldValue, Key, Level, LoggerError, Result};
    pub use crate::logger::Logger;
}
