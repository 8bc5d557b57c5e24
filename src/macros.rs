//! Formatting macros for emission through a [`Logger`](crate::Logger)
//!
//! Besides `println!`-style formatting, the macros capture the call site's
//! module path into the structured `function` field, which the plain
//! function API cannot do.
//!
//! ```no_run
//! use duolog::{info, init, new_logger};
//!
//! init();
//! let logger = new_logger(vec![]);
//! let port = 8080;
//! info!(logger, "LISTENING_ON_{}", port);
//! ```

/// Emit a formatted message at the given level.
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log_at($level, format!($($arg)+), module_path!())
    };
}

/// Emit a formatted debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Debug, $($arg)+)
    };
}

/// Emit a formatted info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Info, $($arg)+)
    };
}

/// Emit a formatted warn-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Warn, $($arg)+)
    };
}

/// Emit a formatted error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Error, $($arg)+)
    };
}

/// Emit a formatted fatal-level message and terminate the process.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Fatal, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::build::build_logger;
    use crate::config::{Config, Output};
    use crate::core::Level;
    use tempfile::TempDir;

    #[test]
    fn test_macros_format_and_record_function() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("app.log");
        let config = Config::new()
            .with_output(Output::File)
            .with_level(Level::Debug)
            .with_version("test")
            .with_file_name(path.to_str().unwrap());
        let logger = build_logger(&config).unwrap();

        debug!(logger, "COUNT_{}", 1);
        info!(logger, "COUNT_{}", 2);
        warn!(logger, "COUNT_{}", 3);
        error!(logger, "COUNT_{}", 4);
        logger.engine().sync().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 4);

        let record: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(record["message"], "COUNT_2");
        assert_eq!(record["function"], module_path!());
    }
}
