//! Process-wide logging configuration
//!
//! `Config` is an explicit value: build one, hand it to
//! [`init_with`](crate::init_with), or mutate the pending process-scoped
//! copy through the free setter functions before [`init`](crate::init).
//! Mutations after initialization have no effect until
//! [`cleanup`](crate::cleanup) and re-initialization.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::{CallerEncoder, Key, Level, LoggerError, CONSOLE_FIELD};

/// Output routing mode. Exactly one mode is active per initialized engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Output {
    /// Colored condensed log to console, JSON structured log to file.
    /// The default; recommended for development.
    #[default]
    Pretty,

    /// JSON structured log to both console and file.
    ConsoleAndFile,

    /// JSON structured log to console only.
    Console,

    /// JSON structured log to file only.
    File,
}

impl Output {
    pub fn as_str(&self) -> &'static str {
        match self {
            Output::Pretty => "Pretty",
            Output::ConsoleAndFile => "ConsoleAndFile",
            Output::Console => "Console",
            Output::File => "File",
        }
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Output {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "Pretty" => Ok(Output::Pretty),
            "ConsoleAndFile" => Ok(Output::ConsoleAndFile),
            "Console" => Ok(Output::Console),
            "File" => Ok(Output::File),
            _ => Err(LoggerError::config(
                "output",
                format!(
                    "{} is invalid type. can use (Pretty, ConsoleAndFile, Console, File)",
                    s
                ),
            )),
        }
    }
}

/// All knobs of the logging facade, with built-in defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub output: Output,
    pub level: Level,
    pub omit_keys: Vec<Key>,
    /// Field keys the pretty renderer displays on the console line.
    pub console_fields: Vec<String>,
    /// Version override; empty resolves via the current source checkout.
    pub version: String,
    pub caller_encoder: CallerEncoder,
    /// Route console output to stdout instead of stderr.
    pub use_stdout: bool,
    /// Separator between message and console fields on the pretty line.
    pub separator: String,
    /// Target file for file-backed modes; empty resolves to a default in
    /// the system temporary directory.
    pub file_name: String,
    /// Maximum log file size in megabytes before rotation; 0 for default.
    pub max_size_mb: u64,
    /// Maximum age of rotated backups in days; 0 disables age pruning.
    pub max_age_days: u32,
    /// Maximum number of rotated backups to retain; 0 disables the bound.
    pub max_backups: usize,
    /// Name rotated backups with local time instead of UTC.
    pub local_time: bool,
    /// Gzip rotated backups.
    pub compress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: Output::Pretty,
            level: Level::Info,
            omit_keys: Vec::new(),
            console_fields: vec![CONSOLE_FIELD.to_string()],
            version: String::new(),
            caller_encoder: CallerEncoder::Short,
            use_stdout: false,
            separator: " : ".to_string(),
            file_name: String::new(),
            max_size_mb: 0,
            max_age_days: 0,
            max_backups: 0,
            local_time: false,
            compress: false,
        }
    }
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_output(mut self, output: Output) -> Self {
        self.output = output;
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn with_omit_keys(mut self, keys: &[Key]) -> Self {
        self.omit_keys = keys.to_vec();
        self
    }

    /// Add field keys to be displayed on the pretty console line.
    #[must_use]
    pub fn with_console_fields(mut self, keys: &[&str]) -> Self {
        self.console_fields
            .extend(keys.iter().map(|k| k.to_string()));
        self
    }

    /// `revision_or_tag` should be a git revision or a tag,
    /// e.g. `e86b9a7` or `v1.0.0`.
    #[must_use]
    pub fn with_version(mut self, revision_or_tag: &str) -> Self {
        self.version = revision_or_tag.to_string();
        self
    }

    /// Render callers as browsable repository URLs. `url_format` carries a
    /// `{}` placeholder for `revision_or_tag`. No-op when the revision or
    /// source root is empty.
    #[must_use]
    pub fn with_repository_caller_encoder(
        mut self,
        url_format: &str,
        revision_or_tag: &str,
        src_root: &str,
    ) -> Self {
        if let Some(encoder) = CallerEncoder::repository(url_format, revision_or_tag, src_root) {
            self.caller_encoder = encoder;
        }
        self
    }

    /// Change console output from stderr to stdout.
    #[must_use]
    pub fn with_stdout(mut self) -> Self {
        self.use_stdout = true;
        self
    }

    #[must_use]
    pub fn with_separator(mut self, separator: &str) -> Self {
        self.separator = separator.to_string();
        self
    }

    #[must_use]
    pub fn with_file_name(mut self, file_name: &str) -> Self {
        self.file_name = file_name.to_string();
        self
    }

    #[must_use]
    pub fn with_max_size(mut self, megabytes: u64) -> Self {
        self.max_size_mb = megabytes;
        self
    }

    #[must_use]
    pub fn with_max_age(mut self, days: u32) -> Self {
        self.max_age_days = days;
        self
    }

    #[must_use]
    pub fn with_max_backups(mut self, count: usize) -> Self {
        self.max_backups = count;
        self
    }

    #[must_use]
    pub fn with_local_time(mut self, local_time: bool) -> Self {
        self.local_time = local_time;
        self
    }

    #[must_use]
    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    pub fn is_omitted(&self, key: Key) -> bool {
        self.omit_keys.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.output, Output::Pretty);
        assert_eq!(config.level, Level::Info);
        assert!(config.omit_keys.is_empty());
        assert_eq!(config.console_fields, vec![CONSOLE_FIELD.to_string()]);
        assert_eq!(config.separator, " : ");
        assert!(!config.use_stdout);
    }

    #[test]
    fn test_output_parsing() {
        assert_eq!("Pretty".parse::<Output>().unwrap(), Output::Pretty);
        assert_eq!("".parse::<Output>().unwrap(), Output::Pretty);
        assert_eq!(
            "ConsoleAndFile".parse::<Output>().unwrap(),
            Output::ConsoleAndFile
        );
        assert!("pretty".parse::<Output>().is_err());
        assert!("Syslog".parse::<Output>().is_err());
    }

    #[test]
    fn test_repository_caller_encoder_requires_both_arguments() {
        let config =
            Config::new().with_repository_caller_encoder("https://x/blob/{}", "", "/app");
        assert_eq!(config.caller_encoder, CallerEncoder::Short);

        let config =
            Config::new().with_repository_caller_encoder("https://x/blob/{}", "v1.0.0", "/app");
        assert!(matches!(
            config.caller_encoder,
            CallerEncoder::Repository { .. }
        ));
    }

    #[test]
    fn test_console_fields_extend_default() {
        let config = Config::new().with_console_fields(&["user_id", "path"]);
        assert_eq!(config.console_fields, vec!["console", "user_id", "path"]);
    }
}
