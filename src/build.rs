//! Encoder/sink builder
//!
//! Translates a [`Config`] into a concrete encoder configuration, an
//! ordered sink list, and a constructed [`Logger`]. Sink selection is a
//! total function of the output mode:
//!
//! | Output mode    | Sinks (in order)          |
//! |----------------|---------------------------|
//! | Pretty         | rotating file             |
//! | ConsoleAndFile | console, rotating file    |
//! | Console        | console                   |
//! | File           | rotating file             |
//!
//! In `Pretty` mode the console view is produced by the pretty renderer,
//! not by a sink.

use std::sync::Arc;

use crate::config::{Config, Output};
use crate::core::{EncoderConfig, Engine, Result, Sink};
use crate::enrich;
use crate::logger::Logger;
use crate::pretty::PrettyLogger;
use crate::sinks::{ConsoleSink, RotatingFileSink};

pub(crate) fn build_logger(config: &Config) -> Result<Logger> {
    let pretty = match config.output {
        Output::Pretty => Some(Arc::new(PrettyLogger::new(
            config.console_fields.clone(),
            config.separator.clone(),
            config.use_stdout,
        ))),
        _ => None,
    };

    let encoder = EncoderConfig::new(&config.omit_keys, config.caller_encoder.clone());
    let engine = Engine::new(
        encoder,
        sinks(config)?,
        config.level,
        enrich::base_fields(config),
    );

    Ok(Logger::new(Arc::new(engine), pretty))
}

fn sinks(config: &Config) -> Result<Vec<Box<dyn Sink>>> {
    let mut sinks: Vec<Box<dyn Sink>> = Vec::new();
    match config.output {
        Output::Pretty | Output::File => sinks.push(Box::new(file_sink(config)?)),
        Output::ConsoleAndFile => {
            sinks.push(Box::new(console_sink(config)));
            sinks.push(Box::new(file_sink(config)?));
        }
        Output::Console => sinks.push(Box::new(console_sink(config))),
    }
    Ok(sinks)
}

fn console_sink(config: &Config) -> ConsoleSink {
    if config.use_stdout {
        ConsoleSink::stdout()
    } else {
        ConsoleSink::stderr()
    }
}

fn file_sink(config: &Config) -> Result<RotatingFileSink> {
    RotatingFileSink::open(
        &config.file_name,
        config.max_size_mb,
        config.max_age_days,
        config.max_backups,
        config.local_time,
        config.compress,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn file_config(dir: &TempDir, output: Output) -> Config {
        Config::new()
            .with_output(output)
            .with_file_name(dir.path().join("app.log").to_str().unwrap())
    }

    fn sink_names(config: &Config) -> Vec<&'static str> {
        sinks(config)
            .unwrap()
            .iter()
            .map(|s| s.name())
            .collect()
    }

    #[test]
    fn test_sink_list_per_output_mode() {
        let dir = TempDir::new().expect("temp dir");

        assert_eq!(sink_names(&file_config(&dir, Output::Pretty)), vec!["file"]);
        assert_eq!(sink_names(&file_config(&dir, Output::File)), vec!["file"]);
        assert_eq!(
            sink_names(&file_config(&dir, Output::ConsoleAndFile)),
            vec!["stderr", "file"]
        );
        assert_eq!(
            sink_names(&file_config(&dir, Output::Console)),
            vec!["stderr"]
        );
    }

    #[test]
    fn test_console_sink_targets_stdout_when_selected() {
        let config = Config::new().with_output(Output::Console).with_stdout();
        assert_eq!(sink_names(&config), vec!["stdout"]);
    }

    #[test]
    fn test_pretty_mode_builds_renderer() {
        let dir = TempDir::new().expect("temp dir");
        let logger = build_logger(&file_config(&dir, Output::Pretty)).unwrap();
        assert!(logger.has_pretty());

        let logger = build_logger(&file_config(&dir, Output::File)).unwrap();
        assert!(!logger.has_pretty());
    }
}
