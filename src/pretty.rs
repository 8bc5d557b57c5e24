//! Console companion renderer
//!
//! Renders a condensed, colorized one-line view of each record for
//! interactive consoles. Only fields whose keys are in the console
//! allow-list appear; the structured record keeps everything. Active only
//! under [`Output::Pretty`](crate::Output::Pretty).

use colored::Colorize;
use std::fmt;
use std::io::Write;

use crate::core::{Field, Level};

pub struct PrettyLogger {
    console_fields: Vec<String>,
    separator: String,
    use_stdout: bool,
}

impl PrettyLogger {
    pub fn new(console_fields: Vec<String>, separator: String, use_stdout: bool) -> Self {
        Self {
            console_fields,
            separator,
            use_stdout,
        }
    }

    pub fn log(&self, name: Option<&str>, message: &str, level: Level, fields: &[Field]) {
        self.print(self.render(name, message, level, fields));
    }

    pub fn log_with_error(
        &self,
        name: Option<&str>,
        message: &str,
        level: Level,
        err: &str,
        fields: &[Field],
    ) {
        let mut line = self.render(name, message, level, fields);
        line.push('\n');
        line.push_str(&format!("{}{}", "error: ".red().bold(), err.red()));
        self.print(line);
    }

    /// Deep pretty-printer for arbitrary values, for interactive debugging.
    pub fn dump(&self, value: &dyn fmt::Debug) {
        self.print(format!("{:#?}", value));
    }

    fn render(&self, name: Option<&str>, message: &str, level: Level, fields: &[Field]) -> String {
        let time = chrono::Local::now().format("%H:%M:%S").to_string();
        let tag = format!("{:5}", level.as_str())
            .color(level.color_code())
            .bold();

        let mut line = match name {
            Some(name) => format!("{} {} {} | {}", time.dimmed(), tag, name, message),
            None => format!("{} {} {}", time.dimmed(), tag, message),
        };

        for field in fields {
            if self.console_fields.iter().any(|key| *key == field.key) {
                line.push_str(&self.separator);
                line.push_str(&field.value.to_string());
            }
        }
        line
    }

    fn print(&self, line: String) {
        // Console streams are line buffered; ignore write failures so a
        // closed stream never takes the host down
        if self.use_stdout {
            let _ = writeln!(std::io::stdout().lock(), "{}", line);
        } else {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> PrettyLogger {
        colored::control::set_override(false);
        PrettyLogger::new(vec!["console".to_string()], " : ".to_string(), false)
    }

    #[test]
    fn test_render_includes_only_allow_listed_fields() {
        let pretty = renderer();
        let fields = [
            Field::console("shown"),
            Field::string("user_name", "hidden"),
        ];
        let line = pretty.render(None, "USER_CREATED", Level::Info, &fields);

        assert!(line.contains("USER_CREATED"));
        assert!(line.contains(" : shown"));
        assert!(!line.contains("hidden"));
    }

    #[test]
    fn test_render_prefixes_logger_name() {
        let pretty = renderer();
        let line = pretty.render(Some("api.users"), "REQUEST", Level::Warn, &[]);
        assert!(line.contains("api.users | REQUEST"));
        assert!(line.contains("WARN"));
    }
}
