//! Metadata enrichment
//!
//! Fixed fields (version, hostname, pid) attached to every record. Computed
//! once when the engine is built and cached for its lifetime.

use crate::config::Config;
use crate::core::{Field, Key};

/// Compute the base fields for an engine, honoring the omission set.
pub(crate) fn base_fields(config: &Config) -> Vec<Field> {
    let mut fields = Vec::new();
    if !config.is_omitted(Key::Version) {
        fields.push(Field::string(
            Key::Version.as_str(),
            resolve_version(&config.version),
        ));
    }
    if !config.is_omitted(Key::Hostname) {
        // Unresolvable hostname drops the field rather than failing the
        // logger
        if let Some(hostname) = hostname() {
            fields.push(Field::string(Key::Hostname.as_str(), hostname));
        }
    }
    if !config.is_omitted(Key::Pid) {
        fields.push(Field::int(Key::Pid.as_str(), i64::from(std::process::id())));
    }
    fields
}

/// Resolve the version: the explicit override when set, else the short
/// revision of the current source checkout, else `"undefined"`.
pub(crate) fn resolve_version(version_override: &str) -> String {
    if !version_override.is_empty() {
        return version_override.to_string();
    }
    if let Ok(out) = std::process::Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
    {
        if out.status.success() {
            let revision = String::from_utf8_lossy(&out.stdout)
                .trim_end_matches('\n')
                .to_string();
            if !revision.is_empty() {
                return revision;
            }
        }
    }
    "undefined".to_string()
}

fn hostname() -> Option<String> {
    gethostname::gethostname().into_string().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FieldValue;

    #[test]
    fn test_version_override_wins() {
        assert_eq!(resolve_version("v1.2.3"), "v1.2.3");
    }

    #[test]
    fn test_base_fields_honor_omission() {
        let config = Config::new()
            .with_version("v1.0.0")
            .with_omit_keys(&[Key::Hostname, Key::Pid]);
        let fields = base_fields(&config);

        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].key, "version");
        assert_eq!(fields[0].value, FieldValue::String("v1.0.0".to_string()));
    }

    #[test]
    fn test_pid_field_present_by_default() {
        let config = Config::new().with_version("v1.0.0");
        let fields = base_fields(&config);
        let pid = fields.iter().find(|f| f.key == "pid").expect("pid field");
        assert_eq!(
            pid.value,
            FieldValue::Int(i64::from(std::process::id()))
        );
    }
}
