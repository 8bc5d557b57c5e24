//! Field keys used by every structured record

use serde::{Deserialize, Serialize};
use std::fmt;

/// A record field name. Keys double as entries of the omission set: a record
/// never carries a field whose key the configuration omits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Message,
    Level,
    Time,
    Name,
    Caller,
    Function,
    Stacktrace,
    Version,
    Hostname,
    Pid,
}

impl Key {
    pub const ALL: [Key; 10] = [
        Key::Message,
        Key::Level,
        Key::Time,
        Key::Name,
        Key::Caller,
        Key::Function,
        Key::Stacktrace,
        Key::Version,
        Key::Hostname,
        Key::Pid,
    ];

    /// Wire name used in the encoded record.
    pub fn as_str(&self) -> &'static str {
        match self {
            Key::Message => "message",
            Key::Level => "level",
            Key::Time => "time",
            Key::Name => "name",
            Key::Caller => "caller",
            Key::Function => "function",
            Key::Stacktrace => "stacktrace",
            Key::Version => "version",
            Key::Hostname => "hostname",
            Key::Pid => "pid",
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        assert_eq!(Key::Message.as_str(), "message");
        assert_eq!(Key::Pid.as_str(), "pid");
        assert_eq!(Key::ALL.len(), 10);
    }
}
