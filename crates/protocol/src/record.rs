use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::MessageType;

/// Diagnostic category, one per console function.
///
/// Uncaught exceptions and unhandled rejections are always [`Level::Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Log,
    Error,
    Warn,
    Info,
    Debug,
}

impl Level {
    /// Every category, in the order the console functions are wrapped.
    pub const ALL: [Level; 5] = [
        Level::Log,
        Level::Error,
        Level::Warn,
        Level::Info,
        Level::Debug,
    ];

    /// Name of the console function for this category.
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Log => "log",
            Level::Error => "error",
            Level::Warn => "warn",
            Level::Info => "info",
            Level::Debug => "debug",
        }
    }

    /// Delivery bucket on the wire: errors stay separate, the rest collapse
    /// into plain log output.
    pub fn delivery_kind(self) -> DeliveryKind {
        match self {
            Level::Error => DeliveryKind::ConsoleError,
            _ => DeliveryKind::ConsoleLog,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known category.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown diagnostic level: {0}")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "log" => Ok(Level::Log),
            "error" => Ok(Level::Error),
            "warn" | "warning" => Ok(Level::Warn),
            "info" => Ok(Level::Info),
            "debug" | "verbose" => Ok(Level::Debug),
            other => Err(ParseLevelError(other.to_string())),
        }
    }
}

/// Two-way split of categories used by the `type` field of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryKind {
    ConsoleError,
    ConsoleLog,
}

/// A single relayed diagnostic event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticRecord {
    #[serde(rename = "type")]
    pub kind: DeliveryKind,
    pub level: Level,
    pub message: String,
    /// Milliseconds since the Unix epoch at capture time.
    pub timestamp: i64,
}

impl DiagnosticRecord {
    /// Builds a record, deriving `kind` from `level`.
    pub fn new(level: Level, message: impl Into<String>, timestamp: i64) -> Self {
        Self {
            kind: level.delivery_kind(),
            level,
            message: message.into(),
            timestamp,
        }
    }
}

/// Payload posted to the host process over a messaging channel.
///
/// `tab_id` is always `null` when sent from the page; the receiving side
/// resolves the destination itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayMessage {
    #[serde(rename = "type")]
    pub msg_type: MessageType,
    pub data: DiagnosticRecord,
    pub tab_id: Option<i64>,
}

impl RelayMessage {
    /// Wraps a record for delivery from page content.
    pub fn from_content(data: DiagnosticRecord) -> Self {
        Self {
            msg_type: MessageType::ConsoleMessageFromContent,
            data,
            tab_id: None,
        }
    }
}
