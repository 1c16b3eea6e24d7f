//! Interceptor configuration.
//!
//! Every field has a default, so an empty TOML document is a valid config.

use consolerelay_protocol::{CONSOLE_MESSAGE_EVENT, PLACEHOLDER_TOKEN};
use serde::{Deserialize, Serialize};

/// Interceptor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Write status lines through the original console at install time.
    #[serde(default = "default_true")]
    pub announce: bool,

    /// Prefix of the status lines.
    #[serde(default = "default_status_prefix")]
    pub status_prefix: String,

    /// Text substituted for arguments that cannot be serialized.
    #[serde(default = "default_placeholder")]
    pub placeholder: String,

    /// Name of the page-local fallback event.
    #[serde(default = "default_event_name")]
    pub event_name: String,
}

fn default_true() -> bool {
    true
}

fn default_status_prefix() -> String {
    "Console Capture".into()
}

fn default_placeholder() -> String {
    PLACEHOLDER_TOKEN.into()
}

fn default_event_name() -> String {
    CONSOLE_MESSAGE_EVENT.into()
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            announce: default_true(),
            status_prefix: default_status_prefix(),
            placeholder: default_placeholder(),
            event_name: default_event_name(),
        }
    }
}

impl CaptureConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Status line announcing that interception is being set up.
    pub fn initializing_line(&self) -> String {
        format!("{}: Initializing console interception", self.status_prefix)
    }

    /// Status line announcing that interception is active.
    pub fn active_line(&self) -> String {
        format!("{}: Console interception active", self.status_prefix)
    }
}
