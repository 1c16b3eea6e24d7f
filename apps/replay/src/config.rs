//! Replay configuration.
//!
//! Stored as TOML. Every section is optional:
//!
//! ```toml
//! channel = "broadcast"
//!
//! [capture]
//! announce = false
//! ```

use std::path::Path;

use anyhow::Context;
use consolerelay_capture::CaptureConfig;
use serde::Deserialize;

/// Which host-process channel the replay page exposes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    #[default]
    Addressed,
    Broadcast,
    /// No host-process port; records travel as document events.
    Document,
}

/// Replay configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplayConfig {
    #[serde(default)]
    pub channel: ChannelKind,

    #[serde(default)]
    pub capture: CaptureConfig,
}

impl ReplayConfig {
    /// Loads configuration from `path`, or returns defaults when no path is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: ReplayConfig = toml::from_str(&content)
            .with_context(|| format!("invalid config {}", path.display()))?;
        tracing::debug!(path = %path.display(), channel = ?config.channel, "configuration loaded");
        Ok(config)
    }
}
