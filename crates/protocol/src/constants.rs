use serde::{Deserialize, Serialize};

/// Message type tag used when posting a record to the host process.
pub const CONSOLE_MESSAGE_FROM_CONTENT: &str = "CONSOLE_MESSAGE_FROM_CONTENT";

/// Name of the page-local custom event dispatched on the document when no
/// host-process channel is available.
pub const CONSOLE_MESSAGE_EVENT: &str = "browserToolsConsoleMessage";

/// Text substituted for an argument that cannot be serialized.
pub const PLACEHOLDER_TOKEN: &str = "[Object]";

/// Message text used for a rejection that carries no reason.
pub const UNHANDLED_REJECTION: &str = "Unhandled Promise Rejection";

/// Host-process message type identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    #[serde(rename = "CONSOLE_MESSAGE_FROM_CONTENT")]
    ConsoleMessageFromContent,

    /// Forward compatibility: unknown message types deserialize here.
    #[serde(other)]
    Unknown,
}
