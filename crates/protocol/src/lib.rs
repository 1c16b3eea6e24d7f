//! Wire types for relaying page diagnostic output to an external observer.
//!
//! A [`DiagnosticRecord`] is the flat unit every transport carries. Host-process
//! channels wrap it in a [`RelayMessage`]; the page-local fallback event uses
//! the record itself as its detail.

pub mod constants;
pub mod record;

pub use constants::{
    CONSOLE_MESSAGE_EVENT, CONSOLE_MESSAGE_FROM_CONTENT, MessageType, PLACEHOLDER_TOKEN,
    UNHANDLED_REJECTION,
};
pub use record::{DeliveryKind, DiagnosticRecord, Level, ParseLevelError, RelayMessage};
