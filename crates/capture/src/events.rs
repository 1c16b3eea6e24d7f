//! Events dispatched by the page runtime.

use consolerelay_protocol::UNHANDLED_REJECTION;

use crate::value::{ErrorValue, Value};

/// Global error event for an uncaught exception.
#[derive(Debug, Clone, Default)]
pub struct ErrorEvent {
    /// The thrown value, if the runtime exposes it.
    pub error: Option<Value>,
    pub message: String,
    pub filename: String,
    pub lineno: u32,
    pub colno: u32,
}

impl ErrorEvent {
    /// Relay text for this event.
    ///
    /// A thrown error object with a stack yields `"{name}: {message}\n{stack}"`;
    /// anything else falls back to the event's own location fields.
    pub fn describe(&self) -> String {
        let thrown = match &self.error {
            Some(Value::Structured(s)) => s.as_error(),
            _ => None,
        };
        match thrown {
            Some(ErrorValue {
                name,
                message,
                stack: Some(stack),
            }) => format!("{name}: {message}\n{stack}"),
            _ => format!(
                "{} at {}:{}:{}",
                self.message, self.filename, self.lineno, self.colno
            ),
        }
    }
}

/// Event for a promise rejection nobody handled.
#[derive(Debug, Clone, Default)]
pub struct RejectionEvent {
    pub reason: Option<Value>,
}

impl RejectionEvent {
    pub fn new(reason: impl Into<Value>) -> Self {
        Self {
            reason: Some(reason.into()),
        }
    }

    /// Relay text for this event. A falsy or missing reason yields the bare
    /// rejection text.
    pub fn describe(&self) -> String {
        match self.reason.as_ref().filter(|r| r.is_truthy()) {
            Some(reason) => format!("{UNHANDLED_REJECTION}: {}", reason.to_display_string()),
            None => UNHANDLED_REJECTION.to_string(),
        }
    }
}

/// Page-local custom event with a JSON detail payload.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomEvent {
    pub name: String,
    pub detail: serde_json::Value,
}

impl CustomEvent {
    pub fn new(name: impl Into<String>, detail: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            detail,
        }
    }
}
