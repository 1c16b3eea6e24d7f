//! Delivery of records to the observer.
//!
//! Channels are tried in priority order. The first one that reports itself
//! available gets exactly one send attempt; whether that attempt succeeds
//! never changes which channel was chosen, and failures are discarded.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use consolerelay_protocol::{DiagnosticRecord, RelayMessage};

use crate::error::TransportError;
use crate::events::CustomEvent;
use crate::page::{Document, Runtime};

/// One way of reaching the observer.
pub trait Channel {
    /// Short name used in logs and [`Delivery`] reports.
    fn name(&self) -> &'static str;

    /// Whether the channel can be used right now. Checked on every relay.
    fn is_available(&self) -> bool;

    /// Sends one record. Must not block.
    fn attempt_send(&self, record: &DiagnosticRecord) -> Result<(), TransportError>;
}

/// Addressed request/response port to the observer's host process.
pub struct AddressedChannel {
    runtime: Rc<Runtime>,
}

impl AddressedChannel {
    pub fn new(runtime: Rc<Runtime>) -> Self {
        Self { runtime }
    }
}

impl Channel for AddressedChannel {
    fn name(&self) -> &'static str {
        "addressed"
    }

    fn is_available(&self) -> bool {
        self.runtime.addressed().is_some()
    }

    fn attempt_send(&self, record: &DiagnosticRecord) -> Result<(), TransportError> {
        let port = self.runtime.addressed().ok_or(TransportError::Unavailable)?;
        port.post(&RelayMessage::from_content(record.clone()))
    }
}

/// Generic broadcast port to the host process.
pub struct BroadcastChannel {
    runtime: Rc<Runtime>,
}

impl BroadcastChannel {
    pub fn new(runtime: Rc<Runtime>) -> Self {
        Self { runtime }
    }
}

impl Channel for BroadcastChannel {
    fn name(&self) -> &'static str {
        "broadcast"
    }

    fn is_available(&self) -> bool {
        self.runtime.broadcast().is_some()
    }

    fn attempt_send(&self, record: &DiagnosticRecord) -> Result<(), TransportError> {
        let port = self.runtime.broadcast().ok_or(TransportError::Unavailable)?;
        port.post(&RelayMessage::from_content(record.clone()))
    }
}

/// Page-local fallback: a custom event on the document carrying the record.
pub struct DocumentEventChannel {
    document: Rc<Document>,
    event_name: String,
}

impl DocumentEventChannel {
    pub fn new(document: Rc<Document>, event_name: impl Into<String>) -> Self {
        Self {
            document,
            event_name: event_name.into(),
        }
    }
}

impl Channel for DocumentEventChannel {
    fn name(&self) -> &'static str {
        "document-event"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn attempt_send(&self, record: &DiagnosticRecord) -> Result<(), TransportError> {
        let detail = serde_json::to_value(record)?;
        self.document
            .dispatch_event(&CustomEvent::new(self.event_name.clone(), detail));
        Ok(())
    }
}

/// Outcome of one relay attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Handed to the named channel.
    Sent(&'static str),
    /// The named channel was chosen but rejected the send.
    Failed(&'static str),
    /// No channel was available.
    Unavailable,
}

/// Ordered list of channels.
pub struct TransportSelector {
    channels: Vec<Box<dyn Channel>>,
}

impl TransportSelector {
    pub fn new(channels: Vec<Box<dyn Channel>>) -> Self {
        Self { channels }
    }

    /// Standard priority: addressed port, broadcast port, document event.
    pub fn standard(runtime: Rc<Runtime>, document: Rc<Document>, event_name: &str) -> Self {
        Self::new(vec![
            Box::new(AddressedChannel::new(Rc::clone(&runtime))),
            Box::new(BroadcastChannel::new(runtime)),
            Box::new(DocumentEventChannel::new(document, event_name)),
        ])
    }

    /// Name of the channel the next relay would use.
    pub fn select(&self) -> Option<&'static str> {
        self.channels
            .iter()
            .find(|c| c.is_available())
            .map(|c| c.name())
    }

    /// Delivers one record, best effort.
    pub fn deliver(&self, record: &DiagnosticRecord) -> Delivery {
        let Some(channel) = self.channels.iter().find(|c| c.is_available()) else {
            tracing::trace!("no relay channel available");
            return Delivery::Unavailable;
        };

        // Ports and in-page listeners are foreign code; a panic in either
        // must not unwind into the console call that triggered the relay.
        match panic::catch_unwind(AssertUnwindSafe(|| channel.attempt_send(record))) {
            Ok(Ok(())) => Delivery::Sent(channel.name()),
            Ok(Err(e)) => {
                tracing::trace!(channel = channel.name(), error = %e, "relay attempt failed");
                Delivery::Failed(channel.name())
            }
            Err(payload) => {
                tracing::trace!(
                    channel = channel.name(),
                    panic = panic_message(&*payload),
                    "relay attempt panicked"
                );
                Delivery::Failed(channel.name())
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<non-string panic>")
}
