//! Console interception with best-effort relay to an external observer.
//!
//! [`install`] decorates a page's `log`/`error`/`warn`/`info`/`debug`
//! functions and listens for uncaught exceptions and unhandled rejections.
//! Every captured event becomes a flat [`DiagnosticRecord`] delivered over the
//! best available channel: an addressed host-process port, a broadcast port,
//! or a custom event on the page's document. The page's own console output is
//! never altered and relay failures never reach page code.
//!
//! [`DiagnosticRecord`]: consolerelay_protocol::DiagnosticRecord

pub mod config;
pub mod error;
pub mod events;
pub mod format;
pub mod interceptor;
pub mod page;
pub mod transport;
pub mod value;
pub mod wrapper;

pub use config::CaptureConfig;
pub use error::{SerializeError, TransportError};
pub use events::{CustomEvent, ErrorEvent, RejectionEvent};
pub use interceptor::{Clock, Installation, Installer, Interceptor, RelayStats, install, system_clock};
pub use page::{ConsoleBindings, ConsoleFn, Document, MessagePort, Page, Runtime};
pub use transport::{Channel, Delivery, TransportSelector};
pub use value::{ErrorValue, Primitive, Structured, Value};
