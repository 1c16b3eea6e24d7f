//! JSON-lines replay scripts.
//!
//! Each non-empty line that does not start with `#` is one step:
//!
//! ```text
//! {"console": {"level": "log", "args": ["count:", 3]}}
//! {"uncaught": {"error": {"name": "TypeError", "message": "x", "stack": "at f"}}}
//! {"rejection": {"reason": "timeout"}}
//! ```
//!
//! Steps run against a fresh in-memory page with the interceptor installed.
//! Relayed messages are written to `out` as JSON lines; the page's own
//! console output goes to the log.

use std::cell::RefCell;
use std::io::{BufRead, Write};
use std::rc::Rc;

use anyhow::Context;
use consolerelay_capture::{
    CustomEvent, ErrorEvent, ErrorValue, Installer, MessagePort, Page, RejectionEvent, RelayStats,
    TransportError, Value,
};
use consolerelay_protocol::{Level, RelayMessage};
use serde::Deserialize;

use crate::config::{ChannelKind, ReplayConfig};

/// Shared output sink.
pub type Output = Rc<RefCell<dyn Write>>;

/// One scripted page action.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Console {
        level: Level,
        #[serde(default)]
        args: Vec<serde_json::Value>,
    },
    Uncaught(UncaughtStep),
    Rejection {
        #[serde(default)]
        reason: Option<serde_json::Value>,
    },
}

#[derive(Debug, Default, Deserialize)]
pub struct UncaughtStep {
    #[serde(default)]
    pub error: Option<ThrownError>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub lineno: u32,
    #[serde(default)]
    pub colno: u32,
}

#[derive(Debug, Deserialize)]
pub struct ThrownError {
    pub name: String,
    pub message: String,
    #[serde(default)]
    pub stack: Option<String>,
}

impl From<UncaughtStep> for ErrorEvent {
    fn from(step: UncaughtStep) -> Self {
        ErrorEvent {
            error: step.error.map(|e| {
                let value = ErrorValue {
                    name: e.name,
                    message: e.message,
                    stack: e.stack,
                };
                Value::from(value)
            }),
            message: step.message,
            filename: step.filename,
            lineno: step.lineno,
            colno: step.colno,
        }
    }
}

/// Host-process port that writes each message as a JSON line.
struct JsonLinesPort {
    out: Output,
}

impl MessagePort for JsonLinesPort {
    fn post(&self, message: &RelayMessage) -> Result<(), TransportError> {
        let line = serde_json::to_string(message)?;
        writeln!(self.out.borrow_mut(), "{line}")
            .map_err(|e| TransportError::Rejected(e.to_string()))
    }
}

/// Builds a page wired to `out` according to the configured channel.
fn build_page(config: &ReplayConfig, out: &Output) -> Page {
    let page = Page::new(|level, args| {
        let text: Vec<String> = args.iter().map(Value::to_display_string).collect();
        tracing::info!(target: "page", %level, "{}", text.join(" "));
    });

    match config.channel {
        ChannelKind::Addressed => page.runtime().attach_addressed(Rc::new(JsonLinesPort {
            out: Rc::clone(out),
        })),
        ChannelKind::Broadcast => page.runtime().attach_broadcast(Rc::new(JsonLinesPort {
            out: Rc::clone(out),
        })),
        ChannelKind::Document => {
            let out = Rc::clone(out);
            page.document()
                .add_event_listener(config.capture.event_name.clone(), move |e: &CustomEvent| {
                    if let Err(err) = writeln!(out.borrow_mut(), "{}", e.detail) {
                        tracing::warn!(error = %err, "failed to write event");
                    }
                });
        }
    }
    page
}

/// Runs every step of `input` and returns the relay counters.
pub fn run(config: &ReplayConfig, input: impl BufRead, out: Output) -> anyhow::Result<RelayStats> {
    let page = build_page(config, &out);
    let installation = Installer::new(config.capture.clone()).install(&page);

    for (index, line) in input.lines().enumerate() {
        let line = line.context("failed to read script")?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let step: Step = serde_json::from_str(line)
            .with_context(|| format!("invalid step on line {}", index + 1))?;
        apply(&page, step);
    }

    out.borrow_mut().flush().context("failed to flush output")?;
    Ok(installation.interceptor().stats())
}

fn apply(page: &Page, step: Step) {
    match step {
        Step::Console { level, args } => {
            let args: Vec<Value> = args.into_iter().map(Value::from).collect();
            page.console().call(level, &args);
        }
        Step::Uncaught(uncaught) => {
            page.report_error(&uncaught.into());
        }
        Step::Rejection { reason } => {
            page.report_rejection(&RejectionEvent {
                reason: reason.map(Value::from),
            });
        }
    }
}
