//! Installation and the relay pipeline.
//!
//! Installing decorates the five console functions and attaches the two
//! failure listeners. After that every diagnostic call runs the original
//! function, then formats its arguments and hands a [`DiagnosticRecord`] to
//! the [`TransportSelector`].
//!
//! Relay is not re-entrant: a diagnostic call made while a record is being
//! delivered (by a port, or by an in-page listener of the fallback event)
//! still reaches the original console but is not relayed again. Status lines
//! written by the interceptor itself go straight to the original functions.

use std::cell::Cell;
use std::rc::Rc;

use consolerelay_protocol::{DiagnosticRecord, Level};

use crate::config::CaptureConfig;
use crate::events::{ErrorEvent, RejectionEvent};
use crate::format::format_args;
use crate::page::Page;
use crate::transport::{Delivery, TransportSelector};
use crate::value::Value;
use crate::wrapper::{DecoratedMethod, OriginalMethodTable};

/// Source of capture timestamps, in milliseconds since the Unix epoch.
pub type Clock = Rc<dyn Fn() -> i64>;

/// Wall-clock time.
pub fn system_clock() -> Clock {
    Rc::new(|| chrono::Utc::now().timestamp_millis())
}

/// Counters for relay attempts since installation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    /// Records handed to a channel without error.
    pub relayed: u64,
    /// Records whose chosen channel rejected the send.
    pub failed: u64,
    /// Records dropped because no channel was available.
    pub undelivered: u64,
    /// Diagnostic calls made during a relay and not relayed.
    pub suppressed: u64,
}

/// The active interceptor of one page.
pub struct Interceptor {
    config: CaptureConfig,
    originals: OriginalMethodTable,
    selector: TransportSelector,
    clock: Clock,
    relaying: Cell<bool>,
    stats: Cell<RelayStats>,
}

/// Clears the relay flag when delivery returns or unwinds.
struct RelayGuard<'a>(&'a Cell<bool>);

impl Drop for RelayGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl Interceptor {
    fn new(page: &Page, config: CaptureConfig, clock: Clock) -> Self {
        let selector = TransportSelector::standard(
            Rc::clone(page.runtime()),
            Rc::clone(page.document()),
            &config.event_name,
        );
        Self {
            originals: OriginalMethodTable::capture(page.console()),
            selector,
            config,
            clock,
            relaying: Cell::new(false),
            stats: Cell::new(RelayStats::default()),
        }
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Console functions as they were before installation.
    pub fn originals(&self) -> &OriginalMethodTable {
        &self.originals
    }

    pub fn selector(&self) -> &TransportSelector {
        &self.selector
    }

    pub fn stats(&self) -> RelayStats {
        self.stats.get()
    }

    /// Formats a console argument list and relays it.
    ///
    /// Returns `None` when the call was suppressed because a relay is
    /// already in progress.
    pub fn relay_args(&self, level: Level, args: &[Value]) -> Option<Delivery> {
        self.relay_with(level, || format_args(args, &self.config.placeholder))
    }

    /// Relays already formatted text.
    pub fn relay_text(&self, level: Level, text: String) -> Option<Delivery> {
        self.relay_with(level, move || text)
    }

    fn relay_with(&self, level: Level, text: impl FnOnce() -> String) -> Option<Delivery> {
        if self.relaying.replace(true) {
            self.bump(|s| s.suppressed += 1);
            tracing::trace!(%level, "diagnostic call during relay not relayed");
            return None;
        }
        let _guard = RelayGuard(&self.relaying);

        let record = DiagnosticRecord::new(level, text(), (self.clock)());
        let delivery = self.selector.deliver(&record);
        self.bump(|s| match delivery {
            Delivery::Sent(_) => s.relayed += 1,
            Delivery::Failed(_) => s.failed += 1,
            Delivery::Unavailable => s.undelivered += 1,
        });
        Some(delivery)
    }

    fn bump(&self, f: impl FnOnce(&mut RelayStats)) {
        let mut stats = self.stats.get();
        f(&mut stats);
        self.stats.set(stats);
    }

    /// Writes a status line through the original `log`, never relayed.
    fn status(&self, line: String) {
        if self.config.announce {
            self.originals.call(Level::Log, &[Value::from(line)]);
        }
    }

    fn activate(self: &Rc<Self>, page: &Page) {
        self.status(self.config.initializing_line());

        for level in Level::ALL {
            let interceptor = Rc::clone(self);
            let method = DecoratedMethod::new(
                level,
                Rc::clone(self.originals.get(level)),
                move |level, args| {
                    interceptor.relay_args(level, args);
                },
            );
            method.install(page.console());
        }

        let interceptor = Rc::clone(self);
        page.window().error.add_listener(move |event: &ErrorEvent| {
            interceptor.relay_text(Level::Error, event.describe());
        });
        let interceptor = Rc::clone(self);
        page.window()
            .unhandled_rejection
            .add_listener(move |event: &RejectionEvent| {
                interceptor.relay_text(Level::Error, event.describe());
            });

        self.status(self.config.active_line());
        tracing::debug!(channel = ?self.selector.select(), "console interception active");
    }
}

/// Result of an install attempt.
#[derive(Clone)]
pub enum Installation {
    /// This call installed the interceptor.
    Installed(Rc<Interceptor>),
    /// The page already had one; nothing was changed.
    AlreadyInstalled(Rc<Interceptor>),
}

impl Installation {
    pub fn interceptor(&self) -> &Rc<Interceptor> {
        match self {
            Installation::Installed(i) | Installation::AlreadyInstalled(i) => i,
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, Installation::Installed(_))
    }
}

/// Installs interception on a page.
pub struct Installer {
    config: CaptureConfig,
    clock: Clock,
}

impl Installer {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            clock: system_clock(),
        }
    }

    /// Replaces the timestamp source.
    pub fn with_clock(mut self, clock: impl Fn() -> i64 + 'static) -> Self {
        self.clock = Rc::new(clock);
        self
    }

    /// Installs once per page; later calls return the existing interceptor
    /// and change nothing.
    pub fn install(self, page: &Page) -> Installation {
        if let Some(existing) = page.interceptor() {
            tracing::debug!("console interception already installed");
            return Installation::AlreadyInstalled(existing);
        }

        let Installer { config, clock } = self;
        let interceptor = Rc::clone(
            page.installed
                .get_or_init(|| Rc::new(Interceptor::new(page, config, clock))),
        );
        interceptor.activate(page);
        Installation::Installed(interceptor)
    }
}

/// Installs interception with the wall clock.
pub fn install(page: &Page, config: CaptureConfig) -> Installation {
    Installer::new(config).install(page)
}
