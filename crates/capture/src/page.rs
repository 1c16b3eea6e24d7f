//! Page global state as seen by the interceptor.
//!
//! A [`Page`] owns the live console bindings, window and document event
//! dispatch, the host-process messaging ports, and the installation slot.
//! Everything is single-threaded: all dispatch runs synchronously on the
//! caller's stack, and no borrow is held while user callbacks run, so
//! callbacks may re-enter the page freely.

use std::cell::{OnceCell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use consolerelay_protocol::{Level, RelayMessage};

use crate::error::TransportError;
use crate::events::{CustomEvent, ErrorEvent, RejectionEvent};
use crate::interceptor::Interceptor;
use crate::value::Value;

/// A console function.
pub type ConsoleFn = Rc<dyn Fn(&[Value])>;

/// Event listener callback.
pub type Listener<E> = Rc<dyn Fn(&E)>;

/// Messaging primitive to the observer's host process.
///
/// `post` must not block or wait for acknowledgement; a port that cannot
/// accept the message right away should return an error instead.
pub trait MessagePort {
    fn post(&self, message: &RelayMessage) -> Result<(), TransportError>;
}

/// Live binding table for the five console functions.
pub struct ConsoleBindings {
    slots: RefCell<HashMap<Level, ConsoleFn>>,
}

impl ConsoleBindings {
    /// Binds every category to `native`, the host's own console output.
    pub fn new(native: impl Fn(Level, &[Value]) + 'static) -> Self {
        let native: Rc<dyn Fn(Level, &[Value])> = Rc::new(native);
        let slots = Level::ALL
            .into_iter()
            .map(|level| {
                let native = Rc::clone(&native);
                let f: ConsoleFn = Rc::new(move |args: &[Value]| native(level, args));
                (level, f)
            })
            .collect();
        Self {
            slots: RefCell::new(slots),
        }
    }

    /// Returns the function currently bound for `level`.
    pub fn get(&self, level: Level) -> ConsoleFn {
        // Every level is bound at construction and bindings are only replaced.
        Rc::clone(&self.slots.borrow()[&level])
    }

    /// Rebinds `level`.
    pub fn set(&self, level: Level, f: ConsoleFn) {
        self.slots.borrow_mut().insert(level, f);
    }

    /// Calls whatever is currently bound for `level`.
    pub fn call(&self, level: Level, args: &[Value]) {
        let f = self.get(level);
        f(args);
    }

    pub fn log(&self, args: &[Value]) {
        self.call(Level::Log, args);
    }

    pub fn error(&self, args: &[Value]) {
        self.call(Level::Error, args);
    }

    pub fn warn(&self, args: &[Value]) {
        self.call(Level::Warn, args);
    }

    pub fn info(&self, args: &[Value]) {
        self.call(Level::Info, args);
    }

    pub fn debug(&self, args: &[Value]) {
        self.call(Level::Debug, args);
    }
}

/// Ordered listener list for one event type.
pub struct EventTarget<E> {
    listeners: RefCell<Vec<Listener<E>>>,
}

impl<E> Default for EventTarget<E> {
    fn default() -> Self {
        Self {
            listeners: RefCell::new(Vec::new()),
        }
    }
}

impl<E> EventTarget<E> {
    pub fn add_listener(&self, listener: impl Fn(&E) + 'static) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    /// Notifies listeners registered before the dispatch started, in order.
    /// Returns how many were notified.
    pub fn dispatch(&self, event: &E) -> usize {
        let listeners = self.listeners.borrow().clone();
        for listener in &listeners {
            listener(event);
        }
        listeners.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

/// Window-level failure events.
#[derive(Default)]
pub struct Window {
    pub error: EventTarget<ErrorEvent>,
    pub unhandled_rejection: EventTarget<RejectionEvent>,
}

/// Document node receiving named custom events.
#[derive(Default)]
pub struct Document {
    listeners: RefCell<HashMap<String, Vec<Listener<CustomEvent>>>>,
}

impl Document {
    pub fn add_event_listener(&self, name: impl Into<String>, listener: impl Fn(&CustomEvent) + 'static) {
        self.listeners
            .borrow_mut()
            .entry(name.into())
            .or_default()
            .push(Rc::new(listener));
    }

    /// Dispatches to listeners registered under the event's name.
    /// Returns how many were notified.
    pub fn dispatch_event(&self, event: &CustomEvent) -> usize {
        let listeners = self
            .listeners
            .borrow()
            .get(&event.name)
            .cloned()
            .unwrap_or_default();
        for listener in &listeners {
            listener(event);
        }
        listeners.len()
    }
}

/// Host-process messaging ports. Either may come and go at any time.
#[derive(Default)]
pub struct Runtime {
    addressed: RefCell<Option<Rc<dyn MessagePort>>>,
    broadcast: RefCell<Option<Rc<dyn MessagePort>>>,
}

impl Runtime {
    pub fn attach_addressed(&self, port: Rc<dyn MessagePort>) {
        *self.addressed.borrow_mut() = Some(port);
    }

    pub fn detach_addressed(&self) {
        self.addressed.borrow_mut().take();
    }

    pub fn attach_broadcast(&self, port: Rc<dyn MessagePort>) {
        *self.broadcast.borrow_mut() = Some(port);
    }

    pub fn detach_broadcast(&self) {
        self.broadcast.borrow_mut().take();
    }

    pub fn addressed(&self) -> Option<Rc<dyn MessagePort>> {
        self.addressed.borrow().clone()
    }

    pub fn broadcast(&self) -> Option<Rc<dyn MessagePort>> {
        self.broadcast.borrow().clone()
    }
}

/// Global state of one page load.
pub struct Page {
    console: ConsoleBindings,
    window: Window,
    document: Rc<Document>,
    runtime: Rc<Runtime>,
    /// Installation guard: written once, never reset for the page's life.
    pub(crate) installed: OnceCell<Rc<Interceptor>>,
}

impl Page {
    /// Creates a fresh page whose console writes to `native`.
    pub fn new(native: impl Fn(Level, &[Value]) + 'static) -> Self {
        Self {
            console: ConsoleBindings::new(native),
            window: Window::default(),
            document: Rc::new(Document::default()),
            runtime: Rc::new(Runtime::default()),
            installed: OnceCell::new(),
        }
    }

    pub fn console(&self) -> &ConsoleBindings {
        &self.console
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn document(&self) -> &Rc<Document> {
        &self.document
    }

    pub fn runtime(&self) -> &Rc<Runtime> {
        &self.runtime
    }

    /// The active interceptor, if one was installed on this page.
    pub fn interceptor(&self) -> Option<Rc<Interceptor>> {
        self.installed.get().cloned()
    }

    /// Dispatches an uncaught exception to the window's error listeners.
    pub fn report_error(&self, event: &ErrorEvent) -> usize {
        self.window.error.dispatch(event)
    }

    /// Dispatches an unhandled rejection to the window's listeners.
    pub fn report_rejection(&self, event: &RejectionEvent) -> usize {
        self.window.unhandled_rejection.dispatch(event)
    }
}
