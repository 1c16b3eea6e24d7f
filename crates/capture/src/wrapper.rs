//! Console method decoration.
//!
//! The original functions are captured once into an [`OriginalMethodTable`].
//! Each [`DecoratedMethod`] pairs an original with its decorated form, which
//! always runs the original first and then hands the arguments to a relay
//! callback.

use std::collections::HashMap;
use std::rc::Rc;

use consolerelay_protocol::Level;

use crate::page::{ConsoleBindings, ConsoleFn};
use crate::value::Value;

/// Console functions as they were before interception.
///
/// Immutable after capture, so status output routed through it never reaches
/// a decorated binding, whatever the page reassigns later.
pub struct OriginalMethodTable {
    methods: HashMap<Level, ConsoleFn>,
}

impl OriginalMethodTable {
    /// Snapshots the current binding of every category.
    pub fn capture(console: &ConsoleBindings) -> Self {
        let methods = Level::ALL
            .into_iter()
            .map(|level| (level, console.get(level)))
            .collect();
        Self { methods }
    }

    pub fn get(&self, level: Level) -> &ConsoleFn {
        &self.methods[&level]
    }

    /// Invokes the original function for `level`.
    pub fn call(&self, level: Level, args: &[Value]) {
        (self.methods[&level])(args);
    }
}

/// An original console function together with its decorated replacement.
pub struct DecoratedMethod {
    level: Level,
    original: ConsoleFn,
    decorated: ConsoleFn,
}

impl DecoratedMethod {
    /// Builds the decorated form of `original`.
    ///
    /// `relay` runs after the original returns and receives the same
    /// arguments. It must not fail; the decorated function has no error path.
    pub fn new(
        level: Level,
        original: ConsoleFn,
        relay: impl Fn(Level, &[Value]) + 'static,
    ) -> Self {
        let inner = Rc::clone(&original);
        let decorated: ConsoleFn = Rc::new(move |args: &[Value]| {
            inner(args);
            relay(level, args);
        });
        Self {
            level,
            original,
            decorated,
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn original(&self) -> &ConsoleFn {
        &self.original
    }

    pub fn decorated(&self) -> &ConsoleFn {
        &self.decorated
    }

    /// Installs the decorated form into the console binding for its level.
    pub fn install(&self, console: &ConsoleBindings) {
        console.set(self.level, Rc::clone(&self.decorated));
    }

    /// Whether the console currently dispatches to this decorated form.
    pub fn is_installed(&self, console: &ConsoleBindings) -> bool {
        Rc::ptr_eq(&console.get(self.level), &self.decorated)
    }
}
