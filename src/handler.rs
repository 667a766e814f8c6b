//! Event handlers and the callback registry.
//!
//! DESIGN
//! ======
//! The registry is an ordered list of `(name, handler)` pairs rather than a
//! map: subscription order on the wire must follow registration order, and
//! the set is small. Re-registering a name replaces the handler in place so
//! the original position is kept. Dispatch checks the wildcard slot first;
//! when a wildcard handler exists, name-specific handlers are never invoked.

use std::sync::Arc;

use serde_json::Value;

/// Reserved event name that receives every event regardless of its name.
pub const WILDCARD: &str = "*";

/// A callback for event payloads.
///
/// Handlers run on the task driving [`Client::run`](crate::Client::run) and
/// must be nonblocking or delegate work elsewhere. Any
/// `Fn(&Value) + Send + Sync` closure is a handler.
pub trait EventHandler: Send + Sync {
    fn handle(&self, payload: &Value);
}

impl<F> EventHandler for F
where
    F: Fn(&Value) + Send + Sync,
{
    fn handle(&self, payload: &Value) {
        self(payload);
    }
}

/// Ordered event-name → handler mapping with a wildcard slot.
#[derive(Default)]
pub(crate) struct Registry {
    entries: Vec<(String, Arc<dyn EventHandler>)>,
}

impl Registry {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Register or replace the handler for `name`. Replacement keeps the
    /// original registration position.
    pub fn insert(&mut self, name: impl Into<String>, handler: Arc<dyn EventHandler>) {
        let name = name.into();
        if let Some(entry) = self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            entry.1 = handler;
        } else {
            self.entries.push((name, handler));
        }
    }

    /// Registered names in registration order. Names are unique.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Resolve the handler for an event: the wildcard when registered,
    /// otherwise the exact name, otherwise none.
    pub fn handler_for(&self, name: &str) -> Option<Arc<dyn EventHandler>> {
        self.get(WILDCARD).or_else(|| self.get(name))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn get(&self, name: &str) -> Option<Arc<dyn EventHandler>> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.as_str() == name)
            .map(|(_, handler)| Arc::clone(handler))
    }
}

#[cfg(test)]
#[path = "handler_test.rs"]
mod tests;
