//! Listener registry.
//!
//! [`Listeners`] maps event kinds to callbacks kept in registration order.
//! Each element owns one registry and the context owns a global one. A
//! callback returns [`ControlFlow::Stop`] to short-circuit the remaining
//! listeners of the same dispatch.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::message::{Event, EventKind};
use crate::context::Context;

/// Whether dispatch continues after a listener returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlFlow {
    #[default]
    Continue,
    Stop,
}

/// Shared, re-entrancy-checked callback.
pub type Callback = Rc<RefCell<dyn FnMut(&mut Context, &Event) -> ControlFlow>>;

/// Handle returned by registration, used to remove a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

fn next_listener_id() -> ListenerId {
    static NEXT: AtomicU64 = AtomicU64::new(1);
    ListenerId(NEXT.fetch_add(1, Ordering::Relaxed))
}

#[derive(Clone)]
struct Entry {
    id: ListenerId,
    kind: EventKind,
    callback: Callback,
}

/// Ordered listeners keyed by event kind.
#[derive(Clone, Default)]
pub struct Listeners {
    entries: Vec<Entry>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for `kind`. Listeners run in registration order.
    pub fn add<F>(&mut self, kind: EventKind, callback: F) -> ListenerId
    where
        F: FnMut(&mut Context, &Event) -> ControlFlow + 'static,
    {
        let id = next_listener_id();
        self.entries.push(Entry { id, kind, callback: Rc::new(RefCell::new(callback)) });
        id
    }

    /// Remove a listener. Returns `false` if it was not registered here.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Snapshot of the callbacks for `kind`, so that listeners may be added
    /// or removed while the snapshot is being invoked.
    pub fn for_kind(&self, kind: EventKind) -> Vec<Callback> {
        self.entries
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| Rc::clone(&e.callback))
            .collect()
    }

    pub fn has(&self, kind: EventKind) -> bool {
        self.entries.iter().any(|e| e.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.iter().map(|e| (e.id, e.kind))).finish()
    }
}

/// Invoke `callbacks` in order until one stops the dispatch.
///
/// A callback that is already running further up the stack is skipped
/// instead of being re-entered. Returns [`ControlFlow::Stop`] if any
/// callback stopped.
pub fn invoke(callbacks: &[Callback], ctx: &mut Context, event: &Event) -> ControlFlow {
    for callback in callbacks {
        let Ok(mut f) = callback.try_borrow_mut() else {
            log::trace!(target: "gilt_gui::event", "skipping re-entered listener for {:?}", event.kind);
            continue;
        };
        if f(ctx, event) == ControlFlow::Stop {
            return ControlFlow::Stop;
        }
    }
    ControlFlow::Continue
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContextConfig;

    fn event(kind: EventKind) -> Event {
        Event::new(kind, None)
    }

    #[test]
    fn new_registry_is_empty() {
        let listeners = Listeners::new();
        assert!(listeners.is_empty());
        assert!(!listeners.has(EventKind::Click));
    }

    #[test]
    fn add_and_remove() {
        let mut listeners = Listeners::new();
        let a = listeners.add(EventKind::Click, |_, _| ControlFlow::Continue);
        let b = listeners.add(EventKind::Move, |_, _| ControlFlow::Continue);
        assert_ne!(a, b);
        assert_eq!(listeners.len(), 2);
        assert_eq!(listeners.for_kind(EventKind::Click).len(), 1);
        assert!(listeners.remove(a));
        assert!(!listeners.remove(a));
        assert!(!listeners.has(EventKind::Click));
    }

    #[test]
    fn invoke_runs_in_order_and_stops() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut listeners = Listeners::new();
        for (name, flow) in [("first", ControlFlow::Continue), ("second", ControlFlow::Stop), ("third", ControlFlow::Continue)] {
            let log = Rc::clone(&log);
            listeners.add(EventKind::KeyDown, move |_, _| {
                log.borrow_mut().push(name);
                flow
            });
        }
        let mut ctx = Context::new(ContextConfig::default());
        let flow = invoke(&listeners.for_kind(EventKind::KeyDown), &mut ctx, &event(EventKind::KeyDown));
        assert_eq!(flow, ControlFlow::Stop);
        assert_eq!(*log.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn invoke_skips_other_kinds() {
        let hits = Rc::new(RefCell::new(0));
        let mut listeners = Listeners::new();
        let counter = Rc::clone(&hits);
        listeners.add(EventKind::Focus, move |_, _| {
            *counter.borrow_mut() += 1;
            ControlFlow::Continue
        });
        let mut ctx = Context::new(ContextConfig::default());
        let flow = invoke(&listeners.for_kind(EventKind::Blur), &mut ctx, &event(EventKind::Blur));
        assert_eq!(flow, ControlFlow::Continue);
        assert_eq!(*hits.borrow(), 0);
    }
}
