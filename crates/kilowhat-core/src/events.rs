//! Event listener tracking with guaranteed cleanup.
//!
//! [`EventRegistry`] attaches listeners through an [`EventHost`] and keeps
//! the exact `(target, event, handler, options)` tuple of each one, so a
//! component can remove everything it attached when it is torn down.
//!
//! # Example
//!
//! ```ignore
//! let events = EventRegistry::new(DomEvents);
//! let handle = events.register(window, "resize", handler, ListenerOptions::default());
//!
//! handle.unregister(); // removes just this listener
//! events.cleanup_all(); // removes everything else
//! ```

use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    rc::{Rc, Weak},
};

use tracing::debug;

/// Options forwarded to `addEventListener`/`removeEventListener`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerOptions {
    pub capture: bool,
    pub once: bool,
    /// `None` leaves the browser default in place.
    pub passive: Option<bool>,
}

impl ListenerOptions {
    /// Listener that may call `preventDefault`.
    pub fn active() -> Self {
        Self {
            passive: Some(false),
            ..Self::default()
        }
    }

    /// Listener that promises not to call `preventDefault`.
    pub fn passive() -> Self {
        Self {
            passive: Some(true),
            ..Self::default()
        }
    }
}

/// Attaches and detaches listeners on some event system.
pub trait EventHost {
    type Target;
    type Handler;

    fn attach(&self, target: &Self::Target, event: &str, handler: &Self::Handler, options: ListenerOptions);

    fn detach(&self, target: &Self::Target, event: &str, handler: &Self::Handler, options: ListenerOptions);
}

struct TrackedListener<H: EventHost> {
    target: H::Target,
    event: String,
    handler: H::Handler,
    options: ListenerOptions,
}

impl<H: EventHost> TrackedListener<H> {
    fn detach(&self, host: &H) {
        host.detach(&self.target, &self.event, &self.handler, self.options);
    }
}

type Listeners<H> = RefCell<BTreeMap<u64, TrackedListener<H>>>;

/// Registry of listeners owned by one component instance.
pub struct EventRegistry<H: EventHost> {
    host: Rc<H>,
    listeners: Rc<Listeners<H>>,
    next_id: Cell<u64>,
}

impl<H: EventHost + 'static> EventRegistry<H> {
    pub fn new(host: H) -> Self {
        Self {
            host: Rc::new(host),
            listeners: Rc::new(RefCell::new(BTreeMap::new())),
            next_id: Cell::new(0),
        }
    }

    /// Attach a listener now and track it.
    ///
    /// The returned handle removes exactly this listener; using it after the
    /// listener is gone (individually or through [`cleanup_all`]) does nothing.
    ///
    /// [`cleanup_all`]: Self::cleanup_all
    pub fn register(
        &self,
        target: H::Target,
        event: impl Into<String>,
        handler: H::Handler,
        options: ListenerOptions,
    ) -> ListenerHandle {
        let event = event.into();
        self.host.attach(&target, &event, &handler, options);

        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.listeners.borrow_mut().insert(
            id,
            TrackedListener {
                target,
                event,
                handler,
                options,
            },
        );

        let host = Rc::downgrade(&self.host);
        let listeners = Rc::downgrade(&self.listeners);
        ListenerHandle::new(move || remove_one(&host, &listeners, id))
    }

    /// Detach every tracked listener and forget them. Safe to repeat.
    pub fn cleanup_all(&self) {
        let listeners = std::mem::take(&mut *self.listeners.borrow_mut());
        if !listeners.is_empty() {
            debug!(count = listeners.len(), "removing tracked listeners");
        }
        for listener in listeners.values() {
            listener.detach(&self.host);
        }
    }

    /// Number of listeners currently attached through this registry.
    pub fn active_listeners(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl<H: EventHost> Drop for EventRegistry<H> {
    fn drop(&mut self) {
        let listeners = std::mem::take(&mut *self.listeners.borrow_mut());
        for listener in listeners.values() {
            listener.detach(&self.host);
        }
    }
}

fn remove_one<H: EventHost>(host: &Weak<H>, listeners: &Weak<Listeners<H>>, id: u64) {
    let (Some(host), Some(listeners)) = (host.upgrade(), listeners.upgrade()) else {
        return;
    };
    // Release the borrow before calling into the host.
    let removed = listeners.borrow_mut().remove(&id);
    if let Some(listener) = removed {
        listener.detach(&host);
    }
}

/// Removes one registered listener.
pub struct ListenerHandle {
    remove: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl ListenerHandle {
    fn new(remove: impl FnOnce() + 'static) -> Self {
        Self {
            remove: RefCell::new(Some(Box::new(remove))),
        }
    }

    /// Remove the listener. Only the first call has an effect.
    pub fn unregister(&self) {
        let remove = self.remove.borrow_mut().take();
        if let Some(remove) = remove {
            remove();
        }
    }
}

impl std::fmt::Debug for ListenerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerHandle")
            .field("armed", &self.remove.borrow().is_some())
            .finish()
    }
}
