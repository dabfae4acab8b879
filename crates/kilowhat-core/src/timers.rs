//! Per-instance registry of scheduled callbacks.
//!
//! A component routes every timeout and animation frame through its own
//! `PendingTimers` so teardown can cancel all of them at once, including
//! callbacks that were scheduled by other callbacks.

use std::{
    cell::{Cell, RefCell},
    collections::BTreeSet,
    rc::{Rc, Weak},
};

use crate::platform::{Scheduler, TimerId};

pub struct PendingTimers {
    scheduler: Rc<dyn Scheduler>,
    timeouts: RefCell<BTreeSet<TimerId>>,
    frames: RefCell<BTreeSet<TimerId>>,
}

impl PendingTimers {
    pub fn new(scheduler: Rc<dyn Scheduler>) -> Rc<Self> {
        Rc::new(Self {
            scheduler,
            timeouts: RefCell::new(BTreeSet::new()),
            frames: RefCell::new(BTreeSet::new()),
        })
    }

    /// Schedule a timeout tracked by this registry. The id is forgotten once
    /// the callback fires.
    pub fn set_timeout(self: &Rc<Self>, delay_ms: u32, callback: impl FnOnce() + 'static) -> TimerId {
        let own_id = Rc::new(Cell::new(None));
        let registry = Rc::downgrade(self);
        let slot = own_id.clone();

        let id = self.scheduler.set_timeout(
            delay_ms,
            Box::new(move || {
                forget(&registry, &slot, |timers| &timers.timeouts);
                callback();
            }),
        );

        own_id.set(Some(id));
        self.timeouts.borrow_mut().insert(id);
        id
    }

    /// Request an animation frame tracked by this registry.
    pub fn request_frame(self: &Rc<Self>, callback: impl FnOnce() + 'static) -> TimerId {
        let own_id = Rc::new(Cell::new(None));
        let registry = Rc::downgrade(self);
        let slot = own_id.clone();

        let id = self.scheduler.request_frame(Box::new(move || {
            forget(&registry, &slot, |timers| &timers.frames);
            callback();
        }));

        own_id.set(Some(id));
        self.frames.borrow_mut().insert(id);
        id
    }

    pub fn clear_timeout(&self, id: TimerId) {
        if self.timeouts.borrow_mut().remove(&id) {
            self.scheduler.clear_timeout(id);
        }
    }

    pub fn cancel_frame(&self, id: TimerId) {
        if self.frames.borrow_mut().remove(&id) {
            self.scheduler.cancel_frame(id);
        }
    }

    /// Cancel everything still pending.
    pub fn cancel_all(&self) {
        let timeouts = std::mem::take(&mut *self.timeouts.borrow_mut());
        for id in timeouts {
            self.scheduler.clear_timeout(id);
        }

        let frames = std::mem::take(&mut *self.frames.borrow_mut());
        for id in frames {
            self.scheduler.cancel_frame(id);
        }
    }

    /// Number of timeouts and frames not yet fired or cancelled.
    pub fn len(&self) -> usize {
        self.timeouts.borrow().len() + self.frames.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn forget(
    registry: &Weak<PendingTimers>,
    slot: &Cell<Option<TimerId>>,
    set: impl Fn(&PendingTimers) -> &RefCell<BTreeSet<TimerId>>,
) {
    if let (Some(timers), Some(id)) = (registry.upgrade(), slot.get()) {
        set(&timers).borrow_mut().remove(&id);
    }
}
