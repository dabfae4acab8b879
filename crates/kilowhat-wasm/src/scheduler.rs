//! Timers and animation frames backed by gloo.

use std::{
    cell::RefCell,
    collections::HashMap,
    rc::{Rc, Weak},
};

use gloo_render::{AnimationFrame, request_animation_frame};
use gloo_timers::callback::Timeout;
use kilowhat_core::{Scheduler, TimerId};

#[derive(Default)]
struct Handles {
    next_id: u64,
    timeouts: HashMap<u64, Timeout>,
    frames: HashMap<u64, AnimationFrame>,
    // Handles of callbacks that already fired. Dropped on the next firing so a
    // handle never goes away while its own callback is on the stack.
    retired_timeouts: Vec<Timeout>,
    retired_frames: Vec<AnimationFrame>,
}

impl Handles {
    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn retire_timeout(&mut self, id: u64) {
        self.retired_timeouts.clear();
        self.retired_frames.clear();
        if let Some(timeout) = self.timeouts.remove(&id) {
            self.retired_timeouts.push(timeout);
        }
    }

    fn retire_frame(&mut self, id: u64) {
        self.retired_timeouts.clear();
        self.retired_frames.clear();
        if let Some(frame) = self.frames.remove(&id) {
            self.retired_frames.push(frame);
        }
    }
}

/// [`Scheduler`] on `setTimeout` and `requestAnimationFrame`.
///
/// Dropping the scheduler cancels everything still pending.
#[derive(Default)]
pub struct BrowserScheduler {
    handles: Rc<RefCell<Handles>>,
}

impl BrowserScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timeouts and frames that have not fired or been cancelled.
    pub fn pending(&self) -> usize {
        let handles = self.handles.borrow();
        handles.timeouts.len() + handles.frames.len()
    }
}

fn fired(handles: &Weak<RefCell<Handles>>, retire: impl FnOnce(&mut Handles)) {
    if let Some(handles) = handles.upgrade() {
        retire(&mut handles.borrow_mut());
    }
}

impl Scheduler for BrowserScheduler {
    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> TimerId {
        let id = self.handles.borrow_mut().allocate();
        let handles = Rc::downgrade(&self.handles);
        let timeout = Timeout::new(delay_ms, move || {
            fired(&handles, |h| h.retire_timeout(id));
            callback();
        });
        self.handles.borrow_mut().timeouts.insert(id, timeout);
        TimerId(id)
    }

    fn clear_timeout(&self, id: TimerId) {
        // Dropping a Timeout clears it.
        let removed = self.handles.borrow_mut().timeouts.remove(&id.0);
        drop(removed);
    }

    fn request_frame(&self, callback: Box<dyn FnOnce()>) -> TimerId {
        let id = self.handles.borrow_mut().allocate();
        let handles = Rc::downgrade(&self.handles);
        let frame = request_animation_frame(move |_timestamp| {
            fired(&handles, |h| h.retire_frame(id));
            callback();
        });
        self.handles.borrow_mut().frames.insert(id, frame);
        TimerId(id)
    }

    fn cancel_frame(&self, id: TimerId) {
        let removed = self.handles.borrow_mut().frames.remove(&id.0);
        drop(removed);
    }
}
