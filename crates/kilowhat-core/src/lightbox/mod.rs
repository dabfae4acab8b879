//! Touch-capable image lightbox.
//!
//! [`GestureLightbox`] owns one overlay session at a time and moves it
//! through `Closed → Loading → Open → Closing → Closed`. While open it
//! tracks one-finger swipe-to-dismiss and two-finger pinch zoom.
//!
//! The host classifies DOM events (see [`ClickTarget`]) and forwards touch
//! coordinates; all decisions are made here.

mod gesture;
mod view;

use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use tracing::{debug, info, warn};

pub use gesture::{
    DragFeedback, Gesture, Pinch, Swipe, TouchPoint, should_dismiss,
};
pub use view::{ClickTarget, DEFAULT_ALT, ImageSource, ImageTransform, LightboxView};

use crate::{
    config::LightboxOptions,
    error::Result,
    motion::effective_duration,
    platform::{ImageDecoder, Platform, Politeness, TimerId},
    timers::PendingTimers,
};

pub const OPEN_ANNOUNCEMENT: &str = "Image lightbox opened. Press Escape to close.";
pub const CLOSE_ANNOUNCEMENT: &str = "Image lightbox closed.";

/// Overlay session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightboxState {
    #[default]
    Closed,
    Loading,
    Open,
    Closing,
}

type StateObserver = Box<dyn FnMut(LightboxState)>;

/// Visual update applied on the next animation frame.
#[derive(Debug, Clone, Copy)]
enum FrameUpdate {
    Drag(DragFeedback),
    Zoom(f64),
}

struct Inner<V> {
    view: V,
    decoder: Rc<dyn ImageDecoder>,
    platform: Platform,
    timers: Rc<PendingTimers>,
    options: LightboxOptions,
    state: LightboxState,
    current: Option<ImageSource>,
    load_token: u64,
    scale: f64,
    gesture: Gesture,
    frame: Option<TimerId>,
    destroyed: bool,
    changes: Vec<LightboxState>,
    notifying: bool,
    observer: Option<StateObserver>,
}

impl<V: LightboxView> Inner<V> {
    fn set_state(&mut self, state: LightboxState) {
        if self.state != state {
            debug!(from = ?self.state, to = ?state, "lightbox state change");
            self.state = state;
            self.changes.push(state);
        }
    }

    fn cancel_frame(&mut self) {
        if let Some(id) = self.frame.take() {
            self.timers.cancel_frame(id);
        }
    }

    /// Put the image back at its committed scale and full opacity.
    fn snap_back(&mut self) {
        self.cancel_frame();
        self.view.set_transform(ImageTransform::Scale(self.scale));
        self.view.set_opacity(Some(1.0));
    }

    /// Begin the animated close of an open session and return how long the
    /// hide transition takes.
    fn start_closing(&mut self) -> u32 {
        self.cancel_frame();
        self.gesture = Gesture::Idle;

        let duration =
            effective_duration(&*self.platform.environment, self.options.animation_duration);
        self.view.hide(duration);
        self.view.release_focus();
        self.set_state(LightboxState::Closing);
        self.platform
            .announcer
            .announce(CLOSE_ANNOUNCEMENT, Politeness::Polite);
        duration
    }

    /// Drop the session state once the overlay is no longer visible.
    fn clear_session(&mut self) {
        self.view.clear_image();
        self.current = None;
        self.scale = 1.0;
        self.set_state(LightboxState::Closed);
    }

    /// Take any session straight to `Closed` without waiting on timers.
    fn finish_close(&mut self) {
        self.timers.cancel_all();
        self.frame = None;
        self.gesture = Gesture::Idle;

        match self.state {
            LightboxState::Closed => {}
            LightboxState::Loading => {
                self.load_token += 1;
                self.view.set_loading(false);
                self.current = None;
                self.set_state(LightboxState::Closed);
            }
            LightboxState::Open => {
                self.view.hide(0);
                self.view.release_focus();
                self.platform
                    .announcer
                    .announce(CLOSE_ANNOUNCEMENT, Politeness::Polite);
                self.clear_session();
            }
            LightboxState::Closing => self.clear_session(),
        }
    }
}

/// Image lightbox bound to one overlay.
pub struct GestureLightbox<V: LightboxView> {
    inner: Rc<RefCell<Inner<V>>>,
}

impl<V: LightboxView> Clone for GestureLightbox<V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<V: LightboxView + 'static> GestureLightbox<V> {
    pub fn new(
        view: V,
        decoder: Rc<dyn ImageDecoder>,
        platform: Platform,
        options: LightboxOptions,
    ) -> Result<Self> {
        options.validate()?;

        Ok(Self {
            inner: Rc::new(RefCell::new(Inner {
                view,
                decoder,
                timers: PendingTimers::new(platform.scheduler.clone()),
                platform,
                options,
                state: LightboxState::Closed,
                current: None,
                load_token: 0,
                scale: 1.0,
                gesture: Gesture::Idle,
                frame: None,
                destroyed: false,
                changes: Vec::new(),
                notifying: false,
                observer: None,
            })),
        })
    }

    fn from_weak(weak: &Weak<RefCell<Inner<V>>>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    /// Run `f` on the state, then report state changes to the observer
    /// once the borrow is released.
    fn update<R>(&self, f: impl FnOnce(&mut Inner<V>) -> R) -> R {
        let result = f(&mut *self.inner.borrow_mut());
        self.flush_changes();
        result
    }

    fn flush_changes(&self) {
        loop {
            let (mut observer, changes) = {
                let mut inner = self.inner.borrow_mut();
                if inner.notifying {
                    return;
                }
                let changes = std::mem::take(&mut inner.changes);
                match inner.observer.take() {
                    Some(observer) if !changes.is_empty() => {
                        inner.notifying = true;
                        (observer, changes)
                    }
                    observer => {
                        inner.observer = observer;
                        return;
                    }
                }
            };

            for state in changes {
                observer(state);
            }

            let mut inner = self.inner.borrow_mut();
            inner.notifying = false;
            if inner.observer.is_none() {
                inner.observer = Some(observer);
            }
        }
    }

    /// Open `source` in the overlay.
    ///
    /// Sources without a full-resolution URL are ignored. A session that is
    /// already showing is closed first.
    pub fn open(&self, source: &ImageSource) {
        let Some(url) = source.url().map(str::to_owned) else {
            debug!("image has no full-resolution source, ignoring");
            return;
        };

        let started = self.update(|inner| {
            if inner.destroyed {
                return None;
            }
            inner.finish_close();

            inner.load_token += 1;
            inner.current = Some(source.clone());
            inner.view.set_loading(true);
            inner.set_state(LightboxState::Loading);
            Some((inner.load_token, inner.decoder.clone()))
        });

        let Some((token, decoder)) = started else {
            return;
        };

        debug!(%url, "loading full-resolution image");
        let this = Rc::downgrade(&self.inner);
        let loaded = url.clone();
        decoder.decode(
            &url,
            Box::new(move |result| {
                if let Some(lightbox) = Self::from_weak(&this) {
                    lightbox.finish_load(token, &loaded, result);
                }
            }),
        );
    }

    fn finish_load(&self, token: u64, url: &str, result: Result<()>) {
        self.update(|inner| {
            if inner.destroyed || inner.load_token != token || inner.state != LightboxState::Loading {
                debug!(%url, "stale image load ignored");
                return;
            }
            inner.view.set_loading(false);

            match result {
                Ok(()) => {
                    let alt = inner
                        .current
                        .as_ref()
                        .map_or(DEFAULT_ALT, ImageSource::alt_text)
                        .to_owned();
                    inner.view.set_image(url, &alt);
                    inner.scale = 1.0;
                    inner.view.set_transform(ImageTransform::None);
                    inner.view.show();
                    inner.view.trap_focus();
                    inner.set_state(LightboxState::Open);
                    inner
                        .platform
                        .announcer
                        .announce(OPEN_ANNOUNCEMENT, Politeness::Polite);
                    info!(%url, "lightbox opened");
                }
                Err(err) => {
                    warn!(%url, error = %err, "failed to load lightbox image");
                    inner.current = None;
                    inner.set_state(LightboxState::Closed);
                }
            }
        });
    }

    /// Close the overlay. A pending load is abandoned; an open overlay fades
    /// out over the configured animation duration.
    pub fn close(&self) {
        let delay = self.update(|inner| match inner.state {
            LightboxState::Closed | LightboxState::Closing => None,
            LightboxState::Loading => {
                debug!("image load abandoned");
                inner.finish_close();
                None
            }
            LightboxState::Open => Some(inner.start_closing()),
        });

        match delay {
            Some(0) => self.complete_close(),
            Some(delay) => {
                let this = Rc::downgrade(&self.inner);
                let timers = self.inner.borrow().timers.clone();
                timers.set_timeout(delay, move || {
                    if let Some(lightbox) = Self::from_weak(&this) {
                        lightbox.complete_close();
                    }
                });
            }
            None => {}
        }
    }

    fn complete_close(&self) {
        self.update(|inner| {
            if inner.state == LightboxState::Closing {
                inner.clear_session();
                debug!("lightbox closed");
            }
        });
    }

    /// Close synchronously and ignore every later call.
    pub fn destroy(&self) {
        self.update(|inner| {
            if inner.destroyed {
                return;
            }
            inner.finish_close();
            inner.destroyed = true;
            info!("lightbox destroyed");
        });
        self.inner.borrow_mut().observer = None;
    }

    pub fn is_open(&self) -> bool {
        self.inner.borrow().state == LightboxState::Open
    }

    pub fn state(&self) -> LightboxState {
        self.inner.borrow().state
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.borrow().destroyed
    }

    /// Committed zoom factor of the open image.
    pub fn scale(&self) -> f64 {
        self.inner.borrow().scale
    }

    pub fn current_image(&self) -> Option<ImageSource> {
        self.inner.borrow().current.clone()
    }

    pub fn options(&self) -> LightboxOptions {
        self.inner.borrow().options.clone()
    }

    /// Timeouts and animation frames still pending.
    pub fn pending_callbacks(&self) -> usize {
        self.inner.borrow().timers.len()
    }

    /// Observe every state transition, in order.
    pub fn set_state_observer(&self, observer: impl FnMut(LightboxState) + 'static) {
        self.inner.borrow_mut().observer = Some(Box::new(observer));
    }

    /// Handle a click. Returns whether the host should prevent the default
    /// action.
    pub fn handle_click(&self, target: ClickTarget) -> bool {
        if self.is_destroyed() {
            return false;
        }
        match target {
            ClickTarget::SourceImage(source) => {
                if source.url().is_none() {
                    return false;
                }
                self.open(&source);
                true
            }
            ClickTarget::CloseControl => {
                self.close();
                true
            }
            ClickTarget::Backdrop => {
                self.close();
                false
            }
            ClickTarget::Other => false,
        }
    }

    /// Handle a key press. Returns whether the key was consumed.
    pub fn handle_key(&self, key: &str) -> bool {
        if key == "Escape" && self.is_open() {
            self.close();
            true
        } else {
            false
        }
    }

    /// Start of a touch sequence at `now` (ms). Returns whether the host
    /// should prevent the default action, which is the case for pinches.
    pub fn touch_start(&self, touches: &[TouchPoint], now: f64) -> bool {
        self.update(|inner| {
            if inner.state != LightboxState::Open {
                return false;
            }
            match touches {
                [point] => {
                    inner.gesture = Gesture::Swipe(Swipe::begin(*point, now));
                    false
                }
                [a, b] => {
                    inner.gesture = Pinch::begin(*a, *b).map_or(Gesture::Idle, Gesture::Pinch);
                    true
                }
                _ => false,
            }
        })
    }

    /// Touch movement. Returns whether the move was consumed by a gesture.
    pub fn touch_move(&self, touches: &[TouchPoint], now: f64) -> bool {
        let update = self.update(|inner| {
            if inner.state != LightboxState::Open {
                return None;
            }
            let viewport = inner.platform.environment.viewport_height();
            match (&mut inner.gesture, touches) {
                (Gesture::Swipe(swipe), [point]) => swipe.sample(*point, now, viewport).map(FrameUpdate::Drag),
                (Gesture::Pinch(pinch), [a, b]) => Some(FrameUpdate::Zoom(pinch.sample(*a, *b, &inner.options))),
                _ => None,
            }
        });

        match update {
            Some(update) => {
                self.paint(update);
                true
            }
            None => false,
        }
    }

    /// End of a touch sequence: dismiss on a long or fast swipe, otherwise
    /// snap back.
    pub fn touch_end(&self) {
        let dismiss = self.update(|inner| {
            let gesture = std::mem::take(&mut inner.gesture);
            if inner.state != LightboxState::Open {
                return false;
            }
            let viewport = inner.platform.environment.viewport_height();

            match gesture {
                Gesture::Idle => false,
                Gesture::Swipe(swipe) => {
                    let dismiss =
                        should_dismiss(swipe.offset_y(), swipe.velocity_y(), viewport, &inner.options);
                    if !dismiss {
                        inner.snap_back();
                    }
                    dismiss
                }
                Gesture::Pinch(pinch) => {
                    inner.scale = pinch.scale();
                    inner.snap_back();
                    false
                }
            }
        });

        if dismiss {
            debug!("swipe dismissed lightbox");
            self.close();
        }
    }

    /// Replace any queued frame with `update`.
    fn paint(&self, update: FrameUpdate) {
        let mut inner = self.inner.borrow_mut();
        inner.cancel_frame();

        let this = Rc::downgrade(&self.inner);
        let id = inner.timers.request_frame(move || {
            let Some(inner) = this.upgrade() else {
                return;
            };
            let mut inner = inner.borrow_mut();
            inner.frame = None;
            if inner.state != LightboxState::Open {
                return;
            }
            match update {
                FrameUpdate::Drag(feedback) => {
                    inner.view.set_transform(feedback.transform());
                    inner.view.set_opacity(Some(feedback.opacity));
                }
                FrameUpdate::Zoom(scale) => inner.view.set_transform(ImageTransform::Scale(scale)),
            }
        });
        inner.frame = Some(id);
    }
}

impl<V: LightboxView> std::fmt::Debug for GestureLightbox<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("GestureLightbox")
            .field("state", &inner.state)
            .field("scale", &inner.scale)
            .field("destroyed", &inner.destroyed)
            .finish()
    }
}
