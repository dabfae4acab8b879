//! Deterministic host implementations for tests and headless use.
//!
//! [`VirtualScheduler`] keeps a virtual clock; nothing runs until the test
//! calls [`VirtualScheduler::advance`] or [`VirtualScheduler::run_frames`].

use std::{
    cell::{Cell, RefCell},
    collections::{BTreeMap, HashMap},
    rc::Rc,
};

use crate::{
    error::UiError,
    lightbox::{ImageTransform, LightboxView},
    platform::{
        Announcer, DecodeCallback, Environment, ImageDecoder, Politeness, Scheduler, TimerId,
    },
    progress::{ProgressSurface, ScrollMetrics},
    typewriter::DisplaySurface,
};

#[derive(Default)]
struct Queue {
    now: u64,
    next_id: u64,
    /// Keyed by (due time, id) so equal deadlines fire in scheduling order.
    timeouts: BTreeMap<(u64, u64), Box<dyn FnOnce()>>,
    frames: BTreeMap<u64, Box<dyn FnOnce()>>,
}

/// Scheduler driven by a virtual clock.
#[derive(Default)]
pub struct VirtualScheduler {
    queue: RefCell<Queue>,
}

impl VirtualScheduler {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Current virtual time in milliseconds.
    pub fn now(&self) -> u64 {
        self.queue.borrow().now
    }

    /// Move the clock forward, firing every timeout that falls due on the way,
    /// including timeouts scheduled by callbacks that run during the advance.
    pub fn advance(&self, ms: u64) {
        let target = self.now() + ms;
        loop {
            let next = {
                let mut queue = self.queue.borrow_mut();
                match queue.timeouts.keys().next().copied() {
                    Some(key) if key.0 <= target => {
                        queue.now = key.0;
                        queue.timeouts.remove(&key)
                    }
                    _ => None,
                }
            };

            match next {
                Some(callback) => callback(),
                None => break,
            }
        }
        self.queue.borrow_mut().now = target;
    }

    /// Fire only the earliest pending timeout, moving the clock to its due
    /// time. Returns false when nothing is pending. Use this instead of
    /// [`VirtualScheduler::advance`] when callbacks keep re-arming zero-delay
    /// timeouts.
    pub fn run_next(&self) -> bool {
        let next = {
            let mut queue = self.queue.borrow_mut();
            let key = queue.timeouts.keys().next().copied();
            key.and_then(|key| {
                queue.now = key.0;
                queue.timeouts.remove(&key)
            })
        };

        match next {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }

    /// Run the frames requested so far. Frames requested while running wait
    /// for the next call. Returns how many ran.
    pub fn run_frames(&self) -> usize {
        let frames = std::mem::take(&mut self.queue.borrow_mut().frames);
        let count = frames.len();
        for callback in frames.into_values() {
            callback();
        }
        count
    }

    pub fn pending_timeouts(&self) -> usize {
        self.queue.borrow().timeouts.len()
    }

    pub fn pending_frames(&self) -> usize {
        self.queue.borrow().frames.len()
    }

    fn next_id(queue: &mut Queue) -> u64 {
        queue.next_id += 1;
        queue.next_id
    }
}

impl Scheduler for VirtualScheduler {
    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> TimerId {
        let mut queue = self.queue.borrow_mut();
        let id = Self::next_id(&mut queue);
        let due = queue.now + u64::from(delay_ms);
        queue.timeouts.insert((due, id), callback);
        TimerId(id)
    }

    fn clear_timeout(&self, id: TimerId) {
        self.queue
            .borrow_mut()
            .timeouts
            .retain(|(_, timer), _| *timer != id.0);
    }

    fn request_frame(&self, callback: Box<dyn FnOnce()>) -> TimerId {
        let mut queue = self.queue.borrow_mut();
        let id = Self::next_id(&mut queue);
        queue.frames.insert(id, callback);
        TimerId(id)
    }

    fn cancel_frame(&self, id: TimerId) {
        self.queue.borrow_mut().frames.remove(&id.0);
    }
}

/// Environment with fixed, adjustable answers.
pub struct StaticEnvironment {
    reduced_motion: Cell<bool>,
    screen_reader: Cell<bool>,
    viewport_height: Cell<f64>,
    seed: Cell<u64>,
}

impl Default for StaticEnvironment {
    fn default() -> Self {
        Self {
            reduced_motion: Cell::new(false),
            screen_reader: Cell::new(false),
            viewport_height: Cell::new(800.0),
            seed: Cell::new(0x9E37_79B9_7F4A_7C15),
        }
    }
}

impl StaticEnvironment {
    pub fn with_reduced_motion(self, enabled: bool) -> Self {
        self.reduced_motion.set(enabled);
        self
    }

    pub fn with_screen_reader(self, active: bool) -> Self {
        self.screen_reader.set(active);
        self
    }

    pub fn with_viewport_height(self, height: f64) -> Self {
        self.viewport_height.set(height);
        self
    }

    pub fn with_seed(self, seed: u64) -> Self {
        self.seed.set(seed.max(1));
        self
    }

    pub fn set_reduced_motion(&self, enabled: bool) {
        self.reduced_motion.set(enabled);
    }
}

impl Environment for StaticEnvironment {
    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion.get()
    }

    fn screen_reader_hint(&self) -> bool {
        self.screen_reader.get()
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height.get()
    }

    fn random(&self) -> f64 {
        // xorshift64*
        let mut x = self.seed.get();
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.seed.set(x);
        let bits = x.wrapping_mul(0x2545_F491_4F6C_DD1D) >> 11;
        bits as f64 / (1u64 << 53) as f64
    }
}

/// Announcer that keeps every message.
#[derive(Default)]
pub struct RecordingAnnouncer {
    messages: RefCell<Vec<(String, Politeness)>>,
}

impl RecordingAnnouncer {
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .borrow()
            .iter()
            .map(|(message, _)| message.clone())
            .collect()
    }
}

impl Announcer for RecordingAnnouncer {
    fn announce(&self, message: &str, politeness: Politeness) {
        self.messages
            .borrow_mut()
            .push((message.to_string(), politeness));
    }
}

/// Decoder whose outcomes are scripted per URL and delivered through a
/// [`VirtualScheduler`]. Unknown URLs fail immediately on the next tick.
pub struct ScriptedDecoder {
    scheduler: Rc<VirtualScheduler>,
    outcomes: RefCell<HashMap<String, (u32, bool)>>,
    requests: RefCell<Vec<String>>,
}

impl ScriptedDecoder {
    pub fn new(scheduler: Rc<VirtualScheduler>) -> Self {
        Self {
            scheduler,
            outcomes: RefCell::new(HashMap::new()),
            requests: RefCell::new(Vec::new()),
        }
    }

    /// `url` decodes successfully after `delay_ms`.
    pub fn succeed(&self, url: &str, delay_ms: u32) {
        self.outcomes
            .borrow_mut()
            .insert(url.to_string(), (delay_ms, true));
    }

    /// `url` fails to decode after `delay_ms`.
    pub fn fail(&self, url: &str, delay_ms: u32) {
        self.outcomes
            .borrow_mut()
            .insert(url.to_string(), (delay_ms, false));
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl ImageDecoder for ScriptedDecoder {
    fn decode(&self, url: &str, done: DecodeCallback) {
        self.requests.borrow_mut().push(url.to_string());
        let (delay, ok) = self
            .outcomes
            .borrow()
            .get(url)
            .copied()
            .unwrap_or((0, false));
        let url = url.to_string();
        self.scheduler.set_timeout(
            delay,
            Box::new(move || {
                if ok {
                    done(Ok(()))
                } else {
                    done(Err(UiError::image_load(url)))
                }
            }),
        );
    }
}

/// One call made on a [`RecordingView`].
#[derive(Debug, Clone, PartialEq)]
pub enum ViewCall {
    SetLoading(bool),
    Show,
    Hide(u32),
    SetImage { src: String, alt: String },
    ClearImage,
    SetTransform(ImageTransform),
    SetOpacity(Option<f64>),
    TrapFocus,
    ReleaseFocus,
}

/// Lightbox overlay that records calls and keeps the resulting state.
#[derive(Default)]
pub struct RecordingView {
    calls: RefCell<Vec<ViewCall>>,
    image: RefCell<Option<(String, String)>>,
    active: Cell<bool>,
    loading: Cell<bool>,
    focus_trapped: Cell<bool>,
    transform: Cell<Option<ImageTransform>>,
    opacity: Cell<Option<f64>>,
}

impl RecordingView {
    pub fn calls(&self) -> Vec<ViewCall> {
        self.calls.borrow().clone()
    }

    pub fn image_src(&self) -> Option<String> {
        self.image.borrow().as_ref().map(|(src, _)| src.clone())
    }

    pub fn image_alt(&self) -> Option<String> {
        self.image.borrow().as_ref().map(|(_, alt)| alt.clone())
    }

    /// Whether a source was ever assigned to the enlarged image.
    pub fn ever_set_image(&self) -> bool {
        self.calls
            .borrow()
            .iter()
            .any(|call| matches!(call, ViewCall::SetImage { .. }))
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }

    pub fn focus_trapped(&self) -> bool {
        self.focus_trapped.get()
    }

    pub fn transform(&self) -> ImageTransform {
        self.transform.get().unwrap_or(ImageTransform::None)
    }

    pub fn opacity(&self) -> Option<f64> {
        self.opacity.get()
    }

    /// Transition length of the most recent hide.
    pub fn last_hide(&self) -> Option<u32> {
        self.calls.borrow().iter().rev().find_map(|call| match call {
            ViewCall::Hide(ms) => Some(*ms),
            _ => None,
        })
    }

    fn record(&self, call: ViewCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl LightboxView for RecordingView {
    fn set_loading(&self, loading: bool) {
        self.loading.set(loading);
        self.record(ViewCall::SetLoading(loading));
    }

    fn show(&self) {
        self.active.set(true);
        self.record(ViewCall::Show);
    }

    fn hide(&self, transition_ms: u32) {
        self.active.set(false);
        self.transform.set(None);
        self.opacity.set(None);
        self.record(ViewCall::Hide(transition_ms));
    }

    fn set_image(&self, src: &str, alt: &str) {
        *self.image.borrow_mut() = Some((src.to_string(), alt.to_string()));
        self.record(ViewCall::SetImage {
            src: src.to_string(),
            alt: alt.to_string(),
        });
    }

    fn clear_image(&self) {
        *self.image.borrow_mut() = None;
        self.record(ViewCall::ClearImage);
    }

    fn set_transform(&self, transform: ImageTransform) {
        self.transform.set(Some(transform));
        self.record(ViewCall::SetTransform(transform));
    }

    fn set_opacity(&self, opacity: Option<f64>) {
        self.opacity.set(opacity);
        self.record(ViewCall::SetOpacity(opacity));
    }

    fn trap_focus(&self) {
        self.focus_trapped.set(true);
        self.record(ViewCall::TrapFocus);
    }

    fn release_focus(&self) {
        self.focus_trapped.set(false);
        self.record(ViewCall::ReleaseFocus);
    }
}

/// Typewriter surface that keeps its text, cursor and attributes.
#[derive(Default)]
pub struct RecordingSurface {
    text: RefCell<String>,
    cursor: Cell<bool>,
    renders: RefCell<Vec<String>>,
    attributes: RefCell<BTreeMap<String, String>>,
}

impl RecordingSurface {
    pub fn text(&self) -> String {
        self.text.borrow().clone()
    }

    pub fn cursor_visible(&self) -> bool {
        self.cursor.get()
    }

    /// Every text passed to `render`, in order.
    pub fn renders(&self) -> Vec<String> {
        self.renders.borrow().clone()
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.borrow().get(name).cloned()
    }
}

impl DisplaySurface for RecordingSurface {
    fn render(&self, text: &str, show_cursor: bool) {
        *self.text.borrow_mut() = text.to_string();
        self.cursor.set(show_cursor);
        self.renders.borrow_mut().push(text.to_string());
    }

    fn clear(&self) {
        self.text.borrow_mut().clear();
        self.cursor.set(false);
    }

    fn set_attribute(&self, name: &str, value: &str) {
        self.attributes
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
    }

    fn remove_attribute(&self, name: &str) {
        self.attributes.borrow_mut().remove(name);
    }
}

/// Progress bar over a fake page.
pub struct RecordingProgress {
    metrics: Cell<ScrollMetrics>,
    widths: RefCell<Vec<f64>>,
    removed: Cell<bool>,
}

impl RecordingProgress {
    pub fn new(scroll_top: f64, viewport_height: f64, document_height: f64) -> Self {
        Self {
            metrics: Cell::new(ScrollMetrics {
                scroll_top,
                viewport_height,
                document_height,
            }),
            widths: RefCell::new(Vec::new()),
            removed: Cell::new(false),
        }
    }

    pub fn scroll_to(&self, scroll_top: f64) {
        let mut metrics = self.metrics.get();
        metrics.scroll_top = scroll_top;
        self.metrics.set(metrics);
    }

    /// Every width written, in order.
    pub fn widths(&self) -> Vec<f64> {
        self.widths.borrow().clone()
    }

    pub fn is_removed(&self) -> bool {
        self.removed.get()
    }
}

impl ProgressSurface for RecordingProgress {
    fn metrics(&self) -> ScrollMetrics {
        self.metrics.get()
    }

    fn set_progress(&self, percent: f64) {
        self.widths.borrow_mut().push(percent);
    }

    fn remove(&self) {
        self.removed.set(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeouts_fire_in_deadline_order() {
        let scheduler = VirtualScheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for (delay, label) in [(30, "c"), (10, "a"), (20, "b")] {
            let log = log.clone();
            scheduler.set_timeout(delay, Box::new(move || log.borrow_mut().push(label)));
        }

        scheduler.advance(25);
        assert_eq!(*log.borrow(), vec!["a", "b"]);
        assert_eq!(scheduler.now(), 25);

        scheduler.advance(5);
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_nested_timeouts_fire_within_advance() {
        let scheduler = VirtualScheduler::new();
        let fired = Rc::new(Cell::new(0));

        let inner_scheduler = scheduler.clone();
        let inner_fired = fired.clone();
        scheduler.set_timeout(
            10,
            Box::new(move || {
                let fired = inner_fired.clone();
                inner_scheduler.set_timeout(10, Box::new(move || fired.set(fired.get() + 1)));
            }),
        );

        scheduler.advance(20);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_clear_timeout() {
        let scheduler = VirtualScheduler::new();
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        let id = scheduler.set_timeout(5, Box::new(move || flag.set(true)));

        scheduler.clear_timeout(id);
        scheduler.advance(10);
        assert!(!fired.get());
        assert_eq!(scheduler.pending_timeouts(), 0);
    }

    #[test]
    fn test_frames_run_on_demand() {
        let scheduler = VirtualScheduler::new();
        let fired = Rc::new(Cell::new(0));
        let counter = fired.clone();
        scheduler.request_frame(Box::new(move || counter.set(counter.get() + 1)));
        let cancelled_ran = Rc::new(Cell::new(false));
        let flag = cancelled_ran.clone();
        let cancelled = scheduler.request_frame(Box::new(move || flag.set(true)));
        scheduler.cancel_frame(cancelled);

        assert_eq!(scheduler.run_frames(), 1);
        assert_eq!(fired.get(), 1);
        assert!(!cancelled_ran.get());
        assert_eq!(scheduler.pending_frames(), 0);
    }

    #[test]
    fn test_random_in_unit_interval() {
        let env = StaticEnvironment::default().with_seed(42);
        for _ in 0..1000 {
            let value = env.random();
            assert!((0.0..1.0).contains(&value));
        }
    }
}
