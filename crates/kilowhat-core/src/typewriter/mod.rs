//! Rotating tagline typewriter.
//!
//! A [`Typewriter`] shuffles its phrases once, then types, holds, erases and
//! pauses on each in turn until it is paused, stopped or destroyed. Every
//! pending step is scheduled through the instance's own [`PendingTimers`],
//! and every step re-checks the destroyed/paused flags and the run epoch, so
//! a callback left over from an earlier run never touches the surface.

mod cycle;
mod surface;

use std::{cell::RefCell, rc::Rc};

use serde::Serialize;
use tracing::{debug, info};

pub use cycle::{Cycle, CycleEvent, Phase, Step, Timings};
pub use surface::{ARIA_ATTRIBUTES, CURSOR, DisplaySurface};

use crate::{
    config::TypewriterOptions,
    error::Result,
    motion::effective_duration,
    platform::{Platform, Politeness, TimerId},
    shuffle::fisher_yates,
    timers::PendingTimers,
};

type PhraseCallback = Box<dyn FnMut(&str, usize)>;
type CycleCallback = Box<dyn FnMut()>;

/// Snapshot returned by [`Typewriter::state`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypewriterState {
    pub current_phrase: String,
    pub current_index: usize,
    pub is_playing: bool,
    pub is_paused: bool,
}

struct Inner<S> {
    surface: S,
    platform: Platform,
    timers: Rc<PendingTimers>,
    options: TypewriterOptions,
    cycle: Cycle,
    paused: bool,
    hidden_pause: bool,
    destroyed: bool,
    epoch: u64,
    next_step: Option<TimerId>,
    on_phrase_complete: Option<PhraseCallback>,
    on_cycle_complete: Option<CycleCallback>,
}

impl<S: DisplaySurface> Inner<S> {
    fn cancel_next_step(&mut self) {
        if let Some(id) = self.next_step.take() {
            self.timers.clear_timeout(id);
        }
    }

    fn is_current(&self, epoch: u64) -> bool {
        !self.destroyed && !self.paused && self.epoch == epoch
    }

    fn announce_phrase(&self, phrase: &str) {
        if self.options.announce_to_screen_reader && !self.platform.environment.screen_reader_hint() {
            self.platform
                .announcer
                .announce(&format!("Tagline: {phrase}"), Politeness::Polite);
        }
    }
}

/// Typewriter bound to one display surface.
pub struct Typewriter<S: DisplaySurface> {
    inner: Rc<RefCell<Inner<S>>>,
}

impl<S: DisplaySurface> Clone for Typewriter<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: DisplaySurface + 'static> Typewriter<S> {
    /// Validate `options`, shuffle the phrases and mark up the surface.
    /// Nothing is typed until [`start`](Self::start).
    pub fn new(surface: S, platform: Platform, options: TypewriterOptions) -> Result<Self> {
        options.validate()?;

        let mut phrases = options.phrases.clone();
        let environment = platform.environment.clone();
        fisher_yates(&mut phrases, || environment.random());

        for (name, value) in ARIA_ATTRIBUTES {
            surface.set_attribute(name, value);
        }

        debug!(phrases = phrases.len(), "typewriter created");

        Ok(Self {
            inner: Rc::new(RefCell::new(Inner {
                timers: PendingTimers::new(platform.scheduler.clone()),
                surface,
                platform,
                options,
                cycle: Cycle::new(phrases),
                paused: false,
                hidden_pause: false,
                destroyed: false,
                epoch: 0,
                next_step: None,
                on_phrase_complete: None,
                on_cycle_complete: None,
            })),
        })
    }

    /// Begin typing the current phrase after the initial delay.
    ///
    /// Calling this while already running restarts the current phrase.
    pub fn start(&self) {
        let (epoch, delay) = {
            let mut inner = self.inner.borrow_mut();
            if inner.destroyed {
                return;
            }
            inner.paused = false;
            inner.hidden_pause = false;
            inner.cancel_next_step();
            inner.epoch += 1;
            inner.cycle.restart_phrase();

            let delay =
                effective_duration(&*inner.platform.environment, inner.options.initial_delay);
            (inner.epoch, delay)
        };

        if delay == 0 {
            self.run(epoch);
        } else {
            self.schedule(delay, epoch);
        }
    }

    /// Stop after the current step. The surface keeps what it shows.
    pub fn pause(&self) {
        let mut inner = self.inner.borrow_mut();
        if inner.destroyed {
            return;
        }
        inner.paused = true;
        inner.cancel_next_step();
    }

    /// Restart the current phrase from its first character.
    pub fn resume(&self) {
        let resumable = {
            let inner = self.inner.borrow();
            inner.paused && !inner.destroyed
        };
        if resumable {
            self.start();
        }
    }

    /// Pause, go back to the first phrase and clear the text.
    pub fn stop(&self) {
        let mut inner = self.inner.borrow_mut();
        if inner.destroyed {
            return;
        }
        inner.paused = true;
        inner.hidden_pause = false;
        inner.cancel_next_step();
        inner.cycle.reset();
        inner.surface.render("", false);
    }

    /// Tear down for good. Repeated calls do nothing.
    pub fn destroy(&self) {
        let mut inner = self.inner.borrow_mut();
        if inner.destroyed {
            return;
        }
        inner.destroyed = true;
        inner.paused = true;
        inner.next_step = None;
        inner.timers.cancel_all();
        inner.on_phrase_complete = None;
        inner.on_cycle_complete = None;

        inner.surface.clear();
        for (name, _) in ARIA_ATTRIBUTES {
            inner.surface.remove_attribute(name);
        }
        info!("typewriter destroyed");
    }

    /// React to the page becoming hidden or visible.
    ///
    /// Only a pause caused by hiding is undone when the page comes back; a
    /// pause requested by the caller stays in effect.
    pub fn set_page_hidden(&self, hidden: bool) {
        let action = {
            let mut inner = self.inner.borrow_mut();
            if inner.destroyed || !inner.options.pause_when_hidden {
                return;
            }
            if hidden && !inner.paused && inner.epoch > 0 {
                inner.hidden_pause = true;
                Some(true)
            } else if !hidden && inner.hidden_pause {
                inner.hidden_pause = false;
                Some(false)
            } else {
                None
            }
        };

        match action {
            Some(true) => {
                debug!("page hidden, pausing typewriter");
                self.pause();
            }
            Some(false) => {
                debug!("page visible, resuming typewriter");
                self.resume();
            }
            None => {}
        }
    }

    pub fn state(&self) -> TypewriterState {
        let inner = self.inner.borrow();
        TypewriterState {
            current_phrase: inner.cycle.current_phrase().to_string(),
            current_index: inner.cycle.index(),
            is_playing: !inner.destroyed && !inner.paused,
            is_paused: inner.paused,
        }
    }

    /// Phrases in their shuffled order.
    pub fn phrases(&self) -> Vec<String> {
        self.inner.borrow().cycle.phrases().to_vec()
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.borrow().destroyed
    }

    /// Called with the phrase and its index each time one is fully typed.
    pub fn on_phrase_complete(&self, callback: impl FnMut(&str, usize) + 'static) {
        let mut inner = self.inner.borrow_mut();
        if !inner.destroyed {
            inner.on_phrase_complete = Some(Box::new(callback));
        }
    }

    /// Called each time the rotation wraps back to the first phrase.
    pub fn on_cycle_complete(&self, callback: impl FnMut() + 'static) {
        let mut inner = self.inner.borrow_mut();
        if !inner.destroyed {
            inner.on_cycle_complete = Some(Box::new(callback));
        }
    }

    /// Number of scheduled steps still pending.
    pub fn pending_steps(&self) -> usize {
        self.inner.borrow().timers.len()
    }

    /// Drive the cycle until it has to wait.
    fn run(&self, epoch: u64) {
        loop {
            let (step, event) = {
                let mut inner = self.inner.borrow_mut();
                if !inner.is_current(epoch) {
                    return;
                }
                inner.next_step = None;

                let timings = Timings::effective(&inner.options, &*inner.platform.environment);
                let (step, event) = inner.cycle.advance(&timings);

                let event = match event {
                    Some(CycleEvent::Render(text)) => {
                        inner.surface.render(&text, true);
                        None
                    }
                    Some(CycleEvent::PhraseComplete { phrase, index }) => {
                        inner.announce_phrase(&phrase);
                        Some(CycleEvent::PhraseComplete { phrase, index })
                    }
                    other => other,
                };
                (step, event)
            };

            if let Some(event) = event {
                self.emit(event);
            }

            match step {
                Step::After(0) => continue,
                Step::After(delay) => return self.schedule(delay, epoch),
                Step::Yield => return self.schedule(0, epoch),
            }
        }
    }

    fn schedule(&self, delay: u32, epoch: u64) {
        let mut inner = self.inner.borrow_mut();
        if !inner.is_current(epoch) {
            return;
        }

        let this = Rc::downgrade(&self.inner);
        let id = inner.timers.set_timeout(delay, move || {
            if let Some(inner) = this.upgrade() {
                Typewriter { inner }.run(epoch);
            }
        });
        inner.next_step = Some(id);
    }

    /// Invoke user callbacks without holding the borrow, so they may call
    /// back into the typewriter.
    fn emit(&self, event: CycleEvent) {
        match event {
            CycleEvent::PhraseComplete { phrase, index } => {
                let callback = self.inner.borrow_mut().on_phrase_complete.take();
                if let Some(mut callback) = callback {
                    callback(&phrase, index);
                    let mut inner = self.inner.borrow_mut();
                    if !inner.destroyed && inner.on_phrase_complete.is_none() {
                        inner.on_phrase_complete = Some(callback);
                    }
                }
            }
            CycleEvent::CycleComplete => {
                debug!("tagline rotation wrapped");
                let callback = self.inner.borrow_mut().on_cycle_complete.take();
                if let Some(mut callback) = callback {
                    callback();
                    let mut inner = self.inner.borrow_mut();
                    if !inner.destroyed && inner.on_cycle_complete.is_none() {
                        inner.on_cycle_complete = Some(callback);
                    }
                }
            }
            CycleEvent::Render(_) => {}
        }
    }
}

impl<S: DisplaySurface> std::fmt::Debug for Typewriter<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Typewriter")
            .field("index", &inner.cycle.index())
            .field("phase", &inner.cycle.phase())
            .field("paused", &inner.paused)
            .field("destroyed", &inner.destroyed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingAnnouncer, RecordingSurface, StaticEnvironment, VirtualScheduler};

    struct Harness {
        scheduler: Rc<VirtualScheduler>,
        announcer: Rc<RecordingAnnouncer>,
        surface: Rc<RecordingSurface>,
        typewriter: Typewriter<Rc<RecordingSurface>>,
    }

    fn harness(options: TypewriterOptions, env: StaticEnvironment) -> Harness {
        let scheduler = VirtualScheduler::new();
        let announcer = Rc::new(RecordingAnnouncer::default());
        let surface = Rc::new(RecordingSurface::default());
        let platform = Platform::new(scheduler.clone(), Rc::new(env), announcer.clone());
        let typewriter = Typewriter::new(surface.clone(), platform, options).unwrap();
        Harness {
            scheduler,
            announcer,
            surface,
            typewriter,
        }
    }

    fn options(phrases: &[&str]) -> TypewriterOptions {
        TypewriterOptions {
            phrases: phrases.iter().map(|p| p.to_string()).collect(),
            type_speed: 10,
            erase_speed: 10,
            display_duration: 100,
            pause_duration: 10,
            initial_delay: 0,
            ..TypewriterOptions::default()
        }
    }

    #[test]
    fn test_new_sets_aria_attributes() {
        let h = harness(options(&["hello"]), StaticEnvironment::default());
        assert_eq!(h.surface.attribute("role").as_deref(), Some("status"));
        assert_eq!(h.surface.attribute("aria-label").as_deref(), Some("Rotating tagline"));
        assert_eq!(h.surface.attribute("aria-live").as_deref(), Some("polite"));
        assert_eq!(h.surface.text(), "");
    }

    #[test]
    fn test_new_rejects_empty_phrases() {
        let scheduler = VirtualScheduler::new();
        let platform = Platform::new(
            scheduler,
            Rc::new(StaticEnvironment::default()),
            Rc::new(RecordingAnnouncer::default()),
        );
        let result = Typewriter::new(Rc::new(RecordingSurface::default()), platform, options(&[]));
        assert!(result.is_err());
    }

    #[test]
    fn test_types_one_character_per_step() {
        let h = harness(options(&["hello"]), StaticEnvironment::default());
        h.typewriter.start();
        assert_eq!(h.surface.text(), "h");
        assert!(h.surface.cursor_visible());

        h.scheduler.advance(10);
        assert_eq!(h.surface.text(), "he");

        h.scheduler.advance(30);
        assert_eq!(h.surface.text(), "hello");
    }

    #[test]
    fn test_initial_delay() {
        let mut opts = options(&["hello"]);
        opts.initial_delay = 50;
        let h = harness(opts, StaticEnvironment::default());

        h.typewriter.start();
        h.scheduler.advance(49);
        assert_eq!(h.surface.text(), "");
        h.scheduler.advance(1);
        assert_eq!(h.surface.text(), "h");
    }

    #[test]
    fn test_phrase_complete_callback_and_announcement() {
        let h = harness(options(&["hi"]), StaticEnvironment::default());
        let completed = Rc::new(RefCell::new(Vec::new()));
        let sink = completed.clone();
        h.typewriter
            .on_phrase_complete(move |phrase, index| sink.borrow_mut().push((phrase.to_string(), index)));

        h.typewriter.start();
        h.scheduler.advance(20);

        assert_eq!(*completed.borrow(), vec![("hi".to_string(), 0)]);
        assert_eq!(h.announcer.messages(), vec!["Tagline: hi".to_string()]);
    }

    #[test]
    fn test_no_announcement_with_screen_reader_hint() {
        let h = harness(options(&["hi"]), StaticEnvironment::default().with_screen_reader(true));
        h.typewriter.start();
        h.scheduler.advance(20);
        assert!(h.announcer.messages().is_empty());
    }

    #[test]
    fn test_no_announcement_when_disabled() {
        let mut opts = options(&["hi"]);
        opts.announce_to_screen_reader = false;
        let h = harness(opts, StaticEnvironment::default());
        h.typewriter.start();
        h.scheduler.advance(20);
        assert!(h.announcer.messages().is_empty());
    }

    #[test]
    fn test_pause_freezes_display() {
        let h = harness(options(&["hello"]), StaticEnvironment::default());
        h.typewriter.start();
        h.scheduler.advance(10);
        h.typewriter.pause();

        h.scheduler.advance(1000);
        assert_eq!(h.surface.text(), "he");
        assert_eq!(h.typewriter.pending_steps(), 0);

        let state = h.typewriter.state();
        assert!(state.is_paused);
        assert!(!state.is_playing);
    }

    #[test]
    fn test_resume_restarts_phrase() {
        let h = harness(options(&["hello"]), StaticEnvironment::default());
        h.typewriter.start();
        h.scheduler.advance(10);
        h.typewriter.pause();
        h.typewriter.resume();

        assert_eq!(h.surface.text(), "h");
        assert!(h.typewriter.state().is_playing);
    }

    #[test]
    fn test_resume_without_pause_is_noop() {
        let h = harness(options(&["hello"]), StaticEnvironment::default());
        h.typewriter.start();
        h.scheduler.advance(20);
        h.typewriter.resume();
        assert_eq!(h.surface.text(), "hel");
    }

    #[test]
    fn test_restart_does_not_double_schedule() {
        let h = harness(options(&["hello"]), StaticEnvironment::default());
        h.typewriter.start();
        h.typewriter.start();
        assert_eq!(h.typewriter.pending_steps(), 1);
        h.scheduler.advance(10);
        assert_eq!(h.surface.text(), "he");
    }

    #[test]
    fn test_stop_resets_and_clears() {
        let h = harness(options(&["ab", "cd"]), StaticEnvironment::default());
        h.typewriter.start();
        h.scheduler.advance(200);
        assert_eq!(h.typewriter.state().current_index, 1);

        h.typewriter.stop();
        assert_eq!(h.surface.text(), "");
        assert!(!h.surface.cursor_visible());
        assert_eq!(h.typewriter.state().current_index, 0);
        assert!(h.typewriter.state().is_paused);

        h.scheduler.advance(1000);
        assert_eq!(h.surface.text(), "");
    }

    #[test]
    fn test_destroy_cleans_surface_and_is_idempotent() {
        let h = harness(options(&["hello"]), StaticEnvironment::default());
        h.typewriter.start();
        h.scheduler.advance(10);

        h.typewriter.destroy();
        let renders = h.surface.renders().len();
        h.typewriter.destroy();
        h.typewriter.start();
        h.typewriter.stop();
        h.scheduler.advance(1000);

        assert_eq!(h.surface.renders().len(), renders);
        assert_eq!(h.surface.text(), "");
        assert_eq!(h.surface.attribute("role"), None);
        assert_eq!(h.surface.attribute("aria-live"), None);
        assert_eq!(h.scheduler.pending_timeouts(), 0);

        let state = h.typewriter.state();
        assert!(!state.is_playing);
        assert!(state.is_paused);
    }

    #[test]
    fn test_callback_may_pause() {
        let h = harness(options(&["hi", "yo"]), StaticEnvironment::default());
        let typewriter = h.typewriter.clone();
        h.typewriter.on_phrase_complete(move |_, _| typewriter.pause());

        h.typewriter.start();
        h.scheduler.advance(1000);

        assert_eq!(h.surface.text(), h.typewriter.state().current_phrase);
        assert!(h.typewriter.state().is_paused);
    }

    #[test]
    fn test_cycle_complete_callback() {
        let h = harness(options(&["a", "b"]), StaticEnvironment::default());
        let cycles = Rc::new(std::cell::Cell::new(0));
        let counter = cycles.clone();
        h.typewriter.on_cycle_complete(move || counter.set(counter.get() + 1));

        h.typewriter.start();
        // One single-character phrase: 10 type + 100 hold + 10 erase + 10 pause.
        h.scheduler.advance(150);
        assert_eq!(cycles.get(), 0);
        h.scheduler.advance(150);
        assert_eq!(cycles.get(), 1);
    }

    #[test]
    fn test_page_hidden_pauses_and_visible_resumes() {
        let h = harness(options(&["hello"]), StaticEnvironment::default());
        h.typewriter.start();
        h.scheduler.advance(10);

        h.typewriter.set_page_hidden(true);
        assert!(h.typewriter.state().is_paused);

        h.typewriter.set_page_hidden(false);
        assert!(h.typewriter.state().is_playing);
        assert_eq!(h.surface.text(), "h");
    }

    #[test]
    fn test_page_visible_keeps_explicit_pause() {
        let h = harness(options(&["hello"]), StaticEnvironment::default());
        h.typewriter.start();
        h.typewriter.pause();

        h.typewriter.set_page_hidden(true);
        h.typewriter.set_page_hidden(false);
        assert!(h.typewriter.state().is_paused);
    }

    #[test]
    fn test_reduced_motion_types_whole_phrase() {
        let mut opts = options(&["hello"]);
        opts.initial_delay = 100;
        let h = harness(opts, StaticEnvironment::default().with_reduced_motion(true));

        // The whole phrase is shown, held for no time and cleared in one tick.
        h.typewriter.start();
        assert_eq!(h.surface.renders(), vec!["hello".to_string(), String::new()]);
        assert_eq!(h.announcer.messages().len(), 1);

        // The next phrase waits for a fresh tick rather than looping in place.
        assert_eq!(h.scheduler.pending_timeouts(), 1);
        assert!(h.scheduler.run_next());
        assert_eq!(h.surface.renders().len(), 4);
        assert_eq!(h.scheduler.now(), 0);
        assert_eq!(h.scheduler.pending_timeouts(), 1);

        h.typewriter.destroy();
        assert_eq!(h.scheduler.pending_timeouts(), 0);
    }

    #[test]
    fn test_state_serializes_camel_case() {
        let h = harness(options(&["hello"]), StaticEnvironment::default());
        let json = serde_json::to_value(h.typewriter.state()).unwrap();
        assert_eq!(json["currentPhrase"], "hello");
        assert_eq!(json["currentIndex"], 0);
        assert_eq!(json["isPlaying"], true);
        assert_eq!(json["isPaused"], false);
    }
}
