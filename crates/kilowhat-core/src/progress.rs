//! Reading progress indicator for article pages.
//!
//! Scroll events are throttled to one update per animation frame. Resize
//! updates immediately.

use std::{cell::RefCell, rc::Rc};

use tracing::debug;

use crate::{
    platform::{Scheduler, TimerId},
    timers::PendingTimers,
};

/// Scroll position and page geometry in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub viewport_height: f64,
    pub document_height: f64,
}

impl ScrollMetrics {
    pub fn percent(&self) -> f64 {
        progress_percent(self.scroll_top, self.viewport_height, self.document_height)
    }
}

/// How far through the scrollable height the page is, in `[0, 100]`.
///
/// A page that does not scroll counts as fully read.
pub fn progress_percent(scroll_top: f64, viewport_height: f64, document_height: f64) -> f64 {
    let scrollable = document_height - viewport_height;
    if scrollable.is_nan() || scrollable <= 0.0 {
        return 100.0;
    }
    let percent = scroll_top / scrollable * 100.0;
    if percent.is_nan() {
        return 0.0;
    }
    percent.clamp(0.0, 100.0)
}

/// The progress bar element.
pub trait ProgressSurface {
    fn metrics(&self) -> ScrollMetrics;

    /// Set the bar width in percent.
    fn set_progress(&self, percent: f64);

    /// Take the bar off the page.
    fn remove(&self);
}

impl<T: ProgressSurface + ?Sized> ProgressSurface for Rc<T> {
    fn metrics(&self) -> ScrollMetrics {
        (**self).metrics()
    }

    fn set_progress(&self, percent: f64) {
        (**self).set_progress(percent)
    }

    fn remove(&self) {
        (**self).remove()
    }
}

struct Inner<S> {
    surface: S,
    frame: Option<TimerId>,
    progress: f64,
    destroyed: bool,
}

/// Reading progress bar bound to one surface.
pub struct ReadingProgress<S: ProgressSurface> {
    inner: Rc<RefCell<Inner<S>>>,
    timers: Rc<PendingTimers>,
}

impl<S: ProgressSurface> Clone for ReadingProgress<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            timers: self.timers.clone(),
        }
    }
}

impl<S: ProgressSurface + 'static> ReadingProgress<S> {
    /// Create the tracker and draw the initial progress.
    pub fn new(surface: S, scheduler: Rc<dyn Scheduler>) -> Self {
        let progress = Self {
            inner: Rc::new(RefCell::new(Inner {
                surface,
                frame: None,
                progress: 0.0,
                destroyed: false,
            })),
            timers: PendingTimers::new(scheduler),
        };
        progress.update();
        progress
    }

    /// Scroll handler. At most one update is queued per frame.
    pub fn on_scroll(&self) {
        let mut inner = self.inner.borrow_mut();
        if inner.destroyed || inner.frame.is_some() {
            return;
        }

        let this = Rc::downgrade(&self.inner);
        let id = self.timers.request_frame(move || {
            if let Some(inner) = this.upgrade() {
                let mut inner = inner.borrow_mut();
                inner.frame = None;
                refresh(&mut *inner);
            }
        });
        inner.frame = Some(id);
    }

    /// Recompute now. Used for resize and the initial draw.
    pub fn update(&self) {
        refresh(&mut *self.inner.borrow_mut());
    }

    /// Last value written to the bar.
    pub fn progress(&self) -> f64 {
        self.inner.borrow().progress
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.borrow().destroyed
    }

    pub fn destroy(&self) {
        let mut inner = self.inner.borrow_mut();
        if inner.destroyed {
            return;
        }
        inner.destroyed = true;
        inner.frame = None;
        self.timers.cancel_all();
        inner.surface.remove();
        debug!("reading progress removed");
    }
}

fn refresh<S: ProgressSurface>(inner: &mut Inner<S>) {
    if inner.destroyed {
        return;
    }
    let percent = inner.surface.metrics().percent();
    inner.progress = percent;
    inner.surface.set_progress(percent);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingProgress, VirtualScheduler};

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(0.0, 800.0, 1800.0), 0.0);
        assert_eq!(progress_percent(500.0, 800.0, 1800.0), 50.0);
        assert_eq!(progress_percent(1000.0, 800.0, 1800.0), 100.0);
        assert_eq!(progress_percent(5000.0, 800.0, 1800.0), 100.0);
        assert_eq!(progress_percent(-50.0, 800.0, 1800.0), 0.0);
    }

    #[test]
    fn test_short_page_is_fully_read() {
        assert_eq!(progress_percent(0.0, 800.0, 800.0), 100.0);
        assert_eq!(progress_percent(0.0, 800.0, 400.0), 100.0);
        assert_eq!(progress_percent(0.0, f64::NAN, 400.0), 100.0);
    }

    #[test]
    fn test_initial_draw() {
        let scheduler = VirtualScheduler::new();
        let surface = Rc::new(RecordingProgress::new(250.0, 800.0, 1800.0));
        let progress = ReadingProgress::new(surface.clone(), scheduler);
        assert_eq!(progress.progress(), 25.0);
        assert_eq!(surface.widths(), vec![25.0]);
    }

    #[test]
    fn test_scroll_is_throttled_per_frame() {
        let scheduler = VirtualScheduler::new();
        let surface = Rc::new(RecordingProgress::new(0.0, 800.0, 1800.0));
        let progress = ReadingProgress::new(surface.clone(), scheduler.clone());

        surface.scroll_to(100.0);
        progress.on_scroll();
        surface.scroll_to(500.0);
        progress.on_scroll();
        progress.on_scroll();

        assert_eq!(scheduler.pending_frames(), 1);
        scheduler.run_frames();
        assert_eq!(surface.widths(), vec![0.0, 50.0]);

        progress.on_scroll();
        assert_eq!(scheduler.pending_frames(), 1);
    }

    #[test]
    fn test_destroy_removes_bar_and_cancels_frame() {
        let scheduler = VirtualScheduler::new();
        let surface = Rc::new(RecordingProgress::new(0.0, 800.0, 1800.0));
        let progress = ReadingProgress::new(surface.clone(), scheduler.clone());

        progress.on_scroll();
        progress.destroy();
        progress.destroy();
        progress.on_scroll();
        progress.update();

        assert_eq!(scheduler.run_frames(), 0);
        assert!(surface.is_removed());
        assert_eq!(surface.widths().len(), 1);
    }
}
