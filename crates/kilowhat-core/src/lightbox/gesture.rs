//! Touch gesture tracking.
//!
//! A touch sequence is either a one-finger swipe or a two-finger pinch,
//! chosen by the number of touches when it starts.

use crate::{config::LightboxOptions, lightbox::view::ImageTransform};

/// Swipe distance, as a fraction of the viewport, at which drag feedback
/// stops growing.
const MAX_SCALE_DAMPING: f64 = 0.3;
const MAX_OPACITY_DAMPING: f64 = 0.5;

/// A touch position in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub x: f64,
    pub y: f64,
}

impl TouchPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: TouchPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// The gesture in progress while the overlay is open.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Swipe(Swipe),
    Pinch(Pinch),
}

/// One-finger swipe-to-dismiss tracking.
#[derive(Debug, Clone, PartialEq)]
pub struct Swipe {
    start: TouchPoint,
    offset_x: f64,
    offset_y: f64,
    velocity_y: f64,
    last_y: f64,
    last_time: f64,
}

impl Swipe {
    pub fn begin(point: TouchPoint, now: f64) -> Self {
        Self {
            start: point,
            offset_x: 0.0,
            offset_y: 0.0,
            velocity_y: 0.0,
            last_y: point.y,
            last_time: now,
        }
    }

    /// Feed one move sample taken at `now` (ms).
    ///
    /// Velocity is updated on every sample. The vertical offset only follows
    /// the finger while the drag is more vertical than horizontal, and only
    /// then is feedback returned.
    pub fn sample(&mut self, point: TouchPoint, now: f64, viewport_height: f64) -> Option<DragFeedback> {
        let delta_x = point.x - self.start.x;
        let delta_y = point.y - self.start.y;

        let elapsed = now - self.last_time;
        if elapsed > 0.0 {
            self.velocity_y = (point.y - self.last_y) / elapsed;
        }
        self.last_y = point.y;
        self.last_time = now;
        self.offset_x = delta_x;

        if delta_y.abs() > delta_x.abs() {
            self.offset_y = delta_y;
            Some(DragFeedback::for_offset(delta_y, viewport_height))
        } else {
            None
        }
    }

    pub fn offset_x(&self) -> f64 {
        self.offset_x
    }

    pub fn offset_y(&self) -> f64 {
        self.offset_y
    }

    /// Vertical velocity of the latest sample in px/ms.
    pub fn velocity_y(&self) -> f64 {
        self.velocity_y
    }
}

/// Two-finger pinch zoom tracking.
#[derive(Debug, Clone, PartialEq)]
pub struct Pinch {
    start_distance: f64,
    scale: f64,
}

impl Pinch {
    /// Start a pinch. The scale is measured against the distance between the
    /// two touches at this moment, so every pinch starts from 1. Returns
    /// `None` when both touches sit on the same point.
    pub fn begin(a: TouchPoint, b: TouchPoint) -> Option<Self> {
        let start_distance = a.distance(b);
        (start_distance.is_finite() && start_distance > 0.0).then_some(Self {
            start_distance,
            scale: 1.0,
        })
    }

    /// Feed one move sample and return the clamped scale.
    pub fn sample(&mut self, a: TouchPoint, b: TouchPoint, options: &LightboxOptions) -> f64 {
        self.scale = options.clamp_zoom(a.distance(b) / self.start_distance);
        self.scale
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}

/// Live visual feedback for a vertical drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragFeedback {
    pub offset_y: f64,
    pub scale: f64,
    pub opacity: f64,
}

impl DragFeedback {
    /// Damp scale and opacity in proportion to how far the drag travelled
    /// relative to the viewport.
    pub fn for_offset(offset_y: f64, viewport_height: f64) -> Self {
        let resistance = if viewport_height > 0.0 {
            offset_y.abs() / viewport_height
        } else {
            1.0
        };

        Self {
            offset_y,
            scale: 1.0 - (resistance * MAX_SCALE_DAMPING).min(MAX_SCALE_DAMPING),
            opacity: 1.0 - (resistance * MAX_OPACITY_DAMPING).min(MAX_OPACITY_DAMPING),
        }
    }

    pub fn transform(&self) -> ImageTransform {
        ImageTransform::Drag {
            offset_y: self.offset_y,
            scale: self.scale,
        }
    }
}

/// Whether releasing a swipe should dismiss the overlay.
///
/// A swipe never carries zoom, so only distance and speed count.
pub fn should_dismiss(
    offset_y: f64,
    velocity_y: f64,
    viewport_height: f64,
    options: &LightboxOptions,
) -> bool {
    offset_y.abs() > options.swipe_threshold * viewport_height
        || velocity_y.abs() > options.velocity_threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touch_distance() {
        let a = TouchPoint::new(0.0, 0.0);
        let b = TouchPoint::new(3.0, 4.0);
        assert_eq!(a.distance(b), 5.0);
    }

    #[test]
    fn test_vertical_swipe_produces_feedback() {
        let mut swipe = Swipe::begin(TouchPoint::new(100.0, 100.0), 0.0);
        let feedback = swipe
            .sample(TouchPoint::new(105.0, 300.0), 100.0, 800.0)
            .expect("vertical drag");

        assert_eq!(swipe.offset_y(), 200.0);
        assert_eq!(swipe.velocity_y(), 2.0);
        assert_eq!(feedback.offset_y, 200.0);
        // resistance 0.25
        assert!((feedback.scale - 0.925).abs() < 1e-9);
        assert!((feedback.opacity - 0.875).abs() < 1e-9);
    }

    #[test]
    fn test_horizontal_swipe_ignored_but_velocity_tracked() {
        let mut swipe = Swipe::begin(TouchPoint::new(0.0, 0.0), 0.0);
        assert!(swipe.sample(TouchPoint::new(200.0, 20.0), 10.0, 800.0).is_none());
        assert_eq!(swipe.offset_y(), 0.0);
        assert_eq!(swipe.offset_x(), 200.0);
        assert_eq!(swipe.velocity_y(), 2.0);
    }

    #[test]
    fn test_zero_elapsed_keeps_velocity() {
        let mut swipe = Swipe::begin(TouchPoint::new(0.0, 0.0), 5.0);
        swipe.sample(TouchPoint::new(0.0, 10.0), 10.0, 800.0);
        swipe.sample(TouchPoint::new(0.0, 50.0), 10.0, 800.0);
        assert_eq!(swipe.velocity_y(), 2.0);
    }

    #[test]
    fn test_feedback_is_clamped() {
        let feedback = DragFeedback::for_offset(-5000.0, 800.0);
        assert!((feedback.scale - 0.7).abs() < 1e-9);
        assert!((feedback.opacity - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_pinch_scale_clamped() {
        let options = LightboxOptions::default();
        let mut pinch = Pinch::begin(TouchPoint::new(0.0, 0.0), TouchPoint::new(100.0, 0.0))
            .expect("distinct touches");

        for distance in [1.0, 10.0, 50.0, 100.0, 150.0, 250.0, 400.0, 10_000.0] {
            let scale = pinch.sample(TouchPoint::new(0.0, 0.0), TouchPoint::new(distance, 0.0), &options);
            assert!((options.min_zoom..=options.max_zoom).contains(&scale), "scale {scale}");
        }

        assert_eq!(
            pinch.sample(TouchPoint::new(0.0, 0.0), TouchPoint::new(200.0, 0.0), &options),
            2.0
        );
    }

    #[test]
    fn test_pinch_scale_is_distance_ratio() {
        let options = LightboxOptions::default();
        let origin = TouchPoint::new(0.0, 0.0);
        let mut pinch = Pinch::begin(origin, TouchPoint::new(100.0, 0.0)).unwrap();
        assert_eq!(pinch.scale(), 1.0);
        let scale = pinch.sample(origin, TouchPoint::new(75.0, 0.0), &options);
        assert_eq!(scale, 0.75);

        // A fresh pinch held at its starting distance is back at 1.
        let mut second = Pinch::begin(origin, TouchPoint::new(100.0, 0.0)).unwrap();
        let scale = second.sample(origin, TouchPoint::new(100.0, 0.0), &options);
        assert_eq!(scale, 1.0);
    }

    #[test]
    fn test_pinch_rejects_coincident_touches() {
        let p = TouchPoint::new(10.0, 10.0);
        assert!(Pinch::begin(p, p).is_none());
    }

    #[test]
    fn test_should_dismiss() {
        let options = LightboxOptions::default();
        // threshold = 0.15 * 800 = 120px
        assert!(should_dismiss(121.0, 0.0, 800.0, &options));
        assert!(should_dismiss(-121.0, 0.0, 800.0, &options));
        assert!(!should_dismiss(120.0, 0.0, 800.0, &options));
        assert!(should_dismiss(10.0, -0.6, 800.0, &options));
        assert!(!should_dismiss(10.0, 0.5, 800.0, &options));
    }
}
