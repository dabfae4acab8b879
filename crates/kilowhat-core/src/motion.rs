//! Reduced-motion aware timing.

use crate::platform::Environment;

/// The single place durations are adjusted for the reduced-motion preference.
/// Every duration collapses to zero when the user prefers reduced motion.
pub fn effective_duration(environment: &dyn Environment, duration_ms: u32) -> u32 {
    if environment.prefers_reduced_motion() {
        0
    } else {
        duration_ms
    }
}
