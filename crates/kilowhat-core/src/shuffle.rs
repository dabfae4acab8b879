//! Fisher–Yates shuffle.

/// Shuffle `items` in place.
///
/// `random` must return values in `[0, 1)`, like `Math.random`.
pub fn fisher_yates<T>(items: &mut [T], mut random: impl FnMut() -> f64) {
    for i in (1..items.len()).rev() {
        let j = ((random() * (i + 1) as f64) as usize).min(i);
        items.swap(i, j);
    }
}
