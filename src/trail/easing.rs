//! Exponential easing for trail dots
//!
//! Every frame a dot closes a fixed fraction of the gap to whatever it
//! chases: the input position for the head, the previous dot for the rest.
//! There is no velocity term, so a dot approaches its target
//! asymptotically and never overshoots.

use kurbo::Point;

/// Move `current` the fraction `factor` of the way toward `target`
pub fn ease_toward(current: Point, target: Point, factor: f64) -> Point {
    current.lerp(target, factor)
}

/// Advance a head-to-tail chain of positions by one frame
///
/// The head eases toward `target`; each later position eases toward the
/// already-updated position in front of it.
pub fn step_chain(positions: &mut [Point], target: Point, factor: f64) {
    let mut antecedent = target;
    for position in positions.iter_mut() {
        *position = ease_toward(*position, antecedent, factor);
        antecedent = *position;
    }
}

/// Check if `current` is within `threshold` pixels of `target`
pub fn is_settled(current: Point, target: Point, threshold: f64) -> bool {
    current.distance(target) < threshold
}
