/// Frame-rate independent interpolation helpers

/// Remaining distance below which a damped value snaps onto its target.
pub const SNAP_EPSILON: f64 = 1e-4;

/// Linear interpolation between `start` and `end`, exact at both ends.
pub fn lerp(start: f64, end: f64, alpha: f64) -> f64 {
    start * (1.0 - alpha) + end * alpha
}

/// Move `current` toward `target` at `rate` over `delta` seconds.
///
/// Uses `1 - exp(-rate * delta)` as the blend factor, so two half-steps land
/// on the same value as one full step. Never overshoots for `delta >= 0` and
/// returns `target` exactly once the gap is below [`SNAP_EPSILON`].
pub fn damp(current: f64, target: f64, rate: f64, delta: f64) -> f64 {
    if (target - current).abs() < SNAP_EPSILON {
        return target;
    }
    if !(delta > 0.0) {
        return current;
    }
    let factor = 1.0 - (-rate * delta).exp();
    current + (target - current) * factor.clamp(0.0, 1.0)
}
