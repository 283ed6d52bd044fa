//! Property animation: easing curves and a per-property state machine.
//!
//! Animations never read the clock themselves. The host passes the frame
//! timestamp into `sample`, so every property in a transition sees the same
//! instant on a given tick.

use std::time::{Duration, Instant};

use crate::theme::Color;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Easing {
    Linear,
    /// Material "fast out, slow in": cubic Bézier (0.4, 0.0) (0.2, 1.0).
    FastOutSlowIn,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::FastOutSlowIn => cubic_bezier(0.4, 0.0, 0.2, 1.0, t),
        }
    }
}

/// Evaluate a CSS-style cubic Bézier timing curve at `x`.
fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32, x: f32) -> f32 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }

    let coord = |p1: f32, p2: f32, u: f32| -> f32 {
        let inv = 1.0 - u;
        3.0 * inv * inv * u * p1 + 3.0 * inv * u * u * p2 + u * u * u
    };
    let slope = |p1: f32, p2: f32, u: f32| -> f32 {
        let inv = 1.0 - u;
        3.0 * inv * inv * p1 + 6.0 * inv * u * (p2 - p1) + 3.0 * u * u * (1.0 - p2)
    };

    // Newton first, it converges in a handful of steps for sane curves
    let mut u = x;
    for _ in 0..8 {
        let err = coord(x1, x2, u) - x;
        if err.abs() < 1e-6 {
            return coord(y1, y2, u);
        }
        let d = slope(x1, x2, u);
        if d.abs() < 1e-6 {
            break;
        }
        u = (u - err / d).clamp(0.0, 1.0);
    }

    let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
    u = x;
    for _ in 0..32 {
        let cx = coord(x1, x2, u);
        if (cx - x).abs() < 1e-6 {
            break;
        }
        if cx < x {
            lo = u;
        } else {
            hi = u;
        }
        u = (lo + hi) / 2.0;
    }
    coord(y1, y2, u)
}

/// Values that can be interpolated by an [`Animation`].
pub trait Lerp: Copy {
    fn lerp(self, to: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(self, to: Self, t: f32) -> Self {
        self + (to - self) * t
    }
}

impl Lerp for Color {
    fn lerp(self, to: Self, t: f32) -> Self {
        Color::lerp(self, to, t)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Animation<T: Lerp> {
    Idle(T),
    Running {
        from: T,
        to: T,
        start: Instant,
        duration: Duration,
        easing: Easing,
    },
}

impl<T: Lerp> Animation<T> {
    pub fn start(from: T, to: T, start: Instant, duration: Duration, easing: Easing) -> Self {
        Animation::Running { from, to, start, duration, easing }
    }

    /// Linear progress in `[0, 1]` at `now`, before easing.
    pub fn progress(&self, now: Instant) -> f32 {
        match *self {
            Animation::Idle(_) => 1.0,
            Animation::Running { start, duration, .. } => {
                if duration.is_zero() {
                    return 1.0;
                }
                let elapsed = now.saturating_duration_since(start);
                (elapsed.as_secs_f32() / duration.as_secs_f32()).min(1.0)
            }
        }
    }

    pub fn sample(&self, now: Instant) -> T {
        match *self {
            Animation::Idle(value) => value,
            Animation::Running { from, to, easing, .. } => {
                let t = self.progress(now);
                if t >= 1.0 {
                    return to;
                }
                from.lerp(to, easing.apply(t))
            }
        }
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        match *self {
            Animation::Idle(_) => true,
            Animation::Running { start, duration, .. } => now >= start + duration,
        }
    }

    pub fn target(&self) -> T {
        match *self {
            Animation::Idle(value) => value,
            Animation::Running { to, .. } => to,
        }
    }
}
