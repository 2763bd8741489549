//! Time-sampled animation primitives.
//!
//! Nothing here runs on its own: a [`Tween`] remembers where it started and
//! where it is heading, and the caller samples it with the current time in
//! milliseconds. Retargeting starts from the value sampled at that instant,
//! so an interrupted animation reverses smoothly.

use serde::{Deserialize, Serialize};

/// Piecewise-linear mapping of `x` from `input` control points onto `output`.
///
/// `input` must be ascending and the same length as `output`. Values outside
/// the input range clamp to the first/last output.
pub fn interpolate(x: f32, input: &[f32], output: &[f32]) -> f32 {
    debug_assert_eq!(input.len(), output.len());
    let n = input.len().min(output.len());
    if n == 0 {
        return 0.0;
    }
    if n == 1 || x <= input[0] {
        return output[0];
    }
    if x >= input[n - 1] {
        return output[n - 1];
    }
    for i in 1..n {
        if x == input[i] {
            return output[i];
        }
        if x < input[i] {
            let span = input[i] - input[i - 1];
            if span <= f32::EPSILON {
                return output[i];
            }
            let t = (x - input[i - 1]) / span;
            return output[i - 1] + (output[i] - output[i - 1]) * t;
        }
    }
    output[n - 1]
}

/// Timing curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    /// cubic-bezier(0.42, 0, 1, 1)
    Ease,
    /// Mirror of [`Easing::Ease`]: fast start, slow finish.
    EaseOut,
    /// Quadratic in-out; the default for timed animations.
    #[default]
    InOutQuad,
}

impl Easing {
    /// Map linear progress `t` in `[0, 1]` onto the curve.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::Ease => cubic_bezier(0.42, 0.0, 1.0, 1.0, t),
            Easing::EaseOut => 1.0 - cubic_bezier(0.42, 0.0, 1.0, 1.0, 1.0 - t),
            Easing::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

/// Solve a CSS-style cubic bezier for `x` and return its `y`.
fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32, x: f32) -> f32 {
    let bez = |a: f32, b: f32, t: f32| {
        let u = 1.0 - t;
        3.0 * u * u * t * a + 3.0 * u * t * t * b + t * t * t
    };
    let slope = |a: f32, b: f32, t: f32| {
        let u = 1.0 - t;
        3.0 * u * u * a + 6.0 * u * t * (b - a) + 3.0 * t * t * (1.0 - b)
    };

    // Newton first, bisection when the slope flattens out.
    let mut t = x;
    for _ in 0..8 {
        let err = bez(x1, x2, t) - x;
        if err.abs() < 1e-5 {
            return bez(y1, y2, t);
        }
        let d = slope(x1, x2, t);
        if d.abs() < 1e-6 {
            break;
        }
        t = (t - err / d).clamp(0.0, 1.0);
    }

    let (mut lo, mut hi) = (0.0f32, 1.0f32);
    t = x;
    for _ in 0..32 {
        let v = bez(x1, x2, t);
        if (v - x).abs() < 1e-5 {
            break;
        }
        if v < x {
            lo = t;
        } else {
            hi = t;
        }
        t = (lo + hi) / 2.0;
    }
    bez(y1, y2, t)
}

/// A value moving from `from` to `to` over `duration_ms` starting at `start_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tween {
    from: f32,
    to: f32,
    start_ms: u64,
    duration_ms: u64,
    easing: Easing,
}

impl Tween {
    /// A tween that already sits at `value`.
    pub fn settled(value: f32) -> Self {
        Self {
            from: value,
            to: value,
            start_ms: 0,
            duration_ms: 0,
            easing: Easing::Linear,
        }
    }

    pub fn target(&self) -> f32 {
        self.to
    }

    /// 0.0 .. 1.0 linear progress at `now_ms`.
    pub fn progress(&self, now_ms: u64) -> f32 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        let elapsed = now_ms.saturating_sub(self.start_ms);
        (elapsed as f32 / self.duration_ms as f32).min(1.0)
    }

    pub fn value_at(&self, now_ms: u64) -> f32 {
        let eased = self.easing.apply(self.progress(now_ms));
        self.from + (self.to - self.from) * eased
    }

    pub fn is_settled(&self, now_ms: u64) -> bool {
        self.progress(now_ms) >= 1.0
    }

    /// Head for `to` from wherever the value is at `now_ms`.
    pub fn retarget(&mut self, now_ms: u64, to: f32, duration_ms: u64, easing: Easing) {
        let current = self.value_at(now_ms);
        *self = Self {
            from: current,
            to,
            start_ms: now_ms,
            duration_ms,
            easing,
        };
    }

    /// Jump to `value` with no animation.
    pub fn snap(&mut self, value: f32) {
        *self = Self::settled(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn interpolate_clamps_outside_range() {
        let input = [0.0, 300.0, 600.0];
        let output = [0.3, 1.0, 0.3];
        assert_eq!(interpolate(-50.0, &input, &output), 0.3);
        assert_eq!(interpolate(900.0, &input, &output), 0.3);
        assert_eq!(interpolate(300.0, &input, &output), 1.0);
        assert!(close(interpolate(150.0, &input, &output), 0.65));
        assert!(close(interpolate(450.0, &input, &output), 0.65));
    }

    #[test]
    fn easing_endpoints_are_fixed() {
        for easing in [Easing::Linear, Easing::Ease, Easing::EaseOut, Easing::InOutQuad] {
            assert!(close(easing.apply(0.0), 0.0), "{easing:?}");
            assert!(close(easing.apply(1.0), 1.0), "{easing:?}");
        }
    }

    #[test]
    fn ease_out_leads_linear() {
        for t in [0.1, 0.3, 0.5, 0.7, 0.9] {
            assert!(Easing::EaseOut.apply(t) > t);
            assert!(Easing::Ease.apply(t) < t);
        }
    }

    #[test]
    fn tween_samples_and_retargets_from_current_value() {
        let mut tween = Tween::settled(0.0);
        tween.retarget(1000, 1.0, 1000, Easing::Linear);
        assert!(close(tween.value_at(1000), 0.0));
        assert!(close(tween.value_at(1500), 0.5));
        assert!(close(tween.value_at(5000), 1.0));

        tween.retarget(1500, 0.0, 500, Easing::Linear);
        assert!(close(tween.value_at(1500), 0.5));
        assert!(close(tween.value_at(1750), 0.25));
        assert!(tween.is_settled(2000));
    }
}
