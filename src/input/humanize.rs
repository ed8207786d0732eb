//! Human behavior simulation
//!
//! Adds realistic variance to synthesized input so the trace does not look
//! mechanically uniform: randomized target points, curved variable-speed
//! pointer paths, jittered delays and hold durations, and occasional
//! micro-pauses that mimic attention drift.

use kurbo::{CubicBez, ParamCurve};
use rand::Rng;
use std::time::Duration;

use crate::screen::{Point, Region};

/// Human reaction time range in milliseconds
const MIN_REACTION_TIME_MS: u64 = 180;
const MAX_REACTION_TIME_MS: u64 = 350;

/// Visual processing time range
const MIN_PROCESSING_TIME_MS: u64 = 100;
const MAX_PROCESSING_TIME_MS: u64 = 300;

/// Pointer speed range, pixels per second along the curve
const MIN_POINTER_SPEED: f64 = 900.0;
const MAX_POINTER_SPEED: f64 = 2200.0;

/// Pause between emitted path steps
const MIN_STEP_PAUSE_MS: u64 = 4;
const MAX_STEP_PAUSE_MS: u64 = 9;

/// An inclusive millisecond range a delay is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        assert!(min_ms <= max_ms);
        Self { min_ms, max_ms }
    }

    pub const ZERO: DelayRange = DelayRange::new(0, 0);
}

/// Pre-delay, hold duration, and post-delay wrapped around one press.
#[derive(Debug, Clone, Copy)]
pub struct PressTiming {
    pub pre: DelayRange,
    pub hold: DelayRange,
    pub post: DelayRange,
}

impl PressTiming {
    /// Ordinary mouse click.
    pub const CLICK: PressTiming = PressTiming {
        pre: DelayRange::new(80, 220),
        hold: DelayRange::new(40, 120),
        post: DelayRange::new(150, 400),
    };

    /// Hotkey or typed character.
    pub const KEY: PressTiming = PressTiming {
        pre: DelayRange::new(40, 140),
        hold: DelayRange::new(35, 95),
        post: DelayRange::new(60, 180),
    };

    /// No delays at all, for tests.
    pub const INSTANT: PressTiming = PressTiming {
        pre: DelayRange::ZERO,
        hold: DelayRange::ZERO,
        post: DelayRange::ZERO,
    };
}

/// Randomness source for everything human-like.
pub struct Humanizer {
    rng: rand::rngs::ThreadRng,
}

impl Default for Humanizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Humanizer {
    pub fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }

    /// Draw a duration from a range.
    pub fn delay(&mut self, range: &DelayRange) -> Duration {
        if range.max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(self.rng.gen_range(range.min_ms..=range.max_ms))
    }

    /// Reaction + visual processing time, with a 5% chance of a longer
    /// hesitation, for moments where a human would re-read the screen.
    pub fn think_time(&mut self) -> Duration {
        let reaction = self
            .rng
            .gen_range(MIN_REACTION_TIME_MS..=MAX_REACTION_TIME_MS);
        let processing = self
            .rng
            .gen_range(MIN_PROCESSING_TIME_MS..=MAX_PROCESSING_TIME_MS);
        let hesitation = if self.rng.gen::<f32>() < 0.05 {
            self.rng.gen_range(200..=800)
        } else {
            0
        };
        Duration::from_millis(reaction + processing + hesitation)
    }

    /// Uniform random point inside a region. Deliberately not the center:
    /// always-centered clicks are a detectable fingerprint.
    pub fn point_in(&mut self, region: &Region) -> Point {
        let x = if region.width <= 1 {
            region.left
        } else {
            self.rng.gen_range(region.left..region.right())
        };
        let y = if region.height <= 1 {
            region.top
        } else {
            self.rng.gen_range(region.top..region.bottom())
        };
        Point::new(x, y)
    }

    /// Randomly negate a delta.
    pub fn flip_sign(&mut self, value: i32) -> i32 {
        if self.rng.gen_bool(0.5) {
            -value
        } else {
            value
        }
    }

    /// Curved pointer path from `from` to `to`: a cubic Bézier whose control
    /// points deviate sideways from the straight line, sampled at a speed
    /// drawn fresh per movement.
    pub fn pointer_path(&mut self, from: Point, to: Point) -> Vec<Point> {
        let p0 = kurbo::Point::new(from.x as f64, from.y as f64);
        let p3 = kurbo::Point::new(to.x as f64, to.y as f64);

        let distance = p0.distance(p3);
        if distance < 2.0 {
            return vec![to];
        }

        let curve = CubicBez::new(p0, self.control_point(p0, p3), self.control_point(p0, p3), p3);

        let speed = self.rng.gen_range(MIN_POINTER_SPEED..=MAX_POINTER_SPEED);
        let step_ms = (MIN_STEP_PAUSE_MS + MAX_STEP_PAUSE_MS) as f64 / 2.0;
        let steps = ((distance / speed) * 1000.0 / step_ms).ceil().max(2.0) as u32;

        let mut path = Vec::with_capacity(steps as usize);
        for i in 1..=steps {
            let t = i as f64 / steps as f64;
            let p = curve.eval(t);
            path.push(Point::new(p.x.round() as i32, p.y.round() as i32));
        }
        // End exactly on target regardless of rounding.
        if let Some(last) = path.last_mut() {
            *last = to;
        }
        path
    }

    /// Pause between path steps.
    pub fn step_pause(&mut self) -> Duration {
        Duration::from_millis(self.rng.gen_range(MIN_STEP_PAUSE_MS..=MAX_STEP_PAUSE_MS))
    }

    /// A Bézier control point deviated 15-40% off the straight line.
    fn control_point(&mut self, from: kurbo::Point, to: kurbo::Point) -> kurbo::Point {
        let deviation = self.rng.gen_range(15..=40) as f64 / 100.0;
        let along = self.rng.gen_range(0.2..=0.8);
        let sign = if self.rng.gen_bool(0.5) { 1.0 } else { -1.0 };

        let dx = to.x - from.x;
        let dy = to.y - from.y;
        // Perpendicular offset scaled by segment length.
        kurbo::Point::new(
            from.x + dx * along - dy * deviation * sign,
            from.y + dy * along + dx * deviation * sign,
        )
    }

    /// Whether an idle micro-pause should occur now.
    pub fn should_micro_pause(&mut self, probability: f32) -> bool {
        self.rng.gen::<f32>() < probability
    }

    pub fn micro_pause_duration(&mut self) -> Duration {
        Duration::from_millis(self.rng.gen_range(500..=2000))
    }

    /// Whether to take a longer break after a number of completed passes.
    pub fn should_take_break(&mut self, passes_completed: u32) -> bool {
        if passes_completed > 0 && passes_completed % 5 == 0 {
            self.rng.gen::<f32>() < 0.15
        } else {
            false
        }
    }

    pub fn break_duration(&mut self) -> Duration {
        Duration::from_millis(self.rng.gen_range(8_000..=30_000))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_in_region_is_bounded() {
        let mut h = Humanizer::new();
        let region = Region::new(50, 80, 20, 10);
        for _ in 0..200 {
            let p = h.point_in(&region);
            assert!(region.contains(p), "{p:?} outside {region:?}");
        }
    }

    #[test]
    fn test_point_in_degenerate_region() {
        let mut h = Humanizer::new();
        let region = Region::new(5, 7, 1, 1);
        assert_eq!(h.point_in(&region), Point::new(5, 7));
    }

    #[test]
    fn test_path_ends_on_target() {
        let mut h = Humanizer::new();
        for _ in 0..20 {
            let path = h.pointer_path(Point::new(0, 0), Point::new(300, 150));
            assert_eq!(*path.last().unwrap(), Point::new(300, 150));
            assert!(path.len() >= 2);
        }
    }

    #[test]
    fn test_short_hop_is_direct() {
        let mut h = Humanizer::new();
        let path = h.pointer_path(Point::new(10, 10), Point::new(10, 11));
        assert_eq!(path, vec![Point::new(10, 11)]);
    }

    #[test]
    fn test_paths_vary_between_draws() {
        let mut h = Humanizer::new();
        let a = h.pointer_path(Point::new(0, 0), Point::new(400, 300));
        let b = h.pointer_path(Point::new(0, 0), Point::new(400, 300));
        // Same endpoints, but the curves should differ somewhere.
        assert_ne!(a, b);
    }

    #[test]
    fn test_think_time_is_in_range() {
        let mut h = Humanizer::new();
        for _ in 0..100 {
            let t = h.think_time().as_millis() as u64;
            assert!(t >= MIN_REACTION_TIME_MS + MIN_PROCESSING_TIME_MS);
            assert!(t <= MAX_REACTION_TIME_MS + MAX_PROCESSING_TIME_MS + 800);
        }
    }

    #[test]
    fn test_zero_delay_range() {
        let mut h = Humanizer::new();
        assert_eq!(h.delay(&DelayRange::ZERO), Duration::ZERO);
    }
}
