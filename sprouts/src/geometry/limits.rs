// Bounds for settings and for documents loaded from untrusted text

// Starting point count
pub const MIN_POINTS: usize = 2;
pub const MAX_POINTS: usize = 6;

pub const PLAYER_COUNT: usize = 2;

// Canvas
pub const MIN_CANVAS: f64 = 100.0;
pub const MAX_CANVAS: f64 = 100_000.0;
pub const MAX_JITTER: f64 = 0.25;

// A full game on MAX_POINTS starting points ends after 3n-1 moves, one point and
// one curve each. Documents beyond this are rejected outright.
pub const MAX_TOTAL_POINTS: usize = MAX_POINTS * 4;
pub const MAX_TOTAL_CURVES: usize = MAX_POINTS * 3;
pub const MAX_SAMPLES_PER_CURVE: usize = 4_096;

pub const COORD_MIN: f64 = -10_000_000.0;
pub const COORD_MAX: f64 = 10_000_000.0;

#[inline]
pub fn in_coord_bounds(x: f64) -> bool { x.is_finite() && (COORD_MIN..=COORD_MAX).contains(&x) }

#[inline]
pub fn in_canvas_bounds(x: f64) -> bool { x.is_finite() && (MIN_CANVAS..=MAX_CANVAS).contains(&x) }
