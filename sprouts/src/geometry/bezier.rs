//! Bézier curve evaluation and uniform sampling.
//!
//! The path synthesizer describes every candidate curve as a Bézier and turns it
//! into a polyline here. Sampled polylines always reproduce the end points exactly
//! so that shared endpoints compare equal bit for bit.

use super::tolerance::clamp01;
use crate::model::Vec2;

/// Control points of a quadratic Bézier curve.
#[derive(Clone, Copy, Debug)]
pub struct QuadBezier {
    pub p0: Vec2,
    pub p1: Vec2,
    pub p2: Vec2,
}

/// Control points of a cubic Bézier curve.
#[derive(Clone, Copy, Debug)]
pub struct CubicBezier {
    pub p0: Vec2, // Start point
    pub p1: Vec2, // First control point
    pub p2: Vec2, // Second control point
    pub p3: Vec2, // End point
}

impl QuadBezier {
    pub fn new(p0: Vec2, p1: Vec2, p2: Vec2) -> Self {
        Self { p0, p1, p2 }
    }

    /// Quadratic through `through` at t = 0.5.
    pub fn through(p0: Vec2, through: Vec2, p2: Vec2) -> Self {
        let ctrl = through * 2.0 - (p0 + p2) * 0.5;
        Self::new(p0, ctrl, p2)
    }

    /// Evaluate the curve at parameter t ∈ [0, 1].
    pub fn eval(&self, t: f64) -> Vec2 {
        let t = clamp01(t);
        let mt = 1.0 - t;
        Vec2 {
            x: mt * mt * self.p0.x + 2.0 * mt * t * self.p1.x + t * t * self.p2.x,
            y: mt * mt * self.p0.y + 2.0 * mt * t * self.p1.y + t * t * self.p2.y,
        }
    }

    pub fn sample(&self, segments: usize) -> Vec<Vec2> {
        sample_with(segments, self.p0, self.p2, |t| self.eval(t))
    }
}

impl CubicBezier {
    pub fn new(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// Evaluate the curve at parameter t ∈ [0, 1].
    pub fn eval(&self, t: f64) -> Vec2 {
        let t = clamp01(t);
        let t2 = t * t;
        let t3 = t2 * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        Vec2 {
            x: mt3 * self.p0.x + 3.0 * mt2 * t * self.p1.x + 3.0 * mt * t2 * self.p2.x + t3 * self.p3.x,
            y: mt3 * self.p0.y + 3.0 * mt2 * t * self.p1.y + 3.0 * mt * t2 * self.p2.y + t3 * self.p3.y,
        }
    }

    pub fn sample(&self, segments: usize) -> Vec<Vec2> {
        sample_with(segments, self.p0, self.p3, |t| self.eval(t))
    }
}

fn sample_with(segments: usize, start: Vec2, end: Vec2, eval: impl Fn(f64) -> Vec2) -> Vec<Vec2> {
    let n = segments.max(1);
    let mut out = Vec::with_capacity(n + 1);
    out.push(start);
    for i in 1..n {
        out.push(eval(i as f64 / n as f64));
    }
    out.push(end);
    out
}
