//! Polyline measurements used by placement and validation.

use super::math::{closest_point_on_segment, dist, dist_sq, lerp};
use super::tolerance::{clamp01, EPS_EXACT};
use crate::model::Vec2;

/// Axis-aligned bounding box (min_x, min_y, max_x, max_y).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bbox {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bbox {
    pub fn of(path: &[Vec2]) -> Option<Bbox> {
        let first = *path.first()?;
        let mut b = Bbox { min: first, max: first };
        for p in &path[1..] {
            b.min.x = b.min.x.min(p.x);
            b.min.y = b.min.y.min(p.y);
            b.max.x = b.max.x.max(p.x);
            b.max.y = b.max.y.max(p.y);
        }
        Some(b)
    }

    pub fn inflate(self, by: f64) -> Bbox {
        Bbox {
            min: Vec2::new(self.min.x - by, self.min.y - by),
            max: Vec2::new(self.max.x + by, self.max.y + by),
        }
    }

    pub fn overlaps(&self, o: &Bbox) -> bool {
        self.min.x <= o.max.x && o.min.x <= self.max.x && self.min.y <= o.max.y && o.min.y <= self.max.y
    }
}

pub fn polyline_length(path: &[Vec2]) -> f64 {
    path.windows(2).map(|w| dist(w[0], w[1])).sum()
}

/// Point at fraction `t` of the arc length. `t` is clamped to [0, 1]; a one-point
/// path yields that point and an empty path yields the origin.
pub fn point_at_param(path: &[Vec2], t: f64) -> Vec2 {
    match path {
        [] => Vec2::ZERO,
        [only] => *only,
        _ => {
            let total = polyline_length(path);
            if total <= EPS_EXACT {
                return path[0];
            }
            let target = clamp01(t) * total;
            let mut acc = 0.0;
            for w in path.windows(2) {
                let seg = dist(w[0], w[1]);
                if acc + seg >= target && seg > 0.0 {
                    return lerp(w[0], w[1], (target - acc) / seg);
                }
                acc += seg;
            }
            path[path.len() - 1]
        }
    }
}

/// Closest location on the polyline to `p`: (point, segment index, squared distance).
pub fn closest_on_polyline(path: &[Vec2], p: Vec2) -> Option<(Vec2, usize, f64)> {
    if let [only] = path {
        return Some((*only, 0, dist_sq(*only, p)));
    }
    let mut best: Option<(Vec2, usize, f64)> = None;
    for (i, w) in path.windows(2).enumerate() {
        let (q, _) = closest_point_on_segment(p, w[0], w[1]);
        let d2 = dist_sq(p, q);
        if best.map_or(true, |(_, _, bd)| d2 < bd) {
            best = Some((q, i, d2));
        }
    }
    best
}

pub fn distance_to_polyline(path: &[Vec2], p: Vec2) -> f64 {
    closest_on_polyline(path, p).map_or(f64::INFINITY, |(_, _, d2)| d2.sqrt())
}

/// True when the first and last samples coincide.
pub fn is_closed(path: &[Vec2]) -> bool {
    path.len() > 2 && dist(path[0], path[path.len() - 1]) <= EPS_EXACT
}

/// Insert `pos` into the polyline at its closest location. Returns the new path and
/// the index of `pos` in it. A sample already within `EPS_EXACT` is snapped to `pos`
/// instead of duplicated.
pub fn splice_point(path: &[Vec2], pos: Vec2) -> (Vec<Vec2>, usize) {
    let Some((_, seg, _)) = closest_on_polyline(path, pos) else {
        return (vec![pos], 0);
    };
    let mut out = path.to_vec();
    if out.len() < 2 {
        out[0] = pos;
        return (out, 0);
    }
    let last = out.len() - 1;
    for idx in [seg, seg + 1] {
        if dist(out[idx], pos) <= EPS_EXACT && idx != 0 && idx != last {
            out[idx] = pos;
            return (out, idx);
        }
    }
    out.insert(seg + 1, pos);
    (out, seg + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f64, y: f64) -> Vec2 { Vec2::new(x, y) }

    #[test]
    fn point_at_param_walks_arc_length() {
        let path = [v(0.0, 0.0), v(10.0, 0.0), v(10.0, 30.0)];
        assert_eq!(point_at_param(&path, 0.0), v(0.0, 0.0));
        assert_eq!(point_at_param(&path, 0.25), v(10.0, 0.0));
        let mid = point_at_param(&path, 0.5);
        assert!((mid.x - 10.0).abs() < 1e-9 && (mid.y - 10.0).abs() < 1e-9);
        assert_eq!(point_at_param(&path, 7.0), v(10.0, 30.0));
        assert_eq!(point_at_param(&path, -1.0), v(0.0, 0.0));
        assert_eq!(point_at_param(&path[..1], 0.8), v(0.0, 0.0));
    }

    #[test]
    fn splice_inserts_on_closest_segment() {
        let path = [v(0.0, 0.0), v(10.0, 0.0), v(20.0, 0.0)];
        let (out, idx) = splice_point(&path, v(15.0, 0.0));
        assert_eq!(idx, 2);
        assert_eq!(out, vec![v(0.0, 0.0), v(10.0, 0.0), v(15.0, 0.0), v(20.0, 0.0)]);
        let (out, idx) = splice_point(&path, v(10.0, 0.0));
        assert_eq!(idx, 1);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn closed_detection_needs_three_samples() {
        assert!(!is_closed(&[v(0.0, 0.0), v(0.0, 0.0)]));
        assert!(is_closed(&[v(0.0, 0.0), v(5.0, 5.0), v(0.0, 0.0)]));
    }
}
