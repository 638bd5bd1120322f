// Segment and path intersection for planarity checks.
// Crossings at an exactly-shared endpoint are legal when that endpoint is the end of
// a path and one of the two segments is that path's first or last segment; everything
// else, including collinear overlap longer than a pixel, is a conflict.

use super::math::{cross, dist, dot, length, normalize, seg_distance_sq};
use super::path::{is_closed, Bbox};
use super::tolerance::{near_zero, EPS_COLLINEAR, EPS_EXACT, EPS_PARALLEL, PIXEL_TOL};
use crate::model::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegIntersection {
    None,
    // Single crossing point, parameters on each segment in [0,1]
    Cross { t: f64, u: f64, at: Vec2 },
    // Collinear overlapping span longer than PIXEL_TOL
    Overlap { length: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossing {
    pub seg_a: usize,
    pub seg_b: usize,
    pub at: Vec2,
    pub overlap: bool,
}

/// Parametric intersection of segments `a1..a2` and `b1..b2`. Parallel segments
/// report no intersection.
pub fn segment_intersection(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> Option<(f64, f64, Vec2)> {
    let r = a2 - a1;
    let s = b2 - b1;
    let rxs = cross(r, s);
    if near_zero(rxs, EPS_PARALLEL * (length(r) * length(s)).max(EPS_PARALLEL)) {
        return None;
    }
    let qp = b1 - a1;
    let t = cross(qp, s) / rxs;
    let u = cross(qp, r) / rxs;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some((t, u, a1 + r * t))
    } else {
        None
    }
}

/// Length of the collinear overlap of two segments, when they are parallel, lie on
/// the same line within a pixel, and overlap by more than `PIXEL_TOL`.
pub fn collinear_overlap(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> Option<f64> {
    let r = a2 - a1;
    let s = b2 - b1;
    let (lr, ls) = (length(r), length(s));
    if lr <= EPS_EXACT || ls <= EPS_EXACT {
        return None;
    }
    if cross(r, s).abs() > EPS_COLLINEAR * lr * ls {
        return None;
    }
    let dir = normalize(r);
    // Perpendicular offset of b's endpoints from line a
    if cross(dir, b1 - a1).abs() > PIXEL_TOL || cross(dir, b2 - a1).abs() > PIXEL_TOL {
        return None;
    }
    let tb1 = dot(b1 - a1, dir);
    let tb2 = dot(b2 - a1, dir);
    let lo = tb1.min(tb2).max(0.0);
    let hi = tb1.max(tb2).min(lr);
    let overlap = hi - lo;
    (overlap > PIXEL_TOL).then_some(overlap)
}

pub fn intersect_segments(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> SegIntersection {
    if let Some(length) = collinear_overlap(a1, a2, b1, b2) {
        return SegIntersection::Overlap { length };
    }
    match segment_intersection(a1, a2, b1, b2) {
        Some((t, u, at)) => SegIntersection::Cross { t, u, at },
        None => SegIntersection::None,
    }
}

/// A crossing located on an endpoint that both segments share.
fn at_shared_endpoint(at: Vec2, a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> bool {
    [a1, a2].iter().any(|&e| {
        dist(at, e) <= EPS_EXACT && (dist(e, b1) <= EPS_EXACT || dist(e, b2) <= EPS_EXACT)
    })
}

/// Illegal contact between two segments: overlap, or a crossing that is not an
/// exactly-shared endpoint located on one of `anchors`.
pub fn segments_conflict(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2, anchors: &[Vec2]) -> Option<(Vec2, bool)> {
    match intersect_segments(a1, a2, b1, b2) {
        SegIntersection::None => None,
        SegIntersection::Overlap { .. } => Some((a1, true)),
        SegIntersection::Cross { at, .. } => {
            let anchored = anchors.iter().any(|&p| dist(at, p) <= EPS_EXACT);
            if anchored && at_shared_endpoint(at, a1, a2, b1, b2) { None } else { Some((at, false)) }
        }
    }
}

/// Path ends a segment may legally touch: the start for the first segment, the end
/// for the last. Pushed onto `out`.
fn segment_anchors(path: &[Vec2], seg: usize, out: &mut Vec<Vec2>) {
    let m = path.len().saturating_sub(1);
    if seg == 0 {
        out.push(path[0]);
    }
    if m > 0 && seg + 1 == m {
        out.push(path[m]);
    }
}

/// First problem of a path with itself: a crossing between non-adjacent segments, or
/// adjacent segments doubling back over each other. A closed loop additionally exempts
/// the crossing of its first and last segment at the shared start/end sample; no other
/// contact with the path's own ends is allowed.
pub fn self_intersection(path: &[Vec2]) -> Option<Crossing> {
    let m = path.len().saturating_sub(1);
    let closed = m >= 3 && is_closed(path);
    for i in 0..m.saturating_sub(1) {
        if collinear_overlap(path[i], path[i + 1], path[i + 1], path[i + 2]).is_some() {
            return Some(Crossing { seg_a: i, seg_b: i + 1, at: path[i + 1], overlap: true });
        }
    }
    if closed && collinear_overlap(path[m - 1], path[m], path[0], path[1]).is_some() {
        return Some(Crossing { seg_a: 0, seg_b: m - 1, at: path[0], overlap: true });
    }
    for i in 0..m {
        for j in (i + 2)..m {
            if closed && i == 0 && j == m - 1 {
                continue;
            }
            if let Some((at, overlap)) = segments_conflict(path[i], path[i + 1], path[j], path[j + 1], &[]) {
                return Some(Crossing { seg_a: i, seg_b: j, at, overlap });
            }
        }
    }
    None
}

pub fn self_intersects(path: &[Vec2]) -> bool {
    self_intersection(path).is_some()
}

/// First illegal contact between two distinct paths, including either path's
/// self-intersections.
pub fn path_crossing(a: &[Vec2], b: &[Vec2]) -> Option<Crossing> {
    if let Some(c) = self_intersection(a) {
        return Some(c);
    }
    if let Some(c) = self_intersection(b) {
        return Some(c);
    }
    cross_crossing(a, b)
}

/// First illegal contact between a segment of `a` and a segment of `b`; each path's
/// own shape is not inspected.
pub fn cross_crossing(a: &[Vec2], b: &[Vec2]) -> Option<Crossing> {
    let (Some(ba), Some(bb)) = (Bbox::of(a), Bbox::of(b)) else {
        return None;
    };
    if !ba.inflate(PIXEL_TOL).overlaps(&bb.inflate(PIXEL_TOL)) {
        return None;
    }
    let mut anchors: Vec<Vec2> = Vec::with_capacity(4);
    for (i, wa) in a.windows(2).enumerate() {
        let Some(sa) = Bbox::of(wa) else { continue };
        let sa = sa.inflate(PIXEL_TOL);
        if !sa.overlaps(&bb) {
            continue;
        }
        for (j, wb) in b.windows(2).enumerate() {
            let Some(sb) = Bbox::of(wb) else { continue };
            if !sa.overlaps(&sb) {
                continue;
            }
            anchors.clear();
            segment_anchors(a, i, &mut anchors);
            segment_anchors(b, j, &mut anchors);
            if let Some((at, overlap)) = segments_conflict(wa[0], wa[1], wb[0], wb[1], &anchors) {
                return Some(Crossing { seg_a: i, seg_b: j, at, overlap });
            }
        }
    }
    None
}

pub fn curves_intersect(a: &[Vec2], b: &[Vec2]) -> bool {
    path_crossing(a, b).is_some()
}

/// True when some segment of the path comes closer than `clearance` to `p`.
pub fn path_near_point(path: &[Vec2], p: Vec2, clearance: f64) -> bool {
    let c2 = clearance * clearance;
    match path {
        [] => false,
        [only] => dist(*only, p) < clearance,
        _ => path.windows(2).any(|w| seg_distance_sq(p, w[0], w[1]) < c2),
    }
}
