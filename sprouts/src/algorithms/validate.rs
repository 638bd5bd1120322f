//! Topology validation for candidate connections and whole snapshots.
//!
//! Per-move checks run in a fixed order and stop at the first failure:
//! shape, capacity, curve crossings, curve/point clearance, new point on path,
//! new point separation. The whole-state checks cross-reference every curve with
//! the incident lists of its endpoints and its inserted point.

use crate::error::{SproutsError, ValidationResult};
use crate::geometry::intersect::{cross_crossing, path_near_point, self_intersection};
use crate::geometry::limits::in_coord_bounds;
use crate::geometry::math::dist;
use crate::geometry::path::{distance_to_polyline, splice_point};
use crate::geometry::tolerance::{
    EPS_EXACT, MIN_POINT_SEPARATION, PLACEMENT_TOL, POINT_CLEARANCE,
};
use crate::model::{Curve, CurveId, GameState, Point, PointId, Vec2, MAX_INCIDENT};
use std::collections::HashMap;
use std::sync::Arc;

/// A connection as proposed by a caller, before any state is touched.
#[derive(Clone, Copy, Debug)]
pub struct Connection<'a> {
    pub from: PointId,
    pub to: PointId,
    pub path: &'a [Vec2],
    pub new_point: Vec2,
}

fn lookup(state: &GameState, id: PointId) -> Result<&Point, SproutsError> {
    state.point(id).ok_or(SproutsError::UnknownPoint { point: id })
}

/// Malformed input: non-finite samples, too few samples, or ends that are not the
/// declared endpoints' positions.
pub fn check_shape(state: &GameState, c: &Connection<'_>) -> ValidationResult {
    let from = lookup(state, c.from)?;
    let to = lookup(state, c.to)?;
    if c.path.len() < 3 {
        return Err(SproutsError::invalid_move(format!(
            "path needs at least 3 samples, got {}",
            c.path.len()
        )));
    }
    if !c.path.iter().all(|p| in_coord_bounds(p.x) && in_coord_bounds(p.y)) {
        return Err(SproutsError::invalid_move("path contains non-finite or out-of-range samples"));
    }
    if !(in_coord_bounds(c.new_point.x) && in_coord_bounds(c.new_point.y)) {
        return Err(SproutsError::invalid_move("new point is not finite"));
    }
    let (first, last) = (c.path[0], c.path[c.path.len() - 1]);
    if dist(first, from.pos) > EPS_EXACT || dist(last, to.pos) > EPS_EXACT {
        return Err(SproutsError::invalid_move(format!(
            "path must run from {} to {}",
            c.from, c.to
        )));
    }
    Ok(())
}

/// Both endpoints exist and have spare slots; a loop needs two on the same point.
pub fn check_capacity(state: &GameState, from: PointId, to: PointId) -> ValidationResult {
    let a = lookup(state, from)?;
    let b = lookup(state, to)?;
    if from == to {
        if a.spare() < 2 {
            return Err(SproutsError::ConnectionLimitExceeded { point: from, spare: a.spare(), needed: 2 });
        }
        return Ok(());
    }
    for p in [a, b] {
        if p.spare() < 1 {
            return Err(SproutsError::ConnectionLimitExceeded { point: p.id, spare: 0, needed: 1 });
        }
    }
    Ok(())
}

/// The path must not cross itself or any existing curve.
pub fn check_crossings(state: &GameState, path: &[Vec2]) -> ValidationResult {
    if let Some(c) = self_intersection(path) {
        return Err(SproutsError::invalid_curve(format!(
            "path crosses itself between segments {} and {} near ({:.1}, {:.1})",
            c.seg_a, c.seg_b, c.at.x, c.at.y
        )));
    }
    for curve in &state.curves {
        if let Some(c) = cross_crossing(path, &curve.path) {
            let what = if c.overlap { "overlaps" } else { "crosses" };
            return Err(SproutsError::invalid_curve(format!(
                "path {what} {} near ({:.1}, {:.1})",
                curve.id, c.at.x, c.at.y
            )));
        }
    }
    Ok(())
}

/// The path must keep clear of every point except its own endpoints.
pub fn check_clearance(state: &GameState, from: PointId, to: PointId, path: &[Vec2]) -> ValidationResult {
    for p in &state.points {
        if p.id == from || p.id == to {
            continue;
        }
        if path_near_point(path, p.pos, POINT_CLEARANCE) {
            return Err(SproutsError::invalid_curve(format!("path passes through point {}", p.id)));
        }
    }
    Ok(())
}

/// The declared new point lies on the path: exactly on the middle sample of a
/// three-sample path, within `PLACEMENT_TOL` of a longer one.
pub fn check_on_path(path: &[Vec2], new_point: Vec2) -> ValidationResult {
    if path.len() == 3 {
        if dist(path[1], new_point) > EPS_EXACT {
            return Err(SproutsError::invalid_new_point("new point must be the middle sample of a 3-sample path"));
        }
        return Ok(());
    }
    let d = distance_to_polyline(path, new_point);
    if d > PLACEMENT_TOL {
        return Err(SproutsError::invalid_new_point(format!("new point is {d:.2} away from the path")));
    }
    Ok(())
}

/// The new point keeps its distance from existing points and existing curves.
pub fn check_separation(state: &GameState, new_point: Vec2) -> ValidationResult {
    for p in &state.points {
        if dist(p.pos, new_point) < MIN_POINT_SEPARATION {
            return Err(SproutsError::invalid_new_point(format!("new point is too close to {}", p.id)));
        }
    }
    for curve in &state.curves {
        if path_near_point(&curve.path, new_point, POINT_CLEARANCE) {
            return Err(SproutsError::invalid_new_point(format!("new point sits on {}", curve.id)));
        }
    }
    Ok(())
}

/// Run every per-move check and return the path as it will be stored: the new point
/// spliced in as an exact sample, so later curves can share it as an endpoint.
pub fn validate_connection(state: &GameState, c: &Connection<'_>) -> Result<Vec<Vec2>, SproutsError> {
    check_shape(state, c)?;
    check_capacity(state, c.from, c.to)?;
    check_crossings(state, c.path)?;
    check_clearance(state, c.from, c.to, c.path)?;
    check_on_path(c.path, c.new_point)?;
    check_separation(state, c.new_point)?;

    let (placed, idx) = splice_point(c.path, c.new_point);
    if idx == 0 || idx + 1 >= placed.len() {
        return Err(SproutsError::invalid_new_point("new point cannot be a path endpoint"));
    }
    if placed.len() != c.path.len() {
        // Splicing moved the path by at most PLACEMENT_TOL; recheck the stored shape.
        check_crossings(state, &placed)?;
        check_clearance(state, c.from, c.to, &placed)?;
    }
    Ok(placed)
}

/// Cross-reference curves and incident lists. Every curve must appear once in each
/// endpoint's list (twice for a loop) and twice in its inserted point's list, and no
/// list may reference anything else.
pub fn check_consistency(points: &[Arc<Point>], curves: &[Arc<Curve>]) -> ValidationResult {
    let bad = |msg: String| Err(SproutsError::invalid_state(msg));

    for (i, p) in points.iter().enumerate() {
        if p.id.index() != i {
            return bad(format!("point at index {i} has id {}", p.id));
        }
        if p.incident.len() > MAX_INCIDENT {
            return bad(format!("{} has {} incident curves", p.id, p.incident.len()));
        }
        if !p.pos.is_finite() {
            return bad(format!("{} has a non-finite position", p.id));
        }
    }

    let mut expected: HashMap<(PointId, CurveId), usize> = HashMap::new();
    for (i, c) in curves.iter().enumerate() {
        if c.id.index() != i {
            return bad(format!("curve at index {i} has id {}", c.id));
        }
        let (Some(start), Some(end), Some(inserted)) = (
            points.get(c.start.index()),
            points.get(c.end.index()),
            points.get(c.inserted.index()),
        ) else {
            return bad(format!("{} references a missing point", c.id));
        };
        if c.inserted == c.start || c.inserted == c.end {
            return bad(format!("{} has its inserted point at an end", c.id));
        }
        if c.path.len() < 3 {
            return bad(format!("{} has fewer than 3 samples", c.id));
        }
        let (first, last) = (c.path[0], c.path[c.path.len() - 1]);
        if dist(first, start.pos) > EPS_EXACT || dist(last, end.pos) > EPS_EXACT {
            return bad(format!("{} does not start and end on its endpoints", c.id));
        }
        if distance_to_polyline(&c.path, inserted.pos) > PLACEMENT_TOL {
            return bad(format!("{} does not pass through {}", c.id, c.inserted));
        }
        *expected.entry((c.start, c.id)).or_default() += 1;
        *expected.entry((c.end, c.id)).or_default() += 1;
        *expected.entry((c.inserted, c.id)).or_default() += 2;
    }

    let mut actual: HashMap<(PointId, CurveId), usize> = HashMap::new();
    for p in points {
        for &cid in &p.incident {
            if cid.index() >= curves.len() {
                return bad(format!("{} references missing curve {cid}", p.id));
            }
            *actual.entry((p.id, cid)).or_default() += 1;
        }
    }
    if actual != expected {
        let mismatch = expected
            .iter()
            .find(|(k, v)| actual.get(k) != Some(v))
            .map(|(k, _)| *k)
            .or_else(|| actual.keys().find(|k| !expected.contains_key(k)).copied());
        return match mismatch {
            Some((p, c)) => bad(format!("incident list of {p} disagrees with {c}")),
            None => bad("incident lists disagree with curves".to_string()),
        };
    }
    Ok(())
}

/// Global planarity: no two curves conflict and no curve passes near a point that is
/// not one of its own.
pub fn check_planarity(points: &[Arc<Point>], curves: &[Arc<Curve>]) -> ValidationResult {
    for (i, a) in curves.iter().enumerate() {
        if let Some(c) = self_intersection(&a.path) {
            return Err(SproutsError::invalid_curve(format!("{} crosses itself at segment {}", a.id, c.seg_a)));
        }
        for b in &curves[i + 1..] {
            if cross_crossing(&a.path, &b.path).is_some() {
                return Err(SproutsError::invalid_curve(format!("{} crosses {}", a.id, b.id)));
            }
        }
        let own = a.own_points();
        for p in points {
            if own.contains(&p.id) {
                continue;
            }
            if path_near_point(&a.path, p.pos, POINT_CLEARANCE) {
                return Err(SproutsError::invalid_curve(format!("{} passes through {}", a.id, p.id)));
            }
        }
    }
    Ok(())
}
