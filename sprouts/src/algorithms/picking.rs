use crate::geometry::math::{dist_sq, point_in_circle};
use crate::geometry::path::{closest_on_polyline, polyline_length};
use crate::model::{CurveId, GameState, PointId, Vec2};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Pick {
    Point { id: PointId, dist: f64 },
    /// `t` is the arc-length parameter of the hit along the curve.
    Curve { id: CurveId, t: f64, dist: f64 },
}

fn nearest_point(state: &GameState, pos: Vec2, radius: f64, usable: impl Fn(usize) -> bool) -> Option<(PointId, f64)> {
    let mut best: Option<(PointId, f64)> = None;
    for p in &state.points {
        if !usable(p.spare()) || !point_in_circle(p.pos, pos, radius) {
            continue;
        }
        let d2 = dist_sq(p.pos, pos);
        // strict < keeps the lower id on ties
        if best.map_or(true, |(_, bd)| d2 < bd) {
            best = Some((p.id, d2));
        }
    }
    best
}

/// Closest point within `radius` of `pos`.
pub fn pick_point(state: &GameState, pos: Vec2, radius: f64) -> Option<PointId> {
    nearest_point(state, pos, radius, |_| true).map(|(id, _)| id)
}

/// Closest point within `radius` that can still take `needed` curve ends.
pub fn pick_point_with_capacity(state: &GameState, pos: Vec2, radius: f64, needed: usize) -> Option<PointId> {
    nearest_point(state, pos, radius, |spare| spare >= needed).map(|(id, _)| id)
}

/// Points first, then curves.
pub fn pick(state: &GameState, pos: Vec2, radius: f64) -> Option<Pick> {
    if let Some((id, d2)) = nearest_point(state, pos, radius, |_| true) {
        return Some(Pick::Point { id, dist: d2.sqrt() });
    }
    let r2 = radius * radius;
    let mut best: Option<(CurveId, f64, f64)> = None;
    for c in &state.curves {
        let Some((at, seg, d2)) = closest_on_polyline(&c.path, pos) else { continue };
        if d2 > r2 || best.is_some_and(|(_, _, bd)| d2 >= bd) {
            continue;
        }
        let along = polyline_length(&c.path[..=seg]) + dist_sq(c.path[seg], at).sqrt();
        let total = polyline_length(&c.path);
        let t = if total > 0.0 { along / total } else { 0.0 };
        best = Some((c.id, t, d2));
    }
    best.map(|(id, t, d2)| Pick::Curve { id, t, dist: d2.sqrt() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::create_initial_state;
    use crate::model::{PlayerId, Settings};

    fn fresh() -> GameState {
        create_initial_state(Settings::default(), vec![PlayerId::new("a"), PlayerId::new("b")]).unwrap()
    }

    #[test]
    fn picks_nearest_within_radius() {
        let s = fresh();
        let top = s.points[0].pos;
        assert_eq!(pick_point(&s, top + Vec2::new(3.0, 4.0), 10.0), Some(PointId(0)));
        assert_eq!(pick_point(&s, top + Vec2::new(30.0, 40.0), 10.0), None);
        assert!(matches!(pick(&s, top, 10.0), Some(Pick::Point { id: PointId(0), .. })));
    }

    #[test]
    fn capacity_filter_skips_points_without_room() {
        let s = fresh();
        let top = s.points[0].pos;
        assert_eq!(pick_point_with_capacity(&s, top, 10.0, 3), Some(PointId(0)));
        assert_eq!(pick_point_with_capacity(&s, top, 10.0, 4), None);
    }
}
