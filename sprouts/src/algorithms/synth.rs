//! Path synthesis: turn a point pair (and an optional waypoint) into a drawable,
//! validated path.
//!
//! Candidates come from a fixed ladder, consumed lazily until one passes
//! validation:
//!
//! * distinct points: the direct path through the waypoint (or midpoint), a
//!   quadratic through the waypoint, quadratic bows of growing height on both
//!   sides, cubic S-curves, cubics leaving each end through its free sectors, a
//!   finely sampled straight line, and finally routes found by grid search;
//! * a point with itself: circular loops of growing radius, turned through eight
//!   headings around the intended direction, then routed loops leaving and
//!   re-entering the point on either side of a free sector's bisector.
//!
//! Cosmetic jitter scales bow heights and loop radii before sampling. The sampled
//! path is the one validated and returned, so jitter never changes what was
//! checked.

use crate::algorithms::route::{exits, Grid, LEAD};
use crate::algorithms::validate::{check_capacity, validate_connection, Connection};
use crate::error::{Result, SproutsError};
use crate::geometry::bezier::{CubicBezier, QuadBezier};
use crate::geometry::math::{cross, dist, length, midpoint, normalize, perp, rotate};
use crate::geometry::path::point_at_param;
use crate::model::{GameState, PointId, Settings, Vec2};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;

pub const CURVE_SEGMENTS: usize = 24;
pub const LOOP_SEGMENTS: usize = 24;

// Bow and S-curve heights as a fraction of the chord length
const BOW_HEIGHTS: [f64; 4] = [0.25, 0.5, 0.9, 1.4];
const S_HEIGHTS: [f64; 3] = [0.3, 0.6, 1.0];
const MIN_BOW: f64 = 30.0;
// Control point distance of exit cubics as a fraction of the chord length
const EXIT_REACH: [f64; 3] = [0.5, 1.0, 1.6];
// Free sectors tried per end for exit cubics
const EXIT_FANOUT: usize = 2;

const LOOP_RADII: [f64; 5] = [30.0, 45.0, 65.0, 90.0, 120.0];
// Degrees relative to the intended heading, nearest first
const LOOP_TURNS: [f64; 8] = [0.0, 45.0, -45.0, 90.0, -90.0, 135.0, -135.0, 180.0];
// Degrees either side of a sector bisector where routed loops leave and return
const LOOP_SPREAD: f64 = 30.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Variant {
    /// Three samples: start, waypoint (or midpoint), end.
    Direct,
    /// Quadratic passing through the waypoint.
    Through,
    /// Quadratic bulging sideways; signed height as a chord fraction.
    Bow { height: f64 },
    /// Cubic with control points on opposite sides.
    SCurve { height: f64 },
    /// Cubic leaving each end along a free-sector direction; indices into the
    /// endpoints' exit lists, `reach` as a chord fraction.
    Exit { from_exit: usize, to_exit: usize, reach: f64 },
    /// Straight line sampled like the curved variants.
    Straight,
    /// Polyline found by grid search between the given exits.
    Routed { from_exit: usize, to_exit: usize },
    /// Circle through the point; `turn` in degrees from the intended heading.
    Loop { radius: f64, turn: f64 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    pub variant: Variant,
    pub path: Vec<Vec2>,
    pub new_point: Vec2,
}

/// A candidate that passed validation. `path` is the stored form, with the new
/// point as an exact sample.
#[derive(Clone, Debug, PartialEq)]
pub struct Synthesized {
    pub variant: Variant,
    pub path: Vec<Vec2>,
    pub new_point: Vec2,
}

#[derive(Clone, Copy, Debug)]
pub struct Synthesizer {
    jitter: f64,
    seed: u64,
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self { jitter: 0.0, seed: 0 }
    }
}

impl Synthesizer {
    pub fn new(jitter: f64, seed: u64) -> Self {
        Self { jitter: jitter.clamp(0.0, crate::geometry::limits::MAX_JITTER), seed }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.jitter, settings.seed)
    }

    fn rng_for(&self, move_index: u32, from: PointId, to: PointId) -> StdRng {
        let key = ((move_index as u64) << 40) ^ ((from.0 as u64) << 20) ^ to.0 as u64;
        StdRng::seed_from_u64(self.seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ key)
    }

    /// Lazily generated candidates for a pair, in ladder order. Nothing is validated;
    /// the grid for routed candidates is only built once the ladder reaches them.
    pub fn candidates<'a>(
        &self,
        state: &'a GameState,
        from: PointId,
        to: PointId,
        waypoint: Option<Vec2>,
    ) -> Result<Box<dyn Iterator<Item = Candidate> + 'a>> {
        let a = state.point(from).ok_or(SproutsError::UnknownPoint { point: from })?.pos;
        let b = state.point(to).ok_or(SproutsError::UnknownPoint { point: to })?.pos;
        let waypoint = waypoint.filter(|w| w.is_finite());
        let mut rng = self.rng_for(state.move_index(), from, to);
        let jitter = self.jitter;
        let mut scale = move || if jitter > 0.0 { 1.0 + rng.random_range(-jitter..=jitter) } else { 1.0 };

        if from == to {
            let heading = loop_heading(a, waypoint, &state.settings);
            let ladder = LOOP_TURNS
                .into_iter()
                .flat_map(|turn| LOOP_RADII.into_iter().map(move |radius| (turn, radius)));
            let circles = ladder.map(move |(turn, radius)| {
                let dir = rotate(heading, turn.to_radians());
                let path = loop_path(a, dir, radius * scale(), LOOP_SEGMENTS);
                let new_point = path[loop_insert_index(&path, waypoint)];
                Candidate { variant: Variant::Loop { radius, turn }, path, new_point }
            });
            let sectors = exits(state, from, heading);
            let spread = LOOP_SPREAD.to_radians();
            let out: Vec<Vec2> = sectors.iter().map(|&d| rotate(d, spread)).collect();
            let back: Vec<Vec2> = sectors.iter().map(|&d| rotate(d, -spread)).collect();
            let routed = std::iter::once(()).flat_map(move |()| routed_candidates(state, a, a, &out, &back));
            return Ok(Box::new(circles.chain(routed)));
        }

        let side = match waypoint {
            Some(w) if cross(b - a, w - a) < 0.0 => -1.0,
            _ => 1.0,
        };
        let signed = move |h: f64| [h * side, -h * side];
        let from_exits = exits(state, from, b - a);
        let to_exits = exits(state, to, a - b);
        let (nf, nt) = (from_exits.len().min(EXIT_FANOUT), to_exits.len().min(EXIT_FANOUT));
        let fan = (0..nf).flat_map(move |i| (0..nt).map(move |j| (i, j)));
        let ladder = std::iter::once(Variant::Direct)
            .chain(waypoint.map(|_| Variant::Through))
            .chain(BOW_HEIGHTS.into_iter().flat_map(signed).map(|height| Variant::Bow { height }))
            .chain(S_HEIGHTS.into_iter().flat_map(signed).map(|height| Variant::SCurve { height }))
            .chain(EXIT_REACH.into_iter().flat_map(move |reach| {
                fan.clone().map(move |(from_exit, to_exit)| Variant::Exit { from_exit, to_exit, reach })
            }))
            .chain(waypoint.map(|_| Variant::Straight));
        let ends = Ends { a, b, from_exits: from_exits.clone(), to_exits: to_exits.clone() };
        let curves = ladder.map(move |variant| {
            let (path, new_point) = connect_path(variant, &ends, waypoint, &mut scale);
            Candidate { variant, path, new_point }
        });
        let routed = std::iter::once(()).flat_map(move |()| routed_candidates(state, a, b, &from_exits, &to_exits));
        Ok(Box::new(curves.chain(routed)))
    }

    /// First candidate that passes full validation against `state`.
    ///
    /// An exhausted ladder is `SynthesisFailed`, for loops too: the smallest loop is
    /// not handed back for the validator to reject, since the validator has already
    /// rejected it here.
    pub fn synthesize(
        &self,
        state: &GameState,
        from: PointId,
        to: PointId,
        waypoint: Option<Vec2>,
    ) -> Result<Synthesized> {
        check_capacity(state, from, to)?;
        let mut tried = 0usize;
        let found = self.candidates(state, from, to, waypoint)?.find_map(|cand| {
            tried += 1;
            let conn = Connection { from, to, path: &cand.path, new_point: cand.new_point };
            match validate_connection(state, &conn) {
                Ok(path) => Some(Synthesized { variant: cand.variant, path, new_point: cand.new_point }),
                Err(err) => {
                    debug!("synth {from}->{to}: {:?} rejected: {err}", cand.variant);
                    None
                }
            }
        });
        match found {
            Some(s) => {
                debug!("synth {from}->{to}: accepted {:?} after {tried} candidates", s.variant);
                Ok(s)
            }
            None => {
                debug!("synth {from}->{to}: ladder exhausted after {tried} candidates");
                Err(SproutsError::SynthesisFailed { from, to })
            }
        }
    }
}

/// Endpoint positions and their free-sector exits.
struct Ends {
    a: Vec2,
    b: Vec2,
    from_exits: Vec<Vec2>,
    to_exits: Vec<Vec2>,
}

/// Grid routes between every pair of exits, each starting and ending with a straight
/// lead-out. The sprout goes at half the route's length.
fn routed_candidates(state: &GameState, a: Vec2, b: Vec2, from_exits: &[Vec2], to_exits: &[Vec2]) -> Vec<Candidate> {
    let Some(grid) = Grid::build(state) else { return Vec::new() };
    let mut out = Vec::new();
    for (from_exit, &da) in from_exits.iter().enumerate() {
        let Some(flood) = grid.flood(a + da * LEAD) else { continue };
        for (to_exit, &db) in to_exits.iter().enumerate() {
            let Some(route) = flood.trace(b + db * LEAD) else { continue };
            let mut path = Vec::with_capacity(route.len() + 2);
            path.push(a);
            path.extend(route);
            path.push(b);
            let new_point = point_at_param(&path, 0.5);
            out.push(Candidate { variant: Variant::Routed { from_exit, to_exit }, path, new_point });
        }
    }
    debug!("grid search produced {} routes", out.len());
    out
}

fn connect_path(
    variant: Variant,
    ends: &Ends,
    waypoint: Option<Vec2>,
    scale: &mut impl FnMut() -> f64,
) -> (Vec<Vec2>, Vec2) {
    let (a, b) = (ends.a, ends.b);
    let chord = b - a;
    let len = length(chord);
    let normal = normalize(perp(chord));
    let offset = |h: f64| (h.abs() * len).max(MIN_BOW) * h.signum();
    let mid = midpoint(a, b);
    let sampled = |path: Vec<Vec2>| {
        let np = path[path.len() / 2];
        (path, np)
    };
    match variant {
        Variant::Direct => {
            let w = waypoint.unwrap_or(mid);
            (vec![a, w, b], w)
        }
        Variant::Through => sampled(QuadBezier::through(a, waypoint.unwrap_or(mid), b).sample(CURVE_SEGMENTS)),
        Variant::Bow { height } => {
            let ctrl = mid + normal * (offset(height) * scale());
            sampled(QuadBezier::new(a, ctrl, b).sample(CURVE_SEGMENTS))
        }
        Variant::SCurve { height } => {
            let h = offset(height) * scale();
            let c1 = a + chord * (1.0 / 3.0) + normal * h;
            let c2 = a + chord * (2.0 / 3.0) - normal * h;
            sampled(CubicBezier::new(a, c1, c2, b).sample(CURVE_SEGMENTS))
        }
        Variant::Exit { from_exit, to_exit, reach } => {
            let r = (reach * len).max(MIN_BOW) * scale();
            let da = ends.from_exits.get(from_exit).copied().unwrap_or(normal);
            let db = ends.to_exits.get(to_exit).copied().unwrap_or(normal);
            sampled(CubicBezier::new(a, a + da * r, b + db * r, b).sample(2 * CURVE_SEGMENTS))
        }
        // Loops and routes never come through here; treat them like the straight fallback.
        Variant::Straight | Variant::Loop { .. } | Variant::Routed { .. } => {
            sampled(QuadBezier::new(a, mid, b).sample(CURVE_SEGMENTS))
        }
    }
}

/// Unit heading from the point towards the loop centre: towards the waypoint when
/// given, otherwise away from the canvas centre.
fn loop_heading(a: Vec2, waypoint: Option<Vec2>, settings: &Settings) -> Vec2 {
    let towards = waypoint.map(|w| normalize(w - a)).unwrap_or(Vec2::ZERO);
    if towards != Vec2::ZERO {
        return towards;
    }
    let centre = Vec2::new(settings.width * 0.5, settings.height * 0.5);
    let away = normalize(a - centre);
    if away != Vec2::ZERO { away } else { Vec2::new(0.0, -1.0) }
}

/// Closed polygon on the circle through `a` whose centre is `a + dir * radius`.
/// The first and last samples are exactly `a`.
pub fn loop_path(a: Vec2, dir: Vec2, radius: f64, segments: usize) -> Vec<Vec2> {
    let n = segments.max(3);
    let centre = a + dir * radius;
    let rel = a - centre;
    let start = rel.y.atan2(rel.x);
    let mut out = Vec::with_capacity(n + 1);
    out.push(a);
    for i in 1..n {
        let ang = start + TAU * i as f64 / n as f64;
        out.push(Vec2::new(centre.x + radius * ang.cos(), centre.y + radius * ang.sin()));
    }
    out.push(a);
    out
}

/// Sample used as the new point of a loop: the one nearest the waypoint within the
/// far half of the loop, or the antipode.
fn loop_insert_index(path: &[Vec2], waypoint: Option<Vec2>) -> usize {
    let n = path.len() - 1;
    let (lo, hi) = (n / 4, (3 * n) / 4);
    match waypoint {
        Some(w) => (lo..=hi)
            .min_by(|&i, &j| dist(path[i], w).total_cmp(&dist(path[j], w)))
            .unwrap_or(n / 2),
        None => n / 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::intersect::{cross_crossing, self_intersects};
    use crate::geometry::path::is_closed;
    use crate::model::{Curve, CurveId, Phase, PlayerId, Point};
    use std::sync::Arc;

    fn v(x: f64, y: f64) -> Vec2 { Vec2::new(x, y) }

    fn point(id: u32, pos: Vec2, incident: Vec<CurveId>) -> Arc<Point> {
        Arc::new(Point { id: PointId(id), pos, incident, created_at: 0 })
    }

    fn state(points: Vec<Arc<Point>>, curves: Vec<Arc<Curve>>) -> GameState {
        GameState {
            settings: Settings::default(),
            players: vec![PlayerId::new("a"), PlayerId::new("b")],
            points,
            curves,
            current: 0,
            legal_move_count: 1,
            phase: Phase::Playing,
            history: Vec::new(),
            winner: None,
            terminal_reason: None,
        }
    }

    #[test]
    fn free_pair_takes_direct_path() {
        let s = state(vec![point(0, v(100.0, 300.0), vec![]), point(1, v(500.0, 300.0), vec![])], vec![]);
        let out = Synthesizer::default().synthesize(&s, PointId(0), PointId(1), None).unwrap();
        assert_eq!(out.variant, Variant::Direct);
        assert_eq!(out.path, vec![v(100.0, 300.0), v(300.0, 300.0), v(500.0, 300.0)]);
        assert_eq!(out.new_point, v(300.0, 300.0));
    }

    #[test]
    fn blocked_straight_line_bends_around() {
        // vertical wall x=300, y in [100, 500] with its inserted point at (300, 300)
        let wall = Arc::new(Curve {
            id: CurveId(0),
            start: PointId(2),
            end: PointId(3),
            path: vec![v(300.0, 100.0), v(300.0, 300.0), v(300.0, 500.0)],
            inserted: PointId(4),
            created_at: 1,
        });
        let s = state(
            vec![
                point(0, v(100.0, 300.0), vec![]),
                point(1, v(500.0, 300.0), vec![]),
                point(2, v(300.0, 100.0), vec![CurveId(0)]),
                point(3, v(300.0, 500.0), vec![CurveId(0)]),
                point(4, v(300.0, 300.0), vec![CurveId(0), CurveId(0)]),
            ],
            vec![wall.clone()],
        );
        let out = Synthesizer::default().synthesize(&s, PointId(0), PointId(1), None).unwrap();
        assert!(matches!(out.variant, Variant::Bow { .. } | Variant::SCurve { .. }), "{:?}", out.variant);
        assert!(cross_crossing(&out.path, &wall.path).is_none());
        assert!(!self_intersects(&out.path));
    }

    #[test]
    fn enclosed_point_cannot_reach_outside() {
        // loop from p1 around p0; p3 sits outside it
        let ring = loop_path(v(100.0, 300.0), v(1.0, 0.0), 300.0, LOOP_SEGMENTS);
        let inserted = ring[LOOP_SEGMENTS / 2];
        let s = state(
            vec![
                point(0, v(400.0, 300.0), vec![]),
                point(1, v(100.0, 300.0), vec![CurveId(0), CurveId(0)]),
                point(2, inserted, vec![CurveId(0), CurveId(0)]),
                point(3, v(40.0, 40.0), vec![]),
            ],
            vec![Arc::new(Curve {
                id: CurveId(0),
                start: PointId(1),
                end: PointId(1),
                path: ring,
                inserted: PointId(2),
                created_at: 1,
            })],
        );
        let err = Synthesizer::default().synthesize(&s, PointId(0), PointId(3), None).unwrap_err();
        assert_eq!(err, SproutsError::SynthesisFailed { from: PointId(0), to: PointId(3) });
    }

    #[test]
    fn loop_is_closed_and_simple() {
        let s = state(vec![point(0, v(400.0, 100.0), vec![]), point(1, v(400.0, 500.0), vec![])], vec![]);
        let out = Synthesizer::default().synthesize(&s, PointId(0), PointId(0), None).unwrap();
        assert!(matches!(out.variant, Variant::Loop { .. }));
        assert!(is_closed(&out.path));
        assert!(!self_intersects(&out.path));
        assert_eq!(out.path[0], v(400.0, 100.0));
    }

    #[test]
    fn hemmed_in_point_loops_by_routing() {
        // a ring of points too tight for any circle
        let a = v(200.0, 200.0);
        let mut points = vec![point(0, a, vec![])];
        for i in 0..30u32 {
            let ang = TAU * i as f64 / 30.0;
            points.push(point(i + 1, a + v(45.0 * ang.cos(), 45.0 * ang.sin()), vec![]));
        }
        let s = state(points, vec![]);
        let out = Synthesizer::default().synthesize(&s, PointId(0), PointId(0), None).unwrap();
        assert!(matches!(out.variant, Variant::Routed { .. }), "{:?}", out.variant);
        assert!(is_closed(&out.path));
        assert!(!self_intersects(&out.path));
        assert!(dist(out.new_point, a) >= crate::geometry::tolerance::MIN_POINT_SEPARATION);
    }

    #[test]
    fn jitter_is_reproducible_for_a_seed() {
        let s = state(vec![point(0, v(400.0, 100.0), vec![]), point(1, v(400.0, 500.0), vec![])], vec![]);
        let a: Vec<_> = Synthesizer::new(0.1, 7).candidates(&s, PointId(0), PointId(0), None).unwrap().take(4).collect();
        let b: Vec<_> = Synthesizer::new(0.1, 7).candidates(&s, PointId(0), PointId(0), None).unwrap().take(4).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn full_point_is_reported_not_synthesized() {
        let s = state(vec![point(0, v(0.0, 0.0), vec![CurveId(0); 3]), point(1, v(200.0, 0.0), vec![])], vec![]);
        let err = Synthesizer::default().synthesize(&s, PointId(0), PointId(1), None).unwrap_err();
        assert!(matches!(err, SproutsError::ConnectionLimitExceeded { .. }));
    }
}
