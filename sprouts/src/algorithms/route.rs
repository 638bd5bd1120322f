//! Grid search for connections the curve ladder cannot draw.
//!
//! The area around the drawing is rasterised into square cells and every cell close
//! to a curve or a point is blocked. A breadth-first flood starts from a lead-out
//! point just off one endpoint, inside one of its free sectors, and a route is traced
//! back from the lead-out point of the other endpoint. The cell chain is then
//! straightened with line-of-sight shortcuts over free cells.
//!
//! Routes are only proposals: the validator decides.

use crate::geometry::math::{dist, normalize, rotate, seg_distance_sq};
use crate::geometry::path::Bbox;
use crate::geometry::tolerance::{EPS_EXACT, MIN_POINT_SEPARATION, POINT_CLEARANCE};
use crate::model::{GameState, PointId, Vec2};
use std::collections::VecDeque;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_3, TAU};

/// Preferred cell edge; grown when the drawing is large.
pub const CELL: f64 = 4.0;
/// Length of the straight run from an endpoint to where the search starts.
pub const LEAD: f64 = 20.0;
const MARGIN: f64 = 80.0;
const MAX_CELLS: usize = 200_000;
const NONE: u32 = u32::MAX;

/// Unit directions leaving `id` through the free sectors between its curve ends,
/// widest sector first. A point without curves offers `toward`, both sides of it,
/// and its reverse.
pub fn exits(state: &GameState, id: PointId, toward: Vec2) -> Vec<Vec2> {
    let Some(p) = state.point(id) else { return Vec::new() };
    let mut ids = p.incident.clone();
    ids.sort();
    ids.dedup();

    let mut angles: Vec<f64> = Vec::with_capacity(3);
    let mut push = |q: Vec2| {
        let d = q - p.pos;
        if d != Vec2::ZERO {
            angles.push(d.y.atan2(d.x));
        }
    };
    for cid in ids {
        let Some(c) = state.curve(cid) else { continue };
        let n = c.path.len();
        if n < 2 {
            continue;
        }
        if c.start == id {
            push(c.path[1]);
        }
        if c.end == id {
            push(c.path[n - 2]);
        }
        if c.inserted == id {
            if let Some(i) = (1..n - 1).find(|&i| dist(c.path[i], p.pos) <= EPS_EXACT) {
                push(c.path[i - 1]);
                push(c.path[i + 1]);
            }
        }
    }

    if angles.is_empty() {
        let d = normalize(toward);
        let base = if d == Vec2::ZERO { Vec2::new(1.0, 0.0) } else { d };
        return vec![base, rotate(base, FRAC_PI_2), rotate(base, -FRAC_PI_2), -base];
    }

    angles.sort_by(f64::total_cmp);
    let k = angles.len();
    let mut sectors: Vec<(f64, f64)> = (0..k)
        .map(|i| {
            let next = if i + 1 < k { angles[i + 1] } else { angles[0] + TAU };
            let gap = next - angles[i];
            (gap, angles[i] + gap * 0.5)
        })
        .collect();
    sectors.sort_by(|x, y| y.0.total_cmp(&x.0));

    let mut out: Vec<Vec2> = sectors.iter().map(|&(_, a)| Vec2::new(a.cos(), a.sin())).collect();
    if k == 1 {
        let mid = out[0];
        out.push(rotate(mid, FRAC_PI_3));
        out.push(rotate(mid, -FRAC_PI_3));
    }
    out
}

/// Blocked/free raster of the drawing.
#[derive(Clone, Debug)]
pub struct Grid {
    origin: Vec2,
    cell: f64,
    cols: usize,
    rows: usize,
    blocked: Vec<bool>,
}

/// Result of a flood: the parent of every reached cell.
pub struct Flood<'g> {
    grid: &'g Grid,
    start: Vec2,
    parent: Vec<u32>,
}

impl Grid {
    /// Raster of every curve and point in `state`. `None` when there is nothing to
    /// rasterise.
    pub fn build(state: &GameState) -> Option<Grid> {
        let all: Vec<Vec2> = state
            .points
            .iter()
            .map(|p| p.pos)
            .chain(state.curves.iter().flat_map(|c| c.path.iter().copied()))
            .collect();
        let bb = Bbox::of(&all)?.inflate(MARGIN);
        let (w, h) = (bb.max.x - bb.min.x, bb.max.y - bb.min.y);
        let cell = CELL.max((w * h / MAX_CELLS as f64).sqrt());
        let cols = (w / cell).ceil() as usize + 1;
        let rows = (h / cell).ceil() as usize + 1;
        let mut grid = Grid { origin: bb.min, cell, cols, rows, blocked: vec![false; cols * rows] };

        let clear = POINT_CLEARANCE + cell;
        for c in &state.curves {
            for w in c.path.windows(2) {
                grid.block_near(w[0], w[1], clear);
            }
        }
        // a route's sprout may land anywhere on it
        let around_point = MIN_POINT_SEPARATION + cell;
        for p in &state.points {
            grid.block_near(p.pos, p.pos, around_point);
        }
        Some(grid)
    }

    fn block_near(&mut self, a: Vec2, b: Vec2, clear: f64) {
        let c2 = clear * clear;
        let (x0, y0) = self.coords(Vec2::new(a.x.min(b.x) - clear, a.y.min(b.y) - clear));
        let (x1, y1) = self.coords(Vec2::new(a.x.max(b.x) + clear, a.y.max(b.y) + clear));
        for cy in y0..=y1 {
            for cx in x0..=x1 {
                let i = cy * self.cols + cx;
                if !self.blocked[i] && seg_distance_sq(self.centre(i), a, b) < c2 {
                    self.blocked[i] = true;
                }
            }
        }
    }

    /// Column and row of `p`, clamped into the grid.
    fn coords(&self, p: Vec2) -> (usize, usize) {
        let cx = ((p.x - self.origin.x) / self.cell).floor().clamp(0.0, (self.cols - 1) as f64);
        let cy = ((p.y - self.origin.y) / self.cell).floor().clamp(0.0, (self.rows - 1) as f64);
        (cx as usize, cy as usize)
    }

    fn index(&self, p: Vec2) -> Option<usize> {
        let fx = ((p.x - self.origin.x) / self.cell).floor();
        let fy = ((p.y - self.origin.y) / self.cell).floor();
        if !(fx >= 0.0 && fy >= 0.0 && fx < self.cols as f64 && fy < self.rows as f64) {
            return None;
        }
        Some(fy as usize * self.cols + fx as usize)
    }

    fn centre(&self, i: usize) -> Vec2 {
        let (cx, cy) = (i % self.cols, i / self.cols);
        Vec2::new(
            self.origin.x + (cx as f64 + 0.5) * self.cell,
            self.origin.y + (cy as f64 + 0.5) * self.cell,
        )
    }

    pub fn is_free(&self, p: Vec2) -> bool {
        self.index(p).is_some_and(|i| !self.blocked[i])
    }

    fn neighbours(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        let (cx, cy) = ((i % self.cols) as isize, (i / self.cols) as isize);
        let (cols, rows) = (self.cols as isize, self.rows as isize);
        let at = move |x: isize, y: isize| (x >= 0 && y >= 0 && x < cols && y < rows).then(|| (y * cols + x) as usize);
        const STEPS: [(isize, isize); 8] = [(1, 0), (-1, 0), (0, 1), (0, -1), (1, 1), (1, -1), (-1, 1), (-1, -1)];
        STEPS.into_iter().filter_map(move |(dx, dy)| {
            let n = at(cx + dx, cy + dy)?;
            if self.blocked[n] {
                return None;
            }
            // no corner cutting on diagonal steps
            if dx != 0 && dy != 0 {
                let side_a = at(cx + dx, cy)?;
                let side_b = at(cx, cy + dy)?;
                if self.blocked[side_a] || self.blocked[side_b] {
                    return None;
                }
            }
            Some(n)
        })
    }

    /// Breadth-first flood from the free cell holding `start`.
    pub fn flood(&self, start: Vec2) -> Option<Flood<'_>> {
        let s = self.index(start).filter(|&i| !self.blocked[i])?;
        let mut parent = vec![NONE; self.blocked.len()];
        parent[s] = s as u32;
        let mut queue = VecDeque::new();
        queue.push_back(s);
        while let Some(i) = queue.pop_front() {
            for n in self.neighbours(i) {
                if parent[n] == NONE {
                    parent[n] = i as u32;
                    queue.push_back(n);
                }
            }
        }
        Some(Flood { grid: self, start, parent })
    }

    /// Every sample along `a..b`, at half-cell steps, falls in a free cell.
    fn line_is_free(&self, a: Vec2, b: Vec2) -> bool {
        let steps = (dist(a, b) / (self.cell * 0.5)).ceil().max(1.0) as usize;
        (0..=steps).all(|k| self.is_free(a + (b - a) * (k as f64 / steps as f64)))
    }
}

impl Flood<'_> {
    /// Straightened route from the flood start to `goal`, both included; `None` when
    /// `goal` lies in another region.
    pub fn trace(&self, goal: Vec2) -> Option<Vec<Vec2>> {
        let grid = self.grid;
        let g = grid.index(goal)?;
        if self.parent[g] == NONE {
            return None;
        }
        let mut cells = vec![g];
        let mut i = g;
        while self.parent[i] as usize != i {
            i = self.parent[i] as usize;
            cells.push(i);
        }
        cells.reverse();

        let mut chain: Vec<Vec2> = Vec::with_capacity(cells.len() + 2);
        chain.push(self.start);
        chain.extend(cells.iter().skip(1).take(cells.len().saturating_sub(2)).map(|&c| grid.centre(c)));
        chain.push(goal);

        let mut out = vec![chain[0]];
        let mut at = 0;
        while at + 1 < chain.len() {
            let mut next = at + 1;
            while next + 1 < chain.len() && grid.line_is_free(chain[at], chain[next + 1]) {
                next += 1;
            }
            out.push(chain[next]);
            at = next;
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::create_initial_state;
    use crate::model::{PlayerId, Settings};

    fn v(x: f64, y: f64) -> Vec2 { Vec2::new(x, y) }

    #[test]
    fn lone_point_exits_towards_the_target_first() {
        let s = create_initial_state(Settings::default(), vec![PlayerId::new("a"), PlayerId::new("b")]).unwrap();
        let out = exits(&s, PointId(0), v(0.0, 5.0));
        assert_eq!(out.len(), 4);
        assert_eq!(out[0], v(0.0, 1.0));
        assert!(dist(out[3], v(0.0, -1.0)) < 1e-12);
    }

    #[test]
    fn flood_goes_around_a_wall() {
        let mut s = create_initial_state(Settings::default(), vec![PlayerId::new("a"), PlayerId::new("b")]).unwrap();
        let wall = crate::model::Curve {
            id: crate::model::CurveId(0),
            start: PointId(0),
            end: PointId(1),
            path: vec![s.points[0].pos, s.points[1].pos],
            inserted: PointId(0),
            created_at: 1,
        };
        s.curves.push(std::sync::Arc::new(wall.clone()));
        let grid = Grid::build(&s).unwrap();
        let mid = (wall.path[0] + wall.path[1]) * 0.5;
        let side = normalize(crate::geometry::math::perp(wall.path[1] - wall.path[0]));
        let start = mid + side * 40.0;
        let goal = mid - side * 40.0;
        assert!(grid.is_free(start) && grid.is_free(goal));
        let route = grid.flood(start).unwrap().trace(goal).unwrap();
        assert_eq!(route.first(), Some(&start));
        assert_eq!(route.last(), Some(&goal));
        assert!(route.len() > 2);
        for w in route.windows(2) {
            assert!(crate::geometry::intersect::segment_intersection(w[0], w[1], wall.path[0], wall.path[1]).is_none());
        }
    }
}
