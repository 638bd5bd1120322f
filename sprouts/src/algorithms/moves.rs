//! Capacity-based enumeration of connectable point pairs.
//!
//! A pair is a legal target when both points have a spare slot; pairing a point with
//! itself needs two. Geometry is not consulted here, so a listed pair may still turn
//! out to have no drawable path.

use crate::model::{Point, PointId};
use std::sync::Arc;

fn spare_slots(points: &[Arc<Point>]) -> impl Iterator<Item = (PointId, usize)> + '_ {
    points.iter().map(|p| (p.id, p.spare())).filter(|&(_, s)| s > 0)
}

/// Every legal pair `(a, b)` with `a <= b`, in id order.
pub fn legal_pairs(points: &[Arc<Point>]) -> Vec<(PointId, PointId)> {
    let open: Vec<(PointId, usize)> = spare_slots(points).collect();
    let mut out = Vec::new();
    for (i, &(a, spare_a)) in open.iter().enumerate() {
        if spare_a >= 2 {
            out.push((a, a));
        }
        for &(b, _) in &open[i + 1..] {
            out.push((a, b));
        }
    }
    out
}

/// Number of legal pairs, without materializing them.
pub fn legal_pair_count(points: &[Arc<Point>]) -> usize {
    let (open, loops) = spare_slots(points).fold((0usize, 0usize), |(n, l), (_, s)| (n + 1, l + usize::from(s >= 2)));
    open * open.saturating_sub(1) / 2 + loops
}

pub fn is_legal_pair(points: &[Arc<Point>], a: PointId, b: PointId) -> bool {
    let spare = |id: PointId| points.get(id.index()).map_or(0, |p| p.spare());
    if a == b { spare(a) >= 2 } else { spare(a) >= 1 && spare(b) >= 1 }
}
