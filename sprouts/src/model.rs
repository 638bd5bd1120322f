use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::sync::Arc;

/// Maximum curve-ends a point can carry.
pub const MAX_INCIDENT: usize = 3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    #[inline]
    fn add(self, o: Vec2) -> Vec2 { Vec2::new(self.x + o.x, self.y + o.y) }
}

impl Sub for Vec2 {
    type Output = Vec2;
    #[inline]
    fn sub(self, o: Vec2) -> Vec2 { Vec2::new(self.x - o.x, self.y - o.y) }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn mul(self, s: f64) -> Vec2 { Vec2::new(self.x * s, self.y * s) }
}

impl Neg for Vec2 {
    type Output = Vec2;
    #[inline]
    fn neg(self) -> Vec2 { Vec2::new(-self.x, -self.y) }
}

/// Point identity; also the index into `GameState::points`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointId(pub u32);

/// Curve identity; also the index into `GameState::curves`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurveId(pub u32);

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PointId {
    #[inline] pub fn index(self) -> usize { self.0 as usize }
}

impl CurveId {
    #[inline] pub fn index(self) -> usize { self.0 as usize }
}

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "p{}", self.0) }
}

impl fmt::Display for CurveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "c{}", self.0) }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: PointId,
    pub pos: Vec2,
    /// Curve-ends touching this point; a loop or an inserted point lists its curve twice.
    pub incident: Vec<CurveId>,
    pub created_at: u32,
}

impl Point {
    /// Remaining connection slots.
    #[inline]
    pub fn spare(&self) -> usize {
        MAX_INCIDENT.saturating_sub(self.incident.len())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    pub id: CurveId,
    pub start: PointId,
    pub end: PointId,
    /// Sampled path; first sample is the start position, last is the end position.
    pub path: Vec<Vec2>,
    /// The point placed on this curve when it was drawn.
    pub inserted: PointId,
    pub created_at: u32,
}

impl Curve {
    #[inline]
    pub fn is_loop(&self) -> bool { self.start == self.end }

    /// Points a curve is allowed to touch: both ends and its own inserted point.
    pub fn own_points(&self) -> [PointId; 3] { [self.start, self.end, self.inserted] }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MoveAction {
    Connect {
        from: PointId,
        to: PointId,
        path: Vec<Vec2>,
        new_point: Vec2,
        new_curve_id: CurveId,
        new_point_id: PointId,
    },
    Resign,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Move {
    pub player: PlayerId,
    pub timestamp: u64,
    pub action: MoveAction,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub point_count: usize,
    pub width: f64,
    pub height: f64,
    /// Cosmetic scale jitter for synthesized curves, fraction in [0, 0.25].
    pub jitter: f64,
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self { point_count: 3, width: 800.0, height: 600.0, jitter: 0.0, seed: 0 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Playing,
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalReason {
    NoLegalMoves,
    Resignation,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub winner: PlayerId,
    pub reason: TerminalReason,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub scores: Vec<(PlayerId, u32)>,
}

impl Scoreboard {
    pub fn score_of(&self, player: &PlayerId) -> Option<u32> {
        self.scores.iter().find(|(p, _)| p == player).map(|(_, s)| *s)
    }
}

/// Immutable game snapshot. Records are shared between snapshots through `Arc`,
/// so cloning a state is a shallow pointer copy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub settings: Settings,
    pub players: Vec<PlayerId>,
    pub points: Vec<Arc<Point>>,
    pub curves: Vec<Arc<Curve>>,
    pub current: usize,
    pub legal_move_count: usize,
    pub phase: Phase,
    pub history: Vec<Arc<Move>>,
    pub winner: Option<PlayerId>,
    pub terminal_reason: Option<TerminalReason>,
}

impl GameState {
    pub fn point(&self, id: PointId) -> Option<&Point> {
        self.points.get(id.index()).map(|p| p.as_ref())
    }

    pub fn curve(&self, id: CurveId) -> Option<&Curve> {
        self.curves.get(id.index()).map(|c| c.as_ref())
    }

    pub fn next_point_id(&self) -> PointId { PointId(self.points.len() as u32) }

    pub fn next_curve_id(&self) -> CurveId { CurveId(self.curves.len() as u32) }

    /// Number of connect moves applied so far.
    pub fn move_index(&self) -> u32 { self.curves.len() as u32 }

    pub fn current_player(&self) -> &PlayerId { &self.players[self.current % self.players.len()] }

    pub fn opponent_of(&self, player: &PlayerId) -> Option<&PlayerId> {
        self.players.iter().find(|p| *p != player)
    }

    pub fn is_finished(&self) -> bool { self.phase == Phase::Finished }
}
