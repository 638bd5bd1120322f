//! Sprouts: two players take turns joining points with non-crossing curves, each curve
//! sprouting a new point. A point holds at most three curve ends; whoever draws the
//! last curve wins.
//!
//! Every operation takes an immutable [`GameState`] and returns a new one. Snapshots
//! share their points, curves, and history through `Arc`.

pub mod error;
pub mod model;
pub mod geometry {
    pub mod bezier;
    pub mod intersect;
    pub mod limits;
    pub mod math;
    pub mod path;
    pub mod tolerance;
}
pub mod algorithms {
    pub mod moves;
    pub mod picking;
    pub mod route;
    pub mod synth;
    pub mod validate;
}
pub mod game;
pub mod session;
mod json;

pub use algorithms::picking::{pick, pick_point, pick_point_with_capacity, Pick};
pub use algorithms::synth::{Synthesized, Synthesizer, Variant};
pub use error::{Result, SproutsError, ValidationResult};
pub use game::{
    apply_move, create_initial_state, evaluate, get_legal_moves, is_terminal, propose_move,
    resign_move, validate_move,
};
pub use json::{deserialize_state, serialize_state, DOC_VERSION};
pub use model::{
    Curve, CurveId, GameState, Move, MoveAction, Outcome, Phase, PlayerId, Point, PointId,
    Scoreboard, Settings, TerminalReason, Vec2, MAX_INCIDENT,
};
pub use session::GameSession;

impl GameState {
    pub fn to_json_value(&self) -> Result<serde_json::Value> {
        json::to_json_value(self)
    }
    pub fn from_json_value(v: serde_json::Value) -> Result<GameState> {
        json::from_json_value(v)
    }
    /// Capacity-legal pairs `(a, b)` with `a <= b`; geometry is not consulted.
    pub fn legal_pairs(&self) -> Vec<(PointId, PointId)> {
        game::candidate_pairs(self)
    }
    /// Spare curve-end slots of a point, or `None` for an unknown id.
    pub fn spare(&self, id: PointId) -> Option<usize> {
        self.point(id).map(Point::spare)
    }
}
