use crate::model::{PlayerId, PointId};

/// Every rule, geometry, and persistence failure the engine reports.
///
/// Geometry failures are ordinary outcomes: callers are expected to try another
/// point pair or waypoint rather than treat them as fatal.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SproutsError {
    #[error("invalid game state: {reason}")]
    InvalidGameState { reason: String },
    #[error("not your turn: expected {expected}, got {got}")]
    NotYourTurn { expected: PlayerId, got: PlayerId },
    #[error("game is over")]
    GameOver,
    #[error("invalid move: {reason}")]
    InvalidMove {
        reason: String,
        #[source]
        cause: Option<Box<SproutsError>>,
    },
    #[error("unknown point {point}")]
    UnknownPoint { point: PointId },
    #[error("point {point} has {spare} spare connections, {needed} needed")]
    ConnectionLimitExceeded { point: PointId, spare: usize, needed: usize },
    #[error("invalid curve: {reason}")]
    InvalidCurve { reason: String },
    #[error("invalid new point: {reason}")]
    InvalidNewPoint { reason: String },
    #[error("no valid path between {from} and {to}")]
    SynthesisFailed { from: PointId, to: PointId },
}

impl SproutsError {
    pub fn invalid_state(reason: impl Into<String>) -> Self {
        Self::InvalidGameState { reason: reason.into() }
    }

    pub fn invalid_move(reason: impl Into<String>) -> Self {
        Self::InvalidMove { reason: reason.into(), cause: None }
    }

    pub fn invalid_curve(reason: impl Into<String>) -> Self {
        Self::InvalidCurve { reason: reason.into() }
    }

    pub fn invalid_new_point(reason: impl Into<String>) -> Self {
        Self::InvalidNewPoint { reason: reason.into() }
    }

    /// Wrap a validation failure observed while applying a move.
    pub fn rejected(cause: SproutsError) -> Self {
        Self::InvalidMove { reason: format!("re-validation failed: {cause}"), cause: Some(Box::new(cause)) }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidGameState { .. } => "invalid_game_state",
            Self::NotYourTurn { .. } => "not_your_turn",
            Self::GameOver => "game_over",
            Self::InvalidMove { .. } => "invalid_move",
            Self::UnknownPoint { .. } => "unknown_point",
            Self::ConnectionLimitExceeded { .. } => "connection_limit_exceeded",
            Self::InvalidCurve { .. } => "invalid_curve",
            Self::InvalidNewPoint { .. } => "invalid_new_point",
            Self::SynthesisFailed { .. } => "synthesis_failed",
        }
    }

    /// The innermost error, looking through apply-time wrapping.
    pub fn root_cause(&self) -> &SproutsError {
        match self {
            Self::InvalidMove { cause: Some(inner), .. } => inner.root_cause(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, SproutsError>;

/// Outcome of a pure validation pass.
pub type ValidationResult = Result<()>;
