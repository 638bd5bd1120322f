use crate::algorithms::moves::legal_pair_count;
use crate::algorithms::validate::{check_consistency, check_planarity};
use crate::error::{Result, SproutsError, ValidationResult};
use crate::game::{check_players, check_settings};
use crate::geometry::limits;
use crate::model::{GameState, MoveAction, Phase, TerminalReason};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DOC_VERSION: u32 = 1;

#[derive(Serialize)]
struct DocSer<'a> {
    version: u32,
    state: &'a GameState,
}

#[derive(Deserialize)]
struct DocDe {
    version: Option<u32>,
    state: GameState,
}

pub fn to_json_value(state: &GameState) -> Result<Value> {
    serde_json::to_value(DocSer { version: DOC_VERSION, state })
        .map_err(|e| SproutsError::invalid_state(format!("serialize: {e}")))
}

pub fn serialize_state(state: &GameState) -> Result<String> {
    serde_json::to_string(&DocSer { version: DOC_VERSION, state })
        .map_err(|e| SproutsError::invalid_state(format!("serialize: {e}")))
}

fn check_limits(s: &GameState) -> ValidationResult {
    if s.points.len() > limits::MAX_TOTAL_POINTS || s.curves.len() > limits::MAX_TOTAL_CURVES {
        return Err(SproutsError::invalid_state("too many points or curves"));
    }
    if s.history.len() > limits::MAX_TOTAL_CURVES + 1 {
        return Err(SproutsError::invalid_state("history is longer than any game"));
    }
    for p in &s.points {
        if !limits::in_coord_bounds(p.pos.x) || !limits::in_coord_bounds(p.pos.y) {
            return Err(SproutsError::invalid_state(format!("{} is out of range", p.id)));
        }
    }
    for c in &s.curves {
        if c.path.len() > limits::MAX_SAMPLES_PER_CURVE {
            return Err(SproutsError::invalid_state(format!("{} has too many samples", c.id)));
        }
        if !c.path.iter().all(|v| limits::in_coord_bounds(v.x) && limits::in_coord_bounds(v.y)) {
            return Err(SproutsError::invalid_state(format!("{} has out-of-range samples", c.id)));
        }
    }
    Ok(())
}

fn check_bookkeeping(s: &GameState) -> ValidationResult {
    let bad = |msg: &str| Err(SproutsError::invalid_state(msg));
    if s.points.len() != s.settings.point_count + s.curves.len() {
        return bad("every curve must add exactly one point");
    }
    if s.points[..s.settings.point_count].iter().any(|p| p.created_at != 0) {
        return bad("starting points must be created at move 0");
    }
    if s.current >= s.players.len() {
        return bad("current player index out of range");
    }
    if s.legal_move_count != legal_pair_count(&s.points) {
        return bad("stored legal move count disagrees with the points");
    }
    let connects = s.history.iter().filter(|m| matches!(m.action, MoveAction::Connect { .. })).count();
    let resigns = s.history.len() - connects;
    if connects != s.curves.len() || resigns > 1 {
        return bad("history disagrees with the curves");
    }
    if s.history.iter().any(|m| !s.players.contains(&m.player)) {
        return bad("history names an unknown player");
    }
    if s.history.iter().enumerate().any(|(i, m)| m.player != s.players[i % s.players.len()]) {
        return bad("history is out of turn");
    }
    if s.current != connects % s.players.len() {
        return bad("current player disagrees with the history");
    }
    let mut curves = s.curves.iter();
    for (i, m) in s.history.iter().enumerate() {
        match &m.action {
            MoveAction::Resign if i + 1 != s.history.len() => return bad("moves recorded after a resignation"),
            MoveAction::Resign => {}
            MoveAction::Connect { from, to, new_curve_id, new_point_id, .. } => {
                let Some(c) = curves.next() else { return bad("history disagrees with the curves") };
                if c.id != *new_curve_id || c.start != *from || c.end != *to || c.inserted != *new_point_id {
                    return bad("history disagrees with the curves");
                }
            }
        }
    }
    let last_mover = s.history.last().map(|m| &m.player);
    match s.phase {
        Phase::Playing => {
            if s.winner.is_some() || s.terminal_reason.is_some() || resigns > 0 {
                return bad("game in progress has an outcome");
            }
            if s.legal_move_count == 0 {
                return bad("game in progress has no legal moves");
            }
        }
        Phase::Finished => {
            let Some(winner) = &s.winner else { return bad("finished game has no winner") };
            if !s.players.contains(winner) {
                return bad("winner is not a player");
            }
            let rightful = match s.terminal_reason {
                Some(TerminalReason::NoLegalMoves) if s.legal_move_count == 0 && resigns == 0 => last_mover,
                Some(TerminalReason::Resignation) if resigns == 1 => last_mover.and_then(|m| s.opponent_of(m)),
                _ => return bad("terminal reason disagrees with the state"),
            };
            if rightful != Some(winner) {
                return bad("winner disagrees with the history");
            }
        }
    }
    Ok(())
}

fn check_document(s: &GameState) -> ValidationResult {
    check_settings(&s.settings)?;
    check_players(&s.players)?;
    check_limits(s)?;
    check_consistency(&s.points, &s.curves)?;
    check_planarity(&s.points, &s.curves).map_err(|e| SproutsError::invalid_state(e.to_string()))?;
    check_bookkeeping(s)
}

pub fn from_json_value(v: Value) -> Result<GameState> {
    let doc: DocDe = serde_json::from_value(v).map_err(|e| {
        warn!("rejecting game document: {e}");
        SproutsError::invalid_state(format!("malformed document: {e}"))
    })?;
    accept(doc)
}

/// Parse and fully re-validate a serialized game. Anything that could not have been
/// produced by legal play is rejected with `InvalidGameState`.
pub fn deserialize_state(text: &str) -> Result<GameState> {
    let doc: DocDe = serde_json::from_str(text).map_err(|e| {
        warn!("rejecting game document: {e}");
        SproutsError::invalid_state(format!("malformed document: {e}"))
    })?;
    accept(doc)
}

fn accept(doc: DocDe) -> Result<GameState> {
    let version = doc.version.unwrap_or(DOC_VERSION);
    if version != DOC_VERSION {
        warn!("rejecting game document: unsupported version {version}");
        return Err(SproutsError::invalid_state(format!("unsupported document version {version}")));
    }
    if let Err(e) = check_document(&doc.state) {
        warn!("rejecting game document: {e}");
        return Err(e);
    }
    Ok(doc.state)
}
