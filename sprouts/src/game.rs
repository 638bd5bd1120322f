//! Turn bookkeeping: validate, apply, and evaluate moves on immutable snapshots.

use crate::algorithms::moves::{legal_pair_count, legal_pairs};
use crate::algorithms::synth::Synthesizer;
use crate::algorithms::validate::{check_consistency, validate_connection, Connection};
use crate::error::{Result, SproutsError, ValidationResult};
use crate::geometry::limits::{in_canvas_bounds, MAX_JITTER, MAX_POINTS, MIN_POINTS, PLAYER_COUNT};
use crate::model::{
    Curve, GameState, Move, MoveAction, Outcome, Phase, PlayerId, Point, PointId, Scoreboard,
    Settings, TerminalReason, Vec2,
};
use log::{debug, info};
use std::f64::consts::{FRAC_PI_2, TAU};
use std::sync::Arc;

pub(crate) fn check_settings(settings: &Settings) -> ValidationResult {
    if !(MIN_POINTS..=MAX_POINTS).contains(&settings.point_count) {
        return Err(SproutsError::invalid_state(format!(
            "point count must be in {MIN_POINTS}..={MAX_POINTS}, got {}",
            settings.point_count
        )));
    }
    if !in_canvas_bounds(settings.width) || !in_canvas_bounds(settings.height) {
        return Err(SproutsError::invalid_state("canvas size out of range"));
    }
    if !(0.0..=MAX_JITTER).contains(&settings.jitter) {
        return Err(SproutsError::invalid_state(format!("jitter must be in 0..={MAX_JITTER}")));
    }
    Ok(())
}

pub(crate) fn check_players(players: &[PlayerId]) -> ValidationResult {
    if players.len() != PLAYER_COUNT {
        return Err(SproutsError::invalid_state(format!(
            "exactly {PLAYER_COUNT} players required, got {}",
            players.len()
        )));
    }
    if players[0] == players[1] {
        return Err(SproutsError::invalid_state("players must be distinct"));
    }
    if players.iter().any(|p| p.0.is_empty()) {
        return Err(SproutsError::invalid_state("player id must not be empty"));
    }
    Ok(())
}

/// Starting points evenly spaced on a circle in the middle of the canvas, the first
/// one at twelve o'clock.
pub fn starting_positions(settings: &Settings) -> Vec<Vec2> {
    let centre = Vec2::new(settings.width * 0.5, settings.height * 0.5);
    let radius = 0.3 * settings.width.min(settings.height);
    let n = settings.point_count;
    (0..n)
        .map(|i| {
            let ang = -FRAC_PI_2 + TAU * i as f64 / n as f64;
            Vec2::new(centre.x + radius * ang.cos(), centre.y + radius * ang.sin())
        })
        .collect()
}

pub fn create_initial_state(settings: Settings, players: Vec<PlayerId>) -> Result<GameState> {
    check_settings(&settings)?;
    check_players(&players)?;
    let points: Vec<Arc<Point>> = starting_positions(&settings)
        .into_iter()
        .enumerate()
        .map(|(i, pos)| Arc::new(Point { id: PointId(i as u32), pos, incident: Vec::new(), created_at: 0 }))
        .collect();
    let legal_move_count = legal_pair_count(&points);
    Ok(GameState {
        settings,
        players,
        points,
        curves: Vec::new(),
        current: 0,
        legal_move_count,
        phase: Phase::Playing,
        history: Vec::new(),
        winner: None,
        terminal_reason: None,
    })
}

/// Turn and shape checks, then the topology checks. Returns the path as it will be
/// stored for connect moves.
fn check_move(state: &GameState, mv: &Move, player: &PlayerId) -> Result<Option<Vec<Vec2>>> {
    if state.is_finished() {
        return Err(SproutsError::GameOver);
    }
    let expected = state.current_player();
    if player != expected {
        return Err(SproutsError::NotYourTurn { expected: expected.clone(), got: player.clone() });
    }
    if &mv.player != player {
        return Err(SproutsError::invalid_move(format!("move is signed by {}, not {player}", mv.player)));
    }
    match &mv.action {
        MoveAction::Resign => Ok(None),
        MoveAction::Connect { from, to, path, new_point, new_curve_id, new_point_id } => {
            if *new_point_id != state.next_point_id() || *new_curve_id != state.next_curve_id() {
                return Err(SproutsError::invalid_move(format!(
                    "new ids must be {} and {}",
                    state.next_point_id(),
                    state.next_curve_id()
                )));
            }
            let conn = Connection { from: *from, to: *to, path, new_point: *new_point };
            validate_connection(state, &conn).map(Some)
        }
    }
}

/// Pure check of a move on behalf of `player`.
pub fn validate_move(state: &GameState, mv: &Move, player: &PlayerId) -> ValidationResult {
    check_move(state, mv, player).map(|_| ())
}

/// Re-validate and apply a move, producing the next snapshot. The input state is
/// never modified; on failure the error is `InvalidMove` wrapping the cause.
///
/// The move must carry its own path: nothing is synthesized here. Input that is only
/// a point pair and an optional waypoint goes through [`propose_move`] first.
pub fn apply_move(state: &GameState, mv: &Move) -> Result<GameState> {
    let placed = check_move(state, mv, &mv.player).map_err(SproutsError::rejected)?;
    let mut next = state.clone();
    next.history.push(Arc::new(mv.clone()));

    let (MoveAction::Connect { from, to, new_point, new_curve_id, new_point_id, .. }, Some(path)) =
        (&mv.action, placed)
    else {
        next.phase = Phase::Finished;
        next.terminal_reason = Some(TerminalReason::Resignation);
        next.winner = state.opponent_of(&mv.player).cloned();
        info!("{} resigned; {} wins", mv.player, next.winner.as_ref().map_or("nobody", |w| w.0.as_str()));
        return Ok(next);
    };

    let created_at = state.move_index() + 1;
    next.curves.push(Arc::new(Curve {
        id: *new_curve_id,
        start: *from,
        end: *to,
        path,
        inserted: *new_point_id,
        created_at,
    }));
    for end in [*from, *to] {
        let slot = &mut next.points[end.index()];
        Arc::make_mut(slot).incident.push(*new_curve_id);
    }
    next.points.push(Arc::new(Point {
        id: *new_point_id,
        pos: *new_point,
        incident: vec![*new_curve_id, *new_curve_id],
        created_at,
    }));

    check_consistency(&next.points, &next.curves).map_err(SproutsError::rejected)?;

    next.legal_move_count = legal_pair_count(&next.points);
    next.current = (state.current + 1) % state.players.len();
    if next.legal_move_count == 0 {
        next.phase = Phase::Finished;
        next.terminal_reason = Some(TerminalReason::NoLegalMoves);
        next.winner = Some(mv.player.clone());
        info!("move {created_at}: {} connected {from}->{to}; no legal pairs left, {} wins", mv.player, mv.player);
    } else {
        info!(
            "move {created_at}: {} connected {from}->{to}; {} legal pairs left",
            mv.player, next.legal_move_count
        );
    }
    Ok(next)
}

pub fn is_terminal(state: &GameState) -> Option<Outcome> {
    if !state.is_finished() {
        return None;
    }
    Some(Outcome {
        winner: state.winner.clone()?,
        reason: state.terminal_reason.unwrap_or(TerminalReason::NoLegalMoves),
    })
}

/// One point for the winner, zero for everyone else. Unfinished games score zero.
pub fn evaluate(state: &GameState) -> Scoreboard {
    let winner = is_terminal(state).map(|o| o.winner);
    Scoreboard {
        scores: state
            .players
            .iter()
            .map(|p| (p.clone(), u32::from(winner.as_ref() == Some(p))))
            .collect(),
    }
}

/// Capacity-legal point pairs, ignoring geometry.
pub fn candidate_pairs(state: &GameState) -> Vec<(PointId, PointId)> {
    legal_pairs(&state.points)
}

fn connect_move(state: &GameState, player: &PlayerId, from: PointId, to: PointId, path: Vec<Vec2>, new_point: Vec2) -> Move {
    Move {
        player: player.clone(),
        timestamp: 0,
        action: MoveAction::Connect {
            from,
            to,
            path,
            new_point,
            new_curve_id: state.next_curve_id(),
            new_point_id: state.next_point_id(),
        },
    }
}

/// Every drawable move for `player`: one synthesized move per capacity-legal pair.
/// Pairs the synthesizer cannot route are left out.
pub fn get_legal_moves(state: &GameState, player: &PlayerId) -> Vec<Move> {
    if state.is_finished() || state.current_player() != player {
        return Vec::new();
    }
    let synth = Synthesizer::from_settings(&state.settings);
    legal_pairs(&state.points)
        .into_iter()
        .filter_map(|(a, b)| match synth.synthesize(state, a, b, None) {
            Ok(s) => Some(connect_move(state, player, a, b, s.path, s.new_point)),
            Err(err) => {
                debug!("legal moves: skipping {a}-{b}: {err}");
                None
            }
        })
        .collect()
}

/// Build a connect move from pointer input: two picked points and the spot the
/// player dragged through.
pub fn propose_move(
    state: &GameState,
    player: &PlayerId,
    from: PointId,
    to: PointId,
    waypoint: Option<Vec2>,
) -> Result<Move> {
    if state.is_finished() {
        return Err(SproutsError::GameOver);
    }
    if state.current_player() != player {
        return Err(SproutsError::NotYourTurn { expected: state.current_player().clone(), got: player.clone() });
    }
    let s = Synthesizer::from_settings(&state.settings).synthesize(state, from, to, waypoint)?;
    Ok(connect_move(state, player, from, to, s.path, s.new_point))
}

pub fn resign_move(player: &PlayerId, timestamp: u64) -> Move {
    Move { player: player.clone(), timestamp, action: MoveAction::Resign }
}
