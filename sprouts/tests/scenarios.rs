use sprouts::algorithms::synth::loop_path;
use sprouts::algorithms::validate::{check_consistency, check_planarity};
use sprouts::{
    apply_move, create_initial_state, evaluate, is_terminal, propose_move, resign_move, validate_move,
    GameState, Move, MoveAction, PlayerId, PointId, Settings, SproutsError, TerminalReason, Vec2,
};

fn alice() -> PlayerId { PlayerId::new("alice") }
fn bob() -> PlayerId { PlayerId::new("bob") }

fn new_game(point_count: usize) -> GameState {
    create_initial_state(Settings { point_count, ..Settings::default() }, vec![alice(), bob()]).unwrap()
}

fn straight(state: &GameState, player: &PlayerId, a: u32, b: u32) -> Move {
    let pa = state.points[a as usize].pos;
    let pb = state.points[b as usize].pos;
    let mid = (pa + pb) * 0.5;
    Move {
        player: player.clone(),
        timestamp: 1,
        action: MoveAction::Connect {
            from: PointId(a),
            to: PointId(b),
            path: vec![pa, mid, pb],
            new_point: mid,
            new_curve_id: state.next_curve_id(),
            new_point_id: state.next_point_id(),
        },
    }
}

fn assert_sound(state: &GameState) {
    check_consistency(&state.points, &state.curves).unwrap();
    check_planarity(&state.points, &state.curves).unwrap();
    assert!(state.points.iter().all(|p| p.incident.len() <= 3));
}

#[test]
fn straight_connection_adds_point_and_curve() {
    let s0 = new_game(3);
    let s1 = apply_move(&s0, &straight(&s0, &alice(), 0, 1)).unwrap();
    assert_eq!(s1.points.len(), 4);
    assert_eq!(s1.curves.len(), 1);
    assert_eq!(s1.points[3].incident.len(), 2);
    assert_eq!(s1.points[3].spare(), 1);
    // p0, p1 at 2 spare, p2 at 3, p3 at 1: six pairs plus three loops
    assert_eq!(s1.legal_move_count, 9);
    assert_eq!(s1.current_player(), &bob());
    assert!(is_terminal(&s1).is_none());
    // the input snapshot is untouched
    assert_eq!(s0.points.len(), 3);
    assert!(s0.curves.is_empty());
    assert_sound(&s1);
}

#[test]
fn full_point_rejects_another_connection() {
    let s0 = new_game(3);
    let s1 = apply_move(&s0, &straight(&s0, &alice(), 0, 1)).unwrap();
    let s2 = apply_move(&s1, &straight(&s1, &bob(), 0, 2)).unwrap();
    let third = propose_move(&s2, &alice(), PointId(0), PointId(2), None).unwrap();
    let s3 = apply_move(&s2, &third).unwrap();
    assert_eq!(s3.points[0].spare(), 0);
    assert_sound(&s3);

    let err = validate_move(&s3, &straight(&s3, &bob(), 0, 1), &bob()).unwrap_err();
    assert!(matches!(err, SproutsError::ConnectionLimitExceeded { point: PointId(0), .. }), "{err:?}");
    let err = propose_move(&s3, &bob(), PointId(1), PointId(0), None).unwrap_err();
    assert_eq!(err.code(), "connection_limit_exceeded");
}

#[test]
fn crossing_an_existing_curve_is_rejected() {
    let s0 = new_game(3);
    let s1 = apply_move(&s0, &straight(&s0, &alice(), 0, 1)).unwrap();
    let p2 = s1.points[2].pos;
    let p1 = s1.points[1].pos;
    let over = Vec2::new(600.0, 150.0);
    let mv = Move {
        player: bob(),
        timestamp: 2,
        action: MoveAction::Connect {
            from: PointId(2),
            to: PointId(1),
            path: vec![p2, over, p1],
            new_point: over,
            new_curve_id: s1.next_curve_id(),
            new_point_id: s1.next_point_id(),
        },
    };
    let err = validate_move(&s1, &mv, &bob()).unwrap_err();
    assert_eq!(err.code(), "invalid_curve");
    let err = apply_move(&s1, &mv).unwrap_err();
    assert_eq!(err.code(), "invalid_move");
    assert_eq!(err.root_cause().code(), "invalid_curve");
}

#[test]
fn loop_needs_two_spare_slots() {
    let s0 = new_game(3);
    let s1 = apply_move(&s0, &straight(&s0, &alice(), 0, 1)).unwrap();
    // the sprouted point has a single slot left
    let sprout = PointId(3);
    let err = propose_move(&s1, &bob(), sprout, sprout, None).unwrap_err();
    assert!(matches!(err, SproutsError::ConnectionLimitExceeded { needed: 2, spare: 1, .. }), "{err:?}");

    let at = s1.points[3].pos;
    let path = loop_path(at, Vec2::new(1.0, 0.0), 40.0, 24);
    let mv = Move {
        player: bob(),
        timestamp: 2,
        action: MoveAction::Connect {
            from: sprout,
            to: sprout,
            new_point: path[12],
            path,
            new_curve_id: s1.next_curve_id(),
            new_point_id: s1.next_point_id(),
        },
    };
    let err = validate_move(&s1, &mv, &bob()).unwrap_err();
    assert_eq!(err.code(), "connection_limit_exceeded");
}

#[test]
fn loop_on_fresh_point_uses_two_slots() {
    let s0 = new_game(3);
    let mv = propose_move(&s0, &alice(), PointId(0), PointId(0), None).unwrap();
    let s1 = apply_move(&s0, &mv).unwrap();
    assert_eq!(s1.points[0].incident.len(), 2);
    assert_eq!(s1.points[0].spare(), 1);
    assert_eq!(s1.points[3].incident.len(), 2);
    assert!(s1.curves[0].is_loop());
    // p0 and p3 at one slot, p1 and p2 at three: six pairs plus two loops
    assert_eq!(s1.legal_move_count, 8);
    assert_sound(&s1);
}

#[test]
fn blocked_pair_is_routed_around_the_obstacle() {
    let s0 = new_game(4);
    // vertical chord through the centre splits p1 from p3
    let s1 = apply_move(&s0, &straight(&s0, &alice(), 0, 2)).unwrap();
    let mv = propose_move(&s1, &bob(), PointId(1), PointId(3), None).unwrap();
    let MoveAction::Connect { path, .. } = &mv.action else { panic!("expected a connect move") };
    assert!(path.len() > 3, "direct path should have been blocked");
    let s2 = apply_move(&s1, &mv).unwrap();
    assert_eq!(s2.curves.len(), 2);
    assert_sound(&s2);
}

#[test]
fn turn_order_is_enforced() {
    let s0 = new_game(3);
    let err = validate_move(&s0, &straight(&s0, &bob(), 0, 1), &bob()).unwrap_err();
    assert!(matches!(err, SproutsError::NotYourTurn { .. }));
    // signed by someone other than the caller
    let err = validate_move(&s0, &straight(&s0, &bob(), 0, 1), &alice()).unwrap_err();
    assert_eq!(err.code(), "invalid_move");
}

#[test]
fn stale_ids_are_rejected() {
    let s0 = new_game(3);
    let mut mv = straight(&s0, &alice(), 0, 1);
    if let MoveAction::Connect { new_point_id, .. } = &mut mv.action {
        *new_point_id = PointId(7);
    }
    let err = validate_move(&s0, &mv, &alice()).unwrap_err();
    assert_eq!(err.code(), "invalid_move");
}

#[test]
fn off_path_new_point_is_rejected() {
    let s0 = new_game(3);
    let mut mv = straight(&s0, &alice(), 0, 1);
    if let MoveAction::Connect { new_point, .. } = &mut mv.action {
        *new_point = *new_point + Vec2::new(0.0, 20.0);
    }
    let err = validate_move(&s0, &mv, &alice()).unwrap_err();
    assert_eq!(err.code(), "invalid_new_point");
}

#[test]
fn finished_game_refuses_moves() {
    let s0 = new_game(3);
    let s1 = apply_move(&s0, &resign_move(&alice(), 3)).unwrap();
    let outcome = is_terminal(&s1).unwrap();
    assert_eq!(outcome.winner, bob());
    assert_eq!(outcome.reason, TerminalReason::Resignation);
    assert_eq!(evaluate(&s1).score_of(&alice()), Some(0));
    let err = validate_move(&s1, &straight(&s1, &bob(), 0, 1), &bob()).unwrap_err();
    assert!(matches!(err, SproutsError::GameOver));
}

#[test]
fn two_point_game_ends_after_five_moves() {
    let mut s = new_game(2);
    let players = [alice(), bob()];
    let mut movers = Vec::new();
    while is_terminal(&s).is_none() {
        let player = s.current_player().clone();
        let moves = sprouts::get_legal_moves(&s, &player);
        let Some(mv) = moves.into_iter().next() else {
            s = apply_move(&s, &resign_move(&player, 0)).unwrap();
            break;
        };
        movers.push(player);
        s = apply_move(&s, &mv).unwrap();
        assert_sound(&s);
    }
    let outcome = is_terminal(&s).unwrap();
    assert!(s.curves.len() >= 4, "game over after {} moves", s.curves.len());
    assert!(players.contains(&outcome.winner));
    match outcome.reason {
        TerminalReason::NoLegalMoves => {
            assert_eq!(s.curves.len(), 5);
            assert_eq!(Some(&outcome.winner), movers.last());
        }
        TerminalReason::Resignation => {
            let resigner = &s.history.last().unwrap().player;
            assert_ne!(&outcome.winner, resigner);
        }
    }
}

fn near(p: Vec2, x: f64, y: f64) -> bool {
    (p.x - x).abs() < 1e-6 && (p.y - y).abs() < 1e-6
}

/// Loops on both starting points plus the chord between them leave three sprouts
/// outside everything; the top sprout can still reach the chord's sprout by going
/// round the top loop.
#[test]
fn sprout_outside_a_loop_reaches_round_it() {
    let mut s = new_game(2);
    for (a, b) in [(0, 0), (1, 1), (0, 1)] {
        let player = s.current_player().clone();
        let mv = propose_move(&s, &player, PointId(a), PointId(b), None).unwrap();
        s = apply_move(&s, &mv).unwrap();
    }
    assert!(near(s.points[2].pos, 400.0, 60.0));
    assert!(near(s.points[3].pos, 400.0, 540.0));
    assert!(near(s.points[4].pos, 400.0, 300.0));

    let player = s.current_player().clone();
    let mv = propose_move(&s, &player, PointId(2), PointId(4), None).unwrap();
    let next = apply_move(&s, &mv).unwrap();
    assert_sound(&next);
    assert_eq!(next.curves.len(), 4);
    // every pair between the three outer sprouts is drawable
    let pairs = [(2, 3), (3, 4), (2, 4)];
    for (a, b) in pairs {
        assert!(propose_move(&s, &player, PointId(a), PointId(b), None).is_ok(), "{a}-{b}");
    }
}

#[test]
fn waypoint_past_the_target_does_not_fold_the_curve() {
    let s = new_game(2);
    let (a, b) = (s.points[0].pos, s.points[1].pos);
    let past = b + (b - a) * 0.5;

    let mut folded = straight(&s, &alice(), 0, 1);
    if let MoveAction::Connect { path, new_point, .. } = &mut folded.action {
        *path = vec![a, past, b];
        *new_point = past;
    }
    let err = validate_move(&s, &folded, &alice()).unwrap_err();
    assert_eq!(err.code(), "invalid_curve");

    let mv = propose_move(&s, &alice(), PointId(0), PointId(1), Some(past)).unwrap();
    let next = apply_move(&s, &mv).unwrap();
    assert_sound(&next);
    let sprout = next.points[2].pos;
    assert!(sprout.y < b.y, "sprout {sprout:?} left the segment's side of the target");
}

#[test]
fn path_may_not_pass_back_through_its_own_end() {
    let s = new_game(2);
    let (a, b) = (s.points[0].pos, s.points[1].pos);
    let mid = (a + b) * 0.5;
    let mut mv = straight(&s, &alice(), 0, 1);
    if let MoveAction::Connect { path, new_point, .. } = &mut mv.action {
        *path = vec![a, a + Vec2::new(-80.0, -40.0), a, mid, b];
        *new_point = mid;
    }
    let err = validate_move(&s, &mv, &alice()).unwrap_err();
    assert_eq!(err.code(), "invalid_curve");
}
