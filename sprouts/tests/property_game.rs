use proptest::prelude::*;
use sprouts::algorithms::moves::legal_pair_count;
use sprouts::algorithms::validate::{check_consistency, check_planarity};
use sprouts::{
    apply_move, create_initial_state, deserialize_state, is_terminal, propose_move, resign_move, serialize_state,
    GameState, PlayerId, Settings, TerminalReason,
};

#[derive(Debug)]
struct Played {
    n: usize,
    states: Vec<GameState>,
}

/// Play a game where each turn takes the first synthesizable pair after rotating the
/// pair list by the next choice. A player with nothing drawable resigns.
fn play(n: usize, jitter: f64, seed: u64, choices: &[u16]) -> Played {
    let settings = Settings { point_count: n, jitter, seed, ..Settings::default() };
    let mut s = create_initial_state(settings, vec![PlayerId::new("red"), PlayerId::new("blue")]).unwrap();
    let mut states = vec![s.clone()];
    let mut turn = 0usize;
    while is_terminal(&s).is_none() {
        let player = s.current_player().clone();
        let pairs = s.legal_pairs();
        let skip = choices.get(turn % choices.len().max(1)).copied().unwrap_or(0) as usize % pairs.len().max(1);
        let mv = pairs
            .iter()
            .cycle()
            .skip(skip)
            .take(pairs.len())
            .find_map(|&(a, b)| propose_move(&s, &player, a, b, None).ok())
            .unwrap_or_else(|| resign_move(&player, turn as u64));
        s = apply_move(&s, &mv).unwrap();
        states.push(s.clone());
        turn += 1;
    }
    Played { n, states }
}

fn game_strategy() -> impl Strategy<Value = (usize, f64, u64, Vec<u16>)> {
    (2usize..=3, prop_oneof![Just(0.0), 0.0f64..0.25], any::<u64>(), prop::collection::vec(any::<u16>(), 1..12))
}

#[cfg(feature = "long-selfplay")]
const CASES: u32 = 256;
#[cfg(not(feature = "long-selfplay"))]
const CASES: u32 = 12;

proptest! {
    #![proptest_config(ProptestConfig { cases: CASES, .. ProptestConfig::default() })]
    #[test]
    fn random_games_keep_invariants((n, jitter, seed, choices) in game_strategy()) {
        let game = play(n, jitter, seed, &choices);
        for s in &game.states {
            prop_assert!(s.points.iter().all(|p| p.incident.len() <= 3));
            prop_assert!(check_consistency(&s.points, &s.curves).is_ok());
            prop_assert!(check_planarity(&s.points, &s.curves).is_ok());
            prop_assert_eq!(s.legal_move_count, legal_pair_count(&s.points));
            let resigned = s.terminal_reason == Some(TerminalReason::Resignation);
            if !resigned {
                prop_assert_eq!(is_terminal(s).is_some(), s.legal_move_count == 0);
            }
        }

        let last = game.states.last().unwrap();
        let outcome = is_terminal(last).unwrap();
        let moves = last.curves.len();
        let final_mover = &last.history.last().unwrap().player;
        // nobody can be left without a drawable curve before 2n moves
        prop_assert!(moves >= 2 * game.n, "{:?} after {} moves", outcome.reason, moves);
        prop_assert!(moves <= 3 * game.n - 1);
        match outcome.reason {
            TerminalReason::NoLegalMoves => {
                // capacity-only termination always uses every slot but one
                prop_assert_eq!(moves, 3 * game.n - 1);
                prop_assert_eq!(&outcome.winner, final_mover);
            }
            TerminalReason::Resignation => prop_assert_ne!(&outcome.winner, final_mover),
        }

        let back = deserialize_state(&serialize_state(last).unwrap()).unwrap();
        prop_assert_eq!(&back, last);
    }
}
