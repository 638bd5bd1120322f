use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sprouts::{apply_move, create_initial_state, get_legal_moves, is_terminal, resign_move, PlayerId, Settings, TerminalReason};
use std::time::Instant;

fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() { return 0.0; }
    let idx = ((sorted.len() as f64 - 1.0) * p).round() as usize;
    sorted[idx.min(sorted.len()-1)]
}

struct GameStats { moves: usize, resigned: bool, move_ms: Vec<f64> }

fn play_one(points: usize, seed: u64) -> Result<GameStats, sprouts::SproutsError> {
    let players = vec![PlayerId::new("p1"), PlayerId::new("p2")];
    let settings = Settings { point_count: points, seed, ..Settings::default() };
    let mut state = create_initial_state(settings, players)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut move_ms = Vec::new();
    while is_terminal(&state).is_none() {
        let player = state.current_player().clone();
        let t0 = Instant::now();
        let moves = get_legal_moves(&state, &player);
        let mv = if moves.is_empty() {
            resign_move(&player, 0)
        } else {
            moves[rng.random_range(0..moves.len())].clone()
        };
        state = apply_move(&state, &mv)?;
        move_ms.push(t0.elapsed().as_secs_f64() * 1000.0);
    }
    let resigned = is_terminal(&state).is_some_and(|o| o.reason == TerminalReason::Resignation);
    Ok(GameStats { moves: state.curves.len(), resigned, move_ms })
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let mut games = 20usize;
    let mut points = 3usize;
    let mut seed = 1u64;
    let mut assert_ms: Option<f64> = None;
    for a in &args[1..] {
        if let Some(val)=a.strip_prefix("--games=") { if let Ok(v)=val.parse() { games=v; } }
        else if let Some(val)=a.strip_prefix("--points=") { if let Ok(v)=val.parse() { points=v; } }
        else if let Some(val)=a.strip_prefix("--seed=") { if let Ok(v)=val.parse() { seed=v; } }
        else if let Some(val)=a.strip_prefix("--assert-ms=") { if let Ok(v)=val.parse() { assert_ms=Some(v); } }
    }

    let start_all = Instant::now();
    let mut times_ms: Vec<f64> = Vec::new();
    let mut total_moves = 0usize;
    let mut resignations = 0usize;
    for g in 0..games {
        match play_one(points, seed.wrapping_add(g as u64)) {
            Ok(stats) => {
                total_moves += stats.moves;
                resignations += usize::from(stats.resigned);
                times_ms.extend(stats.move_ms);
            }
            Err(e) => { eprintln!("FAIL: game {} aborted: {}", g, e); std::process::exit(1); }
        }
    }
    let dur_all = start_all.elapsed().as_secs_f64() * 1000.0;
    times_ms.sort_by(|a,b| a.total_cmp(b));
    let med = percentile(&times_ms, 0.5);
    let p90 = percentile(&times_ms, 0.9);
    let p99 = percentile(&times_ms, 0.99);
    println!("games={} points={} moves={} resignations={} total_ms={:.3} median_move_ms={:.4} p90_ms={:.4} p99_ms={:.4}", games, points, total_moves, resignations, dur_all, med, p90, p99);
    if let Some(th) = assert_ms { if med > th { eprintln!("FAIL: median {:.4} ms > threshold {:.3} ms", med, th); std::process::exit(1); } }
}
