use sprouts::{create_initial_state, GameSession, PlayerId, Settings};
use wasm_bindgen::prelude::*;
mod api;
mod error;
mod interop;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {}

pub const DEFAULT_PLAYERS: [&str; 2] = ["player1", "player2"];

pub(crate) fn default_players() -> Vec<PlayerId> {
    DEFAULT_PLAYERS.iter().map(|p| PlayerId::new(*p)).collect()
}

#[wasm_bindgen]
pub struct SproutsGame { pub(crate) session: GameSession }

impl SproutsGame {
    pub fn rs_new(settings: Settings, players: Vec<PlayerId>) -> sprouts::Result<SproutsGame> {
        let state = create_initial_state(settings, players)?;
        Ok(SproutsGame { session: GameSession::new(state) })
    }
    pub fn state(&self) -> &sprouts::GameState { self.session.current() }
}
