use crate::error;
use crate::interop;
use crate::SproutsGame;
use js_sys::Uint32Array;
use serde::Serialize;
use sprouts::{
    evaluate, get_legal_moves, is_terminal, pick, pick_point, pick_point_with_capacity, propose_move,
    resign_move, validate_move, GameSession, Move, MoveAction, PlayerId, PointId, Settings, Vec2,
};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn to_js<T: Serialize + ?Sized>(v: &T) -> JsValue {
    serde_wasm_bindgen::to_value(v).unwrap_or(JsValue::NULL)
}

fn now_ms() -> u64 {
    let t = js_sys::Date::now();
    if t.is_finite() && t > 0.0 { t as u64 } else { 0 }
}

fn read_settings(v: JsValue) -> Result<Settings, JsValue> {
    if v.is_undefined() || v.is_null() {
        return Ok(Settings::default());
    }
    serde_wasm_bindgen::from_value(v).map_err(|e| error::bad_input("settings", e))
}

fn check_pos(x: f64, y: f64) -> Result<Vec2, JsValue> {
    if !x.is_finite() { return Err(error::non_finite("x")); }
    if !y.is_finite() { return Err(error::non_finite("y")); }
    Ok(Vec2::new(x, y))
}

fn check_radius(radius: f64) -> Result<(), JsValue> {
    if !radius.is_finite() { return Err(error::non_finite("radius")); }
    if radius < 0.0 { return Err(error::out_of_range("radius", 0.0, f64::INFINITY, radius)); }
    Ok(())
}

fn waypoint(wx: Option<f64>, wy: Option<f64>) -> Result<Option<Vec2>, JsValue> {
    match (wx, wy) {
        (Some(x), Some(y)) => check_pos(x, y).map(Some),
        _ => Ok(None),
    }
}

fn new_point_of(mv: &Move) -> Option<PointId> {
    match &mv.action {
        MoveAction::Connect { new_point_id, .. } => Some(*new_point_id),
        MoveAction::Resign => None,
    }
}

#[wasm_bindgen]
impl SproutsGame {
    /// Default board with `point_count` starting points and two default players.
    #[wasm_bindgen(constructor)]
    pub fn new(point_count: u32) -> Result<SproutsGame, JsValue> {
        let settings = Settings { point_count: point_count as usize, ..Settings::default() };
        SproutsGame::rs_new(settings, crate::default_players()).map_err(|e| error::from_core(&e))
    }

    pub fn with_settings(settings: JsValue, first: String, second: String) -> Result<SproutsGame, JsValue> {
        let settings = read_settings(settings)?;
        SproutsGame::rs_new(settings, vec![PlayerId::new(first), PlayerId::new(second)])
            .map_err(|e| error::from_core(&e))
    }

    pub fn reset_res(&mut self, settings: JsValue, first: String, second: String) -> JsValue {
        let settings = match read_settings(settings) { Ok(s) => s, Err(e) => return e };
        match SproutsGame::rs_new(settings, vec![PlayerId::new(first), PlayerId::new(second)]) {
            Ok(fresh) => { *self = fresh; error::ok(JsValue::TRUE) }
            Err(e) => error::from_core(&e),
        }
    }

    // Renderer view
    pub fn point_count(&self) -> u32 { self.state().points.len() as u32 }
    pub fn curve_count(&self) -> u32 { self.state().curves.len() as u32 }
    pub fn legal_move_count(&self) -> u32 { self.state().legal_move_count as u32 }
    pub fn current_player(&self) -> String { self.state().current_player().0.clone() }
    pub fn is_finished(&self) -> bool { self.state().is_finished() }
    pub fn next_point_id(&self) -> u32 { self.state().next_point_id().0 }
    pub fn spare(&self, id: u32) -> Option<u32> { self.state().spare(PointId(id)).map(|s| s as u32) }
    pub fn get_point_data(&self) -> JsValue { interop::point_data(self.state()) }
    pub fn get_curve_data(&self) -> JsValue { interop::curve_data(self.state()) }
    pub fn get_settings(&self) -> JsValue { to_js(&self.state().settings) }

    /// Capacity-legal pairs flattened as `[a0, b0, a1, b1, ...]`.
    pub fn legal_pairs(&self) -> Uint32Array {
        let flat: Vec<u32> = self.state().legal_pairs().into_iter().flat_map(|(a, b)| [a.0, b.0]).collect();
        interop::arr_u32(&flat)
    }

    // Picking
    pub fn pick_point(&self, x: f64, y: f64, radius: f64) -> Option<u32> {
        pick_point(self.state(), Vec2::new(x, y), radius).map(|id| id.0)
    }
    pub fn pick_point_res(&self, x: f64, y: f64, radius: f64, needed: u32) -> JsValue {
        let pos = match check_pos(x, y) { Ok(p) => p, Err(e) => return e };
        if let Err(e) = check_radius(radius) { return e; }
        if needed > sprouts::MAX_INCIDENT as u32 {
            return error::out_of_range("needed", 0.0, sprouts::MAX_INCIDENT as f64, needed as f64);
        }
        let hit = pick_point_with_capacity(self.state(), pos, radius, needed as usize);
        error::ok(hit.map_or(JsValue::NULL, |id| JsValue::from_f64(id.0 as f64)))
    }
    pub fn pick_res(&self, x: f64, y: f64, radius: f64) -> JsValue {
        let pos = match check_pos(x, y) { Ok(p) => p, Err(e) => return e };
        if let Err(e) = check_radius(radius) { return e; }
        error::ok(pick(self.state(), pos, radius).map_or(JsValue::NULL, |p| to_js(&p)))
    }

    // Moves
    pub fn propose_move_res(&self, from: u32, to: u32, wx: Option<f64>, wy: Option<f64>) -> JsValue {
        let wp = match waypoint(wx, wy) { Ok(w) => w, Err(e) => return e };
        let state = self.state();
        match propose_move(state, state.current_player(), PointId(from), PointId(to), wp) {
            Ok(mut mv) => { mv.timestamp = now_ms(); error::ok(to_js(&mv)) }
            Err(e) => error::from_core(&e),
        }
    }

    pub fn validate_move_res(&self, mv: JsValue) -> JsValue {
        let mv: Move = match serde_wasm_bindgen::from_value(mv) { Ok(m) => m, Err(e) => return error::bad_input("move", e) };
        match validate_move(self.state(), &mv, &mv.player) {
            Ok(()) => error::ok(JsValue::TRUE),
            Err(e) => error::from_core(&e),
        }
    }

    /// Apply a fully populated move; the value is the sprouted point id, or null for a
    /// resignation.
    pub fn play_res(&mut self, mv: JsValue) -> JsValue {
        let mv: Move = match serde_wasm_bindgen::from_value(mv) { Ok(m) => m, Err(e) => return error::bad_input("move", e) };
        self.play(&mv)
    }

    /// Synthesize and play in one step, as a pointer release would.
    pub fn connect_res(&mut self, from: u32, to: u32, wx: Option<f64>, wy: Option<f64>) -> JsValue {
        let wp = match waypoint(wx, wy) { Ok(w) => w, Err(e) => return e };
        let state = self.state();
        match propose_move(state, state.current_player(), PointId(from), PointId(to), wp) {
            Ok(mut mv) => { mv.timestamp = now_ms(); self.play(&mv) }
            Err(e) => error::from_core(&e),
        }
    }

    pub fn resign_res(&mut self) -> JsValue {
        let mv = resign_move(self.state().current_player(), now_ms());
        self.play(&mv)
    }

    pub fn legal_moves(&self) -> JsValue {
        let state = self.state();
        to_js(&get_legal_moves(state, state.current_player()))
    }

    pub fn outcome(&self) -> JsValue {
        is_terminal(self.state()).map_or(JsValue::NULL, |o| to_js(&o))
    }
    pub fn scores(&self) -> JsValue { to_js(&evaluate(self.state())) }

    // History
    pub fn undo(&mut self) -> bool { self.session.undo() }
    pub fn redo(&mut self) -> bool { self.session.redo() }
    pub fn can_undo(&self) -> bool { self.session.can_undo() }
    pub fn can_redo(&self) -> bool { self.session.can_redo() }
    pub fn move_count(&self) -> u32 { self.state().history.len() as u32 }

    // Persistence
    pub fn to_json(&self) -> JsValue {
        match sprouts::serialize_state(self.state()) {
            Ok(text) => JsValue::from_str(&text),
            Err(_) => JsValue::NULL,
        }
    }
    pub fn from_json_res(&mut self, text: &str) -> JsValue {
        match sprouts::deserialize_state(text) {
            Ok(state) => { self.session = GameSession::new(state); error::ok(JsValue::TRUE) }
            Err(e) => {
                web_sys::console::warn_1(&JsValue::from_str(&format!("sprouts: rejected saved game: {e}")));
                error::from_core(&e)
            }
        }
    }
}

impl SproutsGame {
    fn play(&mut self, mv: &Move) -> JsValue {
        match self.session.play(mv) {
            Ok(_) => error::ok(new_point_of(mv).map_or(JsValue::NULL, |id| JsValue::from_f64(id.0 as f64))),
            Err(e) => error::from_core(&e),
        }
    }
}
