//! Linear undo/redo over game snapshots.
//!
//! Snapshots share unchanged points, curves, and history entries through `Arc`, so
//! keeping every state of a game is cheap.

use crate::error::Result;
use crate::game::apply_move;
use crate::model::{GameState, Move};

#[derive(Clone, Debug)]
pub struct GameSession {
    states: Vec<GameState>,
    cursor: usize,
}

impl GameSession {
    pub fn new(initial: GameState) -> Self {
        Self { states: vec![initial], cursor: 0 }
    }

    pub fn current(&self) -> &GameState {
        &self.states[self.cursor]
    }

    /// Apply `mv` to the current state. A successful move discards any redo states.
    pub fn play(&mut self, mv: &Move) -> Result<&GameState> {
        let next = apply_move(self.current(), mv)?;
        self.states.truncate(self.cursor + 1);
        self.states.push(next);
        self.cursor += 1;
        Ok(self.current())
    }

    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.cursor -= 1;
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.cursor += 1;
        true
    }

    pub fn can_undo(&self) -> bool { self.cursor > 0 }
    pub fn can_redo(&self) -> bool { self.cursor + 1 < self.states.len() }

    /// Number of moves applied to reach the current state.
    pub fn depth(&self) -> usize { self.cursor }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{create_initial_state, resign_move};
    use crate::model::{PlayerId, Settings};

    #[test]
    fn undo_restores_previous_snapshot_and_new_move_clears_redo() {
        let alice = PlayerId::new("alice");
        let s0 = create_initial_state(Settings::default(), vec![alice.clone(), PlayerId::new("bob")]).unwrap();
        let mut session = GameSession::new(s0.clone());
        assert!(!session.undo());
        session.play(&resign_move(&alice, 1)).unwrap();
        assert!(session.current().is_finished());
        assert!(session.undo());
        assert_eq!(session.current(), &s0);
        assert!(session.can_redo());
        assert!(session.redo());
        assert!(session.current().is_finished());
        session.undo();
        session.play(&resign_move(&alice, 2)).unwrap();
        assert!(!session.can_redo());
        assert_eq!(session.depth(), 1);
    }
}
