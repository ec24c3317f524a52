//! # Transcript
//!
//! The ordered, append-only history of turns for one chat session. Turns can
//! only be added through the session controller; readers get shared slices.

use crate::types::{Role, Turn};
use serde::Serialize;

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, turn: Turn) -> &Turn {
        self.turns.push(turn);
        // Just pushed, so the vector is not empty.
        &self.turns[self.turns.len() - 1]
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Counts user turns that never received an assistant reply.
    pub fn unanswered(&self) -> usize {
        self.turns
            .iter()
            .enumerate()
            .filter(|(i, turn)| {
                turn.role() == Role::User
                    && self.turns.get(i + 1).map(Turn::role) != Some(Role::Assistant)
            })
            .count()
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}
