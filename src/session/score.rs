use std::collections::HashMap;

use super::PartySession;
use crate::types::{Player, PlayerId};

/// Per-player points for the current session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreBoard {
    scores: HashMap<PlayerId, u32>,
}

impl ScoreBoard {
    /// A board with every player at zero
    pub fn zeroed(players: &[Player]) -> Self {
        let mut board = Self::default();
        board.reset(players);
        board
    }

    pub fn reset(&mut self, players: &[Player]) {
        self.scores = players.iter().map(|p| (p.id.clone(), 0)).collect();
    }

    pub fn get(&self, id: &str) -> u32 {
        self.scores.get(id).copied().unwrap_or(0)
    }

    /// Add one point and return the new score
    pub fn award(&mut self, id: &str) -> u32 {
        let score = self.scores.entry(id.to_string()).or_insert(0);
        *score += 1;
        *score
    }

    pub fn total(&self) -> u32 {
        self.scores.values().sum()
    }
}

impl PartySession {
    pub fn scores(&self) -> &ScoreBoard {
        &self.scores
    }

    /// Zero every player's score without touching the roster
    pub fn reset_scores(&mut self) {
        self.scores.reset(&self.players);
        tracing::debug!("Scores reset");
    }

    pub(crate) fn award_point(&mut self, id: &str) -> u32 {
        self.scores.award(id)
    }
}
