//! Deck sizing and partitioning for a trivia round.

use super::RoundError;
use crate::types::{Player, Question, MAX_TOTAL_QUESTIONS};

/// How many questions a round will actually fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityPlan {
    pub per_player: usize,
    pub total: usize,
    /// Set when the request had to be cut down to fit the ceiling
    pub notice: Option<String>,
}

/// Fit `player_count × per_player` under the per-round ceiling.
///
/// When the desired deck is too big every player gets
/// `MAX_TOTAL_QUESTIONS / player_count` questions instead. Every player
/// gets at least one question.
pub fn plan_capacity(player_count: usize, per_player: usize) -> Result<CapacityPlan, RoundError> {
    if player_count == 0 {
        return Err(RoundError::EmptyRoster);
    }
    let per_player = per_player.max(1);

    let desired_total = player_count.saturating_mul(per_player);
    let (per_player, notice) = if desired_total > MAX_TOTAL_QUESTIONS {
        let reduced = MAX_TOTAL_QUESTIONS / player_count;
        if reduced == 0 {
            return Err(RoundError::OverCapacity);
        }
        let notice = format!(
            "Limited to {} questions total. Each player will get {} question{}.",
            MAX_TOTAL_QUESTIONS,
            reduced,
            if reduced == 1 { "" } else { "s" }
        );
        (reduced, Some(notice))
    } else {
        (per_player, None)
    };

    Ok(CapacityPlan {
        per_player,
        total: per_player * player_count,
        notice,
    })
}

/// Questions dealt to each player for one round
#[derive(Debug, Clone, Default)]
pub struct RoundAssignment {
    players: Vec<Player>,
    /// One bucket per seat, parallel to `players`
    buckets: Vec<Vec<Question>>,
}

impl RoundAssignment {
    /// Deal the deck round-robin: question `i` goes to player `i % players`.
    /// Each player's questions keep their deck order.
    pub fn build(players: &[Player], deck: Vec<Question>) -> Self {
        let mut buckets: Vec<Vec<Question>> = vec![Vec::new(); players.len()];

        if !players.is_empty() {
            for (index, question) in deck.into_iter().enumerate() {
                buckets[index % players.len()].push(question);
            }
        }

        Self {
            players: players.to_vec(),
            buckets,
        }
    }

    /// Players in turn order
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Questions dealt to the player at `player_index`
    pub fn questions_for(&self, player_index: usize) -> &[Question] {
        self.buckets
            .get(player_index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The question a player answers in the given round
    pub fn question(&self, player_index: usize, round: usize) -> Option<(&Player, &Question)> {
        let player = self.players.get(player_index)?;
        let question = self.questions_for(player_index).get(round)?;
        Some((player, question))
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }
}
