use super::{PartySession, RosterError};
use crate::types::{Player, PlayerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

impl PartySession {
    fn ensure_unlocked(&self) -> Result<(), RosterError> {
        if self.locked {
            Err(RosterError::Locked)
        } else {
            Ok(())
        }
    }

    /// Roster changed: scores start over and the store is updated
    fn roster_changed(&mut self) {
        self.scores.reset(&self.players);
        self.persist();
    }

    /// Add a player. Blank names are ignored and return `None`.
    pub fn add_player(&mut self, name: &str) -> Result<Option<Player>, RosterError> {
        self.ensure_unlocked()?;

        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let player = Player {
            id: ulid::Ulid::new().to_string(),
            name: trimmed.to_string(),
        };
        self.players.push(player.clone());
        self.roster_changed();

        tracing::info!("Added player: {} ({})", player.name, player.id);
        Ok(Some(player))
    }

    /// Remove a player by ID.
    /// Returns true if the player was found and removed
    pub fn remove_player(&mut self, id: &PlayerId) -> Result<bool, RosterError> {
        self.ensure_unlocked()?;

        let Some(pos) = self.players.iter().position(|p| &p.id == id) else {
            return Ok(false);
        };
        let removed = self.players.remove(pos);
        self.roster_changed();

        tracing::info!("Removed player: {} ({})", removed.name, removed.id);
        Ok(true)
    }

    /// Rename a player. Blank names and unknown IDs leave the roster as is.
    pub fn rename_player(&mut self, id: &PlayerId, name: &str) -> Result<bool, RosterError> {
        self.ensure_unlocked()?;

        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Ok(false);
        }

        let Some(player) = self.players.iter_mut().find(|p| &p.id == id) else {
            return Ok(false);
        };
        player.name = trimmed.to_string();
        self.roster_changed();
        Ok(true)
    }

    /// Swap a player with its neighbour. Moving past either end is a no-op.
    pub fn move_player(
        &mut self,
        id: &PlayerId,
        direction: MoveDirection,
    ) -> Result<bool, RosterError> {
        self.ensure_unlocked()?;

        let Some(index) = self.players.iter().position(|p| &p.id == id) else {
            return Ok(false);
        };
        let target = match direction {
            MoveDirection::Up if index > 0 => index - 1,
            MoveDirection::Down if index + 1 < self.players.len() => index + 1,
            _ => return Ok(false),
        };

        self.players.swap(index, target);
        self.roster_changed();
        Ok(true)
    }

    /// Remove everyone
    pub fn reset_players(&mut self) -> Result<(), RosterError> {
        self.ensure_unlocked()?;

        self.players.clear();
        self.roster_changed();
        tracing::info!("Roster cleared");
        Ok(())
    }
}
