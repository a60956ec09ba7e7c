//! Party session: the roster and score board shared by every game.
//!
//! Controllers never reach for global state; they are handed the session they
//! should read and update.

mod roster;
mod score;
mod store;

use std::collections::HashSet;
use std::sync::Arc;

use crate::types::Player;

pub use roster::MoveDirection;
pub use score::ScoreBoard;
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};

/// Storage key holding the serialized roster
pub const STORAGE_KEY: &str = "play-lounge:players";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RosterError {
    #[error("The roster is locked while a round is in progress")]
    Locked,
}

/// Shared session state
pub struct PartySession {
    players: Vec<Player>,
    scores: ScoreBoard,
    locked: bool,
    store: Arc<dyn KeyValueStore>,
}

impl PartySession {
    /// Open a session, restoring any roster saved in `store`
    pub fn restore(store: Arc<dyn KeyValueStore>) -> Self {
        let players = match store.get(STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Player>>(&raw) {
                Ok(players) => valid_roster(players),
                Err(e) => {
                    tracing::warn!("Failed to restore players: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to restore players: {}", e);
                Vec::new()
            }
        };

        tracing::debug!(count = players.len(), "Restored party roster");

        Self {
            scores: ScoreBoard::zeroed(&players),
            players,
            locked: false,
            store,
        }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Freeze the roster (a round is being set up or played)
    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    /// Write the roster through to the store; an empty roster deletes the key
    fn persist(&self) {
        let result = if self.players.is_empty() {
            self.store.remove(STORAGE_KEY)
        } else {
            match serde_json::to_string(&self.players) {
                Ok(json) => self.store.set(STORAGE_KEY, &json),
                Err(e) => Err(e.into()),
            }
        };

        if let Err(e) = result {
            tracing::warn!("Failed to persist players: {}", e);
        }
    }
}

/// Drop saved entries with a blank id or name, and repeats of an id
fn valid_roster(saved: Vec<Player>) -> Vec<Player> {
    let mut seen = HashSet::new();
    let saved_count = saved.len();
    let players: Vec<Player> = saved
        .into_iter()
        .filter(|p| !p.id.trim().is_empty() && !p.name.trim().is_empty())
        .filter(|p| seen.insert(p.id.clone()))
        .collect();

    if players.len() < saved_count {
        tracing::warn!(
            dropped = saved_count - players.len(),
            "Skipped invalid saved players"
        );
    }
    players
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restore_missing_key() {
        let session = PartySession::restore(Arc::new(MemoryStore::new()));
        assert!(session.players().is_empty());
        assert!(!session.is_locked());
    }

    #[test]
    fn test_restore_saved_roster() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(
                STORAGE_KEY,
                r#"[{"id":"a","name":"Ava"},{"id":"b","name":"Ben"}]"#,
            )
            .unwrap();

        let session = PartySession::restore(store);
        assert_eq!(session.players().len(), 2);
        assert_eq!(session.player("b").unwrap().name, "Ben");
        assert_eq!(session.scores().get("a"), 0);
    }

    #[test]
    fn test_restore_garbage_is_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set(STORAGE_KEY, "{oops").unwrap();

        let session = PartySession::restore(store);
        assert!(session.players().is_empty());
    }

    #[test]
    fn test_restore_skips_blank_and_repeated_ids() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(
                STORAGE_KEY,
                r#"[{"id":"a","name":"Ava"},{"id":"a","name":"Copy"},{"id":"","name":"Nobody"},{"id":"c","name":"  "},{"id":"b","name":"Ben"}]"#,
            )
            .unwrap();

        let session = PartySession::restore(store);
        let names: Vec<&str> = session.players().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Ava", "Ben"]);
    }
}
