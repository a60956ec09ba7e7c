//! Truth-or-Dare wheel.
//!
//! Each turn goes `Idle -> Spinning -> Revealed`. Prompts are drawn so the
//! same one doesn't come up again while it is still in that mode's recent
//! history.

mod prompts;

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::Serialize;
use std::time::Duration;

use crate::session::PartySession;
use crate::types::Player;

pub use prompts::{DARE_PROMPTS, TRUTH_PROMPTS};

/// How long the wheel spins before a prompt appears
pub const SPIN_DURATION: Duration = Duration::from_millis(2000);

/// Recent prompts remembered per mode
pub const HISTORY_TRIM: usize = 10;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlayMode {
    Truth,
    Dare,
}

impl PlayMode {
    /// Where the wheel lands for this mode, in degrees
    fn offset(&self) -> i64 {
        match self {
            Self::Truth => 45,
            Self::Dare => 225,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "phase", rename_all = "lowercase")]
pub enum WheelPhase {
    Idle,
    Spinning {
        mode: PlayMode,
    },
    Revealed {
        mode: PlayMode,
        prompt: Option<String>,
    },
}

/// Pick a prompt that is not in `history`, or any prompt if all are recent.
pub fn pick_prompt<'a, S, R>(list: &'a [S], history: &[String], rng: &mut R) -> Option<&'a str>
where
    S: AsRef<str>,
    R: Rng + ?Sized,
{
    let fresh: Vec<&str> = list
        .iter()
        .map(AsRef::as_ref)
        .filter(|item| !history.iter().any(|seen| seen.as_str() == *item))
        .collect();

    if fresh.is_empty() {
        list.choose(rng).map(AsRef::as_ref)
    } else {
        fresh.choose(rng).copied()
    }
}

/// Append to a history, keeping only the newest [`HISTORY_TRIM`] entries
pub fn append_history(history: &mut Vec<String>, prompt: &str) {
    history.push(prompt.to_string());
    if history.len() > HISTORY_TRIM {
        let excess = history.len() - HISTORY_TRIM;
        history.drain(..excess);
    }
}

/// Prompt lists the wheel draws from
#[derive(Debug, Clone)]
pub struct PromptDeck {
    pub truths: Vec<String>,
    pub dares: Vec<String>,
}

impl Default for PromptDeck {
    fn default() -> Self {
        Self {
            truths: TRUTH_PROMPTS.iter().map(|s| s.to_string()).collect(),
            dares: DARE_PROMPTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

pub struct Wheel {
    phase: WheelPhase,
    active_index: usize,
    /// Accumulated rotation in degrees, for the spin animation
    rotation: i64,
    deck: PromptDeck,
    truth_history: Vec<String>,
    dare_history: Vec<String>,
    spin_duration: Duration,
}

impl Default for Wheel {
    fn default() -> Self {
        Self::new(PromptDeck::default())
    }
}

impl Wheel {
    pub fn new(deck: PromptDeck) -> Self {
        Self {
            phase: WheelPhase::Idle,
            active_index: 0,
            rotation: 0,
            deck,
            truth_history: Vec::new(),
            dare_history: Vec::new(),
            spin_duration: SPIN_DURATION,
        }
    }

    pub fn with_spin_duration(mut self, duration: Duration) -> Self {
        self.spin_duration = duration;
        self
    }

    pub fn phase(&self) -> &WheelPhase {
        &self.phase
    }

    pub fn rotation(&self) -> i64 {
        self.rotation
    }

    pub fn history(&self, mode: PlayMode) -> &[String] {
        match mode {
            PlayMode::Truth => &self.truth_history,
            PlayMode::Dare => &self.dare_history,
        }
    }

    /// The player whose turn it is
    pub fn active_player<'a>(&self, session: &'a PartySession) -> Option<&'a Player> {
        let players = session.players();
        if players.is_empty() {
            None
        } else {
            players.get(self.active_index % players.len())
        }
    }

    /// Flip for truth or dare and set the wheel turning.
    /// Returns `None` without players or while already spinning.
    pub fn begin_spin<R: Rng + ?Sized>(
        &mut self,
        session: &PartySession,
        rng: &mut R,
    ) -> Option<PlayMode> {
        if session.players().is_empty() || matches!(self.phase, WheelPhase::Spinning { .. }) {
            return None;
        }

        let mode = if rng.random_bool(0.5) {
            PlayMode::Truth
        } else {
            PlayMode::Dare
        };
        let jitter: i64 = rng.random_range(-25..25);
        self.rotation += 360 * 3 + mode.offset() + jitter;
        self.phase = WheelPhase::Spinning { mode };
        Some(mode)
    }

    /// Stop the wheel and draw a prompt for the chosen mode
    pub fn finish_spin<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<&str> {
        let WheelPhase::Spinning { mode } = self.phase else {
            return None;
        };
        let prompt = self.draw(mode, rng);
        self.phase = WheelPhase::Revealed { mode, prompt };
        self.current_prompt()
    }

    /// Full spin: flip, wait for the animation, reveal
    pub async fn spin<R: Rng + ?Sized>(
        &mut self,
        session: &PartySession,
        rng: &mut R,
    ) -> Option<String> {
        self.begin_spin(session, rng)?;
        tokio::time::sleep(self.spin_duration).await;
        self.finish_spin(rng).map(str::to_string)
    }

    /// Draw another prompt without spinning again
    pub fn new_prompt_same_mode<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<&str> {
        let WheelPhase::Revealed { mode, .. } = self.phase else {
            return None;
        };
        let prompt = self.draw(mode, rng);
        self.phase = WheelPhase::Revealed { mode, prompt };
        self.current_prompt()
    }

    /// Hand the wheel to the next player
    pub fn next_player(&mut self, session: &PartySession) -> bool {
        let count = session.players().len();
        if count == 0 {
            return false;
        }
        self.active_index = (self.active_index + 1) % count;
        self.phase = WheelPhase::Idle;
        true
    }

    pub fn current_prompt(&self) -> Option<&str> {
        match &self.phase {
            WheelPhase::Revealed { prompt, .. } => prompt.as_deref(),
            _ => None,
        }
    }

    fn draw<R: Rng + ?Sized>(&mut self, mode: PlayMode, rng: &mut R) -> Option<String> {
        let (list, history) = match mode {
            PlayMode::Truth => (&self.deck.truths, &mut self.truth_history),
            PlayMode::Dare => (&self.deck.dares, &mut self.dare_history),
        };
        let picked = pick_prompt(list.as_slice(), history.as_slice(), rng)?.to_string();
        append_history(history, &picked);
        Some(picked)
    }
}
