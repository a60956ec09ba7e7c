//! Trivia Night round controller.
//!
//! Drives one game from roster to summary:
//!
//! ```text
//! Setup -> Loading -> Active -> Summary
//!   ^         |                   |
//!   |         v                   | replay (back to Loading)
//!   +----- Error                  | adjust settings (back to Setup)
//! ```
//!
//! While active, each turn is `Hidden -> Revealed -> Awarded`; advancing is
//! allowed from any step.

mod assign;

use serde::Serialize;
use std::time::Duration;

use crate::session::PartySession;
use crate::trivia::{TriviaError, TriviaQuery, TriviaSource};
use crate::types::{Difficulty, Player, Question, QuestionType};

pub use assign::{plan_capacity, CapacityPlan, RoundAssignment};

/// Pause between an advance request and the next turn appearing
pub const ADVANCE_DELAY: Duration = Duration::from_millis(120);

/// Choices offered for questions per player
pub const PER_PLAYER_RANGE: std::ops::RangeInclusive<usize> = 1..=10;

#[derive(Debug, thiserror::Error)]
pub enum RoundError {
    #[error("Add at least one player to start trivia.")]
    EmptyRoster,

    #[error("Too many players for the 50-question limit. Remove a few players or reduce questions per player.")]
    OverCapacity,

    #[error("The trivia source did not return enough questions for these settings ({received} of {requested}). Try different filters or fewer questions per player.")]
    NotEnoughQuestions { requested: usize, received: usize },

    #[error("Cannot {0} right now")]
    InvalidPhase(&'static str),

    #[error(transparent)]
    Source(#[from] TriviaError),
}

/// Where the current turn stands
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TurnStep {
    Hidden,
    Revealed,
    Awarded,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTurn {
    pub round: usize,
    pub player_index: usize,
    pub step: TurnStep,
}

impl ActiveTurn {
    fn first() -> Self {
        Self {
            round: 0,
            player_index: 0,
            step: TurnStep::Hidden,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RoundPhase {
    Setup,
    Loading,
    Active(ActiveTurn),
    Summary,
    Error { message: String },
}

/// Filters and sizing chosen on the setup screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSettings {
    pub questions_per_player: usize,
    pub difficulty: Option<Difficulty>,
    pub kind: Option<QuestionType>,
    pub category: Option<u32>,
}

impl Default for RoundSettings {
    fn default() -> Self {
        Self {
            questions_per_player: 3,
            difficulty: None,
            kind: None,
            category: None,
        }
    }
}

impl RoundSettings {
    fn query(&self, amount: usize) -> TriviaQuery {
        TriviaQuery {
            amount,
            difficulty: self.difficulty,
            kind: self.kind,
            category: self.category,
        }
    }
}

/// One line of the final scoreboard
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub player: Player,
    pub score: u32,
    pub questions_asked: usize,
}

pub struct TriviaRound {
    phase: RoundPhase,
    settings: RoundSettings,
    assignment: RoundAssignment,
    /// Questions per player for the dealt deck (may be less than requested)
    per_player: Option<usize>,
    /// Questions the table has moved past this round
    completed: usize,
    capacity_notice: Option<String>,
    advance_delay: Duration,
}

impl Default for TriviaRound {
    fn default() -> Self {
        Self::new(RoundSettings::default())
    }
}

fn clamp_per_player(count: usize) -> usize {
    count.clamp(*PER_PLAYER_RANGE.start(), *PER_PLAYER_RANGE.end())
}

impl TriviaRound {
    pub fn new(mut settings: RoundSettings) -> Self {
        settings.questions_per_player = clamp_per_player(settings.questions_per_player);
        Self {
            phase: RoundPhase::Setup,
            settings,
            assignment: RoundAssignment::default(),
            per_player: None,
            completed: 0,
            capacity_notice: None,
            advance_delay: ADVANCE_DELAY,
        }
    }

    /// Override the pause applied by [`TriviaRound::advance`]
    pub fn with_advance_delay(mut self, delay: Duration) -> Self {
        self.advance_delay = delay;
        self
    }

    pub fn phase(&self) -> &RoundPhase {
        &self.phase
    }

    pub fn settings(&self) -> &RoundSettings {
        &self.settings
    }

    pub fn capacity_notice(&self) -> Option<&str> {
        self.capacity_notice.as_deref()
    }

    pub fn assignment(&self) -> &RoundAssignment {
        &self.assignment
    }

    /// Questions per player in the dealt deck
    pub fn questions_per_player(&self) -> Option<usize> {
        self.per_player
    }

    pub fn total_questions(&self) -> usize {
        self.per_player.unwrap_or(0) * self.assignment.players().len()
    }

    pub fn questions_progressed(&self) -> usize {
        self.completed
    }

    /// Change filters or sizing. Only allowed before a round starts.
    pub fn update_settings(&mut self, mut settings: RoundSettings) -> Result<(), RoundError> {
        if !matches!(self.phase, RoundPhase::Setup | RoundPhase::Error { .. }) {
            return Err(RoundError::InvalidPhase("change settings"));
        }
        settings.questions_per_player = clamp_per_player(settings.questions_per_player);
        self.settings = settings;
        Ok(())
    }

    /// The player on turn and their question
    pub fn current_question(&self) -> Option<(&Player, &Question)> {
        match &self.phase {
            RoundPhase::Active(turn) => self.assignment.question(turn.player_index, turn.round),
            _ => None,
        }
    }

    /// Fetch a deck and deal it to the session's roster
    pub async fn start(
        &mut self,
        session: &mut PartySession,
        source: &dyn TriviaSource,
    ) -> Result<(), RoundError> {
        if self.phase != RoundPhase::Setup {
            return Err(RoundError::InvalidPhase("start a round"));
        }
        self.begin(session, source, false).await
    }

    /// Play again with the same roster and settings
    pub async fn replay(
        &mut self,
        session: &mut PartySession,
        source: &dyn TriviaSource,
    ) -> Result<(), RoundError> {
        if self.phase != RoundPhase::Summary {
            return Err(RoundError::InvalidPhase("replay"));
        }
        self.begin(session, source, true).await
    }

    async fn begin(
        &mut self,
        session: &mut PartySession,
        source: &dyn TriviaSource,
        reuse_notice: bool,
    ) -> Result<(), RoundError> {
        let players = session.players().to_vec();
        let plan = match plan_capacity(players.len(), self.settings.questions_per_player) {
            Ok(plan) => plan,
            Err(e) => {
                self.phase = RoundPhase::Setup;
                session.unlock();
                return Err(e);
            }
        };

        session.lock();
        session.reset_scores();
        self.phase = RoundPhase::Loading;
        self.assignment = RoundAssignment::default();
        self.per_player = None;
        self.completed = 0;
        if !reuse_notice {
            self.capacity_notice = None;
        }

        tracing::info!(
            players = players.len(),
            per_player = plan.per_player,
            total = plan.total,
            "Loading trivia round"
        );

        let fetched = source
            .fetch_questions(&self.settings.query(plan.total))
            .await
            .map_err(RoundError::from)
            .and_then(|deck| {
                if deck.len() < plan.total {
                    Err(RoundError::NotEnoughQuestions {
                        requested: plan.total,
                        received: deck.len(),
                    })
                } else {
                    Ok(deck)
                }
            });

        match fetched {
            Ok(mut deck) => {
                deck.truncate(plan.total);
                self.assignment = RoundAssignment::build(&players, deck);
                self.per_player = Some(plan.per_player);
                self.capacity_notice = plan.notice;
                self.phase = RoundPhase::Active(ActiveTurn::first());
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Trivia round failed to load: {}", e);
                self.phase = RoundPhase::Error {
                    message: e.to_string(),
                };
                session.unlock();
                Err(e)
            }
        }
    }

    /// Show the answer. Returns false if there was nothing to reveal.
    pub fn reveal(&mut self) -> bool {
        match &mut self.phase {
            RoundPhase::Active(turn) if turn.step == TurnStep::Hidden => {
                turn.step = TurnStep::Revealed;
                true
            }
            _ => false,
        }
    }

    /// Give the player on turn one point. Only once per question, and only
    /// after the answer has been revealed.
    pub fn award_correct(&mut self, session: &mut PartySession) -> bool {
        let RoundPhase::Active(turn) = &mut self.phase else {
            return false;
        };
        if turn.step != TurnStep::Revealed {
            return false;
        }
        let Some(player) = self.assignment.players().get(turn.player_index) else {
            return false;
        };

        turn.step = TurnStep::Awarded;
        let score = session.award_point(&player.id);
        tracing::debug!("Awarded point to {} (now {})", player.name, score);
        true
    }

    /// Move to the next player, the next round, or the summary
    pub async fn advance(&mut self) -> bool {
        if !matches!(self.phase, RoundPhase::Active(_)) {
            return false;
        }

        self.completed += 1;
        if !self.advance_delay.is_zero() {
            tokio::time::sleep(self.advance_delay).await;
        }

        let RoundPhase::Active(turn) = self.phase else {
            return false;
        };
        let player_count = self.assignment.players().len();
        let rounds = self.per_player.unwrap_or(0);
        let last_player = turn.player_index + 1 >= player_count;
        let last_round = turn.round + 1 >= rounds;

        self.phase = if last_player && last_round {
            tracing::info!(questions = self.completed, "Trivia round finished");
            RoundPhase::Summary
        } else if last_player {
            RoundPhase::Active(ActiveTurn {
                round: turn.round + 1,
                player_index: 0,
                step: TurnStep::Hidden,
            })
        } else {
            RoundPhase::Active(ActiveTurn {
                round: turn.round,
                player_index: turn.player_index + 1,
                step: TurnStep::Hidden,
            })
        };
        true
    }

    /// Leave the current game and go back to the setup screen
    pub fn adjust_settings(&mut self, session: &mut PartySession) -> bool {
        if matches!(self.phase, RoundPhase::Setup | RoundPhase::Loading) {
            return false;
        }
        self.clear_round();
        session.reset_scores();
        session.unlock();
        self.phase = RoundPhase::Setup;
        true
    }

    /// Dismiss a load failure. The roster is kept.
    pub fn try_again(&mut self, session: &mut PartySession) -> bool {
        if !matches!(self.phase, RoundPhase::Error { .. }) {
            return false;
        }
        self.clear_round();
        session.unlock();
        self.phase = RoundPhase::Setup;
        true
    }

    fn clear_round(&mut self) {
        self.assignment = RoundAssignment::default();
        self.per_player = None;
        self.completed = 0;
        self.capacity_notice = None;
    }

    /// Scores for this round's players, best first (ties by name)
    pub fn standings(&self, session: &PartySession) -> Vec<Standing> {
        let asked = self.per_player.unwrap_or(0);
        let mut standings: Vec<Standing> = self
            .assignment
            .players()
            .iter()
            .map(|player| Standing {
                player: player.clone(),
                score: session.scores().get(&player.id),
                questions_asked: asked,
            })
            .collect();

        standings.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.player.name.cmp(&b.player.name))
        });
        standings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryStore;
    use crate::types::CategoryOption;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Hands out a fixed number of questions, or a canned error
    struct StubSource {
        available: usize,
        error: Option<fn() -> TriviaError>,
        queries: Mutex<Vec<TriviaQuery>>,
    }

    impl StubSource {
        fn with(available: usize) -> Self {
            Self {
                available,
                error: None,
                queries: Mutex::new(Vec::new()),
            }
        }

        fn failing(error: fn() -> TriviaError) -> Self {
            Self {
                available: 0,
                error: Some(error),
                queries: Mutex::new(Vec::new()),
            }
        }

        fn last_query(&self) -> TriviaQuery {
            self.queries.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl TriviaSource for StubSource {
        async fn fetch_questions(&self, query: &TriviaQuery) -> Result<Vec<Question>, TriviaError> {
            self.queries.lock().unwrap().push(query.clone());
            if let Some(error) = self.error {
                return Err(error());
            }
            Ok((0..query.amount.min(self.available))
                .map(|i| Question {
                    id: format!("q{}", i),
                    category: "General".to_string(),
                    kind: QuestionType::Multiple,
                    difficulty: Difficulty::Medium,
                    prompt_text: format!("Question {}", i),
                    correct_answer: "A".to_string(),
                    options: vec!["B".to_string(), "A".to_string()],
                })
                .collect())
        }

        async fn fetch_categories(&self) -> Result<Vec<CategoryOption>, TriviaError> {
            Ok(Vec::new())
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn session_with(names: &[&str]) -> PartySession {
        let mut session = PartySession::restore(Arc::new(MemoryStore::new()));
        for name in names {
            session.add_player(name).unwrap();
        }
        session
    }

    fn round(per_player: usize) -> TriviaRound {
        TriviaRound::new(RoundSettings {
            questions_per_player: per_player,
            ..Default::default()
        })
        .with_advance_delay(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_start_deals_round_robin() {
        let mut session = session_with(&["Ava", "Ben"]);
        let source = StubSource::with(50);
        let mut game = round(2);

        game.start(&mut session, &source).await.unwrap();

        assert_eq!(source.last_query().amount, 4);
        assert!(session.is_locked());
        assert_eq!(game.questions_per_player(), Some(2));
        assert_eq!(game.total_questions(), 4);

        let (player, question) = game.current_question().unwrap();
        assert_eq!(player.name, "Ava");
        assert_eq!(question.id, "q0");
        let ids: Vec<&str> = game
            .assignment()
            .questions_for(1)
            .iter()
            .map(|q| q.id.as_str())
            .collect();
        assert_eq!(ids, vec!["q1", "q3"]);
    }

    #[tokio::test]
    async fn test_start_requires_players() {
        let mut session = session_with(&[]);
        let source = StubSource::with(10);
        let mut game = round(3);

        let err = game.start(&mut session, &source).await.unwrap_err();
        assert!(matches!(err, RoundError::EmptyRoster));
        assert_eq!(game.phase(), &RoundPhase::Setup);
        assert!(!session.is_locked());
        assert!(source.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_capacity_clamp_sets_notice() {
        let names = ["A", "B", "C", "D", "E", "F", "G"];
        let mut session = session_with(&names);
        let source = StubSource::with(50);
        let mut game = round(10);

        game.start(&mut session, &source).await.unwrap();

        assert_eq!(source.last_query().amount, 49);
        assert_eq!(game.questions_per_player(), Some(7));
        assert!(game.capacity_notice().unwrap().contains("7 questions"));
    }

    #[tokio::test]
    async fn test_short_deck_is_an_error() {
        let mut session = session_with(&["Ava", "Ben"]);
        let source = StubSource::with(3);
        let mut game = round(2);

        let err = game.start(&mut session, &source).await.unwrap_err();
        assert!(matches!(
            err,
            RoundError::NotEnoughQuestions {
                requested: 4,
                received: 3
            }
        ));
        assert!(matches!(game.phase(), RoundPhase::Error { .. }));
        assert!(!session.is_locked());
        assert!(game.questions_per_player().is_none());
    }

    #[tokio::test]
    async fn test_source_error_then_try_again() {
        let mut session = session_with(&["Ava"]);
        let source = StubSource::failing(|| TriviaError::NoResults);
        let mut game = round(1);

        assert!(game.start(&mut session, &source).await.is_err());
        match game.phase() {
            RoundPhase::Error { message } => {
                assert_eq!(
                    message,
                    "No trivia questions available for the requested settings."
                )
            }
            other => panic!("Expected error phase, got {:?}", other),
        }
        assert!(!session.is_locked());

        assert!(game.try_again(&mut session));
        assert_eq!(game.phase(), &RoundPhase::Setup);
        assert_eq!(session.players().len(), 1);
        assert!(!game.try_again(&mut session));
    }

    #[tokio::test]
    async fn test_award_requires_reveal_and_is_idempotent() {
        let mut session = session_with(&["Ava"]);
        let source = StubSource::with(10);
        let mut game = round(1);
        game.start(&mut session, &source).await.unwrap();
        let ava = session.players()[0].id.clone();

        assert!(!game.award_correct(&mut session));
        assert_eq!(session.scores().get(&ava), 0);

        assert!(game.reveal());
        assert!(!game.reveal());

        assert!(game.award_correct(&mut session));
        assert!(!game.award_correct(&mut session));
        assert!(!game.award_correct(&mut session));
        assert_eq!(session.scores().get(&ava), 1);
        assert!(!game.reveal());
    }

    #[tokio::test]
    async fn test_advance_walks_players_then_rounds() {
        let mut session = session_with(&["Ava", "Ben"]);
        let source = StubSource::with(10);
        let mut game = round(2);
        game.start(&mut session, &source).await.unwrap();

        let mut seen = Vec::new();
        while let RoundPhase::Active(turn) = game.phase().clone() {
            seen.push((turn.round, turn.player_index));
            assert!(game.advance().await);
        }

        assert_eq!(seen, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
        assert_eq!(game.phase(), &RoundPhase::Summary);
        assert_eq!(game.questions_progressed(), 4);
        assert!(!game.advance().await);
        assert!(game.current_question().is_none());
    }

    #[tokio::test]
    async fn test_unrevealed_advance_scores_nothing() {
        let mut session = session_with(&["Ava"]);
        let source = StubSource::with(10);
        let mut game = round(1);
        game.start(&mut session, &source).await.unwrap();

        assert!(game.advance().await);
        assert_eq!(session.scores().total(), 0);
        assert_eq!(game.phase(), &RoundPhase::Summary);
    }

    #[tokio::test]
    async fn test_advance_waits_for_delay() {
        let mut session = session_with(&["Ava", "Ben"]);
        let source = StubSource::with(10);
        let mut game = round(1).with_advance_delay(Duration::from_millis(20));
        game.start(&mut session, &source).await.unwrap();

        let started = std::time::Instant::now();
        assert!(game.advance().await);
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_standings_sorted_by_score_then_name() {
        let mut session = session_with(&["Cal", "Ava", "Ben"]);
        let source = StubSource::with(10);
        let mut game = round(1);
        game.start(&mut session, &source).await.unwrap();

        // Cal misses, Ava scores, Ben scores
        game.advance().await;
        game.reveal();
        game.award_correct(&mut session);
        game.advance().await;
        game.reveal();
        game.award_correct(&mut session);
        game.advance().await;

        let standings = game.standings(&session);
        let order: Vec<(&str, u32)> = standings
            .iter()
            .map(|s| (s.player.name.as_str(), s.score))
            .collect();
        assert_eq!(order, vec![("Ava", 1), ("Ben", 1), ("Cal", 0)]);
        assert!(standings.iter().all(|s| s.questions_asked == 1));
    }

    #[tokio::test]
    async fn test_replay_keeps_settings_and_resets_scores() {
        let names = ["A", "B", "C", "D", "E", "F", "G"];
        let mut session = session_with(&names);
        let source = StubSource::with(50);
        let mut game = TriviaRound::new(RoundSettings {
            questions_per_player: 10,
            difficulty: Some(Difficulty::Hard),
            ..Default::default()
        })
        .with_advance_delay(Duration::ZERO);

        game.start(&mut session, &source).await.unwrap();
        game.reveal();
        game.award_correct(&mut session);
        while game.advance().await {}
        assert_eq!(game.phase(), &RoundPhase::Summary);
        assert_eq!(session.scores().total(), 1);
        assert!(session.is_locked());

        game.replay(&mut session, &source).await.unwrap();
        assert!(matches!(game.phase(), RoundPhase::Active(_)));
        assert_eq!(session.scores().total(), 0);
        assert_eq!(game.questions_progressed(), 0);
        assert!(game.capacity_notice().is_some());
        assert_eq!(source.last_query().difficulty, Some(Difficulty::Hard));
        assert_eq!(source.last_query().amount, 49);
    }

    #[tokio::test]
    async fn test_adjust_settings_unlocks_roster() {
        let mut session = session_with(&["Ava", "Ben"]);
        let source = StubSource::with(10);
        let mut game = round(1);
        game.start(&mut session, &source).await.unwrap();

        assert!(game.update_settings(RoundSettings::default()).is_err());
        assert!(session.add_player("Cal").is_err());

        assert!(game.adjust_settings(&mut session));
        assert_eq!(game.phase(), &RoundPhase::Setup);
        assert!(!session.is_locked());
        assert!(game.assignment().is_empty());
        assert_eq!(game.total_questions(), 0);
        assert!(!game.adjust_settings(&mut session));

        game.update_settings(RoundSettings {
            questions_per_player: 99,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(game.settings().questions_per_player, 10);
        assert!(session.add_player("Cal").unwrap().is_some());
    }

    #[tokio::test]
    async fn test_start_only_from_setup() {
        let mut session = session_with(&["Ava"]);
        let source = StubSource::with(10);
        let mut game = round(1);
        game.start(&mut session, &source).await.unwrap();

        assert!(matches!(
            game.start(&mut session, &source).await,
            Err(RoundError::InvalidPhase(_))
        ));
        assert!(matches!(
            game.replay(&mut session, &source).await,
            Err(RoundError::InvalidPhase(_))
        ));
    }

    #[test]
    fn test_phase_serializes_with_status_tag() {
        let phase = RoundPhase::Active(ActiveTurn::first());
        let json = serde_json::to_value(&phase).unwrap();
        assert_eq!(json["status"], "active");
        assert_eq!(json["playerIndex"], 0);
        assert_eq!(json["step"], "hidden");
    }

    #[tokio::test]
    async fn test_zero_per_player_is_raised_to_one() {
        let mut session = session_with(&["Ava", "Ben"]);
        let source = StubSource::with(10);
        let mut game = round(0);
        assert_eq!(game.settings().questions_per_player, 1);

        game.start(&mut session, &source).await.unwrap();
        assert_eq!(source.last_query().amount, 2);
        assert_eq!(game.questions_per_player(), Some(1));
        assert_eq!(game.total_questions(), 2);

        assert!(game.advance().await);
        let (player, question) = game.current_question().unwrap();
        assert_eq!(player.name, "Ben");
        assert_eq!(question.id, "q1");

        assert!(game.advance().await);
        assert_eq!(game.phase(), &RoundPhase::Summary);
        assert_eq!(game.questions_progressed(), 2);
        assert!(game.standings(&session).iter().all(|s| s.questions_asked == 1));
    }
}
