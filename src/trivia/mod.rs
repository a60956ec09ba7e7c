//! Trivia question sources.
//!
//! A [`TriviaSource`] turns a [`TriviaQuery`] into display-ready [`Question`]s.
//! The production source is [`OpenTdbClient`], which talks to Open Trivia DB;
//! tests plug in their own sources behind the same trait.

mod opentdb;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;

use crate::types::{
    CategoryOption, Difficulty, Question, QuestionType, DEFAULT_AMOUNT, MAX_TOTAL_QUESTIONS,
};

pub use opentdb::OpenTdbClient;

/// Result type for trivia source operations
pub type TriviaResult<T> = Result<T, TriviaError>;

/// Errors that can occur while talking to a trivia source
#[derive(Debug, thiserror::Error)]
pub enum TriviaError {
    #[error("Trivia source returned {0}")]
    Upstream(u16),

    #[error("No trivia questions available for the requested settings.")]
    NoResults,

    #[error("Trivia source sent an unexpected payload: {0}")]
    MalformedPayload(String),

    #[error("Unable to reach trivia source: {0}")]
    Unexpected(String),
}

/// Trait that all trivia question providers must implement
#[async_trait]
pub trait TriviaSource: Send + Sync {
    /// Fetch a batch of questions matching the query
    async fn fetch_questions(&self, query: &TriviaQuery) -> TriviaResult<Vec<Question>>;

    /// List the categories the source knows about
    async fn fetch_categories(&self) -> TriviaResult<Vec<CategoryOption>>;

    /// Get the name of this source
    fn name(&self) -> &str;
}

/// Raw query string parameters, exactly as the client sent them
#[derive(Debug, Clone, Default)]
pub struct TriviaParams {
    pub amount: Option<String>,
    pub difficulty: Option<String>,
    pub kind: Option<String>,
    pub category: Option<String>,
}

impl TriviaParams {
    /// Collect parameters from decoded query pairs.
    /// The first value wins when a key repeats; unknown keys are ignored.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let first = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        };
        Self {
            amount: first("amount"),
            difficulty: first("difficulty"),
            kind: first("type"),
            category: first("category"),
        }
    }
}

/// A validated question request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriviaQuery {
    pub amount: usize,
    pub difficulty: Option<Difficulty>,
    pub kind: Option<QuestionType>,
    pub category: Option<u32>,
}

impl Default for TriviaQuery {
    fn default() -> Self {
        Self {
            amount: DEFAULT_AMOUNT,
            difficulty: None,
            kind: None,
            category: None,
        }
    }
}

impl TriviaQuery {
    /// Build a query from untrusted parameters.
    ///
    /// Bad amounts fall back to the default, oversized ones are capped, and
    /// unknown filters are dropped rather than rejected.
    pub fn from_params(params: &TriviaParams) -> Self {
        Self {
            amount: clamp_amount(params.amount.as_deref()),
            difficulty: params
                .difficulty
                .as_deref()
                .and_then(Difficulty::from_param),
            kind: params.kind.as_deref().and_then(QuestionType::from_param),
            category: params.category.as_deref().and_then(parse_category),
        }
    }

    /// Query pairs to forward to the upstream question feed
    pub fn upstream_params(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("amount", self.amount.to_string())];
        if let Some(difficulty) = self.difficulty {
            pairs.push(("difficulty", difficulty.as_str().to_string()));
        }
        if let Some(kind) = self.kind {
            pairs.push(("type", kind.as_str().to_string()));
        }
        if let Some(category) = self.category {
            pairs.push(("category", category.to_string()));
        }
        pairs
    }
}

fn clamp_amount(raw: Option<&str>) -> usize {
    match raw.map(str::trim).and_then(|s| s.parse::<i64>().ok()) {
        Some(n) if n > 0 => (n as u64).min(MAX_TOTAL_QUESTIONS as u64) as usize,
        _ => DEFAULT_AMOUNT,
    }
}

fn parse_category(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|id| *id > 0)
}

/// A question as Open Trivia DB sends it (HTML-escaped)
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuestion {
    pub category: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub difficulty: Difficulty,
    pub question: String,
    pub correct_answer: String,
    #[serde(default)]
    pub incorrect_answers: Vec<String>,
}

/// Decode HTML entities (`&quot;`, `&#039;`, `&eacute;`, ...) into plain text
pub fn decode_entities(value: &str) -> String {
    html_escape::decode_html_entities(value).into_owned()
}

/// Put the correct answer among the distractors in a uniformly random order
pub fn shuffle_options<R: Rng + ?Sized>(
    correct: &str,
    incorrect: &[String],
    rng: &mut R,
) -> Vec<String> {
    let mut options = Vec::with_capacity(incorrect.len() + 1);
    options.push(correct.to_string());
    options.extend(incorrect.iter().cloned());
    options.shuffle(rng);
    options
}

/// Decode a raw upstream question and give it a fresh id and shuffled options
pub fn normalize_question<R: Rng + ?Sized>(raw: RawQuestion, rng: &mut R) -> Question {
    let correct_answer = decode_entities(&raw.correct_answer);
    let incorrect: Vec<String> = raw
        .incorrect_answers
        .iter()
        .map(|answer| decode_entities(answer))
        .collect();
    let options = shuffle_options(&correct_answer, &incorrect, rng);

    Question {
        id: ulid::Ulid::new().to_string(),
        category: decode_entities(&raw.category),
        kind: raw.kind,
        difficulty: raw.difficulty,
        prompt_text: decode_entities(&raw.question),
        correct_answer,
        options,
    }
}
