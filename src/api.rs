//! HTTP API endpoints.
//!
//! The trivia routes proxy Open Trivia DB for the browser; the game routes
//! expose the hub catalog.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::games::{game_by_slug, GameMeta, GAMES};
use crate::trivia::{TriviaError, TriviaParams, TriviaQuery, TriviaSource};
use crate::types::{CategoryOption, Question};

/// Shared state for the HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub trivia: Arc<dyn TriviaSource>,
}

impl AppState {
    pub fn new(trivia: Arc<dyn TriviaSource>) -> Self {
        Self { trivia }
    }
}

#[derive(Debug, Serialize)]
pub struct QuestionsResponse {
    pub questions: Vec<Question>,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<CategoryOption>,
}

#[derive(Debug, Serialize)]
pub struct GamesResponse {
    pub games: &'static [GameMeta],
}

#[derive(Debug, Serialize)]
pub struct GameResponse {
    pub game: &'static GameMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Routes under `/api`
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/trivia", get(get_trivia))
        .route("/api/trivia/categories", get(get_categories))
        .route("/api/games", get(list_games))
        .route("/api/games/{slug}", get(get_game))
        .with_state(state)
}

/// Proxy responses must never be cached by the browser or an intermediary
fn no_store<T: Serialize>(status: StatusCode, body: T) -> Response {
    (status, [(header::CACHE_CONTROL, "no-store")], Json(body)).into_response()
}

fn error_response(status: StatusCode, message: String) -> Response {
    no_store(status, ErrorBody { error: message })
}

/// Fetch a batch of trivia questions.
///
/// GET /api/trivia?amount&difficulty&type&category
pub async fn get_trivia(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let query = TriviaQuery::from_params(&TriviaParams::from_pairs(&pairs));

    match state.trivia.fetch_questions(&query).await {
        Ok(questions) => {
            tracing::info!(
                count = questions.len(),
                source = state.trivia.name(),
                "Served trivia questions"
            );
            no_store(StatusCode::OK, QuestionsResponse { questions })
        }
        Err(e @ TriviaError::Upstream(_)) => {
            tracing::warn!("Trivia upstream failed: {}", e);
            error_response(StatusCode::BAD_GATEWAY, e.to_string())
        }
        Err(e @ TriviaError::NoResults) => error_response(StatusCode::NOT_FOUND, e.to_string()),
        Err(e) => {
            tracing::error!("Failed to fetch trivia questions: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Unable to load trivia questions.".to_string(),
            )
        }
    }
}

/// List trivia categories.
///
/// GET /api/trivia/categories
pub async fn get_categories(State(state): State<Arc<AppState>>) -> Response {
    match state.trivia.fetch_categories().await {
        Ok(categories) => no_store(StatusCode::OK, CategoriesResponse { categories }),
        Err(TriviaError::Upstream(status)) => {
            tracing::warn!("Trivia categories upstream returned {}", status);
            error_response(
                StatusCode::BAD_GATEWAY,
                format!("Trivia categories request failed with status {}", status),
            )
        }
        Err(e) => {
            tracing::error!("Failed to fetch trivia categories: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Unable to load trivia categories.".to_string(),
            )
        }
    }
}

/// GET /api/games
pub async fn list_games() -> Json<GamesResponse> {
    Json(GamesResponse { games: GAMES })
}

/// GET /api/games/{slug}
pub async fn get_game(Path(slug): Path<String>) -> Response {
    match game_by_slug(&slug) {
        Some(game) => Json(GameResponse { game }).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorBody {
                error: format!("Unknown game: {}", slug),
            }),
        )
            .into_response(),
    }
}
