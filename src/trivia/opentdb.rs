use super::*;
use reqwest::header::ACCEPT;
use serde_json::Value;
use std::time::Duration;

/// Open Trivia DB provider implementation
pub struct OpenTdbClient {
    questions_url: String,
    categories_url: String,
    client: reqwest::Client,
}

/// Envelope of the question feed (`api.php`)
#[derive(Debug, Deserialize)]
struct QuestionFeed {
    response_code: i64,
    #[serde(default)]
    results: Vec<RawQuestion>,
}

impl OpenTdbClient {
    /// Create a client for the given question and category endpoints
    pub fn new(
        questions_url: String,
        categories_url: String,
        timeout: Duration,
    ) -> TriviaResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TriviaError::Unexpected(e.to_string()))?;

        Ok(Self {
            questions_url,
            categories_url,
            client,
        })
    }
}

/// Pull `{id, name}` pairs out of a category payload.
///
/// Anything that isn't shaped like `{"trivia_categories": [...]}` yields an
/// empty list so callers can fall back to "any category".
pub fn categories_from_payload(payload: &Value) -> Vec<CategoryOption> {
    let Some(list) = payload.get("trivia_categories").and_then(Value::as_array) else {
        tracing::warn!("Category payload has no trivia_categories array");
        return Vec::new();
    };

    list.iter()
        .map(|item| CategoryOption {
            id: match item.get("id") {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => String::new(),
            },
            name: item
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or("Unknown")
                .to_string(),
        })
        .collect()
}

#[async_trait]
impl TriviaSource for OpenTdbClient {
    async fn fetch_questions(&self, query: &TriviaQuery) -> TriviaResult<Vec<Question>> {
        tracing::debug!(amount = query.amount, "Requesting trivia questions");

        let response = self
            .client
            .get(&self.questions_url)
            .header(ACCEPT, "application/json")
            .query(&query.upstream_params())
            .send()
            .await
            .map_err(|e| TriviaError::Unexpected(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TriviaError::Upstream(status.as_u16()));
        }

        let feed: QuestionFeed = response
            .json()
            .await
            .map_err(|e| TriviaError::MalformedPayload(e.to_string()))?;

        if feed.response_code != 0 {
            tracing::info!(
                response_code = feed.response_code,
                "Trivia source had no questions for filters"
            );
            return Err(TriviaError::NoResults);
        }

        let mut rng = rand::rng();
        Ok(feed
            .results
            .into_iter()
            .map(|raw| normalize_question(raw, &mut rng))
            .collect())
    }

    async fn fetch_categories(&self) -> TriviaResult<Vec<CategoryOption>> {
        let response = self
            .client
            .get(&self.categories_url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| TriviaError::Unexpected(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TriviaError::Upstream(status.as_u16()));
        }

        match response.json::<Value>().await {
            Ok(payload) => Ok(categories_from_payload(&payload)),
            Err(e) => {
                tracing::warn!("Category payload was not JSON: {}", e);
                Ok(Vec::new())
            }
        }
    }

    fn name(&self) -> &str {
        "opentdb"
    }
}
