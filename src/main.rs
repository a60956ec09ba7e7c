use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use playlounge::{api, config::LoungeConfig};

#[tokio::main]
async fn main() {
    // OPENTDB_* and PLAYLOUNGE_* may come from a local .env
    match dotenvy::dotenv() {
        Ok(_) | Err(dotenvy::Error::Io(_)) => {}
        Err(e) => eprintln!("Warning: ignoring unreadable .env: {}", e),
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "playlounge=debug,tower_http=debug,axum=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Play Lounge...");

    let config = LoungeConfig::from_env();
    let source = match config.build_source() {
        Ok(source) => source,
        Err(e) => {
            tracing::error!("Failed to build trivia client: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!(
        questions = %config.questions_url,
        categories = %config.categories_url,
        "Trivia source configured"
    );

    let state = Arc::new(api::AppState::new(Arc::new(source)));

    let app = api::router(state)
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let listener = match tokio::net::TcpListener::bind(config.addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", config.addr, e);
            std::process::exit(1);
        }
    };
    tracing::info!("Listening on http://{}", config.addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}
