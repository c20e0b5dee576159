use std::path::Path;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use service::VotingApp;

pub mod ops;
pub mod voting;

/// Build the full application router: voting endpoints, health/metrics, and
/// the static front end as fallback.
pub fn build_router(app: VotingApp, cors: CorsLayer, static_dir: &str) -> Router {
    let index = Path::new(static_dir).join("index.html");
    let static_files = ServeDir::new(static_dir).fallback(ServeFile::new(index));

    let api = Router::new()
        .route("/identify_voter", post(voting::identify_voter))
        .route("/cast_vote", post(voting::cast_vote))
        .with_state(app);

    let ops = Router::new()
        .route("/health", get(ops::health))
        .route("/metrics", get(ops::metrics));

    api.merge(ops)
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback_service(static_files)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // one span per request carrying method and path
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
