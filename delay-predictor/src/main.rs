use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use delay_predictor::artifacts::load_context;
use delay_predictor::config::ServiceConfig;
use delay_predictor::service::PredictionService;
use delay_predictor::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "delay_predictor=info,tower_http=info".into()),
        )
        .init();

    let config = ServiceConfig::from_env().expect("Invalid configuration");

    // Load every artifact before binding (fail fast if any is missing)
    tracing::info!(model = %config.artifacts.model.display(), "loading artifacts");
    let context = load_context(&config.artifacts).expect("Failed to load artifacts");

    let predictor = PredictionService::new(Arc::new(context), config.arrival_clock);
    let state = AppState::new(predictor);
    let app = create_router(state);

    let addr = config.bind_addr;
    tracing::info!(
        %addr,
        arrival_clock = %config.arrival_clock,
        "delay predictor listening"
    );
    tracing::info!("  GET  /health                - Health check");
    tracing::info!("  POST /api/predict           - Predict arrival delay");
    tracing::info!("  GET  /api/vocabulary/:name  - List station, train or day labels");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}
