use axum::{routing::get, routing::post, Router};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::collector::{Collector, RunReport};
use crate::config::Config;

use super::api::reentries as reentry_handlers;
use super::api_doc::ApiDoc;
use super::auth::AppState;

const FALLBACK_REFRESH_INTERVAL: Duration = Duration::from_secs(15 * 60);

impl AppState {
    async fn run_and_store(&self) -> RunReport {
        let mut rng = match self.config.pipeline.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let report = self.collector.run(Utc::now(), &mut rng).await;
        *self.latest.write().await = Some(report.clone());
        report
    }

    /// Run the pipeline, waiting for any refresh already in flight.
    pub async fn refresh(&self) -> RunReport {
        let _guard = self.refreshing.lock().await;
        self.run_and_store().await
    }

    /// Run the pipeline unless a refresh is already in flight.
    pub async fn try_refresh(&self) -> Option<RunReport> {
        let _guard = self.refreshing.try_lock().ok()?;
        Some(self.run_and_store().await)
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/reentries", get(reentry_handlers::list_reentries))
        .route("/api/reentries/summary", get(reentry_handlers::summary))
        .route("/api/reentries/refresh", post(reentry_handlers::refresh))
        .route("/api/sources", get(reentry_handlers::sources))
        // OpenAPI / Swagger
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn spawn_refresh_loop(state: AppState, interval: Duration) {
    tokio::spawn(async move {
        loop {
            let report = state.refresh().await;
            log::info!(
                "refreshed: {} candidates, {}/{} sources available",
                report.entries.len(),
                report.available_sources(),
                report.sources.len()
            );
            tokio::time::sleep(interval).await;
        }
    });
}

pub async fn run_server(config: Config, collector: Collector) -> std::io::Result<()> {
    let bind_addr = config.web.bind.clone();
    let interval = config.refresh_interval().unwrap_or_else(|e| {
        log::warn!("{}, refreshing every {:?}", e, FALLBACK_REFRESH_INTERVAL);
        FALLBACK_REFRESH_INTERVAL
    });

    let state = AppState::new(config, collector);
    spawn_refresh_loop(state.clone(), interval);

    let app = router(state);

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await
}
