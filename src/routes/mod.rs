use axum::{routing::get, Router};
use crate::{handlers, types::AppState};

pub fn create_routes(app_state: AppState, metrics_enabled: bool) -> Router {
    let mut router = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/status", get(handlers::health::status))
        .route("/profile", get(handlers::health::profile));

    if metrics_enabled {
        router = router.route("/metrics", get(handlers::metrics::metrics));
    }

    router
        .fallback(handlers::fallback::not_found)
        .with_state(app_state)
}
