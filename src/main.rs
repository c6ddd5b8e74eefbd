use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nf_sbi::clients::{NrfClient, RequestContext, SbiClient};
use nf_sbi::config::Config;
use nf_sbi::metrics::RequestMetrics;
use nf_sbi::routes;
use nf_sbi::types::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    let level = config.logging.level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("nf_sbi={level},tower_http={level}").into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    config.validate()?;

    let profile = Arc::new(config.local_profile());
    let service_name = profile.nf_type.to_string();
    let metrics = Arc::new(RequestMetrics::new());

    let nrf_client = match config.nrf_uri() {
        Some(uri) => {
            let sbi = SbiClient::new(service_name.clone(), config.request_timeout())
                .with_metrics(metrics.clone());
            Some(Arc::new(NrfClient::new(uri, sbi)))
        }
        None => {
            tracing::warn!("NRF URI not configured, registration and discovery are disabled");
            None
        }
    };

    if let Some(ref nrf_client) = nrf_client {
        let ctx = RequestContext::background().with_timeout(config.request_timeout());
        if let Err(e) = nrf_client.register(&ctx, &profile).await {
            tracing::error!("Failed to register with NRF: {}", e);
        }
    }

    let state = AppState {
        service_name,
        profile: profile.clone(),
        nrf_client: nrf_client.clone(),
        metrics,
    };

    let app = routes::create_routes(state, config.metrics.enabled)
        .layer(TraceLayer::new_for_http())
        .layer(tower_http::cors::CorsLayer::permissive());

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    tracing::info!("{} {} listening on {}", profile.nf_type, profile.nf_instance_id, addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(nrf_client) = nrf_client {
        let ctx = RequestContext::background().with_timeout(config.request_timeout());
        if let Err(e) = nrf_client.deregister(&ctx, &profile.nf_instance_id).await {
            tracing::error!("Failed to deregister from NRF: {}", e);
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Signal received, starting graceful shutdown");
}
