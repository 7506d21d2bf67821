use scrawl_backend::{AppState, config::Config, registry::ConnectionRegistry, relay::EventRelay};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scrawl_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    let registry = Arc::new(ConnectionRegistry::new());
    let relay = Arc::new(EventRelay::new(registry));
    let state = AppState {
        relay,
        mode: config.sync_mode,
    };

    if let Some(ref dir) = config.static_dir {
        info!("Serving static assets from {}", dir.display());
    }
    let app = scrawl_backend::router(state, config.static_dir.as_deref());

    // Bind to 0.0.0.0 so the hub is reachable from other hosts/containers.
    let listener = TcpListener::bind(("0.0.0.0", config.port)).await.unwrap();
    info!(
        "🚀 Hub listening on {} in {} mode",
        listener.local_addr().unwrap(),
        config.sync_mode
    );
    axum::serve(listener, app).await.unwrap();
}
