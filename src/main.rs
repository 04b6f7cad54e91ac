use mileage_tracker::{
    AppState, Config, Ledger, UserStore,
    clock::{Clock, SystemClock},
    open_store, router,
};
use std::{net::SocketAddr, sync::Arc};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let config = Config::from_env(clock.now().date())?;
    info!(
        goal = config.progress.goal_miles,
        start = %config.progress.window.start,
        end = %config.progress.window.end,
        "loaded configuration"
    );

    let store = open_store(&config).await?;
    let users = store.list().await?;
    info!(count = users.len(), names = ?users.keys().collect::<Vec<_>>(), "ledger ready");

    let ledger = Ledger::new(store, config.progress);
    let app = router(AppState::new(ledger, clock, config.static_dir.clone()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
