//! Library catalog server.
//!
//! Run from repo root: `cargo run -p catalog-server`
//! `CATALOG_BACKEND=memory` serves without a database.

use library_catalog::{
    app, init_tracing, AppConfig, AppState, Backend, CatalogStore, MemoryCatalogStore,
    PgCatalogStore,
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing();

    let store: Arc<dyn CatalogStore> = match config.backend {
        Backend::Postgres => Arc::new(PgCatalogStore::connect(&config).await?),
        Backend::Memory => {
            tracing::warn!("using in-memory store; data is lost on exit");
            Arc::new(MemoryCatalogStore::new())
        }
    };
    let state = AppState::new(store.clone(), !config.production);
    let router = app(state, &config);

    let listener = TcpListener::bind(config.bind).await?;
    tracing::info!(
        "Library catalog listening on http://{}",
        listener.local_addr()?
    );
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    shutdown_on(tokio::signal::ctrl_c()).await
}

/// Resolves when `signal` fires. A signal that cannot be installed never resolves.
async fn shutdown_on(signal: impl Future<Output = std::io::Result<()>>) {
    if let Err(err) = signal.await {
        tracing::error!(error = %err, "failed to listen for ctrl-c; serving until killed");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn shutdown_follows_the_signal() {
        let fired = tokio::time::timeout(Duration::from_millis(50), shutdown_on(async { Ok(()) }));
        assert!(fired.await.is_ok());
    }

    #[tokio::test]
    async fn failed_signal_keeps_serving() {
        let failed = shutdown_on(async { Err(std::io::Error::other("no signal handler")) });
        let waited = tokio::time::timeout(Duration::from_millis(50), failed).await;
        assert!(waited.is_err());
    }
}
