//! HTTP surface
//!
//! Thin axum layer over the query engine. Engine calls run on the blocking
//! pool because a cold dataset key reads its source file.

mod handlers;
mod router;
mod state;

pub use router::create_router;
pub use state::AppState;

use crate::config::Config;
use crate::store::DatasetKey;
use anyhow::{Context, Result};
use tracing::info;

/// Run the HTTP server until Ctrl-C
pub async fn run(config: Config) -> Result<()> {
    let state = AppState::new(config)?;

    if state.config().data.preload {
        let keys: Vec<DatasetKey> = std::iter::once(DatasetKey::Default)
            .chain(
                state
                    .config()
                    .data
                    .academic_years
                    .iter()
                    .map(|y| DatasetKey::Year(y.clone())),
            )
            .collect();
        let loaded = state
            .with_engine(move |engine| Ok(engine.registry().preload(keys.iter())))
            .await?;
        info!("Preloaded {} datasets", loaded);
    }

    let addr = state.config().server_addr();
    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Seniors API listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Seniors API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until the process is killed
        std::future::pending::<()>().await;
    }
}
