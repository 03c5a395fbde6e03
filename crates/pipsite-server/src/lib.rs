//! HTTP presentation layer and command line for pipsite.

mod cli;
mod error;
mod extract;
mod middleware;
mod routes;
pub mod telemetry;
mod views;

use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use anyhow::{Context, Result};
use pipsite_core::PipSite;
use tokio::net::TcpListener;
use tracing::{info, warn};

pub use cli::run;
pub use routes::build_router;

/// Shared handler state.
#[derive(Clone, Debug)]
pub struct AppState {
    site: PipSite,
    pub(crate) request_id_seed: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(site: PipSite) -> Self {
        Self {
            site,
            request_id_seed: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn site(&self) -> &PipSite {
        &self.site
    }

    pub(crate) fn site_name(&self) -> &str {
        &self.site.config().server.site_name
    }
}

/// Serve the site on `listener` until SIGINT or SIGTERM.
pub async fn serve(listener: TcpListener, site: PipSite) -> Result<()> {
    let addr = listener.local_addr().context("listener has no local address")?;
    info!(%addr, "pipsite listening");
    axum::serve(listener, build_router(AppState::new(site)))
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .context("http server failed")?;
    info!("pipsite stopped");
    Ok(())
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
                return;
            }
            (Err(err), _) | (_, Err(err)) => {
                warn!(error = %err, "signal handlers unavailable, falling back to ctrl-c");
            }
        }
    }
    let _ = tokio::signal::ctrl_c().await;
}
