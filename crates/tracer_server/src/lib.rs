//! HTTP serving layer for the curation tracer.
//!
//! Wires a [`tracer_core::AppContext`] into an axum router and owns the
//! refresh schedule for the lifetime of the server.

pub mod error;
pub mod refresh;
pub mod routes;

pub use error::ServerError;
pub use refresh::{spawn_refresh, RefreshTask};
pub use routes::build_router;

use log::info;
use std::net::SocketAddr;
use std::sync::Arc;
use tracer_core::{AppContext, TracerConfig};

/// Runs the server until ctrl-c.
pub async fn serve(config: TracerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let context = Arc::new(AppContext::new(&config));
    context.bootstrap_store()?;
    let refresh = context
        .refresh_job()
        .map(|job| spawn_refresh(context.crawl_interval(), job));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        "event=server_start module=server status=ok addr={} db_path={} refresh={}",
        addr,
        context.db_path().display(),
        refresh.is_some()
    );

    axum::serve(listener, build_router(context))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    if let Some(task) = refresh {
        task.stop().await;
    }
    info!("event=server_stop module=server status=ok");
    Ok(())
}
