pub mod accounts;
pub mod app;
pub mod bootstrap;
pub mod error;
pub mod health;
pub mod procurement;
pub mod projects;
pub mod reports;

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use sitetrack_core::audit::TracingAuditSink;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

pub use app::{router, AppState};
pub use bootstrap::{bootstrap, bootstrap_with_config, Application, BootstrapError};
pub use error::{ApiError, CorrelationId};

/// Binds the configured address and serves until ctrl-c, then drains
/// in-flight requests for at most `server.graceful_shutdown_secs`.
pub async fn serve(app: Application) -> anyhow::Result<()> {
    let address = app.config.listen_address();
    let drain = Duration::from_secs(app.config.server.graceful_shutdown_secs);
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        listen_address = %address,
        "sitetrack-server listening"
    );

    let (signalled_tx, signalled_rx) = oneshot::channel();
    let server = axum::serve(listener, router(app.db_pool.clone(), Arc::new(TracingAuditSink)))
        .with_graceful_shutdown(async move {
            wait_for_shutdown().await;
            let _ = signalled_tx.send(());
        })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => result?,
        Ok(()) = signalled_rx => {
            info!(
                event_name = "system.server.stopping",
                correlation_id = "shutdown",
                drain_secs = drain.as_secs(),
                "shutdown requested, draining requests"
            );
            match tokio::time::timeout(drain, &mut server).await {
                Ok(result) => result?,
                Err(_) => warn!(
                    event_name = "system.server.drain_timeout",
                    correlation_id = "shutdown",
                    "requests still in flight after drain window"
                ),
            }
        }
    }

    app.db_pool.close().await;
    info!(event_name = "system.server.stopped", correlation_id = "shutdown", "sitetrack-server stopped");
    Ok(())
}

async fn wait_for_shutdown() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        error!(
            event_name = "system.server.signal_error",
            correlation_id = "shutdown",
            error = %error,
            "could not install ctrl-c handler"
        );
        std::future::pending::<()>().await;
    }
}
