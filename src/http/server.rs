//! HTTP server startup logic.
//!
//! Binding happens before serving so that a bind failure surfaces as a typed
//! error and the announced port is the one the socket actually holds.

use std::future::Future;
use std::net::{AddrParseError, SocketAddr};
use std::time::Duration;

use axum::Router;
use axum_server::Handle;
use tokio::net::TcpListener;

use crate::config::{HttpServerConfig, LISTENER_LOG_TARGET};

use super::shutdown;

/// Server startup error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid listen address '{host}': {source}")]
    Address {
        host: String,
        #[source]
        source: AddrParseError,
    },

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Bind, serve and block until a shutdown signal has drained the server.
pub async fn start_server(app: Router, config: &HttpServerConfig) -> Result<(), ServerError> {
    let listener = bind(config).await?;
    serve(
        listener,
        app,
        config.shutdown_timeout(),
        shutdown::shutdown_signal(),
    )
    .await
}

/// Bind the listening socket described by `config`.
pub async fn bind(config: &HttpServerConfig) -> Result<TcpListener, ServerError> {
    let addr = config
        .socket_addr()
        .map_err(|source| ServerError::Address {
            host: config.host.clone(),
            source,
        })?;

    TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })
}

/// Serve `app` on an already bound listener until `shutdown` resolves.
///
/// Once `shutdown` completes, new connections are refused and in-flight ones
/// get `grace` to finish before being closed.
pub async fn serve<F>(
    listener: TcpListener,
    app: Router,
    grace: Duration,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr().map_err(ServerError::Serve)?;
    let listener = listener.into_std().map_err(ServerError::Serve)?;

    let handle = Handle::new();
    let shutdown_handle = handle.clone();
    tokio::spawn(async move {
        shutdown.await;
        tracing::info!(
            target: LISTENER_LOG_TARGET,
            grace_secs = grace.as_secs(),
            "Graceful shutdown initiated, draining connections"
        );
        shutdown_handle.graceful_shutdown(Some(grace));
    });

    tracing::info!(target: LISTENER_LOG_TARGET, %addr, "Listening on {}", addr.port());

    axum_server::from_tcp(listener)
        .handle(handle)
        .serve(app.into_make_service())
        .await
        .map_err(ServerError::Serve)?;

    tracing::info!(target: LISTENER_LOG_TARGET, "Server stopped");
    Ok(())
}
