//! HTTP server lifecycle and the background lifecycle sweep.

mod sweeper;

pub use sweeper::spawn_sweeper;

use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;

// =============================================================================
// Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,

    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    #[must_use]
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

// =============================================================================
// Server
// =============================================================================

/// The HTTP server plus the shutdown broadcast shared with background tasks.
///
/// Tasks started with a receiver from [`Server::shutdown_receiver`] see
/// `true` as soon as a stop signal arrives, while in-flight requests are
/// still draining. The channel closes when [`Server::run`] returns.
pub struct Server {
    config: ServerConfig,

    shutdown: watch::Sender<bool>,
}

impl Server {
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self { config, shutdown }
    }

    #[must_use]
    pub fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    /// Serves `router` until Ctrl+C or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound or serving fails.
    pub async fn run(self, router: Router) -> anyhow::Result<()> {
        let Self { config, shutdown } = self;
        let address = config.socket_addr();

        let listener = TcpListener::bind(&address).await?;

        tracing::info!("Server listening on {}", address);

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown_signal().await;
                let listeners = shutdown.receiver_count();
                shutdown.send_replace(true);
                tracing::info!(background_tasks = listeners, "Draining in-flight requests");
            })
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }

    #[must_use]
    pub const fn config(&self) -> &ServerConfig {
        &self.config
    }
}

// =============================================================================
// Shutdown Signal
// =============================================================================

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", error);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!("Failed to listen for SIGTERM: {}", error);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
