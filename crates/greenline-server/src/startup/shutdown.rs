//! Graceful shutdown handling for the GreenLine server

use std::time::Duration;
use tokio::sync::broadcast;
use tracing::info;

/// Shutdown signal sender and receiver
#[derive(Clone)]
pub struct ShutdownSignal {
    sender: broadcast::Sender<()>,
}

impl ShutdownSignal {
    /// Create a new shutdown signal with a broadcast channel
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self { sender }
    }

    /// Get a receiver for shutdown notifications
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }

    /// Trigger shutdown
    pub fn shutdown(&self) {
        let _ = self.sender.send(());
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
///
/// Returns the shutdown signal that can be used to notify other components
pub async fn wait_for_shutdown_signal() -> ShutdownSignal {
    let shutdown = ShutdownSignal::new();
    let shutdown_clone = shutdown.clone();

    tokio::spawn(async move {
        let ctrl_c = async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("Failed to install SIGTERM handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received Ctrl+C, initiating graceful shutdown...");
            }
            _ = terminate => {
                info!("Received SIGTERM, initiating graceful shutdown...");
            }
        }

        shutdown_clone.shutdown();
    });

    shutdown
}

/// Graceful shutdown coordinator
pub struct GracefulShutdown {
    shutdown_signal: ShutdownSignal,
    shutdown_timeout: Duration,
}

impl GracefulShutdown {
    pub fn new(shutdown_signal: ShutdownSignal, shutdown_timeout: Duration) -> Self {
        Self {
            shutdown_signal,
            shutdown_timeout,
        }
    }

    /// Wait for shutdown and give in-flight requests time to complete
    pub async fn wait_for_shutdown(&self) {
        let mut receiver = self.shutdown_signal.subscribe();
        let _ = receiver.recv().await;

        info!(
            "Shutdown initiated, waiting up to {:?} for connections to close...",
            self.shutdown_timeout
        );

        tokio::time::sleep(self.shutdown_timeout).await;

        info!("Shutdown complete");
    }

    pub fn signal(&self) -> ShutdownSignal {
        self.shutdown_signal.clone()
    }
}
