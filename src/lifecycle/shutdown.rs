//! Shutdown coordination for the local server.
//!
//! `main` subscribes the [`HttpServer`](crate::http::HttpServer) and hands the
//! sender to the signal task; integration tests trigger it directly to stop
//! the ephemeral servers they spawn. In-flight GraphQL requests finish before
//! `HttpServer::run` returns.

use tokio::sync::broadcast;

/// One-shot broadcast that stops every subscribed server.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal. A send with no subscribers is not an error.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
