use tokio::sync::watch;
use tracing::info;

/// Builds a shutdown channel consisting of a ([`ShutdownNotifier`], [`ShutdownListener`])
/// combination.
///
/// The [`MarketDataManager`](crate::manager::MarketDataManager) holds the notifier; its
/// reconciliation task (and any helper task wanting to observe shutdown) holds a listener clone.
pub fn shutdown_channel() -> (ShutdownNotifier, ShutdownListener) {
    let (tx, rx) = watch::channel(false);
    (ShutdownNotifier { tx }, ShutdownListener { rx })
}

/// Sends the one-shot shutdown signal. Repeated sends are no-ops.
#[derive(Debug)]
pub struct ShutdownNotifier {
    tx: watch::Sender<bool>,
}

impl ShutdownNotifier {
    pub fn send(&self) {
        if *self.tx.borrow() {
            return;
        }
        info!("sending shutdown signal");
        let _ = self.tx.send(true);
    }
}

/// Listens for the shutdown signal.
#[derive(Debug, Clone)]
pub struct ShutdownListener {
    rx: watch::Receiver<bool>,
}

impl ShutdownListener {
    /// Completes once the shutdown signal has been sent, immediately if it already was.
    pub async fn recv(&mut self) {
        // wait_for also covers a signal sent before this call
        let _ = self.rx.wait_for(|shutdown| *shutdown).await;
    }

    /// Non-blocking check used for cooperative cancellation between polled fetches.
    pub fn is_shutdown(&self) -> bool {
        *self.rx.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shutdown_signal_is_observed_by_all_listeners() {
        let (notifier, mut listener) = shutdown_channel();
        let mut clone = listener.clone();

        assert!(!listener.is_shutdown());

        notifier.send();
        notifier.send();

        listener.recv().await;
        clone.recv().await;
        assert!(listener.is_shutdown());
        assert!(clone.is_shutdown());
    }
}
