//! Unread-notification poller.
//!
//! [`NotificationPoller`] runs as a background task, fetching the unread
//! count every `interval` and publishing it on a watch channel. Failed
//! fetches keep the last published value.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::ports::NotificationPort;

pub struct NotificationPoller {
    port: Arc<dyn NotificationPort>,
    interval: Duration,
    tx: watch::Sender<Option<u64>>,
}

impl NotificationPoller {
    /// Create a poller and the receiver for its counts. The receiver starts
    /// at `None` until the first successful fetch.
    pub fn new(
        port: Arc<dyn NotificationPort>,
        interval: Duration,
    ) -> (Self, watch::Receiver<Option<u64>>) {
        let (tx, rx) = watch::channel(None);
        (Self { port, interval, tx }, rx)
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<u64>> {
        self.tx.subscribe()
    }

    /// Poll until `cancel` fires. The first tick is immediate.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Notification poller cancelled");
                    break;
                }
                _ = interval.tick() => {
                    self.poll_once().await;
                }
            }
        }
    }

    /// Fetch once and publish if the count changed.
    pub async fn poll_once(&self) {
        let Some(count) = self.port.unread_count().await else {
            tracing::debug!("Unread count unavailable, keeping last value");
            return;
        };
        let changed = self.tx.send_if_modified(|current| {
            if *current == Some(count) {
                false
            } else {
                *current = Some(count);
                true
            }
        });
        if changed {
            tracing::debug!(unread = count, "Unread count changed");
        }
    }
}
