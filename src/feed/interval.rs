use std::time::Duration;

use tokio::sync::mpsc;
use tracing::info;

use super::{ChangeFeed, Invalidate, Subscription};
use crate::models::Session;

/// Feed for backends without push delivery: signals on a fixed period so
/// the dashboard re-fetches.
pub struct IntervalFeed {
    interval: Duration,
}

impl IntervalFeed {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl ChangeFeed for IntervalFeed {
    /// Must be called from within a Tokio runtime.
    fn subscribe(&self, session: &Session) -> Subscription {
        info!(
            "starting interval change feed for {} (interval: {:?})",
            session.user_id, self.interval
        );
        let (tx, rx) = mpsc::unbounded_channel();
        let interval = self.interval;

        let ticker = tokio::spawn(async move {
            loop {
                // first signal only after a full period
                tokio::time::sleep(interval).await;

                if tx.send(Invalidate).is_err() {
                    break;
                }
            }
        });

        Subscription::new(rx, move || ticker.abort())
    }
}
