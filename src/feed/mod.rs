//! Change notifications.
//!
//! A feed only ever says "something in this user's scope changed". The
//! signal carries no record, so the only sensible reaction is a re-fetch.

pub mod hub;
pub mod interval;

use tokio::sync::mpsc;

use crate::models::Session;

pub use hub::ChangeHub;
pub use interval::IntervalFeed;

/// Zero-payload "your data changed" signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invalidate;

pub trait ChangeFeed: Send + Sync {
    fn subscribe(&self, session: &Session) -> Subscription;
}

/// A live registration with a feed. Dropping it (or calling
/// [`Subscription::unsubscribe`]) releases the registration.
pub struct Subscription {
    receiver: mpsc::UnboundedReceiver<Invalidate>,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(
        receiver: mpsc::UnboundedReceiver<Invalidate>,
        release: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            receiver,
            release: Some(Box::new(release)),
        }
    }

    /// Waits for the next signal. `None` once the feed has gone away.
    pub async fn next(&mut self) -> Option<Invalidate> {
        self.receiver.recv().await
    }

    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}
