use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::debug;

use super::{ChangeFeed, Invalidate, Subscription};
use crate::models::Session;

type Subscribers = HashMap<String, Vec<(u64, mpsc::UnboundedSender<Invalidate>)>>;

#[derive(Default)]
struct HubInner {
    next_id: AtomicU64,
    subscribers: Mutex<Subscribers>,
}

/// In-process fan-out of invalidate signals, keyed by user id.
#[derive(Clone, Default)]
pub struct ChangeHub {
    inner: Arc<HubInner>,
}

impl ChangeHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals every subscriber of `user_id`. Returns how many were reached.
    pub fn notify(&self, user_id: &str) -> usize {
        let mut subscribers = self.inner.subscribers.lock();
        let Some(entries) = subscribers.get_mut(user_id) else {
            return 0;
        };
        entries.retain(|(_, tx)| tx.send(Invalidate).is_ok());
        let reached = entries.len();
        if entries.is_empty() {
            subscribers.remove(user_id);
        }
        debug!("change signal for {} reached {} subscriber(s)", user_id, reached);
        reached
    }

    pub fn subscriber_count(&self, user_id: &str) -> usize {
        self.inner
            .subscribers
            .lock()
            .get(user_id)
            .map_or(0, Vec::len)
    }
}

fn release(inner: Weak<HubInner>, user_id: String, id: u64) {
    let Some(inner) = inner.upgrade() else {
        return;
    };
    let mut subscribers = inner.subscribers.lock();
    if let Some(entries) = subscribers.get_mut(&user_id) {
        entries.retain(|(entry_id, _)| *entry_id != id);
        if entries.is_empty() {
            subscribers.remove(&user_id);
        }
    }
}

impl ChangeFeed for ChangeHub {
    fn subscribe(&self, session: &Session) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner
            .subscribers
            .lock()
            .entry(session.user_id.clone())
            .or_default()
            .push((id, tx));

        let weak = Arc::downgrade(&self.inner);
        let user_id = session.user_id.clone();
        Subscription::new(rx, move || release(weak, user_id, id))
    }
}
