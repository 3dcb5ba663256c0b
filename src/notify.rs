use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Error,
    Success,
}

/// A one-shot toast shown to the user until dismissed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub message: String,
}

#[derive(Default)]
struct NoticeBoard {
    next_id: u64,
    pending: Vec<Notice>,
}

/// The user-visible message channel. Clones share the same board.
#[derive(Clone, Default)]
pub struct Notifier {
    board: Arc<Mutex<NoticeBoard>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        let message = message.into();
        debug!("posting error notice: {}", message);
        self.post(NoticeKind::Error, message)
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.post(NoticeKind::Success, message.into())
    }

    fn post(&self, kind: NoticeKind, message: String) -> u64 {
        let mut board = self.board.lock();
        // a repeat of the newest unread error stays one notice
        if kind == NoticeKind::Error {
            if let Some(last) = board.pending.last() {
                if last.kind == kind && last.message == message {
                    return last.id;
                }
            }
        }
        board.next_id += 1;
        let id = board.next_id;
        board.pending.push(Notice { id, kind, message });
        id
    }

    pub fn pending(&self) -> Vec<Notice> {
        self.board.lock().pending.clone()
    }

    pub fn errors(&self) -> Vec<Notice> {
        self.board
            .lock()
            .pending
            .iter()
            .filter(|n| n.kind == NoticeKind::Error)
            .cloned()
            .collect()
    }

    /// Removes a notice. `false` if it was already gone.
    pub fn dismiss(&self, id: u64) -> bool {
        let mut board = self.board.lock();
        let before = board.pending.len();
        board.pending.retain(|n| n.id != id);
        let removed = before != board.pending.len();
        if removed {
            debug!("notice {} dismissed", id);
        }
        removed
    }
}
