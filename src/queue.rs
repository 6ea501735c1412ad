//! Click queue: the handoff between the input hook and the capture worker.
//!
//! Unbounded and FIFO: enqueueing never blocks the hook callback and never
//! drops a click, so the backlog grows without limit under sustained rapid
//! clicking. Captures may lag; input never does.

use crate::capture::ClickEvent;
use tokio::sync::mpsc::{self, error::TryRecvError};

/// Creates a connected sender/receiver pair.
pub fn channel() -> (ClickSender, ClickReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ClickSender { tx }, ClickReceiver { rx })
}

/// Producer side. Cheap to clone; safe to use from any thread.
#[derive(Debug, Clone)]
pub struct ClickSender {
    tx: mpsc::UnboundedSender<ClickEvent>,
}

impl ClickSender {
    /// Queues a click without blocking.
    ///
    /// Once the receiver is gone (worker stopped) the click is discarded.
    pub fn enqueue(&self, click: ClickEvent) {
        if self.tx.send(click).is_err() {
            log::debug!("[QUEUE] Worker gone, dropping click at {}", click);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer side, owned by the single capture worker.
#[derive(Debug)]
pub struct ClickReceiver {
    rx: mpsc::UnboundedReceiver<ClickEvent>,
}

impl ClickReceiver {
    /// Next queued click, or `None` right away when the queue is empty.
    pub fn try_dequeue(&mut self) -> Option<ClickEvent> {
        match self.rx.try_recv() {
            Ok(click) => Some(click),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}
