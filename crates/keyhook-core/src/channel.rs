//! Bounded, non-blocking hand-off from the hook callback to the consumer.
//!
//! # Why not block when full? (for beginners)
//!
//! The producer side runs inside a system-wide low-level keyboard hook.  While
//! the callback runs, keyboard input for the *whole desktop* waits.  Windows
//! also silently removes hooks that take too long.  Waiting for the consumer
//! to catch up is therefore never acceptable: when the queue is full, the
//! event is dropped and counted instead.
//!
//! # Ordering
//!
//! The channel is a FIFO (`tokio::sync::mpsc`).  Events that are not dropped
//! reach the consumer in submission order, each exactly once.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::trace;

use crate::event::KeyEvent;

/// Default queue bound between the hook callback and the consumer.
pub const DEFAULT_CAPACITY: usize = 512;

/// What happened to a submitted event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The event is queued for the consumer.
    Queued,
    /// The queue was full; the event was discarded.
    Dropped,
    /// The consumer side is gone; the event was discarded.
    Closed,
}

/// Counters shared by both ends of a channel.
#[derive(Debug, Default)]
pub struct ChannelStats {
    queued: AtomicU64,
    dropped: AtomicU64,
}

impl ChannelStats {
    /// Number of events accepted into the queue.
    pub fn queued(&self) -> u64 {
        self.queued.load(Ordering::Relaxed)
    }

    /// Number of events discarded because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Producer half.  Owned by the hook callback context.
#[derive(Debug, Clone)]
pub struct EventSender {
    inner: mpsc::Sender<KeyEvent>,
    stats: Arc<ChannelStats>,
}

/// Consumer half.
#[derive(Debug)]
pub struct EventReceiver {
    inner: mpsc::Receiver<KeyEvent>,
    stats: Arc<ChannelStats>,
}

/// Creates a channel holding at most `capacity` undelivered events.
///
/// A `capacity` of zero is raised to one.
pub fn bounded(capacity: usize) -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let stats = Arc::new(ChannelStats::default());
    (
        EventSender {
            inner: tx,
            stats: Arc::clone(&stats),
        },
        EventReceiver { inner: rx, stats },
    )
}

impl EventSender {
    /// Enqueues `event` without ever waiting.
    pub fn submit(&self, event: KeyEvent) -> SubmitOutcome {
        match self.inner.try_send(event) {
            Ok(()) => {
                self.stats.queued.fetch_add(1, Ordering::Relaxed);
                SubmitOutcome::Queued
            }
            Err(TrySendError::Full(event)) => {
                let dropped = self.stats.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                trace!(key = event.key_name(), dropped, "event channel full, dropping");
                SubmitOutcome::Dropped
            }
            Err(TrySendError::Closed(_)) => SubmitOutcome::Closed,
        }
    }

    pub fn stats(&self) -> Arc<ChannelStats> {
        Arc::clone(&self.stats)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

impl EventReceiver {
    /// Waits for the next event.  Returns `None` once every sender is gone and
    /// the queue is drained.
    pub async fn recv(&mut self) -> Option<KeyEvent> {
        self.inner.recv().await
    }

    /// Returns the next queued event, if any, without waiting.
    pub fn try_recv(&mut self) -> Option<KeyEvent> {
        self.inner.try_recv().ok()
    }

    /// Removes every queued event in order.
    pub fn drain(&mut self) -> Vec<KeyEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.try_recv() {
            events.push(event);
        }
        events
    }

    pub fn stats(&self) -> Arc<ChannelStats> {
        Arc::clone(&self.stats)
    }
}
