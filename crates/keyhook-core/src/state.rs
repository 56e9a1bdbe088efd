//! Capture state shared between the hook thread and controlling threads.
//!
//! # Flag plus wake (for beginners)
//!
//! A controller never tells the hook thread *what* to do.  It writes the
//! desired state into `enabled` and then sends a payload-free wake message.
//! When the hook thread processes a wake, it re-reads `enabled` and installs or
//! removes the hook to match.
//!
//! This keeps toggles from being lost: the flag is durable, only the wake is
//! best-effort.  If several toggles happen before the hook thread wakes, it
//! acts on the final value only, which is the value the caller wanted anyway.
//!
//! The hook handle itself is *not* here.  It is owned by the hook thread's
//! backend and never crosses threads.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Posts the wake message to a hook thread.
pub trait ThreadWaker: Send + Sync {
    /// Returns `true` if the wake message was accepted by the thread's queue.
    fn wake(&self, thread_id: u32) -> bool;
}

#[derive(Debug)]
pub struct CaptureState {
    enabled: AtomicBool,
    /// Zero until the hook thread has created its message queue.
    thread_id: AtomicU32,
}

impl CaptureState {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            thread_id: AtomicU32::new(0),
        }
    }

    /// `true` means the hook should be installed.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// The hook thread's id, once it is ready to receive wake messages.
    pub fn thread_id(&self) -> Option<u32> {
        match self.thread_id.load(Ordering::SeqCst) {
            0 => None,
            id => Some(id),
        }
    }

    /// Called by the hook thread after its message queue exists.
    pub fn publish_thread_id(&self, thread_id: u32) {
        self.thread_id.store(thread_id, Ordering::SeqCst);
    }

    /// Called by the hook thread on its way out.
    pub fn clear_thread_id(&self) {
        self.thread_id.store(0, Ordering::SeqCst);
    }

    /// Sets the desired hook state and wakes the hook thread.
    ///
    /// Returns whether the wake was posted.  When no hook thread is running the
    /// call is a no-op and returns `false`; the flag is left untouched.
    pub fn request<W>(&self, enabled: bool, waker: &W) -> bool
    where
        W: ThreadWaker + ?Sized,
    {
        let Some(thread_id) = self.thread_id() else {
            return false;
        };
        self.enabled.store(enabled, Ordering::SeqCst);
        waker.wake(thread_id)
    }
}

impl Default for CaptureState {
    fn default() -> Self {
        Self::new(false)
    }
}
