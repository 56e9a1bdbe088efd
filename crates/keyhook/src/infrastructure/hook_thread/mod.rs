//! The hook thread's platform seam.
//!
//! A low-level keyboard hook belongs to the thread that installed it, and its
//! callback only runs while that thread pumps messages.  Everything that has to
//! happen *on* that thread is behind [`HookThreadPlatform`]:
//!
//! - creating the thread's message queue and making the [`KeyEventSink`]
//!   reachable from the OS callback ([`attach`](HookThreadPlatform::attach)),
//! - installing/removing the hook ([`HookBackend`]),
//! - blocking for the next message ([`SignalSource`]),
//! - releasing the sink when the loop is over ([`detach`](HookThreadPlatform::detach)).
//!
//! Controllers on other threads only ever post to the hook thread, through
//! [`ThreadWaker::wake`] and [`HookThreadPlatform::quit`].
//!
//! # Windows-Specific Implementation
//!
//! [`windows::WindowsHookPlatform`] uses `WH_KEYBOARD_LL`, `GetMessageW` and
//! `PostThreadMessageW`.  The hook callback must return within the OS timeout
//! or Windows silently removes the hook, so it only runs the pipeline and a
//! non-blocking channel send.
//!
//! # Testability
//!
//! [`mock::MockHookPlatform`] drives the same hook thread with an in-process
//! message queue and lets tests inject key presses as if the OS delivered them.

use std::time::Duration;

use keyhook_core::{HookBackend, KeyEventSink, SignalSource, ThreadWaker};

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

/// Error type for capture lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("no tokio runtime is available to run the event dispatcher")]
    NoRuntime,
    #[error("failed to spawn hook thread: {0}")]
    ThreadSpawn(#[source] std::io::Error),
    #[error("hook thread could not set up its message queue: {0}")]
    Attach(String),
    #[error("hook thread did not become ready within {0:?}")]
    StartupTimeout(Duration),
    #[error("hook thread terminated before becoming ready")]
    ThreadPanicked,
}

/// What [`HookThreadPlatform::attach`] hands back to the hook thread.
pub struct HookAttachment<B, S> {
    pub backend: B,
    pub signals: S,
    /// The OS identifier controllers post to.
    pub thread_id: u32,
}

/// Platform operations for the dedicated hook thread.
///
/// `attach`, the backend, the signal source and `detach` are only used from
/// the hook thread.  `wake` and `quit` may be called from any thread.
pub trait HookThreadPlatform: ThreadWaker + Send + Sync + 'static {
    type Backend: HookBackend;
    type Signals: SignalSource;

    /// Prepares the calling thread to receive posted messages and installs
    /// `sink` where the hook callback can reach it.
    fn attach(
        &self,
        sink: KeyEventSink,
    ) -> Result<HookAttachment<Self::Backend, Self::Signals>, CaptureError>;

    /// Asks the hook thread's loop to end.  Returns `true` if the message was
    /// accepted by the thread's queue.
    fn quit(&self, thread_id: u32) -> bool;

    /// Drops the sink installed by `attach`, closing the event channel.
    fn detach(&self);
}
