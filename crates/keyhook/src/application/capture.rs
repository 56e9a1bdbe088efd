//! KeyboardCapture: the capture lifecycle.
//!
//! [`KeyboardCapture::create`] starts a dedicated hook thread and a dispatcher
//! task on the current tokio runtime:
//!
//! ```text
//!   hook thread ("keyhook-loop")                 dispatcher task
//!   ────────────────────────────                 ───────────────
//!   attach (message queue + sink)
//!   publish thread id, signal ready ──▶ create returns
//!   ControlLoop::run ... hook callback ──events──▶ consumer.on_key_event
//!   detach (channel closes)
//!   send LoopExit ─────────────────────────────▶ consumer.on_capture_stopped
//! ```
//!
//! `create` only returns once the thread's message queue exists and its id is
//! published, so a `pause`/`resume` issued after `create` is never lost.
//! Toggles are asynchronous: they set the shared flag, post a wake, and return
//! whether the wake was accepted.

use std::sync::mpsc::{self as std_mpsc, RecvTimeoutError, SyncSender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use keyhook_core::channel::{self, DEFAULT_CAPACITY};
use keyhook_core::{
    CaptureState, ChannelStats, ControlLoop, EventReceiver, HookPipeline, KeyEventSink, LoopExit,
    PipelineOptions,
};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::application::consumer::{KeyEventConsumer, StopReason};
use crate::infrastructure::hook_thread::{CaptureError, HookAttachment, HookThreadPlatform};

/// How long `create` waits for the hook thread by default.
pub const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(2);

const HOOK_THREAD_NAME: &str = "keyhook-loop";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureOptions {
    /// Install the hook as soon as the thread starts.
    pub start_enabled: bool,
    /// Undelivered events held before new ones are dropped.
    pub channel_capacity: usize,
    pub startup_timeout: Duration,
    pub pipeline: PipelineOptions,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            start_enabled: false,
            channel_capacity: DEFAULT_CAPACITY,
            startup_timeout: DEFAULT_STARTUP_TIMEOUT,
            pipeline: PipelineOptions::default(),
        }
    }
}

/// A running keyboard capture.
///
/// Dropping it posts quit to the hook thread without waiting; use
/// [`shutdown`](Self::shutdown) to wait for the thread and the dispatcher.
pub struct KeyboardCapture<P: HookThreadPlatform> {
    platform: Arc<P>,
    state: Arc<CaptureState>,
    stats: Arc<ChannelStats>,
    hook_thread: Option<thread::JoinHandle<()>>,
    dispatcher: Option<JoinHandle<()>>,
}

impl<P: HookThreadPlatform> KeyboardCapture<P> {
    /// Starts the hook thread and the dispatcher.
    ///
    /// Must be called from within a tokio runtime.  This is a blocking call: the
    /// calling worker thread waits until the hook thread is ready, for at most
    /// `options.startup_timeout`.  Attaching only creates a message queue, so
    /// the wait is normally well under a millisecond.
    pub fn create<C>(platform: P, consumer: C, options: CaptureOptions) -> Result<Self, CaptureError>
    where
        C: KeyEventConsumer,
    {
        let runtime = Handle::try_current().map_err(|_| CaptureError::NoRuntime)?;

        let platform = Arc::new(platform);
        let state = Arc::new(CaptureState::new(options.start_enabled));
        let (sender, receiver) = channel::bounded(options.channel_capacity);
        let stats = sender.stats();
        let sink = KeyEventSink::new(HookPipeline::new(options.pipeline), sender);

        let (ready_tx, ready_rx) = std_mpsc::sync_channel(0);
        let (exit_tx, exit_rx) = oneshot::channel();

        let hook_thread = thread::Builder::new()
            .name(HOOK_THREAD_NAME.to_string())
            .spawn({
                let platform = Arc::clone(&platform);
                let state = Arc::clone(&state);
                move || run_hook_thread(&*platform, state, sink, ready_tx, exit_tx)
            })
            .map_err(CaptureError::ThreadSpawn)?;

        match ready_rx.recv_timeout(options.startup_timeout) {
            Ok(Ok(thread_id)) => {
                info!(thread_id, enabled = options.start_enabled, "keyboard capture started");
            }
            Ok(Err(e)) => {
                let _ = hook_thread.join();
                return Err(e);
            }
            Err(RecvTimeoutError::Timeout) => {
                // The thread sees the closed handshake and exits on its own.
                warn!(timeout = ?options.startup_timeout, "hook thread did not become ready");
                return Err(CaptureError::StartupTimeout(options.startup_timeout));
            }
            Err(RecvTimeoutError::Disconnected) => {
                let _ = hook_thread.join();
                return Err(CaptureError::ThreadPanicked);
            }
        }

        let dispatcher = runtime.spawn(dispatch(receiver, exit_rx, consumer));

        Ok(Self {
            platform,
            state,
            stats,
            hook_thread: Some(hook_thread),
            dispatcher: Some(dispatcher),
        })
    }

    /// Stops delivering new events.  Returns `true` if the hook thread accepted
    /// the request; the hook is removed shortly after.
    pub fn pause(&self) -> bool {
        self.request(false)
    }

    /// Resumes delivery.  A no-op on the hook itself if it is already installed.
    pub fn resume(&self) -> bool {
        self.request(true)
    }

    /// The most recently requested state, not necessarily applied yet.
    pub fn is_enabled(&self) -> bool {
        self.state.is_enabled()
    }

    /// The hook thread's OS id, or `None` once it has exited.
    pub fn thread_id(&self) -> Option<u32> {
        self.state.thread_id()
    }

    /// Events dropped because the consumer fell behind.
    pub fn dropped_events(&self) -> u64 {
        self.stats.dropped()
    }

    /// Events accepted for delivery so far.
    pub fn queued_events(&self) -> u64 {
        self.stats.queued()
    }

    /// Stops the hook thread and waits until the consumer has received every
    /// queued event and the stop notification.
    pub async fn shutdown(mut self) {
        self.post_quit();

        if let Some(hook_thread) = self.hook_thread.take() {
            match tokio::task::spawn_blocking(move || hook_thread.join()).await {
                Ok(Ok(())) => {}
                _ => error!("hook thread panicked"),
            }
        }
        if let Some(dispatcher) = self.dispatcher.take() {
            if let Err(e) = dispatcher.await {
                error!("event dispatcher failed: {e}");
            }
        }
        info!("keyboard capture shut down");
    }

    fn request(&self, enabled: bool) -> bool {
        let posted = self.state.request(enabled, &*self.platform);
        if posted {
            debug!(enabled, "capture toggle posted");
        } else {
            warn!(enabled, "capture toggle not posted: hook thread not running");
        }
        posted
    }

    fn post_quit(&self) {
        if let Some(thread_id) = self.state.thread_id() {
            if !self.platform.quit(thread_id) {
                warn!(thread_id, "failed to post quit to hook thread");
            }
        }
    }
}

impl<P: HookThreadPlatform> Drop for KeyboardCapture<P> {
    fn drop(&mut self) {
        if self.hook_thread.is_some() {
            self.post_quit();
        }
    }
}

/// Entry point of the hook thread.
fn run_hook_thread<P>(
    platform: &P,
    state: Arc<CaptureState>,
    sink: KeyEventSink,
    ready: SyncSender<Result<u32, CaptureError>>,
    exit: oneshot::Sender<LoopExit>,
) where
    P: HookThreadPlatform + ?Sized,
{
    let HookAttachment {
        backend,
        mut signals,
        thread_id,
    } = match platform.attach(sink) {
        Ok(attachment) => attachment,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };
    let attached = Attached {
        platform,
        state: &state,
    };

    state.publish_thread_id(thread_id);
    if ready.send(Ok(thread_id)).is_err() {
        debug!(thread_id, "creator gave up waiting, hook thread exiting");
        return;
    }
    drop(ready);

    let reason = ControlLoop::new(backend, Arc::clone(&state)).run(&mut signals);

    drop(attached);
    match &reason {
        LoopExit::Quit => debug!(thread_id, "hook thread stopped"),
        LoopExit::HookFailed(e) => error!(thread_id, "hook thread terminated: {e}"),
    }
    let _ = exit.send(reason);
}

/// Undoes `attach` when the hook thread leaves, including by panic.  Detaching
/// drops the sink, which closes the event channel for the dispatcher.
struct Attached<'a, P: HookThreadPlatform + ?Sized> {
    platform: &'a P,
    state: &'a CaptureState,
}

impl<P: HookThreadPlatform + ?Sized> Drop for Attached<'_, P> {
    fn drop(&mut self) {
        self.state.clear_thread_id();
        self.platform.detach();
    }
}

/// Forwards events to the consumer until the channel closes, then reports
/// why capture ended.
async fn dispatch<C>(mut events: EventReceiver, exit: oneshot::Receiver<LoopExit>, mut consumer: C)
where
    C: KeyEventConsumer,
{
    while let Some(event) = events.recv().await {
        consumer.on_key_event(event);
    }

    let reason = match exit.await {
        Ok(LoopExit::Quit) => StopReason::Stopped,
        Ok(LoopExit::HookFailed(e)) => StopReason::HookFailed(e),
        Err(_) => StopReason::ThreadLost,
    };
    debug!(?reason, "event dispatcher finished");
    consumer.on_capture_stopped(&reason);
}

// ── Tests ─────────────────────────────────────────────────────────────────────
