//! # keyhook-core
//!
//! OS-independent core of a global keyboard capture: event types, key naming,
//! chord tracking, the bounded event channel, and the control loop that
//! installs and removes a low-level keyboard hook on request.
//!
//! Nothing in this crate calls an OS API.  Each point where the Windows
//! binding plugs in is a trait, so the whole capture path can be driven from
//! tests.
//!
//! # How a key press travels (for beginners)
//!
//! ```text
//!  OS hook callback          hook thread                  consumer thread
//!  ────────────────          ─────────────────            ───────────────
//!  RawKeyInput ──▶ HookPipeline::process ──▶ EventSender ──▶ EventReceiver
//!                   (name, modifiers,          (bounded,        (async recv)
//!                    chord)                     never blocks)
//! ```
//!
//! The hook callback runs on the thread that installed the hook, inside that
//! thread's message loop.  It must return quickly, so it never waits on the
//! consumer: when the channel is full, the event is dropped and counted.
//!
//! Pausing and resuming work through [`CaptureState`]: controllers set the
//! desired state and wake the hook thread, and the hook thread's
//! [`ControlLoop`] brings the hook in line with it.

pub mod channel;
pub mod chord;
pub mod error;
pub mod event;
pub mod hook;
pub mod keymap;
pub mod modifiers;
pub mod state;

pub use channel::{bounded, ChannelStats, EventReceiver, EventSender, SubmitOutcome};
pub use chord::ChordTracker;
pub use error::HookError;
pub use event::{KeyEvent, KeyEventKind, Modifiers};
pub use hook::{
    ControlLoop, ControlSignal, HookBackend, HookPhase, HookPipeline, KeyEventSink, LoopExit,
    PipelineOptions, RawKeyInput, SignalSource,
};
pub use keymap::{resolve_key_name, KeyNameLookup, NoKeyNames};
pub use modifiers::{sample_modifiers, KeyStateSource};
pub use state::{CaptureState, ThreadWaker};
