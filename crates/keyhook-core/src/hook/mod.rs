//! The low-level keyboard hook, minus the OS calls.
//!
//! - [`raw`]: hook parameters as plain data
//! - [`pipeline`]: the callback's decision logic
//! - [`sink`]: pipeline plus channel, owned by the hook thread
//! - [`control`]: the message-loop state machine that installs and removes the hook
//!
//! A platform binding supplies the three seams: [`control::HookBackend`],
//! [`control::SignalSource`], and the [`crate::state::ThreadWaker`] used by
//! controllers.

pub mod control;
pub mod pipeline;
pub mod raw;
pub mod sink;

pub use control::{ControlLoop, ControlSignal, HookBackend, HookPhase, LoopExit, SignalSource};
pub use pipeline::{HookPipeline, PipelineOptions};
pub use raw::RawKeyInput;
pub use sink::KeyEventSink;
