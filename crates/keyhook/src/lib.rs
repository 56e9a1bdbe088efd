//! keyhook library entry point.
//!
//! System-wide keyboard capture for Windows: a dedicated thread owns a
//! low-level keyboard hook, and captured events are delivered to a consumer on
//! the tokio runtime.  Capture can be paused and resumed from any thread.
//!
//! ```no_run
//! # #[cfg(target_os = "windows")]
//! # async fn demo() -> Result<(), keyhook::CaptureError> {
//! use keyhook::infrastructure::hook_thread::windows::WindowsHookPlatform;
//! use keyhook::{CaptureOptions, KeyboardCapture};
//!
//! let capture = KeyboardCapture::create(
//!     WindowsHookPlatform::new(),
//!     |event: keyhook::KeyEvent| println!("{event}"),
//!     CaptureOptions::default(),
//! )?;
//! capture.resume();
//! // ...
//! capture.pause();
//! capture.shutdown().await;
//! # Ok(())
//! # }
//! ```
//!
//! Re-exports all public modules so that integration tests in `tests/` and the
//! binary entry point in `main.rs` share the same module tree.

pub mod application;
pub mod infrastructure;

pub use application::capture::{CaptureOptions, KeyboardCapture};
pub use application::consumer::{KeyEventConsumer, StopReason};
pub use infrastructure::hook_thread::{CaptureError, HookThreadPlatform};
pub use keyhook_core::{KeyEvent, KeyEventKind, Modifiers};
