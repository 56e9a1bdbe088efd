//! Infrastructure layer for keyhook.
//!
//! Contains OS-facing adapters: the hook thread platforms, file-system
//! configuration storage, and event output for the binary.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `keyhook_core`, but the core crate never depends on it.

pub mod hook_thread;
pub mod output;
pub mod storage;
