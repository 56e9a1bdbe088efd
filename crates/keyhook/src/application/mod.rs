//! Application layer use cases for keyhook.
//!
//! # Sub-modules
//!
//! - **`capture`**  – The capture lifecycle: create the hook thread, pause and
//!   resume delivery, shut down.  This is the API an embedding program uses.
//!
//! - **`consumer`** – The trait through which captured events, and the end of
//!   capture, are reported to that program.

pub mod capture;
pub mod consumer;
