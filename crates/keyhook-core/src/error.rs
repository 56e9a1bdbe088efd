//! Errors raised by hook backends.

use thiserror::Error;

/// A hook install or uninstall call failed.  Fatal to the hook thread.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
    #[error("failed to install keyboard hook: {0}")]
    Install(String),
    #[error("failed to uninstall keyboard hook: {0}")]
    Uninstall(String),
}
