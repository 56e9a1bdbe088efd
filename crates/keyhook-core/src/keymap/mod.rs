//! Key identity resolution: raw hook codes to human-readable key names.
//!
//! Resolution is two-staged:
//!
//! 1. a fixed table of well-known non-printable keys ([`named::named_key`]),
//! 2. the OS key-name text for the physical scan code ([`KeyNameLookup`]).
//!
//! If neither produces a name, the key is unresolvable and the caller drops
//! the event.  No error is raised for that case.

pub mod named;
pub mod vk;

/// Source of OS-provided key name text, keyed by physical scan code.
///
/// On Windows this wraps `GetKeyNameTextW`; tests supply a fixed map.
pub trait KeyNameLookup {
    /// Returns the text the OS associates with `scan_code`, or `None`.
    fn key_name_text(&self, scan_code: u32) -> Option<String>;
}

/// A lookup that never finds anything.  Only the fixed table resolves.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoKeyNames;

impl KeyNameLookup for NoKeyNames {
    fn key_name_text(&self, _scan_code: u32) -> Option<String> {
        None
    }
}

/// Resolves the display name for a key.
///
/// Returns `None` when the key is unresolvable.  An empty string from the OS
/// counts as unresolvable.
pub fn resolve_key_name<N>(vk_code: u32, scan_code: u32, names: &N) -> Option<String>
where
    N: KeyNameLookup + ?Sized,
{
    if let Some(name) = named::named_key(vk_code) {
        return Some(name.to_string());
    }
    names
        .key_name_text(scan_code)
        .filter(|text| !text.is_empty())
}
