//! Windows low-level keyboard hook implementation.
//!
//! The hook thread creates its message queue with `PeekMessageW`, then blocks
//! in `GetMessageW`.  While the `WH_KEYBOARD_LL` hook is installed, Windows
//! calls [`keyboard_hook_proc`] from inside that `GetMessageW` call, on the
//! same thread, so the callback context can live in a thread-local.
//!
//! Controllers post payload-free `WM_USER` messages to wake the loop, and
//! `WM_QUIT` to end it.
//!
//! # Safety
//!
//! This module uses `unsafe` code exclusively for Windows API FFI calls.
//! All `unsafe` blocks are annotated with `// SAFETY:` comments.

#![cfg(target_os = "windows")]

use std::cell::RefCell;

use keyhook_core::{
    ControlSignal, HookBackend, HookError, KeyEventSink, KeyNameLookup, KeyStateSource,
    RawKeyInput, SignalSource, ThreadWaker,
};
use tracing::{debug, warn};
use windows::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::Input::KeyboardAndMouse::{GetAsyncKeyState, GetKeyNameTextW};
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, GetMessageW, PeekMessageW, PostThreadMessageW,
    SetWindowsHookExW, UnhookWindowsHookEx, HC_ACTION, HHOOK, KBDLLHOOKSTRUCT, MSG,
    PM_NOREMOVE, WH_KEYBOARD_LL, WM_QUIT, WM_USER,
};

use super::{CaptureError, HookAttachment, HookThreadPlatform};

thread_local! {
    /// Callback context of the hook thread.  `None` on every other thread.
    static HOOK_SINK: RefCell<Option<KeyEventSink>> = const { RefCell::new(None) };
}

/// Longest key name `GetKeyNameTextW` is asked for, in UTF-16 units.
const KEY_NAME_BUF_LEN: usize = 64;

/// The Windows hook thread platform.  Stateless: all per-thread state is in
/// the thread-local and in the backend returned by `attach`.
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsHookPlatform;

impl WindowsHookPlatform {
    pub fn new() -> Self {
        Self
    }

    fn post(thread_id: u32, message: u32) -> bool {
        // SAFETY: PostThreadMessageW only copies the message into the target
        // thread's queue; it fails cleanly if the thread has no queue.
        unsafe { PostThreadMessageW(thread_id, message, WPARAM(0), LPARAM(0)) }.is_ok()
    }
}

impl ThreadWaker for WindowsHookPlatform {
    fn wake(&self, thread_id: u32) -> bool {
        Self::post(thread_id, WM_USER)
    }
}

impl HookThreadPlatform for WindowsHookPlatform {
    type Backend = WindowsHookBackend;
    type Signals = ThreadMessageQueue;

    fn attach(
        &self,
        sink: KeyEventSink,
    ) -> Result<HookAttachment<Self::Backend, Self::Signals>, CaptureError> {
        let mut msg = MSG::default();
        // SAFETY: Peeking with PM_NOREMOVE forces the OS to create this
        // thread's message queue and leaves any message where it is.
        unsafe {
            let _ = PeekMessageW(&mut msg, None, 0, 0, PM_NOREMOVE);
        }

        HOOK_SINK.with(|cell| {
            cell.try_borrow_mut()
                .map(|mut slot| *slot = Some(sink))
                .map_err(|_| CaptureError::Attach("hook context is in use".to_string()))
        })?;

        // SAFETY: GetCurrentThreadId has no preconditions.
        let thread_id = unsafe { GetCurrentThreadId() };
        debug!(thread_id, "hook thread message queue created");

        Ok(HookAttachment {
            backend: WindowsHookBackend { hook: None },
            signals: ThreadMessageQueue,
            thread_id,
        })
    }

    fn quit(&self, thread_id: u32) -> bool {
        Self::post(thread_id, WM_QUIT)
    }

    fn detach(&self) {
        HOOK_SINK.with(|cell| match cell.try_borrow_mut() {
            Ok(mut slot) => {
                slot.take();
            }
            Err(_) => warn!("hook context still borrowed at detach"),
        });
    }
}

/// Owns the `WH_KEYBOARD_LL` handle.  Lives on the hook thread only.
#[derive(Debug)]
pub struct WindowsHookBackend {
    hook: Option<HHOOK>,
}

impl HookBackend for WindowsHookBackend {
    fn install(&mut self) -> Result<(), HookError> {
        if self.hook.is_some() {
            return Ok(());
        }
        // SAFETY: The calling thread pumps messages via ThreadMessageQueue,
        // which is what a low-level hook requires.
        let hook = unsafe { SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_hook_proc), None, 0) }
            .map_err(|e| HookError::Install(e.to_string()))?;
        self.hook = Some(hook);
        Ok(())
    }

    fn uninstall(&mut self) -> Result<(), HookError> {
        let Some(hook) = self.hook else {
            return Ok(());
        };
        // SAFETY: `hook` was returned by SetWindowsHookExW on this thread and
        // has not been unhooked yet.
        unsafe { UnhookWindowsHookEx(hook) }.map_err(|e| HookError::Uninstall(e.to_string()))?;
        self.hook = None;
        Ok(())
    }
}

/// `GetMessageW` as a [`SignalSource`].
#[derive(Debug)]
pub struct ThreadMessageQueue;

impl SignalSource for ThreadMessageQueue {
    fn next_signal(&mut self) -> ControlSignal {
        let mut msg = MSG::default();
        // SAFETY: Standard GetMessageW usage with a valid MSG out-pointer.
        // Returns 0 for WM_QUIT and -1 on failure.
        let ret = unsafe { GetMessageW(&mut msg, None, 0, 0) };
        if ret.0 <= 0 {
            return ControlSignal::Quit;
        }
        if msg.message == WM_USER {
            return ControlSignal::Wake;
        }
        // SAFETY: `msg` was just filled in by GetMessageW.
        unsafe {
            DispatchMessageW(&msg);
        }
        ControlSignal::Other
    }
}

/// `GetAsyncKeyState` as a [`KeyStateSource`].
struct AsyncKeyState;

impl KeyStateSource for AsyncKeyState {
    fn is_key_down(&self, vk: u32) -> bool {
        // SAFETY: GetAsyncKeyState accepts any virtual-key code.
        let state = unsafe { GetAsyncKeyState(vk as i32) };
        // Most significant bit set means "currently down".
        state < 0
    }
}

/// `GetKeyNameTextW` as a [`KeyNameLookup`].
struct OsKeyNames;

impl KeyNameLookup for OsKeyNames {
    fn key_name_text(&self, scan_code: u32) -> Option<String> {
        let mut buf = [0u16; KEY_NAME_BUF_LEN];
        // SAFETY: `buf` is a valid writable buffer; the scan code goes in
        // bits 16..24 of the lParam-style argument.
        let len = unsafe { GetKeyNameTextW((scan_code << 16) as i32, &mut buf) };
        if len <= 0 {
            return None;
        }
        Some(String::from_utf16_lossy(&buf[..len as usize]))
    }
}

/// Low-level keyboard hook callback.
///
/// # Safety
///
/// Called by Windows on the hook thread from inside `GetMessageW`.  It must
/// return quickly, and it always forwards to the next hook in the chain.
unsafe extern "system" fn keyboard_hook_proc(
    n_code: i32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    if n_code == HC_ACTION as i32 {
        // SAFETY: l_param points to a KBDLLHOOKSTRUCT when n_code == HC_ACTION.
        let kbs = &*(l_param.0 as *const KBDLLHOOKSTRUCT);
        let raw = RawKeyInput {
            code: n_code,
            message: w_param.0 as u32,
            vk_code: kbs.vkCode,
            scan_code: kbs.scanCode,
            flags: kbs.flags.0,
        };

        HOOK_SINK.with(|cell| {
            // A re-entrant call finds the context borrowed and is skipped.
            if let Ok(mut slot) = cell.try_borrow_mut() {
                if let Some(sink) = slot.as_mut() {
                    sink.handle(&raw, &AsyncKeyState, &OsKeyNames);
                }
            }
        });
    }

    // SAFETY: Forward the event to the next hook in the chain.
    CallNextHookEx(None, n_code, w_param, l_param)
}
