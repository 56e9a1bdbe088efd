//! Mock hook thread platform for testing.
//!
//! Runs the real hook thread and control loop, but replaces the OS with an
//! in-process message queue and a simulated keyboard.  Tests press and release
//! keys with [`MockHookPlatform::press`] / [`MockHookPlatform::release`]; the
//! events only reach the pipeline while the mock hook is installed, just as
//! the OS only calls an installed hook.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use keyhook_core::{
    ControlSignal, HookBackend, HookError, KeyEventSink, KeyNameLookup, KeyStateSource,
    RawKeyInput, SignalSource, SubmitOutcome, ThreadWaker,
};

use super::{CaptureError, HookAttachment, HookThreadPlatform};

/// Fake OS thread identifiers handed out by `attach`.
static NEXT_THREAD_ID: AtomicU32 = AtomicU32::new(1000);

#[derive(Default)]
struct MockKeyboard {
    held: HashSet<u32>,
    names: HashMap<u32, String>,
}

impl KeyStateSource for MockKeyboard {
    fn is_key_down(&self, vk: u32) -> bool {
        self.held.contains(&vk)
    }
}

impl KeyNameLookup for MockKeyboard {
    fn key_name_text(&self, scan_code: u32) -> Option<String> {
        self.names.get(&scan_code).cloned()
    }
}

#[derive(Default)]
struct Inner {
    sink: Mutex<Option<KeyEventSink>>,
    queue: Mutex<Option<(u32, Sender<ControlSignal>)>>,
    keyboard: Mutex<MockKeyboard>,
    hooked: AtomicBool,
    install_calls: AtomicU32,
    uninstall_calls: AtomicU32,
    fail_next_install: AtomicBool,
    panic_next_install: AtomicBool,
    fail_attach: AtomicBool,
}

/// A mock implementation of [`HookThreadPlatform`].
///
/// Cheap to clone; clones share the same simulated OS.
#[derive(Clone, Default)]
pub struct MockHookPlatform {
    inner: Arc<Inner>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockHookPlatform {
    /// Creates a mock whose keyboard names the letters A to Z by their
    /// usual set-1 scan codes.
    pub fn new() -> Self {
        let platform = Self::default();
        {
            let mut kb = lock(&platform.inner.keyboard);
            let letters = [
                (0x1E, "A"), (0x30, "B"), (0x2E, "C"), (0x20, "D"), (0x12, "E"), (0x21, "F"),
                (0x22, "G"), (0x23, "H"), (0x17, "I"), (0x24, "J"), (0x25, "K"), (0x26, "L"),
                (0x32, "M"), (0x31, "N"), (0x18, "O"), (0x19, "P"), (0x10, "Q"), (0x13, "R"),
                (0x1F, "S"), (0x14, "T"), (0x16, "U"), (0x2F, "V"), (0x11, "W"), (0x2D, "X"),
                (0x15, "Y"), (0x2C, "Z"),
            ];
            for (scan, name) in letters {
                kb.names.insert(scan, name.to_string());
            }
        }
        platform
    }

    /// Sets the OS key-name text for `scan_code`.
    pub fn set_key_name(&self, scan_code: u32, name: &str) {
        lock(&self.inner.keyboard)
            .names
            .insert(scan_code, name.to_string());
    }

    /// Delivers raw hook input as the OS would.  Returns `None` when the hook
    /// is not installed or the pipeline produced nothing.
    pub fn inject(&self, raw: RawKeyInput) -> Option<SubmitOutcome> {
        if !self.is_hooked() {
            return None;
        }
        let keyboard = lock(&self.inner.keyboard);
        let mut sink = lock(&self.inner.sink);
        sink.as_mut()?.handle(&raw, &*keyboard, &*keyboard)
    }

    /// Holds `vk` down, then delivers a key-down.
    pub fn press(&self, vk: u32, scan_code: u32) -> Option<SubmitOutcome> {
        lock(&self.inner.keyboard).held.insert(vk);
        self.inject(RawKeyInput::key_down(vk, scan_code))
    }

    /// Lets go of `vk`, then delivers a key-up.
    pub fn release(&self, vk: u32, scan_code: u32) -> Option<SubmitOutcome> {
        lock(&self.inner.keyboard).held.remove(&vk);
        self.inject(RawKeyInput::key_up(vk, scan_code))
    }

    /// Makes the next `install` call fail.
    pub fn fail_next_install(&self) {
        self.inner.fail_next_install.store(true, Ordering::SeqCst);
    }

    /// Makes the next `install` call panic, killing the hook thread.
    pub fn panic_on_next_install(&self) {
        self.inner.panic_next_install.store(true, Ordering::SeqCst);
    }

    /// Makes `attach` fail, as if the thread could not get a message queue.
    pub fn fail_attach(&self) {
        self.inner.fail_attach.store(true, Ordering::SeqCst);
    }

    pub fn is_hooked(&self) -> bool {
        self.inner.hooked.load(Ordering::SeqCst)
    }

    pub fn install_count(&self) -> u32 {
        self.inner.install_calls.load(Ordering::SeqCst)
    }

    pub fn uninstall_count(&self) -> u32 {
        self.inner.uninstall_calls.load(Ordering::SeqCst)
    }

    /// Posts a message the control loop does not act on.
    pub fn post_other(&self, thread_id: u32) -> bool {
        self.post(thread_id, ControlSignal::Other)
    }

    /// Polls until the hook's installed state equals `hooked`.  The hook
    /// thread reconciles asynchronously, so tests wait on this after a toggle.
    pub fn wait_for_hooked(&self, hooked: bool, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if self.is_hooked() == hooked {
                return true;
            }
            thread::sleep(Duration::from_millis(1));
        }
        self.is_hooked() == hooked
    }

    fn post(&self, thread_id: u32, signal: ControlSignal) -> bool {
        match lock(&self.inner.queue).as_ref() {
            Some((id, tx)) if *id == thread_id => tx.send(signal).is_ok(),
            _ => false,
        }
    }
}

impl ThreadWaker for MockHookPlatform {
    fn wake(&self, thread_id: u32) -> bool {
        self.post(thread_id, ControlSignal::Wake)
    }
}

impl HookThreadPlatform for MockHookPlatform {
    type Backend = MockBackend;
    type Signals = MockSignals;

    fn attach(
        &self,
        sink: KeyEventSink,
    ) -> Result<HookAttachment<Self::Backend, Self::Signals>, CaptureError> {
        if self.inner.fail_attach.swap(false, Ordering::SeqCst) {
            return Err(CaptureError::Attach("mock refused to attach".to_string()));
        }
        let thread_id = NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel();
        *lock(&self.inner.queue) = Some((thread_id, tx));
        *lock(&self.inner.sink) = Some(sink);
        Ok(HookAttachment {
            backend: MockBackend {
                inner: Arc::clone(&self.inner),
            },
            signals: MockSignals { rx },
            thread_id,
        })
    }

    fn quit(&self, thread_id: u32) -> bool {
        self.post(thread_id, ControlSignal::Quit)
    }

    fn detach(&self) {
        lock(&self.inner.queue).take();
        lock(&self.inner.sink).take();
    }
}

/// Backend half of [`MockHookPlatform`].
pub struct MockBackend {
    inner: Arc<Inner>,
}

impl HookBackend for MockBackend {
    fn install(&mut self) -> Result<(), HookError> {
        self.inner.install_calls.fetch_add(1, Ordering::SeqCst);
        if self.inner.panic_next_install.swap(false, Ordering::SeqCst) {
            panic!("mock install panicked");
        }
        if self.inner.fail_next_install.swap(false, Ordering::SeqCst) {
            return Err(HookError::Install("mock install failure".to_string()));
        }
        self.inner.hooked.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn uninstall(&mut self) -> Result<(), HookError> {
        self.inner.uninstall_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.hooked.store(false, Ordering::SeqCst);
        Ok(())
    }
}

/// Signal half of [`MockHookPlatform`].  A closed queue reads as quit.
pub struct MockSignals {
    rx: Receiver<ControlSignal>,
}

impl SignalSource for MockSignals {
    fn next_signal(&mut self) -> ControlSignal {
        self.rx.recv().unwrap_or(ControlSignal::Quit)
    }
}
