//! The hook thread's control loop.
//!
//! ```text
//!   Unstarted ──start──▶ Unhooked ◀──wake, !enabled── Hooked
//!                           │                           ▲
//!                           └────wake, enabled──────────┘
//!
//!   quit, or a failed install/uninstall ──▶ Stopped
//! ```
//!
//! The loop blocks on a [`SignalSource`].  Only [`ControlSignal::Wake`] causes
//! work: the loop re-reads [`CaptureState::is_enabled`] and installs or removes
//! the hook through its [`HookBackend`] if the two disagree.  A wake that finds
//! nothing to change is a no-op, so resuming twice never installs twice.
//!
//! The backend owns the OS hook handle.  The loop, and therefore the backend,
//! lives on the hook thread for its whole life.

use std::ops::ControlFlow;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::HookError;
use crate::state::CaptureState;

/// A message observed by the hook thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
    /// Re-read the shared flag.
    Wake,
    /// Anything else delivered to the thread.  Ignored.
    Other,
    /// The thread's queue is shutting down.
    Quit,
}

/// Blocking source of control signals.  On Windows: `GetMessageW`.
pub trait SignalSource {
    fn next_signal(&mut self) -> ControlSignal;
}

/// Installs and removes the OS keyboard hook.  Called only from the hook thread.
#[cfg_attr(test, mockall::automock)]
pub trait HookBackend {
    fn install(&mut self) -> Result<(), HookError>;
    fn uninstall(&mut self) -> Result<(), HookError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    Unstarted,
    Unhooked,
    Hooked,
    Stopped,
}

/// Why the control loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopExit {
    /// A quit signal was received.
    Quit,
    /// Installing or removing the hook failed.
    HookFailed(HookError),
}

pub struct ControlLoop<B: HookBackend> {
    backend: B,
    state: Arc<CaptureState>,
    phase: HookPhase,
}

impl<B: HookBackend> ControlLoop<B> {
    pub fn new(backend: B, state: Arc<CaptureState>) -> Self {
        Self {
            backend,
            state,
            phase: HookPhase::Unstarted,
        }
    }

    pub fn phase(&self) -> HookPhase {
        self.phase
    }

    /// Leaves `Unstarted`, installing the hook right away if capture is enabled.
    pub fn start(&mut self) -> ControlFlow<LoopExit> {
        if self.phase != HookPhase::Unstarted {
            return ControlFlow::Continue(());
        }
        self.phase = HookPhase::Unhooked;
        self.reconcile()
    }

    /// Applies one signal.  `Break` carries the reason the loop must end.
    pub fn handle(&mut self, signal: ControlSignal) -> ControlFlow<LoopExit> {
        match signal {
            ControlSignal::Wake => self.reconcile(),
            ControlSignal::Other => ControlFlow::Continue(()),
            ControlSignal::Quit => ControlFlow::Break(LoopExit::Quit),
        }
    }

    /// Runs until quit or a fatal hook failure, then tears down.
    pub fn run<S>(mut self, signals: &mut S) -> LoopExit
    where
        S: SignalSource + ?Sized,
    {
        let exit = match self.start() {
            ControlFlow::Break(exit) => exit,
            ControlFlow::Continue(()) => loop {
                if let ControlFlow::Break(exit) = self.handle(signals.next_signal()) {
                    break exit;
                }
            },
        };
        self.finish(&exit);
        exit
    }

    fn reconcile(&mut self) -> ControlFlow<LoopExit> {
        let enabled = self.state.is_enabled();
        match (enabled, self.phase) {
            (false, HookPhase::Hooked) => match self.backend.uninstall() {
                Ok(()) => {
                    self.phase = HookPhase::Unhooked;
                    debug!("keyboard hook removed");
                    ControlFlow::Continue(())
                }
                Err(e) => ControlFlow::Break(LoopExit::HookFailed(e)),
            },
            (true, HookPhase::Unhooked) => match self.backend.install() {
                Ok(()) => {
                    self.phase = HookPhase::Hooked;
                    debug!("keyboard hook installed");
                    ControlFlow::Continue(())
                }
                Err(e) => ControlFlow::Break(LoopExit::HookFailed(e)),
            },
            _ => ControlFlow::Continue(()),
        }
    }

    fn finish(&mut self, exit: &LoopExit) {
        // After a failed uninstall the handle is in an unknown state; leave it.
        if *exit == LoopExit::Quit && self.phase == HookPhase::Hooked {
            if let Err(e) = self.backend.uninstall() {
                warn!("hook removal on shutdown failed: {e}");
            }
        }
        self.phase = HookPhase::Stopped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    enum Step {
        Set(bool),
        Signal(ControlSignal),
    }

    /// Replays a script; flag changes are applied just before the next signal
    /// is handed out, as a controller thread would do.
    struct Scripted {
        state: Arc<CaptureState>,
        steps: VecDeque<Step>,
    }

    impl Scripted {
        fn new(state: &Arc<CaptureState>, steps: Vec<Step>) -> Self {
            Self {
                state: Arc::clone(state),
                steps: steps.into(),
            }
        }
    }

    impl SignalSource for Scripted {
        fn next_signal(&mut self) -> ControlSignal {
            while let Some(step) = self.steps.pop_front() {
                match step {
                    Step::Set(enabled) => {
                        self.state.publish_thread_id(1);
                        self.state.request(enabled, &AlwaysWake);
                    }
                    Step::Signal(signal) => return signal,
                }
            }
            ControlSignal::Quit
        }
    }

    #[test]
    fn test_start_installs_when_enabled() {
        // Arrange
        let mut backend = MockHookBackend::new();
        backend.expect_install().times(1).returning(|| Ok(()));
        let mut control = ControlLoop::new(backend, Arc::new(CaptureState::new(true)));

        // Act
        let flow = control.start();

        // Assert
        assert_eq!(flow, ControlFlow::Continue(()));
        assert_eq!(control.phase(), HookPhase::Hooked);
    }

    #[test]
    fn test_start_stays_unhooked_when_disabled() {
        let mut backend = MockHookBackend::new();
        backend.expect_install().never();
        let mut control = ControlLoop::new(backend, Arc::new(CaptureState::new(false)));

        control.start();

        assert_eq!(control.phase(), HookPhase::Unhooked);
    }

    #[test]
    fn test_wake_while_enabled_and_hooked_is_idempotent() {
        // Arrange
        let mut backend = MockHookBackend::new();
        backend.expect_install().times(1).returning(|| Ok(()));
        let mut control = ControlLoop::new(backend, Arc::new(CaptureState::new(true)));
        control.start();

        // Act
        let first = control.handle(ControlSignal::Wake);
        let second = control.handle(ControlSignal::Wake);

        // Assert
        assert_eq!(first, ControlFlow::Continue(()));
        assert_eq!(second, ControlFlow::Continue(()));
        assert_eq!(control.phase(), HookPhase::Hooked);
    }

    #[test]
    fn test_non_wake_messages_do_not_reconcile() {
        let state = Arc::new(CaptureState::new(false));
        let mut backend = MockHookBackend::new();
        backend.expect_install().never();
        let mut control = ControlLoop::new(backend, Arc::clone(&state));
        control.start();

        state.publish_thread_id(1);
        state.request(true, &AlwaysWake);
        let flow = control.handle(ControlSignal::Other);

        assert_eq!(flow, ControlFlow::Continue(()));
        assert_eq!(control.phase(), HookPhase::Unhooked);
    }

    struct AlwaysWake;

    impl crate::state::ThreadWaker for AlwaysWake {
        fn wake(&self, _thread_id: u32) -> bool {
            true
        }
    }

    #[test]
    fn test_run_pause_then_resume_toggles_hook() {
        // Arrange
        let state = Arc::new(CaptureState::new(true));
        let mut backend = MockHookBackend::new();
        let mut seq = mockall::Sequence::new();
        backend
            .expect_install()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(()));
        backend
            .expect_uninstall()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(()));
        backend
            .expect_install()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(()));
        // Final teardown on quit
        backend
            .expect_uninstall()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(()));
        let mut signals = Scripted::new(
            &state,
            vec![
                Step::Set(false),
                Step::Signal(ControlSignal::Wake),
                Step::Set(true),
                Step::Signal(ControlSignal::Wake),
                Step::Signal(ControlSignal::Quit),
            ],
        );

        // Act
        let exit = ControlLoop::new(backend, Arc::clone(&state)).run(&mut signals);

        // Assert
        assert_eq!(exit, LoopExit::Quit);
    }

    #[test]
    fn test_run_collapses_toggles_between_wakes_to_final_value() {
        // Arrange: pause, resume, pause before a single wake is processed
        let state = Arc::new(CaptureState::new(true));
        let mut backend = MockHookBackend::new();
        backend.expect_install().times(1).returning(|| Ok(()));
        backend.expect_uninstall().times(1).returning(|| Ok(()));
        let mut signals = Scripted::new(
            &state,
            vec![
                Step::Set(false),
                Step::Set(true),
                Step::Set(false),
                Step::Signal(ControlSignal::Wake),
                Step::Signal(ControlSignal::Quit),
            ],
        );

        // Act
        let exit = ControlLoop::new(backend, Arc::clone(&state)).run(&mut signals);

        // Assert: one uninstall for the final "paused" value, none at teardown
        assert_eq!(exit, LoopExit::Quit);
    }

    #[test]
    fn test_run_install_failure_is_fatal() {
        let state = Arc::new(CaptureState::new(false));
        let mut backend = MockHookBackend::new();
        backend
            .expect_install()
            .times(1)
            .returning(|| Err(HookError::Install("access denied".into())));
        backend.expect_uninstall().never();
        let mut signals = Scripted::new(
            &state,
            vec![
                Step::Set(true),
                Step::Signal(ControlSignal::Wake),
                // Never reached
                Step::Signal(ControlSignal::Wake),
            ],
        );

        let exit = ControlLoop::new(backend, Arc::clone(&state)).run(&mut signals);

        assert_eq!(
            exit,
            LoopExit::HookFailed(HookError::Install("access denied".into()))
        );
    }

    #[test]
    fn test_run_uninstall_failure_is_fatal_and_not_retried() {
        let state = Arc::new(CaptureState::new(true));
        let mut backend = MockHookBackend::new();
        backend.expect_install().times(1).returning(|| Ok(()));
        backend
            .expect_uninstall()
            .times(1)
            .returning(|| Err(HookError::Uninstall("invalid handle".into())));
        let mut signals = Scripted::new(
            &state,
            vec![Step::Set(false), Step::Signal(ControlSignal::Wake)],
        );

        let exit = ControlLoop::new(backend, Arc::clone(&state)).run(&mut signals);

        assert!(matches!(exit, LoopExit::HookFailed(HookError::Uninstall(_))));
    }

    #[test]
    fn test_run_initial_install_failure_exits_before_waiting() {
        let state = Arc::new(CaptureState::new(true));
        let mut backend = MockHookBackend::new();
        backend
            .expect_install()
            .times(1)
            .returning(|| Err(HookError::Install("no desktop".into())));

        struct Unreachable;
        impl SignalSource for Unreachable {
            fn next_signal(&mut self) -> ControlSignal {
                panic!("loop must not wait for signals after a failed start");
            }
        }

        let exit = ControlLoop::new(backend, state).run(&mut Unreachable);

        assert!(matches!(exit, LoopExit::HookFailed(HookError::Install(_))));
    }

    #[test]
    fn test_run_quit_while_unhooked_skips_teardown() {
        let state = Arc::new(CaptureState::new(false));
        let mut backend = MockHookBackend::new();
        backend.expect_install().never();
        backend.expect_uninstall().never();
        let mut signals = Scripted::new(&state, vec![Step::Signal(ControlSignal::Quit)]);

        let exit = ControlLoop::new(backend, state).run(&mut signals);

        assert_eq!(exit, LoopExit::Quit);
    }
}
