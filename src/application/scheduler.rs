// SPDX-License-Identifier: MPL-2.0
//! Capture cycle scheduler.
//!
//! [`CaptureScheduler`] owns the countdown and the recurring interval timer
//! and is the only component that decides whether a capture cycle is active.
//! Capture requests leave through a [`CaptureTrigger`]; time enters through a
//! [`ClockTimer`].
//!
//! ```text
//! Idle --request_start--> CountingDown(3) --tick--> (2) --tick--> (1) --tick--> Capturing
//!  ^                            |                                                  |
//!  +-------- request_stop ------+------------------- request_stop -----------------+
//! ```

use crate::application::port::{CaptureTrigger, ClockTimer, TimerHandle};
use crate::domain::capture::{CapturePhase, CaptureSource, IntervalSeconds, COUNTDOWN_START};
use crate::error::CaptureError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::watch;

/// Period of the countdown timer.
pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

/// Internal session state. Timer handles live inside the variant that owns
/// them, so a countdown handle cannot outlive `CountingDown` and a recurring
/// handle cannot outlive `Capturing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Idle,
    CountingDown {
        remaining: u32,
        timer: TimerHandle,
        cycle: u64,
    },
    Capturing {
        timer: TimerHandle,
        cycle: u64,
    },
}

impl SessionState {
    fn phase(self) -> CapturePhase {
        match self {
            SessionState::Idle => CapturePhase::Idle,
            SessionState::CountingDown { remaining, .. } => {
                CapturePhase::CountingDown { remaining }
            }
            SessionState::Capturing { .. } => CapturePhase::Capturing,
        }
    }

    fn timer(self) -> Option<TimerHandle> {
        match self {
            SessionState::Idle => None,
            SessionState::CountingDown { timer, .. } | SessionState::Capturing { timer, .. } => {
                Some(timer)
            }
        }
    }
}

#[derive(Debug)]
struct Session {
    state: SessionState,
    interval: IntervalSeconds,
    /// Id of the most recently started cycle.
    cycle: u64,
}

struct Inner {
    clock: Arc<dyn ClockTimer>,
    trigger: Arc<dyn CaptureTrigger>,
    session: Mutex<Session>,
    start_guard: AtomicBool,
    phase_tx: watch::Sender<CapturePhase>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn claim_guard(&self) -> Result<(), CaptureError> {
        self.start_guard
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|_| {
                tracing::warn!("start rejected: a start is already in progress");
                CaptureError::ReentrantStart
            })
    }

    fn release_guard(&self) {
        self.start_guard.store(false, Ordering::Release);
    }

    fn set_state(&self, session: &mut Session, state: SessionState) {
        session.state = state;
        self.phase_tx.send_replace(state.phase());
    }

    fn next_cycle(session: &mut Session) -> u64 {
        session.cycle += 1;
        session.cycle
    }

    /// Emits the immediate capture, installs the recurring timer and releases
    /// the start guard. Must be called with the session lock held.
    fn enter_capturing(self: &Arc<Self>, session: &mut Session, cycle: u64) {
        self.trigger.capture(CaptureSource::Immediate);

        let weak = Arc::downgrade(self);
        let timer = self.clock.schedule_repeating(
            session.interval.as_duration(),
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.on_interval_tick(cycle);
                }
            }),
        );
        self.set_state(session, SessionState::Capturing { timer, cycle });
        self.release_guard();
        tracing::debug!(
            cycle,
            interval_secs = session.interval.value(),
            "capturing started"
        );
    }

    fn on_countdown_tick(self: &Arc<Self>, cycle: u64) {
        let mut session = self.lock();
        let SessionState::CountingDown {
            remaining,
            timer,
            cycle: live,
        } = session.state
        else {
            tracing::debug!(cycle, "stale countdown tick ignored");
            return;
        };
        if live != cycle {
            tracing::debug!(cycle, live, "stale countdown tick ignored");
            return;
        }

        if remaining > 1 {
            self.set_state(
                &mut session,
                SessionState::CountingDown {
                    remaining: remaining - 1,
                    timer,
                    cycle,
                },
            );
            tracing::debug!(cycle, remaining = remaining - 1, "countdown tick");
            return;
        }

        self.clock.cancel(timer);
        self.enter_capturing(&mut session, cycle);
    }

    fn on_interval_tick(&self, cycle: u64) {
        let session = self.lock();
        match session.state {
            SessionState::Capturing { cycle: live, .. } if live == cycle => {
                self.trigger.capture(CaptureSource::Interval);
            }
            _ => tracing::debug!(cycle, "stale interval tick ignored"),
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let session = self
            .session
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(timer) = session.state.timer() {
            self.clock.cancel(timer);
        }
    }
}

/// Countdown and interval capture state machine.
///
/// Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct CaptureScheduler {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for CaptureScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureScheduler")
            .field("phase", &self.phase())
            .field("interval", &self.interval_seconds())
            .finish_non_exhaustive()
    }
}

impl CaptureScheduler {
    /// Creates an idle scheduler with the default interval.
    pub fn new(clock: Arc<dyn ClockTimer>, trigger: Arc<dyn CaptureTrigger>) -> Self {
        Self::with_interval(clock, trigger, IntervalSeconds::default())
    }

    pub fn with_interval(
        clock: Arc<dyn ClockTimer>,
        trigger: Arc<dyn CaptureTrigger>,
        interval: IntervalSeconds,
    ) -> Self {
        let (phase_tx, _) = watch::channel(CapturePhase::Idle);
        Self {
            inner: Arc::new(Inner {
                clock,
                trigger,
                session: Mutex::new(Session {
                    state: SessionState::Idle,
                    interval,
                    cycle: 0,
                }),
                start_guard: AtomicBool::new(false),
                phase_tx,
            }),
        }
    }

    /// Starts a cycle with a countdown of [`COUNTDOWN_START`] one-second ticks.
    ///
    /// # Errors
    ///
    /// - [`CaptureError::ReentrantStart`] if another start holds the guard.
    /// - [`CaptureError::AlreadyActive`] if a cycle is already running.
    pub fn request_start(&self) -> Result<(), CaptureError> {
        self.inner.claim_guard()?;

        let mut session = self.inner.lock();
        if session.state != SessionState::Idle {
            self.inner.release_guard();
            tracing::warn!(phase = ?session.state.phase(), "start rejected: cycle already active");
            return Err(CaptureError::AlreadyActive);
        }

        let cycle = Inner::next_cycle(&mut session);
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let timer = self.inner.clock.schedule_repeating(
            COUNTDOWN_TICK,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.on_countdown_tick(cycle);
                }
            }),
        );
        self.inner.set_state(
            &mut session,
            SessionState::CountingDown {
                remaining: COUNTDOWN_START,
                timer,
                cycle,
            },
        );
        tracing::debug!(cycle, remaining = COUNTDOWN_START, "countdown started");
        Ok(())
    }

    /// Enters capturing immediately, skipping the countdown.
    ///
    /// # Errors
    ///
    /// Same as [`request_start`](Self::request_start).
    pub fn begin_capturing(&self) -> Result<(), CaptureError> {
        self.inner.claim_guard()?;

        let mut session = self.inner.lock();
        if session.state != SessionState::Idle {
            self.inner.release_guard();
            tracing::warn!(phase = ?session.state.phase(), "start rejected: cycle already active");
            return Err(CaptureError::AlreadyActive);
        }

        let cycle = Inner::next_cycle(&mut session);
        self.inner.enter_capturing(&mut session, cycle);
        Ok(())
    }

    /// Stops the active cycle. Returns `false` when nothing was active.
    ///
    /// Once this returns, no further capture request is emitted for the
    /// stopped cycle. Captures already handed to the trigger are not recalled.
    pub fn request_stop(&self) -> bool {
        let mut session = self.inner.lock();
        let Some(timer) = session.state.timer() else {
            return false;
        };
        self.inner.clock.cancel(timer);
        self.inner.set_state(&mut session, SessionState::Idle);
        self.inner.release_guard();
        tracing::debug!(cycle = session.cycle, "capture cycle stopped");
        true
    }

    /// Changes the capture interval. Values below one second are raised to one.
    ///
    /// # Errors
    ///
    /// [`CaptureError::IntervalLocked`] unless the scheduler is idle.
    pub fn set_interval_seconds(&self, seconds: u32) -> Result<(), CaptureError> {
        let mut session = self.inner.lock();
        if session.state != SessionState::Idle {
            tracing::warn!(seconds, "interval change rejected while active");
            return Err(CaptureError::IntervalLocked);
        }
        session.interval = IntervalSeconds::new(seconds);
        Ok(())
    }

    #[must_use]
    pub fn phase(&self) -> CapturePhase {
        *self.inner.phase_tx.borrow()
    }

    /// Countdown value, `None` outside the countdown.
    #[must_use]
    pub fn countdown_remaining(&self) -> Option<u32> {
        self.phase().countdown()
    }

    #[must_use]
    pub fn interval_seconds(&self) -> IntervalSeconds {
        self.inner.lock().interval
    }

    /// Returns `true` while counting down or capturing.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.phase().is_idle()
    }

    /// Subscribes to phase changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CapturePhase> {
        self.inner.phase_tx.subscribe()
    }
}
