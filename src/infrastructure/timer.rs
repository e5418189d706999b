// SPDX-License-Identifier: MPL-2.0
//! Timer adapters.
//!
//! - [`TokioClock`]: each timer is a task on a tokio runtime, cancelled with
//!   [`JoinHandle::abort`].
//! - [`ManualClock`]: virtual time advanced explicitly, for deterministic tests
//!   and simulations.

use crate::application::port::{ClockTimer, TimerCallback, TimerHandle};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};

/// Timer backed by tokio tasks.
#[derive(Debug)]
pub struct TokioClock {
    runtime: Handle,
    next_id: AtomicU64,
    tasks: Mutex<BTreeMap<u64, JoinHandle<()>>>,
}

impl TokioClock {
    /// Creates a clock spawning on `runtime`.
    #[must_use]
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            next_id: AtomicU64::new(1),
            tasks: Mutex::new(BTreeMap::new()),
        }
    }

    /// Creates a clock on the runtime of the calling task.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    #[must_use]
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    fn tasks(&self) -> MutexGuard<'_, BTreeMap<u64, JoinHandle<()>>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn register(&self, task: JoinHandle<()>) -> TimerHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut tasks = self.tasks();
        tasks.retain(|_, task| !task.is_finished());
        tasks.insert(id, task);
        TimerHandle::new(id)
    }
}

impl ClockTimer for TokioClock {
    fn schedule_once(&self, delay: Duration, mut callback: TimerCallback) -> TimerHandle {
        let task = self.runtime.spawn(async move {
            sleep(delay).await;
            callback();
        });
        self.register(task)
    }

    fn schedule_repeating(&self, period: Duration, mut callback: TimerCallback) -> TimerHandle {
        let task = self.runtime.spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                callback();
            }
        });
        self.register(task)
    }

    fn cancel(&self, handle: TimerHandle) {
        if let Some(task) = self.tasks().remove(&handle.id()) {
            task.abort();
        }
    }
}

struct ManualTimer {
    due: Duration,
    period: Option<Duration>,
    /// `None` while the callback is running.
    callback: Option<TimerCallback>,
}

#[derive(Default)]
struct ManualState {
    now: Duration,
    next_id: u64,
    timers: BTreeMap<u64, ManualTimer>,
}

/// Virtual clock that only moves when [`advance`](Self::advance) is called.
///
/// Callbacks run on the caller's thread without the clock's lock held, so they
/// may schedule or cancel timers themselves.
#[derive(Default)]
pub struct ManualClock {
    state: Mutex<ManualState>,
}

impl std::fmt::Debug for ManualClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("ManualClock")
            .field("now", &state.now)
            .field("pending", &state.timers.len())
            .finish()
    }
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ManualState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Virtual time elapsed since creation.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Number of timers that are scheduled and not cancelled.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.lock().timers.len()
    }

    /// Moves time forward by `by`, firing every timer that comes due, in due
    /// order. Repeating timers fire as many times as their period fits.
    pub fn advance(&self, by: Duration) {
        let target = self.lock().now + by;

        loop {
            let (id, mut callback) = {
                let mut state = self.lock();
                let next = state
                    .timers
                    .iter()
                    .filter(|(_, timer)| timer.callback.is_some() && timer.due <= target)
                    .min_by_key(|(id, timer)| (timer.due, **id))
                    .map(|(id, timer)| (*id, timer.due));
                let Some((id, due)) = next else {
                    state.now = target;
                    return;
                };
                state.now = due;
                let Some(callback) = state
                    .timers
                    .get_mut(&id)
                    .and_then(|timer| timer.callback.take())
                else {
                    continue;
                };
                (id, callback)
            };

            callback();

            let mut state = self.lock();
            // Gone if the callback (or anyone) cancelled it meanwhile.
            if let Some(timer) = state.timers.get_mut(&id) {
                match timer.period {
                    Some(period) => {
                        timer.due += period;
                        timer.callback = Some(callback);
                    }
                    None => {
                        state.timers.remove(&id);
                    }
                }
            }
        }
    }

    fn insert(
        &self,
        delay: Duration,
        period: Option<Duration>,
        callback: TimerCallback,
    ) -> TimerHandle {
        let mut state = self.lock();
        state.next_id += 1;
        let id = state.next_id;
        let due = state.now + delay;
        state.timers.insert(
            id,
            ManualTimer {
                due,
                period,
                callback: Some(callback),
            },
        );
        TimerHandle::new(id)
    }
}

impl ClockTimer for ManualClock {
    fn schedule_once(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        self.insert(delay, None, callback)
    }

    fn schedule_repeating(&self, period: Duration, callback: TimerCallback) -> TimerHandle {
        // A zero period would never let `advance` terminate.
        let period = period.max(Duration::from_millis(1));
        self.insert(period, Some(period), callback)
    }

    fn cancel(&self, handle: TimerHandle) {
        self.lock().timers.remove(&handle.id());
    }
}
