//! Timers driven by an injectable clock.
//!
//! Callers schedule a payload with [`Scheduler::exec_after`] and get back a
//! [`TimerToken`]. Nothing fires on its own: the owner polls
//! [`Scheduler::fire_due`] and hands each payload to whoever scheduled it.
//! Owners remember the token they expect, so a timer that was superseded
//! or cancelled after it was collected is recognized as stale and ignored.

use std::{
    cell::Cell,
    rc::Rc,
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

#[cfg(not(target_arch = "wasm32"))]
pub use std::time::Instant;
#[cfg(target_arch = "wasm32")]
pub use web_time::Instant;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::trace;

pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.elapsed.set(self.elapsed.get() + by);
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed.get()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerToken(u64);

impl TimerToken {
    /// A token that does not correspond to any timer.
    pub const INVALID: TimerToken = TimerToken(0);

    /// Create a new token.
    pub fn next() -> TimerToken {
        static TIMER_COUNTER: AtomicU64 = AtomicU64::new(1);
        TimerToken(TIMER_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw value for a token.
    pub const fn into_raw(self) -> u64 {
        self.0
    }
}

struct Timer<T> {
    payload: T,
    deadline: Instant,
}

pub struct Scheduler<T> {
    clock: Rc<dyn Clock>,
    timers: FxHashMap<TimerToken, Timer<T>>,
}

impl<T> Scheduler<T> {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            clock,
            timers: FxHashMap::default(),
        }
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    pub fn exec_after(&mut self, duration: Duration, payload: T) -> TimerToken {
        let token = TimerToken::next();
        let deadline = self.clock.now() + duration;
        self.timers.insert(token, Timer { payload, deadline });
        token
    }

    /// Cancels a pending timer. Returns false if it already fired, was
    /// already cancelled, or never existed.
    pub fn cancel(&mut self, token: TimerToken) -> bool {
        self.timers.remove(&token).is_some()
    }

    pub fn is_pending(&self, token: TimerToken) -> bool {
        self.timers.contains_key(&token)
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// The earliest deadline among pending timers.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.values().map(|timer| timer.deadline).min()
    }

    /// Removes and returns every timer whose deadline has passed, in
    /// deadline order (ties broken by scheduling order).
    pub fn fire_due(&mut self) -> SmallVec<[(TimerToken, T); 4]> {
        let now = self.clock.now();
        let mut due: SmallVec<[(TimerToken, Instant); 4]> = self
            .timers
            .iter()
            .filter(|(_, timer)| timer.deadline <= now)
            .map(|(token, timer)| (*token, timer.deadline))
            .collect();
        due.sort_by_key(|(token, deadline)| (*deadline, *token));

        due.into_iter()
            .filter_map(|(token, _)| {
                let timer = self.timers.remove(&token)?;
                trace!(token = token.into_raw(), "timer fired");
                Some((token, timer.payload))
            })
            .collect()
    }
}
