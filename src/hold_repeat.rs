//! Press-and-hold auto-repeat for the quantity +/- controls.
//!
//! Pressing steps once right away and arms the initial delay. When the
//! delay elapses the control steps again and keeps stepping at the repeat
//! interval until it is released. Every stop signal (pointer up, pointer
//! leave, touch end or cancel) lands in [`HoldRepeat::release`], which
//! cancels the pending timer.
//!
//! ```text
//! Idle --press--> Delaying --initial delay--> Repeating --interval--> Repeating
//!   ^                 |                           |
//!   +----release------+---------------------------+
//! ```

use crate::{
    action::{Scheduler, TimerToken},
    cart::ProductId,
    config::HoldTiming,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Increment,
    Decrement,
}

impl StepDirection {
    pub fn delta(self) -> i64 {
        match self {
            StepDirection::Increment => 1,
            StepDirection::Decrement => -1,
        }
    }
}

/// One quantity step the owner should apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub target: ProductId,
    pub direction: StepDirection,
}

/// Timer payload marker for hold-repeat timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoldTick;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldState {
    Idle,
    Delaying { step: Step, token: TimerToken },
    Repeating { step: Step, token: TimerToken },
}

pub struct HoldRepeat {
    state: HoldState,
    timing: HoldTiming,
}

impl HoldRepeat {
    pub fn new(timing: HoldTiming) -> Self {
        Self {
            state: HoldState::Idle,
            timing,
        }
    }

    pub fn state(&self) -> HoldState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != HoldState::Idle
    }

    /// Starts holding `target`. A hold already in progress is released
    /// first, so only one control ever repeats.
    pub fn press<T: From<HoldTick>>(
        &mut self,
        target: ProductId,
        direction: StepDirection,
        scheduler: &mut Scheduler<T>,
    ) -> Step {
        self.release(scheduler);
        let step = Step { target, direction };
        let token = scheduler.exec_after(self.timing.initial_delay(), HoldTick.into());
        self.state = HoldState::Delaying { step, token };
        step
    }

    /// Handles a fired hold timer. Stale tokens are ignored.
    pub fn on_timer<T: From<HoldTick>>(
        &mut self,
        fired: TimerToken,
        scheduler: &mut Scheduler<T>,
    ) -> Option<Step> {
        match self.state {
            HoldState::Delaying { step, token } | HoldState::Repeating { step, token }
                if token == fired =>
            {
                let token = scheduler.exec_after(self.timing.repeat_interval(), HoldTick.into());
                self.state = HoldState::Repeating { step, token };
                Some(step)
            }
            _ => None,
        }
    }

    /// Stops any hold in progress. Returns true if one was active.
    pub fn release<T>(&mut self, scheduler: &mut Scheduler<T>) -> bool {
        match std::mem::replace(&mut self.state, HoldState::Idle) {
            HoldState::Idle => false,
            HoldState::Delaying { token, .. } | HoldState::Repeating { token, .. } => {
                scheduler.cancel(token);
                true
            }
        }
    }
}
