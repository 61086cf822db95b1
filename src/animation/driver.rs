use std::collections::VecDeque;

use crate::foundation::error::{FiberError, FiberResult};
use crate::pattern::config::AnimationSpec;

/// Time added per tick at speed 1, a nominal 60-tick cadence.
pub const TICK_DELTA: f64 = 0.016;

/// Handle for one requested tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TickId(pub u64);

/// Host timing primitive. Each request yields at most one later `tick` call with its id.
pub trait TickScheduler {
    fn request_tick(&mut self) -> TickId;
    fn cancel_tick(&mut self, id: TickId);
}

/// Single time accumulator advanced by scheduler ticks.
///
/// At most one tick is outstanding at a time. Stopping cancels it and keeps the accumulated
/// time, so a later start resumes where the animation left off.
#[derive(Debug)]
pub struct AnimationDriver<S: TickScheduler> {
    scheduler: S,
    time: f64,
    speed: f64,
    pending: Option<TickId>,
}

impl<S: TickScheduler> AnimationDriver<S> {
    pub fn new(scheduler: S, spec: &AnimationSpec) -> Self {
        Self {
            scheduler,
            time: spec.time,
            speed: spec.speed,
            pending: None,
        }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Request the first tick. No-op while already running.
    pub fn start(&mut self) {
        if self.pending.is_none() {
            self.pending = Some(self.scheduler.request_tick());
        }
    }

    /// Cancel the outstanding tick. Time is preserved.
    pub fn stop(&mut self) {
        if let Some(id) = self.pending.take() {
            self.scheduler.cancel_tick(id);
        }
    }

    /// Change the speed multiplier. A running driver re-arms its tick so no tick scheduled
    /// under the old speed is delivered.
    pub fn set_speed(&mut self, speed: f64) -> FiberResult<()> {
        if !(speed.is_finite() && speed > 0.0) {
            return Err(FiberError::validation("animation speed must be > 0"));
        }
        self.speed = speed;
        if self.is_running() {
            self.stop();
            self.start();
        }
        Ok(())
    }

    /// Deliver tick `id`. Returns the new time, or `None` for a stale or cancelled tick.
    pub fn tick(&mut self, id: TickId) -> Option<f64> {
        if self.pending != Some(id) {
            tracing::trace!(tick = id.0, "ignoring stale tick");
            return None;
        }
        self.time += TICK_DELTA * self.speed;
        self.pending = Some(self.scheduler.request_tick());
        Some(self.time)
    }
}

/// Scheduler for headless rendering and tests: ticks are delivered by the caller.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    pending: VecDeque<TickId>,
    cancelled: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Oldest requested tick that has not been delivered or cancelled.
    pub fn next_due(&mut self) -> Option<TickId> {
        self.pending.pop_front()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Number of ticks cancelled so far.
    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }
}

impl TickScheduler for ManualScheduler {
    fn request_tick(&mut self) -> TickId {
        let id = TickId(self.next_id);
        self.next_id += 1;
        self.pending.push_back(id);
        id
    }

    fn cancel_tick(&mut self, id: TickId) {
        if let Some(pos) = self.pending.iter().position(|p| *p == id) {
            self.pending.remove(pos);
            self.cancelled += 1;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/driver.rs"]
mod tests;
