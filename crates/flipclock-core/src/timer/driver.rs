//! Periodic tick driver.
//!
//! The engine arms the driver when it starts counting down and disarms it on
//! every way out of `Running`. The host polls the engine, which asks the
//! driver how many whole periods elapsed since the last poll. Disarming drops
//! any ticks that were due but not yet consumed.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Monotonic millisecond clock.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Hand-advanced clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now_ms.set(self.now_ms.get() + by.as_millis() as u64);
    }

    pub fn advance_secs(&self, secs: u64) {
        self.advance(Duration::from_secs(secs));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }
}

/// Source of countdown ticks.
pub trait TickDriver {
    /// Start producing ticks. Arming an armed driver changes nothing.
    fn arm(&mut self);

    /// Stop producing ticks and forget any that are due.
    fn disarm(&mut self);

    fn is_armed(&self) -> bool;

    /// Number of ticks that became due since the previous poll.
    fn poll(&mut self) -> u32;
}

/// Fixed-period driver over a [`Clock`].
#[derive(Debug)]
pub struct IntervalDriver<C: Clock> {
    clock: C,
    period_ms: u64,
    next_due_ms: Option<u64>,
    arm_count: u64,
}

impl<C: Clock> IntervalDriver<C> {
    /// One tick per second.
    pub fn every_second(clock: C) -> Self {
        Self::new(clock, Duration::from_secs(1))
    }

    pub fn new(clock: C, period: Duration) -> Self {
        Self {
            clock,
            period_ms: (period.as_millis() as u64).max(1),
            next_due_ms: None,
            arm_count: 0,
        }
    }

    /// How many times the driver went from disarmed to armed.
    pub fn arm_count(&self) -> u64 {
        self.arm_count
    }
}

impl<C: Clock> TickDriver for IntervalDriver<C> {
    fn arm(&mut self) {
        if self.next_due_ms.is_some() {
            return;
        }
        self.next_due_ms = Some(self.clock.now_ms() + self.period_ms);
        self.arm_count += 1;
    }

    fn disarm(&mut self) {
        self.next_due_ms = None;
    }

    fn is_armed(&self) -> bool {
        self.next_due_ms.is_some()
    }

    fn poll(&mut self) -> u32 {
        let Some(due) = self.next_due_ms else {
            return 0;
        };
        let now = self.clock.now_ms();
        if now < due {
            return 0;
        }
        let ticks = (now - due) / self.period_ms + 1;
        self.next_due_ms = Some(due + ticks * self.period_ms);
        u32::try_from(ticks).unwrap_or(u32::MAX)
    }
}

impl<D: TickDriver + ?Sized> TickDriver for Box<D> {
    fn arm(&mut self) {
        (**self).arm()
    }

    fn disarm(&mut self) {
        (**self).disarm()
    }

    fn is_armed(&self) -> bool {
        (**self).is_armed()
    }

    fn poll(&mut self) -> u32 {
        (**self).poll()
    }
}
