/*
 * Timer Tick Reports
 *
 * Every call to `TimerCore::on_timer_interrupt` returns a `TickReport`
 * describing what the tick did: which periodic passes ran, how many sleepers
 * were released and the load average after the tick. The kernel uses it for
 * statistics; the tests use it to check the cadence of the MLFQS passes.
 */

use bitflags::bitflags;

use crate::fixed_point::Fixed;
use crate::types::Ticks;

bitflags! {
    /// Work performed during a single tick.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
    pub struct TickWork: u8 {
        /// At least one sleeper was released.
        const WOKE_SLEEPERS     = 1 << 0;
        /// The running thread was charged one tick of recent CPU.
        const CHARGED_RECENT_CPU = 1 << 1;
        /// Load average and every thread's recent CPU were recomputed.
        const LOAD_AVG          = 1 << 2;
        /// Every thread's priority was recomputed.
        const PRIORITIES        = 1 << 3;
        /// A reschedule was requested for interrupt return.
        const YIELD_REQUESTED   = 1 << 4;
    }
}

/// Outcome of one timer interrupt.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Tick count after the increment.
    pub tick: Ticks,

    /// Number of sleepers handed back to the thread subsystem.
    pub woken: usize,

    /// Passes that ran.
    pub work: TickWork,

    /// Load average after this tick, `None` when MLFQS is off.
    pub load_avg: Option<Fixed>,
}

impl TickReport {
    pub const fn new(tick: Ticks) -> Self {
        Self {
            tick,
            woken: 0,
            work: TickWork::empty(),
            load_avg: None,
        }
    }

    pub fn ran(&self, work: TickWork) -> bool {
        self.work.contains(work)
    }
}
