/*
 * Timer Core Type Definitions
 *
 * This module defines the small Copy-able types shared by the tick counter,
 * the sleep queue and the MLFQS engine. The thread objects themselves belong
 * to the thread subsystem; the timer core only sees a thread through its
 * `ThreadId` and the `SchedFields` it is allowed to read and write.
 */

use crate::config::{NICE_MAX, NICE_MIN, PRI_MAX, PRI_MIN};
use crate::fixed_point::Fixed;

/// Timer ticks since boot.
pub type Ticks = u64;

/// Thread identifier, assigned by the thread subsystem.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ThreadId(pub usize);

/// Scheduling priority in `PRI_MIN..=PRI_MAX`; higher runs first.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(u8);

impl Priority {
    pub const MIN: Priority = Priority(PRI_MIN);
    pub const DEFAULT: Priority = Priority(31);
    pub const MAX: Priority = Priority(PRI_MAX);

    /// Build a priority, clamping `value` into the valid range.
    pub const fn clamped(value: i32) -> Self {
        if value < PRI_MIN as i32 {
            Priority::MIN
        } else if value > PRI_MAX as i32 {
            Priority::MAX
        } else {
            Priority(value as u8)
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::DEFAULT
    }
}

/// Nice value in `NICE_MIN..=NICE_MAX`. Set by the owner of the thread;
/// the timer core only reads it.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Nice(i8);

impl Nice {
    pub const ZERO: Nice = Nice(0);

    /// Build a nice value, clamping `value` into the valid range.
    pub const fn clamped(value: i32) -> Self {
        if value < NICE_MIN as i32 {
            Nice(NICE_MIN)
        } else if value > NICE_MAX as i32 {
            Nice(NICE_MAX)
        } else {
            Nice(value as i8)
        }
    }

    pub const fn get(self) -> i32 {
        self.0 as i32
    }
}

/// The per-thread scheduling state the timer core reads and writes.
///
/// Lives inside the thread subsystem's thread structure and is lent to the
/// timer core through `IrqThreadOps::sched_fields` and
/// `IrqThreadOps::for_each_thread`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct SchedFields {
    /// Current priority. Recomputed every 4 ticks under MLFQS.
    pub priority: Priority,

    /// Caller-set bias; never modified by the timer core.
    pub nice: Nice,

    /// Exponentially weighted recent CPU usage.
    pub recent_cpu: Fixed,
}

impl SchedFields {
    pub const fn new(priority: Priority, nice: Nice) -> Self {
        Self {
            priority,
            nice,
            recent_cpu: Fixed::ZERO,
        }
    }
}
